// Command-line interface for odtmpl
//
// This binary renders OpenDocument text templates: .odt files whose placeholder fields hold
// Jinja-style expressions.
//
// Usage:
//  odtmpl <template> [-o <file>] [--data <vars.json>] [--var-<name> <value>]...  - Render (default)
//  odtmpl render <template> [...]                                              - Same as above (explicit)
//  odtmpl inspect <template>                                                   - List placeholders and where they go
//
// Variables:
//
// Variables come from a JSON object passed with --data, then from --var-<name> <value> pairs,
// which win over the file. Values that parse as JSON (numbers, booleans, arrays, objects) keep
// their type; anything else is a string. A --var-<name> without a value is `true`.
// Example:
//  odtmpl invoice.odt --data invoice.json --var-number 42 --var-paid

use clap::{Arg, ArgAction, Command, ValueHint};
use log::{info, LevelFilter};
use odtmpl::archive::Archive;
use odtmpl::fields::{self, Promotion};
use odtmpl::xml::{self, Document};
use odtmpl::{JinjaSyntax, RenderOptions, Renderer};
use odtmpl_config::{LogLevel, Loader, OdtmplConfig};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

const SUBCOMMANDS: &[&str] = &["render", "inspect", "help"];

/// Parse var-* arguments from command line args
/// Returns (cleaned_args_without_vars, variables in command line order)
///
/// Supports both:
/// - `--var-<name> <value>` (explicit value)
/// - `--var-<name>` (boolean flag, set to true)
fn parse_var_args(args: &[String]) -> (Vec<String>, Vec<(String, Value)>) {
    let mut cleaned_args = Vec::new();
    let mut variables = Vec::new();
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];

        if let Some(name) = arg.strip_prefix("--var-") {
            let has_value = args.get(i + 1).is_some_and(|next| !next.starts_with('-'));
            if has_value {
                variables.push((name.to_string(), parse_var_value(&args[i + 1])));
                i += 2;
            } else {
                variables.push((name.to_string(), Value::Bool(true)));
                i += 1;
            }
            continue;
        }

        cleaned_args.push(arg.clone());
        i += 1;
    }

    (cleaned_args, variables)
}

/// JSON when the text is valid JSON, a plain string otherwise
fn parse_var_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn build_cli() -> Command {
    Command::new("odtmpl")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Render OpenDocument text templates")
        .long_about(
            "odtmpl fills .odt templates whose placeholder fields hold Jinja-style expressions.\n\n\
            Commands:\n  \
            - render:  Render a template with variables (default)\n  \
            - inspect: List the placeholder fields of a template\n\n\
            Variables:\n  \
            Use --data <file.json> for a JSON object of variables and\n  \
            --var-<name> [value] for single values (a bare flag means 'true').\n\n\
            Examples:\n  \
            odtmpl letter.odt --var-name Ada            # Writes letter.rendered.odt\n  \
            odtmpl letter.odt --data vars.json -o out.odt\n  \
            odtmpl inspect letter.odt                   # Show placeholders",
        )
        .arg_required_else_help(true)
        .subcommand_required(false)
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to an odtmpl.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Increase log verbosity (-v info, -vv debug, -vvv trace)")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(
            Command::new("render")
                .about("Render a template (default command)")
                .long_about(
                    "Render a template archive with the given variables.\n\n\
                    The result is written next to the template as <name>.rendered.odt\n\
                    unless -o is given.\n\n\
                    Examples:\n  \
                    odtmpl render invoice.odt --data invoice.json\n  \
                    odtmpl invoice.odt --var-number 42 -o invoice-42.odt   # 'render' is optional",
                )
                .arg(
                    Arg::new("template")
                        .help("Template file (.odt)")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path (defaults to <template>.rendered.odt)")
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("data")
                        .long("data")
                        .short('d')
                        .value_name("JSON")
                        .help("JSON file holding an object of variables")
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("inspect")
                .about("List the placeholder fields of a template")
                .long_about(
                    "Print every placeholder field of the content and style parts with its\n\
                    kind (variable or block), flow reference, the element its tag is moved\n\
                    to, and the placement relative to that element.\n\n\
                    Examples:\n  \
                    odtmpl inspect invoice.odt",
                )
                .arg(
                    Arg::new("template")
                        .help("Template file (.odt)")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                ),
        )
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    // Parse var-* arguments before clap processing
    let (cleaned_args, variables) = parse_var_args(&args);

    let cli = build_cli();
    let matches = match cli.clone().try_get_matches_from(&cleaned_args) {
        Ok(m) => m,
        Err(e) => {
            // A file as first argument means the render subcommand was left out
            if cleaned_args.len() > 1
                && !cleaned_args[1].starts_with('-')
                && !SUBCOMMANDS.contains(&cleaned_args[1].as_str())
            {
                let mut new_args = vec![cleaned_args[0].clone(), "render".to_string()];
                new_args.extend_from_slice(&cleaned_args[1..]);

                match cli.try_get_matches_from(&new_args) {
                    Ok(m) => m,
                    Err(e2) => e2.exit(),
                }
            } else {
                e.exit();
            }
        }
    };

    let config = load_cli_config(matches.get_one::<String>("config").map(|s| s.as_str()));
    init_logging(&config, matches.get_count("verbose"));

    match matches.subcommand() {
        Some(("render", sub_matches)) => {
            let template = sub_matches
                .get_one::<String>("template")
                .expect("template is required");
            let output = sub_matches.get_one::<String>("output").map(|s| s.as_str());
            let data = sub_matches.get_one::<String>("data").map(|s| s.as_str());
            handle_render_command(template, output, data, variables, &config);
        }
        Some(("inspect", sub_matches)) => {
            let template = sub_matches
                .get_one::<String>("template")
                .expect("template is required");
            handle_inspect_command(template, &config);
        }
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    }
}

/// Handle the render command
fn handle_render_command(
    template: &str,
    output: Option<&str>,
    data: Option<&str>,
    variables: Vec<(String, Value)>,
    config: &OdtmplConfig,
) {
    let data = data.map(|path| {
        let source = fs::read_to_string(path).unwrap_or_else(|e| {
            eprintln!("Error reading data file '{path}': {e}");
            std::process::exit(1);
        });
        serde_json::from_str::<Value>(&source).unwrap_or_else(|e| {
            eprintln!("Error parsing data file '{path}': {e}");
            std::process::exit(1);
        })
    });
    let context = build_variables(data, variables).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    let renderer = Renderer::with_options(RenderOptions::from(config));
    let rendered = renderer
        .render_path(Path::new(template), &context)
        .unwrap_or_else(|e| {
            eprintln!("Render error: {e}");
            std::process::exit(1);
        });

    let output = output
        .map(PathBuf::from)
        .unwrap_or_else(|| default_output_path(Path::new(template)));
    fs::write(&output, rendered).unwrap_or_else(|e| {
        eprintln!("Error writing file '{}': {e}", output.display());
        std::process::exit(1);
    });
    info!("wrote {}", output.display());
}

/// Merge the data file with the command line variables, which win
fn build_variables(
    data: Option<Value>,
    variables: Vec<(String, Value)>,
) -> Result<Value, String> {
    let mut context = match data {
        None => Map::new(),
        Some(Value::Object(map)) => map,
        Some(other) => {
            return Err(format!(
                "the data file must hold a JSON object, found {}",
                json_type(&other)
            ))
        }
    };
    for (name, value) in variables {
        context.insert(name, value);
    }
    Ok(Value::Object(context))
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// `letter.odt` -> `letter.rendered.odt`, in the template's directory
fn default_output_path(template: &Path) -> PathBuf {
    let stem = template
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    template.with_file_name(format!("{stem}.rendered.odt"))
}

/// Handle the inspect command
fn handle_inspect_command(template: &str, config: &OdtmplConfig) {
    let bytes = fs::read(template).unwrap_or_else(|e| {
        eprintln!("Error reading file '{template}': {e}");
        std::process::exit(1);
    });
    let archive = Archive::from_bytes(&bytes).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    let options = RenderOptions::from(config);
    for part in [&options.content_part, &options.styles_part] {
        let Some(data) = archive.get(part) else {
            continue;
        };
        let doc = xml::parse_bytes(data).unwrap_or_else(|e| {
            eprintln!("Error in {part}: {e}");
            std::process::exit(1);
        });
        print!("{}", describe_part(part, &doc));
    }
}

/// One line per placeholder, in document order
fn describe_part(part: &str, doc: &Document) -> String {
    let plan = fields::plan(doc, &JinjaSyntax);
    let mut out = format!("{part}\n");
    if plan.is_empty() {
        out.push_str("  (no placeholders)\n");
    }
    for promotion in &plan {
        out.push_str(&describe_promotion(doc, promotion));
        out.push('\n');
    }
    out
}

fn describe_promotion(doc: &Document, promotion: &Promotion) -> String {
    let reference = promotion
        .reference
        .as_ref()
        .map(|reference| reference.raw.as_str())
        .unwrap_or("-");
    format!(
        "  {:<8}  {:<14}  {:<18}  {:<8}  {}",
        promotion.kind.as_str(),
        reference,
        doc.tag_name(promotion.destination).unwrap_or("#text"),
        promotion.placement.as_str(),
        promotion.expression.trim()
    )
}

fn load_cli_config(explicit_path: Option<&str>) -> OdtmplConfig {
    let loader = Loader::new().with_optional_file("odtmpl.toml");
    let loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };

    loader.build().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    })
}

/// The configured level, raised by each -v. RUST_LOG overrides both.
fn init_logging(config: &OdtmplConfig, verbose: u8) {
    let level = match verbose {
        0 => level_filter(config.logging.level),
        1 => LevelFilter::Info.max(level_filter(config.logging.level)),
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .parse_default_env()
        .init();
}

fn level_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Off => LevelFilter::Off,
        LogLevel::Error => LevelFilter::Error,
        LogLevel::Warn => LevelFilter::Warn,
        LogLevel::Info => LevelFilter::Info,
        LogLevel::Debug => LevelFilter::Debug,
        LogLevel::Trace => LevelFilter::Trace,
    }
}
