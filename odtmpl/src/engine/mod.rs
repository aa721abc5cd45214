//! Template execution pipeline
//!
//!     A render takes a template archive and a set of variables and produces a new
//!     archive:
//!
//!     1. unpack the archive and parse the content and style parts;
//!     2. promote the placeholder fields of both trees (see [`crate::fields`]);
//!     3. serialize each tree, restore `<` and `>` inside template tags, evaluate it
//!        with minijinja and encode the newlines it produced as `text:line-break`;
//!     4. splice the rendered `office:body` into the original content tree, and take
//!        the rendered style tree as a whole;
//!     5. add the styles created by the `markdown` filter and repack.
//!
//!     Only the body of the content part is taken from the rendered output: everything
//!     around it (declarations, automatic styles, fonts) stays as it was parsed.
//!
//!     A [`Renderer`] is immutable while rendering. Each render clones the base
//!     environment, binds a fresh [`StyleRegistry`] to the `markdown` filter, and owns
//!     its trees, so one renderer can serve several threads.

pub mod environment;
pub mod undefined;

use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, warn};
use minijinja::{Environment, Value};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;

use crate::archive::Archive;
use crate::error::RenderError;
use crate::fields::{self, ExpressionSyntax, JinjaSyntax};
use crate::markdown::{apply_styles, MarkdownOptions, StyleRegistry, LINE_BREAK};
use crate::xml::{self, Document};
use undefined::VariableScope;

pub const CONTENT_PART: &str = "content.xml";
pub const STYLES_PART: &str = "styles.xml";
pub const BODY: &str = "office:body";

static TEMPLATE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{[{%].*?[%}]\}").expect("valid regex for template tags"));

/// Settings of a [`Renderer`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Archive entry holding the document body
    pub content_part: String,
    /// Archive entry holding the common styles, headers and footers
    pub styles_part: String,
    /// Width used by `pad` when none is given
    pub pad_width: usize,
    /// HTML-escape rendered values
    pub autoescape: bool,
    pub markdown: MarkdownOptions,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            content_part: CONTENT_PART.to_string(),
            styles_part: STYLES_PART.to_string(),
            pad_width: 5,
            autoescape: true,
            markdown: MarkdownOptions::default(),
        }
    }
}

/// Renders OpenDocument templates
pub struct Renderer {
    env: Environment<'static>,
    options: RenderOptions,
    globals: BTreeSet<String>,
    syntax: Arc<dyn ExpressionSyntax + Send + Sync>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self::with_options(RenderOptions::default())
    }

    pub fn with_options(options: RenderOptions) -> Self {
        Renderer {
            env: environment::base_environment(&options),
            options,
            globals: BTreeSet::new(),
            syntax: Arc::new(JinjaSyntax),
        }
    }

    /// Replace the expression syntax used to find placeholder fields
    pub fn with_syntax(mut self, syntax: impl ExpressionSyntax + Send + Sync + 'static) -> Self {
        self.syntax = Arc::new(syntax);
        self
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// The template environment, for registering custom filters and tests.
    /// Globals must go through [`Renderer::add_global`] to stay visible to templates.
    pub fn environment_mut(&mut self) -> &mut Environment<'static> {
        &mut self.env
    }

    /// Register a global value or function
    pub fn add_global(&mut self, name: &str, value: impl Into<Value>) {
        self.env.add_global(name.to_string(), value.into());
        self.globals.insert(name.to_string());
    }

    pub fn render_path<S: Serialize>(
        &self,
        path: &Path,
        variables: &S,
    ) -> Result<Vec<u8>, RenderError> {
        debug!("rendering {}", path.display());
        let bytes = std::fs::read(path)?;
        self.render_bytes(&bytes, variables)
    }

    pub fn render_reader<R: Read, S: Serialize>(
        &self,
        mut reader: R,
        variables: &S,
    ) -> Result<Vec<u8>, RenderError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        self.render_bytes(&bytes, variables)
    }

    /// Render a template archive held in memory and return the new archive
    pub fn render_bytes<S: Serialize>(
        &self,
        template: &[u8],
        variables: &S,
    ) -> Result<Vec<u8>, RenderError> {
        let mut archive = Archive::from_bytes(template)?;
        self.render_archive(&mut archive, variables)?;
        archive.to_bytes()
    }

    /// Render an unpacked archive in place
    pub fn render_archive<S: Serialize>(
        &self,
        archive: &mut Archive,
        variables: &S,
    ) -> Result<(), RenderError> {
        let content_part = self.options.content_part.as_str();
        let styles_part = self.options.styles_part.as_str();

        let mut content = archive
            .get(content_part)
            .ok_or_else(|| {
                RenderError::MalformedInput(format!("archive has no {content_part} part"))
            })
            .and_then(xml::parse_bytes)?;
        let styles = match archive.get(styles_part) {
            Some(bytes) => Some(xml::parse_bytes(bytes)?),
            None => {
                warn!("archive has no {styles_part} part, styles are not rendered");
                None
            }
        };
        if content.find_element(BODY).is_none() {
            return Err(RenderError::MalformedInput(format!("{content_part} has no {BODY}")));
        }

        let promoted = fields::promote(&mut content, self.syntax.as_ref());
        debug!("promoted {promoted} fields in {content_part}");
        let styles = styles.map(|mut styles| {
            let promoted = fields::promote(&mut styles, self.syntax.as_ref());
            debug!("promoted {promoted} fields in {styles_part}");
            styles
        });

        let registry = Arc::new(Mutex::new(StyleRegistry::from_parts(&content, styles.as_ref())));
        let mut env = self.env.clone();
        environment::add_markdown_filter(&mut env, self.options.markdown.clone(), registry.clone());

        let scope = Value::from_object(VariableScope::new(
            Value::from_serialize(variables),
            Arc::new(self.globals.clone()),
        ));

        let rendered = render_part(&env, content_part, &content, &scope)?;
        let rendered = xml::parse(&rendered)?;
        splice_body(&mut content, &rendered)?;

        let styles = match styles {
            Some(styles) => {
                let rendered = render_part(&env, styles_part, &styles, &scope)?;
                Some(xml::parse(&rendered)?)
            }
            None => None,
        };

        let created = registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take_created();
        if !created.is_empty() {
            debug!("adding {} markdown styles", created.len());
            apply_styles(&mut content, &created);
        }

        archive.set(content_part, xml::to_string(&content).into_bytes());
        if let Some(styles) = styles {
            archive.set(styles_part, xml::to_string(&styles).into_bytes());
        }
        Ok(())
    }
}

/// Evaluate one part. Newlines in the output become `text:line-break` elements.
fn render_part(
    env: &Environment<'static>,
    name: &str,
    doc: &Document,
    scope: &Value,
) -> Result<String, RenderError> {
    let source = unescape_tags(&xml::to_string(doc));
    let template = env.template_from_named_str(name, &source)?;
    let rendered = template.render(scope)?;
    debug!("rendered {name} ({} bytes)", rendered.len());
    Ok(rendered.replace('\n', LINE_BREAK))
}

/// Turn `&gt;` and `&lt;` back into `>` and `<`, only inside `{{ }}` and `{% %}`
pub fn unescape_tags(source: &str) -> String {
    TEMPLATE_TAG
        .replace_all(source, |caps: &Captures<'_>| {
            caps[0].replace("&gt;", ">").replace("&lt;", "<")
        })
        .into_owned()
}

/// Replace the `office:body` of `original` with the one of `rendered`
fn splice_body(original: &mut Document, rendered: &Document) -> Result<(), RenderError> {
    let body = original
        .find_element(BODY)
        .ok_or_else(|| RenderError::MalformedInput(format!("content has no {BODY}")))?;
    let rendered_body = rendered
        .find_element(BODY)
        .ok_or_else(|| RenderError::MalformedInput(format!("rendered content has no {BODY}")))?;
    let imported = original.import_node(rendered, rendered_body);
    original.replace(body, imported);
    Ok(())
}
