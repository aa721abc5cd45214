//! Template environment: undefined handling, escaping and the built-in filters
//!
//! `int`, `float` and `default` are overridden so the silent sentinel counts as missing.

use std::sync::{Arc, Mutex, PoisonError};

use minijinja::{AutoEscape, Environment, Error, ErrorKind, State, UndefinedBehavior, Value};

use super::undefined::is_missing;
use super::RenderOptions;
use crate::markdown::{self, MarkdownOptions, StyleRegistry};

/// Base environment shared by every render of a [`super::Renderer`]
pub fn base_environment(options: &RenderOptions) -> Environment<'static> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Chainable);

    let autoescape = options.autoescape;
    env.set_auto_escape_callback(move |_| {
        if autoescape {
            AutoEscape::Html
        } else {
            AutoEscape::None
        }
    });

    let default_width = options.pad_width;
    env.add_filter("pad", move |value: Value, width: Option<usize>| {
        pad(&value.to_string(), width.unwrap_or(default_width))
    });
    env.add_filter("int", |state: &State, value: Value| -> Result<Value, Error> {
        if is_missing(&value) {
            return Ok(Value::from(0));
        }
        minijinja::filters::int(state, &value)
    });
    env.add_filter("float", |state: &State, value: Value| -> Result<Value, Error> {
        if is_missing(&value) {
            return Ok(Value::from(0.0));
        }
        minijinja::filters::float(state, &value)
    });
    env.add_filter("default", default);
    env.add_filter("d", default);
    env.add_test("defined", |value: Value| !is_missing(&value));
    env.add_test("undefined", |value: Value| is_missing(&value));
    env
}

/// Register the `markdown` filter for one render
pub fn add_markdown_filter(
    env: &mut Environment<'static>,
    options: MarkdownOptions,
    registry: Arc<Mutex<StyleRegistry>>,
) {
    env.add_filter("markdown", move |value: Value| -> Result<Value, Error> {
        let Some(text) = value.as_str() else {
            return Ok(Value::from(""));
        };
        let mut registry = registry.lock().unwrap_or_else(PoisonError::into_inner);
        let markup = markdown::convert(text, &options, &mut registry).map_err(|err| {
            Error::new(ErrorKind::InvalidOperation, err.to_string()).with_source(err)
        })?;
        Ok(Value::from_safe_string(markup))
    });
}

/// Zero-pad the string form of a value to `width` characters. A leading sign stays in
/// front; longer values are returned unchanged.
pub fn pad(value: &str, width: usize) -> String {
    let len = value.chars().count();
    if len >= width {
        return value.to_string();
    }
    let zeros = "0".repeat(width - len);
    match value.strip_prefix(['+', '-']) {
        Some(rest) => format!("{}{zeros}{rest}", &value[..1]),
        None => format!("{zeros}{value}"),
    }
}

/// `default` that also treats the silent sentinel as missing. With `boolean` set,
/// falsy values are replaced too.
fn default(value: Value, other: Option<Value>, boolean: Option<bool>) -> Value {
    let replace = is_missing(&value) || (boolean.unwrap_or(false) && !value.is_true());
    if replace {
        other.unwrap_or_else(|| Value::from(""))
    } else {
        value
    }
}
