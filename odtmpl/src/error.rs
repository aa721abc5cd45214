//! Error types for render operations

use std::fmt;

/// Errors that can occur while rendering a template archive
#[derive(Debug)]
pub enum RenderError {
    /// A required collaborator is unavailable (e.g. markdown support compiled out)
    Configuration(String),
    /// The archive or one of its XML parts is not usable input
    MalformedInput(String),
    /// Error while reading or writing the zip container
    Archive(String),
    /// I/O error while reading the template or writing the result
    Io(String),
    /// Error raised by the templating engine, passed through unchanged
    Template(minijinja::Error),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Configuration(msg) => write!(f, "Configuration error: {msg}"),
            RenderError::MalformedInput(msg) => write!(f, "Malformed input: {msg}"),
            RenderError::Archive(msg) => write!(f, "Archive error: {msg}"),
            RenderError::Io(msg) => write!(f, "I/O error: {msg}"),
            RenderError::Template(err) => write!(f, "Template error: {err}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Template(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for RenderError {
    fn from(err: std::io::Error) -> Self {
        RenderError::Io(err.to_string())
    }
}

impl From<zip::result::ZipError> for RenderError {
    fn from(err: zip::result::ZipError) -> Self {
        RenderError::Archive(err.to_string())
    }
}

impl From<quick_xml::Error> for RenderError {
    fn from(err: quick_xml::Error) -> Self {
        RenderError::MalformedInput(format!("XML parsing error: {err}"))
    }
}

/// Template errors are passed through, except for configuration errors raised from
/// inside a filter, which keep their kind
impl From<minijinja::Error> for RenderError {
    fn from(err: minijinja::Error) -> Self {
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            if let Some(RenderError::Configuration(msg)) = cause.downcast_ref::<RenderError>() {
                return RenderError::Configuration(msg.clone());
            }
            source = cause.source();
        }
        RenderError::Template(err)
    }
}
