//! Shared configuration loader for the odtmpl toolchain.
//!
//! `defaults/odtmpl.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`OdtmplConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use odtmpl::{MarkdownOptions, RenderOptions};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/odtmpl.default.toml");

/// Top-level configuration consumed by odtmpl applications.
#[derive(Debug, Clone, Deserialize)]
pub struct OdtmplConfig {
    pub render: RenderConfig,
    pub markdown: MarkdownConfig,
    pub logging: LoggingConfig,
}

/// Mirrors the knobs exposed by the renderer.
#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    pub content_part: String,
    pub styles_part: String,
    pub pad_width: usize,
    pub autoescape: bool,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MarkdownConfig {
    pub strikethrough: bool,
    pub autolink: bool,
    pub hardbreaks: bool,
}

impl From<MarkdownConfig> for MarkdownOptions {
    fn from(config: MarkdownConfig) -> Self {
        MarkdownOptions {
            strikethrough: config.strikethrough,
            autolink: config.autolink,
            hardbreaks: config.hardbreaks,
        }
    }
}

impl From<&OdtmplConfig> for RenderOptions {
    fn from(config: &OdtmplConfig) -> Self {
        RenderOptions {
            content_part: config.render.content_part.clone(),
            styles_part: config.render.styles_part.clone(),
            pad_width: config.render.pad_width,
            autoescape: config.render.autoescape,
            markdown: config.markdown.into(),
        }
    }
}

impl From<OdtmplConfig> for RenderOptions {
    fn from(config: OdtmplConfig) -> Self {
        RenderOptions {
            content_part: config.render.content_part,
            styles_part: config.render.styles_part,
            pad_width: config.render.pad_width,
            autoescape: config.render.autoescape,
            markdown: config.markdown.into(),
        }
    }
}

/// Log verbosity for binaries. `RUST_LOG` still wins when set.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: LogLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<OdtmplConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<OdtmplConfig, ConfigError> {
    Loader::new().build()
}
