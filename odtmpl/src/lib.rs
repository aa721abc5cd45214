//! OpenDocument text files as Jinja-style templates
//!
//!     This crate renders `.odt` files written in a word processor as templates. Authors
//!     type template tags into input fields (`text:text-input`), optionally naming the
//!     scope the tag controls in the field's description (`row`, `before::paragraph`,
//!     ...). Rendering turns those fields into plain template markup at the right level
//!     of the document tree, evaluates the content and style parts with minijinja, and
//!     writes a new archive.
//!
//!     TLDR:
//!         - `odtmpl::render_template(path, &vars)` returns the rendered archive bytes.
//!         - Variables are anything `serde` can serialize.
//!         - Missing variables print nothing, whatever is done to them.
//!         - `{{ text|markdown }}` turns markdown into native paragraphs, lists and spans.
//!
//!     This is a pure lib: it never prints, reads the environment or touches files other
//!     than the template it is asked to read. The `odtmpl` binary lives in odtmpl-cli.
//!
//! Architecture
//!
//!     .
//!     ├── error.rs            # RenderError
//!     ├── archive.rs          # zip container, entry order and compression preserved
//!     ├── xml                 # arena tree, quick-xml parser, serializer
//!     ├── fields              # placeholder field promotion
//!     │   ├── expression.rs   # ExpressionSyntax: what a template tag looks like
//!     │   ├── flow.rs         # flow references (`row`, `after::cell`, ...)
//!     │   └── counter.rs      # fields per ancestor
//!     ├── engine              # Renderer, environment, silent undefined, pipeline
//!     └── markdown            # `markdown` filter: comrak -> html5ever -> ODF
//!
//! Core Algorithms
//!
//!     The interesting work is in two tree rewrites. Field promotion (./fields/mod.rs)
//!     counts template fields per ancestor and uses the counts to decide how far a block
//!     tag climbs, so that `{% if %}` ... `{% endif %}` typed into two paragraphs wrap
//!     those paragraphs instead of cutting them. The markdown converter
//!     (./markdown/mod.rs) maps HTML elements onto ODF ones and makes sure every style
//!     it refers to exists in the document.
//!
//! Testing
//!
//!     tests
//!     ├── lib.rs          # pulls the subdirectories in
//!     ├── common          # in-memory .odt builder
//!     ├── fields
//!     ├── engine
//!     └── markdown
//!
//!     Rust does not discover tests in subdirectories by itself, hence tests/lib.rs.
//!
//! Library Choices
//!
//!     zip for the container, quick-xml for reading parts, minijinja as the template
//!     engine, comrak and html5ever for markdown. The last two are behind the default
//!     `markdown` feature.

pub mod archive;
pub mod engine;
pub mod error;
pub mod fields;
pub mod markdown;
pub mod xml;

use std::io::Read;
use std::path::Path;

use serde::Serialize;

pub use engine::{RenderOptions, Renderer};
pub use error::RenderError;
pub use fields::{ExpressionSyntax, JinjaSyntax};
pub use markdown::MarkdownOptions;

/// Render the template at `path` with default options
pub fn render_template<S: Serialize>(path: &Path, variables: &S) -> Result<Vec<u8>, RenderError> {
    Renderer::new().render_path(path, variables)
}

/// Render a template read from `reader` with default options
pub fn render_reader<R: Read, S: Serialize>(
    reader: R,
    variables: &S,
) -> Result<Vec<u8>, RenderError> {
    Renderer::new().render_reader(reader, variables)
}
