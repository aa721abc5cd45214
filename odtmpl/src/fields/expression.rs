//! Template expression detection
//!
//! Every question the promotion engine asks about the text inside a widget goes through
//! [`ExpressionSyntax`], so a different delimiter set only needs a new implementation
//! of this trait.

use once_cell::sync::Lazy;
use regex::Regex;

static EXPRESSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{.*?\}").expect("valid regex for template expressions"));
static BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\{%.*%\}+$").expect("valid regex for block tags"));
static MARKDOWN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\|\s*markdown\b").expect("valid regex for the markdown filter"));

/// Predicates over the text of a placeholder field
pub trait ExpressionSyntax {
    /// Whether the text holds template markup at all
    fn is_expression(&self, text: &str) -> bool;

    /// Whether the (already trimmed) text is a single control-flow tag
    fn is_block(&self, text: &str) -> bool;

    /// Whether the expression pipes its value through the `markdown` filter
    fn uses_markdown(&self, text: &str) -> bool;
}

/// `{{ ... }}` / `{% ... %}` delimiters as used by minijinja
#[derive(Debug, Clone, Copy, Default)]
pub struct JinjaSyntax;

impl ExpressionSyntax for JinjaSyntax {
    fn is_expression(&self, text: &str) -> bool {
        EXPRESSION.is_match(text)
    }

    fn is_block(&self, text: &str) -> bool {
        BLOCK.is_match(text)
    }

    fn uses_markdown(&self, text: &str) -> bool {
        MARKDOWN.is_match(text)
    }
}
