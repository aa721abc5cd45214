//! Placeholder field promotion
//!
//!     Authors write template tags inside `text:text-input` widgets so that word
//!     processors keep them intact. Before a part can be rendered, each widget holding a
//!     template expression is replaced with plain template text, placed at the structural
//!     level the tag controls:
//!
//!     - a variable (`{{ name }}`) stays where it is, wrapped in a `text:span`;
//!     - a block tag (`{% for %}`, `{% if %}`) with no reference is hoisted to the
//!       highest ancestor that holds no other field, so the tag wraps whole elements
//!       instead of breaking a paragraph in half. When no ancestor below the document
//!       element holds another field, the tag stays where it is;
//!     - a field with a flow reference (`text:description="row"`, see [`flow`]) goes
//!       next to the nearest ancestor of the referenced kind.
//!
//!     Non-template widgets are left alone.
//!
//! Passes
//!
//!     1. [`FieldCounter`] counts fields per ancestor.
//!     2. [`plan`] decides, for every qualifying field, where its text goes and which node
//!        is removed. Planning never mutates the tree.
//!     3. [`apply`] performs the plan in document order.
//!
//!     Applying never changes the ancestor chain of a field that is still attached, so
//!     a plan computed up front is the same one an interleaved walk would produce. A
//!     field whose subtree was removed by an earlier promotion is skipped.

pub mod counter;
pub mod expression;
pub mod flow;

use log::debug;

pub use counter::{FieldCounter, FieldCounts};
pub use expression::{ExpressionSyntax, JinjaSyntax};
pub use flow::{FlowReference, Placement};

use crate::xml::{Document, NodeId};

/// Element used by word processors for input fields
pub const FIELD_TAG: &str = "text:text-input";
/// Attribute holding the flow reference
pub const REFERENCE_ATTRIBUTE: &str = "text:description";
pub const SPAN_TAG: &str = "text:span";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// `{{ ... }}` or any mixed content
    Variable,
    /// A lone `{% ... %}` tag
    Block,
}

impl FieldKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Variable => "variable",
            FieldKind::Block => "block",
        }
    }
}

/// Shape of the node that replaces a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Replacement {
    Text,
    Span,
}

/// What will happen to one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Promotion {
    pub field: NodeId,
    /// Field text with newlines removed
    pub expression: String,
    pub kind: FieldKind,
    pub reference: Option<FlowReference>,
    /// Node the generated text is inserted next to
    pub destination: NodeId,
    pub placement: Placement,
    /// Node detached once the text is in place
    pub removal: NodeId,
    pub replacement: Replacement,
}

/// Expression of a field and its kind, or `None` for non-template widgets
pub fn classify(
    doc: &Document,
    field: NodeId,
    syntax: &dyn ExpressionSyntax,
) -> Option<(String, FieldKind)> {
    let text = doc.first_child(field).and_then(|child| doc.text(child))?;
    let expression = text.replace('\n', "");
    if !syntax.is_expression(&expression) {
        return None;
    }
    let kind = if syntax.is_block(expression.trim()) {
        FieldKind::Block
    } else {
        FieldKind::Variable
    };
    Some((expression, kind))
}

/// Decide every promotion of a tree without touching it
pub fn plan(doc: &Document, syntax: &dyn ExpressionSyntax) -> Vec<Promotion> {
    let fields: Vec<(NodeId, String, FieldKind)> = doc
        .elements_by_tag(doc.root(), FIELD_TAG)
        .into_iter()
        .filter_map(|field| {
            classify(doc, field, syntax).map(|(expression, kind)| (field, expression, kind))
        })
        .collect();

    let mut counter = FieldCounter::new();
    for (field, _, kind) in &fields {
        counter.record(doc, *field, *kind);
    }

    fields
        .into_iter()
        .map(|(field, expression, kind)| plan_field(doc, &counter, syntax, field, expression, kind))
        .collect()
}

fn plan_field(
    doc: &Document,
    counter: &FieldCounter,
    syntax: &dyn ExpressionSyntax,
    field: NodeId,
    expression: String,
    kind: FieldKind,
) -> Promotion {
    let reference = if syntax.uses_markdown(&expression) {
        // Markdown output is made of paragraphs, so it replaces the whole paragraph
        FlowReference::parse(flow::PARAGRAPH)
    } else {
        doc.attribute(field, REFERENCE_ATTRIBUTE)
            .and_then(FlowReference::parse)
    };

    let (destination, replacement) = match &reference {
        None => match kind {
            FieldKind::Block => (hoist(doc, counter, field), Replacement::Text),
            FieldKind::Variable => (field, Replacement::Span),
        },
        Some(reference) if reference.is_supported() => (
            doc.find_ancestor(field, &reference.target).unwrap_or(field),
            Replacement::Text,
        ),
        Some(_) => (field, Replacement::Text),
    };

    let placement = reference
        .as_ref()
        .map(|reference| reference.placement)
        .unwrap_or(Placement::InPlace);

    let removal = match placement {
        Placement::Before | Placement::After => {
            doc.find_ancestor(field, flow::PARAGRAPH).unwrap_or(field)
        }
        Placement::InPlace => destination,
    };

    Promotion {
        field,
        expression,
        kind,
        reference,
        destination,
        placement,
        removal,
        replacement,
    }
}

/// Climb while the parent holds no other field, stopping below the first shared
/// ancestor. A field with no shared ancestor below the document element stays put.
fn hoist(doc: &Document, counter: &FieldCounter, field: NodeId) -> NodeId {
    let document_element = doc.document_element();
    let mut destination = field;
    for parent in doc.ancestors(field) {
        if parent == doc.root() || Some(parent) == document_element {
            break;
        }
        if counter.total(parent) > 1 {
            return destination;
        }
        destination = parent;
    }
    field
}

/// Carry out a plan. Returns how many promotions were applied.
pub fn apply(doc: &mut Document, promotions: &[Promotion]) -> usize {
    let mut applied = 0;
    for promotion in promotions {
        if !doc.is_attached(promotion.field) {
            debug!(
                "skipping field {:?}: removed by an earlier promotion",
                promotion.expression
            );
            continue;
        }

        let node = match promotion.replacement {
            Replacement::Text => doc.create_text(&promotion.expression),
            Replacement::Span => {
                let span = doc.create_element(SPAN_TAG);
                let text = doc.create_text(&promotion.expression);
                doc.append_child(span, text);
                span
            }
        };

        let inserted = match promotion.placement {
            Placement::After => doc.insert_after(promotion.destination, node),
            Placement::Before | Placement::InPlace => doc.insert_before(promotion.destination, node),
        };
        if !inserted {
            debug!(
                "skipping field {:?}: destination has no parent",
                promotion.expression
            );
            continue;
        }

        doc.detach(promotion.removal);
        debug!(
            "promoted {} field {:?} to <{}>",
            promotion.kind.as_str(),
            promotion.expression,
            doc.tag_name(promotion.destination).unwrap_or("#text")
        );
        applied += 1;
    }
    applied
}

/// Plan and apply in one go
pub fn promote(doc: &mut Document, syntax: &dyn ExpressionSyntax) -> usize {
    let promotions = plan(doc, syntax);
    apply(doc, &promotions)
}
