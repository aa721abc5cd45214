//! Styles referenced by converted markdown
//!
//! The `markdown` filter runs while the template is being evaluated, long after the
//! content tree was serialized, so it cannot add style nodes to that tree directly.
//! Instead every conversion of one render records what it needs here, and the pipeline
//! writes the new `style:style` nodes into `office:automatic-styles` once both parts
//! are rendered.

use std::collections::BTreeSet;

use super::map::StyleSpec;
use crate::xml::{Attribute, Document, NodeId};

pub const AUTOMATIC_STYLES: &str = "office:automatic-styles";
pub const COMMON_STYLES: &str = "office:styles";
const BODY: &str = "office:body";
const STYLE_NAME: &str = "style:name";

/// A style created during a render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleDefinition {
    pub name: String,
    pub family: String,
    pub properties: Vec<(String, String)>,
}

impl From<&StyleSpec> for StyleDefinition {
    fn from(spec: &StyleSpec) -> Self {
        StyleDefinition {
            name: spec.name.to_string(),
            family: spec.family.to_string(),
            properties: spec
                .properties
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
        }
    }
}

/// Style names known to one render, and the styles it created
#[derive(Debug, Default)]
pub struct StyleRegistry {
    known: BTreeSet<String>,
    created: Vec<StyleDefinition>,
}

impl StyleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from the automatic styles of the content part and the common styles of the
    /// style part
    pub fn from_parts(content: &Document, styles: Option<&Document>) -> Self {
        let mut registry = Self::new();
        registry.seed(content, AUTOMATIC_STYLES);
        if let Some(styles) = styles {
            registry.seed(styles, COMMON_STYLES);
        }
        registry
    }

    fn seed(&mut self, doc: &Document, container: &str) {
        for holder in doc.elements_by_tag(doc.root(), container) {
            for child in doc.children(holder) {
                if let Some(name) = doc.attribute(*child, STYLE_NAME) {
                    self.known.insert(name.to_string());
                }
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.known.contains(name)
    }

    /// Make sure a style exists, creating it when it is unknown. Returns `true` when
    /// the style was created by this call.
    pub fn ensure(&mut self, spec: &StyleSpec) -> bool {
        if self.known.contains(spec.name) {
            return false;
        }
        self.known.insert(spec.name.to_string());
        self.created.push(StyleDefinition::from(spec));
        true
    }

    pub fn created(&self) -> &[StyleDefinition] {
        &self.created
    }

    pub fn take_created(&mut self) -> Vec<StyleDefinition> {
        std::mem::take(&mut self.created)
    }
}

/// Append style nodes to the content part's `office:automatic-styles`, creating that
/// container right before `office:body` when the part has none
pub fn apply_styles(doc: &mut Document, styles: &[StyleDefinition]) {
    if styles.is_empty() {
        return;
    }
    let Some(container) = automatic_styles(doc) else {
        return;
    };
    for style in styles {
        let node = doc.create_element_with(
            "style:style",
            vec![
                Attribute::new(STYLE_NAME, style.name.as_str()),
                Attribute::new("style:family", style.family.as_str()),
                Attribute::new("style:parent-style-name", "Standard"),
            ],
        );
        if !style.properties.is_empty() {
            let properties = doc.create_element_with(
                "style:text-properties",
                style
                    .properties
                    .iter()
                    .map(|(key, value)| Attribute::new(key.as_str(), value.as_str()))
                    .collect(),
            );
            doc.append_child(node, properties);
        }
        doc.append_child(container, node);
    }
}

fn automatic_styles(doc: &mut Document) -> Option<NodeId> {
    if let Some(existing) = doc.find_element(AUTOMATIC_STYLES) {
        return Some(existing);
    }
    let container = doc.create_element(AUTOMATIC_STYLES);
    match doc.find_element(BODY) {
        Some(body) => {
            doc.insert_before(body, container);
        }
        None => {
            let root = doc.document_element()?;
            doc.append_child(root, container);
        }
    }
    Some(container)
}
