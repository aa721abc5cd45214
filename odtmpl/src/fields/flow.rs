//! Flow references: the author-facing names for the scope a field controls
//!
//! A field's `text:description` attribute names the element its tag should wrap, e.g.
//! `row` for a `{% for %}` that repeats a table row. The optional `before::`/`after::`
//! prefix moves the tag to one side of that element while leaving the element in place.

pub const PARAGRAPH: &str = "text:p";
pub const TABLE_ROW: &str = "table:table-row";
pub const TABLE_CELL: &str = "table:table-cell";

/// Canonical tags a reference can promote to
pub const SUPPORTED_SCOPES: &[&str] = &[PARAGRAPH, TABLE_ROW, TABLE_CELL];

const FLOW_REFERENCES: &[(&str, &str)] = &[
    ("text:p", PARAGRAPH),
    ("paragraph", PARAGRAPH),
    ("before::paragraph", PARAGRAPH),
    ("after::paragraph", PARAGRAPH),
    ("table:table-row", TABLE_ROW),
    ("table-row", TABLE_ROW),
    ("row", TABLE_ROW),
    ("before::table-row", TABLE_ROW),
    ("after::table-row", TABLE_ROW),
    ("before::row", TABLE_ROW),
    ("after::row", TABLE_ROW),
    ("table:table-cell", TABLE_CELL),
    ("table-cell", TABLE_CELL),
    ("cell", TABLE_CELL),
    ("before::table-cell", TABLE_CELL),
    ("after::table-cell", TABLE_CELL),
    ("before::cell", TABLE_CELL),
    ("after::cell", TABLE_CELL),
];

/// Where the generated tag goes relative to the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Before,
    After,
    /// The tag takes the destination's place
    InPlace,
}

impl Placement {
    pub fn as_str(self) -> &'static str {
        match self {
            Placement::Before => "before",
            Placement::After => "after",
            Placement::InPlace => "in-place",
        }
    }
}

/// A parsed `text:description` value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowReference {
    /// Trimmed reference as written by the author
    pub raw: String,
    pub placement: Placement,
    /// Canonical tag, or the raw reference when it is not a known name
    pub target: String,
}

impl FlowReference {
    /// Parse a reference. Empty or whitespace-only input means "no reference".
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        let placement = if raw.starts_with("after::") {
            Placement::After
        } else if raw.starts_with("before::") {
            Placement::Before
        } else {
            Placement::InPlace
        };
        Some(FlowReference {
            raw: raw.to_string(),
            placement,
            target: resolve(raw).to_string(),
        })
    }

    /// Whether the target is one of [`SUPPORTED_SCOPES`]
    pub fn is_supported(&self) -> bool {
        is_supported_scope(&self.target)
    }
}

/// Map a reference to its canonical tag; unknown references map to themselves
pub fn resolve(reference: &str) -> &str {
    FLOW_REFERENCES
        .iter()
        .find(|(name, _)| *name == reference)
        .map(|(_, tag)| *tag)
        .unwrap_or(reference)
}

pub fn is_supported_scope(tag: &str) -> bool {
    SUPPORTED_SCOPES.contains(&tag)
}
