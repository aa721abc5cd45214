//! HTML tag to ODF element mapping

/// A named style the converted markup depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleSpec {
    pub name: &'static str,
    /// `style:family`; `text` for spans, `paragraph` for block styles
    pub family: &'static str,
    /// Attributes of the `style:text-properties` child
    pub properties: &'static [(&'static str, &'static str)],
}

/// How one HTML tag is rewritten
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagMapping {
    pub html: &'static str,
    pub odt: &'static str,
    /// `text:` attributes referring to styles. When `style` is set, its name is also
    /// written as `text:style-name`.
    pub style_attributes: &'static [(&'static str, &'static str)],
    /// Other fixed attributes
    pub attributes: &'static [(&'static str, &'static str)],
    /// Style that must exist in the document for the element to render as intended
    pub style: Option<StyleSpec>,
}

pub const STANDARD: &str = "Standard";
pub const PREFORMATTED: &str = "Preformatted_20_Text";
pub const QUOTATIONS: &str = "Quotations";

const MONOSPACE: &[(&str, &str)] = &[
    ("style:font-name", "Liberation Mono"),
    ("style:font-name-asian", "Liberation Mono"),
    ("style:font-name-complex", "Liberation Mono"),
];

pub const BOLD: StyleSpec = StyleSpec {
    name: "markdown_bold",
    family: "text",
    properties: &[
        ("fo:font-weight", "bold"),
        ("style:font-weight-asian", "bold"),
        ("style:font-weight-complex", "bold"),
    ],
};

pub const ITALIC: StyleSpec = StyleSpec {
    name: "markdown_italic",
    family: "text",
    properties: &[
        ("fo:font-style", "italic"),
        ("style:font-style-asian", "italic"),
        ("style:font-style-complex", "italic"),
    ],
};

pub const STRIKETHROUGH: StyleSpec = StyleSpec {
    name: "markdown_strikethrough",
    family: "text",
    properties: &[("style:text-line-through-style", "solid")],
};

pub const CODE: StyleSpec = StyleSpec {
    name: "markdown_code",
    family: "text",
    properties: MONOSPACE,
};

pub const PREFORMATTED_STYLE: StyleSpec = StyleSpec {
    name: PREFORMATTED,
    family: "paragraph",
    properties: MONOSPACE,
};

/// The `text:style-name` of a span comes from its style
const fn span(html: &'static str, style: StyleSpec) -> TagMapping {
    TagMapping {
        html,
        odt: "text:span",
        style_attributes: &[],
        attributes: &[],
        style: Some(style),
    }
}

const fn heading(
    html: &'static str,
    style_attributes: &'static [(&'static str, &'static str)],
) -> TagMapping {
    TagMapping {
        html,
        odt: "text:h",
        style_attributes,
        attributes: &[],
        style: None,
    }
}

/// Mapping table, applied in order
pub const TAG_MAP: &[TagMapping] = &[
    TagMapping {
        html: "p",
        odt: "text:p",
        style_attributes: &[("text:style-name", STANDARD)],
        attributes: &[],
        style: None,
    },
    span("strong", BOLD),
    span("b", BOLD),
    span("em", ITALIC),
    span("i", ITALIC),
    span("del", STRIKETHROUGH),
    span("s", STRIKETHROUGH),
    span("code", CODE),
    TagMapping {
        html: "pre",
        odt: "text:p",
        style_attributes: &[("text:style-name", PREFORMATTED)],
        attributes: &[],
        style: Some(PREFORMATTED_STYLE),
    },
    TagMapping {
        html: "a",
        odt: "text:a",
        style_attributes: &[],
        attributes: &[("xlink:type", "simple")],
        style: None,
    },
    heading("h1", &[("text:style-name", "Heading_20_1"), ("text:outline-level", "1")]),
    heading("h2", &[("text:style-name", "Heading_20_2"), ("text:outline-level", "2")]),
    heading("h3", &[("text:style-name", "Heading_20_3"), ("text:outline-level", "3")]),
    heading("h4", &[("text:style-name", "Heading_20_4"), ("text:outline-level", "4")]),
    heading("h5", &[("text:style-name", "Heading_20_5"), ("text:outline-level", "5")]),
    heading("h6", &[("text:style-name", "Heading_20_6"), ("text:outline-level", "6")]),
    plain("ul", "text:list"),
    plain("ol", "text:list"),
    plain("li", "text:list-item"),
    plain("br", "text:line-break"),
    TagMapping {
        html: "blockquote",
        odt: "text:p",
        style_attributes: &[("text:style-name", QUOTATIONS)],
        attributes: &[],
        style: None,
    },
];

const fn plain(html: &'static str, odt: &'static str) -> TagMapping {
    TagMapping {
        html,
        odt,
        style_attributes: &[],
        attributes: &[],
        style: None,
    }
}
