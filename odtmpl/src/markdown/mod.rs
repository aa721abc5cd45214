//! Markdown to ODF text markup
//!
//!     Backs the `markdown` template filter. The conversion is a tree rewrite rather than
//!     a renderer of its own:
//!
//!         markdown --comrak--> HTML --html5ever--> tree --tag map--> ODF markup
//!
//!     Each HTML element listed in [`map::TAG_MAP`] is swapped for its ODF counterpart,
//!     keeping its children. Elements that are not listed are unwrapped, so their text
//!     survives even when their structure cannot be expressed. Styles the output refers
//!     to are recorded in the render's [`StyleRegistry`]; a style is only created when
//!     the document does not define it already.
//!
//!     The output is a string of top-level ODF elements, ready to be dropped into
//!     `office:text`. Blocks are separated by an empty Standard paragraph, and newlines
//!     inside preformatted paragraphs become `text:line-break` elements.
//!
//! Feature
//!
//!     The comrak and html5ever dependencies sit behind the `markdown` feature (on by
//!     default). Without it [`convert`] fails with a configuration error.

#[cfg(feature = "markdown")]
pub mod html;
pub mod map;
pub mod styles;

pub use styles::{apply_styles, StyleDefinition, StyleRegistry};

/// Options passed to the markdown parser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownOptions {
    /// `~~text~~` strikethrough
    pub strikethrough: bool,
    /// Bare URLs become links
    pub autolink: bool,
    /// Every newline inside a paragraph becomes a line break
    pub hardbreaks: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        MarkdownOptions {
            strikethrough: true,
            autolink: true,
            hardbreaks: false,
        }
    }
}

pub const LINE_BREAK: &str = "<text:line-break/>";
pub const EMPTY_PARAGRAPH: &str = r#"<text:p text:style-name="Standard"/>"#;

#[cfg(feature = "markdown")]
pub use convert_impl::convert;

#[cfg(not(feature = "markdown"))]
pub fn convert(
    _text: &str,
    _options: &MarkdownOptions,
    _registry: &mut StyleRegistry,
) -> Result<String, crate::error::RenderError> {
    Err(crate::error::RenderError::Configuration(
        "markdown support is not available: odtmpl was built without the `markdown` feature"
            .to_string(),
    ))
}


#[cfg(feature = "markdown")]
mod convert_impl {
    use std::collections::HashSet;

    use comrak::{markdown_to_html, ComrakOptions};
    use log::debug;

    use super::html::parse_fragment;
    use super::map::{self, TAG_MAP};
    use super::{MarkdownOptions, StyleRegistry, EMPTY_PARAGRAPH, LINE_BREAK};
    use crate::error::RenderError;
    use crate::xml::{node_to_string, Document, NodeId};

    const LIST: &str = "text:list";
    const LIST_ITEM: &str = "text:list-item";
    const PARAGRAPH: &str = "text:p";
    const HEADING: &str = "text:h";
    const STYLE_NAME: &str = "text:style-name";

    /// Convert markdown text into ODF markup, registering the styles it needs
    pub fn convert(
        text: &str,
        options: &MarkdownOptions,
        registry: &mut StyleRegistry,
    ) -> Result<String, RenderError> {
        let html = markdown_to_html(text, &comrak_options(options));
        let (mut doc, container) = parse_fragment(&html)?;

        let mut cache: HashSet<&'static str> = HashSet::new();
        for mapping in TAG_MAP {
            for element in doc.elements_by_tag(container, mapping.html) {
                let replacement = doc.create_element(mapping.odt);
                for (key, value) in mapping.style_attributes {
                    doc.set_attribute(replacement, key, value);
                }
                for (key, value) in mapping.attributes {
                    doc.set_attribute(replacement, key, value);
                }
                if mapping.html == "a" {
                    if let Some(href) = doc.attribute(element, "href").map(str::to_string) {
                        doc.set_attribute(replacement, "xlink:href", &href);
                    }
                }
                if let Some(style) = &mapping.style {
                    doc.set_attribute(replacement, STYLE_NAME, style.name);
                    if cache.insert(style.name) && registry.ensure(style) {
                        debug!("created style {}", style.name);
                    }
                }
                doc.move_children(element, replacement);
                doc.replace(element, replacement);
            }
        }

        absorb_break_newlines(&mut doc, container);
        unwrap_unmapped(&mut doc, container);
        flatten_quotations(&mut doc, container);
        tidy_lists(&mut doc, container);
        separate_blocks(&mut doc, container);

        Ok(doc
            .children(container)
            .iter()
            .map(|child| serialize_block(&doc, *child))
            .collect())
    }

    fn comrak_options(options: &MarkdownOptions) -> ComrakOptions<'static> {
        let mut comrak = ComrakOptions::default();
        comrak.extension.strikethrough = options.strikethrough;
        comrak.extension.autolink = options.autolink;
        comrak.render.hardbreaks = options.hardbreaks;
        comrak
    }

    /// Replace an element by its children
    fn unwrap(doc: &mut Document, node: NodeId) {
        for child in doc.children(node).to_vec() {
            doc.insert_before(node, child);
        }
        doc.detach(node);
    }

    /// A hard break is followed by the newline it was written with. That newline
    /// would become a second break once the template output is encoded.
    fn absorb_break_newlines(doc: &mut Document, container: NodeId) {
        for line_break in doc.elements_by_tag(container, "text:line-break") {
            let Some(next) = doc.next_sibling(line_break) else {
                continue;
            };
            let stripped = doc
                .text(next)
                .and_then(|text| text.strip_prefix('\n'))
                .map(str::to_string);
            if let Some(stripped) = stripped {
                doc.set_text(next, &stripped);
            }
        }
    }

    /// Mapped elements carry a namespace prefix; anything else is leftover HTML
    fn unwrap_unmapped(doc: &mut Document, container: NodeId) {
        for node in doc.descendants(container) {
            let leftover = doc.tag_name(node).is_some_and(|name| !name.contains(':'));
            if leftover {
                debug!("unwrapping unmapped <{}>", doc.tag_name(node).unwrap_or_default());
                unwrap(doc, node);
            }
        }
    }

    fn is_quotation(doc: &Document, node: NodeId) -> bool {
        doc.tag_name(node) == Some(PARAGRAPH)
            && doc.attribute(node, STYLE_NAME) == Some(map::QUOTATIONS)
    }

    /// Paragraphs cannot nest: the paragraphs of a quotation are merged into it,
    /// separated by line breaks. Innermost quotations go first.
    fn flatten_quotations(doc: &mut Document, container: NodeId) {
        let quotations: Vec<NodeId> = doc
            .descendants(container)
            .into_iter()
            .filter(|node| is_quotation(doc, *node))
            .collect();
        for quote in quotations.into_iter().rev() {
            drop_blank_text(doc, quote);
            let inner: Vec<NodeId> = doc
                .children(quote)
                .iter()
                .copied()
                .filter(|child| doc.tag_name(*child) == Some(PARAGRAPH))
                .collect();
            for (index, paragraph) in inner.into_iter().enumerate() {
                if index > 0 {
                    let line_break = doc.create_element("text:line-break");
                    doc.insert_before(paragraph, line_break);
                }
                unwrap(doc, paragraph);
            }
        }
    }

    fn drop_blank_text(doc: &mut Document, node: NodeId) {
        for child in doc.children(node).to_vec() {
            if doc.text(child).is_some_and(|text| text.trim().is_empty()) {
                doc.detach(child);
            }
        }
    }

    fn is_block(doc: &Document, node: NodeId) -> bool {
        matches!(doc.tag_name(node), Some(PARAGRAPH | HEADING | LIST))
    }

    /// Lists only hold list items, and list items only hold blocks
    fn tidy_lists(doc: &mut Document, container: NodeId) {
        for list in doc.elements_by_tag(container, LIST) {
            drop_blank_text(doc, list);
        }
        for item in doc.elements_by_tag(container, LIST_ITEM) {
            drop_blank_text(doc, item);

            let mut runs: Vec<Vec<NodeId>> = Vec::new();
            let mut current: Vec<NodeId> = Vec::new();
            for child in doc.children(item).to_vec() {
                if is_block(doc, child) {
                    if !current.is_empty() {
                        runs.push(std::mem::take(&mut current));
                    }
                } else {
                    current.push(child);
                }
            }
            if !current.is_empty() {
                runs.push(current);
            }

            for run in runs {
                let paragraph = doc.create_element(PARAGRAPH);
                doc.set_attribute(paragraph, STYLE_NAME, map::STANDARD);
                doc.insert_before(run[0], paragraph);
                for node in &run {
                    doc.append_child(paragraph, *node);
                }
                // A nested list follows the item text on its own line
                if let Some(last) = run.last() {
                    let trimmed = doc
                        .text(*last)
                        .map(|text| text.trim_end_matches('\n').to_string());
                    if let Some(trimmed) = trimmed {
                        doc.set_text(*last, &trimmed);
                    }
                }
            }
        }
    }

    /// Whitespace between two top-level blocks is the blank line separating them;
    /// leading and trailing whitespace is dropped
    fn separate_blocks(doc: &mut Document, container: NodeId) {
        let children = doc.children(container).to_vec();
        let blank: Vec<bool> = children
            .iter()
            .map(|child| doc.text(*child).is_some_and(|text| text.trim().is_empty()))
            .collect();
        let first = blank.iter().position(|b| !b).unwrap_or(children.len());
        let last = blank.iter().rposition(|b| !b).unwrap_or(0);

        let mut previous_blank = false;
        for (index, child) in children.iter().enumerate() {
            if !blank[index] {
                previous_blank = false;
                continue;
            }
            // Unwrapped elements can leave several blank runs next to each other
            if index < first || index > last || previous_blank {
                doc.detach(*child);
            } else {
                doc.set_text(*child, "\n\n");
                previous_blank = true;
            }
        }
    }

    fn serialize_block(doc: &Document, node: NodeId) -> String {
        let mut markup = node_to_string(doc, node);
        if doc.attribute(node, STYLE_NAME) == Some(map::PREFORMATTED) {
            markup = markup.replace('\n', LINE_BREAK);
        }
        markup.replace("\n\n", EMPTY_PARAGRAPH)
    }

}
