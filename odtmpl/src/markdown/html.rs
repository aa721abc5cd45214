//! HTML produced by comrak, parsed with html5ever and copied into the arena tree

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::error::RenderError;
use crate::xml::{Attribute, Document, NodeId};

/// Name of the element holding the imported fragment
pub const CONTAINER: &str = "html";

/// Parse an HTML fragment. The children of `<body>` end up under a [`CONTAINER`]
/// element, which is returned along with the document.
pub fn parse_fragment(html: &str) -> Result<(Document, NodeId), RenderError> {
    let dom = parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut html.as_bytes())?;

    let mut doc = Document::new();
    let container = doc.create_element(CONTAINER);
    doc.append_child(doc.root(), container);

    if let Some(body) = find_body(&dom.document) {
        for child in body.children.borrow().iter() {
            import(&mut doc, container, child);
        }
    }
    Ok((doc, container))
}

fn find_body(handle: &Handle) -> Option<Handle> {
    if let NodeData::Element { name, .. } = &handle.data {
        if &*name.local == "body" {
            return Some(handle.clone());
        }
    }
    handle
        .children
        .borrow()
        .iter()
        .find_map(find_body)
}

fn import(doc: &mut Document, parent: NodeId, handle: &Handle) {
    match &handle.data {
        NodeData::Element { name, attrs, .. } => {
            let attributes = attrs
                .borrow()
                .iter()
                .map(|attr| Attribute::new(&*attr.name.local, &*attr.value))
                .collect();
            let element = doc.create_element_with(&name.local, attributes);
            doc.append_child(parent, element);
            for child in handle.children.borrow().iter() {
                import(doc, element, child);
            }
        }
        NodeData::Text { contents } => {
            let text = doc.create_text(&contents.borrow());
            doc.append_child(parent, text);
        }
        _ => {}
    }
}
