//! quick-xml event stream into the arena tree

use std::borrow::Cow;

use quick_xml::events::{BytesDecl, BytesStart, Event};
use quick_xml::Reader;

use super::dom::{Attribute, Document, NodeId};
use crate::error::RenderError;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Parse raw part bytes. The part must be UTF-8; a leading byte order mark is ignored.
pub fn parse_bytes(bytes: &[u8]) -> Result<Document, RenderError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let source = std::str::from_utf8(bytes)
        .map_err(|e| RenderError::MalformedInput(format!("part is not valid UTF-8: {e}")))?;
    parse(source)
}

/// Parse a well-formed XML document. Whitespace text is kept verbatim.
pub fn parse(source: &str) -> Result<Document, RenderError> {
    let mut reader = Reader::from_str(source);
    reader.trim_text(false);

    let mut doc = Document::new();
    let mut stack: Vec<NodeId> = vec![doc.root()];

    loop {
        let event = reader.read_event()?;
        let parent = *stack.last().unwrap_or(&doc.root());
        match event {
            Event::Decl(decl) => doc.set_declaration(Some(declaration(&decl)?)),
            Event::Start(start) => {
                let element = element(&mut doc, &start)?;
                attach(&mut doc, parent, element)?;
                stack.push(element);
            }
            Event::Empty(start) => {
                let element = element(&mut doc, &start)?;
                attach(&mut doc, parent, element)?;
            }
            Event::End(_) => {
                if stack.len() <= 1 {
                    return Err(RenderError::MalformedInput(
                        "unexpected closing tag".to_string(),
                    ));
                }
                stack.pop();
            }
            Event::Text(text) => {
                let text = text.unescape()?;
                push_text(&mut doc, parent, &text)?;
            }
            Event::CData(cdata) => {
                let raw = cdata.into_inner();
                let text = utf8(&raw)?;
                push_text(&mut doc, parent, text)?;
            }
            Event::Comment(comment) => {
                let raw = comment.into_inner();
                let node = doc.create_comment(utf8(&raw)?);
                doc.append_child(parent, node);
            }
            Event::PI(pi) => {
                let raw = pi.into_inner();
                let node = doc.create_processing_instruction(utf8(&raw)?);
                doc.append_child(parent, node);
            }
            Event::DocType(doctype) => {
                let raw = doctype.into_inner();
                let node = doc.create_doctype(utf8(&raw)?.trim());
                doc.append_child(parent, node);
            }
            Event::Eof => break,
        }
    }

    if stack.len() != 1 {
        return Err(RenderError::MalformedInput(
            "unexpected end of document: unclosed element".to_string(),
        ));
    }
    if doc.document_element().is_none() {
        return Err(RenderError::MalformedInput(
            "document has no root element".to_string(),
        ));
    }
    Ok(doc)
}

fn utf8(raw: &[u8]) -> Result<&str, RenderError> {
    std::str::from_utf8(raw)
        .map_err(|e| RenderError::MalformedInput(format!("invalid UTF-8 in markup: {e}")))
}

fn element(doc: &mut Document, start: &BytesStart<'_>) -> Result<NodeId, RenderError> {
    let name = start.name();
    let name = utf8(name.as_ref())?.to_string();

    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr
            .map_err(|e| RenderError::MalformedInput(format!("XML attribute error: {e}")))?;
        let key = utf8(attr.key.as_ref())?.to_string();
        let value: Cow<'_, str> = attr.unescape_value()?;
        attributes.push(Attribute::new(key, value.into_owned()));
    }

    Ok(doc.create_element_with(&name, attributes))
}

/// Only one element may sit at the top level
fn attach(doc: &mut Document, parent: NodeId, element: NodeId) -> Result<(), RenderError> {
    if parent == doc.root() && doc.document_element().is_some() {
        return Err(RenderError::MalformedInput(
            "document has more than one root element".to_string(),
        ));
    }
    doc.append_child(parent, element);
    Ok(())
}

fn push_text(doc: &mut Document, parent: NodeId, text: &str) -> Result<(), RenderError> {
    if text.is_empty() {
        return Ok(());
    }
    if parent == doc.root() {
        if text.trim().is_empty() {
            return Ok(());
        }
        return Err(RenderError::MalformedInput(
            "text outside of the root element".to_string(),
        ));
    }
    let node = doc.create_text(text);
    doc.append_child(parent, node);
    Ok(())
}

fn declaration(decl: &BytesDecl<'_>) -> Result<String, RenderError> {
    let version = decl.version()?;
    let mut out = format!("version=\"{}\"", utf8(&version)?);
    // Parts are always written back as UTF-8
    if decl.encoding().is_some() {
        out.push_str(" encoding=\"UTF-8\"");
    }
    if let Some(standalone) = decl.standalone() {
        let standalone = standalone?;
        out.push_str(&format!(" standalone=\"{}\"", utf8(&standalone)?));
    }
    Ok(out)
}
