//! What a render does to the container around the two template parts

use odtmpl::Renderer;
use serde_json::json;
use std::io::Cursor;
use zip::{CompressionMethod, ZipArchive};

use crate::common::{entry_names, field, read_entry, OdtBuilder, MIMETYPE};

#[test]
fn test_entries_are_carried_through() {
    let template = OdtBuilder::new()
        .content(&format!("<text:p>{}</text:p>", field("{{ a }}")))
        .styles("")
        .entry("Thumbnails/thumbnail.png", &[1, 2, 3, 4], CompressionMethod::Deflated)
        .build();
    let output = Renderer::new().render_bytes(&template, &json!({ "a": "x" })).unwrap();

    assert_eq!(entry_names(&output), entry_names(&template));
    assert_eq!(read_entry(&output, "Pictures/logo.png"), read_entry(&template, "Pictures/logo.png"));
    assert_eq!(read_entry(&output, "Thumbnails/thumbnail.png"), vec![1, 2, 3, 4]);
    assert_eq!(
        read_entry(&output, "META-INF/manifest.xml"),
        read_entry(&template, "META-INF/manifest.xml")
    );
}

#[test]
fn test_mimetype_is_first_and_stored() {
    let template = OdtBuilder::default()
        .entry("content.xml", crate::common::content_xml("").as_bytes(), CompressionMethod::Deflated)
        .entry("mimetype", MIMETYPE.as_bytes(), CompressionMethod::Deflated)
        .build();
    let output = Renderer::new().render_bytes(&template, &json!({})).unwrap();

    assert_eq!(entry_names(&output), vec!["mimetype", "content.xml"]);
    let mut zip = ZipArchive::new(Cursor::new(output.as_slice())).unwrap();
    let mimetype = zip.by_index(0).unwrap();
    assert_eq!(mimetype.compression(), CompressionMethod::Stored);
}

#[test]
fn test_stored_entries_stay_stored() {
    let template = OdtBuilder::new().content("").styles("").build();
    let output = Renderer::new().render_bytes(&template, &json!({})).unwrap();

    let mut zip = ZipArchive::new(Cursor::new(output.as_slice())).unwrap();
    assert_eq!(
        zip.by_name("Pictures/logo.png").unwrap().compression(),
        CompressionMethod::Stored
    );
    assert_eq!(zip.by_name("content.xml").unwrap().compression(), CompressionMethod::Deflated);
}

#[test]
fn test_untouched_parts_keep_their_declaration() {
    let template = OdtBuilder::new().content("<text:p>plain</text:p>").styles("").build();
    let output = Renderer::new().render_bytes(&template, &json!({})).unwrap();

    let content = String::from_utf8(read_entry(&output, "content.xml")).unwrap();
    assert!(content.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?><office:document-content"#));
    assert!(content.contains(r#"<style:style style:name="P1" style:family="paragraph"/>"#));
}
