//! The `markdown` filter inside a full render

use odtmpl::{RenderOptions, Renderer};
use serde_json::json;

use crate::common::{body_of, field, odt, read_part};

fn occurrences(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

#[test]
fn test_markdown_replaces_its_paragraph() {
    let body = format!(
        "<text:p>Before</text:p><text:p>Notes: {}</text:p><text:p>After</text:p>",
        field("{{ notes|markdown }}")
    );
    let output = Renderer::new()
        .render_bytes(&odt(&body), &json!({ "notes": "first **bold**\n\nsecond" }))
        .unwrap();

    insta::assert_snapshot!(body_of(&output), @r#"<text:p>Before</text:p><text:p text:style-name="Standard">first <text:span text:style-name="markdown_bold">bold</text:span></text:p><text:p text:style-name="Standard"/><text:p text:style-name="Standard">second</text:p><text:p>After</text:p>"#);
}

#[test]
fn test_created_styles_are_added_once() {
    let body = format!(
        "<text:p>{}</text:p><text:p>{}</text:p>",
        field("{{ a|markdown }}"),
        field("{{ b|markdown }}")
    );
    let output = Renderer::new()
        .render_bytes(&odt(&body), &json!({ "a": "**x**", "b": "**y** and `z`" }))
        .unwrap();

    let content = read_part(&output, "content.xml");
    let styles = content
        .split("<office:automatic-styles>")
        .nth(1)
        .and_then(|rest| rest.split("</office:automatic-styles>").next())
        .unwrap();
    assert_eq!(occurrences(styles, r#"style:name="markdown_bold""#), 1);
    assert_eq!(occurrences(styles, r#"style:name="markdown_code""#), 1);
    assert_eq!(occurrences(styles, r#"style:name="P1""#), 1);
}

#[test]
fn test_plain_render_adds_no_styles() {
    let body = format!("<text:p>{}</text:p>", field("{{ a }}"));
    let template = odt(&body);
    let output = Renderer::new().render_bytes(&template, &json!({ "a": "**x**" })).unwrap();

    let content = read_part(&output, "content.xml");
    assert_eq!(occurrences(&content, "markdown_"), 0);
    assert_eq!(body_of(&output), "<text:p><text:span>**x**</text:span></text:p>");
}

#[test]
fn test_markdown_of_missing_value_is_empty() {
    let body = format!("<text:p>{}</text:p><text:p>x</text:p>", field("{{ nothing|markdown }}"));
    let output = Renderer::new().render_bytes(&odt(&body), &json!({})).unwrap();
    assert_eq!(body_of(&output), "<text:p>x</text:p>");
}

#[test]
fn test_hard_breaks_option() {
    let mut options = RenderOptions::default();
    options.markdown.hardbreaks = true;
    let body = format!("<text:p>{}</text:p>", field("{{ a|markdown }}"));
    let output = Renderer::with_options(options)
        .render_bytes(&odt(&body), &json!({ "a": "one\ntwo" }))
        .unwrap();
    assert_eq!(
        body_of(&output),
        r#"<text:p text:style-name="Standard">one<text:line-break/>two</text:p>"#
    );
}
