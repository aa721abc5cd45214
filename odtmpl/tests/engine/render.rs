//! End-to-end renders of in-memory templates

use odtmpl::fields::{ExpressionSyntax, JinjaSyntax};
use odtmpl::{RenderError, RenderOptions, Renderer};
use serde::Serialize;
use serde_json::json;

use crate::common::{body_of, field, field_ref, inner_of, odt, read_part, OdtBuilder};

fn render(body: &str, variables: serde_json::Value) -> String {
    let output = Renderer::new().render_bytes(&odt(body), &variables).unwrap();
    body_of(&output)
}

#[test]
fn test_variable_substitution() {
    let body = format!("<text:p>Dear {},</text:p>", field("{{ name }}"));
    assert_eq!(
        render(&body, json!({ "name": "Ada" })),
        "<text:p>Dear <text:span>Ada</text:span>,</text:p>"
    );
}

#[test]
fn test_literal_text_survives_empty_variables() {
    let body = format!(
        "<text:p text:style-name=\"P1\">Invoice {}</text:p><text:p>Thanks</text:p>",
        field("{{ number }}")
    );
    assert_eq!(
        render(&body, json!({})),
        "<text:p text:style-name=\"P1\">Invoice <text:span/></text:p><text:p>Thanks</text:p>"
    );
}

#[test]
fn test_row_loop() {
    let body = format!(
        concat!(
            "<table:table>",
            "<table:table-row><table:table-cell><text:p>{}</text:p></table:table-cell></table:table-row>",
            "<table:table-row><table:table-cell><text:p>{}</text:p></table:table-cell>",
            "<table:table-cell><text:p>{}</text:p></table:table-cell></table:table-row>",
            "<table:table-row><table:table-cell><text:p>{}</text:p></table:table-cell></table:table-row>",
            "</table:table>"
        ),
        field_ref("row", "{% for item in items %}"),
        field("{{ item.name }}"),
        field("{{ item.qty|pad(3) }}"),
        field_ref("row", "{% endfor %}")
    );
    let items = json!({ "items": [{ "name": "bolt", "qty": 7 }, { "name": "nut", "qty": 12 }] });

    assert_eq!(
        render(&body, items),
        concat!(
            "<table:table>",
            "<table:table-row><table:table-cell><text:p><text:span>bolt</text:span></text:p></table:table-cell>",
            "<table:table-cell><text:p><text:span>007</text:span></text:p></table:table-cell></table:table-row>",
            "<table:table-row><table:table-cell><text:p><text:span>nut</text:span></text:p></table:table-cell>",
            "<table:table-cell><text:p><text:span>012</text:span></text:p></table:table-cell></table:table-row>",
            "</table:table>"
        )
    );
}

#[test]
fn test_conditional_paragraphs() {
    let body = format!(
        "<text:p>{}</text:p><text:p>Overdue</text:p><text:p>{}</text:p><text:p>End</text:p>",
        field("{% if days &gt; 30 %}"),
        field("{% endif %}")
    );
    assert_eq!(
        render(&body, json!({ "days": 45 })),
        "<text:p>Overdue</text:p><text:p>End</text:p>"
    );
    assert_eq!(render(&body, json!({ "days": 3 })), "<text:p>End</text:p>");
}

#[test]
fn test_values_are_escaped() {
    let body = format!("<text:p>{}</text:p>", field("{{ v }}"));
    assert_eq!(
        render(&body, json!({ "v": "a<b & \"c\"" })),
        "<text:p><text:span>a&lt;b &amp; \"c\"</text:span></text:p>"
    );
}

#[test]
fn test_newlines_become_line_breaks() {
    let body = format!("<text:p>{}</text:p>", field("{{ address }}"));
    assert_eq!(
        render(&body, json!({ "address": "1 Main St\nSpringfield" })),
        "<text:p><text:span>1 Main St<text:line-break/>Springfield</text:span></text:p>"
    );
}

#[test]
fn test_missing_variables_are_silent() {
    let body = format!(
        "<text:p>[{}]</text:p>",
        field("{{ customer.address.city }}{{ format(customer) }}")
    );
    assert_eq!(render(&body, json!({})), "<text:p>[<text:span/>]</text:p>");
}

#[test]
fn test_inline_conditional_keeps_body() {
    let body = format!("<text:p>Status: {}</text:p>", field("{% if draft %}Draft{% endif %}"));
    assert_eq!(
        render(&body, json!({ "draft": true })),
        "<text:p>Status: Draft</text:p>"
    );
    assert_eq!(render(&body, json!({})), "<text:p>Status: </text:p>");
}

#[test]
fn test_inline_conditional_keeps_master_styles() {
    let template = OdtBuilder::new()
        .content("<text:p>body</text:p>")
        .styles(&format!("<text:p>{}</text:p>", field("{% if draft %}Draft{% endif %}")))
        .build();
    let output = Renderer::new()
        .render_bytes(&template, &json!({ "draft": true }))
        .unwrap();
    let styles = read_part(&output, "styles.xml");
    assert!(styles.contains("<office:master-styles>"));
    assert_eq!(inner_of(&styles, "style:header"), "<text:p>Draft</text:p>");
}

#[test]
fn test_styles_part_is_rendered() {
    let template = OdtBuilder::new()
        .content("<text:p>body</text:p>")
        .styles(&format!("<text:p>{}</text:p>", field("{{ company }}")))
        .build();
    let output = Renderer::new()
        .render_bytes(&template, &json!({ "company": "ACME" }))
        .unwrap();
    assert_eq!(
        inner_of(&read_part(&output, "styles.xml"), "style:header"),
        "<text:p><text:span>ACME</text:span></text:p>"
    );
}

#[test]
fn test_missing_styles_part_is_skipped() {
    let template = OdtBuilder::new()
        .content(&format!("<text:p>{}</text:p>", field("{{ a }}")))
        .build();
    let output = Renderer::new().render_bytes(&template, &json!({ "a": 1 })).unwrap();
    assert_eq!(body_of(&output), "<text:p><text:span>1</text:span></text:p>");
}

#[test]
fn test_missing_content_part_is_malformed() {
    let template = OdtBuilder::new().styles("").build();
    let result = Renderer::new().render_bytes(&template, &json!({}));
    assert!(matches!(result, Err(RenderError::MalformedInput(_))));
}

#[test]
fn test_malformed_content_is_fatal() {
    let template = OdtBuilder::new()
        .entry("content.xml", b"<office:document-content><office:body>", zip::CompressionMethod::Deflated)
        .build();
    let result = Renderer::new().render_bytes(&template, &json!({}));
    assert!(matches!(result, Err(RenderError::MalformedInput(_))));
}

#[test]
fn test_not_a_zip() {
    let result = Renderer::new().render_bytes(b"plain text", &json!({}));
    assert!(matches!(result, Err(RenderError::Archive(_))));
}

#[test]
fn test_template_errors_propagate() {
    let body = format!("<text:p>{}</text:p>", field("{% if a %}"));
    let result = Renderer::new().render_bytes(&odt(&body), &json!({}));
    assert!(matches!(result, Err(RenderError::Template(_))));
}

#[test]
fn test_rendered_markup_must_stay_well_formed() {
    let body = format!("<text:p>{}</text:p>", field("{{ raw|safe }}"));
    let result = Renderer::new().render_bytes(&odt(&body), &json!({ "raw": "<text:span>" }));
    assert!(matches!(result, Err(RenderError::MalformedInput(_))));
}

#[test]
fn test_globals_and_custom_filters() {
    let mut renderer = Renderer::new();
    renderer.add_global("currency", "EUR");
    renderer
        .environment_mut()
        .add_filter("shout", |value: String| value.to_uppercase());

    let body = format!("<text:p>{}</text:p>", field("{{ total }} {{ currency|shout }}"));
    let output = renderer.render_bytes(&odt(&body), &json!({ "total": 10 })).unwrap();
    assert_eq!(body_of(&output), "<text:p><text:span>10 EUR</text:span></text:p>");
}

#[test]
fn test_autoescape_can_be_disabled() {
    let options = RenderOptions {
        autoescape: false,
        ..RenderOptions::default()
    };
    let body = format!("<text:p>{}</text:p>", field("{{ v }}"));
    let output = Renderer::with_options(options)
        .render_bytes(&odt(&body), &json!({ "v": "<text:tab/>" }))
        .unwrap();
    assert_eq!(body_of(&output), "<text:p><text:span><text:tab/></text:span></text:p>");
}

#[test]
fn test_pad_width_option() {
    let options = RenderOptions {
        pad_width: 3,
        ..RenderOptions::default()
    };
    let body = format!("<text:p>{}</text:p>", field("{{ n|pad }}"));
    let output = Renderer::with_options(options)
        .render_bytes(&odt(&body), &json!({ "n": 4 }))
        .unwrap();
    assert_eq!(body_of(&output), "<text:p><text:span>004</text:span></text:p>");
}

#[derive(Serialize)]
struct Invoice {
    number: u32,
    customer: String,
}

#[test]
fn test_struct_variables() {
    let body = format!("<text:p>{}</text:p>", field("{{ number }}/{{ customer }}"));
    let invoice = Invoice {
        number: 12,
        customer: "Ada".to_string(),
    };
    let output = Renderer::new().render_bytes(&odt(&body), &invoice).unwrap();
    assert_eq!(body_of(&output), "<text:p><text:span>12/Ada</text:span></text:p>");
}

#[test]
fn test_renderer_is_shared_between_threads() {
    let renderer = Renderer::new();
    let template = odt(&format!("<text:p>{}</text:p>", field("{{ n }}")));

    let outputs: Vec<String> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|n| {
                let renderer = &renderer;
                let template = &template;
                scope.spawn(move || {
                    let output = renderer.render_bytes(template, &json!({ "n": n })).unwrap();
                    body_of(&output)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for (n, body) in outputs.iter().enumerate() {
        assert_eq!(body, &format!("<text:p><text:span>{n}</text:span></text:p>"));
    }
}

#[test]
fn test_render_template_from_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("letter.odt");
    std::fs::write(&path, odt(&format!("<text:p>{}</text:p>", field("{{ to }}")))).unwrap();

    let output = odtmpl::render_template(&path, &json!({ "to": "Bob" })).unwrap();
    assert_eq!(body_of(&output), "<text:p><text:span>Bob</text:span></text:p>");

    let output = odtmpl::render_reader(std::fs::File::open(&path).unwrap(), &json!({})).unwrap();
    assert_eq!(body_of(&output), "<text:p><text:span/></text:p>");
}

/// Treats every template field as an inline value
struct InlineOnly;

impl ExpressionSyntax for InlineOnly {
    fn is_expression(&self, text: &str) -> bool {
        JinjaSyntax.is_expression(text)
    }

    fn is_block(&self, _text: &str) -> bool {
        false
    }

    fn uses_markdown(&self, _text: &str) -> bool {
        false
    }
}

#[test]
fn test_custom_expression_syntax() {
    let body = format!(
        "<text:p>{}</text:p><text:p>shown</text:p><text:p>{}</text:p>",
        field("{% if a %}"),
        field("{% endif %}")
    );
    let output = Renderer::new()
        .with_syntax(InlineOnly)
        .render_bytes(&odt(&body), &json!({ "a": true }))
        .unwrap();
    assert_eq!(
        body_of(&output),
        "<text:p><text:span/></text:p><text:p>shown</text:p><text:p><text:span/></text:p>"
    );
}

#[cfg(not(feature = "markdown"))]
#[test]
fn test_markdown_filter_without_feature() {
    let body = format!("<text:p>{}</text:p>", field("{{ notes|markdown }}"));
    let result = Renderer::new().render_bytes(&odt(&body), &json!({ "notes": "**a**" }));
    assert!(matches!(result, Err(RenderError::Configuration(_))));
}
