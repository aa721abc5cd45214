//! Field promotion over generated documents

use odtmpl::fields::{self, ExpressionSyntax, FieldKind, JinjaSyntax, Placement, FIELD_TAG};
use odtmpl::xml::{self, Document, NodeId};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Shape {
    Block,
    Variable,
    Plain,
    Text,
    Section(Vec<Shape>),
}

impl Shape {
    fn write(&self, out: &mut String) {
        match self {
            Shape::Block => out.push_str("<text:text-input>{% if x %}</text:text-input>"),
            Shape::Variable => out.push_str("<text:text-input>{{ v }}</text:text-input>"),
            Shape::Plain => out.push_str("<text:text-input>plain</text:text-input>"),
            Shape::Text => out.push_str("words"),
            Shape::Section(children) => {
                out.push_str("<text:section>");
                for child in children {
                    child.write(out);
                }
                out.push_str("</text:section>");
            }
        }
    }
}

fn shape() -> impl Strategy<Value = Shape> {
    let leaf = prop_oneof![
        Just(Shape::Block),
        Just(Shape::Variable),
        Just(Shape::Plain),
        Just(Shape::Text),
    ];
    leaf.prop_recursive(4, 48, 4, |inner| {
        prop::collection::vec(inner, 0..4).prop_map(Shape::Section)
    })
}

fn document(shapes: &[Shape]) -> Document {
    let mut source = String::from("<office:document-content><office:body><office:text>");
    for shape in shapes {
        shape.write(&mut source);
    }
    source.push_str("</office:text></office:body></office:document-content>");
    xml::parse(&source).unwrap()
}

fn is_template_field(doc: &Document, node: NodeId) -> bool {
    doc.tag_name(node) == Some(FIELD_TAG) && JinjaSyntax.is_expression(&doc.text_content(node))
}

/// Template fields at or below `node`
fn template_fields(doc: &Document, node: NodeId) -> usize {
    let own = usize::from(is_template_field(doc, node));
    own + doc
        .descendants(node)
        .into_iter()
        .filter(|n| is_template_field(doc, *n))
        .count()
}

proptest! {
    #[test]
    fn block_destination_is_highest_exclusive_ancestor(shapes in prop::collection::vec(shape(), 1..5)) {
        let doc = document(&shapes);
        let document_element = doc.document_element().unwrap();

        for promotion in fields::plan(&doc, &JinjaSyntax) {
            if promotion.kind != FieldKind::Block {
                prop_assert_eq!(promotion.destination, promotion.field);
                continue;
            }
            prop_assert_eq!(promotion.placement, Placement::InPlace);
            prop_assert_eq!(promotion.removal, promotion.destination);

            let mut node = promotion.field;
            while node != promotion.destination {
                node = doc.parent(node).unwrap();
                prop_assert_eq!(template_fields(&doc, node), 1);
                prop_assert_ne!(node, document_element);
            }

            let shared = doc
                .ancestors(promotion.field)
                .take_while(|node| *node != document_element)
                .any(|node| template_fields(&doc, node) > 1);
            if shared {
                let above = doc.parent(promotion.destination).unwrap();
                prop_assert!(
                    template_fields(&doc, above) > 1,
                    "hoist stopped early below {:?}",
                    doc.tag_name(above)
                );
            } else {
                prop_assert_eq!(promotion.destination, promotion.field);
            }
        }
    }

    #[test]
    fn promotion_consumes_every_template_field(shapes in prop::collection::vec(shape(), 1..5)) {
        let mut doc = document(&shapes);
        let expected = template_fields(&doc, doc.root());
        let plain = doc.elements_by_tag(doc.root(), FIELD_TAG).len() - expected;

        prop_assert_eq!(fields::promote(&mut doc, &JinjaSyntax), expected);

        let remaining = doc.elements_by_tag(doc.root(), FIELD_TAG);
        prop_assert!(remaining.iter().all(|n| !is_template_field(&doc, *n)));
        prop_assert!(remaining.len() <= plain);
    }
}

#[test]
fn test_document_without_template_fields_is_unchanged() {
    let source = concat!(
        "<office:document-content><office:body><office:text>",
        "<text:p>Hello <text:text-input>name</text:text-input></text:p>",
        "<text:p>{ not a tag</text:p>",
        "</office:text></office:body></office:document-content>"
    );
    let mut doc = xml::parse(source).unwrap();
    assert_eq!(fields::promote(&mut doc, &JinjaSyntax), 0);
    assert_eq!(xml::to_string(&doc), source);
}

#[test]
fn test_lone_block_stays_in_its_paragraph() {
    let source = concat!(
        "<office:document-content><office:body><office:text>",
        "<text:p><text:text-input>{% set a = 1 %}</text:text-input></text:p>",
        "</office:text></office:body></office:document-content>"
    );
    let mut doc = xml::parse(source).unwrap();
    let plan = fields::plan(&doc, &JinjaSyntax);
    assert_eq!(plan[0].destination, plan[0].field);

    fields::apply(&mut doc, &plan);
    assert_eq!(
        xml::to_string(&doc),
        concat!(
            "<office:document-content><office:body><office:text>",
            "<text:p>{% set a = 1 %}</text:p>",
            "</office:text></office:body></office:document-content>"
        )
    );
}
