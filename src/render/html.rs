//! Markup serializer.

use crate::model::{Element, MarkupNode};
use quick_xml::escape::{escape, partial_escape};

/// Serializes a tree to HTML.
///
/// A fragment root emits only its children. Output is deterministic, so
/// serializing an unchanged tree always yields the same bytes.
pub fn to_html(node: &MarkupNode) -> String {
    let mut out = String::new();
    write_node(node, &mut out);
    out
}

/// Escapes text the way the serializer writes it into text content.
pub fn escape_text(text: &str) -> String {
    partial_escape(text).into_owned()
}

fn write_node(node: &MarkupNode, out: &mut String) {
    match node {
        MarkupNode::Text(text) => out.push_str(&partial_escape(text.as_str())),
        MarkupNode::Element(el) if el.is_fragment() => write_children(el, out),
        MarkupNode::Element(el) => write_element(el, out),
    }
}

fn write_element(el: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&el.tag);
    for attr in &el.attributes {
        out.push(' ');
        out.push_str(&attr.name);
        out.push_str("=\"");
        out.push_str(&escape(attr.value.as_str()));
        out.push('"');
    }
    out.push('>');

    if el.is_void() {
        return;
    }

    write_children(el, out);
    out.push_str("</");
    out.push_str(&el.tag);
    out.push('>');
}

fn write_children(el: &Element, out: &mut String) {
    for child in &el.children {
        write_node(child, out);
    }
}
