//! Document tree to HTML text.

use crate::document::{Attributes, Document, NodeId, NodeKind};
use html_escape::{encode_double_quoted_attribute, encode_text};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Returns true for elements that never have children or an end tag.
pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Serializes the whole document.
pub fn to_html(doc: &Document) -> String {
    let mut out = String::new();
    write_node(doc, doc.root(), &mut out);
    out
}

/// Renders an opening tag with escaped attribute values.
pub fn start_tag(tag: &str, attrs: &Attributes) -> String {
    let mut out = String::with_capacity(tag.len() + 2 + attrs.len() * 16);
    push_start_tag(tag, attrs, &mut out);
    out
}

fn push_start_tag(tag: &str, attrs: &Attributes, out: &mut String) {
    out.push('<');
    out.push_str(tag);
    for (key, value) in attrs.iter() {
        out.push(' ');
        out.push_str(key.as_str());
        if key.is_boolean() {
            continue;
        }
        out.push_str("=\"");
        out.push_str(&encode_double_quoted_attribute(value));
        out.push('"');
    }
    out.push('>');
}

fn write_node(doc: &Document, id: NodeId, out: &mut String) {
    let Some(node) = doc.node(id) else {
        log::warn!("Skipping dangling node {} during serialization", id);
        return;
    };
    match &node.kind {
        NodeKind::Root => {
            for child in &node.children {
                write_node(doc, *child, out);
            }
        }
        NodeKind::Text(text) => out.push_str(&encode_text(text)),
        NodeKind::Raw(markup) => out.push_str(markup),
        NodeKind::Element(element) => {
            push_start_tag(&element.tag, &element.attrs, out);
            if is_void(&element.tag) {
                return;
            }
            for child in &node.children {
                write_node(doc, *child, out);
            }
            out.push_str("</");
            out.push_str(&element.tag);
            out.push('>');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{AttrKey, DataAttr};

    #[test]
    fn escapes_text_and_attributes() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = doc.element(
            "a",
            Attributes::new().with(AttrKey::Href, "/q?a=1&b=\"2\""),
        );
        let t = doc.text("<tag> & more");
        doc.append(a, t).unwrap();
        doc.append(root, a).unwrap();

        let html = to_html(&doc);
        assert!(html.starts_with("<a href=\"/q?a=1&amp;b=&quot;2&quot;\">"));
        assert!(html.contains("&lt;tag&gt; &amp; more"));
        assert!(html.ends_with("</a>"));
    }

    #[test]
    fn raw_is_verbatim() {
        let mut doc = Document::new();
        let root = doc.root();
        let raw = doc.raw("<div class=\"asciinema-embed\"></div>");
        doc.append(root, raw).unwrap();
        assert_eq!(to_html(&doc), "<div class=\"asciinema-embed\"></div>");
    }

    #[test]
    fn void_and_boolean_attributes() {
        let mut doc = Document::new();
        let root = doc.root();
        let input = doc.element(
            "input",
            Attributes::new()
                .with(AttrKey::Type, "checkbox")
                .with(AttrKey::Disabled, "")
                .with(AttrKey::Checked, ""),
        );
        let img = doc.element(
            "img",
            Attributes::new()
                .with(AttrKey::Alt, "")
                .with(AttrKey::Data(DataAttr::NextImage), "true"),
        );
        doc.set_children(root, vec![input, img]).unwrap();
        assert_eq!(
            to_html(&doc),
            "<input type=\"checkbox\" disabled checked><img alt=\"\" data-next-image=\"true\">"
        );
    }
}
