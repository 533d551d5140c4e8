//! Emitter: [`Document`] → HTML text.
//!
//! Mirrors what a browser's `outerHTML` produces for the same tree:
//! attributes in source order, always double-quoted, void elements without
//! end tags. Text is written back raw.

use crate::document::{Document, NodeData, is_void_element};
use petgraph::graph::NodeIndex;

/// Serialize the whole document: doctype, top-level comments, `<html>`.
#[must_use]
pub fn emit_document(doc: &Document) -> String {
    let mut out = String::with_capacity(4096);
    for &child in doc.children(doc.root) {
        emit_node(&mut out, doc, child);
    }
    out
}

/// `outerHTML` of a node.
#[must_use]
pub fn outer_html(doc: &Document, idx: NodeIndex) -> String {
    let mut out = String::with_capacity(1024);
    emit_node(&mut out, doc, idx);
    out
}

/// `innerHTML` of a node.
#[must_use]
pub fn inner_html(doc: &Document, idx: NodeIndex) -> String {
    let mut out = String::with_capacity(1024);
    for &child in doc.children(idx) {
        emit_node(&mut out, doc, child);
    }
    out
}

fn emit_node(out: &mut String, doc: &Document, idx: NodeIndex) {
    let Some(data) = doc.data(idx) else {
        return;
    };
    match data {
        NodeData::Document => {
            for &child in doc.children(idx) {
                emit_node(out, doc, child);
            }
        }
        NodeData::Doctype(name) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(name);
            out.push('>');
        }
        NodeData::Text(text) => out.push_str(text),
        NodeData::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        NodeData::Element(el) => {
            out.push('<');
            out.push_str(&el.tag);
            for (name, value) in &el.attrs {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                push_attr_value(out, value);
                out.push('"');
            }
            out.push('>');
            if is_void_element(&el.tag) {
                return;
            }
            for &child in doc.children(idx) {
                emit_node(out, doc, child);
            }
            out.push_str("</");
            out.push_str(&el.tag);
            out.push('>');
        }
    }
}

fn push_attr_value(out: &mut String, value: &str) {
    if value.contains('"') {
        out.push_str(&value.replace('"', "&quot;"));
    } else {
        out.push_str(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn roundtrip_well_formed_page() {
        let input = "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\"><title>A &amp; B</title></head><body class=\"home\"><!-- c --><section id=\"section-hero\"><h1>Hi</h1><img src=\"a.png\" alt=\"\"></section></body></html>";
        let doc = Document::parse(input).unwrap();
        assert_eq!(emit_document(&doc), input);
    }

    #[test]
    fn quotes_in_values_are_escaped() {
        let doc = Document::parse("<html><body data-q='say \"hi\"'></body></html>").unwrap();
        assert_eq!(
            emit_document(&doc),
            "<html><body data-q=\"say &quot;hi&quot;\"></body></html>"
        );
    }

    #[test]
    fn emit_is_stable_after_reparse() {
        let input = "<html><body><ul><li>a<li>b</ul><p>x<br/>y</body></html>";
        let once = emit_document(&Document::parse(input).unwrap());
        let twice = emit_document(&Document::parse(&once).unwrap());
        assert_eq!(once, twice);
    }
}
