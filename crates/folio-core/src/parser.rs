//! Lenient HTML parser → [`Document`] nodes.
//!
//! Built on `winnow` 0.7. Handles: doctype, comments, void elements,
//! raw-text elements (`script`, `style`, `textarea`, `title`), quoted,
//! unquoted and bare attributes. Recovery rules are deliberately small:
//! a close tag pops to the nearest matching open element, a stray close tag
//! is dropped, and a `<` that does not start valid markup is kept as text.
//! Text and attribute values are stored raw (no entity decoding) so that
//! emitting reproduces the source.

use crate::document::{Document, ElementData, NodeData, is_void_element};
use petgraph::graph::NodeIndex;
use winnow::combinator::{alt, delimited, preceded};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::{take, take_till, take_until, take_while};

/// Elements whose content is not parsed as markup.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

/// Parse `input` and append the resulting nodes under `parent`.
pub(crate) fn parse_into(doc: &mut Document, parent: NodeIndex, input: &str) -> Result<(), String> {
    let mut rest = input;
    let mut open: Vec<(NodeIndex, String)> = Vec::new();

    while !rest.is_empty() {
        let current = open.last().map(|(idx, _)| *idx).unwrap_or(parent);

        if rest.starts_with("<!--") {
            let body = parse_comment
                .parse_next(&mut rest)
                .map_err(|_| "Unterminated comment".to_string())?;
            let node = doc.create_node(NodeData::Comment(body.to_string()));
            doc.append_child(current, node);
        } else if starts_with_ignore_case(rest, "<!doctype") {
            let name = parse_doctype
                .parse_next(&mut rest)
                .map_err(|_| "Unterminated doctype".to_string())?;
            let node = doc.create_node(NodeData::Doctype(name.trim().to_string()));
            doc.append_child(current, node);
        } else if rest.starts_with("</") {
            let checkpoint = rest;
            match parse_close_tag.parse_next(&mut rest) {
                Ok(tag) => close_element(&mut open, tag),
                Err(_) => {
                    rest = checkpoint;
                    push_text(doc, current, &rest[..1]);
                    rest = &rest[1..];
                }
            }
        } else if rest.starts_with('<') {
            let checkpoint = rest;
            match parse_open_tag.parse_next(&mut rest) {
                Ok(tag) => {
                    let name = tag.name.to_ascii_lowercase();
                    let current = implicit_close(&mut open, &name).unwrap_or(parent);
                    let mut el = ElementData::new(&name);
                    el.attrs = tag.attrs;
                    let node = doc.create_node(NodeData::Element(el));
                    doc.append_child(current, node);

                    if tag.self_closing || is_void_element(&name) {
                        continue;
                    }
                    if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
                        let body = take_raw_text(&mut rest, &name);
                        if !body.is_empty() {
                            push_text(doc, node, body);
                        }
                    }
                    open.push((node, name));
                }
                Err(_) => {
                    rest = checkpoint;
                    push_text(doc, current, &rest[..1]);
                    rest = &rest[1..];
                }
            }
        } else {
            let text = parse_text
                .parse_next(&mut rest)
                .map_err(|e| format!("Text parse error: {e}"))?;
            push_text(doc, current, text);
        }
    }

    Ok(())
}

/// Append text, merging with a trailing text node.
fn push_text(doc: &mut Document, parent: NodeIndex, text: &str) {
    if let Some(&last) = doc.children(parent).last()
        && let Some(NodeData::Text(existing)) = doc.graph.node_weight_mut(last)
    {
        existing.push_str(text);
        return;
    }
    let node = doc.create_node(NodeData::Text(text.to_string()));
    doc.append_child(parent, node);
}

/// Pop to the nearest open element named `tag`; ignore the tag if none is open.
fn close_element(open: &mut Vec<(NodeIndex, String)>, tag: &str) {
    if let Some(pos) = open.iter().rposition(|(_, name)| name.eq_ignore_ascii_case(tag)) {
        open.truncate(pos);
    } else {
        log::trace!("dropping stray </{tag}>");
    }
}

/// `<li>`, `<p>` and `<option>` close an open sibling of the same name.
/// Returns the parent for the new element.
fn implicit_close(open: &mut Vec<(NodeIndex, String)>, name: &str) -> Option<NodeIndex> {
    if matches!(name, "li" | "p" | "option")
        && open.last().is_some_and(|(_, top)| top == name)
    {
        open.pop();
    }
    open.last().map(|(idx, _)| *idx)
}

/// Consume everything up to `</name` (case-insensitive).
fn take_raw_text<'a>(input: &mut &'a str, name: &str) -> &'a str {
    let needle = format!("</{name}");
    // ASCII lowercasing keeps byte offsets stable.
    let end = input
        .to_ascii_lowercase()
        .find(&needle)
        .unwrap_or(input.len());
    let (body, rest) = input.split_at(end);
    *input = rest;
    body
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len()
        && s.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

// ─── Low-level parsers ──────────────────────────────────────────────────

#[derive(Debug)]
struct OpenTag<'a> {
    name: &'a str,
    attrs: Vec<(String, String)>,
    self_closing: bool,
}

fn is_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | ':' | '_')
}

fn parse_comment<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    delimited("<!--", take_until(0.., "-->"), "-->").parse_next(input)
}

fn parse_doctype<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    delimited(take(9usize), take_till(0.., '>'), '>').parse_next(input)
}

fn parse_close_tag<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    delimited("</", take_while(1.., is_tag_char), (take_till(0.., '>'), '>')).parse_next(input)
}

fn parse_text<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    take_till(1.., '<').parse_next(input)
}

fn parse_tag_name<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    if !input.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return Err(ErrMode::Backtrack(ContextError::new()));
    }
    take_while(1.., is_tag_char).parse_next(input)
}

fn parse_open_tag<'a>(input: &mut &'a str) -> ModalResult<OpenTag<'a>> {
    let name = preceded('<', parse_tag_name).parse_next(input)?;
    let mut attrs = Vec::new();
    loop {
        *input = input.trim_start();
        if let Some(rest) = input.strip_prefix("/>") {
            *input = rest;
            return Ok(OpenTag {
                name,
                attrs,
                self_closing: true,
            });
        }
        if let Some(rest) = input.strip_prefix('>') {
            *input = rest;
            return Ok(OpenTag {
                name,
                attrs,
                self_closing: false,
            });
        }
        if input.is_empty() || input.starts_with('<') {
            return Err(ErrMode::Backtrack(ContextError::new()));
        }
        if let Some(rest) = input.strip_prefix('/') {
            *input = rest;
            continue;
        }
        let (attr_name, value) = parse_attribute(input)?;
        if !attrs.iter().any(|(n, _): &(String, String)| *n == attr_name) {
            attrs.push((attr_name, value));
        }
    }
}

fn parse_attribute(input: &mut &str) -> ModalResult<(String, String)> {
    let name = parse_attr_name(input)?;
    *input = input.trim_start();
    let value = match input.strip_prefix('=') {
        Some(rest) => {
            *input = rest.trim_start();
            parse_attr_value(input)?
        }
        None => "",
    };
    Ok((name.to_ascii_lowercase(), value.to_string()))
}

fn parse_attr_name<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    take_while(1.., |c: char| {
        !c.is_whitespace() && !matches!(c, '=' | '>' | '/' | '"' | '\'' | '<')
    })
    .parse_next(input)
}

fn parse_attr_value<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    alt((
        delimited('"', take_till(0.., '"'), '"'),
        delimited('\'', take_till(0.., '\''), '\''),
        take_while(0.., |c: char| !c.is_whitespace() && c != '>'),
    ))
    .parse_next(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::PageDom;
    use pretty_assertions::assert_eq;

    fn body_html(input: &str) -> String {
        let doc = Document::parse(input).unwrap();
        doc.inner_html(&doc.body().unwrap())
    }

    #[test]
    fn parse_minimal_page() {
        let doc = Document::parse("<!DOCTYPE html>\n<html><head></head><body><p>Hi</p></body></html>")
            .unwrap();
        let children = doc.children(doc.root);
        assert_eq!(children.len(), 3); // doctype, "\n", html
        assert!(matches!(doc.data(children[0]), Some(NodeData::Doctype(d)) if d == "html"));
        assert_eq!(doc.text_content(&doc.body().unwrap()), "Hi");
    }

    #[test]
    fn parse_attribute_forms() {
        let doc = Document::parse(
            "<html><body><input type=checkbox checked data-x='a \"b\"' ID=\"Main\"></body></html>",
        )
        .unwrap();
        let input = doc.elements().into_iter().find(|n| doc.has_tag(n, "input")).unwrap();
        assert_eq!(doc.attribute(&input, "type").as_deref(), Some("checkbox"));
        assert_eq!(doc.attribute(&input, "checked").as_deref(), Some(""));
        assert_eq!(doc.attribute(&input, "data-x").as_deref(), Some("a \"b\""));
        assert_eq!(doc.attribute(&input, "id").as_deref(), Some("Main"));
    }

    #[test]
    fn void_and_self_closing_elements_have_no_children() {
        assert_eq!(
            body_html("<html><body><img src=a.png><br/><p>x</p></body></html>"),
            "<img src=\"a.png\"><br><p>x</p>"
        );
    }

    #[test]
    fn raw_text_elements_keep_markup() {
        let doc = Document::parse(
            "<html><head><script>if (a < b) { x = '</div>'; }</script></head><body></body></html>",
        )
        .unwrap();
        let head = doc.head().unwrap();
        assert_eq!(
            doc.inner_html(&head),
            "<script>if (a < b) { x = '</div>'; }</script>"
        );
    }

    #[test]
    fn mismatched_close_tags_recover() {
        assert_eq!(
            body_html("<html><body><div><span>a</div><p>b</span></p></body></html>"),
            "<div><span>a</span></div><p>b</p>"
        );
    }

    #[test]
    fn implicit_list_item_close() {
        assert_eq!(
            body_html("<html><body><ul><li>a<li>b</ul></body></html>"),
            "<ul><li>a</li><li>b</li></ul>"
        );
    }

    #[test]
    fn stray_angle_bracket_is_text() {
        assert_eq!(body_html("<html><body>1 < 2 <3</body></html>"), "1 < 2 <3");
    }

    #[test]
    fn comments_are_preserved() {
        assert_eq!(
            body_html("<html><body><!-- keep --><p>x</p></body></html>"),
            "<!-- keep --><p>x</p>"
        );
    }

    #[test]
    fn unterminated_comment_is_error() {
        let err = Document::parse("<html><!-- oops").unwrap_err();
        assert!(err.contains("comment"), "{err}");
    }

    #[test]
    fn empty_input_has_no_root() {
        assert!(Document::parse("").is_err());
        assert!(Document::parse("   ").is_err());
    }
}
