//! The `PageDom` abstraction over the previewed page's document.
//!
//! Edit modes never own the document: they borrow whatever implements this
//! trait (the in-memory [`crate::Document`] natively, a live iframe
//! `web_sys::Document` in the browser) and read/write it directly.
//!
//! All lookups degrade to `None` and all mutations on missing nodes are
//! silent no-ops.

use crate::id::ModeId;
use crate::style::{InlineStyle, add_class_token, has_class_token, remove_class_token};
use kurbo::Rect;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// DOM node category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Document,
    Doctype,
    Element,
    Text,
    Comment,
    Other,
}

/// Positions accepted by `insertAdjacentHTML`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjacentPosition {
    BeforeBegin,
    AfterBegin,
    BeforeEnd,
    AfterEnd,
}

impl AdjacentPosition {
    /// The keyword the DOM API expects.
    pub fn as_dom_str(self) -> &'static str {
        match self {
            Self::BeforeBegin => "beforebegin",
            Self::AfterBegin => "afterbegin",
            Self::BeforeEnd => "beforeend",
            Self::AfterEnd => "afterend",
        }
    }
}

/// DOM events the edit modes listen for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    MouseOver,
    MouseMove,
    MouseOut,
    Click,
    DragStart,
    DragOver,
    DragLeave,
    Drop,
    DragEnd,
}

impl EventKind {
    pub fn as_dom_str(self) -> &'static str {
        match self {
            Self::MouseOver => "mouseover",
            Self::MouseMove => "mousemove",
            Self::MouseOut => "mouseout",
            Self::Click => "click",
            Self::DragStart => "dragstart",
            Self::DragOver => "dragover",
            Self::DragLeave => "dragleave",
            Self::Drop => "drop",
            Self::DragEnd => "dragend",
        }
    }

    pub fn from_dom_str(s: &str) -> Option<Self> {
        Some(match s {
            "mouseover" => Self::MouseOver,
            "mousemove" => Self::MouseMove,
            "mouseout" => Self::MouseOut,
            "click" => Self::Click,
            "dragstart" => Self::DragStart,
            "dragover" => Self::DragOver,
            "dragleave" => Self::DragLeave,
            "drop" => Self::Drop,
            "dragend" => Self::DragEnd,
            _ => return None,
        })
    }
}

/// Where a listener set is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenTarget {
    /// `<body>`, falling back to the document when there is none.
    Body,
    Document,
}

/// A group of listeners registered together by one mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerSet {
    pub events: SmallVec<[EventKind; 8]>,
    pub target: ListenTarget,
    /// Capture phase, so the mode sees events before the page's own handlers.
    pub capture: bool,
}

impl ListenerSet {
    /// Capture-phase listeners on `<body>`.
    pub fn capture_on_body(events: &[EventKind]) -> Self {
        Self {
            events: events.iter().copied().collect(),
            target: ListenTarget::Body,
            capture: true,
        }
    }

    /// The hover/select trio shared by the highlighting controllers.
    pub fn pointer() -> Self {
        Self::capture_on_body(&[EventKind::MouseOver, EventKind::MouseOut, EventKind::Click])
    }
}

/// Read/write access to a previewed page.
pub trait PageDom {
    /// Handle to a node of this document.
    type Node: Clone + PartialEq + fmt::Debug;

    // ─── Structure ───────────────────────────────────────────────────────

    /// The `<html>` element.
    fn document_element(&self) -> Option<Self::Node>;
    fn head(&self) -> Option<Self::Node>;
    fn body(&self) -> Option<Self::Node>;
    fn node_type(&self, node: &Self::Node) -> NodeType;
    /// Lowercase tag name; `None` for non-elements.
    fn tag_name(&self, node: &Self::Node) -> Option<String>;
    fn parent_element(&self, node: &Self::Node) -> Option<Self::Node>;
    /// All child nodes (elements, text, comments) in document order.
    fn child_nodes(&self, node: &Self::Node) -> Vec<Self::Node>;
    /// Still attached under the document element.
    fn is_connected(&self, node: &Self::Node) -> bool;

    // ─── Attributes & content ────────────────────────────────────────────

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;
    fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str);
    fn remove_attribute(&mut self, node: &Self::Node, name: &str);
    fn text_content(&self, node: &Self::Node) -> String;
    fn inner_html(&self, node: &Self::Node) -> String;
    fn set_inner_html(&mut self, node: &Self::Node, html: &str) -> Result<(), String>;

    // ─── Mutation ────────────────────────────────────────────────────────

    fn insert_adjacent_html(
        &mut self,
        node: &Self::Node,
        position: AdjacentPosition,
        html: &str,
    ) -> Result<(), String>;
    /// Move `node` under `parent`, before `reference` (or last when `None`).
    fn insert_before(
        &mut self,
        parent: &Self::Node,
        node: &Self::Node,
        reference: Option<&Self::Node>,
    );
    fn remove_node(&mut self, node: &Self::Node);
    /// Append a `<style id=..>` element to `<head>` (or the document element).
    fn inject_style(&mut self, id: &str, css: &str) -> Option<Self::Node>;
    /// Swap the whole document for `html` (undo/redo).
    fn replace_document(&mut self, html: &str) -> Result<(), String>;

    // ─── Geometry & serialization ────────────────────────────────────────

    /// Bounding box in the iframe's client coordinates.
    fn bounding_rect(&self, node: &Self::Node) -> Option<Rect>;
    /// `documentElement.outerHTML`.
    fn outer_html(&self) -> String;

    // ─── Listeners ───────────────────────────────────────────────────────

    fn add_listeners(&mut self, owner: ModeId, listeners: ListenerSet);
    /// Remove every listener registered by `owner`. Returns how many sets were removed.
    fn remove_listeners(&mut self, owner: ModeId) -> usize;
    /// Owners with at least one listener attached, in registration order.
    fn listener_owners(&self) -> Vec<ModeId>;
    fn is_listening(&self, owner: ModeId, kind: EventKind) -> bool;

    // ─── Provided helpers ────────────────────────────────────────────────

    fn is_element(&self, node: &Self::Node) -> bool {
        self.node_type(node) == NodeType::Element
    }

    fn has_tag(&self, node: &Self::Node, tag: &str) -> bool {
        self.tag_name(node).is_some_and(|t| t == tag)
    }

    fn id_of(&self, node: &Self::Node) -> Option<String> {
        self.attribute(node, "id").filter(|id| !id.is_empty())
    }

    fn has_class(&self, node: &Self::Node, class: &str) -> bool {
        self.attribute(node, "class")
            .is_some_and(|v| has_class_token(&v, class))
    }

    fn add_class(&mut self, node: &Self::Node, class: &str) {
        if !self.is_element(node) {
            return;
        }
        let current = self.attribute(node, "class");
        if let Some(next) = add_class_token(current.as_deref(), class) {
            self.set_attribute(node, "class", &next);
        }
    }

    /// Remove a class, dropping the attribute entirely once empty.
    fn remove_class(&mut self, node: &Self::Node, class: &str) {
        let Some(current) = self.attribute(node, "class") else {
            return;
        };
        if let Some(next) = remove_class_token(&current, class) {
            if next.is_empty() {
                self.remove_attribute(node, "class");
            } else {
                self.set_attribute(node, "class", &next);
            }
        }
    }

    fn inline_style(&self, node: &Self::Node) -> InlineStyle {
        self.attribute(node, "style")
            .map(|s| InlineStyle::parse(&s))
            .unwrap_or_default()
    }

    fn style_property(&self, node: &Self::Node, property: &str) -> Option<String> {
        self.inline_style(node).get(property).map(str::to_string)
    }

    fn set_style_property(&mut self, node: &Self::Node, property: &str, value: &str) {
        if !self.is_element(node) {
            return;
        }
        let mut style = self.inline_style(node);
        style.set(property, value);
        self.set_attribute(node, "style", &style.to_css_text());
    }

    fn remove_style_property(&mut self, node: &Self::Node, property: &str) {
        let mut style = self.inline_style(node);
        if !style.remove(property) {
            return;
        }
        if style.is_empty() {
            self.remove_attribute(node, "style");
        } else {
            self.set_attribute(node, "style", &style.to_css_text());
        }
    }

    /// Every element under the document element (inclusive), pre-order.
    fn elements(&self) -> Vec<Self::Node> {
        let mut out = Vec::new();
        let mut stack: Vec<Self::Node> = self.document_element().into_iter().collect();
        while let Some(node) = stack.pop() {
            if !self.is_element(&node) {
                continue;
            }
            let children = self.child_nodes(&node);
            out.push(node);
            stack.extend(children.into_iter().rev());
        }
        out
    }

    fn elements_with_class(&self, class: &str) -> Vec<Self::Node> {
        self.elements()
            .into_iter()
            .filter(|n| self.has_class(n, class))
            .collect()
    }

    fn find_element_by_id(&self, id: &str) -> Option<Self::Node> {
        self.elements()
            .into_iter()
            .find(|n| self.attribute(n, "id").as_deref() == Some(id))
    }

    fn next_element_sibling(&self, node: &Self::Node) -> Option<Self::Node> {
        let parent = self.parent_element(node)?;
        let siblings = self.child_nodes(&parent);
        let pos = siblings.iter().position(|s| s == node)?;
        siblings[pos + 1..]
            .iter()
            .find(|s| self.is_element(s))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_names_roundtrip() {
        for kind in [
            EventKind::MouseOver,
            EventKind::MouseMove,
            EventKind::MouseOut,
            EventKind::Click,
            EventKind::DragStart,
            EventKind::DragOver,
            EventKind::DragLeave,
            EventKind::Drop,
            EventKind::DragEnd,
        ] {
            assert_eq!(EventKind::from_dom_str(kind.as_dom_str()), Some(kind));
        }
        assert_eq!(EventKind::from_dom_str("keydown"), None);
    }

    #[test]
    fn pointer_listener_set_uses_capture() {
        let set = ListenerSet::pointer();
        assert!(set.capture);
        assert_eq!(set.target, ListenTarget::Body);
        assert_eq!(set.events.len(), 3);
    }
}
