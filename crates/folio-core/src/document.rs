//! In-memory HTML document implementing [`PageDom`].
//!
//! The tree lives in a `StableDiGraph` with parent→child edges, so node
//! handles (`NodeIndex`) stay valid across unrelated removals. Child order is
//! kept explicitly per parent; `petgraph` adjacency order is not relied upon.

use crate::dom::{AdjacentPosition, EventKind, ListenerSet, NodeType, PageDom};
use crate::emitter;
use crate::id::ModeId;
use crate::parser;
use kurbo::Rect;
use petgraph::Direction;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use std::collections::HashMap;

/// Payload of a single DOM node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    Document,
    Doctype(String),
    Element(ElementData),
    /// Raw text as written in the source (entities are not decoded).
    Text(String),
    Comment(String),
}

/// An element's tag and attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementData {
    /// Lowercase tag name.
    pub tag: String,
    /// Attributes in source order, names lowercased.
    pub attrs: Vec<(String, String)>,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Tags serialized without an end tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// A parsed page: the `Document` node plus its doctype and `<html>` subtree.
#[derive(Debug, Clone)]
pub struct Document {
    pub graph: StableDiGraph<NodeData, ()>,
    /// The `Document` node (parent of doctype and `<html>`).
    pub root: NodeIndex,
    child_order: HashMap<NodeIndex, Vec<NodeIndex>>,
    bounds: HashMap<NodeIndex, Rect>,
    listeners: Vec<(ModeId, ListenerSet)>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty document with no `<html>` element.
    #[must_use]
    pub fn new() -> Self {
        let mut graph = StableDiGraph::new();
        let root = graph.add_node(NodeData::Document);
        Self {
            graph,
            root,
            child_order: HashMap::new(),
            bounds: HashMap::new(),
            listeners: Vec::new(),
        }
    }

    /// Parse a full HTML page.
    ///
    /// # Errors
    /// Returns a message when the markup is unterminated or has no root element.
    pub fn parse(html: &str) -> Result<Self, String> {
        let mut doc = Self::new();
        let root = doc.root;
        parser::parse_into(&mut doc, root, html)?;
        if doc.document_element().is_none() {
            return Err("Document has no root element".to_string());
        }
        log::debug!(
            "parsed document: {} nodes from {} bytes",
            doc.graph.node_count(),
            html.len()
        );
        Ok(doc)
    }

    // ─── Tree primitives ─────────────────────────────────────────────────

    /// Create a detached node.
    pub fn create_node(&mut self, data: NodeData) -> NodeIndex {
        self.graph.add_node(data)
    }

    /// Append a detached node as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeIndex, child: NodeIndex) {
        self.attach_at(parent, child, None);
    }

    pub fn data(&self, idx: NodeIndex) -> Option<&NodeData> {
        self.graph.node_weight(idx)
    }

    pub fn element(&self, idx: NodeIndex) -> Option<&ElementData> {
        match self.graph.node_weight(idx) {
            Some(NodeData::Element(el)) => Some(el),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, idx: NodeIndex) -> Option<&mut ElementData> {
        match self.graph.node_weight_mut(idx) {
            Some(NodeData::Element(el)) => Some(el),
            _ => None,
        }
    }

    /// Children in document order.
    pub fn children(&self, idx: NodeIndex) -> &[NodeIndex] {
        self.child_order.get(&idx).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn parent(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .neighbors_directed(idx, Direction::Incoming)
            .next()
    }

    /// Whether `ancestor` is `node` or one of its ancestors.
    pub fn is_inclusive_ancestor(&self, ancestor: NodeIndex, node: NodeIndex) -> bool {
        let mut current = Some(node);
        while let Some(idx) = current {
            if idx == ancestor {
                return true;
            }
            current = self.parent(idx);
        }
        false
    }

    /// Detach `child` from its parent, keeping the subtree alive.
    pub fn detach(&mut self, child: NodeIndex) {
        let Some(parent) = self.parent(child) else {
            return;
        };
        if let Some(edge) = self.graph.find_edge(parent, child) {
            self.graph.remove_edge(edge);
        }
        if let Some(order) = self.child_order.get_mut(&parent) {
            order.retain(|c| *c != child);
        }
    }

    /// Detach and drop a node with all its descendants.
    pub fn remove_subtree(&mut self, idx: NodeIndex) {
        self.detach(idx);
        let mut stack = vec![idx];
        while let Some(n) = stack.pop() {
            if let Some(children) = self.child_order.remove(&n) {
                stack.extend(children);
            }
            self.bounds.remove(&n);
            self.graph.remove_node(n);
        }
    }

    fn attach_at(&mut self, parent: NodeIndex, child: NodeIndex, index: Option<usize>) {
        self.graph.add_edge(parent, child, ());
        let order = self.child_order.entry(parent).or_default();
        match index {
            Some(i) if i <= order.len() => order.insert(i, child),
            _ => order.push(child),
        }
    }

    /// Parse `html` into a detached holder element and return it.
    fn parse_fragment(&mut self, html: &str) -> Result<NodeIndex, String> {
        let holder = self.create_node(NodeData::Element(ElementData::new("template")));
        if let Err(e) = parser::parse_into(self, holder, html) {
            self.remove_subtree(holder);
            return Err(e);
        }
        Ok(holder)
    }

    /// Move every child of `holder` under `parent` at `index`, then drop `holder`.
    fn splice_fragment(&mut self, holder: NodeIndex, parent: NodeIndex, index: Option<usize>) {
        let moved: Vec<NodeIndex> = self.children(holder).to_vec();
        let mut at = index;
        for child in moved {
            self.detach(child);
            self.attach_at(parent, child, at);
            at = at.map(|i| i + 1);
        }
        self.remove_subtree(holder);
    }

    fn position_in_parent(&self, node: NodeIndex) -> Option<(NodeIndex, usize)> {
        let parent = self.parent(node)?;
        let pos = self.children(parent).iter().position(|c| *c == node)?;
        Some((parent, pos))
    }

    // ─── Geometry ────────────────────────────────────────────────────────

    /// Record a node's client rect. There is no layout engine here; the
    /// host (or a test) supplies geometry.
    pub fn set_bounds(&mut self, idx: NodeIndex, rect: Rect) {
        self.bounds.insert(idx, rect);
    }

    /// Serialize the doctype plus the `<html>` element.
    pub fn to_html(&self) -> String {
        emitter::emit_document(self)
    }
}

impl PageDom for Document {
    type Node = NodeIndex;

    fn document_element(&self) -> Option<NodeIndex> {
        self.children(self.root)
            .iter()
            .copied()
            .find(|c| self.element(*c).is_some())
    }

    fn head(&self) -> Option<NodeIndex> {
        let html = self.document_element()?;
        self.children(html)
            .iter()
            .copied()
            .find(|c| self.element(*c).is_some_and(|e| e.tag == "head"))
    }

    fn body(&self) -> Option<NodeIndex> {
        let html = self.document_element()?;
        self.children(html)
            .iter()
            .copied()
            .find(|c| self.element(*c).is_some_and(|e| e.tag == "body"))
    }

    fn node_type(&self, node: &NodeIndex) -> NodeType {
        match self.graph.node_weight(*node) {
            Some(NodeData::Document) => NodeType::Document,
            Some(NodeData::Doctype(_)) => NodeType::Doctype,
            Some(NodeData::Element(_)) => NodeType::Element,
            Some(NodeData::Text(_)) => NodeType::Text,
            Some(NodeData::Comment(_)) => NodeType::Comment,
            None => NodeType::Other,
        }
    }

    fn tag_name(&self, node: &NodeIndex) -> Option<String> {
        self.element(*node).map(|e| e.tag.clone())
    }

    fn parent_element(&self, node: &NodeIndex) -> Option<NodeIndex> {
        self.parent(*node).filter(|p| self.element(*p).is_some())
    }

    fn child_nodes(&self, node: &NodeIndex) -> Vec<NodeIndex> {
        self.children(*node).to_vec()
    }

    fn is_connected(&self, node: &NodeIndex) -> bool {
        self.graph.contains_node(*node) && self.is_inclusive_ancestor(self.root, *node)
    }

    fn attribute(&self, node: &NodeIndex, name: &str) -> Option<String> {
        self.element(*node)?.get(name).map(str::to_string)
    }

    fn set_attribute(&mut self, node: &NodeIndex, name: &str, value: &str) {
        let Some(el) = self.element_mut(*node) else {
            return;
        };
        let name = name.to_ascii_lowercase();
        match el.attrs.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value.to_string(),
            None => el.attrs.push((name, value.to_string())),
        }
    }

    fn remove_attribute(&mut self, node: &NodeIndex, name: &str) {
        if let Some(el) = self.element_mut(*node) {
            let name = name.to_ascii_lowercase();
            el.attrs.retain(|(n, _)| *n != name);
        }
    }

    fn text_content(&self, node: &NodeIndex) -> String {
        let mut out = String::new();
        let mut stack = vec![*node];
        while let Some(n) = stack.pop() {
            match self.graph.node_weight(n) {
                Some(NodeData::Text(t)) => out.push_str(t),
                Some(NodeData::Element(_)) | Some(NodeData::Document) => {
                    stack.extend(self.children(n).iter().rev());
                }
                _ => {}
            }
        }
        out
    }

    fn inner_html(&self, node: &NodeIndex) -> String {
        emitter::inner_html(self, *node)
    }

    fn set_inner_html(&mut self, node: &NodeIndex, html: &str) -> Result<(), String> {
        if self.element(*node).is_none() {
            return Err("setInnerHTML target is not an element".to_string());
        }
        let holder = self.parse_fragment(html)?;
        for child in self.children(*node).to_vec() {
            self.remove_subtree(child);
        }
        self.splice_fragment(holder, *node, None);
        Ok(())
    }

    fn insert_adjacent_html(
        &mut self,
        node: &NodeIndex,
        position: AdjacentPosition,
        html: &str,
    ) -> Result<(), String> {
        if self.element(*node).is_none() {
            return Err("insertAdjacentHTML target is not an element".to_string());
        }
        let (parent, index) = match position {
            AdjacentPosition::BeforeBegin | AdjacentPosition::AfterEnd => {
                let (parent, pos) = self
                    .position_in_parent(*node)
                    .filter(|(p, _)| *p != self.root)
                    .ok_or_else(|| format!("Cannot insert {} the root element", position.as_dom_str()))?;
                let index = if position == AdjacentPosition::BeforeBegin {
                    pos
                } else {
                    pos + 1
                };
                (parent, Some(index))
            }
            AdjacentPosition::AfterBegin => (*node, Some(0)),
            AdjacentPosition::BeforeEnd => (*node, None),
        };
        let holder = self.parse_fragment(html)?;
        self.splice_fragment(holder, parent, index);
        Ok(())
    }

    fn insert_before(&mut self, parent: &NodeIndex, node: &NodeIndex, reference: Option<&NodeIndex>) {
        if !self.graph.contains_node(*parent) || !self.graph.contains_node(*node) {
            return;
        }
        // A node cannot become its own descendant.
        if self.is_inclusive_ancestor(*node, *parent) {
            return;
        }
        if reference == Some(node) {
            return;
        }
        self.detach(*node);
        let index = reference.and_then(|r| self.children(*parent).iter().position(|c| c == r));
        if reference.is_some() && index.is_none() {
            log::warn!("insert_before: reference is not a child of the parent; appending");
        }
        self.attach_at(*parent, *node, index);
    }

    fn remove_node(&mut self, node: &NodeIndex) {
        if *node == self.root || !self.graph.contains_node(*node) {
            return;
        }
        self.remove_subtree(*node);
    }

    fn inject_style(&mut self, id: &str, css: &str) -> Option<NodeIndex> {
        let host = self.head().or_else(|| self.document_element())?;
        let mut el = ElementData::new("style");
        el.attrs.push(("id".to_string(), id.to_string()));
        let style = self.create_node(NodeData::Element(el));
        let text = self.create_node(NodeData::Text(css.to_string()));
        self.append_child(style, text);
        self.append_child(host, style);
        Some(style)
    }

    fn replace_document(&mut self, html: &str) -> Result<(), String> {
        let fresh = Document::parse(html)?;
        *self = fresh;
        Ok(())
    }

    fn bounding_rect(&self, node: &NodeIndex) -> Option<Rect> {
        self.bounds.get(node).copied()
    }

    fn outer_html(&self) -> String {
        self.document_element()
            .map(|html| emitter::outer_html(self, html))
            .unwrap_or_default()
    }

    fn add_listeners(&mut self, owner: ModeId, listeners: ListenerSet) {
        log::trace!("listen {owner}: {:?}", listeners.events);
        self.listeners.push((owner, listeners));
    }

    fn remove_listeners(&mut self, owner: ModeId) -> usize {
        let before = self.listeners.len();
        self.listeners.retain(|(o, _)| *o != owner);
        before - self.listeners.len()
    }

    fn listener_owners(&self) -> Vec<ModeId> {
        let mut owners: Vec<ModeId> = Vec::new();
        for (owner, _) in &self.listeners {
            if !owners.contains(owner) {
                owners.push(*owner);
            }
        }
        owners
    }

    fn is_listening(&self, owner: ModeId, kind: EventKind) -> bool {
        self.listeners
            .iter()
            .any(|(o, set)| *o == owner && set.events.contains(&kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PAGE: &str = "<!DOCTYPE html><html><head><title>T</title></head><body><section id=\"section-a\"><h1>Hello</h1></section><section id=\"section-b\"><p>World</p></section></body></html>";

    fn doc() -> Document {
        Document::parse(PAGE).unwrap()
    }

    #[test]
    fn finds_head_and_body() {
        let d = doc();
        assert_eq!(d.tag_name(&d.head().unwrap()).as_deref(), Some("head"));
        assert_eq!(d.tag_name(&d.body().unwrap()).as_deref(), Some("body"));
    }

    #[test]
    fn insert_before_reorders_siblings() {
        let mut d = doc();
        let body = d.body().unwrap();
        let a = d.find_element_by_id("section-a").unwrap();
        let b = d.find_element_by_id("section-b").unwrap();
        d.insert_before(&body, &b, Some(&a));
        let ids: Vec<String> = d
            .child_nodes(&body)
            .iter()
            .filter_map(|n| d.id_of(n))
            .collect();
        assert_eq!(ids, vec!["section-b", "section-a"]);
    }

    #[test]
    fn insert_before_refuses_cycles() {
        let mut d = doc();
        let a = d.find_element_by_id("section-a").unwrap();
        let h1 = d.child_nodes(&a)[0];
        d.insert_before(&h1, &a, None);
        assert_eq!(d.parent_element(&h1), Some(a));
    }

    #[test]
    fn adjacent_html_positions() {
        let mut d = doc();
        let a = d.find_element_by_id("section-a").unwrap();
        d.insert_adjacent_html(&a, AdjacentPosition::BeforeBegin, "<hr>").unwrap();
        d.insert_adjacent_html(&a, AdjacentPosition::AfterBegin, "<i>1</i>").unwrap();
        d.insert_adjacent_html(&a, AdjacentPosition::BeforeEnd, "<i>2</i>").unwrap();
        d.insert_adjacent_html(&a, AdjacentPosition::AfterEnd, "<br>").unwrap();
        let body = d.body().unwrap();
        assert_eq!(
            d.inner_html(&body),
            "<hr><section id=\"section-a\"><i>1</i><h1>Hello</h1><i>2</i></section><br><section id=\"section-b\"><p>World</p></section>"
        );
    }

    #[test]
    fn adjacent_html_outside_root_is_error() {
        let mut d = doc();
        let html = d.document_element().unwrap();
        assert!(
            d.insert_adjacent_html(&html, AdjacentPosition::BeforeBegin, "<p>x</p>")
                .is_err()
        );
    }

    #[test]
    fn set_inner_html_replaces_children() {
        let mut d = doc();
        let a = d.find_element_by_id("section-a").unwrap();
        let old_h1 = d.child_nodes(&a)[0];
        d.set_inner_html(&a, "<h2>New <b>title</b></h2>").unwrap();
        assert!(!d.is_connected(&old_h1));
        assert_eq!(d.inner_html(&a), "<h2>New <b>title</b></h2>");
        assert_eq!(d.text_content(&a), "New title");
    }

    #[test]
    fn inject_style_lands_in_head() {
        let mut d = doc();
        let style = d.inject_style("folio-style", ".x{}").unwrap();
        assert_eq!(d.parent_element(&style), d.head());
        d.remove_node(&style);
        assert!(!d.outer_html().contains("folio-style"));
    }

    #[test]
    fn class_and_style_helpers() {
        let mut d = doc();
        let a = d.find_element_by_id("section-a").unwrap();
        d.add_class(&a, "hover");
        d.add_class(&a, "hover");
        assert_eq!(d.attribute(&a, "class").as_deref(), Some("hover"));
        d.remove_class(&a, "hover");
        assert_eq!(d.attribute(&a, "class"), None);

        d.set_style_property(&a, "color", "red");
        assert_eq!(d.style_property(&a, "color").as_deref(), Some("red"));
        d.remove_style_property(&a, "color");
        assert_eq!(d.attribute(&a, "style"), None);
    }

    #[test]
    fn listeners_are_tracked_per_owner() {
        let mut d = doc();
        let content = ModeId::intern("content-editor");
        let style = ModeId::intern("style-editor");
        d.add_listeners(content, ListenerSet::pointer());
        d.add_listeners(style, ListenerSet::pointer());
        assert_eq!(d.listener_owners(), vec![content, style]);
        assert!(d.is_listening(content, EventKind::Click));
        assert_eq!(d.remove_listeners(content), 1);
        assert_eq!(d.listener_owners(), vec![style]);
    }

    #[test]
    fn replace_document_swaps_tree() {
        let mut d = doc();
        d.replace_document("<html><body><p>Other</p></body></html>")
            .unwrap();
        assert_eq!(d.outer_html(), "<html><body><p>Other</p></body></html>");
        assert!(d.replace_document("just text").is_err());
    }
}
