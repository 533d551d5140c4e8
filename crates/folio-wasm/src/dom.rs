//! `PageDom` over a live iframe document.
//!
//! Listeners are gloo `EventListener`s grouped by owning mode; dropping a
//! registration detaches it. Callbacks only do what must happen
//! synchronously (`preventDefault`, drag payload) and queue a [`DomEvent`]
//! for the editor to pump.

use folio_core::{
    AdjacentPosition, EventKind, ListenTarget, ListenerSet, ModeId, NodeType, PageDom, Rect,
};
use folio_editor::DomEvent;
use gloo_events::{EventListener, EventListenerOptions, EventListenerPhase};
use std::rc::Rc;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, DragEvent, Element, Event, EventTarget, HtmlDocument, MouseEvent, Node};

pub type EventQueue = folio_editor::EventQueue<Node>;

struct Registration {
    owner: ModeId,
    kinds: Vec<EventKind>,
    _listeners: Vec<EventListener>,
}

pub struct IframeDom {
    document: Document,
    queue: EventQueue,
    registrations: Vec<Registration>,
}

impl IframeDom {
    pub fn new(document: Document, queue: EventQueue) -> Self {
        Self {
            document,
            queue,
            registrations: Vec::new(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    fn listen_target(&self, target: ListenTarget) -> EventTarget {
        match (target, self.document.body()) {
            (ListenTarget::Body, Some(body)) => body.into(),
            _ => self.document.clone().into(),
        }
    }

    fn query(&self, selector: &str) -> Option<Node> {
        self.document
            .query_selector(selector)
            .ok()
            .flatten()
            .map(Into::into)
    }
}

fn js_err(e: JsValue) -> String {
    e.as_string().unwrap_or_else(|| format!("{e:?}"))
}

fn as_element(node: &Node) -> Option<&Element> {
    node.dyn_ref::<Element>()
}

/// Prefix `html` with a doctype so a rewritten document stays out of
/// quirks mode. Snapshots come from `outerHTML`, which never carries one.
fn with_doctype(doctype: Option<String>, html: &str) -> String {
    let has_doctype = html
        .trim_start()
        .get(..9)
        .is_some_and(|head| head.eq_ignore_ascii_case("<!doctype"));
    if has_doctype {
        return html.to_string();
    }
    let name = doctype
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "html".to_string());
    format!("<!DOCTYPE {name}>{html}")
}

/// Turn a raw DOM event into a queued [`DomEvent`], doing the
/// synchronous part (default suppression, drag payload) in place.
fn on_event(kind: EventKind, event: &Event, queue: &EventQueue) {
    match kind {
        EventKind::Click => {
            // Links and buttons in the preview must not navigate or submit.
            event.prevent_default();
            event.stop_propagation();
        }
        EventKind::DragOver | EventKind::Drop => event.prevent_default(),
        EventKind::DragStart => {
            if let Some(drag) = event.dyn_ref::<DragEvent>()
                && let Some(transfer) = drag.data_transfer()
            {
                transfer.set_effect_allowed("move");
                let id = event
                    .target()
                    .and_then(|t| t.dyn_into::<Element>().ok())
                    .map(|el| el.id())
                    .unwrap_or_default();
                if let Err(e) = transfer.set_data("text/plain", &id) {
                    log::debug!("dragstart payload rejected: {}", js_err(e));
                }
            }
        }
        _ => {}
    }
    let Some(target) = event.target().and_then(|t| t.dyn_into::<Node>().ok()) else {
        return;
    };
    let (x, y) = event
        .dyn_ref::<MouseEvent>()
        .map(|m| (f64::from(m.client_x()), f64::from(m.client_y())))
        .unwrap_or_default();
    queue
        .borrow_mut()
        .push_back(DomEvent::new(kind, target, x, y));
}

impl PageDom for IframeDom {
    type Node = Node;

    fn document_element(&self) -> Option<Node> {
        self.document.document_element().map(Into::into)
    }

    fn head(&self) -> Option<Node> {
        self.query("head")
    }

    fn body(&self) -> Option<Node> {
        self.document.body().map(Into::into)
    }

    fn node_type(&self, node: &Node) -> NodeType {
        match node.node_type() {
            Node::ELEMENT_NODE => NodeType::Element,
            Node::TEXT_NODE | Node::CDATA_SECTION_NODE => NodeType::Text,
            Node::COMMENT_NODE => NodeType::Comment,
            Node::DOCUMENT_NODE => NodeType::Document,
            Node::DOCUMENT_TYPE_NODE => NodeType::Doctype,
            _ => NodeType::Other,
        }
    }

    fn tag_name(&self, node: &Node) -> Option<String> {
        as_element(node).map(|el| el.tag_name().to_ascii_lowercase())
    }

    fn parent_element(&self, node: &Node) -> Option<Node> {
        node.parent_element().map(Into::into)
    }

    fn child_nodes(&self, node: &Node) -> Vec<Node> {
        let list = node.child_nodes();
        (0..list.length()).filter_map(|i| list.item(i)).collect()
    }

    fn is_connected(&self, node: &Node) -> bool {
        node.is_connected()
    }

    fn attribute(&self, node: &Node, name: &str) -> Option<String> {
        as_element(node)?.get_attribute(name)
    }

    fn set_attribute(&mut self, node: &Node, name: &str, value: &str) {
        if let Some(el) = as_element(node)
            && let Err(e) = el.set_attribute(name, value)
        {
            log::warn!("setAttribute({name}) failed: {}", js_err(e));
        }
    }

    fn remove_attribute(&mut self, node: &Node, name: &str) {
        if let Some(el) = as_element(node)
            && let Err(e) = el.remove_attribute(name)
        {
            log::warn!("removeAttribute({name}) failed: {}", js_err(e));
        }
    }

    fn text_content(&self, node: &Node) -> String {
        node.text_content().unwrap_or_default()
    }

    fn inner_html(&self, node: &Node) -> String {
        as_element(node).map(Element::inner_html).unwrap_or_default()
    }

    fn set_inner_html(&mut self, node: &Node, html: &str) -> Result<(), String> {
        let el = as_element(node).ok_or("innerHTML target is not an element")?;
        el.set_inner_html(html);
        Ok(())
    }

    fn insert_adjacent_html(
        &mut self,
        node: &Node,
        position: AdjacentPosition,
        html: &str,
    ) -> Result<(), String> {
        let el = as_element(node).ok_or("insertAdjacentHTML target is not an element")?;
        el.insert_adjacent_html(position.as_dom_str(), html)
            .map_err(js_err)
    }

    fn insert_before(&mut self, parent: &Node, node: &Node, reference: Option<&Node>) {
        if let Err(e) = parent.insert_before(node, reference) {
            log::warn!("insertBefore failed: {}", js_err(e));
        }
    }

    fn remove_node(&mut self, node: &Node) {
        if let Some(parent) = node.parent_node()
            && let Err(e) = parent.remove_child(node)
        {
            log::warn!("removeChild failed: {}", js_err(e));
        }
    }

    fn inject_style(&mut self, id: &str, css: &str) -> Option<Node> {
        let style = self.document.create_element("style").ok()?;
        style.set_id(id);
        style.set_text_content(Some(css));
        let host = self.head().or_else(|| self.document_element())?;
        host.append_child(&style).ok()
    }

    fn replace_document(&mut self, html: &str) -> Result<(), String> {
        let doc = self
            .document
            .dyn_ref::<HtmlDocument>()
            .ok_or("iframe document is not an HTML document")?;
        // open() discards the doctype node, so read it first.
        let markup = with_doctype(self.document.doctype().map(|d| d.name()), html);
        doc.open().map_err(js_err)?;
        doc.write(&js_sys::Array::of1(&JsValue::from_str(&markup)))
            .map_err(js_err)?;
        doc.close().map_err(js_err)?;
        // document.open() drops every listener on the old tree.
        self.registrations.clear();
        Ok(())
    }

    fn bounding_rect(&self, node: &Node) -> Option<Rect> {
        let r = as_element(node)?.get_bounding_client_rect();
        Some(Rect::new(r.left(), r.top(), r.right(), r.bottom()))
    }

    fn outer_html(&self) -> String {
        self.document
            .document_element()
            .map(|el| el.outer_html())
            .unwrap_or_default()
    }

    fn add_listeners(&mut self, owner: ModeId, listeners: ListenerSet) {
        let target = self.listen_target(listeners.target);
        let phase = if listeners.capture {
            EventListenerPhase::Capture
        } else {
            EventListenerPhase::Bubble
        };
        let handles = listeners
            .events
            .iter()
            .map(|&kind| {
                let queue = Rc::clone(&self.queue);
                EventListener::new_with_options(
                    &target,
                    kind.as_dom_str(),
                    EventListenerOptions {
                        phase,
                        passive: false,
                    },
                    move |event: &Event| on_event(kind, event, &queue),
                )
            })
            .collect();
        log::debug!("{owner}: {} listeners attached", listeners.events.len());
        self.registrations.push(Registration {
            owner,
            kinds: listeners.events.to_vec(),
            _listeners: handles,
        });
    }

    fn remove_listeners(&mut self, owner: ModeId) -> usize {
        let before = self.registrations.len();
        self.registrations.retain(|r| r.owner != owner);
        before - self.registrations.len()
    }

    fn listener_owners(&self) -> Vec<ModeId> {
        let mut owners: Vec<ModeId> = Vec::new();
        for r in &self.registrations {
            if !owners.contains(&r.owner) {
                owners.push(r.owner);
            }
        }
        owners
    }

    fn is_listening(&self, owner: ModeId, kind: EventKind) -> bool {
        self.registrations
            .iter()
            .any(|r| r.owner == owner && r.kinds.contains(&kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn snapshot_gets_current_doctype() {
        assert_eq!(
            with_doctype(Some("html".into()), "<html><body></body></html>"),
            "<!DOCTYPE html><html><body></body></html>"
        );
    }

    #[test]
    fn missing_doctype_falls_back_to_html() {
        assert_eq!(with_doctype(None, "<html></html>"), "<!DOCTYPE html><html></html>");
        assert_eq!(
            with_doctype(Some(String::new()), "<html></html>"),
            "<!DOCTYPE html><html></html>"
        );
    }

    #[test]
    fn existing_doctype_is_kept() {
        let html = "  <!doctype html><html></html>";
        assert_eq!(with_doctype(Some("html".into()), html), html);
    }
}
