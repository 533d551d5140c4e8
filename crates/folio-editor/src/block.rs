//! Block editor: point at a container and insert a block of HTML before,
//! after, or inside it.
//!
//! Hovering shows where a block would land (thirds rule); a click pins
//! that insertion point until the block is inserted or the pin is cleared.

use crate::highlight::Highlighter;
use crate::input::DomEvent;
use crate::modes::{EditMode, ModeCommand, ModeContext};
use crate::panel::{ElementSummary, PanelState};
use crate::targeting::{InsertPosition, block_candidate, insertion_position};
use folio_core::{EditorConfig, EventKind, ListenerSet, PageDom, SelectorList};

#[derive(Debug)]
pub struct BlockEditor<N> {
    highlight: Highlighter<N>,
    candidates: SelectorList,
    /// Insertion point under the pointer.
    indicator: Option<(N, InsertPosition)>,
    /// Insertion point pinned by a click.
    locked: Option<(N, InsertPosition)>,
}

impl<N: Clone + PartialEq> Default for BlockEditor<N> {
    fn default() -> Self {
        Self {
            highlight: Highlighter::new(),
            candidates: SelectorList::default(),
            indicator: None,
            locked: None,
        }
    }
}

fn position_class(config: &EditorConfig, position: InsertPosition) -> String {
    config.prefixed(&format!("block-{}", position.as_str()))
}

impl<N: Clone + PartialEq> BlockEditor<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insertion_point(&self) -> Option<&(N, InsertPosition)> {
        self.locked.as_ref().or(self.indicator.as_ref())
    }

    fn target_at<D: PageDom<Node = N>>(
        &self,
        dom: &D,
        event: &DomEvent<N>,
    ) -> Option<(N, InsertPosition)> {
        let target = block_candidate(dom, &event.target, &self.candidates)?;
        let position = match dom.bounding_rect(&target) {
            _ if dom.has_tag(&target, "body") => InsertPosition::Append,
            Some(rect) => insertion_position(rect, event.y),
            None => InsertPosition::Append,
        };
        Some((target, position))
    }

    fn show_indicator<D: PageDom<Node = N>>(
        &mut self,
        cx: &mut ModeContext<'_, D>,
        next: Option<(N, InsertPosition)>,
    ) -> bool {
        if self.indicator == next {
            return false;
        }
        if let Some((node, position)) = self.indicator.take() {
            cx.dom.remove_class(&node, &position_class(cx.config, position));
        }
        if let Some((node, position)) = &next {
            cx.dom.add_class(node, &position_class(cx.config, *position));
        }
        self.highlight.hover(cx.dom, next.as_ref().map(|(n, _)| n.clone()));
        self.indicator = next;
        true
    }

    /// Remove every position class from the page.
    fn clear_indicators<D: PageDom<Node = N>>(&mut self, cx: &mut ModeContext<'_, D>) {
        self.indicator = None;
        for position in [InsertPosition::Before, InsertPosition::Append, InsertPosition::After] {
            let class = position_class(cx.config, position);
            for el in cx.dom.elements_with_class(&class) {
                cx.dom.remove_class(&el, &class);
            }
        }
    }

    fn insert<D: PageDom<Node = N>>(&mut self, html: &str, cx: &mut ModeContext<'_, D>) -> bool {
        let Some((target, position)) = self.locked.take() else {
            return false;
        };
        if !cx.dom.is_connected(&target) {
            return false;
        }
        self.clear_indicators(cx);
        self.highlight.hover(cx.dom, None);
        self.highlight.select(cx.dom, None);
        match cx.dom.insert_adjacent_html(&target, position.adjacent(), html) {
            Ok(()) => {
                log::debug!("block inserted {}", position.as_str());
                self.highlight.commit(cx);
                true
            }
            Err(e) => {
                log::warn!("block insert rejected: {e}");
                false
            }
        }
    }
}

impl<D: PageDom> EditMode<D> for BlockEditor<D::Node> {
    fn activate(&mut self, cx: &mut ModeContext<'_, D>) {
        self.candidates = SelectorList::from_patterns(&cx.config.block_selectors);
        self.indicator = None;
        self.locked = None;
        let css = format!(
            ".{} {{ box-shadow: inset 0 3px 0 #10b981; }}\n\
             .{} {{ box-shadow: inset 0 0 0 3px #10b981; }}\n\
             .{} {{ box-shadow: inset 0 -3px 0 #10b981; }}\n",
            position_class(cx.config, InsertPosition::Before),
            position_class(cx.config, InsertPosition::Append),
            position_class(cx.config, InsertPosition::After),
        );
        let listeners = ListenerSet::capture_on_body(&[
            EventKind::MouseMove,
            EventKind::MouseOut,
            EventKind::Click,
        ]);
        self.highlight.attach(cx, Some(listeners), &css);
    }

    fn deactivate(&mut self, cx: &mut ModeContext<'_, D>) {
        self.clear_indicators(cx);
        self.locked = None;
        self.highlight.detach(cx);
    }

    fn handle_event(&mut self, event: &DomEvent<D::Node>, cx: &mut ModeContext<'_, D>) -> bool {
        match event.kind {
            EventKind::MouseMove | EventKind::MouseOver => {
                let next = self.target_at(&*cx.dom, event);
                self.show_indicator(cx, next)
            }
            EventKind::MouseOut => {
                let leaving = self
                    .indicator
                    .as_ref()
                    .is_some_and(|(node, _)| *node == event.target);
                leaving && self.show_indicator(cx, None)
            }
            EventKind::Click => {
                let Some((target, position)) = self.target_at(&*cx.dom, event) else {
                    return false;
                };
                self.highlight.select(cx.dom, Some(target.clone()));
                self.locked = Some((target, position));
                true
            }
            _ => false,
        }
    }

    fn handle_command(&mut self, command: &ModeCommand, cx: &mut ModeContext<'_, D>) -> bool {
        self.highlight.prune(&*cx.dom);
        match command {
            ModeCommand::InsertBlock { html } => self.insert(html, cx),
            ModeCommand::ClearSelection => {
                self.locked = None;
                self.highlight.select(cx.dom, None)
            }
            _ => false,
        }
    }

    fn panel(&self, dom: &D, config: &EditorConfig) -> PanelState {
        let point = self.insertion_point();
        PanelState::Block {
            target: point.and_then(|(n, _)| ElementSummary::describe(dom, n, config)),
            position: point.map(|(_, p)| *p),
            locked: self.locked.is_some(),
        }
    }

    fn reset(&mut self) {
        self.highlight.forget();
        self.indicator = None;
        self.locked = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::HtmlChange;
    use folio_core::{Document, ModeId, NodeIndex, Rect};
    use pretty_assertions::assert_eq;

    const PAGE: &str = concat!(
        "<html><head></head><body>",
        "<section id=\"s\"><h2 id=\"h\">Title</h2></section>",
        "<p id=\"loose\">loose</p>",
        "</body></html>"
    );

    type Cx<'a> = ModeContext<'a, Document>;

    fn run(f: impl FnOnce(&mut BlockEditor<NodeIndex>, &mut Cx<'_>)) -> (Document, Vec<HtmlChange>) {
        let mut doc = Document::parse(PAGE).unwrap();
        let section = doc.find_element_by_id("s").unwrap();
        doc.set_bounds(section, Rect::new(0.0, 0.0, 800.0, 300.0));
        let config = EditorConfig::default();
        let mut changes = Vec::new();
        {
            let mut mode = BlockEditor::new();
            let mut cx =
                ModeContext::new(&mut doc, &config, ModeId::intern("block-editor"), "Blocks", &mut changes);
            mode.activate(&mut cx);
            f(&mut mode, &mut cx);
            mode.deactivate(&mut cx);
        }
        (doc, changes)
    }

    fn event(cx: &Cx<'_>, kind: EventKind, id: &str, y: f64) -> DomEvent<NodeIndex> {
        DomEvent::new(kind, cx.dom.find_element_by_id(id).unwrap(), 10.0, y)
    }

    #[test]
    fn hover_thirds_pick_position() {
        run(|mode, cx| {
            let section = cx.dom.find_element_by_id("s").unwrap();
            for (y, position) in [
                (50.0, InsertPosition::Before),
                (150.0, InsertPosition::Append),
                (250.0, InsertPosition::After),
            ] {
                let ev = event(cx, EventKind::MouseMove, "h", y);
                mode.handle_event(&ev, cx);
                assert_eq!(mode.insertion_point(), Some(&(section, position)));
                assert!(cx.dom.has_class(&section, &format!("folio-block-{}", position.as_str())));
            }
            // Only the current position class is present.
            assert!(!cx.dom.has_class(&section, "folio-block-before"));
        });
    }

    #[test]
    fn uncontained_elements_target_body() {
        run(|mode, cx| {
            let ev = event(cx, EventKind::MouseMove, "loose", 5.0);
            mode.handle_event(&ev, cx);
            let body = cx.dom.body().unwrap();
            assert_eq!(mode.insertion_point(), Some(&(body, InsertPosition::Append)));
        });
    }

    #[test]
    fn insert_after_locked_target() {
        let (doc, changes) = run(|mode, cx| {
            assert!(!mode.handle_command(&ModeCommand::InsertBlock { html: "<p>x</p>".into() }, cx));
            let ev = event(cx, EventKind::Click, "h", 280.0);
            assert!(mode.handle_event(&ev, cx));
            // Moving the pointer afterwards does not move the pinned point.
            let ev = event(cx, EventKind::MouseMove, "h", 10.0);
            mode.handle_event(&ev, cx);
            assert!(mode.handle_command(
                &ModeCommand::InsertBlock {
                    html: "<aside id=\"new\">New</aside>".into()
                },
                cx
            ));
        });
        assert_eq!(changes.len(), 1);
        assert!(changes[0].html.contains("</section><aside id=\"new\">New</aside><p id=\"loose\">"));
        assert!(!changes[0].html.contains("folio-block"));
        assert!(doc.find_element_by_id("new").is_some());
    }

    #[test]
    fn insert_before_and_append() {
        let (_, changes) = run(|mode, cx| {
            let ev = event(cx, EventKind::Click, "h", 20.0);
            mode.handle_event(&ev, cx);
            mode.handle_command(&ModeCommand::InsertBlock { html: "<hr>".into() }, cx);
            let ev = event(cx, EventKind::Click, "h", 150.0);
            mode.handle_event(&ev, cx);
            mode.handle_command(&ModeCommand::InsertBlock { html: "<p>end</p>".into() }, cx);
        });
        assert_eq!(changes.len(), 2);
        assert!(changes[0].html.contains("<body><hr><section id=\"s\">"));
        assert!(changes[1].html.contains("<h2 id=\"h\">Title</h2><p>end</p></section>"));
    }
}
