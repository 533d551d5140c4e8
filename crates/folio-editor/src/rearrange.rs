//! Section rearranger: drag sections to reorder them.
//!
//! Every section is made draggable while the mode is active. The drag
//! state machine is `Idle → Dragging → Idle`; a drop above a target's
//! vertical midpoint inserts before it, below inserts after. The new order
//! is committed once, on exit, if any drop happened.

use crate::highlight::Highlighter;
use crate::input::DomEvent;
use crate::modes::{EditMode, ModeCommand, ModeContext};
use crate::panel::PanelState;
use crate::targeting::{DropPlacement, drop_placement, section_ancestor};
use folio_core::{EditorConfig, EventKind, ListenerSet, PageDom};

const DRAG_OPACITY: &str = "0.5";
const DRAG_TRANSFORM: &str = "scale(0.98)";

/// Inline styles overwritten on the dragged section, saved for restoring.
#[derive(Debug, Clone, PartialEq)]
struct SavedStyle {
    opacity: Option<String>,
    transform: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
enum DragState<N> {
    Idle,
    Dragging {
        source: N,
        saved: SavedStyle,
        over: Option<(N, DropPlacement)>,
    },
}

#[derive(Debug)]
pub struct SectionRearranger<N> {
    highlight: Highlighter<N>,
    state: DragState<N>,
    /// Sections whose `draggable` attribute we added.
    marked: Vec<N>,
    has_changes: bool,
}

impl<N: Clone + PartialEq> Default for SectionRearranger<N> {
    fn default() -> Self {
        Self {
            highlight: Highlighter::new(),
            state: DragState::Idle,
            marked: Vec::new(),
            has_changes: false,
        }
    }
}

impl<N: Clone + PartialEq> SectionRearranger<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_changes(&self) -> bool {
        self.has_changes
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    fn sections<D: PageDom<Node = N>>(dom: &D, config: &EditorConfig) -> Vec<N> {
        dom.body()
            .map(|body| {
                dom.elements()
                    .into_iter()
                    .filter(|n| *n != body)
                    .filter(|n| dom.id_of(n).is_some_and(|id| config.is_section_id(&id)))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn drag_start<D: PageDom<Node = N>>(&mut self, target: &N, cx: &mut ModeContext<'_, D>) -> bool {
        let is_section = cx
            .dom
            .id_of(target)
            .is_some_and(|id| cx.config.is_section_id(&id));
        if !is_section {
            return false;
        }
        self.end_drag(cx);
        let saved = SavedStyle {
            opacity: cx.dom.style_property(target, "opacity"),
            transform: cx.dom.style_property(target, "transform"),
        };
        cx.dom.set_style_property(target, "opacity", DRAG_OPACITY);
        cx.dom.set_style_property(target, "transform", DRAG_TRANSFORM);
        self.highlight.select(cx.dom, Some(target.clone()));
        self.state = DragState::Dragging {
            source: target.clone(),
            saved,
            over: None,
        };
        true
    }

    fn drag_over<D: PageDom<Node = N>>(&mut self, event: &DomEvent<N>, cx: &mut ModeContext<'_, D>) -> bool {
        let DragState::Dragging { source, over, .. } = &mut self.state else {
            return false;
        };
        let candidate = section_ancestor(&*cx.dom, &event.target, cx.config)
            .filter(|c| *c != *source && !is_inside(&*cx.dom, c, source));
        let next = candidate.map(|c| {
            let placement = cx
                .dom
                .bounding_rect(&c)
                .map(|rect| drop_placement(rect, event.y))
                .unwrap_or(DropPlacement::After);
            (c, placement)
        });
        let hover = next.as_ref().map(|(n, _)| n.clone());
        *over = next;
        self.highlight.hover(cx.dom, hover);
        true
    }

    fn drag_leave<D: PageDom<Node = N>>(&mut self, event: &DomEvent<N>, cx: &mut ModeContext<'_, D>) -> bool {
        let DragState::Dragging { over, .. } = &mut self.state else {
            return false;
        };
        let leaving = section_ancestor(&*cx.dom, &event.target, cx.config);
        if leaving.is_none() || over.as_ref().map(|(n, _)| n) != leaving.as_ref() {
            return false;
        }
        *over = None;
        self.highlight.hover(cx.dom, None);
        true
    }

    fn drop_on<D: PageDom<Node = N>>(&mut self, event: &DomEvent<N>, cx: &mut ModeContext<'_, D>) -> bool {
        let DragState::Dragging { source, .. } = &self.state else {
            return false;
        };
        let source = source.clone();
        let target = section_ancestor(&*cx.dom, &event.target, cx.config)
            .filter(|c| *c != source && !is_inside(&*cx.dom, c, &source));
        let moved = match target {
            Some(target) => {
                let placement = cx
                    .dom
                    .bounding_rect(&target)
                    .map(|rect| drop_placement(rect, event.y))
                    .unwrap_or(DropPlacement::After);
                move_section(cx.dom, &source, &target, placement)
            }
            None => false,
        };
        self.end_drag(cx);
        if moved {
            self.has_changes = true;
        }
        moved
    }

    /// Restore the dragged section's styles and return to idle.
    fn end_drag<D: PageDom<Node = N>>(&mut self, cx: &mut ModeContext<'_, D>) {
        let DragState::Dragging { source, saved, .. } =
            std::mem::replace(&mut self.state, DragState::Idle)
        else {
            return;
        };
        restore_style(cx.dom, &source, "opacity", saved.opacity.as_deref());
        restore_style(cx.dom, &source, "transform", saved.transform.as_deref());
        self.highlight.hover(cx.dom, None);
        self.highlight.select(cx.dom, None);
    }
}

fn restore_style<D: PageDom>(dom: &mut D, node: &D::Node, property: &str, value: Option<&str>) {
    match value {
        Some(value) => dom.set_style_property(node, property, value),
        None => dom.remove_style_property(node, property),
    }
}

fn is_inside<D: PageDom>(dom: &D, node: &D::Node, ancestor: &D::Node) -> bool {
    let mut current = dom.parent_element(node);
    while let Some(el) = current {
        if el == *ancestor {
            return true;
        }
        current = dom.parent_element(&el);
    }
    false
}

/// Move `source` next to `target` in `target`'s parent.
fn move_section<D: PageDom>(
    dom: &mut D,
    source: &D::Node,
    target: &D::Node,
    placement: DropPlacement,
) -> bool {
    let Some(parent) = dom.parent_element(target) else {
        return false;
    };
    let reference = match placement {
        DropPlacement::Before => Some(target.clone()),
        // The source already sits right after the target.
        DropPlacement::After => match dom.next_element_sibling(target) {
            Some(next) if next == *source => dom.next_element_sibling(source),
            other => other,
        },
    };
    log::debug!("move section {:?} {:?} {:?}", source, placement, target);
    dom.insert_before(&parent, source, reference.as_ref());
    true
}

impl<D: PageDom> EditMode<D> for SectionRearranger<D::Node> {
    fn activate(&mut self, cx: &mut ModeContext<'_, D>) {
        self.has_changes = false;
        self.state = DragState::Idle;
        self.marked.clear();
        for section in Self::sections(&*cx.dom, cx.config) {
            if cx.dom.attribute(&section, "draggable").is_none() {
                cx.dom.set_attribute(&section, "draggable", "true");
                self.marked.push(section);
            }
        }
        let css = format!(
            "[id^=\"{}\"][draggable] {{ cursor: grab; }}\n",
            cx.config.section_prefix
        );
        let listeners = ListenerSet::capture_on_body(&[
            EventKind::DragStart,
            EventKind::DragOver,
            EventKind::DragLeave,
            EventKind::Drop,
            EventKind::DragEnd,
        ]);
        self.highlight.attach(cx, Some(listeners), &css);
    }

    fn deactivate(&mut self, cx: &mut ModeContext<'_, D>) {
        self.end_drag(cx);
        for section in std::mem::take(&mut self.marked) {
            cx.dom.remove_attribute(&section, "draggable");
        }
        self.highlight.detach(cx);
        if self.has_changes {
            cx.commit();
            self.has_changes = false;
        }
    }

    fn handle_event(&mut self, event: &DomEvent<D::Node>, cx: &mut ModeContext<'_, D>) -> bool {
        match event.kind {
            EventKind::DragStart => self.drag_start(&event.target, cx),
            EventKind::DragOver => self.drag_over(event, cx),
            EventKind::DragLeave => self.drag_leave(event, cx),
            EventKind::Drop => self.drop_on(event, cx),
            EventKind::DragEnd => {
                let dragging = self.is_dragging();
                self.end_drag(cx);
                dragging
            }
            _ => false,
        }
    }

    fn handle_command(&mut self, command: &ModeCommand, cx: &mut ModeContext<'_, D>) -> bool {
        match command {
            ModeCommand::ClearSelection => {
                let dragging = self.is_dragging();
                self.end_drag(cx);
                dragging
            }
            _ => false,
        }
    }

    fn panel(&self, dom: &D, config: &EditorConfig) -> PanelState {
        let id = |n: &D::Node| dom.id_of(n).unwrap_or_default();
        let (dragging, drop_target) = match &self.state {
            DragState::Idle => (None, None),
            DragState::Dragging { source, over, .. } => (
                Some(id(source)),
                over.as_ref().map(|(n, placement)| (id(n), *placement)),
            ),
        };
        PanelState::Rearrange {
            sections: Self::sections(dom, config).iter().map(id).collect(),
            dragging,
            drop_target,
            has_changes: self.has_changes,
        }
    }

    fn reset(&mut self) {
        self.highlight.forget();
        self.state = DragState::Idle;
        self.marked.clear();
        self.has_changes = false;
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
        "<section id=\"section-a\">A</section>",
        "<section id=\"section-b\" style=\"opacity: 0.9;\">B</section>",
        "<section id=\"section-c\"><h2>C</h2></section>",
        "</body></html>"
    );

    type Cx<'a> = ModeContext<'a, Document>;

    fn setup() -> Document {
        let mut doc = Document::parse(PAGE).unwrap();
        for (i, id) in ["section-a", "section-b", "section-c"].iter().enumerate() {
            let n = doc.find_element_by_id(id).unwrap();
            let top = i as f64 * 100.0;
            doc.set_bounds(n, Rect::new(0.0, top, 800.0, top + 100.0));
        }
        doc
    }

    fn run(f: impl FnOnce(&mut SectionRearranger<NodeIndex>, &mut Cx<'_>)) -> (Document, Vec<HtmlChange>) {
        let mut doc = setup();
        let config = EditorConfig::default();
        let mut changes = Vec::new();
        {
            let mut mode = SectionRearranger::new();
            let mut cx = ModeContext::new(
                &mut doc,
                &config,
                ModeId::intern("section-rearranger"),
                "Rearrange",
                &mut changes,
            );
            mode.activate(&mut cx);
            f(&mut mode, &mut cx);
            mode.deactivate(&mut cx);
        }
        (doc, changes)
    }

    fn ev(cx: &Cx<'_>, kind: EventKind, id: &str, y: f64) -> DomEvent<NodeIndex> {
        DomEvent::new(kind, cx.dom.find_element_by_id(id).unwrap(), 0.0, y)
    }

    fn order(doc: &Document) -> Vec<String> {
        SectionRearranger::<NodeIndex>::sections(doc, &EditorConfig::default())
            .iter()
            .map(|n| doc.id_of(n).unwrap())
            .collect()
    }

    fn drag(mode: &mut SectionRearranger<NodeIndex>, cx: &mut Cx<'_>, from: &str, to: &str, y: f64) -> bool {
        let start = ev(cx, EventKind::DragStart, from, 0.0);
        assert!(mode.handle_event(&start, cx));
        let over = ev(cx, EventKind::DragOver, to, y);
        mode.handle_event(&over, cx);
        let drop = ev(cx, EventKind::Drop, to, y);
        mode.handle_event(&drop, cx)
    }

    #[test]
    fn sections_become_draggable_while_active() {
        let (doc, changes) = run(|_, cx| {
            let a = cx.dom.find_element_by_id("section-a").unwrap();
            assert_eq!(cx.dom.attribute(&a, "draggable").as_deref(), Some("true"));
        });
        assert!(changes.is_empty());
        let a = doc.find_element_by_id("section-a").unwrap();
        assert_eq!(doc.attribute(&a, "draggable"), None);
    }

    #[test]
    fn drop_below_midpoint_inserts_after() {
        let (doc, changes) = run(|mode, cx| {
            assert!(drag(mode, cx, "section-a", "section-b", 160.0));
            assert!(mode.has_changes());
        });
        assert_eq!(order(&doc), vec!["section-b", "section-a", "section-c"]);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].mode_id.as_str(), "section-rearranger");
        assert!(!changes[0].html.contains("draggable"));
    }

    #[test]
    fn drop_above_midpoint_inserts_before() {
        let (doc, _) = run(|mode, cx| {
            assert!(drag(mode, cx, "section-c", "section-a", 20.0));
        });
        assert_eq!(order(&doc), vec!["section-c", "section-a", "section-b"]);
    }

    #[test]
    fn drop_on_inner_element_uses_its_section() {
        let (doc, _) = run(|mode, cx| {
            let start = ev(cx, EventKind::DragStart, "section-a", 0.0);
            mode.handle_event(&start, cx);
            let c = cx.dom.find_element_by_id("section-c").unwrap();
            let h2 = cx.dom.child_nodes(&c)[0];
            assert!(mode.handle_event(&DomEvent::new(EventKind::Drop, h2, 0.0, 290.0), cx));
        });
        assert_eq!(order(&doc), vec!["section-b", "section-c", "section-a"]);
    }

    #[test]
    fn drag_styles_are_restored() {
        let (doc, changes) = run(|mode, cx| {
            let start = ev(cx, EventKind::DragStart, "section-b", 0.0);
            assert!(mode.handle_event(&start, cx));
            let b = cx.dom.find_element_by_id("section-b").unwrap();
            assert_eq!(cx.dom.style_property(&b, "opacity").as_deref(), Some("0.5"));
            assert_eq!(cx.dom.style_property(&b, "transform").as_deref(), Some("scale(0.98)"));
            let end = ev(cx, EventKind::DragEnd, "section-b", 0.0);
            assert!(mode.handle_event(&end, cx));
            assert!(!mode.is_dragging());
        });
        assert!(changes.is_empty());
        let b = doc.find_element_by_id("section-b").unwrap();
        assert_eq!(doc.attribute(&b, "style").as_deref(), Some("opacity: 0.9;"));
    }

    #[test]
    fn drop_on_self_changes_nothing() {
        let (doc, changes) = run(|mode, cx| {
            assert!(!drag(mode, cx, "section-a", "section-a", 90.0));
        });
        assert_eq!(order(&doc), vec!["section-a", "section-b", "section-c"]);
        assert!(changes.is_empty());
    }

    #[test]
    fn non_sections_do_not_start_a_drag() {
        run(|mode, cx| {
            let c = cx.dom.find_element_by_id("section-c").unwrap();
            let h2 = cx.dom.child_nodes(&c)[0];
            assert!(!mode.handle_event(&DomEvent::at_origin(EventKind::DragStart, h2), cx));
        });
    }

    #[test]
    fn panel_reports_order_and_drag() {
        run(|mode, cx| {
            let start = ev(cx, EventKind::DragStart, "section-a", 0.0);
            mode.handle_event(&start, cx);
            let over = ev(cx, EventKind::DragOver, "section-c", 250.0);
            mode.handle_event(&over, cx);
            let panel = mode.panel(&*cx.dom, cx.config);
            assert_eq!(
                panel,
                PanelState::Rearrange {
                    sections: vec!["section-a".into(), "section-b".into(), "section-c".into()],
                    dragging: Some("section-a".into()),
                    drop_target: Some(("section-c".into(), DropPlacement::After)),
                    has_changes: false,
                }
            );
        });
    }
}
