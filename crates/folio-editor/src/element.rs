//! Element picker behind the style editor and the page editor.
//!
//! Both modes select any page element (text nodes resolve to their parent)
//! and can walk up to the parent. The style editor edits inline CSS; the
//! page editor edits text, attributes and structure. Each edit commits.

use crate::highlight::Highlighter;
use crate::input::DomEvent;
use crate::modes::{EditMode, ModeCommand, ModeContext};
use crate::panel::{ElementSummary, PanelState};
use crate::targeting::{parent_selection, selectable_element};
use folio_core::{EditorConfig, EventKind, ListenerSet, PageDom};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementFlavor {
    Style,
    Page,
}

#[derive(Debug)]
pub struct ElementEditor<N> {
    flavor: ElementFlavor,
    highlight: Highlighter<N>,
}

impl<N: Clone + PartialEq> ElementEditor<N> {
    pub fn new(flavor: ElementFlavor) -> Self {
        Self {
            flavor,
            highlight: Highlighter::new(),
        }
    }

    pub fn style() -> Self {
        Self::new(ElementFlavor::Style)
    }

    pub fn page() -> Self {
        Self::new(ElementFlavor::Page)
    }

    pub fn flavor(&self) -> ElementFlavor {
        self.flavor
    }

    fn apply<D: PageDom<Node = N>>(
        &mut self,
        command: &ModeCommand,
        selected: &N,
        cx: &mut ModeContext<'_, D>,
    ) -> Result<(), String> {
        match (self.flavor, command) {
            (ElementFlavor::Style, ModeCommand::SetStyle { property, value }) => {
                if property.trim().is_empty() {
                    return Err("Empty style property".to_string());
                }
                cx.dom.set_style_property(selected, property, value);
            }
            (ElementFlavor::Style, ModeCommand::ClearStyle { property }) => {
                cx.dom.remove_style_property(selected, property);
            }
            (ElementFlavor::Page, ModeCommand::SetText { html }) => {
                cx.dom.set_inner_html(selected, html)?;
            }
            (ElementFlavor::Page, ModeCommand::SetAttribute { name, value }) => {
                let name = name.trim().to_ascii_lowercase();
                if name.is_empty() || name.starts_with("on") {
                    return Err(format!("Refusing to set attribute {name:?}"));
                }
                cx.dom.set_attribute(selected, &name, value);
            }
            (ElementFlavor::Page, ModeCommand::RemoveElement) => {
                if cx.dom.has_tag(selected, "body") {
                    return Err("Refusing to remove <body>".to_string());
                }
                self.highlight.select(cx.dom, None);
                self.highlight.hover(cx.dom, None);
                cx.dom.remove_node(selected);
            }
            _ => return Err(format!("{:?} does not apply here", command)),
        }
        Ok(())
    }
}

impl<D: PageDom> EditMode<D> for ElementEditor<D::Node> {
    fn activate(&mut self, cx: &mut ModeContext<'_, D>) {
        self.highlight.attach(cx, Some(ListenerSet::pointer()), "");
    }

    fn deactivate(&mut self, cx: &mut ModeContext<'_, D>) {
        self.highlight.detach(cx);
    }

    fn handle_event(&mut self, event: &DomEvent<D::Node>, cx: &mut ModeContext<'_, D>) -> bool {
        let target = selectable_element(&*cx.dom, &event.target);
        match event.kind {
            EventKind::MouseOver => self.highlight.hover(cx.dom, target),
            EventKind::MouseOut => {
                if target.is_some() && self.highlight.hovered() == target.as_ref() {
                    self.highlight.hover(cx.dom, None)
                } else {
                    false
                }
            }
            EventKind::Click => match target {
                Some(target) => {
                    self.highlight.select(cx.dom, Some(target));
                    true
                }
                None => false,
            },
            _ => false,
        }
    }

    fn handle_command(&mut self, command: &ModeCommand, cx: &mut ModeContext<'_, D>) -> bool {
        self.highlight.prune(&*cx.dom);
        match command {
            ModeCommand::ClearSelection => return self.highlight.select(cx.dom, None),
            ModeCommand::SelectParent => {
                let parent = self
                    .highlight
                    .selected()
                    .and_then(|n| parent_selection(&*cx.dom, n));
                return match parent {
                    Some(parent) => self.highlight.select(cx.dom, Some(parent)),
                    None => false,
                };
            }
            _ => {}
        }
        let Some(selected) = self.highlight.selected().cloned() else {
            return false;
        };
        match self.apply(command, &selected, cx) {
            Ok(()) => {
                self.highlight.commit(cx);
                true
            }
            Err(e) => {
                log::debug!("{} ignored command: {e}", cx.mode_id);
                false
            }
        }
    }

    fn panel(&self, dom: &D, config: &EditorConfig) -> PanelState {
        let selected = self.highlight.selected();
        PanelState::Selection {
            selected: selected.and_then(|n| ElementSummary::describe(dom, n, config)),
            focused: None,
            can_select_parent: selected.is_some_and(|n| parent_selection(dom, n).is_some()),
        }
    }

    fn reset(&mut self) {
        self.highlight.forget();
    }
}
