//! Section editor: pick whole sections (`id` with the section prefix),
//! with leaf-text sub-selection inside the selected section.

use crate::highlight::Highlighter;
use crate::input::DomEvent;
use crate::modes::{EditMode, ModeCommand, ModeContext};
use crate::panel::{ElementSummary, PanelState};
use crate::targeting::{leaf_text_target, section_ancestor};
use folio_core::{AdjacentPosition, EditorConfig, EventKind, ListenerSet, PageDom};

#[derive(Debug)]
pub struct SectionEditor<N> {
    highlight: Highlighter<N>,
}

impl<N: Clone + PartialEq> Default for SectionEditor<N> {
    fn default() -> Self {
        Self {
            highlight: Highlighter::new(),
        }
    }
}

impl<N: Clone + PartialEq> SectionEditor<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap the selected section for `html`, selecting the first new element.
    /// Markup without an element leaves the section in place.
    fn replace_section<D: PageDom<Node = N>>(
        &mut self,
        html: &str,
        cx: &mut ModeContext<'_, D>,
    ) -> bool {
        let Some(section) = self.highlight.selected().cloned() else {
            return false;
        };
        let Some(parent) = cx.dom.parent_element(&section) else {
            return false;
        };
        let before = cx.dom.child_nodes(&parent);
        self.highlight.select(cx.dom, None);
        if let Err(e) = cx
            .dom
            .insert_adjacent_html(&section, AdjacentPosition::AfterEnd, html)
        {
            log::warn!("section replace rejected: {e}");
            self.highlight.select(cx.dom, Some(section));
            return false;
        }
        let inserted: Vec<N> = cx
            .dom
            .child_nodes(&parent)
            .into_iter()
            .filter(|n| !before.contains(n))
            .collect();
        let Some(replacement) = inserted.iter().find(|n| cx.dom.is_element(n)).cloned() else {
            log::warn!("section replace carried no element; keeping the section");
            for node in &inserted {
                cx.dom.remove_node(node);
            }
            self.highlight.select(cx.dom, Some(section));
            return false;
        };
        cx.dom.remove_node(&section);
        self.highlight.select(cx.dom, Some(replacement));
        self.highlight.commit(cx);
        true
    }
}

impl<D: PageDom> EditMode<D> for SectionEditor<D::Node> {
    fn activate(&mut self, cx: &mut ModeContext<'_, D>) {
        self.highlight.attach(cx, Some(ListenerSet::pointer()), "");
    }

    fn deactivate(&mut self, cx: &mut ModeContext<'_, D>) {
        self.highlight.detach(cx);
    }

    fn handle_event(&mut self, event: &DomEvent<D::Node>, cx: &mut ModeContext<'_, D>) -> bool {
        let section = section_ancestor(&*cx.dom, &event.target, cx.config);
        match event.kind {
            EventKind::MouseOver => self.highlight.hover(cx.dom, section),
            EventKind::MouseOut => {
                if section.is_some() && self.highlight.hovered() == section.as_ref() {
                    self.highlight.hover(cx.dom, None)
                } else {
                    false
                }
            }
            EventKind::Click => {
                let Some(section) = section else {
                    return false;
                };
                if self.highlight.selected() != Some(&section) {
                    self.highlight.select(cx.dom, Some(section));
                    return true;
                }
                let text = leaf_text_target(&*cx.dom, &event.target);
                self.highlight.focus(cx.dom, text);
                true
            }
            _ => false,
        }
    }

    fn handle_command(&mut self, command: &ModeCommand, cx: &mut ModeContext<'_, D>) -> bool {
        self.highlight.prune(&*cx.dom);
        match command {
            ModeCommand::SetText { html } => {
                let Some(focused) = self.highlight.focused().cloned() else {
                    return false;
                };
                match cx.dom.set_inner_html(&focused, html) {
                    Ok(()) => {
                        self.highlight.commit(cx);
                        true
                    }
                    Err(e) => {
                        log::warn!("section text edit rejected: {e}");
                        false
                    }
                }
            }
            ModeCommand::ReplaceSection { html } => self.replace_section(html, cx),
            ModeCommand::RemoveSection => {
                let Some(section) = self.highlight.selected().cloned() else {
                    return false;
                };
                self.highlight.select(cx.dom, None);
                self.highlight.hover(cx.dom, None);
                cx.dom.remove_node(&section);
                self.highlight.commit(cx);
                true
            }
            ModeCommand::ClearSelection => self.highlight.select(cx.dom, None),
            _ => false,
        }
    }

    fn panel(&self, dom: &D, config: &EditorConfig) -> PanelState {
        PanelState::Selection {
            selected: self
                .highlight
                .selected()
                .and_then(|n| ElementSummary::describe(dom, n, config)),
            focused: self
                .highlight
                .focused()
                .and_then(|n| ElementSummary::describe(dom, n, config)),
            can_select_parent: false,
        }
    }

    fn reset(&mut self) {
        self.highlight.forget();
    }
}
