//! Content editor: pick leaf-text elements and rewrite their text.
//!
//! Edits are applied live but committed once, when the mode is left, and
//! only if something changed.

use crate::highlight::Highlighter;
use crate::input::DomEvent;
use crate::modes::{EditMode, ModeCommand, ModeContext};
use crate::panel::{ElementSummary, PanelState};
use crate::targeting::leaf_text_target;
use folio_core::{EditorConfig, EventKind, ListenerSet, PageDom};

#[derive(Debug)]
pub struct ContentEditor<N> {
    highlight: Highlighter<N>,
    dirty: bool,
}

impl<N: Clone + PartialEq> Default for ContentEditor<N> {
    fn default() -> Self {
        Self {
            highlight: Highlighter::new(),
            dirty: false,
        }
    }
}

impl<N: Clone + PartialEq> ContentEditor<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uncommitted edits are pending.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

impl<D: PageDom> EditMode<D> for ContentEditor<D::Node> {
    fn activate(&mut self, cx: &mut ModeContext<'_, D>) {
        self.dirty = false;
        let css = format!(
            ".{} {{ cursor: text; }}\n",
            cx.config.prefixed(&format!("{}-hover", cx.mode_id.slug()))
        );
        self.highlight.attach(cx, Some(ListenerSet::pointer()), &css);
    }

    fn deactivate(&mut self, cx: &mut ModeContext<'_, D>) {
        self.highlight.detach(cx);
        if self.dirty {
            cx.commit();
            self.dirty = false;
        }
    }

    fn handle_event(&mut self, event: &DomEvent<D::Node>, cx: &mut ModeContext<'_, D>) -> bool {
        match event.kind {
            EventKind::MouseOver => {
                let target = leaf_text_target(&*cx.dom, &event.target);
                self.highlight.hover(cx.dom, target)
            }
            EventKind::MouseOut => {
                let target = leaf_text_target(&*cx.dom, &event.target);
                if target.is_some() && self.highlight.hovered() == target.as_ref() {
                    self.highlight.hover(cx.dom, None)
                } else {
                    false
                }
            }
            EventKind::Click => match leaf_text_target(&*cx.dom, &event.target) {
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
            ModeCommand::SetText { html } => {
                let Some(selected) = self.highlight.selected().cloned() else {
                    return false;
                };
                if cx.dom.inner_html(&selected) == *html {
                    return false;
                }
                match cx.dom.set_inner_html(&selected, html) {
                    Ok(()) => {
                        self.dirty = true;
                        true
                    }
                    Err(e) => {
                        log::warn!("content edit rejected: {e}");
                        false
                    }
                }
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
            focused: None,
            can_select_parent: false,
        }
    }

    fn reset(&mut self) {
        self.highlight.forget();
        self.dirty = false;
    }
}
