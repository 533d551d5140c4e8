//! Theme editor: edit CSS custom properties on the document element.
//!
//! The mode registers no listeners; it is driven entirely by the panel.

use crate::modes::{EditMode, ModeCommand, ModeContext};
use crate::panel::PanelState;
use folio_core::{EditorConfig, PageDom};

#[derive(Debug, Default)]
pub struct ThemeEditor;

impl ThemeEditor {
    pub fn new() -> Self {
        Self
    }

    /// `--*` declarations in the `<html>` inline style.
    pub fn variables<D: PageDom>(dom: &D) -> Vec<(String, String)> {
        let Some(root) = dom.document_element() else {
            return Vec::new();
        };
        dom.inline_style(&root)
            .iter()
            .filter(|(name, _)| name.starts_with("--"))
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }
}

impl<D: PageDom> EditMode<D> for ThemeEditor {
    fn activate(&mut self, cx: &mut ModeContext<'_, D>) {
        log::debug!("{} active: {} variables", cx.mode_id, Self::variables(&*cx.dom).len());
    }

    fn deactivate(&mut self, _cx: &mut ModeContext<'_, D>) {}

    fn handle_command(&mut self, command: &ModeCommand, cx: &mut ModeContext<'_, D>) -> bool {
        let ModeCommand::ApplyTheme { variables } = command else {
            return false;
        };
        let Some(root) = cx.dom.document_element() else {
            return false;
        };
        let mut applied = 0;
        for (name, value) in variables {
            if !name.starts_with("--") {
                log::warn!("theme variable {name:?} is not a custom property");
                continue;
            }
            if value.trim().is_empty() {
                cx.dom.remove_style_property(&root, name);
            } else {
                cx.dom.set_style_property(&root, name, value);
            }
            applied += 1;
        }
        if applied == 0 {
            return false;
        }
        cx.commit();
        true
    }

    fn panel(&self, dom: &D, _config: &EditorConfig) -> PanelState {
        PanelState::Theme {
            variables: Self::variables(dom),
        }
    }

    fn reset(&mut self) {}
}
