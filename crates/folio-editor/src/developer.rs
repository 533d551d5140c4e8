//! Developer view: a read-only snapshot of the page source.

use crate::modes::{EditMode, ModeCommand, ModeContext};
use crate::panel::PanelState;
use folio_core::{EditorConfig, PageDom};

#[derive(Debug, Default)]
pub struct DeveloperView {
    source: Option<String>,
}

impl DeveloperView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}

impl<D: PageDom> EditMode<D> for DeveloperView {
    fn activate(&mut self, cx: &mut ModeContext<'_, D>) {
        self.source = Some(cx.dom.outer_html());
    }

    fn deactivate(&mut self, _cx: &mut ModeContext<'_, D>) {
        self.source = None;
    }

    fn handle_command(&mut self, command: &ModeCommand, cx: &mut ModeContext<'_, D>) -> bool {
        match command {
            ModeCommand::Refresh => {
                self.source = Some(cx.dom.outer_html());
                true
            }
            _ => false,
        }
    }

    fn panel(&self, _dom: &D, _config: &EditorConfig) -> PanelState {
        match &self.source {
            Some(html) => PanelState::Source { html: html.clone() },
            None => PanelState::Empty,
        }
    }

    fn reset(&mut self) {
        self.source = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{Document, ModeId};
    use pretty_assertions::assert_eq;

    #[test]
    fn snapshot_refreshes_on_demand() {
        let mut doc = Document::parse("<html><body><p id=\"p\">a</p></body></html>").unwrap();
        let config = EditorConfig::default();
        let mut changes = Vec::new();
        let mut view = DeveloperView::new();
        let mut cx = ModeContext::new(&mut doc, &config, ModeId::intern("developer-view"), "Source", &mut changes);
        EditMode::<Document>::activate(&mut view, &mut cx);
        assert_eq!(view.source(), Some("<html><body><p id=\"p\">a</p></body></html>"));

        let p = cx.dom.find_element_by_id("p").unwrap();
        cx.dom.set_attribute(&p, "title", "t");
        assert_eq!(view.source(), Some("<html><body><p id=\"p\">a</p></body></html>"));
        assert!(view.handle_command(&ModeCommand::Refresh, &mut cx));
        assert_eq!(view.source(), Some("<html><body><p id=\"p\" title=\"t\">a</p></body></html>"));

        EditMode::<Document>::deactivate(&mut view, &mut cx);
        assert!(changes.is_empty());
    }
}
