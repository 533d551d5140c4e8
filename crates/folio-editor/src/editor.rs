//! `PageEditor`: the registry, the active-mode pointer, the iframe bridge
//! and the change outbox behind one facade.
//!
//! Every entry point routes through the active controller with a fresh
//! [`ModeContext`]. Commits land in the outbox (drained by the host with
//! `take_changes`) and in the undo history.

use crate::block::BlockEditor;
use crate::bridge::IframeBridge;
use crate::commit::HtmlChange;
use crate::content::ContentEditor;
use crate::developer::DeveloperView;
use crate::element::ElementEditor;
use crate::history::HistoryStack;
use crate::input::{DomEvent, EventQueue};
use crate::modes::{
    BLOCK_EDITOR, CONTENT_EDITOR, DEVELOPER_VIEW, EditMode, ModeCommand, ModeContext,
    ModeDescriptor, ModeRegistry, PAGE_EDITOR, SECTION_EDITOR, SECTION_REARRANGER, STYLE_EDITOR,
    THEME_EDITOR, ToolbarAction, ToolbarEntry,
};
use crate::panel::PanelState;
use crate::rearrange::SectionRearranger;
use crate::section::SectionEditor;
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::theme::ThemeEditor;
use folio_core::{EditorConfig, ModeId, PageDom};
use std::rc::Rc;

/// The eight built-in modes in toolbar order.
pub fn builtin_modes<D: PageDom>() -> Vec<ModeDescriptor<D>>
where
    D::Node: 'static,
{
    let action = |label: &str, icon: &str, key: usize| {
        ToolbarAction::new(label)
            .with_icon(icon)
            .with_shortcut(&key.to_string())
    };
    vec![
        ModeDescriptor::new(THEME_EDITOR, ThemeEditor::new())
            .with_action(action("Theme", "palette", 1)),
        ModeDescriptor::new(SECTION_REARRANGER, SectionRearranger::new())
            .with_action(action("Rearrange", "arrows-up-down", 2)),
        ModeDescriptor::new(CONTENT_EDITOR, ContentEditor::new())
            .with_action(action("Content", "type", 3)),
        ModeDescriptor::new(SECTION_EDITOR, SectionEditor::new())
            .with_action(action("Sections", "layout", 4)),
        ModeDescriptor::new(PAGE_EDITOR, ElementEditor::page())
            .with_action(action("Page", "file", 5)),
        ModeDescriptor::new(STYLE_EDITOR, ElementEditor::style())
            .with_action(action("Style", "brush", 6)),
        ModeDescriptor::new(BLOCK_EDITOR, BlockEditor::new())
            .with_action(action("Blocks", "square-plus", 7)),
        ModeDescriptor::new(DEVELOPER_VIEW, DeveloperView::new())
            .with_label("Developer")
            .with_action(action("Code", "code", 8)),
    ]
}

pub struct PageEditor<D: PageDom> {
    config: EditorConfig,
    bridge: IframeBridge<D>,
    registry: ModeRegistry<D>,
    /// Not validated against the registry.
    active: Option<ModeId>,
    history: HistoryStack,
    outbox: Vec<HtmlChange>,
    events: EventQueue<D::Node>,
}

impl<D: PageDom> PageEditor<D>
where
    D::Node: 'static,
{
    pub fn with_builtin_modes(config: EditorConfig) -> Self {
        let mut editor = Self::new(config);
        for descriptor in builtin_modes() {
            editor.register_mode(descriptor);
        }
        editor
    }
}

impl<D: PageDom> PageEditor<D> {
    pub fn new(config: EditorConfig) -> Self {
        let history = HistoryStack::new(config.history_depth);
        Self {
            config,
            bridge: IframeBridge::new(),
            registry: ModeRegistry::new(),
            active: None,
            history,
            outbox: Vec::new(),
            events: Rc::default(),
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn registry(&self) -> &ModeRegistry<D> {
        &self.registry
    }

    pub fn document(&self) -> Option<&D> {
        self.bridge.document()
    }

    /// Direct document access for the host. Changes made here are not
    /// committed.
    pub fn document_mut(&mut self) -> Option<&mut D> {
        self.bridge.document_mut()
    }

    pub fn generation(&self) -> u64 {
        self.bridge.generation()
    }

    // ─── Modes ───────────────────────────────────────────────────────────

    /// Register (or replace) a mode. Replacing the active mode swaps the
    /// live controller.
    pub fn register_mode(&mut self, descriptor: ModeDescriptor<D>) {
        let replacing_active = self.active == Some(descriptor.id);
        if replacing_active {
            self.deactivate_active();
        }
        self.registry.register(descriptor);
        if replacing_active {
            self.activate_active();
        }
    }

    pub fn active_mode(&self) -> Option<ModeId> {
        self.active
    }

    /// Switch the active mode. Returns whether a registered controller is
    /// now active; an unknown id still becomes the active pointer.
    pub fn set_mode(&mut self, id: ModeId) -> bool {
        if self.active == Some(id) {
            return self.registry.contains(id);
        }
        self.deactivate_active();
        self.active = Some(id);
        if !self.registry.contains(id) {
            log::debug!("no mode registered as {id}");
            return false;
        }
        self.activate_active();
        true
    }

    pub fn set_mode_by_name(&mut self, name: &str) -> bool {
        self.set_mode(ModeId::intern(name))
    }

    pub fn clear_mode(&mut self) {
        self.deactivate_active();
        self.active = None;
    }

    pub fn toolbar(&self) -> Vec<ToolbarEntry> {
        self.registry.toolbar(self.active)
    }

    /// Panel of the active controller; `None` when no registered mode is active.
    pub fn panel(&self) -> Option<PanelState> {
        let descriptor = self.registry.get(self.active?)?;
        Some(match self.bridge.document() {
            Some(dom) => descriptor.controller.panel(dom, &self.config),
            None => PanelState::Empty,
        })
    }

    // ─── Document lifecycle ──────────────────────────────────────────────

    /// The iframe finished loading a document. Returns the previous one.
    pub fn set_iframe_document(&mut self, document: D) -> Option<D> {
        self.deactivate_active();
        let previous = self.bridge.load(document);
        self.reset_controllers();
        let html = self.bridge.document().map(|d| d.outer_html());
        self.history.rebase(html);
        self.activate_active();
        previous
    }

    /// The iframe is unloading. Returns the document after teardown.
    pub fn unload_document(&mut self) -> Option<D> {
        self.deactivate_active();
        self.reset_controllers();
        self.bridge.unload()
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Route a DOM event to the active mode, if that mode listens for it.
    pub fn dispatch(&mut self, event: &DomEvent<D::Node>) -> bool {
        let Some(id) = self.active else {
            return false;
        };
        let listening = self
            .bridge
            .document()
            .is_some_and(|dom| dom.is_listening(id, event.kind));
        if !listening {
            return false;
        }
        self.run_active(|mode, cx| mode.handle_event(event, cx))
            .unwrap_or(false)
    }

    /// Handle for the document backend's listeners to queue events into.
    pub fn event_queue(&self) -> EventQueue<D::Node> {
        Rc::clone(&self.events)
    }

    /// Deliver queued events in order. Returns how many were handled.
    pub fn pump(&mut self) -> u32 {
        let mut handled = 0;
        loop {
            let next = self.events.borrow_mut().pop_front();
            let Some(event) = next else {
                break;
            };
            if self.dispatch(&event) {
                handled += 1;
            }
        }
        handled
    }

    /// Apply a control-panel command to the active mode.
    pub fn command(&mut self, command: &ModeCommand) -> bool {
        self.run_active(|mode, cx| mode.handle_command(command, cx))
            .unwrap_or(false)
    }

    pub fn handle_shortcut(&mut self, action: ShortcutAction) -> bool {
        match action {
            ShortcutAction::Undo => self.undo(),
            ShortcutAction::Redo => self.redo(),
            ShortcutAction::Deselect => self.command(&ModeCommand::ClearSelection),
            ShortcutAction::SelectParent => self.command(&ModeCommand::SelectParent),
            ShortcutAction::Delete => {
                self.command(&ModeCommand::RemoveElement) || self.command(&ModeCommand::RemoveSection)
            }
            ShortcutAction::Mode(index) => match self.registry.toolbar_mode(index) {
                Some(id) => self.set_mode(id),
                None => false,
            },
            ShortcutAction::ZoomIn | ShortcutAction::ZoomOut | ShortcutAction::ZoomReset => false,
        }
    }

    /// Resolve and apply a key press. Returns whether it was consumed.
    pub fn handle_key(&mut self, key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> bool {
        ShortcutMap::resolve(key, ctrl, shift, alt, meta)
            .is_some_and(|action| self.handle_shortcut(action))
    }

    // ─── Changes & history ───────────────────────────────────────────────

    /// Drain pending `onHtmlChange` notifications, oldest first.
    pub fn take_changes(&mut self) -> Vec<HtmlChange> {
        std::mem::take(&mut self.outbox)
    }

    pub fn pending_changes(&self) -> &[HtmlChange] {
        &self.outbox
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) -> bool {
        self.step_history(true)
    }

    pub fn redo(&mut self) -> bool {
        self.step_history(false)
    }

    fn step_history(&mut self, undo: bool) -> bool {
        if !self.bridge.is_loaded() {
            return false;
        }
        // Teardown may flush an exit commit; it becomes the step undone.
        self.deactivate_active();
        let html = if undo {
            self.history.undo()
        } else {
            self.history.redo()
        };
        let restored = html.is_some_and(|html| self.restore(&html, if undo { "Undo" } else { "Redo" }));
        if restored {
            self.reset_controllers();
        }
        self.activate_active();
        restored
    }

    fn restore(&mut self, html: &str, label: &str) -> bool {
        let Some(dom) = self.bridge.document_mut() else {
            return false;
        };
        if let Err(e) = dom.replace_document(html) {
            log::warn!("{label} failed: {e}");
            return false;
        }
        let current = dom.outer_html();
        self.history.set_current(current.clone());
        self.outbox.push(HtmlChange::from_history(current, label));
        true
    }

    // ─── Internals ───────────────────────────────────────────────────────

    /// Run `f` against the active controller, recording any commits it makes.
    fn run_active<R>(
        &mut self,
        f: impl FnOnce(&mut dyn EditMode<D>, &mut ModeContext<'_, D>) -> R,
    ) -> Option<R> {
        let id = self.active?;
        let dom = self.bridge.document_mut()?;
        let descriptor = self.registry.get_mut(id)?;
        let label = descriptor.display_label().to_string();
        let start = self.outbox.len();
        let result = {
            let mut cx = ModeContext::new(dom, &self.config, id, &label, &mut self.outbox);
            f(descriptor.controller.as_mut(), &mut cx)
        };
        for change in &self.outbox[start..] {
            self.history.record(change);
        }
        Some(result)
    }

    fn activate_active(&mut self) {
        let Some(id) = self.active else {
            return;
        };
        // Only one mode may listen at a time.
        if let Some(dom) = self.bridge.document_mut() {
            for owner in dom.listener_owners() {
                if owner != id {
                    log::warn!("{owner} still had listeners attached; removing");
                    dom.remove_listeners(owner);
                }
            }
        }
        self.run_active(|mode, cx| mode.activate(cx));
    }

    fn deactivate_active(&mut self) {
        // Events queued for the outgoing mode or document are stale.
        self.events.borrow_mut().clear();
        let Some(id) = self.active else {
            return;
        };
        if self.run_active(|mode, cx| mode.deactivate(cx)).is_none() {
            return;
        }
        if let Some(dom) = self.bridge.document_mut() {
            let leaked = dom.remove_listeners(id);
            if leaked > 0 {
                log::warn!("{id} left {leaked} listener sets attached; removed");
            }
        }
    }

    fn reset_controllers(&mut self) {
        for descriptor in self.registry.iter_mut() {
            descriptor.controller.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{Document, EventKind};
    use pretty_assertions::assert_eq;

    const PAGE: &str = "<html><head></head><body><h1 id=\"t\">Title</h1></body></html>";

    fn editor() -> PageEditor<Document> {
        let mut editor = PageEditor::with_builtin_modes(EditorConfig::default());
        editor.set_iframe_document(Document::parse(PAGE).unwrap());
        editor
    }

    #[test]
    fn builtins_fill_the_toolbar() {
        let editor = editor();
        let ids: Vec<_> = editor.toolbar().iter().map(|e| e.id.as_str().to_string()).collect();
        assert_eq!(
            ids,
            vec![
                "theme-editor",
                "section-rearranger",
                "content-editor",
                "section-editor",
                "page-editor",
                "style-editor",
                "block-editor",
                "developer-view"
            ]
        );
        assert!(editor.panel().is_none());
    }

    #[test]
    fn unknown_mode_yields_no_panel() {
        let mut editor = editor();
        assert!(!editor.set_mode_by_name("nope"));
        assert_eq!(editor.active_mode(), Some(ModeId::intern("nope")));
        assert!(editor.panel().is_none());
        assert!(editor.document().unwrap().listener_owners().is_empty());
    }

    #[test]
    fn events_only_reach_listening_modes() {
        let mut editor = editor();
        let h1 = editor.document().unwrap().find_element_by_id("t").unwrap();
        let click = DomEvent::at_origin(EventKind::Click, h1);
        assert!(!editor.dispatch(&click));
        editor.set_mode_by_name(THEME_EDITOR);
        assert!(!editor.dispatch(&click));
        editor.set_mode_by_name(STYLE_EDITOR);
        assert!(editor.dispatch(&click));
        // The rearranger listens for drag events only.
        editor.set_mode_by_name(SECTION_REARRANGER);
        assert!(!editor.dispatch(&click));
    }

    #[test]
    fn mode_switch_drops_queued_events() {
        let mut editor = editor();
        let h1 = editor.document().unwrap().find_element_by_id("t").unwrap();
        let queue = editor.event_queue();
        editor.set_mode_by_name(STYLE_EDITOR);
        queue
            .borrow_mut()
            .push_back(DomEvent::at_origin(EventKind::Click, h1));
        // The page editor also listens for clicks, but the click was raised
        // while the style editor was active.
        editor.set_mode_by_name(PAGE_EDITOR);
        assert!(queue.borrow().is_empty());
        assert_eq!(editor.pump(), 0);
        assert!(editor.take_changes().is_empty());

        queue
            .borrow_mut()
            .push_back(DomEvent::at_origin(EventKind::Click, h1));
        editor.clear_mode();
        assert!(queue.borrow().is_empty());
    }

    #[test]
    fn pump_delivers_queued_events_in_order() {
        let mut editor = editor();
        let h1 = editor.document().unwrap().find_element_by_id("t").unwrap();
        editor.set_mode_by_name(STYLE_EDITOR);
        let queue = editor.event_queue();
        queue
            .borrow_mut()
            .push_back(DomEvent::at_origin(EventKind::MouseOver, h1));
        queue
            .borrow_mut()
            .push_back(DomEvent::at_origin(EventKind::Click, h1));
        assert_eq!(editor.pump(), 2);
        assert!(queue.borrow().is_empty());
        assert_eq!(editor.pump(), 0);
    }

    #[test]
    fn commands_without_document_are_noops() {
        let mut editor = PageEditor::<Document>::with_builtin_modes(EditorConfig::default());
        editor.set_mode_by_name(THEME_EDITOR);
        let cmd = ModeCommand::ApplyTheme {
            variables: vec![("--a".into(), "1".into())],
        };
        assert!(!editor.command(&cmd));
        assert!(editor.take_changes().is_empty());
        assert!(!editor.undo());
    }

    #[test]
    fn digit_shortcut_selects_toolbar_mode() {
        let mut editor = editor();
        assert!(editor.handle_key("3", false, false, false, false));
        assert_eq!(editor.active_mode(), Some(ModeId::intern(CONTENT_EDITOR)));
        assert!(!editor.handle_key("9", false, false, false, false));
    }

    #[test]
    fn reregistering_active_mode_swaps_controller() {
        let mut editor = editor();
        editor.set_mode_by_name(DEVELOPER_VIEW);
        editor.register_mode(ModeDescriptor::new(DEVELOPER_VIEW, ThemeEditor::new()));
        assert!(matches!(editor.panel(), Some(PanelState::Theme { .. })));
        assert_eq!(editor.registry().len(), 8);
    }
}
