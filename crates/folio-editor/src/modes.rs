//! Edit mode system.
//!
//! An edit mode is a controller that, while active, owns the page's
//! interaction: it registers listeners, decorates elements, applies edits
//! and commits snapshots. Modes are registered under string ids in a
//! [`ModeRegistry`]; at most one is active per iframe.

use crate::commit::HtmlChange;
use crate::input::DomEvent;
use crate::panel::PanelState;
use folio_core::{EditorConfig, ModeId, PageDom};
use serde::{Deserialize, Serialize};

// ─── Built-in mode ids ───────────────────────────────────────────────────

pub const THEME_EDITOR: &str = "theme-editor";
pub const SECTION_REARRANGER: &str = "section-rearranger";
pub const CONTENT_EDITOR: &str = "content-editor";
pub const SECTION_EDITOR: &str = "section-editor";
pub const PAGE_EDITOR: &str = "page-editor";
pub const STYLE_EDITOR: &str = "style-editor";
pub const BLOCK_EDITOR: &str = "block-editor";
pub const DEVELOPER_VIEW: &str = "developer-view";

// ─── Context ─────────────────────────────────────────────────────────────

/// Everything a mode may touch during one callback.
pub struct ModeContext<'a, D: PageDom> {
    pub dom: &'a mut D,
    pub config: &'a EditorConfig,
    pub mode_id: ModeId,
    pub mode_label: &'a str,
    changes: &'a mut Vec<HtmlChange>,
}

impl<'a, D: PageDom> ModeContext<'a, D> {
    pub fn new(
        dom: &'a mut D,
        config: &'a EditorConfig,
        mode_id: ModeId,
        mode_label: &'a str,
        changes: &'a mut Vec<HtmlChange>,
    ) -> Self {
        Self {
            dom,
            config,
            mode_id,
            mode_label,
            changes,
        }
    }

    /// Queue an `onHtmlChange` with the current `outerHTML`.
    pub fn commit(&mut self) {
        let change = HtmlChange::capture(&*self.dom, self.mode_id, self.mode_label);
        self.changes.push(change);
    }
}

// ─── Commands ────────────────────────────────────────────────────────────

/// Control-panel operations. Each mode handles the subset that applies
/// to it and ignores the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ModeCommand {
    ClearSelection,
    SelectParent,
    SetStyle { property: String, value: String },
    ClearStyle { property: String },
    /// Replace the inner HTML of the selected (or focused) text element.
    SetText { html: String },
    SetAttribute { name: String, value: String },
    RemoveElement,
    ReplaceSection { html: String },
    RemoveSection,
    InsertBlock { html: String },
    ApplyTheme { variables: Vec<(String, String)> },
    Refresh,
}

impl ModeCommand {
    /// Parse a command from the host's JSON.
    ///
    /// # Errors
    /// Returns the serde error message for unknown or malformed commands.
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("Invalid mode command: {e}"))
    }
}

// ─── Controller trait ────────────────────────────────────────────────────

/// A mode controller.
///
/// `deactivate` must undo everything `activate` did to the page (listeners,
/// injected styles, classes, temporary attributes) apart from the edits
/// themselves.
pub trait EditMode<D: PageDom> {
    fn activate(&mut self, cx: &mut ModeContext<'_, D>);

    fn deactivate(&mut self, cx: &mut ModeContext<'_, D>);

    /// Handle a DOM event this mode listens for. Returns true if consumed.
    fn handle_event(&mut self, _event: &DomEvent<D::Node>, _cx: &mut ModeContext<'_, D>) -> bool {
        false
    }

    /// Handle a control-panel command. Returns true if it applied.
    fn handle_command(&mut self, _command: &ModeCommand, _cx: &mut ModeContext<'_, D>) -> bool {
        false
    }

    fn panel(&self, _dom: &D, _config: &EditorConfig) -> PanelState {
        PanelState::Empty
    }

    /// The document was replaced; drop every node handle.
    fn reset(&mut self);
}

// ─── Registry ────────────────────────────────────────────────────────────

/// Toolbar button metadata for a mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolbarAction {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortcut: Option<String>,
}

impl ToolbarAction {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            icon: None,
            shortcut: None,
        }
    }

    pub fn with_icon(mut self, icon: &str) -> Self {
        self.icon = Some(icon.to_string());
        self
    }

    pub fn with_shortcut(mut self, shortcut: &str) -> Self {
        self.shortcut = Some(shortcut.to_string());
        self
    }
}

pub struct ModeDescriptor<D: PageDom> {
    pub id: ModeId,
    pub label: Option<String>,
    /// Modes without an action are still selectable by id.
    pub action: Option<ToolbarAction>,
    pub controller: Box<dyn EditMode<D>>,
}

impl<D: PageDom> ModeDescriptor<D> {
    pub fn new(id: &str, controller: impl EditMode<D> + 'static) -> Self {
        Self {
            id: ModeId::intern(id),
            label: None,
            action: None,
            controller: Box::new(controller),
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn with_action(mut self, action: ToolbarAction) -> Self {
        self.action = Some(action);
        self
    }

    /// Label, falling back to the toolbar label and then the id.
    pub fn display_label(&self) -> &str {
        self.label
            .as_deref()
            .or(self.action.as_ref().map(|a| a.label.as_str()))
            .unwrap_or(self.id.as_str())
    }
}

impl<D: PageDom> std::fmt::Debug for ModeDescriptor<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModeDescriptor")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("action", &self.action)
            .finish_non_exhaustive()
    }
}

/// One toolbar button as the host renders it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolbarEntry {
    pub id: ModeId,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortcut: Option<String>,
    pub active: bool,
}

/// Modes in registration order, keyed by id.
pub struct ModeRegistry<D: PageDom> {
    modes: Vec<ModeDescriptor<D>>,
}

impl<D: PageDom> Default for ModeRegistry<D> {
    fn default() -> Self {
        Self { modes: Vec::new() }
    }
}

impl<D: PageDom> ModeRegistry<D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mode. Re-registering an id replaces the old descriptor
    /// in place and returns it.
    pub fn register(&mut self, descriptor: ModeDescriptor<D>) -> Option<ModeDescriptor<D>> {
        match self.modes.iter_mut().find(|m| m.id == descriptor.id) {
            Some(slot) => {
                log::debug!("mode {} re-registered", descriptor.id);
                Some(std::mem::replace(slot, descriptor))
            }
            None => {
                self.modes.push(descriptor);
                None
            }
        }
    }

    pub fn get(&self, id: ModeId) -> Option<&ModeDescriptor<D>> {
        self.modes.iter().find(|m| m.id == id)
    }

    pub fn get_mut(&mut self, id: ModeId) -> Option<&mut ModeDescriptor<D>> {
        self.modes.iter_mut().find(|m| m.id == id)
    }

    pub fn contains(&self, id: ModeId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModeDescriptor<D>> {
        self.modes.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ModeDescriptor<D>> {
        self.modes.iter_mut()
    }

    pub fn ids(&self) -> Vec<ModeId> {
        self.modes.iter().map(|m| m.id).collect()
    }

    pub fn len(&self) -> usize {
        self.modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }

    /// Modes with a toolbar action, in registration order.
    pub fn toolbar(&self, active: Option<ModeId>) -> Vec<ToolbarEntry> {
        self.modes
            .iter()
            .filter_map(|m| {
                let action = m.action.as_ref()?;
                Some(ToolbarEntry {
                    id: m.id,
                    label: action.label.clone(),
                    icon: action.icon.clone(),
                    shortcut: action.shortcut.clone(),
                    active: active == Some(m.id),
                })
            })
            .collect()
    }

    /// The `index`-th toolbar mode (digit shortcuts).
    pub fn toolbar_mode(&self, index: usize) -> Option<ModeId> {
        self.modes
            .iter()
            .filter(|m| m.action.is_some())
            .nth(index)
            .map(|m| m.id)
    }
}
