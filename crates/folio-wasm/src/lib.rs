//! WASM bridge for Folio: drives the edit modes inside a sandboxed
//! preview iframe.
//!
//! The host page owns the iframe and the source HTML. After every iframe
//! load it calls `attach_iframe`; DOM events are queued by the capture
//! listeners and delivered on `pump()`. Committed HTML comes back through
//! `take_changes_json`, which the host writes into its store and, when it
//! reloads the iframe, round-trips into a fresh `attach_iframe`.

mod dom;
mod logger;

pub use dom::{EventQueue, IframeDom};

use folio_core::records::{self, Asset, DomainStatus, Route, Version};
use folio_core::{EditorConfig, Point};
use folio_editor::{
    CanvasBoard, CanvasMutation, CanvasTool, EntityKind, InputEvent, ModeCommand, Modifiers,
    PageEditor, ShortcutMap,
};
use wasm_bindgen::prelude::*;
use web_sys::HtmlIFrameElement;

fn setup() {
    #[cfg(target_arch = "wasm32")]
    {
        console_error_panic_hook::set_once();
        logger::init();
    }
}

fn to_json<T: serde::Serialize>(value: &T, fallback: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        log::error!("serialization failed: {e}");
        fallback.to_string()
    })
}

/// Unwrap a backend `{ success, data?, error? }` envelope. `kind` is
/// `"assets"`, `"versions"`, `"route"` or `"domain"`. Returns the payload
/// re-serialized in the record shape, or rejects with the envelope's
/// error message.
#[wasm_bindgen]
pub fn read_response(kind: &str, json: &str) -> Result<String, JsValue> {
    read_records(kind, json).map_err(|e| JsValue::from_str(&e))
}

fn read_records(kind: &str, json: &str) -> Result<String, String> {
    match kind {
        "assets" => records::unwrap_envelope::<Vec<Asset>>(json).map(|v| to_json(&v, "[]")),
        "versions" => records::unwrap_envelope::<Vec<Version>>(json).map(|v| to_json(&v, "[]")),
        "route" => records::unwrap_envelope::<Route>(json).map(|v| to_json(&v, "null")),
        "domain" => records::unwrap_envelope::<DomainStatus>(json).map(|v| to_json(&v, "null")),
        _ => Err(format!("Unknown record kind: {kind}")),
    }
}

// ─── Page editor ─────────────────────────────────────────────────────────

/// The WASM-facing edit-mode controller for one preview iframe.
#[wasm_bindgen]
pub struct FolioEditor {
    editor: PageEditor<IframeDom>,
}

#[wasm_bindgen]
impl FolioEditor {
    /// Create an editor from a (possibly empty or partial) JSON config.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<FolioEditor, JsValue> {
        setup();
        let config = if config_json.trim().is_empty() {
            EditorConfig::default()
        } else {
            EditorConfig::from_json(config_json).map_err(|e| JsValue::from_str(&e))?
        };
        Ok(Self {
            editor: PageEditor::with_builtin_modes(config),
        })
    }

    /// Bind to the iframe's freshly loaded document. Reattaches the active
    /// mode, if any. Returns `false` when the document is inaccessible.
    pub fn attach_iframe(&mut self, iframe: &HtmlIFrameElement) -> bool {
        let Some(document) = iframe.content_document() else {
            log::warn!("iframe document is not accessible");
            return false;
        };
        let queue = self.editor.event_queue();
        self.editor.set_iframe_document(IframeDom::new(document, queue));
        true
    }

    /// The iframe is about to unload or be removed.
    pub fn detach(&mut self) {
        self.editor.unload_document();
    }

    /// The `sandbox` attribute the host should put on the preview iframe.
    pub fn sandbox_attribute(&self) -> String {
        self.editor.config().sandbox.attribute().to_string()
    }

    /// Activate a mode by id (`"content-editor"`, …). Returns `false` for
    /// unregistered ids; the previous mode is deactivated either way and
    /// events it queued are dropped.
    pub fn set_mode(&mut self, id: &str) -> bool {
        self.editor.set_mode_by_name(id)
    }

    pub fn clear_mode(&mut self) {
        self.editor.clear_mode();
    }

    pub fn active_mode(&self) -> Option<String> {
        self.editor.active_mode().map(|id| id.as_str().to_string())
    }

    /// Toolbar entries as JSON, in registration order.
    pub fn toolbar_json(&self) -> String {
        to_json(&self.editor.toolbar(), "[]")
    }

    /// The active mode's side panel as JSON, or `null`.
    pub fn panel_json(&self) -> String {
        to_json(&self.editor.panel(), "null")
    }

    /// Forward a panel command (`{"type":"setStyle",…}`) to the active mode.
    pub fn command(&mut self, json: &str) -> bool {
        match ModeCommand::from_json(json) {
            Ok(command) => self.editor.command(&command),
            Err(e) => {
                log::warn!("{e}");
                false
            }
        }
    }

    /// Deliver queued iframe events. Returns how many were handled.
    pub fn pump(&mut self) -> u32 {
        self.editor.pump()
    }

    /// Drain committed changes as a JSON array of `{html, modeId, modeLabel}`.
    pub fn take_changes_json(&mut self) -> String {
        to_json(&self.editor.take_changes(), "[]")
    }

    pub fn has_changes(&self) -> bool {
        !self.editor.pending_changes().is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.editor.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.editor.can_redo()
    }

    pub fn undo(&mut self) -> bool {
        self.editor.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.editor.redo()
    }

    /// Route a keyboard shortcut. Returns `true` if consumed.
    pub fn handle_key(&mut self, key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> bool {
        self.editor.handle_key(key, ctrl, shift, alt, meta)
    }
}

// ─── Canvas board ────────────────────────────────────────────────────────

/// The free-form canvas. Returns mutations as JSON so the host can mirror
/// them into its own entity store.
#[wasm_bindgen]
pub struct FolioCanvas {
    board: CanvasBoard,
    width: f64,
    height: f64,
}

#[wasm_bindgen]
impl FolioCanvas {
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64, config_json: &str) -> Result<FolioCanvas, JsValue> {
        setup();
        let config = if config_json.trim().is_empty() {
            EditorConfig::default()
        } else {
            EditorConfig::from_json(config_json).map_err(|e| JsValue::from_str(&e))?
        };
        Ok(Self {
            board: CanvasBoard::new(&config),
            width,
            height,
        })
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    /// `"select"`, `"pan"` or `"scribble"`.
    pub fn set_tool(&mut self, name: &str) -> bool {
        let tool = match name {
            "select" => CanvasTool::Select,
            "pan" => CanvasTool::Pan,
            "scribble" => CanvasTool::Scribble,
            _ => return false,
        };
        self.board.set_tool(tool);
        true
    }

    pub fn handle_pointer_down(
        &mut self,
        x: f64,
        y: f64,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> String {
        let modifiers = Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        self.run(InputEvent::PointerDown { x, y, modifiers })
    }

    pub fn handle_pointer_move(
        &mut self,
        x: f64,
        y: f64,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> String {
        let modifiers = Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        self.run(InputEvent::PointerMove { x, y, modifiers })
    }

    pub fn handle_pointer_up(
        &mut self,
        x: f64,
        y: f64,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> String {
        let modifiers = Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        self.run(InputEvent::PointerUp { x, y, modifiers })
    }

    pub fn handle_wheel(&mut self, x: f64, y: f64, dx: f64, dy: f64, ctrl: bool, meta: bool) {
        let modifiers = Modifiers {
            ctrl,
            meta,
            ..Modifiers::NONE
        };
        self.run(InputEvent::Wheel {
            x,
            y,
            dx,
            dy,
            modifiers,
        });
    }

    pub fn handle_key(&mut self, key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> bool {
        let center = Point::new(self.width / 2.0, self.height / 2.0);
        ShortcutMap::resolve(key, ctrl, shift, alt, meta)
            .is_some_and(|action| self.board.apply_shortcut(action, center))
    }

    /// Drop a new entity centered on a screen point. `kind` is `"html"`,
    /// `"text"` or `"url"`. Returns the new id, or `None` for unknown kinds.
    pub fn place(&mut self, kind: &str, payload: &str, x: f64, y: f64) -> Option<String> {
        let kind = match kind {
            "html" => EntityKind::Html {
                html: payload.to_string(),
            },
            "text" => EntityKind::Text {
                content: payload.to_string(),
            },
            "url" => EntityKind::Url {
                url: payload.to_string(),
            },
            _ => return None,
        };
        let mutation = self.board.place(kind, Point::new(x, y));
        let id = match &mutation {
            CanvasMutation::AddEntity { entity } => Some(entity.id.clone()),
            _ => None,
        };
        self.board.apply(mutation);
        id
    }

    /// Resize an entity to canvas-space `width` × `height`. Returns the
    /// applied mutations as JSON (empty for unknown ids or no change).
    pub fn resize_entity(&mut self, id: &str, width: f64, height: f64) -> String {
        let mutation = self.board.resize(id, width, height);
        self.commit(mutation)
    }

    pub fn bring_to_front(&mut self, id: &str) -> String {
        let mutation = self.board.raise(id);
        self.commit(mutation)
    }

    /// Apply a mutation made elsewhere (another tab, the backend), in the
    /// same `{"op": …}` shape the handlers return.
    pub fn apply_mutation_json(&mut self, json: &str) -> bool {
        match serde_json::from_str::<CanvasMutation>(json) {
            Ok(mutation) => {
                self.board.apply(mutation);
                true
            }
            Err(e) => {
                log::warn!("canvas mutation rejected: {e}");
                false
            }
        }
    }

    pub fn selected(&self) -> Option<String> {
        self.board.selected().map(str::to_string)
    }

    pub fn entities_json(&self) -> String {
        to_json(&self.board.entities(), "[]")
    }

    pub fn view_json(&self) -> String {
        to_json(&self.board.view, "{}")
    }

    /// Canvas → screen affine as `[a, b, c, d, e, f]` for `ctx.setTransform`.
    pub fn transform(&self) -> Vec<f64> {
        self.board.view.transform().as_coeffs().to_vec()
    }

    fn commit(&mut self, mutation: Option<CanvasMutation>) -> String {
        let mutations: Vec<CanvasMutation> = mutation.into_iter().collect();
        let json = to_json(&mutations, "[]");
        for mutation in mutations {
            self.board.apply(mutation);
        }
        json
    }

    fn run(&mut self, event: InputEvent) -> String {
        let mutations = self.board.handle(&event);
        let json = to_json(&mutations, "[]");
        for mutation in mutations {
            self.board.apply(mutation);
        }
        json
    }
}
