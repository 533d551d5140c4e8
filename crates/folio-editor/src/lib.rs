//! Folio edit modes.
//!
//! Each mode is an [`EditMode`] controller that decorates the preview
//! document, reacts to its events and commands, and commits the cleaned
//! outer HTML back to the host as an [`HtmlChange`]. [`PageEditor`] owns
//! the registry and enforces that at most one mode listens at a time.

pub mod block;
pub mod bridge;
pub mod canvas;
pub mod commit;
pub mod content;
pub mod developer;
pub mod editor;
pub mod element;
pub mod highlight;
pub mod history;
pub mod input;
pub mod modes;
pub mod panel;
pub mod rearrange;
pub mod section;
pub mod shortcuts;
pub mod targeting;
pub mod theme;

pub use bridge::IframeBridge;
pub use canvas::{CanvasBoard, CanvasEntity, CanvasMutation, CanvasTool, CanvasView, EntityKind};
pub use commit::HtmlChange;
pub use editor::{PageEditor, builtin_modes};
pub use history::HistoryStack;
pub use input::{DomEvent, EventQueue, InputEvent, Modifiers};
pub use modes::{
    EditMode, ModeCommand, ModeContext, ModeDescriptor, ModeRegistry, ToolbarAction, ToolbarEntry,
};
pub use panel::{ElementSummary, PanelState};
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use targeting::{DropPlacement, InsertPosition};
