//! Input abstraction layer.
//!
//! Two event families reach the editor:
//!
//! - [`DomEvent`]: a DOM event raised inside the preview iframe, already
//!   resolved to its target node. Consumed by the edit modes.
//! - [`InputEvent`]: a normalized pointer/wheel event on the free-form
//!   canvas. Consumed by [`crate::canvas::CanvasBoard`].

use folio_core::{EventKind, Point};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Keyboard modifier state at the time of an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    /// Platform command key (⌘ on macOS, Ctrl elsewhere).
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// A DOM event from the iframe document.
#[derive(Debug, Clone, PartialEq)]
pub struct DomEvent<N> {
    pub kind: EventKind,
    /// `event.target`, which may be a text node.
    pub target: N,
    /// Client coordinates inside the iframe.
    pub x: f64,
    pub y: f64,
}

impl<N> DomEvent<N> {
    pub fn new(kind: EventKind, target: N, x: f64, y: f64) -> Self {
        Self { kind, target, x, y }
    }

    /// Event without meaningful coordinates (e.g. `mouseout`).
    pub fn at_origin(kind: EventKind, target: N) -> Self {
        Self::new(kind, target, 0.0, 0.0)
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Events raised by DOM listeners and not yet delivered. Shared between the
/// document backend, which pushes, and [`crate::PageEditor::pump`].
pub type EventQueue<N> = Rc<RefCell<VecDeque<DomEvent<N>>>>;

/// A normalized canvas input event. Coordinates are screen pixels
/// relative to the canvas element.
#[derive(Debug, Clone)]
pub enum InputEvent {
    PointerDown { x: f64, y: f64, modifiers: Modifiers },
    PointerMove { x: f64, y: f64, modifiers: Modifiers },
    PointerUp { x: f64, y: f64, modifiers: Modifiers },
    /// Wheel or trackpad scroll. With the command modifier it zooms.
    Wheel {
        x: f64,
        y: f64,
        dx: f64,
        dy: f64,
        modifiers: Modifiers,
    },
}

impl InputEvent {
    pub fn position(&self) -> Point {
        match self {
            Self::PointerDown { x, y, .. }
            | Self::PointerMove { x, y, .. }
            | Self::PointerUp { x, y, .. }
            | Self::Wheel { x, y, .. } => Point::new(*x, *y),
        }
    }

    pub fn modifiers(&self) -> Modifiers {
        match self {
            Self::PointerDown { modifiers, .. }
            | Self::PointerMove { modifiers, .. }
            | Self::PointerUp { modifiers, .. }
            | Self::Wheel { modifiers, .. } => *modifiers,
        }
    }
}
