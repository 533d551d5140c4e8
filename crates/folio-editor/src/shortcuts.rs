//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s, shared by the
//! page editor and the canvas board.

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Edit ──
    Undo,
    Redo,
    /// Remove the selected element.
    Delete,

    // ── Selection ──
    Deselect,
    SelectParent,

    // ── Modes ──
    /// Activate the n-th toolbar mode (zero-based).
    Mode(usize),

    // ── Canvas view ──
    ZoomIn,
    ZoomOut,
    ZoomReset,
}

/// Resolves key events into shortcut actions.
///
/// On macOS `meta` is ⌘; elsewhere `ctrl` plays the same role.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"z"`, `"Escape"`).
    pub fn resolve(key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> Option<ShortcutAction> {
        let cmd = ctrl || meta;

        if cmd && shift {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Redo),
                _ => None,
            };
        }

        if cmd {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Undo),
                "y" | "Y" => Some(ShortcutAction::Redo),
                "=" | "+" => Some(ShortcutAction::ZoomIn),
                "-" => Some(ShortcutAction::ZoomOut),
                "0" => Some(ShortcutAction::ZoomReset),
                _ => None,
            };
        }

        if alt {
            return match key {
                "ArrowUp" => Some(ShortcutAction::SelectParent),
                _ => None,
            };
        }

        if shift {
            return None;
        }

        match key {
            "Escape" => Some(ShortcutAction::Deselect),
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            digit if digit.len() == 1 => digit
                .chars()
                .next()
                .and_then(|c| c.to_digit(10))
                .filter(|d| *d >= 1)
                .map(|d| ShortcutAction::Mode(d as usize - 1)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undo_redo() {
        assert_eq!(ShortcutMap::resolve("z", true, false, false, false), Some(ShortcutAction::Undo));
        assert_eq!(ShortcutMap::resolve("z", false, false, false, true), Some(ShortcutAction::Undo));
        assert_eq!(ShortcutMap::resolve("Z", true, true, false, false), Some(ShortcutAction::Redo));
        assert_eq!(ShortcutMap::resolve("y", true, false, false, false), Some(ShortcutAction::Redo));
    }

    #[test]
    fn selection_keys() {
        assert_eq!(ShortcutMap::resolve("Escape", false, false, false, false), Some(ShortcutAction::Deselect));
        assert_eq!(ShortcutMap::resolve("Delete", false, false, false, false), Some(ShortcutAction::Delete));
        assert_eq!(ShortcutMap::resolve("ArrowUp", false, false, true, false), Some(ShortcutAction::SelectParent));
        assert_eq!(ShortcutMap::resolve("ArrowUp", false, false, false, false), None);
    }

    #[test]
    fn digits_pick_modes() {
        assert_eq!(ShortcutMap::resolve("1", false, false, false, false), Some(ShortcutAction::Mode(0)));
        assert_eq!(ShortcutMap::resolve("9", false, false, false, false), Some(ShortcutAction::Mode(8)));
        assert_eq!(ShortcutMap::resolve("0", false, false, false, false), None);
        assert_eq!(ShortcutMap::resolve("0", true, false, false, false), Some(ShortcutAction::ZoomReset));
    }

    #[test]
    fn zoom() {
        assert_eq!(ShortcutMap::resolve("=", true, false, false, false), Some(ShortcutAction::ZoomIn));
        assert_eq!(ShortcutMap::resolve("-", false, false, false, true), Some(ShortcutAction::ZoomOut));
    }

    #[test]
    fn unbound_keys() {
        assert_eq!(ShortcutMap::resolve("q", false, false, false, false), None);
        assert_eq!(ShortcutMap::resolve("1", false, true, false, false), None);
    }
}
