//! Undo/Redo over committed document snapshots.
//!
//! Each commit already carries the full `outerHTML`, so history is
//! snapshot-based: a step stores the HTML before and after one commit and
//! undo/redo swap the whole document.

use crate::commit::HtmlChange;
use folio_core::ModeId;

/// One undoable commit.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub html_before: String,
    pub html_after: String,
    /// Mode that produced the commit.
    pub mode_id: ModeId,
}

/// Bounded undo/redo stacks plus the HTML of the last known state.
#[derive(Debug)]
pub struct HistoryStack {
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
    max_depth: usize,
    /// HTML of the document as of the last commit, load, or undo/redo.
    current: Option<String>,
}

impl HistoryStack {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::with_capacity(max_depth.min(64)),
            redo_stack: Vec::new(),
            max_depth,
            current: None,
        }
    }

    /// A document was loaded. History survives only if it is the state we
    /// already know about (the host reloading a committed snapshot).
    pub fn rebase(&mut self, html: Option<String>) {
        if html.is_some() && html == self.current {
            return;
        }
        if self.can_undo() || self.can_redo() {
            log::debug!("history cleared: unrelated document loaded");
        }
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current = html;
    }

    /// Record a commit as one undo step. No-op commits are skipped.
    pub fn record(&mut self, change: &HtmlChange) {
        if change.is_history() {
            return;
        }
        let Some(before) = self.current.replace(change.html.clone()) else {
            return;
        };
        if before == change.html {
            return;
        }
        self.undo_stack.push(Snapshot {
            html_before: before,
            html_after: change.html.clone(),
            mode_id: change.mode_id,
        });
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
    }

    /// Pop the last step. Returns the HTML to restore.
    pub fn undo(&mut self) -> Option<String> {
        let step = self.undo_stack.pop()?;
        let html = step.html_before.clone();
        self.current = Some(html.clone());
        self.redo_stack.push(step);
        Some(html)
    }

    /// Re-apply the last undone step. Returns the HTML to restore.
    pub fn redo(&mut self) -> Option<String> {
        let step = self.redo_stack.pop()?;
        let html = step.html_after.clone();
        self.current = Some(html.clone());
        self.undo_stack.push(step);
        Some(html)
    }

    /// Overwrite the known state without touching the stacks.
    pub fn set_current(&mut self, html: String) {
        self.current = Some(html);
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn change(html: &str) -> HtmlChange {
        HtmlChange {
            html: html.to_string(),
            mode_id: ModeId::intern("style-editor"),
            mode_label: "Style".to_string(),
        }
    }

    #[test]
    fn undo_redo_walks_snapshots() {
        let mut history = HistoryStack::new(10);
        history.rebase(Some("a".into()));
        history.record(&change("b"));
        history.record(&change("c"));

        assert_eq!(history.undo().as_deref(), Some("b"));
        assert_eq!(history.undo().as_deref(), Some("a"));
        assert_eq!(history.undo(), None);
        assert_eq!(history.redo().as_deref(), Some("b"));
        assert_eq!(history.current(), Some("b"));
    }

    #[test]
    fn new_commit_clears_redo() {
        let mut history = HistoryStack::new(10);
        history.rebase(Some("a".into()));
        history.record(&change("b"));
        history.undo();
        assert!(history.can_redo());
        history.record(&change("x"));
        assert!(!history.can_redo());
        assert_eq!(history.undo().as_deref(), Some("a"));
    }

    #[test]
    fn identical_commit_is_not_a_step() {
        let mut history = HistoryStack::new(10);
        history.rebase(Some("a".into()));
        history.record(&change("a"));
        assert!(!history.can_undo());
    }

    #[test]
    fn depth_is_bounded() {
        let mut history = HistoryStack::new(2);
        history.rebase(Some("0".into()));
        for html in ["1", "2", "3"] {
            history.record(&change(html));
        }
        assert_eq!(history.undo_depth(), 2);
        assert_eq!(history.undo().as_deref(), Some("2"));
        assert_eq!(history.undo().as_deref(), Some("1"));
        assert_eq!(history.undo(), None);
    }

    #[test]
    fn rebase_keeps_history_for_same_document() {
        let mut history = HistoryStack::new(10);
        history.rebase(Some("a".into()));
        history.record(&change("b"));
        history.rebase(Some("b".into()));
        assert!(history.can_undo());
        history.rebase(Some("other".into()));
        assert!(!history.can_undo());
    }

    #[test]
    fn history_changes_are_not_recorded() {
        let mut history = HistoryStack::new(10);
        history.rebase(Some("a".into()));
        history.record(&HtmlChange::from_history("b".into(), "Undo"));
        assert!(!history.can_undo());
        assert_eq!(history.current(), Some("a"));
    }
}
