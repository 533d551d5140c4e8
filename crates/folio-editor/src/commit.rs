//! Change records emitted to the host.
//!
//! Every commit is a full snapshot of `documentElement.outerHTML`, tagged
//! with the mode that produced it. The host persists or forwards it; the
//! editor never writes to a backend itself.

use folio_core::{ModeId, PageDom};
use serde::{Deserialize, Serialize};

/// Owner tag for changes produced by undo/redo rather than a mode.
pub const HISTORY_MODE: &str = "history";

/// One `onHtmlChange` notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HtmlChange {
    pub html: String,
    pub mode_id: ModeId,
    pub mode_label: String,
}

impl HtmlChange {
    /// Snapshot the document as it is right now.
    pub fn capture<D: PageDom>(dom: &D, mode_id: ModeId, mode_label: &str) -> Self {
        let html = dom.outer_html();
        log::debug!("commit from {mode_id}: {} bytes", html.len());
        Self {
            html,
            mode_id,
            mode_label: mode_label.to_string(),
        }
    }

    pub fn from_history(html: String, label: &str) -> Self {
        Self {
            html,
            mode_id: ModeId::intern(HISTORY_MODE),
            mode_label: label.to_string(),
        }
    }

    pub fn is_history(&self) -> bool {
        self.mode_id.as_str() == HISTORY_MODE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::Document;
    use pretty_assertions::assert_eq;

    #[test]
    fn capture_serializes_camel_case() {
        let doc = Document::parse("<html><body><p>x</p></body></html>").unwrap();
        let change = HtmlChange::capture(&doc, ModeId::intern("content-editor"), "Content");
        let json = serde_json::to_string(&change).unwrap();
        assert_eq!(
            json,
            r#"{"html":"<html><body><p>x</p></body></html>","modeId":"content-editor","modeLabel":"Content"}"#
        );
        assert!(!change.is_history());
    }

    #[test]
    fn history_changes_are_tagged() {
        let change = HtmlChange::from_history("<html></html>".into(), "Undo");
        assert!(change.is_history());
        assert_eq!(change.mode_id.as_str(), "history");
    }
}
