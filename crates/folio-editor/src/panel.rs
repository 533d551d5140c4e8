//! Serializable state for the control panel of the active mode.

use crate::targeting::{DropPlacement, InsertPosition};
use folio_core::{EditorConfig, PageDom};
use serde::Serialize;

const SUMMARY_TEXT_LIMIT: usize = 80;

/// What the panel shows about one element.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSummary {
    pub tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Page classes, without the editor's own decorations.
    pub classes: Vec<String>,
    /// Collapsed, truncated text content.
    pub text: String,
    pub inner_html: String,
    pub styles: Vec<(String, String)>,
}

impl ElementSummary {
    pub fn describe<D: PageDom>(dom: &D, node: &D::Node, config: &EditorConfig) -> Option<Self> {
        let tag = dom.tag_name(node)?;
        let own = format!("{}-", config.class_prefix);
        let classes = dom
            .attribute(node, "class")
            .map(|value| {
                value
                    .split_ascii_whitespace()
                    .filter(|c| !c.starts_with(&own))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        let styles = dom
            .inline_style(node)
            .iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect();
        Some(Self {
            tag,
            id: dom.id_of(node),
            classes,
            text: summarize_text(&dom.text_content(node)),
            inner_html: dom.inner_html(node),
            styles,
        })
    }
}

fn summarize_text(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= SUMMARY_TEXT_LIMIT {
        return collapsed;
    }
    let mut out: String = collapsed.chars().take(SUMMARY_TEXT_LIMIT).collect();
    out.push('…');
    out
}

/// Control panel content for the active mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PanelState {
    /// No mode, no document, or a mode without a panel.
    Empty,
    /// Element pickers (content, section, style and page editors).
    #[serde(rename_all = "camelCase")]
    Selection {
        selected: Option<ElementSummary>,
        /// Text sub-selection inside the selected element (section editor).
        focused: Option<ElementSummary>,
        can_select_parent: bool,
    },
    #[serde(rename_all = "camelCase")]
    Block {
        target: Option<ElementSummary>,
        position: Option<InsertPosition>,
        /// A click pinned the insertion point.
        locked: bool,
    },
    #[serde(rename_all = "camelCase")]
    Rearrange {
        /// Section ids in document order.
        sections: Vec<String>,
        dragging: Option<String>,
        drop_target: Option<(String, DropPlacement)>,
        has_changes: bool,
    },
    Theme {
        variables: Vec<(String, String)>,
    },
    Source {
        html: String,
    },
}
