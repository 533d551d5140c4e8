//! Which element an event "means" in each mode.
//!
//! Raw event targets are often text nodes or deep descendants; each mode
//! resolves them to the element it actually edits. All rules here are pure
//! reads over [`PageDom`].

use folio_core::{AdjacentPosition, EditorConfig, NodeType, PageDom, Rect, SelectorList};
use serde::Serialize;

/// Tags the element pickers never select.
const UNSELECTABLE: &[&str] = &[
    "html", "head", "script", "style", "meta", "link", "title", "noscript", "template",
];

/// Tags whose text is not user content.
const NON_CONTENT: &[&str] = &["html", "body", "head", "script", "style", "title", "noscript"];

/// Where a block lands relative to its target, by pointer height thirds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertPosition {
    Before,
    Append,
    After,
}

impl InsertPosition {
    pub fn adjacent(self) -> AdjacentPosition {
        match self {
            Self::Before => AdjacentPosition::BeforeBegin,
            Self::Append => AdjacentPosition::BeforeEnd,
            Self::After => AdjacentPosition::AfterEnd,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::Append => "append",
            Self::After => "after",
        }
    }
}

/// Where a dragged section lands relative to the drop target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DropPlacement {
    Before,
    After,
}

// ─── Geometry ────────────────────────────────────────────────────────────

/// Upper third → before, lower third → after, middle → append.
pub fn insertion_position(rect: Rect, y: f64) -> InsertPosition {
    let h = rect.height();
    let rel = y - rect.y0;
    if rel < h / 3.0 {
        InsertPosition::Before
    } else if rel > 2.0 * h / 3.0 {
        InsertPosition::After
    } else {
        InsertPosition::Append
    }
}

/// Above the vertical midpoint → before, otherwise after.
pub fn drop_placement(rect: Rect, y: f64) -> DropPlacement {
    if y < rect.y0 + rect.height() / 2.0 {
        DropPlacement::Before
    } else {
        DropPlacement::After
    }
}

// ─── Node rules ──────────────────────────────────────────────────────────

/// The element itself, or a text node's parent element.
pub fn element_target<D: PageDom>(dom: &D, node: &D::Node) -> Option<D::Node> {
    match dom.node_type(node) {
        NodeType::Element => Some(node.clone()),
        NodeType::Text => dom.parent_element(node),
        _ => None,
    }
}

/// An element with non-blank text whose children are all text or comments.
pub fn is_leaf_text<D: PageDom>(dom: &D, node: &D::Node) -> bool {
    let Some(tag) = dom.tag_name(node) else {
        return false;
    };
    if NON_CONTENT.contains(&tag.as_str()) {
        return false;
    }
    let only_text = dom
        .child_nodes(node)
        .iter()
        .all(|c| matches!(dom.node_type(c), NodeType::Text | NodeType::Comment));
    only_text && !dom.text_content(node).trim().is_empty()
}

/// Content editor rule: the event target (text nodes map to their parent)
/// when it is a leaf-text element.
pub fn leaf_text_target<D: PageDom>(dom: &D, node: &D::Node) -> Option<D::Node> {
    element_target(dom, node).filter(|el| is_leaf_text(dom, el))
}

/// Nearest inclusive ancestor whose `id` marks a section.
pub fn section_ancestor<D: PageDom>(
    dom: &D,
    node: &D::Node,
    config: &EditorConfig,
) -> Option<D::Node> {
    let mut current = element_target(dom, node);
    while let Some(el) = current {
        if dom.id_of(&el).is_some_and(|id| config.is_section_id(&id)) {
            return Some(el);
        }
        if dom.has_tag(&el, "body") || dom.has_tag(&el, "html") {
            return None;
        }
        current = dom.parent_element(&el);
    }
    None
}

/// Style/page editor rule: any element except document plumbing.
pub fn selectable_element<D: PageDom>(dom: &D, node: &D::Node) -> Option<D::Node> {
    let el = element_target(dom, node)?;
    let tag = dom.tag_name(&el)?;
    if UNSELECTABLE.contains(&tag.as_str()) || inside_head(dom, &el) {
        return None;
    }
    Some(el)
}

/// The parent to select for "select parent"; stops below `<body>`.
pub fn parent_selection<D: PageDom>(dom: &D, node: &D::Node) -> Option<D::Node> {
    let parent = dom.parent_element(node)?;
    if dom.has_tag(&parent, "body") || dom.has_tag(&parent, "html") {
        return None;
    }
    Some(parent)
}

/// Block editor rule: nearest ancestor matching a candidate selector,
/// falling back to `<body>`.
pub fn block_candidate<D: PageDom>(
    dom: &D,
    node: &D::Node,
    candidates: &SelectorList,
) -> Option<D::Node> {
    let el = element_target(dom, node)?;
    if inside_head(dom, &el) {
        return None;
    }
    let mut current = Some(el);
    while let Some(el) = current {
        if dom.has_tag(&el, "body") || dom.has_tag(&el, "html") {
            break;
        }
        if candidates.matches(dom, &el) {
            return Some(el);
        }
        current = dom.parent_element(&el);
    }
    dom.body()
}

fn inside_head<D: PageDom>(dom: &D, node: &D::Node) -> bool {
    let mut current = Some(node.clone());
    while let Some(el) = current {
        if dom.has_tag(&el, "head") {
            return true;
        }
        current = dom.parent_element(&el);
    }
    false
}
