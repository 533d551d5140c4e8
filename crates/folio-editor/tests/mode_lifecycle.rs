//! Integration tests: mode switching through `PageEditor` (folio-editor).
//!
//! Drives the built-in modes against an in-memory document and checks that
//! switching leaves no decorations, listeners, or stray commits behind.

use folio_core::{Document, EditorConfig, EventKind, ModeId, NodeIndex, PageDom, Rect};
use folio_editor::modes::{
    BLOCK_EDITOR, CONTENT_EDITOR, PAGE_EDITOR, SECTION_REARRANGER, STYLE_EDITOR,
};
use folio_editor::{DomEvent, ModeCommand, PageEditor, PanelState};
use pretty_assertions::assert_eq;

const PAGE: &str = concat!(
    "<!DOCTYPE html><html><head><title>Landing</title></head><body>",
    "<section id=\"section-hero\" class=\"hero\"><h1 id=\"headline\">Ship faster</h1>",
    "<p id=\"lede\">Build pages without code.</p></section>",
    "<section id=\"section-features\"><h2 id=\"features\">Features</h2></section>",
    "<section id=\"section-footer\"><p id=\"legal\">Legal</p></section>",
    "</body></html>"
);

fn editor() -> PageEditor<Document> {
    let mut editor = PageEditor::with_builtin_modes(EditorConfig::default());
    editor.set_iframe_document(Document::parse(PAGE).unwrap());
    editor
}

fn node(editor: &PageEditor<Document>, id: &str) -> NodeIndex {
    editor.document().unwrap().find_element_by_id(id).unwrap()
}

fn text_of(editor: &PageEditor<Document>, id: &str) -> NodeIndex {
    let el = node(editor, id);
    editor.document().unwrap().child_nodes(&el)[0]
}

// ─── Switching ──────────────────────────────────────────────────────────

#[test]
fn cycling_every_mode_leaves_page_untouched() {
    let mut editor = editor();
    let pristine = editor.document().unwrap().outer_html();
    let ids = editor.registry().ids();
    assert_eq!(ids.len(), 8);

    for id in ids {
        editor.set_mode(id);
        let owners = editor.document().unwrap().listener_owners();
        assert!(owners.len() <= 1, "{id}: {owners:?}");
        assert!(owners.iter().all(|o| *o == id));

        let text = text_of(&editor, "headline");
        let h1 = node(&editor, "headline");
        editor.dispatch(&DomEvent::at_origin(EventKind::MouseOver, text));
        editor.dispatch(&DomEvent::new(EventKind::MouseMove, h1, 5.0, 5.0));
        editor.dispatch(&DomEvent::at_origin(EventKind::Click, text));
    }
    editor.clear_mode();

    let doc = editor.document().unwrap();
    assert!(doc.listener_owners().is_empty());
    assert_eq!(doc.outer_html(), pristine);
    assert!(editor.take_changes().is_empty());
}

#[test]
fn switching_strips_previous_decorations() {
    let mut editor = editor();
    editor.set_mode_by_name(STYLE_EDITOR);
    let lede = node(&editor, "lede");
    assert!(editor.dispatch(&DomEvent::at_origin(EventKind::Click, lede)));
    assert!(editor.document().unwrap().outer_html().contains("folio-style-selected"));

    editor.set_mode_by_name(CONTENT_EDITOR);
    let html = editor.document().unwrap().outer_html();
    assert!(!html.contains("folio-style"), "{html}");
    assert_eq!(
        editor.document().unwrap().listener_owners(),
        vec![ModeId::intern(CONTENT_EDITOR)]
    );
}

#[test]
fn reloaded_document_reattaches_active_mode() {
    let mut editor = editor();
    editor.set_mode_by_name(PAGE_EDITOR);
    let previous = editor.set_iframe_document(Document::parse(PAGE).unwrap());
    assert!(previous.is_some());
    assert_eq!(editor.generation(), 2);
    assert_eq!(
        editor.document().unwrap().listener_owners(),
        vec![ModeId::intern(PAGE_EDITOR)]
    );
    assert!(matches!(editor.panel(), Some(PanelState::Selection { selected: None, .. })));
}

// ─── Content editor ─────────────────────────────────────────────────────

#[test]
fn content_edits_commit_once_on_exit() {
    let mut editor = editor();
    editor.set_mode_by_name(CONTENT_EDITOR);
    let text = text_of(&editor, "headline");
    assert!(editor.dispatch(&DomEvent::at_origin(EventKind::Click, text)));
    assert!(editor.command(&ModeCommand::SetText {
        html: "Ship today".into()
    }));
    assert!(editor.command(&ModeCommand::SetText {
        html: "Ship right now".into()
    }));
    assert!(editor.pending_changes().is_empty());

    editor.clear_mode();
    let changes = editor.take_changes();
    assert_eq!(changes.len(), 1);
    let change = &changes[0];
    assert_eq!(change.mode_id.as_str(), CONTENT_EDITOR);
    assert_eq!(change.mode_label, "Content");
    assert!(change.html.contains("<h1 id=\"headline\">Ship right now</h1>"));
    assert!(!change.html.contains("folio-"));
    assert_eq!(change.html, editor.document().unwrap().outer_html());
}

// ─── Block editor ───────────────────────────────────────────────────────

#[test]
fn block_lands_after_lower_third_target() {
    let mut editor = editor();
    let hero = node(&editor, "section-hero");
    editor
        .document_mut()
        .unwrap()
        .set_bounds(hero, Rect::new(0.0, 0.0, 800.0, 300.0));
    editor.set_mode_by_name(BLOCK_EDITOR);

    let h1 = node(&editor, "headline");
    assert!(editor.dispatch(&DomEvent::new(EventKind::MouseMove, h1, 10.0, 250.0)));
    assert!(editor.dispatch(&DomEvent::new(EventKind::Click, h1, 10.0, 250.0)));
    assert!(matches!(
        editor.panel(),
        Some(PanelState::Block { locked: true, .. })
    ));
    assert!(editor.command(&ModeCommand::InsertBlock {
        html: "<div id=\"cta\">Try it</div>".into()
    }));

    let doc = editor.document().unwrap();
    let cta = doc.find_element_by_id("cta").unwrap();
    assert_eq!(doc.next_element_sibling(&hero), Some(cta));
    let changes = editor.take_changes();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].mode_id.as_str(), BLOCK_EDITOR);
    assert!(!changes[0].html.contains("folio-block-"));
}

// ─── Rearranger ─────────────────────────────────────────────────────────

#[test]
fn dropping_in_upper_half_moves_section_before() {
    let mut editor = editor();
    {
        let doc = editor.document_mut().unwrap();
        for (i, id) in ["section-hero", "section-features", "section-footer"]
            .iter()
            .enumerate()
        {
            let n = doc.find_element_by_id(id).unwrap();
            let top = i as f64 * 100.0;
            doc.set_bounds(n, Rect::new(0.0, top, 800.0, top + 100.0));
        }
    }
    editor.set_mode_by_name(SECTION_REARRANGER);
    let footer = node(&editor, "section-footer");
    let hero = node(&editor, "section-hero");
    let headline = node(&editor, "headline");

    assert!(editor.dispatch(&DomEvent::at_origin(EventKind::DragStart, footer)));
    assert!(editor.dispatch(&DomEvent::new(EventKind::DragOver, headline, 10.0, 20.0)));
    assert!(editor.dispatch(&DomEvent::new(EventKind::Drop, headline, 10.0, 20.0)));
    assert!(matches!(
        editor.panel(),
        Some(PanelState::Rearrange { has_changes: true, dragging: None, .. })
    ));

    let doc = editor.document().unwrap();
    assert_eq!(doc.next_element_sibling(&footer), Some(hero));
    assert!(editor.pending_changes().is_empty());

    editor.clear_mode();
    let changes = editor.take_changes();
    assert_eq!(changes.len(), 1);
    let html = &changes[0].html;
    assert!(!html.contains("draggable"), "{html}");
    assert!(!html.contains("opacity"), "{html}");
    let footer_at = html.find("section-footer").unwrap();
    let hero_at = html.find("section-hero").unwrap();
    assert!(footer_at < hero_at);
}
