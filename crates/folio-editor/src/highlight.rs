//! Hover/selection decoration shared by the element-picking modes.
//!
//! A `Highlighter` owns everything a mode adds to the page besides its
//! edits: one injected `<style>` element, its listener set, and up to
//! three decorated elements (hovered, selected, focused). Decorations are
//! stripped around every commit so snapshots never contain them, and
//! stripped document-wide on detach.

use crate::modes::ModeContext;
use folio_core::{EditorConfig, ListenerSet, ModeId, PageDom};

/// Class names and style element id for one mode: `{prefix}-{slug}-hover` etc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightClasses {
    pub hover: String,
    pub selected: String,
    pub focus: String,
    pub style_id: String,
}

impl HighlightClasses {
    pub fn for_mode(config: &EditorConfig, mode: ModeId) -> Self {
        let slug = mode.slug();
        Self {
            hover: config.prefixed(&format!("{slug}-hover")),
            selected: config.prefixed(&format!("{slug}-selected")),
            focus: config.prefixed(&format!("{slug}-focus")),
            style_id: config.prefixed(&format!("{slug}-style")),
        }
    }

    pub fn all(&self) -> [&str; 3] {
        [&self.hover, &self.selected, &self.focus]
    }

    fn base_css(&self) -> String {
        format!(
            ".{} {{ outline: 2px dashed #3b82f6; outline-offset: 2px; cursor: pointer; }}\n\
             .{} {{ outline: 2px solid #2563eb; outline-offset: 2px; }}\n\
             .{} {{ background-color: rgba(37, 99, 235, 0.08); }}\n",
            self.hover, self.selected, self.focus
        )
    }
}

#[derive(Debug)]
pub struct Highlighter<N> {
    classes: Option<HighlightClasses>,
    css: String,
    style_node: Option<N>,
    hovered: Option<N>,
    selected: Option<N>,
    focused: Option<N>,
}

impl<N> Default for Highlighter<N> {
    fn default() -> Self {
        Self {
            classes: None,
            css: String::new(),
            style_node: None,
            hovered: None,
            selected: None,
            focused: None,
        }
    }
}

impl<N: Clone + PartialEq> Highlighter<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classes(&self) -> Option<&HighlightClasses> {
        self.classes.as_ref()
    }

    pub fn is_attached(&self) -> bool {
        self.classes.is_some()
    }

    pub fn hovered(&self) -> Option<&N> {
        self.hovered.as_ref()
    }

    pub fn selected(&self) -> Option<&N> {
        self.selected.as_ref()
    }

    pub fn focused(&self) -> Option<&N> {
        self.focused.as_ref()
    }

    /// Inject the mode's stylesheet and register its listeners.
    pub fn attach<D: PageDom<Node = N>>(
        &mut self,
        cx: &mut ModeContext<'_, D>,
        listeners: Option<ListenerSet>,
        extra_css: &str,
    ) {
        let classes = HighlightClasses::for_mode(cx.config, cx.mode_id);
        self.css = classes.base_css();
        self.css.push_str(extra_css);
        self.style_node = cx.dom.inject_style(&classes.style_id, &self.css);
        if let Some(listeners) = listeners {
            cx.dom.add_listeners(cx.mode_id, listeners);
        }
        log::debug!("{} attached", cx.mode_id);
        self.classes = Some(classes);
    }

    /// Remove listeners, the stylesheet, and every decoration class.
    pub fn detach<D: PageDom<Node = N>>(&mut self, cx: &mut ModeContext<'_, D>) {
        let removed = cx.dom.remove_listeners(cx.mode_id);
        self.suspend(cx.dom);
        self.hovered = None;
        self.selected = None;
        self.focused = None;
        self.classes = None;
        log::debug!("{} detached ({removed} listener sets)", cx.mode_id);
    }

    /// Move the hover decoration. Returns whether anything changed.
    pub fn hover<D: PageDom<Node = N>>(&mut self, dom: &mut D, target: Option<N>) -> bool {
        let Some(classes) = &self.classes else {
            return false;
        };
        swap_mark(dom, &mut self.hovered, &classes.hover, target)
    }

    /// Move the selection. A new selection clears the focused sub-element.
    pub fn select<D: PageDom<Node = N>>(&mut self, dom: &mut D, target: Option<N>) -> bool {
        let Some(classes) = &self.classes else {
            return false;
        };
        let changed = swap_mark(dom, &mut self.selected, &classes.selected, target);
        if changed {
            swap_mark(dom, &mut self.focused, &classes.focus, None);
        }
        changed
    }

    pub fn focus<D: PageDom<Node = N>>(&mut self, dom: &mut D, target: Option<N>) -> bool {
        let Some(classes) = &self.classes else {
            return false;
        };
        swap_mark(dom, &mut self.focused, &classes.focus, target)
    }

    /// Strip the stylesheet and all decoration classes, keeping the
    /// tracked handles so `resume` can restore them.
    pub fn suspend<D: PageDom<Node = N>>(&mut self, dom: &mut D) {
        let Some(classes) = &self.classes else {
            return;
        };
        if let Some(style) = self.style_node.take() {
            dom.remove_node(&style);
        }
        let strays: Vec<N> = dom
            .elements()
            .into_iter()
            .filter(|n| dom.attribute(n, "id").as_deref() == Some(classes.style_id.as_str()))
            .collect();
        for stray in strays {
            dom.remove_node(&stray);
        }
        for class in classes.all() {
            for el in dom.elements_with_class(class) {
                dom.remove_class(&el, class);
            }
        }
    }

    /// Re-inject the stylesheet and re-decorate tracked elements that are
    /// still in the document.
    pub fn resume<D: PageDom<Node = N>>(&mut self, dom: &mut D) {
        let Some(classes) = &self.classes else {
            return;
        };
        self.style_node = dom.inject_style(&classes.style_id, &self.css);
        let slots = [
            (&mut self.hovered, &classes.hover),
            (&mut self.selected, &classes.selected),
            (&mut self.focused, &classes.focus),
        ];
        for (slot, class) in slots {
            match slot.take() {
                Some(node) if dom.is_connected(&node) => {
                    dom.add_class(&node, class);
                    *slot = Some(node);
                }
                _ => {}
            }
        }
    }

    /// Emit a commit with decorations stripped, then restore them.
    pub fn commit<D: PageDom<Node = N>>(&mut self, cx: &mut ModeContext<'_, D>) {
        self.suspend(cx.dom);
        cx.commit();
        self.resume(cx.dom);
    }

    /// Drop tracked handles that are no longer in the document.
    pub fn prune<D: PageDom<Node = N>>(&mut self, dom: &D) {
        for slot in [&mut self.hovered, &mut self.selected, &mut self.focused] {
            if slot.as_ref().is_some_and(|n| !dom.is_connected(n)) {
                *slot = None;
            }
        }
    }

    /// Forget every handle; the document they pointed into is gone.
    pub fn forget(&mut self) {
        self.style_node = None;
        self.hovered = None;
        self.selected = None;
        self.focused = None;
        self.classes = None;
    }
}

fn swap_mark<D: PageDom>(
    dom: &mut D,
    slot: &mut Option<D::Node>,
    class: &str,
    target: Option<D::Node>,
) -> bool {
    if *slot == target {
        return false;
    }
    if let Some(prev) = slot.take() {
        dom.remove_class(&prev, class);
    }
    if let Some(next) = &target {
        dom.add_class(next, class);
    }
    *slot = target;
    true
}
