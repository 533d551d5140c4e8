//! Attribute-level helpers for `class` and inline `style` values.
//!
//! Both `PageDom` implementations route class and inline-style edits through
//! these helpers, so the serialized attribute text is identical whichever
//! document backs the editor.

use serde::Serialize;
use smallvec::SmallVec;

// ─── Classes ─────────────────────────────────────────────────────────────

/// Split a `class` attribute into its tokens.
pub fn class_tokens(value: &str) -> SmallVec<[&str; 4]> {
    value.split_ascii_whitespace().collect()
}

/// Whether `value` contains `class` as a whole token.
pub fn has_class_token(value: &str, class: &str) -> bool {
    value.split_ascii_whitespace().any(|c| c == class)
}

/// Append `class` to a class attribute value. Returns `None` when already present.
pub fn add_class_token(value: Option<&str>, class: &str) -> Option<String> {
    match value {
        Some(v) if has_class_token(v, class) => None,
        Some(v) if !v.trim().is_empty() => Some(format!("{} {class}", v.trim_end())),
        _ => Some(class.to_string()),
    }
}

/// Remove every occurrence of `class`. Returns `None` when it was absent.
pub fn remove_class_token(value: &str, class: &str) -> Option<String> {
    if !has_class_token(value, class) {
        return None;
    }
    let kept: SmallVec<[&str; 4]> = value
        .split_ascii_whitespace()
        .filter(|c| *c != class)
        .collect();
    Some(kept.join(" "))
}

// ─── Inline style ────────────────────────────────────────────────────────

/// Ordered list of inline CSS declarations (`style="a: b; c: d"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InlineStyle {
    decls: Vec<(String, String)>,
}

impl InlineStyle {
    /// Parse a `style` attribute value. Malformed declarations are dropped.
    pub fn parse(text: &str) -> Self {
        let mut style = Self::default();
        for chunk in split_declarations(text) {
            let Some((name, value)) = chunk.split_once(':') else {
                continue;
            };
            if name.trim().is_empty() || value.trim().is_empty() {
                continue;
            }
            style.set(name, value);
        }
        style
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        let property = normalize_property(property);
        self.decls
            .iter()
            .find(|(n, _)| *n == property)
            .map(|(_, v)| v.as_str())
    }

    /// Set a declaration, replacing an existing one in place.
    pub fn set(&mut self, property: &str, value: &str) {
        let property = normalize_property(property);
        let value = value.trim().to_string();
        match self.decls.iter_mut().find(|(n, _)| *n == property) {
            Some(slot) => slot.1 = value,
            None => self.decls.push((property, value)),
        }
    }

    /// Remove a declaration. Returns true if it existed.
    pub fn remove(&mut self, property: &str) -> bool {
        let property = normalize_property(property);
        let before = self.decls.len();
        self.decls.retain(|(n, _)| *n != property);
        self.decls.len() != before
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.decls.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Serialize back to attribute text.
    pub fn to_css_text(&self) -> String {
        self.decls
            .iter()
            .map(|(n, v)| format!("{n}: {v};"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Custom properties (`--brand`) are case-sensitive; everything else is not.
fn normalize_property(name: &str) -> String {
    let name = name.trim();
    if name.starts_with("--") {
        name.to_string()
    } else {
        name.to_ascii_lowercase()
    }
}

/// Split on `;` outside of parentheses and quotes (`url(a;b)` stays whole).
fn split_declarations(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, ';') if depth == 0 => {
                out.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    out.push(&text[start..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn add_and_remove_class() {
        assert_eq!(add_class_token(None, "a").as_deref(), Some("a"));
        assert_eq!(add_class_token(Some("x y"), "a").as_deref(), Some("x y a"));
        assert_eq!(add_class_token(Some("x a"), "a"), None);
        assert_eq!(remove_class_token("x a y a", "a").as_deref(), Some("x y"));
        assert_eq!(remove_class_token("x y", "a"), None);
    }

    #[test]
    fn class_match_is_whole_token() {
        assert!(!has_class_token("folio-hover-x", "folio-hover"));
        assert!(has_class_token("  folio-hover  ", "folio-hover"));
    }

    #[test]
    fn parse_and_edit_inline_style() {
        let mut style = InlineStyle::parse("Color: red; background: url(a;b.png) ; bad; --Brand: #fff");
        assert_eq!(style.get("color"), Some("red"));
        assert_eq!(style.get("background"), Some("url(a;b.png)"));
        assert_eq!(style.get("--Brand"), Some("#fff"));
        assert_eq!(style.get("--brand"), None);

        style.set("color", "blue");
        style.set("padding", "4px");
        assert!(style.remove("background"));
        assert!(!style.remove("margin"));
        assert_eq!(style.to_css_text(), "color: blue; --Brand: #fff; padding: 4px;");
    }

    #[test]
    fn empty_style_serializes_empty() {
        let style = InlineStyle::parse("  ;; ");
        assert!(style.is_empty());
        assert_eq!(style.to_css_text(), "");
    }
}
