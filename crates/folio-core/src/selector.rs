//! Minimal CSS selector matching for candidate lookups.
//!
//! Compound selectors only: an optional tag (or `*`) followed by any number
//! of `.class`, `#id`, `[attr]`, `[attr=value]` and `[attr^=value]`, joined
//! into comma-separated lists. No combinators.

use crate::dom::PageDom;
use winnow::combinator::{alt, delimited, opt, preceded};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::{take_till, take_while};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrMatch {
    Exists,
    Equals(String),
    Prefix(String),
}

/// One compound selector, e.g. `div.container[data-block]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    pub tag: Option<String>,
    pub ids: Vec<String>,
    pub classes: Vec<String>,
    pub attrs: Vec<(String, AttrMatch)>,
}

impl Selector {
    pub fn matches<D: PageDom>(&self, dom: &D, node: &D::Node) -> bool {
        let Some(tag) = dom.tag_name(node) else {
            return false;
        };
        if let Some(want) = &self.tag
            && *want != tag
        {
            return false;
        }
        if !self.ids.is_empty() {
            let id = dom.attribute(node, "id");
            if self.ids.iter().any(|want| id.as_deref() != Some(want.as_str())) {
                return false;
            }
        }
        if self.classes.iter().any(|c| !dom.has_class(node, c)) {
            return false;
        }
        self.attrs.iter().all(|(name, rule)| {
            let value = dom.attribute(node, name);
            match (rule, value) {
                (_, None) => false,
                (AttrMatch::Exists, Some(_)) => true,
                (AttrMatch::Equals(want), Some(v)) => v == *want,
                (AttrMatch::Prefix(want), Some(v)) => v.starts_with(want.as_str()),
            }
        })
    }
}

/// Comma-separated selector list; matches when any member matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorList {
    pub selectors: Vec<Selector>,
}

impl SelectorList {
    /// Parse `a, b.c, [id^=section-]`.
    ///
    /// # Errors
    /// Returns a message naming the offending input on invalid syntax.
    pub fn parse(input: &str) -> Result<Self, String> {
        let mut rest = input.trim();
        let mut selectors = Vec::new();
        loop {
            let sel = parse_compound
                .parse_next(&mut rest)
                .map_err(|e| format!("Selector parse error in {input:?}: {e}"))?;
            selectors.push(sel);
            rest = rest.trim_start();
            if rest.is_empty() {
                break;
            }
            match rest.strip_prefix(',') {
                Some(tail) => rest = tail.trim_start(),
                None => return Err(format!("Unsupported selector syntax in {input:?} at {rest:?}")),
            }
        }
        Ok(Self { selectors })
    }

    /// Build from configuration patterns, skipping (and logging) invalid ones.
    pub fn from_patterns(patterns: &[String]) -> Self {
        let mut selectors = Vec::new();
        for pattern in patterns {
            match Self::parse(pattern) {
                Ok(list) => selectors.extend(list.selectors),
                Err(e) => log::warn!("ignoring selector: {e}"),
            }
        }
        Self { selectors }
    }

    pub fn matches<D: PageDom>(&self, dom: &D, node: &D::Node) -> bool {
        self.selectors.iter().any(|s| s.matches(dom, node))
    }
}

// ─── Low-level parsers ──────────────────────────────────────────────────

fn backtrack<T>() -> ModalResult<T> {
    Err(ErrMode::Backtrack(ContextError::new()))
}

fn parse_ident<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    take_while(1.., |c: char| c.is_alphanumeric() || c == '-' || c == '_').parse_next(input)
}

fn parse_compound(input: &mut &str) -> ModalResult<Selector> {
    let mut sel = Selector::default();
    let universal = match input.strip_prefix('*') {
        Some(rest) => {
            *input = rest;
            true
        }
        None => {
            sel.tag = opt(parse_ident)
                .parse_next(input)?
                .map(|t| t.to_ascii_lowercase());
            false
        }
    };
    loop {
        match input.chars().next() {
            Some('.') => {
                let class = preceded('.', parse_ident).parse_next(input)?;
                sel.classes.push(class.to_string());
            }
            Some('#') => {
                let id = preceded('#', parse_ident).parse_next(input)?;
                sel.ids.push(id.to_string());
            }
            Some('[') => sel.attrs.push(parse_attr_selector(input)?),
            _ => break,
        }
    }
    if !universal && sel == Selector::default() {
        return backtrack();
    }
    Ok(sel)
}

fn parse_attr_selector(input: &mut &str) -> ModalResult<(String, AttrMatch)> {
    let Some(rest) = input.strip_prefix('[') else {
        return backtrack();
    };
    *input = rest.trim_start();
    let name = parse_ident(input)?.to_ascii_lowercase();
    *input = input.trim_start();

    let rule = if let Some(rest) = input.strip_prefix("^=") {
        *input = rest.trim_start();
        AttrMatch::Prefix(parse_attr_value(input)?.to_string())
    } else if let Some(rest) = input.strip_prefix('=') {
        *input = rest.trim_start();
        AttrMatch::Equals(parse_attr_value(input)?.to_string())
    } else {
        AttrMatch::Exists
    };

    *input = input.trim_start();
    match input.strip_prefix(']') {
        Some(rest) => {
            *input = rest;
            Ok((name, rule))
        }
        None => backtrack(),
    }
}

fn parse_attr_value<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    alt((
        delimited('"', take_till(0.., '"'), '"'),
        delimited('\'', take_till(0.., '\''), '\''),
        parse_ident,
    ))
    .parse_next(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_compound_parts() {
        let list = SelectorList::parse("DIV.container#main[data-x][id^=\"section-\"]").unwrap();
        assert_eq!(
            list.selectors,
            vec![Selector {
                tag: Some("div".into()),
                ids: vec!["main".into()],
                classes: vec!["container".into()],
                attrs: vec![
                    ("data-x".into(), AttrMatch::Exists),
                    ("id".into(), AttrMatch::Prefix("section-".into())),
                ],
            }]
        );
    }

    #[test]
    fn parse_list_and_universal() {
        let list = SelectorList::parse("section, *[role=main] , .hero").unwrap();
        assert_eq!(list.selectors.len(), 3);
        assert_eq!(list.selectors[1].tag, None);
    }

    #[test]
    fn combinators_are_rejected() {
        assert!(SelectorList::parse("main > section").is_err());
        assert!(SelectorList::parse("").is_err());
        assert!(SelectorList::parse("a,").is_err());
    }

    #[test]
    fn from_patterns_skips_invalid() {
        let list = SelectorList::from_patterns(&["header".into(), "div p".into(), "footer".into()]);
        assert_eq!(list.selectors.len(), 2);
    }

    #[test]
    fn matches_elements() {
        let doc = Document::parse(
            "<html><body><div class=\"container wide\" id=\"section-1\"></div><div></div></body></html>",
        )
        .unwrap();
        let divs: Vec<_> = doc.elements().into_iter().filter(|n| doc.has_tag(n, "div")).collect();
        let list = SelectorList::parse("div.container[id^=section-]").unwrap();
        assert!(list.matches(&doc, &divs[0]));
        assert!(!list.matches(&doc, &divs[1]));
        let text_free = SelectorList::parse("[id=section-1]").unwrap();
        assert!(text_free.matches(&doc, &divs[0]));
    }
}
