//! Mode identifiers.
//!
//! Mode ids are kebab-case strings (`content-editor`) that end up in class
//! names, toolbar JSON and host callbacks. They are interned once in a
//! process-wide `lasso` table and passed around as a `Copy` key.

use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static MODE_NAMES: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModeId(Spur);

impl ModeId {
    /// Intern `name` without validation. Host-supplied names go through
    /// [`str::parse`] instead.
    pub fn intern(name: &str) -> Self {
        Self(MODE_NAMES.get_or_intern(name))
    }

    /// The id for `name` if it has been interned before.
    pub fn lookup(name: &str) -> Option<Self> {
        MODE_NAMES.get(name).map(Self)
    }

    pub fn as_str(&self) -> &'static str {
        MODE_NAMES.resolve(&self.0)
    }

    /// Short form used in class names: `content-editor` → `content`.
    pub fn slug(&self) -> &'static str {
        let name = self.as_str();
        name.strip_suffix("-editor").unwrap_or(name)
    }
}

impl FromStr for ModeId {
    type Err = String;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let valid = !name.is_empty()
            && !name.starts_with('-')
            && !name.ends_with('-')
            && name
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
        if valid {
            Ok(Self::intern(name))
        } else {
            Err(format!("Invalid mode id {name:?}: expected kebab-case"))
        }
    }
}

impl TryFrom<String> for ModeId {
    type Error = String;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse()
    }
}

impl From<ModeId> for String {
    fn from(id: ModeId) -> Self {
        id.as_str().to_string()
    }
}

impl fmt::Debug for ModeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ModeId").field(&self.as_str()).finish()
    }
}

impl fmt::Display for ModeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn same_name_same_key() {
        assert_eq!(ModeId::intern("style-editor"), ModeId::intern("style-editor"));
        assert_eq!(ModeId::lookup("style-editor").map(|m| m.as_str()), Some("style-editor"));
        assert_eq!(ModeId::lookup("never-registered-mode"), None);
    }

    #[test]
    fn slug_drops_editor_suffix() {
        assert_eq!(ModeId::intern("content-editor").slug(), "content");
        assert_eq!(ModeId::intern("section-rearranger").slug(), "section-rearranger");
    }

    #[test]
    fn host_names_must_be_kebab_case() {
        assert!("theme-editor".parse::<ModeId>().is_ok());
        assert!("v2-blocks".parse::<ModeId>().is_ok());
        for bad in ["", "Theme", "-x", "x-", "a b", "a_b"] {
            assert!(bad.parse::<ModeId>().is_err(), "{bad:?} accepted");
        }
    }

    #[test]
    fn json_is_the_bare_name() {
        let id = ModeId::intern("block-editor");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"block-editor\"");
        assert_eq!(serde_json::from_str::<ModeId>(&json).unwrap(), id);
        assert!(serde_json::from_str::<ModeId>("\"Block Editor\"").is_err());
    }
}
