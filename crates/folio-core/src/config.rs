//! Editor configuration.
//!
//! Every field has a default so hosts can pass a partial JSON object.

use serde::{Deserialize, Serialize};

// ─── Config ───────────────────────────────────────────────────────────────

/// Sandbox attribute set for the preview iframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SandboxPolicy {
    /// Live preview: the page's own scripts may run.
    #[default]
    Preview,
    /// Code preview panel: markup only.
    CodePreview,
}

impl SandboxPolicy {
    /// Value for the iframe's `sandbox` attribute.
    pub fn attribute(self) -> &'static str {
        match self {
            Self::Preview => "allow-same-origin allow-scripts",
            Self::CodePreview => "allow-same-origin",
        }
    }
}

/// Configuration shared by every edit mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// `id` prefix that marks an element as a section. Default: `section-`.
    pub section_prefix: String,

    /// Prefix for every class and element id the editor injects. Default: `folio`.
    pub class_prefix: String,

    /// Selectors for block-insertion candidates (`<body>` is always one).
    pub block_selectors: Vec<String>,

    /// Maximum undo depth. Default: 100.
    pub history_depth: usize,

    pub sandbox: SandboxPolicy,

    /// Canvas zoom bounds.
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            section_prefix: "section-".to_string(),
            class_prefix: "folio".to_string(),
            block_selectors: [
                "section",
                "header",
                "footer",
                "main",
                "article",
                "aside",
                "nav",
                "div.container",
                "[id^=section-]",
                "[data-block]",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            history_depth: 100,
            sandbox: SandboxPolicy::Preview,
            min_zoom: 0.1,
            max_zoom: 8.0,
        }
    }
}

impl EditorConfig {
    /// Parse a (possibly partial) JSON configuration.
    ///
    /// # Errors
    /// Returns the serde error message for malformed JSON or bad field types.
    pub fn from_json(json: &str) -> Result<Self, String> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| format!("Invalid editor config: {e}"))?;
        if config.min_zoom <= 0.0 || config.min_zoom > config.max_zoom {
            return Err(format!(
                "Invalid editor config: zoom bounds {}..{}",
                config.min_zoom, config.max_zoom
            ));
        }
        Ok(config)
    }

    /// `true` when `id` marks a section.
    pub fn is_section_id(&self, id: &str) -> bool {
        !self.section_prefix.is_empty() && id.starts_with(&self.section_prefix)
    }

    /// `{prefix}-{suffix}`, the shared naming scheme for injected classes/ids.
    pub fn prefixed(&self, suffix: &str) -> String {
        format!("{}-{suffix}", self.class_prefix)
    }
}
