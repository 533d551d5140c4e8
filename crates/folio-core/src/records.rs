//! Flat records mirrored from the hosted backend.
//!
//! The backend is authoritative; these types only give the JSON a shape.
//! Every endpoint answers with an [`ApiResponse`] envelope.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// `{ success, data?, error? }` response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    /// Collapse the envelope. A successful response without `data` is an error.
    pub fn into_result(self) -> Result<T, String> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            (true, None) => Err("Response succeeded without data".to_string()),
            (false, _) => Err(self.error.unwrap_or_else(|| "Request failed".to_string())),
        }
    }
}

/// Decode an envelope and collapse it to its payload.
pub fn unwrap_envelope<T: DeserializeOwned>(json: &str) -> Result<T, String> {
    serde_json::from_str::<ApiResponse<T>>(json)
        .map_err(|e| format!("Malformed response: {e}"))?
        .into_result()
}

/// An uploaded image or document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    pub created_at: String,
}

/// A saved snapshot of a site's HTML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    pub id: String,
    pub url: String,
    /// Mode that produced the snapshot, when known.
    #[serde(default)]
    pub mode_id: Option<String>,
    pub created_at: String,
}

/// A published page path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub id: String,
    pub path: String,
    #[serde(default)]
    pub title: Option<String>,
    pub created_at: String,
}

/// Answer from the domain availability check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainStatus {
    pub domain: String,
    pub available: bool,
}
