//! GitHub wire payloads that do not map one-to-one onto domain records.
//!
//! Alerts, analyses and comments deserialize straight into the domain
//! shapes; only request bodies and custom property values live here.

use serde::{Deserialize, Serialize};

/// Request body for posting a comment on an issue or pull request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRequest {
    /// Markdown body of the comment.
    pub body: String,
}

/// One entry of `GET /repos/{owner}/{repo}/properties/values`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoPropertyValue {
    pub property_name: String,
    /// String for single-value properties, array for multi-select, null
    /// when unset.
    #[serde(default)]
    pub value: Option<serde_json::Value>,
}

impl RepoPropertyValue {
    /// Flatten the value to a string. Multi-select values are joined with
    /// commas; null and other shapes yield `None`.
    pub fn as_text(&self) -> Option<String> {
        match self.value.as_ref()? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Array(items) => Some(
                items
                    .iter()
                    .filter_map(serde_json::Value::as_str)
                    .collect::<Vec<_>>()
                    .join(","),
            ),
            _ => None,
        }
    }
}
