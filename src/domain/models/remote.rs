//! Records exchanged with the remote repository service.
//!
//! These are the port-level shapes; adapters deserialize their wire
//! payloads straight into them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::models::policy::RepoCoordinates;
use crate::domain::models::severity::Severity;

/// A code scanning alert as listed by the remote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAlert {
    /// Alert number within the repository.
    pub number: u64,
    /// Link to the alert in the web UI.
    pub html_url: String,
    pub created_at: DateTime<Utc>,
}

/// A code scanning analysis upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAnalysis {
    pub id: u64,
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub url: String,
}

/// Author of an issue comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentAuthor {
    pub login: String,
}

/// A comment on a pull request's conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueComment {
    pub id: u64,
    /// Absent for comments from deleted accounts.
    #[serde(default)]
    pub user: Option<CommentAuthor>,
    #[serde(default)]
    pub body: Option<String>,
}

impl IssueComment {
    pub fn author(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.login.as_str())
    }

    pub fn body(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }
}

/// Opaque continuation token handed back by a paginated listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor(pub String);

/// One page of a listing plus the cursor for the next page, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<PageCursor>,
}

/// Query for open alerts of one severity on one ref.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertQuery {
    pub repository: RepoCoordinates,
    pub git_ref: String,
    pub severity: Severity,
    pub page_size: u32,
}

/// Query for the most recent analyses of one tool on one ref.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisQuery {
    pub repository: RepoCoordinates,
    pub git_ref: String,
    pub tool_name: String,
    pub page_size: u32,
}
