//! Candidate refs to probe for findings.

use serde::Serialize;

/// Head ref of a pull request.
pub fn pull_head_ref(pull_request: u64) -> String {
    format!("refs/pull/{pull_request}/head")
}

/// Merge ref of a pull request.
pub fn pull_merge_ref(pull_request: u64) -> String {
    format!("refs/pull/{pull_request}/merge")
}

/// The refs one run will query, and how results across them combine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RefPlan {
    /// Query every ref and concatenate the results.
    All { refs: Vec<String> },
    /// Query refs in order and stop at the first one with results.
    /// `on_missing` is tried last, and only when the first link did not exist.
    Chain {
        links: Vec<String>,
        on_missing: Option<String>,
    },
}

impl RefPlan {
    /// Every ref the plan may touch, in probe order.
    pub fn refs(&self) -> Vec<&str> {
        match self {
            Self::All { refs } => refs.iter().map(String::as_str).collect(),
            Self::Chain { links, on_missing } => links
                .iter()
                .chain(on_missing.iter())
                .map(String::as_str)
                .collect(),
        }
    }
}
