//! Ref resolution strategy.
//!
//! Turns the run attempt and pull request identifiers into the [`RefPlan`]
//! the retriever walks. The first attempt of a check always looks at the
//! default branch; retries look at the pull request refs according to the
//! configured [`RefMode`].

use crate::domain::models::{pull_head_ref, pull_merge_ref, RefMode, RefPlan};

/// Chooses which refs to probe for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefResolver {
    mode: RefMode,
}

impl RefResolver {
    pub const fn new(mode: RefMode) -> Self {
        Self { mode }
    }

    /// Build the plan for one run. Never returns an empty plan.
    pub fn plan(&self, attempt: u32, pull_request: u64, default_branch_ref: &str) -> RefPlan {
        if attempt <= 1 {
            return RefPlan::All {
                refs: vec![default_branch_ref.to_string()],
            };
        }

        match self.mode {
            RefMode::Single => RefPlan::All {
                refs: vec![pull_merge_ref(pull_request)],
            },
            RefMode::Union => RefPlan::All {
                refs: vec![pull_head_ref(pull_request), pull_merge_ref(pull_request)],
            },
            RefMode::Fallback => RefPlan::Chain {
                links: vec![pull_merge_ref(pull_request), pull_head_ref(pull_request)],
                on_missing: Some(default_branch_ref.to_string()),
            },
        }
    }
}
