//! Verdicts and terminal gate outcomes.

use serde::Serialize;

use crate::domain::models::finding::Finding;

/// Pass/fail decision derived from a set of findings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub findings: Vec<Finding>,
    pub violations: Vec<Finding>,
    pub passed: bool,
}

impl Verdict {
    /// Reduce findings to their violations. Pure; an empty input passes.
    pub fn decide(findings: Vec<Finding>) -> Self {
        let violations: Vec<Finding> = findings
            .iter()
            .filter(|f| f.exceeds_threshold)
            .cloned()
            .collect();
        Self {
            passed: violations.is_empty(),
            findings,
            violations,
        }
    }
}

/// How a gate run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GateOutcome {
    /// Data was evaluated and nothing violated the policy.
    Passed { summary: String },
    /// Data was evaluated and the policy was violated.
    Failed { reason: String },
    /// The data the policy needs does not exist at all.
    NoData { reason: String },
}

impl GateOutcome {
    pub const fn passed(&self) -> bool {
        matches!(self, Self::Passed { .. })
    }

    /// Summary on success, failure reason otherwise.
    pub fn message(&self) -> &str {
        match self {
            Self::Passed { summary } => summary,
            Self::Failed { reason } | Self::NoData { reason } => reason,
        }
    }
}

/// Everything a gate run produced, for the CLI to print.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GateRun {
    pub gate: &'static str,
    pub outcome: GateOutcome,
    pub findings: Vec<Finding>,
    pub report_posted: bool,
}
