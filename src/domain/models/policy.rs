//! Per-run policy configuration and repository coordinates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::errors::{GateError, GateResult};
use crate::domain::models::severity::Severity;

/// Owner/repository pair every remote call is scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoCoordinates {
    pub owner: String,
    pub repo: String,
}

impl RepoCoordinates {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl fmt::Display for RepoCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Repository visibility. Only affects how links are rendered in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    #[default]
    Private,
}

impl FromStr for Visibility {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "public" => Ok(Self::Public),
            // Internal repositories render like private ones.
            "private" | "internal" => Ok(Self::Private),
            other => Err(GateError::Config(format!(
                "unknown visibility '{other}', expected public or private"
            ))),
        }
    }
}

/// How the refs to probe are chosen on retry attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefMode {
    /// Probe only the PR merge ref; a missing ref is fatal.
    #[default]
    Single,
    /// Probe both PR head and merge refs and concatenate the results.
    Union,
    /// Merge ref, then head ref, then the default branch if the merge ref
    /// does not exist. Stops at the first ref with results.
    Fallback,
}

impl RefMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Union => "union",
            Self::Fallback => "fallback",
        }
    }
}

impl FromStr for RefMode {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "union" => Ok(Self::Union),
            "fallback" => Ok(Self::Fallback),
            other => Err(GateError::Config(format!(
                "unknown ref mode '{other}', expected single, union or fallback"
            ))),
        }
    }
}

impl fmt::Display for RefMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable configuration for one gate run.
///
/// Built once from CI inputs through [`PolicyConfig::new`], which rejects
/// anything the run could not act on before a single request is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyConfig {
    pub repository: RepoCoordinates,
    pub pull_request: u64,
    pub default_branch_ref: String,
    pub attempt: u32,
    pub threshold: Severity,
    pub max_age_days: i64,
    pub visibility: Visibility,
    pub report_marker: String,
    pub message: String,
    pub ref_mode: RefMode,
    pub dedupe: bool,
}

/// Raw inputs for [`PolicyConfig::new`], as received from the CI step.
#[derive(Debug, Clone, Default)]
pub struct PolicyInput {
    pub org: String,
    pub repo: String,
    pub pull_request: u64,
    pub default_branch: String,
    pub attempt: u32,
    pub threshold: String,
    pub max_age_days: i64,
    pub visibility: Visibility,
    pub report_marker: String,
    pub message: String,
    pub ref_mode: RefMode,
    pub dedupe: bool,
}

impl PolicyConfig {
    /// Validate raw inputs into a run configuration.
    pub fn new(input: PolicyInput) -> GateResult<Self> {
        let org = required("org", &input.org)?;
        let repo = required("repo", &input.repo)?;
        let default_branch_ref = required("default_branch", &input.default_branch)?;
        let report_marker = required("report_marker", &input.report_marker)?;

        if input.pull_request == 0 {
            return Err(GateError::Config(
                "pull_request must be a positive number".to_string(),
            ));
        }
        if input.attempt == 0 {
            return Err(GateError::Config(
                "attempt must be a positive number".to_string(),
            ));
        }
        if input.max_age_days < 0 {
            return Err(GateError::Config(format!(
                "age must not be negative, got {}",
                input.max_age_days
            )));
        }

        let threshold = input.threshold.parse::<Severity>()?;

        Ok(Self {
            repository: RepoCoordinates::new(org, repo),
            pull_request: input.pull_request,
            default_branch_ref,
            attempt: input.attempt,
            threshold,
            max_age_days: input.max_age_days,
            visibility: input.visibility,
            report_marker,
            message: input.message,
            ref_mode: input.ref_mode,
            dedupe: input.dedupe,
        })
    }

    /// Severities in scope for this run.
    pub fn severities(&self) -> &'static [Severity] {
        self.threshold.cascade()
    }
}

/// Configuration for the analysis freshness gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreshnessPolicy {
    pub repository: RepoCoordinates,
    pub pull_request: u64,
    pub default_branch_ref: String,
    pub attempt: u32,
    /// Maximum age of the most recent analysis, in days.
    pub period_days: i64,
    pub tool_name: String,
    pub report_marker: String,
    pub message: String,
    pub ref_mode: RefMode,
}

/// Raw inputs for [`FreshnessPolicy::new`].
#[derive(Debug, Clone, Default)]
pub struct FreshnessInput {
    pub org: String,
    pub repo: String,
    pub pull_request: u64,
    pub default_branch: String,
    pub attempt: u32,
    pub period_days: i64,
    pub tool_name: String,
    pub report_marker: String,
    pub message: String,
    pub ref_mode: RefMode,
}

impl FreshnessPolicy {
    pub fn new(input: FreshnessInput) -> GateResult<Self> {
        if input.pull_request == 0 || input.attempt == 0 {
            return Err(GateError::Config(
                "pull_request and attempt must be positive numbers".to_string(),
            ));
        }
        if input.period_days < 0 {
            return Err(GateError::Config(format!(
                "period must not be negative, got {}",
                input.period_days
            )));
        }
        Ok(Self {
            repository: RepoCoordinates::new(
                required("org", &input.org)?,
                required("repo", &input.repo)?,
            ),
            pull_request: input.pull_request,
            default_branch_ref: required("default_branch", &input.default_branch)?,
            attempt: input.attempt,
            period_days: input.period_days,
            tool_name: required("tool_name", &input.tool_name)?,
            report_marker: required("report_marker", &input.report_marker)?,
            message: input.message,
            ref_mode: input.ref_mode,
        })
    }
}

/// Configuration for the required repository property gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyPolicy {
    pub repository: RepoCoordinates,
    pub pull_request: u64,
    pub property_name: String,
    pub report_marker: String,
    pub message: String,
}

/// Raw inputs for [`PropertyPolicy::new`].
#[derive(Debug, Clone, Default)]
pub struct PropertyInput {
    pub org: String,
    pub repo: String,
    pub pull_request: u64,
    pub property_name: String,
    pub report_marker: String,
    pub message: String,
}

impl PropertyPolicy {
    pub fn new(input: PropertyInput) -> GateResult<Self> {
        if input.pull_request == 0 {
            return Err(GateError::Config(
                "pull_request must be a positive number".to_string(),
            ));
        }
        Ok(Self {
            repository: RepoCoordinates::new(
                required("org", &input.org)?,
                required("repo", &input.repo)?,
            ),
            pull_request: input.pull_request,
            property_name: required("property", &input.property_name)?,
            report_marker: required("report_marker", &input.report_marker)?,
            message: input.message,
        })
    }
}

fn required(name: &str, value: &str) -> GateResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(GateError::Config(format!("input '{name}' is required")));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> PolicyInput {
        PolicyInput {
            org: "octo-org".to_string(),
            repo: "service".to_string(),
            pull_request: 12,
            default_branch: "refs/heads/main".to_string(),
            attempt: 1,
            threshold: "high".to_string(),
            max_age_days: 30,
            visibility: Visibility::Public,
            report_marker: "Code Scanning Policy Findings".to_string(),
            message: "Please fix".to_string(),
            ref_mode: RefMode::Single,
            dedupe: false,
        }
    }

    #[test]
    fn test_valid_input() {
        let config = PolicyConfig::new(input()).unwrap();
        assert_eq!(config.repository.to_string(), "octo-org/service");
        assert_eq!(config.threshold, Severity::High);
        assert_eq!(config.severities(), &[Severity::Critical, Severity::High]);
    }

    #[test]
    fn test_inputs_are_trimmed() {
        let config = PolicyConfig::new(PolicyInput {
            org: "  octo-org ".to_string(),
            ..input()
        })
        .unwrap();
        assert_eq!(config.repository.owner, "octo-org");
    }

    #[test]
    fn test_missing_org_rejected() {
        let err = PolicyConfig::new(PolicyInput {
            org: "   ".to_string(),
            ..input()
        })
        .unwrap_err();
        assert!(matches!(err, GateError::Config(ref msg) if msg.contains("org")));
    }

    #[test]
    fn test_zero_attempt_rejected() {
        let err = PolicyConfig::new(PolicyInput {
            attempt: 0,
            ..input()
        })
        .unwrap_err();
        assert!(matches!(err, GateError::Config(_)));
    }

    #[test]
    fn test_negative_age_rejected() {
        let result = PolicyConfig::new(PolicyInput {
            max_age_days: -1,
            ..input()
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_threshold_rejected() {
        let result = PolicyConfig::new(PolicyInput {
            threshold: "urgent".to_string(),
            ..input()
        });
        assert!(matches!(result, Err(GateError::Config(_))));
    }

    #[test]
    fn test_visibility_parsing() {
        assert_eq!("public".parse::<Visibility>().unwrap(), Visibility::Public);
        assert_eq!("PRIVATE".parse::<Visibility>().unwrap(), Visibility::Private);
        assert_eq!("internal".parse::<Visibility>().unwrap(), Visibility::Private);
        assert!("secret".parse::<Visibility>().is_err());
    }

    #[test]
    fn test_ref_mode_parsing() {
        assert_eq!("fallback".parse::<RefMode>().unwrap(), RefMode::Fallback);
        assert_eq!(RefMode::Union.to_string(), "union");
        assert!("chain".parse::<RefMode>().is_err());
    }

    fn freshness_input() -> FreshnessInput {
        FreshnessInput {
            org: "o".to_string(),
            repo: "r".to_string(),
            pull_request: 3,
            default_branch: "main".to_string(),
            attempt: 2,
            period_days: 7,
            tool_name: "CodeQL".to_string(),
            report_marker: "Marker".to_string(),
            message: "msg".to_string(),
            ref_mode: RefMode::Fallback,
        }
    }

    #[test]
    fn test_freshness_policy_validation() {
        let policy = FreshnessPolicy::new(freshness_input()).unwrap();
        assert_eq!(policy.period_days, 7);
        assert!(FreshnessPolicy::new(FreshnessInput {
            period_days: -1,
            ..freshness_input()
        })
        .is_err());
        assert!(FreshnessPolicy::new(FreshnessInput {
            tool_name: " ".to_string(),
            ..freshness_input()
        })
        .is_err());
    }

    #[test]
    fn test_property_policy_requires_name() {
        let input = PropertyInput {
            org: "o".to_string(),
            repo: "r".to_string(),
            pull_request: 3,
            property_name: "security_maintainers".to_string(),
            report_marker: "M".to_string(),
            message: String::new(),
        };
        assert!(PropertyPolicy::new(input.clone()).is_ok());
        assert!(PropertyPolicy::new(PropertyInput {
            property_name: String::new(),
            ..input.clone()
        })
        .is_err());
        assert!(PropertyPolicy::new(PropertyInput {
            pull_request: 0,
            ..input
        })
        .is_err());
    }
}
