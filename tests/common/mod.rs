//! Common test utilities for integration tests
//!
//! Shared fixtures for alerts, analyses and policies, plus the in-memory
//! repository service the gates run against.

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};

pub use policy_gate::adapters::InMemoryRepositoryService;
use policy_gate::domain::models::{
    FreshnessInput, FreshnessPolicy, PolicyConfig, PolicyInput, RawAlert, RawAnalysis, RefMode,
    Visibility,
};

pub const ORG: &str = "octo-org";
pub const REPO: &str = "payments";
pub const PR: u64 = 42;
pub const DEFAULT_BRANCH: &str = "refs/heads/main";
pub const BOT: &str = "github-actions[bot]";
pub const CODE_SCANNING_MARKER: &str = "Code Scanning Policy Findings";
pub const FRESHNESS_MARKER: &str = "Code Scanning Analysis Policy";
pub const PROPERTY_MARKER: &str = "Policy: Required Security Maintainers";

/// Fixed clock for deterministic ages.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

pub fn days_ago(days: i64) -> DateTime<Utc> {
    now() - Duration::days(days)
}

pub fn alert(number: u64, age_days: i64) -> RawAlert {
    RawAlert {
        number,
        html_url: format!("https://github.com/{ORG}/{REPO}/security/code-scanning/{number}"),
        created_at: days_ago(age_days),
    }
}

pub fn analysis(id: u64, git_ref: &str, created_at: DateTime<Utc>) -> RawAnalysis {
    RawAnalysis {
        id,
        git_ref: git_ref.to_string(),
        created_at,
        url: format!("https://api.github.com/repos/{ORG}/{REPO}/code-scanning/analyses/{id}"),
    }
}

pub fn policy_input() -> PolicyInput {
    PolicyInput {
        org: ORG.to_string(),
        repo: REPO.to_string(),
        pull_request: PR,
        default_branch: DEFAULT_BRANCH.to_string(),
        attempt: 1,
        threshold: "high".to_string(),
        max_age_days: 30,
        visibility: Visibility::Public,
        report_marker: CODE_SCANNING_MARKER.to_string(),
        message: "Please remediate the findings below.".to_string(),
        ref_mode: RefMode::Single,
        dedupe: false,
    }
}

pub fn policy(input: PolicyInput) -> PolicyConfig {
    PolicyConfig::new(input).expect("valid policy")
}

/// Freshness policy over a seven day period for the shared pull request.
pub fn freshness_policy(attempt: u32, ref_mode: RefMode) -> FreshnessPolicy {
    FreshnessPolicy::new(FreshnessInput {
        org: ORG.to_string(),
        repo: REPO.to_string(),
        pull_request: PR,
        default_branch: DEFAULT_BRANCH.to_string(),
        attempt,
        period_days: 7,
        tool_name: "CodeQL".to_string(),
        report_marker: FRESHNESS_MARKER.to_string(),
        message: "No recent CodeQL analysis was found for this pull request.".to_string(),
        ref_mode,
    })
    .expect("valid freshness policy")
}
