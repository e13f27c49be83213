//! Code scanning analysis freshness gate.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::domain::errors::{GateError, GateResult};
use crate::domain::models::{FreshnessPolicy, GateOutcome, GateRun, Report};
use crate::domain::ports::RepositoryService;
use crate::services::finding_retriever::FindingRetriever;
use crate::services::ref_resolver::RefResolver;
use crate::services::report_manager::ReportManager;

/// True when more than `period_days` have elapsed since `created_at`.
/// Compared exactly; a partial day past the period is already stale.
pub fn is_stale(created_at: DateTime<Utc>, now: DateTime<Utc>, period_days: i64) -> bool {
    (now - created_at).num_seconds() > period_days.saturating_mul(86_400)
}

/// Fails a pull request when no recent analysis exists for the tool.
///
/// "No analysis at all" and "analysis too old" are separate failures; both
/// post the configured message so the failure is visible on the PR.
pub struct FreshnessGate {
    service: Arc<dyn RepositoryService>,
    policy: FreshnessPolicy,
    bot_login: String,
}

impl FreshnessGate {
    pub const NAME: &'static str = "freshness";

    pub fn new(
        service: Arc<dyn RepositoryService>,
        policy: FreshnessPolicy,
        bot_login: impl Into<String>,
    ) -> Self {
        Self {
            service,
            policy,
            bot_login: bot_login.into(),
        }
    }

    pub async fn run(&self, now: DateTime<Utc>) -> GateResult<GateRun> {
        let policy = &self.policy;
        let plan = RefResolver::new(policy.ref_mode).plan(
            policy.attempt,
            policy.pull_request,
            &policy.default_branch_ref,
        );
        info!(
            repository = %policy.repository,
            pr = policy.pull_request,
            refs = ?plan.refs(),
            tool = %policy.tool_name,
            "Retrieving most recent analysis"
        );

        let lookup = FindingRetriever::new(
            self.service.clone(),
            policy.repository.clone(),
            now,
            policy.period_days,
        )
        .most_recent_analysis(&plan, &policy.tool_name)
        .await;

        // GitHub answers 404 "no analysis found" for a ref without analyses.
        let analysis = match lookup {
            Ok(analysis) => analysis,
            Err(GateError::NotFound { git_ref, source }) => {
                info!(git_ref = %git_ref, error = %source, "No analysis on any probed ref");
                None
            }
            Err(err) => return Err(err),
        };

        let reports = ReportManager::new(
            self.service.clone(),
            policy.repository.clone(),
            policy.pull_request,
            &self.bot_login,
        );

        let outcome = match analysis {
            None => GateOutcome::NoData {
                reason: "No analysis found, setting status to failed".to_string(),
            },
            Some(analysis) if is_stale(analysis.created_at, now, policy.period_days) => {
                GateOutcome::Failed {
                    reason: format!(
                        "Most recent analysis is older than {} days, setting status to failed",
                        policy.period_days
                    ),
                }
            }
            Some(analysis) => {
                let cleared = reports.clear_reports(&policy.report_marker).await?;
                info!(
                    analysis_id = analysis.id,
                    git_ref = %analysis.git_ref,
                    cleared,
                    "Analysis is fresh"
                );
                return Ok(GateRun {
                    gate: Self::NAME,
                    outcome: GateOutcome::Passed {
                        summary: format!(
                            "Analysis is within {} days, setting status to success",
                            policy.period_days
                        ),
                    },
                    findings: Vec::new(),
                    report_posted: false,
                });
            }
        };

        warn!(
            repository = %policy.repository,
            reason = outcome.message(),
            "Freshness check failed"
        );
        let report = Report::notice(&policy.report_marker, &policy.message);
        reports
            .replace_report(&policy.report_marker, &report.render())
            .await?;

        Ok(GateRun {
            gate: Self::NAME,
            outcome,
            findings: Vec::new(),
            report_posted: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_is_stale_boundary() {
        let now = Utc::now();
        assert!(!is_stale(now - Duration::days(7), now, 7));
        assert!(is_stale(now - Duration::days(7) - Duration::minutes(1), now, 7));
        assert!(is_stale(now - Duration::hours(1), now, 0));
        assert!(!is_stale(now, now, 0));
    }
}
