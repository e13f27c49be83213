//! Code scanning alert age gate.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::domain::errors::GateResult;
use crate::domain::models::{GateOutcome, GateRun, PolicyConfig, Report, Verdict};
use crate::domain::ports::RepositoryService;
use crate::services::finding_retriever::FindingRetriever;
use crate::services::ref_resolver::RefResolver;
use crate::services::report_manager::ReportManager;

/// Fails a pull request when open alerts at or above the threshold are
/// older than the allowed age.
pub struct CodeScanningGate {
    service: Arc<dyn RepositoryService>,
    policy: PolicyConfig,
    bot_login: String,
}

impl CodeScanningGate {
    pub const NAME: &'static str = "code-scanning";

    pub fn new(
        service: Arc<dyn RepositoryService>,
        policy: PolicyConfig,
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
            threshold = %policy.threshold,
            "Retrieving code scanning alerts"
        );

        let findings = FindingRetriever::new(
            self.service.clone(),
            policy.repository.clone(),
            now,
            policy.max_age_days,
        )
        .with_dedupe(policy.dedupe)
        .retrieve(&plan, policy.severities(), None)
        .await?;

        let reports = ReportManager::new(
            self.service.clone(),
            policy.repository.clone(),
            policy.pull_request,
            &self.bot_login,
        );

        if findings.is_empty() {
            let cleared = reports.clear_reports(&policy.report_marker).await?;
            info!(repository = %policy.repository, cleared, "No alerts found");
            return Ok(GateRun {
                gate: Self::NAME,
                outcome: GateOutcome::Passed {
                    summary: format!("No alerts found for {}", policy.repository),
                },
                findings,
                report_posted: false,
            });
        }

        info!(
            repository = %policy.repository,
            count = findings.len(),
            threshold = %policy.threshold,
            "Found alerts, reporting"
        );
        let verdict = Verdict::decide(findings);
        let report = Report::findings(
            &policy.report_marker,
            &policy.message,
            &verdict.findings,
            policy.visibility,
        );
        reports
            .replace_report(&policy.report_marker, &report.render())
            .await?;

        let outcome = if verdict.passed {
            GateOutcome::Passed {
                summary: format!(
                    "Found {} alerts for {}, none older than {} days",
                    verdict.findings.len(),
                    policy.repository,
                    policy.max_age_days
                ),
            }
        } else {
            GateOutcome::Failed {
                reason: format!(
                    "Found {} code scanning policy violations for {}",
                    verdict.violations.len(),
                    policy.repository
                ),
            }
        };

        Ok(GateRun {
            gate: Self::NAME,
            outcome,
            findings: verdict.findings,
            report_posted: true,
        })
    }
}
