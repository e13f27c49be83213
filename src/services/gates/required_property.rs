//! Required repository property gate.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::errors::{GateError, GateResult};
use crate::domain::models::{GateOutcome, GateRun, PropertyPolicy, Report};
use crate::domain::ports::RepositoryService;
use crate::services::report_manager::ReportManager;

/// Check a maintainers property value. Returns the failure reason, if any.
///
/// The value is a comma separated list; at least one entry must look like
/// an email address.
pub fn check_maintainers(property_name: &str, value: Option<&str>) -> Option<String> {
    let Some(value) = value else {
        return Some(format!("Property '{property_name}' not found"));
    };
    let entries: Vec<&str> = value
        .split(',')
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .collect();
    if entries.iter().any(|e| e.contains('@')) {
        None
    } else {
        Some(format!(
            "Property '{property_name}' is empty or does not contain any valid email addresses"
        ))
    }
}

/// Fails a pull request when the repository lacks a usable maintainers
/// property. Earlier reports are always cleared first, so a fixed
/// repository ends up with no report at all.
pub struct RequiredPropertyGate {
    service: Arc<dyn RepositoryService>,
    policy: PropertyPolicy,
    bot_login: String,
}

impl RequiredPropertyGate {
    pub const NAME: &'static str = "required-properties";

    pub fn new(
        service: Arc<dyn RepositoryService>,
        policy: PropertyPolicy,
        bot_login: impl Into<String>,
    ) -> Self {
        Self {
            service,
            policy,
            bot_login: bot_login.into(),
        }
    }

    pub async fn run(&self) -> GateResult<GateRun> {
        let policy = &self.policy;
        let reports = ReportManager::new(
            self.service.clone(),
            policy.repository.clone(),
            policy.pull_request,
            &self.bot_login,
        );
        reports.clear_reports(&policy.report_marker).await?;

        info!(
            repository = %policy.repository,
            property = %policy.property_name,
            "Checking required property"
        );
        let value = self
            .service
            .get_repo_property(&policy.repository, &policy.property_name)
            .await
            .map_err(|source| GateError::Retrieval {
                what: format!("property '{}'", policy.property_name),
                source,
            })?;

        match check_maintainers(&policy.property_name, value.as_deref()) {
            None => Ok(GateRun {
                gate: Self::NAME,
                outcome: GateOutcome::Passed {
                    summary: format!("Property '{}' found", policy.property_name),
                },
                findings: Vec::new(),
                report_posted: false,
            }),
            Some(reason) => {
                warn!(
                    repository = %policy.repository,
                    reason = %reason,
                    "Required property check failed"
                );
                let report = Report::notice(&policy.report_marker, &policy.message);
                reports.post_report(&report.render()).await?;
                Ok(GateRun {
                    gate: Self::NAME,
                    outcome: GateOutcome::Failed { reason },
                    findings: Vec::new(),
                    report_posted: true,
                })
            }
        }
    }
}
