//! Finding retrieval.
//!
//! Walks a [`RefPlan`], paginating alert listings for each severity and
//! classifying every alert by age. Listing failures are never swallowed.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::domain::errors::{GateError, GateResult};
use crate::domain::models::{
    AlertQuery, AnalysisQuery, Finding, PageCursor, RawAlert, RawAnalysis, RefPlan,
    RepoCoordinates, Severity,
};
use crate::domain::ports::RepositoryService;

/// Page size for alert listings.
pub const ALERT_PAGE_SIZE: u32 = 100;

/// Retrieves and classifies findings for one repository.
#[derive(Clone)]
pub struct FindingRetriever {
    service: Arc<dyn RepositoryService>,
    repository: RepoCoordinates,
    now: DateTime<Utc>,
    max_age_days: i64,
    dedupe: bool,
}

impl FindingRetriever {
    /// `now` is captured once per run so every finding is aged against the
    /// same instant.
    pub fn new(
        service: Arc<dyn RepositoryService>,
        repository: RepoCoordinates,
        now: DateTime<Utc>,
        max_age_days: i64,
    ) -> Self {
        Self {
            service,
            repository,
            now,
            max_age_days,
            dedupe: false,
        }
    }

    /// Drop findings whose id was already seen on an earlier ref or severity.
    #[must_use]
    pub const fn with_dedupe(mut self, dedupe: bool) -> Self {
        self.dedupe = dedupe;
        self
    }

    /// Retrieve findings for every severity across the plan.
    ///
    /// For [`RefPlan::All`] severities are the outer loop and refs the inner
    /// loop. For [`RefPlan::Chain`] each ref is tried with all severities
    /// before moving on. Alerts created before `created_since` are skipped.
    pub async fn retrieve(
        &self,
        plan: &RefPlan,
        severities: &[Severity],
        created_since: Option<DateTime<Utc>>,
    ) -> GateResult<Vec<Finding>> {
        let alerts = match plan {
            RefPlan::All { refs } => {
                let mut alerts = Vec::new();
                for severity in severities {
                    for git_ref in refs {
                        alerts.extend(self.list_all_alerts(git_ref, *severity).await?);
                    }
                }
                alerts
            }
            RefPlan::Chain { links, on_missing } => {
                probe_chain(links, on_missing.as_deref(), |git_ref| {
                    self.alerts_on_ref(git_ref, severities)
                })
                .await?
            }
        };

        let mut seen = HashSet::new();
        let findings: Vec<Finding> = alerts
            .iter()
            .filter(|alert| created_since.is_none_or(|since| alert.created_at >= since))
            .filter(|alert| !self.dedupe || seen.insert(alert.number))
            .map(|alert| Finding::classify(alert, self.now, self.max_age_days))
            .collect();

        info!(
            repository = %self.repository,
            count = findings.len(),
            violations = findings.iter().filter(|f| f.exceeds_threshold).count(),
            "Retrieved code scanning findings"
        );
        Ok(findings)
    }

    /// Most recent analysis for `tool_name` across the plan.
    ///
    /// Each ref is asked for a single analysis. With [`RefPlan::All`] the
    /// newest answer wins; with [`RefPlan::Chain`] the first ref that has
    /// any analysis wins.
    pub async fn most_recent_analysis(
        &self,
        plan: &RefPlan,
        tool_name: &str,
    ) -> GateResult<Option<RawAnalysis>> {
        let analyses = match plan {
            RefPlan::All { refs } => {
                let mut analyses = Vec::new();
                for git_ref in refs {
                    analyses.extend(self.recent_analyses(git_ref.clone(), tool_name).await?);
                }
                analyses
            }
            RefPlan::Chain { links, on_missing } => {
                probe_chain(links, on_missing.as_deref(), |git_ref| {
                    self.recent_analyses(git_ref, tool_name)
                })
                .await?
            }
        };

        Ok(analyses.into_iter().max_by_key(|a| a.created_at))
    }

    async fn alerts_on_ref(
        &self,
        git_ref: String,
        severities: &[Severity],
    ) -> GateResult<Vec<RawAlert>> {
        let mut alerts = Vec::new();
        for severity in severities {
            alerts.extend(self.list_all_alerts(&git_ref, *severity).await?);
        }
        Ok(alerts)
    }

    async fn list_all_alerts(
        &self,
        git_ref: &str,
        severity: Severity,
    ) -> GateResult<Vec<RawAlert>> {
        debug!(git_ref, %severity, "Retrieving code scanning alerts");
        let query = AlertQuery {
            repository: self.repository.clone(),
            git_ref: git_ref.to_string(),
            severity,
            page_size: ALERT_PAGE_SIZE,
        };

        let mut alerts = Vec::new();
        let mut cursor: Option<PageCursor> = None;
        loop {
            let page = self
                .service
                .list_alerts(&query, cursor.as_ref())
                .await
                .map_err(|e| GateError::retrieval("code scanning alerts", git_ref, e))?;
            alerts.extend(page.items);
            match page.next {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        Ok(alerts)
    }

    async fn recent_analyses(
        &self,
        git_ref: String,
        tool_name: &str,
    ) -> GateResult<Vec<RawAnalysis>> {
        debug!(git_ref = %git_ref, tool_name, "Retrieving most recent analysis");
        let query = AnalysisQuery {
            repository: self.repository.clone(),
            git_ref,
            tool_name: tool_name.to_string(),
            page_size: 1,
        };
        self.service
            .list_recent_analyses(&query)
            .await
            .map_err(|e| GateError::retrieval("most recent analysis", &query.git_ref, e))
    }
}

/// Try each link in order and return the first non-empty answer.
///
/// A missing ref moves on to the next link; any other failure aborts.
/// `on_missing` is only consulted when the first link did not exist. If no
/// probed ref existed at all, the last `NotFound` is returned.
async fn probe_chain<T, F, Fut>(
    links: &[String],
    on_missing: Option<&str>,
    mut probe: F,
) -> GateResult<Vec<T>>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = GateResult<Vec<T>>>,
{
    let mut last_missing = None;
    let mut any_existed = false;
    let mut first_missing = false;

    let fallback = on_missing.map(str::to_string);
    for (index, git_ref) in links.iter().enumerate() {
        match probe(git_ref.clone()).await {
            Ok(items) if !items.is_empty() => {
                info!(git_ref = %git_ref, count = items.len(), "Resolved ref with results");
                return Ok(items);
            }
            Ok(_) => {
                any_existed = true;
                debug!(git_ref = %git_ref, "Ref has no results, trying next");
            }
            Err(err @ GateError::NotFound { .. }) => {
                warn!(git_ref = %git_ref, "Ref not found, trying next");
                first_missing |= index == 0;
                last_missing = Some(err);
            }
            Err(err) => return Err(err),
        }
    }

    if first_missing {
        if let Some(git_ref) = fallback {
            info!(git_ref = %git_ref, "Falling back to default branch");
            match probe(git_ref).await {
                Ok(items) => return Ok(items),
                Err(err @ GateError::NotFound { .. }) => last_missing = Some(err),
                Err(err) => return Err(err),
            }
        }
    }

    match last_missing {
        Some(err) if !any_existed => Err(err),
        _ => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryRepositoryService;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    fn alert(number: u64, age_days: i64) -> RawAlert {
        RawAlert {
            number,
            html_url: format!("https://github.com/o/r/security/code-scanning/{number}"),
            created_at: now() - Duration::days(age_days),
        }
    }

    fn analysis(id: u64, git_ref: &str, age_days: i64) -> RawAnalysis {
        RawAnalysis {
            id,
            git_ref: git_ref.to_string(),
            created_at: now() - Duration::days(age_days),
            url: String::new(),
        }
    }

    fn retriever(
        service: InMemoryRepositoryService,
    ) -> (Arc<InMemoryRepositoryService>, FindingRetriever) {
        let service = Arc::new(service);
        let retriever =
            FindingRetriever::new(service.clone(), RepoCoordinates::new("o", "r"), now(), 30);
        (service, retriever)
    }

    fn chain() -> RefPlan {
        RefPlan::Chain {
            links: vec!["refs/pull/5/merge".to_string(), "refs/pull/5/head".to_string()],
            on_missing: Some("main".to_string()),
        }
    }

    fn ids(findings: &[Finding]) -> Vec<u64> {
        findings.iter().map(|f| f.id).collect()
    }

    #[tokio::test]
    async fn test_all_plan_orders_severity_then_ref() {
        let (service, retriever) = retriever(
            InMemoryRepositoryService::new()
                .with_alerts("head", Severity::Critical, vec![alert(1, 1)])
                .with_alerts("merge", Severity::Critical, vec![alert(2, 1)])
                .with_alerts("head", Severity::High, vec![alert(3, 1)])
                .with_alerts("merge", Severity::High, vec![alert(4, 1)]),
        );
        let plan = RefPlan::All {
            refs: vec!["head".to_string(), "merge".to_string()],
        };

        let findings = retriever
            .retrieve(&plan, &[Severity::Critical, Severity::High], None)
            .await
            .unwrap();

        assert_eq!(ids(&findings), vec![1, 2, 3, 4]);
        assert_eq!(
            service.calls(),
            vec![
                "list_alerts head critical",
                "list_alerts merge critical",
                "list_alerts head high",
                "list_alerts merge high",
            ]
        );
    }

    #[tokio::test]
    async fn test_pagination_preserves_order() {
        let (_, retriever) = retriever(
            InMemoryRepositoryService::new()
                .with_alerts("main", Severity::High, (1..=5).map(|n| alert(n, 1)).collect())
                .with_page_size(2),
        );
        let plan = RefPlan::All {
            refs: vec!["main".to_string()],
        };
        let findings = retriever.retrieve(&plan, &[Severity::High], None).await.unwrap();
        assert_eq!(ids(&findings), vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_classification_boundary() {
        let (_, retriever) = retriever(InMemoryRepositoryService::new().with_alerts(
            "main",
            Severity::High,
            vec![alert(1, 30), alert(2, 31)],
        ));
        let plan = RefPlan::All {
            refs: vec!["main".to_string()],
        };
        let findings = retriever.retrieve(&plan, &[Severity::High], None).await.unwrap();
        assert!(!findings[0].exceeds_threshold);
        assert!(findings[1].exceeds_threshold);
    }

    #[tokio::test]
    async fn test_duplicates_kept_unless_dedupe_enabled() {
        let service = InMemoryRepositoryService::new()
            .with_alerts("head", Severity::High, vec![alert(7, 1)])
            .with_alerts("merge", Severity::High, vec![alert(7, 1), alert(8, 1)]);
        let (_, retriever) = retriever(service);
        let plan = RefPlan::All {
            refs: vec!["head".to_string(), "merge".to_string()],
        };

        let kept = retriever.retrieve(&plan, &[Severity::High], None).await.unwrap();
        assert_eq!(ids(&kept), vec![7, 7, 8]);

        let deduped = retriever
            .clone()
            .with_dedupe(true)
            .retrieve(&plan, &[Severity::High], None)
            .await
            .unwrap();
        assert_eq!(ids(&deduped), vec![7, 8]);
    }

    #[tokio::test]
    async fn test_created_since_filters_old_alerts() {
        let (_, retriever) = retriever(InMemoryRepositoryService::new().with_alerts(
            "main",
            Severity::High,
            vec![alert(1, 90), alert(2, 5)],
        ));
        let plan = RefPlan::All {
            refs: vec!["main".to_string()],
        };
        let findings = retriever
            .retrieve(&plan, &[Severity::High], Some(now() - Duration::days(10)))
            .await
            .unwrap();
        assert_eq!(ids(&findings), vec![2]);
    }

    #[tokio::test]
    async fn test_all_plan_not_found_is_fatal() {
        let (_, retriever) = retriever(
            InMemoryRepositoryService::new().with_missing_ref("refs/pull/5/merge"),
        );
        let plan = RefPlan::All {
            refs: vec!["refs/pull/5/merge".to_string()],
        };
        let err = retriever.retrieve(&plan, &[Severity::High], None).await.unwrap_err();
        assert!(matches!(err, GateError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_request_failure_is_retrieval_error() {
        let (_, retriever) = retriever(
            InMemoryRepositoryService::new().with_failing_ref("main", "500 Internal Server Error"),
        );
        let plan = RefPlan::All {
            refs: vec!["main".to_string()],
        };
        let err = retriever.retrieve(&plan, &[Severity::High], None).await.unwrap_err();
        assert!(matches!(err, GateError::Retrieval { .. }));
    }

    #[tokio::test]
    async fn test_chain_stops_at_first_ref_with_results() {
        let (service, retriever) = retriever(
            InMemoryRepositoryService::new()
                .with_alerts("refs/pull/5/merge", Severity::High, vec![alert(1, 1)])
                .with_alerts("refs/pull/5/head", Severity::High, vec![alert(2, 1)]),
        );
        let findings = retriever.retrieve(&chain(), &[Severity::High], None).await.unwrap();
        assert_eq!(ids(&findings), vec![1]);
        assert!(!service.calls().iter().any(|c| c.contains("head")));
    }

    #[tokio::test]
    async fn test_chain_empty_merge_moves_to_head_without_default() {
        let (service, retriever) = retriever(
            InMemoryRepositoryService::new()
                .with_alerts("main", Severity::High, vec![alert(9, 1)]),
        );
        let findings = retriever.retrieve(&chain(), &[Severity::High], None).await.unwrap();
        assert!(findings.is_empty());
        assert!(!service.calls().iter().any(|c| c.contains("main")));
    }

    #[tokio::test]
    async fn test_chain_missing_merge_returns_head_findings() {
        let (_, retriever) = retriever(
            InMemoryRepositoryService::new()
                .with_missing_ref("refs/pull/5/merge")
                .with_alerts("refs/pull/5/head", Severity::High, vec![alert(3, 45)]),
        );
        let findings = retriever.retrieve(&chain(), &[Severity::High], None).await.unwrap();
        assert_eq!(ids(&findings), vec![3]);
        assert!(findings[0].exceeds_threshold);
    }

    #[tokio::test]
    async fn test_chain_missing_merge_and_empty_head_uses_default() {
        let (_, retriever) = retriever(
            InMemoryRepositoryService::new()
                .with_missing_ref("refs/pull/5/merge")
                .with_alerts("main", Severity::High, vec![alert(4, 2)]),
        );
        let findings = retriever.retrieve(&chain(), &[Severity::High], None).await.unwrap();
        assert_eq!(ids(&findings), vec![4]);
    }

    #[tokio::test]
    async fn test_chain_every_ref_missing_is_fatal() {
        let (_, retriever) = retriever(
            InMemoryRepositoryService::new()
                .with_missing_ref("refs/pull/5/merge")
                .with_missing_ref("refs/pull/5/head")
                .with_missing_ref("main"),
        );
        let err = retriever.retrieve(&chain(), &[Severity::High], None).await.unwrap_err();
        assert!(matches!(err, GateError::NotFound { ref git_ref, .. } if git_ref == "main"));
    }

    #[tokio::test]
    async fn test_chain_other_failure_aborts_immediately() {
        let (service, retriever) = retriever(
            InMemoryRepositoryService::new().with_failing_ref("refs/pull/5/merge", "bad gateway"),
        );
        let err = retriever.retrieve(&chain(), &[Severity::High], None).await.unwrap_err();
        assert!(matches!(err, GateError::Retrieval { .. }));
        assert_eq!(service.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_most_recent_analysis_chain_falls_back() {
        let (_, retriever) = retriever(
            InMemoryRepositoryService::new()
                .with_missing_ref("refs/pull/5/merge")
                .with_analyses("main", vec![analysis(11, "main", 2)]),
        );
        let analysis = retriever
            .most_recent_analysis(&chain(), "CodeQL")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(analysis.id, 11);
    }

    #[tokio::test]
    async fn test_most_recent_analysis_none_when_no_data() {
        let (_, retriever) = retriever(InMemoryRepositoryService::new());
        let plan = RefPlan::All {
            refs: vec!["main".to_string()],
        };
        let result = retriever.most_recent_analysis(&plan, "CodeQL").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_most_recent_analysis_all_plan_picks_newest() {
        let (_, retriever) = retriever(
            InMemoryRepositoryService::new()
                .with_analyses("head", vec![analysis(1, "head", 9)])
                .with_analyses("merge", vec![analysis(2, "merge", 3)]),
        );
        let plan = RefPlan::All {
            refs: vec!["head".to_string(), "merge".to_string()],
        };
        let newest = retriever
            .most_recent_analysis(&plan, "CodeQL")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(newest.id, 2);
    }
}
