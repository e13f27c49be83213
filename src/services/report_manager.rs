//! Report lifecycle on the pull request conversation.
//!
//! Every gate owns at most one live report per pull request. Replacing a
//! report deletes all earlier comments from the automation identity that
//! carry the gate's marker, then posts the new body.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::errors::{GateError, GateResult};
use crate::domain::models::{IssueComment, PageCursor, RepoCoordinates};
use crate::domain::ports::RepositoryService;

/// Finds, clears and posts gate reports on one pull request.
#[derive(Clone)]
pub struct ReportManager {
    service: Arc<dyn RepositoryService>,
    repository: RepoCoordinates,
    pull_request: u64,
    bot_login: String,
}

impl ReportManager {
    pub fn new(
        service: Arc<dyn RepositoryService>,
        repository: RepoCoordinates,
        pull_request: u64,
        bot_login: impl Into<String>,
    ) -> Self {
        Self {
            service,
            repository,
            pull_request,
            bot_login: bot_login.into(),
        }
    }

    /// Comments authored by the automation identity whose body contains
    /// `marker`, in listing order.
    pub async fn find_reports(&self, marker: &str) -> GateResult<Vec<IssueComment>> {
        let mut reports = Vec::new();
        let mut cursor: Option<PageCursor> = None;
        loop {
            let page = self
                .service
                .list_issue_comments(&self.repository, self.pull_request, cursor.as_ref())
                .await
                .map_err(|source| GateError::Report {
                    action: "list",
                    source,
                })?;
            reports.extend(page.items.into_iter().filter(|c| {
                c.author() == Some(self.bot_login.as_str()) && c.body().contains(marker)
            }));
            match page.next {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        Ok(reports)
    }

    /// Delete every earlier report for `marker`. Individual deletion
    /// failures are logged and skipped. Returns how many were deleted.
    pub async fn clear_reports(&self, marker: &str) -> GateResult<usize> {
        let reports = self.find_reports(marker).await?;
        let mut deleted = 0;
        for comment in &reports {
            info!(
                repository = %self.repository,
                pr = self.pull_request,
                comment_id = comment.id,
                "Deleting previous report"
            );
            match self.service.delete_comment(&self.repository, comment.id).await {
                Ok(()) => deleted += 1,
                Err(err) => warn!(
                    comment_id = comment.id,
                    error = %err,
                    "Failed to delete previous report, continuing"
                ),
            }
        }
        Ok(deleted)
    }

    /// Post a report body. Failure is fatal.
    pub async fn post_report(&self, body: &str) -> GateResult<()> {
        info!(
            repository = %self.repository,
            pr = self.pull_request,
            "Creating report comment"
        );
        self.service
            .create_comment(&self.repository, self.pull_request, body)
            .await
            .map_err(|source| GateError::Report {
                action: "create",
                source,
            })
    }

    /// Clear earlier reports for `marker` and post `body` in their place.
    pub async fn replace_report(&self, marker: &str, body: &str) -> GateResult<()> {
        self.clear_reports(marker).await?;
        self.post_report(body).await
    }
}
