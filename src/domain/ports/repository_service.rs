use async_trait::async_trait;

use crate::domain::errors::RemoteResult;
use crate::domain::models::{
    AlertQuery, AnalysisQuery, IssueComment, Page, PageCursor, RawAlert, RawAnalysis,
    RepoCoordinates,
};

/// Port for the remote code hosting service.
///
/// Listings are page-at-a-time: callers pass back the cursor from the
/// previous page and must consume pages strictly in order. A missing ref is
/// reported as [`RemoteError::NotFound`](crate::domain::errors::RemoteError::NotFound),
/// never as an empty page.
#[async_trait]
pub trait RepositoryService: Send + Sync {
    /// List one page of open code scanning alerts.
    async fn list_alerts(
        &self,
        query: &AlertQuery,
        cursor: Option<&PageCursor>,
    ) -> RemoteResult<Page<RawAlert>>;

    /// Most recent analyses for a tool on a ref, newest first, at most
    /// `query.page_size` of them.
    async fn list_recent_analyses(&self, query: &AnalysisQuery) -> RemoteResult<Vec<RawAnalysis>>;

    /// List one page of comments on an issue or pull request.
    async fn list_issue_comments(
        &self,
        repository: &RepoCoordinates,
        issue_number: u64,
        cursor: Option<&PageCursor>,
    ) -> RemoteResult<Page<IssueComment>>;

    async fn create_comment(
        &self,
        repository: &RepoCoordinates,
        issue_number: u64,
        body: &str,
    ) -> RemoteResult<()>;

    async fn delete_comment(&self, repository: &RepoCoordinates, comment_id: u64)
        -> RemoteResult<()>;

    /// Value of a repository custom property, or `None` if it is unset.
    async fn get_repo_property(
        &self,
        repository: &RepoCoordinates,
        property_name: &str,
    ) -> RemoteResult<Option<String>>;
}
