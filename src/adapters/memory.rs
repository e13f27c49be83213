//! In-memory repository service for tests and dry runs.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::errors::{RemoteError, RemoteResult};
use crate::domain::models::{
    AlertQuery, AnalysisQuery, CommentAuthor, IssueComment, Page, PageCursor, RawAlert,
    RawAnalysis, RepoCoordinates, Severity,
};
use crate::domain::ports::RepositoryService;

#[derive(Debug, Default)]
struct State {
    alerts: HashMap<(String, Severity), Vec<RawAlert>>,
    analyses: HashMap<String, Vec<RawAnalysis>>,
    missing_refs: HashSet<String>,
    failing_refs: HashMap<String, String>,
    page_size: Option<usize>,
    comments: Vec<(u64, IssueComment)>,
    next_comment_id: u64,
    undeletable: HashSet<u64>,
    fail_creates: bool,
    properties: HashMap<String, String>,
    calls: Vec<String>,
}

/// Repository service backed by in-process maps.
///
/// Refs registered as missing answer every query with
/// [`RemoteError::NotFound`]; unknown refs simply have no data. Every call
/// is recorded so tests can assert on probe order.
#[derive(Debug, Default)]
pub struct InMemoryRepositoryService {
    state: Mutex<State>,
}

impl InMemoryRepositoryService {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Open alerts of one severity on a ref, in listing order.
    pub fn with_alerts(self, git_ref: &str, severity: Severity, alerts: Vec<RawAlert>) -> Self {
        self.lock()
            .alerts
            .entry((git_ref.to_string(), severity))
            .or_default()
            .extend(alerts);
        self
    }

    /// Analyses on a ref, newest first.
    pub fn with_analyses(self, git_ref: &str, analyses: Vec<RawAnalysis>) -> Self {
        self.lock()
            .analyses
            .entry(git_ref.to_string())
            .or_default()
            .extend(analyses);
        self
    }

    pub fn with_missing_ref(self, git_ref: &str) -> Self {
        self.lock().missing_refs.insert(git_ref.to_string());
        self
    }

    /// Make every query against `git_ref` fail with a request error.
    pub fn with_failing_ref(self, git_ref: &str, message: &str) -> Self {
        self.lock()
            .failing_refs
            .insert(git_ref.to_string(), message.to_string());
        self
    }

    /// Cap page sizes below what callers ask for, to force pagination.
    pub fn with_page_size(self, page_size: usize) -> Self {
        self.lock().page_size = Some(page_size.max(1));
        self
    }

    pub fn with_property(self, name: &str, value: &str) -> Self {
        self.lock()
            .properties
            .insert(name.to_string(), value.to_string());
        self
    }

    /// Reject every comment creation.
    pub fn with_failing_creates(self) -> Self {
        self.lock().fail_creates = true;
        self
    }

    /// Seed a comment and return its id.
    pub fn add_comment(&self, issue_number: u64, author: &str, body: &str) -> u64 {
        let mut state = self.lock();
        state.next_comment_id += 1;
        let id = state.next_comment_id;
        state.comments.push((
            issue_number,
            IssueComment {
                id,
                user: Some(CommentAuthor {
                    login: author.to_string(),
                }),
                body: Some(body.to_string()),
            },
        ));
        id
    }

    /// Make deletion of a specific comment fail.
    pub fn protect_comment(&self, comment_id: u64) {
        self.lock().undeletable.insert(comment_id);
    }

    /// Live comments on an issue, oldest first.
    pub fn comments(&self, issue_number: u64) -> Vec<IssueComment> {
        self.lock()
            .comments
            .iter()
            .filter(|(issue, _)| *issue == issue_number)
            .map(|(_, comment)| comment.clone())
            .collect()
    }

    /// Every call made so far, formatted as `operation target`.
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }
}

fn check_ref(state: &State, git_ref: &str) -> RemoteResult<()> {
    if state.missing_refs.contains(git_ref) {
        return Err(RemoteError::NotFound(format!("no analysis found for ref {git_ref}")));
    }
    if let Some(message) = state.failing_refs.get(git_ref) {
        return Err(RemoteError::Request(message.clone()));
    }
    Ok(())
}

fn paginate<T: Clone>(
    items: &[T],
    requested: u32,
    cap: Option<usize>,
    cursor: Option<&PageCursor>,
) -> RemoteResult<Page<T>> {
    let size = cap.map_or(requested as usize, |c| c.min(requested as usize)).max(1);
    let start = match cursor {
        Some(PageCursor(raw)) => raw
            .parse::<usize>()
            .map_err(|_| RemoteError::Malformed(format!("bad cursor '{raw}'")))?,
        None => 0,
    };
    let end = (start + size).min(items.len());
    let page = items.get(start..end).unwrap_or_default().to_vec();
    let next = (end < items.len()).then(|| PageCursor(end.to_string()));
    Ok(Page { items: page, next })
}

#[async_trait]
impl RepositoryService for InMemoryRepositoryService {
    async fn list_alerts(
        &self,
        query: &AlertQuery,
        cursor: Option<&PageCursor>,
    ) -> RemoteResult<Page<RawAlert>> {
        let mut state = self.lock();
        state
            .calls
            .push(format!("list_alerts {} {}", query.git_ref, query.severity));
        check_ref(&state, &query.git_ref)?;
        let alerts = state
            .alerts
            .get(&(query.git_ref.clone(), query.severity))
            .cloned()
            .unwrap_or_default();
        paginate(&alerts, query.page_size, state.page_size, cursor)
    }

    async fn list_recent_analyses(&self, query: &AnalysisQuery) -> RemoteResult<Vec<RawAnalysis>> {
        let mut state = self.lock();
        state
            .calls
            .push(format!("list_recent_analyses {}", query.git_ref));
        check_ref(&state, &query.git_ref)?;
        Ok(state
            .analyses
            .get(&query.git_ref)
            .map(|all| all.iter().take(query.page_size as usize).cloned().collect())
            .unwrap_or_default())
    }

    async fn list_issue_comments(
        &self,
        _repository: &RepoCoordinates,
        issue_number: u64,
        cursor: Option<&PageCursor>,
    ) -> RemoteResult<Page<IssueComment>> {
        let mut state = self.lock();
        state
            .calls
            .push(format!("list_issue_comments {issue_number}"));
        let comments: Vec<IssueComment> = state
            .comments
            .iter()
            .filter(|(issue, _)| *issue == issue_number)
            .map(|(_, comment)| comment.clone())
            .collect();
        paginate(&comments, 100, state.page_size, cursor)
    }

    async fn create_comment(
        &self,
        _repository: &RepoCoordinates,
        issue_number: u64,
        body: &str,
    ) -> RemoteResult<()> {
        let fail = {
            let mut state = self.lock();
            state.calls.push(format!("create_comment {issue_number}"));
            state.fail_creates
        };
        if fail {
            return Err(RemoteError::Unauthorized(
                "Resource not accessible by integration".to_string(),
            ));
        }
        self.add_comment(issue_number, "github-actions[bot]", body);
        Ok(())
    }

    async fn delete_comment(
        &self,
        _repository: &RepoCoordinates,
        comment_id: u64,
    ) -> RemoteResult<()> {
        let mut state = self.lock();
        state.calls.push(format!("delete_comment {comment_id}"));
        if state.undeletable.contains(&comment_id) {
            return Err(RemoteError::Unauthorized(format!(
                "comment {comment_id} cannot be deleted"
            )));
        }
        let before = state.comments.len();
        state.comments.retain(|(_, c)| c.id != comment_id);
        if state.comments.len() == before {
            return Err(RemoteError::NotFound(format!("comment {comment_id}")));
        }
        Ok(())
    }

    async fn get_repo_property(
        &self,
        _repository: &RepoCoordinates,
        property_name: &str,
    ) -> RemoteResult<Option<String>> {
        let mut state = self.lock();
        state
            .calls
            .push(format!("get_repo_property {property_name}"));
        Ok(state.properties.get(property_name).cloned())
    }
}
