//! GitHub REST client for code scanning, issue comments and repository
//! properties.
//!
//! Listings follow the `Link` response header; the next page URL is handed
//! back to the caller as an opaque [`PageCursor`]. Rate-limited requests are
//! retried a bounded number of times after the delay the server asks for.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, LINK};
use reqwest::{Client, Method, Response, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::domain::errors::RemoteResult;
use crate::domain::models::{
    AlertQuery, AnalysisQuery, GitHubConfig, IssueComment, Page, PageCursor, RawAlert,
    RawAnalysis, RepoCoordinates,
};
use crate::domain::ports::RepositoryService;

use super::errors::GitHubApiError;
use super::models::{CommentRequest, RepoPropertyValue};
use super::throttle::{rate_limit_wait, ThrottlePolicy};

/// Default base URL for the GitHub REST API.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const API_VERSION: &str = "2022-11-28";

/// Connection settings for [`GitHubClient`].
#[derive(Debug, Clone)]
pub struct GitHubClientConfig {
    /// Base URL, e.g. `https://api.github.com` or `https://ghe.example.com/api/v3`.
    pub api_url: String,
    /// Personal access token or installation token.
    pub token: String,
    pub user_agent: String,
    pub timeout: Duration,
    pub throttle: ThrottlePolicy,
}

impl GitHubClientConfig {
    /// Build client settings from the loaded tool configuration.
    pub fn from_settings(settings: &GitHubConfig, token: impl Into<String>) -> Self {
        Self {
            api_url: settings.api_url.clone(),
            token: token.into(),
            user_agent: settings.user_agent.clone(),
            timeout: Duration::from_secs(settings.timeout_secs),
            throttle: ThrottlePolicy::new(
                settings.rate_limit_retries,
                Duration::from_secs(settings.max_retry_wait_secs),
            ),
        }
    }
}

/// HTTP client for the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    api_url: String,
    token: String,
    user_agent: String,
    throttle: ThrottlePolicy,
}

impl GitHubClient {
    /// Create a client against the public API with default settings.
    pub fn new(token: impl Into<String>) -> Result<Self, GitHubApiError> {
        Self::with_config(GitHubClientConfig::from_settings(
            &GitHubConfig::default(),
            token,
        ))
    }

    pub fn with_config(config: GitHubClientConfig) -> Result<Self, GitHubApiError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.token,
            user_agent: config.user_agent,
            throttle: config.throttle,
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn endpoint(&self, path: &str, params: &[(&str, String)]) -> Result<Url, GitHubApiError> {
        let raw = format!("{}/{}", self.api_url, path.trim_start_matches('/'));
        Url::parse_with_params(&raw, params)
            .map_err(|e| GitHubApiError::InvalidUrl(format!("{raw}: {e}")))
    }

    fn cursor_url(cursor: &PageCursor) -> Result<Url, GitHubApiError> {
        Url::parse(&cursor.0).map_err(|e| GitHubApiError::InvalidUrl(format!("{}: {e}", cursor.0)))
    }

    fn authorized(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .header("User-Agent", &self.user_agent)
    }

    /// Send a request, retrying after rate-limit responses while the
    /// throttle policy allows it.
    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&CommentRequest>,
    ) -> Result<Response, GitHubApiError> {
        let mut retries = 0;
        loop {
            let mut request = self.authorized(method.clone(), url.clone());
            if let Some(body) = body {
                request = request.json(body);
            }
            let response = request.send().await?;
            let status = response.status();
            if status.is_success() {
                return Ok(response);
            }

            let now = u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default();
            if let Some(wait) = rate_limit_wait(status, response.headers(), now) {
                if !self.throttle.should_retry(retries) {
                    return Err(GitHubApiError::RateLimited(format!("{method} {}", url.path())));
                }
                let wait = self.throttle.bounded(wait);
                warn!(
                    status = status.as_u16(),
                    path = url.path(),
                    wait_secs = wait.as_secs(),
                    "GitHub rate limit hit, retrying"
                );
                tokio::time::sleep(wait).await;
                retries += 1;
                continue;
            }

            let text = response.text().await.unwrap_or_default();
            return Err(GitHubApiError::from_status(status, text));
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
    ) -> Result<(T, HeaderMap), GitHubApiError> {
        debug!(url = %url, "GET");
        let response = self.send(Method::GET, url, None).await?;
        let headers = response.headers().clone();
        let bytes = response.bytes().await?;
        let value = serde_json::from_slice(&bytes)?;
        Ok((value, headers))
    }

    async fn get_page<T: DeserializeOwned>(&self, url: Url) -> Result<Page<T>, GitHubApiError> {
        let (items, headers) = self.get_json::<Vec<T>>(url).await?;
        Ok(Page {
            items,
            next: next_link(&headers).map(PageCursor),
        })
    }

    fn alerts_url(&self, query: &AlertQuery) -> Result<Url, GitHubApiError> {
        self.endpoint(
            &format!(
                "repos/{}/{}/code-scanning/alerts",
                query.repository.owner, query.repository.repo
            ),
            &[
                ("state", "open".to_string()),
                ("ref", query.git_ref.clone()),
                ("severity", query.severity.as_str().to_string()),
                ("per_page", query.page_size.to_string()),
            ],
        )
    }

    fn analyses_url(&self, query: &AnalysisQuery) -> Result<Url, GitHubApiError> {
        self.endpoint(
            &format!(
                "repos/{}/{}/code-scanning/analyses",
                query.repository.owner, query.repository.repo
            ),
            &[
                ("ref", query.git_ref.clone()),
                ("tool_name", query.tool_name.clone()),
                ("direction", "desc".to_string()),
                ("per_page", query.page_size.to_string()),
            ],
        )
    }

    fn comments_url(
        &self,
        repository: &RepoCoordinates,
        issue_number: u64,
    ) -> Result<Url, GitHubApiError> {
        self.endpoint(
            &format!(
                "repos/{}/{}/issues/{issue_number}/comments",
                repository.owner, repository.repo
            ),
            &[("per_page", "100".to_string())],
        )
    }
}

/// Extract the `rel="next"` URL from a `Link` header, if present.
pub fn next_link(headers: &HeaderMap) -> Option<String> {
    let link = headers.get(LINK)?.to_str().ok()?;
    link.split(',').find_map(|part| {
        let mut segments = part.split(';');
        let target = segments.next()?.trim();
        let is_next = segments.any(|s| s.trim() == r#"rel="next""#);
        is_next.then(|| {
            target
                .trim_start_matches('<')
                .trim_end_matches('>')
                .to_string()
        })
    })
}

#[async_trait]
impl RepositoryService for GitHubClient {
    async fn list_alerts(
        &self,
        query: &AlertQuery,
        cursor: Option<&PageCursor>,
    ) -> RemoteResult<Page<RawAlert>> {
        let url = match cursor {
            Some(cursor) => Self::cursor_url(cursor)?,
            None => self.alerts_url(query)?,
        };
        Ok(self.get_page(url).await?)
    }

    async fn list_recent_analyses(&self, query: &AnalysisQuery) -> RemoteResult<Vec<RawAnalysis>> {
        let url = self.analyses_url(query)?;
        let (analyses, _) = self.get_json::<Vec<RawAnalysis>>(url).await?;
        Ok(analyses)
    }

    async fn list_issue_comments(
        &self,
        repository: &RepoCoordinates,
        issue_number: u64,
        cursor: Option<&PageCursor>,
    ) -> RemoteResult<Page<IssueComment>> {
        let url = match cursor {
            Some(cursor) => Self::cursor_url(cursor)?,
            None => self.comments_url(repository, issue_number)?,
        };
        Ok(self.get_page(url).await?)
    }

    async fn create_comment(
        &self,
        repository: &RepoCoordinates,
        issue_number: u64,
        body: &str,
    ) -> RemoteResult<()> {
        let url = self.endpoint(
            &format!(
                "repos/{}/{}/issues/{issue_number}/comments",
                repository.owner, repository.repo
            ),
            &[],
        )?;
        let request = CommentRequest {
            body: body.to_string(),
        };
        self.send(Method::POST, url, Some(&request)).await?;
        Ok(())
    }

    async fn delete_comment(
        &self,
        repository: &RepoCoordinates,
        comment_id: u64,
    ) -> RemoteResult<()> {
        let url = self.endpoint(
            &format!(
                "repos/{}/{}/issues/comments/{comment_id}",
                repository.owner, repository.repo
            ),
            &[],
        )?;
        self.send(Method::DELETE, url, None).await?;
        Ok(())
    }

    async fn get_repo_property(
        &self,
        repository: &RepoCoordinates,
        property_name: &str,
    ) -> RemoteResult<Option<String>> {
        let url = self.endpoint(
            &format!("repos/{}/{}/properties/values", repository.owner, repository.repo),
            &[],
        )?;
        let (values, _) = self.get_json::<Vec<RepoPropertyValue>>(url).await?;
        Ok(values
            .into_iter()
            .find(|v| v.property_name == property_name)
            .and_then(|v| v.as_text()))
    }
}
