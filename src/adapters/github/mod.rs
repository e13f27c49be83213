//! GitHub REST adapter for the [`RepositoryService`](crate::domain::ports::RepositoryService) port.

pub mod client;
pub mod errors;
pub mod models;
pub mod throttle;

pub use client::{next_link, GitHubClient, GitHubClientConfig, DEFAULT_API_URL};
pub use errors::GitHubApiError;
pub use throttle::ThrottlePolicy;
