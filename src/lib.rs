//! Policy Gate - pull request security policy checks
//!
//! Decides whether a pull request may merge based on GitHub code scanning
//! data, and keeps a single up-to-date report comment on the pull request.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Severities, policies, findings, verdicts and the remote port
//! - **Service Layer** (`services`): Ref resolution, retrieval, report lifecycle and the gates
//! - **Adapters** (`adapters`): GitHub REST client and an in-memory service
//! - **Infrastructure Layer** (`infrastructure`): Configuration loading and logging
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use policy_gate::adapters::GitHubClient;
//! use policy_gate::services::CodeScanningGate;
//!
//! # async fn run(
//! #     policy: policy_gate::domain::models::PolicyConfig,
//! #     token: String,
//! # ) -> anyhow::Result<()> {
//! let client = Arc::new(GitHubClient::new(token)?);
//! let run = CodeScanningGate::new(client, policy, "github-actions[bot]")
//!     .run(chrono::Utc::now())
//!     .await?;
//! println!("{}", run.outcome.message());
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{GateError, GateResult, RemoteError, RemoteResult};
pub use domain::models::{
    Config, Finding, GateOutcome, GateRun, PolicyConfig, RefMode, Severity, Verdict,
};
pub use domain::ports::RepositoryService;
pub use services::{CodeScanningGate, FreshnessGate, RequiredPropertyGate};
