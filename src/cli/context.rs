//! Per-invocation wiring: configuration, logging and the GitHub client.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::adapters::github::{GitHubClient, GitHubClientConfig};
use crate::cli::types::Cli;
use crate::domain::models::Config;
use crate::domain::ports::RepositoryService;
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::logging::{LogConfig, LoggerImpl};

/// Everything a command handler needs for one run.
pub struct AppContext {
    pub config: Config,
    pub service: Arc<dyn RepositoryService>,
    _logger: Option<LoggerImpl>,
}

impl AppContext {
    /// Load configuration, start logging and build the GitHub client.
    pub fn init(cli: &Cli) -> Result<Self> {
        let config = ConfigLoader::load(cli.config.as_deref())?;
        let logger = LoggerImpl::init(&LogConfig::from(&config.logging))
            .context("Failed to initialize logging")?;

        let token = resolve_token(cli.token.as_deref())?;
        let client = GitHubClient::with_config(GitHubClientConfig::from_settings(
            &config.github,
            token,
        ))
        .context("Failed to build GitHub client")?;

        tracing::debug!(api_url = client.api_url(), "GitHub client ready");

        Ok(Self {
            config,
            service: Arc::new(client),
            _logger: Some(logger),
        })
    }

    /// Context over an already built service, without touching the global
    /// subscriber.
    pub fn with_service(config: Config, service: Arc<dyn RepositoryService>) -> Self {
        Self {
            config,
            service,
            _logger: None,
        }
    }
}

/// Explicit token first, then `GITHUB_TOKEN`.
pub fn resolve_token(explicit: Option<&str>) -> Result<String> {
    explicit
        .map(str::to_string)
        .or_else(|| std::env::var("GITHUB_TOKEN").ok())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .context("A GitHub token is required (--token, INPUT_TOKEN or GITHUB_TOKEN)")
}
