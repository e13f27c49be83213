use serde::{Deserialize, Serialize};

use crate::domain::models::policy::RefMode;

/// Tool settings, independent of any single pull request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Remote API client configuration
    #[serde(default)]
    pub github: GitHubConfig,

    /// Gate behaviour shared across runs
    #[serde(default)]
    pub policy: PolicySettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// GitHub REST client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GitHubConfig {
    /// Base URL of the REST API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// User-Agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries allowed after a rate-limit response for the same request
    #[serde(default = "default_rate_limit_retries")]
    pub rate_limit_retries: u32,

    /// Upper bound on a single rate-limit wait, in seconds
    #[serde(default = "default_max_retry_wait_secs")]
    pub max_retry_wait_secs: u64,

    /// Login of the automation identity that authors reports
    #[serde(default = "default_bot_login")]
    pub bot_login: String,
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_user_agent() -> String {
    format!("policy-gate/{}", env!("CARGO_PKG_VERSION"))
}

const fn default_timeout_secs() -> u64 {
    30
}

const fn default_rate_limit_retries() -> u32 {
    1
}

const fn default_max_retry_wait_secs() -> u64 {
    300
}

fn default_bot_login() -> String {
    "github-actions[bot]".to_string()
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            rate_limit_retries: default_rate_limit_retries(),
            max_retry_wait_secs: default_max_retry_wait_secs(),
            bot_login: default_bot_login(),
        }
    }
}

/// Report markers and ref resolution defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PolicySettings {
    /// Ref mode for the code scanning alert gate
    #[serde(default)]
    pub code_scanning_ref_mode: RefMode,

    /// Ref mode for the analysis freshness gate
    #[serde(default = "default_freshness_ref_mode")]
    pub freshness_ref_mode: RefMode,

    /// Drop findings already seen on an earlier ref
    #[serde(default)]
    pub dedupe: bool,

    #[serde(default = "default_code_scanning_marker")]
    pub code_scanning_marker: String,

    #[serde(default = "default_freshness_marker")]
    pub freshness_marker: String,

    #[serde(default = "default_required_property_marker")]
    pub required_property_marker: String,
}

const fn default_freshness_ref_mode() -> RefMode {
    RefMode::Fallback
}

fn default_code_scanning_marker() -> String {
    "Code Scanning Policy Findings".to_string()
}

fn default_freshness_marker() -> String {
    "Code Scanning Analysis Policy".to_string()
}

fn default_required_property_marker() -> String {
    "Policy: Required Security Maintainers".to_string()
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            code_scanning_ref_mode: RefMode::default(),
            freshness_ref_mode: default_freshness_ref_mode(),
            dedupe: false,
            code_scanning_marker: default_code_scanning_marker(),
            freshness_marker: default_freshness_marker(),
            required_property_marker: default_required_property_marker(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for a JSON log file in addition to stderr
    #[serde(default)]
    pub log_dir: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
        }
    }
}
