use std::path::Path;

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Project config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = ".policy-gate.yaml";

/// Prefix for environment overrides, e.g. `POLICY_GATE_GITHUB__TIMEOUT_SECS`.
pub const ENV_PREFIX: &str = "POLICY_GATE_";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    MissingFile(String),

    #[error("GitHub api_url cannot be empty")]
    EmptyApiUrl,

    #[error("GitHub bot_login cannot be empty")]
    EmptyBotLogin,

    #[error("Invalid timeout_secs: {0}. Must be at least 1")]
    InvalidTimeout(u64),

    #[error("Invalid rate_limit_retries: {0}. Must be at most 5")]
    InvalidRetries(u32),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Report marker '{0}' cannot be empty")]
    EmptyMarker(&'static str),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. `path` if given, otherwise `.policy-gate.yaml` when it exists
    /// 3. Environment variables (`POLICY_GATE_*`, `__` separates sections)
    /// 4. `API_URL`, as set by GitHub Actions runners
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let file = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::MissingFile(path.display().to_string()).into());
                }
                path.to_path_buf()
            }
            None => Path::new(DEFAULT_CONFIG_FILE).to_path_buf(),
        };

        let mut config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(&file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context(format!("Failed to load config from {}", file.display()))?;

        if let Ok(api_url) = std::env::var("API_URL") {
            if !api_url.trim().is_empty() {
                config.github.api_url = api_url;
            }
        }

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.github.api_url.trim().is_empty() {
            return Err(ConfigError::EmptyApiUrl);
        }
        if config.github.bot_login.trim().is_empty() {
            return Err(ConfigError::EmptyBotLogin);
        }
        if config.github.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(config.github.timeout_secs));
        }
        if config.github.rate_limit_retries > 5 {
            return Err(ConfigError::InvalidRetries(config.github.rate_limit_retries));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let markers = [
            ("code_scanning_marker", &config.policy.code_scanning_marker),
            ("freshness_marker", &config.policy.freshness_marker),
            ("required_property_marker", &config.policy.required_property_marker),
        ];
        for (name, marker) in markers {
            if marker.trim().is_empty() {
                return Err(ConfigError::EmptyMarker(name));
            }
        }

        Ok(())
    }
}
