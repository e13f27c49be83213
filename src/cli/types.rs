//! CLI type definitions
//!
//! Every run input falls back to the `INPUT_<NAME>` variable GitHub Actions
//! sets for action inputs, so the binary can run directly as a step.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::cli::commands::code_scanning::CodeScanningArgs;
use crate::cli::commands::freshness::FreshnessArgs;
use crate::cli::commands::required_properties::RequiredPropertiesArgs;

#[derive(Parser, Debug)]
#[command(name = "policy-gate")]
#[command(
    about = "Pull request security policy gates backed by GitHub code scanning",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Tool configuration file (defaults to .policy-gate.yaml when present)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// GitHub token (falls back to GITHUB_TOKEN)
    #[arg(long, global = true, env = "INPUT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fail when open alerts at or above a severity are older than allowed
    CodeScanning(CodeScanningArgs),

    /// Fail when no recent code scanning analysis exists for the pull request
    Freshness(FreshnessArgs),

    /// Fail when the repository lacks a valid maintainers property
    RequiredProperties(RequiredPropertiesArgs),
}

/// Repository and pull request every gate is scoped to.
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Repository owner (organization or user)
    #[arg(long, env = "INPUT_ORG")]
    pub org: String,

    /// Repository name
    #[arg(long, env = "INPUT_REPO")]
    pub repo: String,

    /// Pull request number
    #[arg(long = "pull-request", env = "INPUT_PULL_REQUEST")]
    pub pull_request: u64,
}

impl Commands {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CodeScanning(_) => "code-scanning",
            Self::Freshness(_) => "freshness",
            Self::RequiredProperties(_) => "required-properties",
        }
    }
}
