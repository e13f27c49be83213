//! Implementation of the `policy-gate freshness` command.

use anyhow::Result;
use chrono::Utc;
use clap::Args;

use crate::cli::context::AppContext;
use crate::cli::types::TargetArgs;
use crate::domain::errors::GateResult;
use crate::domain::models::{FreshnessInput, FreshnessPolicy, GateRun, PolicySettings, RefMode};
use crate::services::FreshnessGate;

#[derive(Args, Debug, Clone)]
pub struct FreshnessArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Default branch ref probed on the first attempt
    #[arg(long = "default-branch", env = "INPUT_DEFAULT_BRANCH")]
    pub default_branch: String,

    /// Workflow run attempt; retries probe the pull request refs
    #[arg(long, env = "INPUT_ATTEMPT", default_value_t = 1)]
    pub attempt: u32,

    /// Maximum age of the most recent analysis, in days
    #[arg(long, env = "INPUT_PERIOD")]
    pub period: i64,

    /// Code scanning tool whose analyses are checked
    #[arg(long = "tool-name", env = "INPUT_TOOL_NAME", default_value = "CodeQL")]
    pub tool_name: String,

    /// Comment posted when the check fails
    #[arg(long, env = "INPUT_MESSAGE", default_value = "")]
    pub message: String,

    /// Ref resolution on retries (single, union, fallback)
    #[arg(long = "ref-mode", env = "INPUT_REF_MODE")]
    pub ref_mode: Option<RefMode>,
}

impl FreshnessArgs {
    pub fn policy(&self, settings: &PolicySettings) -> GateResult<FreshnessPolicy> {
        FreshnessPolicy::new(FreshnessInput {
            org: self.target.org.clone(),
            repo: self.target.repo.clone(),
            pull_request: self.target.pull_request,
            default_branch: self.default_branch.clone(),
            attempt: self.attempt,
            period_days: self.period,
            tool_name: self.tool_name.clone(),
            report_marker: settings.freshness_marker.clone(),
            message: self.message.clone(),
            ref_mode: self.ref_mode.unwrap_or(settings.freshness_ref_mode),
        })
    }
}

pub async fn execute(args: FreshnessArgs, ctx: &AppContext) -> Result<GateRun> {
    let policy = args.policy(&ctx.config.policy)?;
    let gate = FreshnessGate::new(ctx.service.clone(), policy, &ctx.config.github.bot_login);
    Ok(gate.run(Utc::now()).await?)
}
