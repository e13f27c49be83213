//! Implementation of the `policy-gate code-scanning` command.

use anyhow::Result;
use chrono::Utc;
use clap::Args;

use crate::cli::context::AppContext;
use crate::cli::types::TargetArgs;
use crate::domain::errors::GateResult;
use crate::domain::models::{
    GateRun, PolicyConfig, PolicyInput, PolicySettings, RefMode, Visibility,
};
use crate::services::CodeScanningGate;

#[derive(Args, Debug, Clone)]
pub struct CodeScanningArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Default branch ref probed on the first attempt
    #[arg(long = "default-branch", env = "INPUT_DEFAULT_BRANCH")]
    pub default_branch: String,

    /// Workflow run attempt; retries probe the pull request refs
    #[arg(long, env = "INPUT_ATTEMPT", default_value_t = 1)]
    pub attempt: u32,

    /// Lowest severity that is enforced (critical, high, medium, low, warning, note, error)
    #[arg(long, env = "INPUT_THRESHOLD")]
    pub threshold: String,

    /// Maximum allowed alert age in days
    #[arg(long, env = "INPUT_AGE")]
    pub age: i64,

    /// Repository visibility, controls how alert links render
    #[arg(long, env = "INPUT_VISIBILITY", default_value = "private")]
    pub visibility: Visibility,

    /// Message placed above the findings table
    #[arg(long, env = "INPUT_MESSAGE", default_value = "")]
    pub message: String,

    /// Ref resolution on retries (single, union, fallback)
    #[arg(long = "ref-mode", env = "INPUT_REF_MODE")]
    pub ref_mode: Option<RefMode>,

    /// Drop alerts already reported from an earlier ref
    #[arg(long, env = "INPUT_DEDUPE")]
    pub dedupe: bool,
}

impl CodeScanningArgs {
    /// Validate the inputs against the configured defaults.
    pub fn policy(&self, settings: &PolicySettings) -> GateResult<PolicyConfig> {
        PolicyConfig::new(PolicyInput {
            org: self.target.org.clone(),
            repo: self.target.repo.clone(),
            pull_request: self.target.pull_request,
            default_branch: self.default_branch.clone(),
            attempt: self.attempt,
            threshold: self.threshold.clone(),
            max_age_days: self.age,
            visibility: self.visibility,
            report_marker: settings.code_scanning_marker.clone(),
            message: self.message.clone(),
            ref_mode: self.ref_mode.unwrap_or(settings.code_scanning_ref_mode),
            dedupe: self.dedupe || settings.dedupe,
        })
    }
}

pub async fn execute(args: CodeScanningArgs, ctx: &AppContext) -> Result<GateRun> {
    let policy = args.policy(&ctx.config.policy)?;
    let gate = CodeScanningGate::new(ctx.service.clone(), policy, &ctx.config.github.bot_login);
    Ok(gate.run(Utc::now()).await?)
}
