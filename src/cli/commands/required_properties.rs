//! Implementation of the `policy-gate required-properties` command.

use anyhow::Result;
use clap::Args;

use crate::cli::context::AppContext;
use crate::cli::types::TargetArgs;
use crate::domain::errors::GateResult;
use crate::domain::models::{GateRun, PolicySettings, PropertyInput, PropertyPolicy};
use crate::services::RequiredPropertyGate;

#[derive(Args, Debug, Clone)]
pub struct RequiredPropertiesArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Custom property holding the maintainer contacts
    #[arg(long, env = "INPUT_PROPERTY", default_value = "security_maintainers")]
    pub property: String,

    /// Comment posted when the check fails
    #[arg(long, env = "INPUT_MESSAGE", default_value = "")]
    pub message: String,
}

impl RequiredPropertiesArgs {
    pub fn policy(&self, settings: &PolicySettings) -> GateResult<PropertyPolicy> {
        PropertyPolicy::new(PropertyInput {
            org: self.target.org.clone(),
            repo: self.target.repo.clone(),
            pull_request: self.target.pull_request,
            property_name: self.property.clone(),
            report_marker: settings.required_property_marker.clone(),
            message: self.message.clone(),
        })
    }
}

pub async fn execute(args: RequiredPropertiesArgs, ctx: &AppContext) -> Result<GateRun> {
    let policy = args.policy(&ctx.config.policy)?;
    let gate = RequiredPropertyGate::new(ctx.service.clone(), policy, &ctx.config.github.bot_login);
    Ok(gate.run().await?)
}
