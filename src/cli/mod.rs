//! Command-line interface: argument types, command handlers and output.

pub mod commands;
pub mod context;
pub mod output;
pub mod types;

use anyhow::Result;

use crate::domain::errors::GateError;
use crate::domain::models::GateRun;

pub use context::AppContext;
pub use output::{output, CommandOutput, GateRunOutput};
pub use types::{Cli, Commands};

/// Run the selected gate against an initialized context.
pub async fn dispatch(command: Commands, ctx: &AppContext) -> Result<GateRun> {
    match command {
        Commands::CodeScanning(args) => commands::code_scanning::execute(args, ctx).await,
        Commands::Freshness(args) => commands::freshness::execute(args, ctx).await,
        Commands::RequiredProperties(args) => {
            commands::required_properties::execute(args, ctx).await
        }
    }
}

/// Parse-to-verdict entry point. Returns whether the gate passed.
pub async fn run(cli: Cli) -> Result<bool> {
    let ctx = AppContext::init(&cli)?;
    let gate = cli.command.name();
    tracing::info!(gate, "Running policy gate");

    let run = dispatch(cli.command, &ctx).await?;
    let result = GateRunOutput::from(run);
    output(&result, cli.json);

    if !result.passed && output::in_github_actions() {
        eprintln!("{}", output::workflow_error(result.run.outcome.message()));
    }
    Ok(result.passed)
}

/// Report a fatal error and exit with status 1.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    let kind = err.downcast_ref::<GateError>().map_or("internal", GateError::kind);
    if json_mode {
        let body = serde_json::json!({
            "passed": false,
            "error": format!("{err:#}"),
            "kind": kind,
        });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("{} {err:#}", console::style("Error:").red().bold());
    }
    if output::in_github_actions() {
        eprintln!("{}", output::workflow_error(&format!("{err:#}")));
    }
    std::process::exit(1);
}
