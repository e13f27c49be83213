//! Policy Gate CLI entry point.

use clap::Parser;

use policy_gate::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    match policy_gate::cli::run(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => policy_gate::cli::handle_error(err, json),
    }
}
