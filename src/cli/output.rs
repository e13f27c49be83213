//! Output formatting utilities for the CLI.

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use console::style;
use serde::Serialize;

use crate::domain::models::{Finding, GateOutcome, GateRun};

pub trait CommandOutput: Serialize {
    fn to_human(&self) -> String;
    fn to_json(&self) -> serde_json::Value;
}

pub fn output<T: CommandOutput>(result: &T, json_mode: bool) {
    if json_mode {
        println!("{}", serde_json::to_string_pretty(&result.to_json()).unwrap_or_default());
    } else {
        println!("{}", result.to_human());
    }
}

/// Result of one gate run as printed by the CLI.
#[derive(Debug, Serialize)]
pub struct GateRunOutput {
    #[serde(flatten)]
    pub run: GateRun,
    pub passed: bool,
}

impl From<GateRun> for GateRunOutput {
    fn from(run: GateRun) -> Self {
        let passed = run.outcome.passed();
        Self { run, passed }
    }
}

impl CommandOutput for GateRunOutput {
    fn to_human(&self) -> String {
        let status = match self.run.outcome {
            GateOutcome::Passed { .. } => style("PASSED").green().bold(),
            GateOutcome::Failed { .. } => style("FAILED").red().bold(),
            GateOutcome::NoData { .. } => style("NO DATA").yellow().bold(),
        };
        let mut lines = vec![format!(
            "{} {}: {}",
            status,
            self.run.gate,
            self.run.outcome.message()
        )];
        if !self.run.findings.is_empty() {
            lines.push(String::new());
            lines.push(findings_table(&self.run.findings));
        }
        if self.run.report_posted {
            lines.push(String::new());
            lines.push("Report posted to the pull request.".to_string());
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

fn findings_table(findings: &[Finding]) -> String {
    let use_colors = console::colors_enabled();
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Alert").add_attribute(Attribute::Bold),
        Cell::new("Age (days)").add_attribute(Attribute::Bold),
        Cell::new("Violation").add_attribute(Attribute::Bold),
        Cell::new("URL").add_attribute(Attribute::Bold),
    ]);

    for finding in findings {
        let violation = if finding.exceeds_threshold { "yes" } else { "no" };
        let violation_cell = if use_colors && finding.exceeds_threshold {
            Cell::new(violation).fg(Color::Red)
        } else {
            Cell::new(violation)
        };
        table.add_row(vec![
            Cell::new(finding.id),
            Cell::new(finding.age_days),
            violation_cell,
            Cell::new(&finding.url),
        ]);
    }

    table.to_string()
}

/// Format a GitHub Actions `::error::` workflow command.
pub fn workflow_error(message: &str) -> String {
    let escaped = message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A");
    format!("::error::{escaped}")
}

/// True when running inside a GitHub Actions job.
pub fn in_github_actions() -> bool {
    std::env::var("GITHUB_ACTIONS").is_ok_and(|v| v == "true")
}
