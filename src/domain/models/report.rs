//! Pull request report bodies.

use comfy_table::presets::ASCII_MARKDOWN;
use comfy_table::Table;

use crate::domain::models::finding::Finding;
use crate::domain::models::policy::Visibility;

/// A rendered report. The heading doubles as the marker used to find and
/// replace earlier reports from the same gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    heading: String,
    message: String,
    table: Option<String>,
}

impl Report {
    /// A report with no findings table, used for notices such as
    /// "no analysis found".
    pub fn notice(heading: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            message: message.into(),
            table: None,
        }
    }

    /// A report listing every finding with its age and violation flag.
    pub fn findings(
        heading: impl Into<String>,
        message: impl Into<String>,
        findings: &[Finding],
        visibility: Visibility,
    ) -> Self {
        let mut table = Table::new();
        table
            .load_preset(ASCII_MARKDOWN)
            .set_header(vec!["Alert Number", "URL", "Age", "Policy Violation"]);

        for finding in findings {
            let link = match visibility {
                Visibility::Public => format!("[Link]({})", finding.url),
                Visibility::Private => format!("[{0}]({0})", finding.url),
            };
            table.add_row(vec![
                finding.id.to_string(),
                link,
                format!("{} Days", finding.age_days),
                if finding.exceeds_threshold { "Yes" } else { "No" }.to_string(),
            ]);
        }

        Self {
            heading: heading.into(),
            message: message.into(),
            table: Some(table.to_string()),
        }
    }

    /// Markdown body to post as a comment.
    pub fn render(&self) -> String {
        let mut body = format!("## {}\n\n{}\n", self.heading, self.message.trim_end());
        if let Some(table) = &self.table {
            body.push_str("\n---\n\n");
            body.push_str(table);
            body.push('\n');
        }
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn finding(id: u64, age_days: i64, exceeds: bool) -> Finding {
        Finding {
            id,
            url: format!("https://github.com/org/repo/security/code-scanning/{id}"),
            created_at: Utc::now(),
            age_days,
            exceeds_threshold: exceeds,
        }
    }

    #[test]
    fn test_notice_contains_heading_and_message() {
        let body = Report::notice("Code Scanning Analysis", "No analysis found").render();
        assert!(body.starts_with("## Code Scanning Analysis"));
        assert!(body.contains("No analysis found"));
        assert!(!body.contains("---"));
    }

    #[test]
    fn test_findings_table_rows() {
        let report = Report::findings(
            "Code Scanning Policy Findings",
            "Fix these",
            &[finding(4, 10, false), finding(9, 45, true)],
            Visibility::Public,
        );
        let body = report.render();
        assert!(body.contains("Alert Number"));
        assert!(body.contains("Policy Violation"));
        let row_4 = body.lines().find(|l| l.contains("| 4 ")).unwrap();
        assert!(row_4.contains("10 Days"));
        assert!(row_4.contains("No"));
        let row_9 = body.lines().find(|l| l.contains("| 9 ")).unwrap();
        assert!(row_9.contains("45 Days"));
        assert!(row_9.contains("Yes"));
        assert!(row_9.contains("[Link](https://github.com/org/repo/security/code-scanning/9)"));
    }

    #[test]
    fn test_private_links_show_full_url() {
        let body =
            Report::findings("H", "M", &[finding(2, 1, false)], Visibility::Private).render();
        assert!(body.contains(
            "[https://github.com/org/repo/security/code-scanning/2](https://github.com/org/repo/security/code-scanning/2)"
        ));
    }
}
