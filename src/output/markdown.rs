//! Markdown summary generation
//!
//! This module generates a human-readable markdown summary of a run:
//! which programs were written, which were skipped and why, and every
//! connector link that produced no record.

use crate::output::document::write_atomically;
use crate::output::report::{ProgramStatus, RunReport};
use crate::Result;
use std::path::Path;

/// Writes the markdown summary for `report` to `output_path`
///
/// # Arguments
///
/// * `report` - The run report
/// * `output_path` - Path where the markdown file should be written
pub fn generate_markdown_summary(report: &RunReport, output_path: &Path) -> Result<()> {
    let markdown = format_markdown_summary(report);
    write_atomically(output_path, markdown.as_bytes())
}

/// Formats a run report as markdown
pub fn format_markdown_summary(report: &RunReport) -> String {
    let mut md = String::new();

    md.push_str("# Connector Crawl Summary\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Started**: {}\n", report.started_at.to_rfc3339()));
    md.push_str(&format!("- **Finished**: {}\n", report.finished_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Duration**: {} seconds\n",
        report.duration_seconds()
    ));
    md.push_str(&format!(
        "- **Programs written**: {}\n",
        report.succeeded().count()
    ));
    md.push_str(&format!(
        "- **Programs skipped**: {}\n",
        report.skipped().count()
    ));
    md.push_str(&format!(
        "- **Connectors**: {}\n",
        report.total_connectors()
    ));
    md.push_str(&format!(
        "- **Skipped links**: {}\n\n",
        report.total_skipped_links()
    ));

    md.push_str("## Programs\n\n");
    md.push_str("| Program | SOP | Links | Connectors | Result |\n");
    md.push_str("|---------|-----|-------|------------|--------|\n");
    for outcome in &report.outcomes {
        let (connectors, result) = match &outcome.status {
            ProgramStatus::Succeeded {
                path, connectors, ..
            } => (connectors.to_string(), format!("`{}`", path.display())),
            ProgramStatus::Skipped { reason } => ("-".to_string(), format!("skipped: {}", reason)),
        };
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            outcome.descriptor.label(),
            outcome.descriptor.stage_tag,
            outcome.links_discovered,
            connectors,
            escape_cell(&result)
        ));
    }
    md.push('\n');

    let skipped: Vec<_> = report
        .outcomes
        .iter()
        .filter_map(|outcome| match &outcome.status {
            ProgramStatus::Succeeded { skipped_links, .. } if !skipped_links.is_empty() => {
                Some((outcome, skipped_links))
            }
            _ => None,
        })
        .collect();

    if !skipped.is_empty() {
        md.push_str("## Skipped Links\n\n");
        for (outcome, links) in skipped {
            md.push_str(&format!("### {}\n\n", outcome.descriptor.label()));
            for link in links {
                md.push_str(&format!(
                    "- #{} {}: {}\n",
                    link.index + 1,
                    link.url,
                    link.reason
                ));
            }
            md.push('\n');
        }
    }

    md
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
