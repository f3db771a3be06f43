//! Run report
//!
//! A run never collapses into a single pass/fail flag: every configured
//! program ends up either succeeded (with its document path and any links
//! that were skipped) or skipped with a reason.

use crate::crawler::SkippedLink;
use crate::model::ProgramDescriptor;
use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Final state of one program
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgramStatus {
    /// Document written
    Succeeded {
        path: PathBuf,
        connectors: usize,
        skipped_links: Vec<SkippedLink>,
    },

    /// No document written for this program
    Skipped { reason: String },
}

/// Outcome for one configured program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramOutcome {
    pub descriptor: ProgramDescriptor,

    /// Entry page, when one could be built
    pub entry_url: Option<String>,

    /// Number of connector links discovered
    pub links_discovered: usize,

    pub status: ProgramStatus,
}

impl ProgramOutcome {
    pub fn skipped(
        descriptor: ProgramDescriptor,
        entry_url: Option<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            descriptor,
            entry_url,
            links_discovered: 0,
            status: ProgramStatus::Skipped {
                reason: reason.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, ProgramStatus::Succeeded { .. })
    }
}

/// Per-program outcomes of one run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcomes: Vec<ProgramOutcome>,
}

impl RunReport {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            finished_at: started_at,
            outcomes: Vec::new(),
        }
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &ProgramOutcome> {
        self.outcomes.iter().filter(|outcome| outcome.is_success())
    }

    pub fn skipped(&self) -> impl Iterator<Item = &ProgramOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.is_success())
    }

    /// Records written across all programs
    pub fn total_connectors(&self) -> usize {
        self.outcomes
            .iter()
            .map(|outcome| match &outcome.status {
                ProgramStatus::Succeeded { connectors, .. } => *connectors,
                ProgramStatus::Skipped { .. } => 0,
            })
            .sum()
    }

    /// Links that produced no record, across all written programs
    pub fn total_skipped_links(&self) -> usize {
        self.outcomes
            .iter()
            .map(|outcome| match &outcome.status {
                ProgramStatus::Succeeded { skipped_links, .. } => skipped_links.len(),
                ProgramStatus::Skipped { .. } => 0,
            })
            .sum()
    }

    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }
}

/// Prints a short run report to stdout
pub fn print_report(report: &RunReport) {
    println!("=== Crawl Report ===\n");
    println!("Started:  {}", report.started_at.to_rfc3339());
    println!("Finished: {}", report.finished_at.to_rfc3339());
    println!();

    for outcome in &report.outcomes {
        match &outcome.status {
            ProgramStatus::Succeeded {
                path,
                connectors,
                skipped_links,
            } => {
                println!(
                    "✓ {}: {} connectors, {} skipped, written to {}",
                    outcome.descriptor.label(),
                    connectors,
                    skipped_links.len(),
                    path.display()
                );
                for skip in skipped_links {
                    println!("    - #{} {}: {}", skip.index + 1, skip.url, skip.reason);
                }
            }
            ProgramStatus::Skipped { reason } => {
                println!("✗ {}: skipped, {}", outcome.descriptor.label(), reason);
            }
        }
    }

    println!();
    println!(
        "Programs: {} written, {} skipped; connectors: {}; skipped links: {}",
        report.succeeded().count(),
        report.skipped().count(),
        report.total_connectors(),
        report.total_skipped_links()
    );
}
