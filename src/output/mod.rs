//! Output module
//!
//! This module handles:
//! - Assembling and atomically persisting per-program JSON documents
//! - The per-program run report
//! - An optional markdown summary of the run

mod document;
mod markdown;
mod report;

pub use document::{
    assemble, document_path, load_document, persist_document, write_atomically,
};
pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use report::{print_report, ProgramOutcome, ProgramStatus, RunReport};
