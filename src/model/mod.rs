//! Data model for crawl output
//!
//! These types are what the crawler produces and what gets written to disk.
//! Their serde representation is the output file format, so field names and
//! ordering here are a contract with downstream readers.

mod connector;
mod pinout;
mod program;

pub use connector::ConnectorRecord;
pub use pinout::PinoutRow;
pub use program::{ProgramDescriptor, ProgramDocument};
