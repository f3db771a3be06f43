//! Crawler module for connector page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with the site's required identity headers
//! - Connector link discovery from a program's sidebar
//! - Connector record extraction, pinout tables included
//! - The bounded worker pool
//! - Program-level coordination

mod coordinator;
mod discover;
mod extractor;
mod fetcher;
mod pool;

pub use coordinator::{run_crawl, Coordinator, DefaultFetcher};
pub use discover::{dedupe_links, discover_links};
pub use extractor::{
    extract_record, LabelMatch, LabelRule, MetaField, RecordExtractor, DEFAULT_LABEL_RULES, UNUSED,
};
pub use fetcher::{build_http_client, fetch_url, CachingFetcher, HttpFetcher, PageFetcher};
pub use pool::{PoolOptions, PoolOutcome, SkippedLink, WorkerPool};
