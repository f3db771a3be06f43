//! Crawler coordinator - program-level orchestration
//!
//! Programs are processed one after another. For each program the
//! coordinator:
//! - Builds and fetches the program's entry page
//! - Discovers the connector links from its sidebar
//! - Runs the worker pool over those links
//! - Assembles and persists the program document
//!
//! A failure in discovery or persistence skips that program only; the run
//! moves on to the next one and the reason ends up in the [`RunReport`].
//! Failed connector pages never skip a program: its document is written with
//! whatever records succeeded, possibly none.

use crate::cache::MemoryPageCache;
use crate::config::{validate, Config, ProgramConfig};
use crate::crawler::discover::{dedupe_links, discover_links};
use crate::crawler::extractor::RecordExtractor;
use crate::crawler::fetcher::{CachingFetcher, HttpFetcher, PageFetcher};
use crate::crawler::pool::{PoolOptions, WorkerPool};
use crate::model::ProgramDescriptor;
use crate::output::{
    assemble, document_path, generate_markdown_summary, persist_document, ProgramOutcome,
    ProgramStatus, RunReport,
};
use crate::url::program_entry_url;
use crate::{CrawlError, Result};
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Fetcher used for real runs: HTTP behind a per-run page cache
pub type DefaultFetcher = CachingFetcher<HttpFetcher, MemoryPageCache>;

/// Main crawler coordinator structure
pub struct Coordinator<F> {
    config: Arc<Config>,
    root_url: Url,
    fetcher: Arc<F>,
    extractor: Arc<RecordExtractor>,
}

impl Coordinator<DefaultFetcher> {
    /// Creates a coordinator that fetches over HTTP
    ///
    /// Entry pages are also connector pages, so the cache saves one request
    /// per program.
    pub fn new(config: Config) -> Result<Self> {
        let http = HttpFetcher::from_config(&config.http, &config.crawler)?;
        let fetcher = CachingFetcher::new(http, MemoryPageCache::new());
        Self::with_fetcher(config, Arc::new(fetcher))
    }
}

impl<F> Coordinator<F>
where
    F: PageFetcher + 'static,
{
    /// Creates a coordinator around any fetcher
    ///
    /// # Errors
    ///
    /// `CrawlError::Config` if the configuration is invalid, including when
    /// no programs are configured.
    pub fn with_fetcher(config: Config, fetcher: Arc<F>) -> Result<Self> {
        validate(&config)?;
        let root_url = Url::parse(&config.site.root_url)?;

        Ok(Self {
            config: Arc::new(config),
            root_url,
            fetcher,
            extractor: Arc::new(RecordExtractor::default()),
        })
    }

    /// Replaces the record extractor
    pub fn with_extractor(mut self, extractor: RecordExtractor) -> Self {
        self.extractor = Arc::new(extractor);
        self
    }

    /// Crawls every configured program in order
    ///
    /// Cancelling `cancel` (or hitting the configured run deadline) stops
    /// new work; programs not finished by then are reported as skipped and
    /// their previous documents are left untouched.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<RunReport> {
        if self.config.programs.is_empty() {
            return Err(CrawlError::Config(crate::ConfigError::Validation(
                "no programs configured".to_string(),
            )));
        }

        let token = cancel.child_token();
        let deadline = self.config.crawler.run_deadline_secs.map(|secs| {
            let token = token.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = token.cancelled() => {}
                    _ = tokio::time::sleep(Duration::from_secs(secs)) => {
                        tracing::warn!("Run deadline of {}s reached, cancelling", secs);
                        token.cancel();
                    }
                }
            })
        });

        let mut report = RunReport::new(Utc::now());
        tracing::info!(
            "Starting crawl of {} programs from {}",
            self.config.programs.len(),
            self.root_url
        );

        for program in &self.config.programs {
            let outcome = self.process_program(program, &token).await;
            match &outcome.status {
                ProgramStatus::Succeeded {
                    path, connectors, ..
                } => tracing::info!(
                    "Program {} written: {} connectors to {}",
                    outcome.descriptor.label(),
                    connectors,
                    path.display()
                ),
                ProgramStatus::Skipped { reason } => tracing::error!(
                    "Program {} skipped: {}",
                    outcome.descriptor.label(),
                    reason
                ),
            }
            report.outcomes.push(outcome);
        }

        if let Some(handle) = deadline {
            handle.abort();
        }
        report.finished_at = Utc::now();

        if let Some(summary_path) = &self.config.output.summary_path {
            match generate_markdown_summary(&report, Path::new(summary_path)) {
                Ok(()) => tracing::info!("Summary written to {}", summary_path),
                Err(e) => tracing::error!("Failed to write summary: {}", e),
            }
        }

        tracing::info!(
            "Crawl completed: {} programs written, {} skipped in {}s",
            report.succeeded().count(),
            report.skipped().count(),
            report.duration_seconds()
        );

        Ok(report)
    }

    /// Runs discovery, the pool and persistence for one program
    async fn process_program(
        &self,
        program: &ProgramConfig,
        cancel: &CancellationToken,
    ) -> ProgramOutcome {
        let descriptor = program.descriptor();

        if cancel.is_cancelled() {
            return ProgramOutcome::skipped(descriptor, None, "run cancelled");
        }

        let entry_url = match program_entry_url(&self.root_url, program) {
            Ok(url) => url,
            Err(e) => {
                return ProgramOutcome::skipped(
                    descriptor,
                    None,
                    format!("cannot build entry URL: {}", e),
                )
            }
        };
        let entry = Some(entry_url.to_string());

        tracing::info!(
            "Discovering connectors for {} from {}",
            descriptor.label(),
            entry_url
        );

        let links = match self.discover(&entry_url, cancel).await {
            Ok(links) => links,
            Err(e) => return ProgramOutcome::skipped(descriptor, entry, e.to_string()),
        };

        if links.is_empty() {
            return ProgramOutcome::skipped(descriptor, entry, "no connector links found");
        }

        let links_discovered = links.len();
        tracing::info!("Found {} connectors for {}", links_discovered, descriptor.label());

        let pool = WorkerPool::new(
            Arc::clone(&self.fetcher),
            PoolOptions::from_config(&self.config.crawler),
        );
        let extractor = Arc::clone(&self.extractor);
        let outcome = pool
            .run(
                links,
                move |html: &str, url: &Url| extractor.extract(html, url),
                cancel,
            )
            .await;

        let status = if cancel.is_cancelled() {
            ProgramStatus::Skipped {
                reason: format!(
                    "run cancelled after {} of {} connectors",
                    outcome.records.len(),
                    links_discovered
                ),
            }
        } else {
            if outcome.records.is_empty() {
                tracing::warn!(
                    "All {} connector pages failed for {}",
                    links_discovered,
                    descriptor.label()
                );
            }

            let path = self.document_path(&descriptor);
            let connectors = outcome.records.len();
            let document = assemble(descriptor.clone(), outcome.records);

            match persist_document(&document, &path) {
                Ok(()) => ProgramStatus::Succeeded {
                    path,
                    connectors,
                    skipped_links: outcome.skipped,
                },
                Err(e) => ProgramStatus::Skipped {
                    reason: e.to_string(),
                },
            }
        };

        ProgramOutcome {
            descriptor,
            entry_url: entry,
            links_discovered,
            status,
        }
    }

    /// Fetches the entry page and lists the program's connector pages
    async fn discover(&self, entry_url: &Url, cancel: &CancellationToken) -> Result<Vec<Url>> {
        let html = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(CrawlError::Cancelled { url: entry_url.to_string() }),
            html = self.fetcher.fetch(entry_url) => html?,
        };

        let mut links = discover_links(&html, entry_url)?;

        if self.config.crawler.dedupe_links {
            let before = links.len();
            links = dedupe_links(links);
            if links.len() < before {
                tracing::debug!("Dropped {} repeated links", before - links.len());
            }
        }

        if let Some(limit) = self.config.crawler.max_connectors {
            links.truncate(limit);
        }

        Ok(links)
    }

    fn document_path(&self, descriptor: &ProgramDescriptor) -> PathBuf {
        document_path(Path::new(&self.config.output.directory), descriptor)
    }
}

/// Runs a complete crawl over HTTP
///
/// # Example
///
/// ```no_run
/// use pinout_crawler::config::load_config;
/// use pinout_crawler::crawler::run_crawl;
/// use std::path::Path;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let report = run_crawl(config, CancellationToken::new()).await?;
/// println!("{} programs written", report.succeeded().count());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config, cancel: CancellationToken) -> Result<RunReport> {
    let coordinator = Coordinator::new(config)?;
    coordinator.run(&cancel).await
}
