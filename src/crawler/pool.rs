//! Bounded worker pool for connector pages
//!
//! This module handles:
//! - Limiting concurrent fetches with a semaphore
//! - Isolating failures so one bad page never affects its siblings
//! - Collecting outcomes through a single channel-owned buffer
//! - Stopping cleanly when the run is cancelled
//!
//! Results are sorted by original link index before they are returned, so a
//! program's output is the same across runs regardless of completion order.

use crate::config::CrawlerConfig;
use crate::crawler::PageFetcher;
use crate::model::ConnectorRecord;
use crate::{CrawlError, Result};
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Pool sizing and pacing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolOptions {
    /// Maximum number of pages in flight
    pub max_concurrency: usize,

    /// Pause each worker takes after its fetch, while holding its slot
    pub politeness_delay: Duration,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            max_concurrency: 8,
            politeness_delay: Duration::ZERO,
        }
    }
}

impl PoolOptions {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            max_concurrency: config.max_concurrency.max(1),
            politeness_delay: Duration::from_millis(config.politeness_delay_ms),
        }
    }
}

/// A link that produced no record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLink {
    /// Position in the discovered link list
    pub index: usize,
    pub url: String,
    pub reason: String,
}

/// Everything a pool run produced, ordered by link index
#[derive(Debug, Default)]
pub struct PoolOutcome {
    pub records: Vec<ConnectorRecord>,
    pub skipped: Vec<SkippedLink>,
}

impl PoolOutcome {
    /// Total number of links accounted for
    pub fn total(&self) -> usize {
        self.records.len() + self.skipped.len()
    }
}

/// Outcome of one task, sent to the aggregator
struct TaskOutcome {
    index: usize,
    url: Url,
    result: Result<ConnectorRecord>,
}

#[derive(Default)]
struct Collected {
    records: Vec<(usize, ConnectorRecord)>,
    skipped: Vec<SkippedLink>,
    seen: HashSet<usize>,
}

/// Runs fetch + extract over a program's links under bounded concurrency
pub struct WorkerPool<F> {
    fetcher: Arc<F>,
    options: PoolOptions,
}

impl<F> WorkerPool<F>
where
    F: PageFetcher + 'static,
{
    pub fn new(fetcher: Arc<F>, options: PoolOptions) -> Self {
        Self { fetcher, options }
    }

    /// Processes every link and waits for all of them to finish
    ///
    /// Each link gets exactly one attempt. A failed fetch or extraction is
    /// logged with its URL and recorded in [`PoolOutcome::skipped`]. Once
    /// `cancel` fires no new links are started, in-flight fetches are
    /// abandoned, and every link without a result is recorded as skipped.
    pub async fn run<E>(&self, links: Vec<Url>, extract: E, cancel: &CancellationToken) -> PoolOutcome
    where
        E: Fn(&str, &Url) -> Result<ConnectorRecord> + Send + Sync + 'static,
    {
        let total = links.len();
        let all_urls: Vec<String> = links.iter().map(|url| url.to_string()).collect();
        let started = Instant::now();

        let extract = Arc::new(extract);
        let semaphore = Arc::new(Semaphore::new(self.options.max_concurrency.max(1)));
        let (tx, rx) = mpsc::unbounded_channel::<TaskOutcome>();
        let aggregator = tokio::spawn(collect_outcomes(rx, total, started));

        let mut tasks = JoinSet::new();
        let mut remaining = links.into_iter().enumerate();

        for (index, url) in remaining.by_ref() {
            let permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    let _ = tx.send(cancelled(index, url));
                    break;
                }
                permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => {
                        let _ = tx.send(cancelled(index, url));
                        break;
                    }
                },
            };

            tracing::debug!("Fetching connector {}/{}: {}", index + 1, total, url);

            let tx = tx.clone();
            let fetcher = Arc::clone(&self.fetcher);
            let extract = Arc::clone(&extract);
            let cancel = cancel.clone();
            let delay = self.options.politeness_delay;

            tasks.spawn(async move {
                let _permit = permit;

                let fetched = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Err(CrawlError::Cancelled { url: url.to_string() }),
                    fetched = fetcher.fetch(&url) => fetched,
                };
                let result = fetched.and_then(|html| extract_guarded(&*extract, &html, &url));
                let _ = tx.send(TaskOutcome { index, url, result });

                if !delay.is_zero() {
                    tokio::select! {
                        _ = cancel.cancelled() => {}
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            });
        }

        for (index, url) in remaining {
            let _ = tx.send(cancelled(index, url));
        }
        drop(tx);

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Connector worker failed: {}", e);
            }
        }

        let mut collected = match aggregator.await {
            Ok(collected) => collected,
            Err(e) => {
                tracing::error!("Outcome aggregator failed: {}", e);
                Collected::default()
            }
        };

        // Tasks that died before reporting
        for (index, url) in all_urls.into_iter().enumerate() {
            if !collected.seen.contains(&index) {
                tracing::warn!("Skipping {}: worker task did not complete", url);
                collected.skipped.push(SkippedLink {
                    index,
                    url,
                    reason: "worker task did not complete".to_string(),
                });
            }
        }

        collected.records.sort_by_key(|(index, _)| *index);
        collected.skipped.sort_by_key(|skip| skip.index);

        tracing::info!(
            "Pool finished: {} records, {} skipped in {:?}",
            collected.records.len(),
            collected.skipped.len(),
            started.elapsed()
        );

        PoolOutcome {
            records: collected
                .records
                .into_iter()
                .map(|(_, record)| record)
                .collect(),
            skipped: collected.skipped,
        }
    }
}

/// Runs `extract`, turning a panic into a structure error for that page
fn extract_guarded<E>(extract: &E, html: &str, url: &Url) -> Result<ConnectorRecord>
where
    E: Fn(&str, &Url) -> Result<ConnectorRecord>,
{
    panic::catch_unwind(AssertUnwindSafe(|| extract(html, url))).unwrap_or_else(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|message| message.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        Err(CrawlError::structure(
            url.as_str(),
            format!("extractor panicked: {}", message),
        ))
    })
}

fn cancelled(index: usize, url: Url) -> TaskOutcome {
    let result = Err(CrawlError::Cancelled {
        url: url.to_string(),
    });
    TaskOutcome { index, url, result }
}

/// Sole owner of the result buffer
async fn collect_outcomes(
    mut rx: mpsc::UnboundedReceiver<TaskOutcome>,
    total: usize,
    started: Instant,
) -> Collected {
    let mut collected = Collected::default();

    while let Some(outcome) = rx.recv().await {
        collected.seen.insert(outcome.index);
        match outcome.result {
            Ok(record) => collected.records.push((outcome.index, record)),
            Err(e) => {
                tracing::warn!("Skipping connector {}: {}", outcome.url, e);
                collected.skipped.push(SkippedLink {
                    index: outcome.index,
                    url: outcome.url.to_string(),
                    reason: e.to_string(),
                });
            }
        }

        let done = collected.seen.len();
        if done % 10 == 0 {
            let rate = done as f64 / started.elapsed().as_secs_f64().max(f64::EPSILON);
            tracing::info!("Progress: {}/{} connectors, {:.2} pages/sec", done, total, rate);
        }
    }

    collected
}
