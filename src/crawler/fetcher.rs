//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building HTTP clients with the fixed identity headers the site requires
//! - GET requests returning the page body
//! - Classifying non-2xx responses as fetch failures
//! - An optional cache layer in front of any fetcher

use crate::cache::PageCache;
use crate::config::{CrawlerConfig, HttpConfig};
use crate::{CrawlError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Anything that can turn a URL into page HTML
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<String>;
}

#[async_trait]
impl<F: PageFetcher + ?Sized> PageFetcher for Arc<F> {
    async fn fetch(&self, url: &Url) -> Result<String> {
        (**self).fetch(url).await
    }
}

/// Builds an HTTP client with the configured identity headers
///
/// # Arguments
///
/// * `http` - User-Agent and Accept values
/// * `crawler` - Timeout settings
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(CrawlError)` - A header value was not valid or the client failed to build
pub fn build_http_client(http: &HttpConfig, crawler: &CrawlerConfig) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(&http.user_agent).map_err(|e| {
            CrawlError::Config(crate::ConfigError::Validation(format!(
                "invalid user_agent header: {}",
                e
            )))
        })?,
    );
    headers.insert(
        ACCEPT,
        HeaderValue::from_str(&http.accept).map_err(|e| {
            CrawlError::Config(crate::ConfigError::Validation(format!(
                "invalid accept header: {}",
                e
            )))
        })?,
    );

    let client = Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(crawler.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()?;

    Ok(client)
}

/// Fetches pages over HTTP, one attempt per call
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a fetcher with a client configured from `http` and `crawler`
    pub fn from_config(http: &HttpConfig, crawler: &CrawlerConfig) -> Result<Self> {
        Ok(Self::new(build_http_client(http, crawler)?))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String> {
        fetch_url(&self.client, url).await
    }
}

/// Fetches a URL and returns its body
///
/// Any non-2xx status is an error; there is no retry.
pub async fn fetch_url(client: &Client, url: &Url) -> Result<String> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|source| CrawlError::Http {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(CrawlError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|source| CrawlError::Http {
        url: url.to_string(),
        source,
    })
}

/// Serves pages from a cache, fetching and storing on a miss
pub struct CachingFetcher<F, C> {
    inner: F,
    cache: C,
}

impl<F, C> CachingFetcher<F, C>
where
    F: PageFetcher,
    C: PageCache,
{
    pub fn new(inner: F, cache: C) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }
}

#[async_trait]
impl<F, C> PageFetcher for CachingFetcher<F, C>
where
    F: PageFetcher,
    C: PageCache,
{
    async fn fetch(&self, url: &Url) -> Result<String> {
        if let Some(body) = self.cache.get(url.as_str()) {
            tracing::trace!("Cache hit for {}", url);
            return Ok(body);
        }

        let body = self.inner.fetch(url).await?;
        self.cache.put(url.as_str(), body.clone());
        Ok(body)
    }
}
