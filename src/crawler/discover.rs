//! Connector link discovery
//!
//! Every connector page of a program carries the same sidebar listing all
//! connectors of that program, so one entry page is enough to enumerate the
//! whole program.

use crate::url::resolve_link;
use crate::{CrawlError, Result};
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Sidebar container
const ASIDE_SELECTOR: &str = "aside.tds-layout-aside";

/// Navigation list inside the sidebar
const NAV_SELECTOR: &str = "nav.tds-sidenav";

/// Connector entries inside the navigation list
const NAV_ITEM_SELECTOR: &str = "a.tds-site-nav-item[href]";

/// Extracts connector page URLs from a program's entry page
///
/// Links come back absolute, in document order, repeats included.
///
/// # Errors
///
/// Returns `CrawlError::Structure` when the sidebar or its navigation list
/// is missing. This usually means the page is rendered client-side or the
/// program does not exist.
///
/// # Example
///
/// ```
/// use pinout_crawler::crawler::discover_links;
/// use url::Url;
///
/// let html = r#"<aside class="tds-layout-item tds-layout-aside">
///   <nav class="tds-sidenav"><a class="tds-site-nav-item" href="../x001/index.html">X001</a></nav>
/// </aside>"#;
/// let base = Url::parse("https://example.com/docs/connector/g011/index.html").unwrap();
/// let links = discover_links(html, &base).unwrap();
/// assert_eq!(links[0].as_str(), "https://example.com/docs/connector/x001/index.html");
/// ```
pub fn discover_links(html: &str, base_url: &Url) -> Result<Vec<Url>> {
    let document = Html::parse_document(html);

    let aside_selector = Selector::parse(ASIDE_SELECTOR).expect("aside selector");
    let nav_selector = Selector::parse(NAV_SELECTOR).expect("nav selector");
    let item_selector = Selector::parse(NAV_ITEM_SELECTOR).expect("nav item selector");

    let aside = document
        .select(&aside_selector)
        .next()
        .ok_or_else(|| CrawlError::structure(base_url.as_str(), "sidebar <aside> not found"))?;

    let nav = aside
        .select(&nav_selector)
        .next()
        .ok_or_else(|| CrawlError::structure(base_url.as_str(), "sidebar <nav> not found"))?;

    let mut links = Vec::new();
    for anchor in nav.select(&item_selector) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };

        match resolve_link(href, base_url) {
            Some(url) => links.push(url),
            None => tracing::debug!("Ignoring navigation href {:?} on {}", href, base_url),
        }
    }

    Ok(links)
}

/// Drops later repeats of a URL, keeping first-seen order
pub fn dedupe_links(links: Vec<Url>) -> Vec<Url> {
    let mut seen = HashSet::new();
    links
        .into_iter()
        .filter(|url| seen.insert(url.as_str().to_string()))
        .collect()
}
