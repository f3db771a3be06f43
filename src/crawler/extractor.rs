//! Connector page extraction
//!
//! Turns one connector page into a [`ConnectorRecord`]. Missing page parts
//! become nulls (or an empty pinout table); only a page with no content at
//! all is treated as an error.
//!
//! # Pinout tables
//!
//! The first `<table>` on the page is the pinout table. Header cells of its
//! first row give the column keys. Every later row is either:
//!
//! - an **unused row**: exactly two cells where the second spans several
//!   columns and says "unused". The first column keeps the cavity number and
//!   every other column becomes the literal `"unused"`.
//! - a **data row**: cells are paired with headers by position; headers past
//!   the last cell get `null`.
//!
//! Either way every row carries every header key.

use crate::model::{ConnectorRecord, PinoutRow};
use crate::url::{has_image_extension, resolve_link};
use crate::{CrawlError, Result};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Literal written into every non-first column of an unused cavity
pub const UNUSED: &str = "unused";

/// Meta panel fields a label can map to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaField {
    PartNumber,
    Connector,
    Color,
}

/// How a lower-cased label is compared against a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelMatch {
    Contains(&'static str),
    Equals(&'static str),
}

impl LabelMatch {
    fn matches(&self, label: &str) -> bool {
        match self {
            LabelMatch::Contains(needle) => label.contains(needle),
            LabelMatch::Equals(expected) => label == *expected,
        }
    }
}

/// Maps a meta panel label onto a record field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelRule {
    pub matcher: LabelMatch,
    pub field: MetaField,
}

/// Labels recognized on connector pages; the first matching rule wins
pub const DEFAULT_LABEL_RULES: &[LabelRule] = &[
    LabelRule {
        matcher: LabelMatch::Contains("part number"),
        field: MetaField::PartNumber,
    },
    LabelRule {
        matcher: LabelMatch::Equals("connector"),
        field: MetaField::Connector,
    },
    LabelRule {
        matcher: LabelMatch::Equals("color"),
        field: MetaField::Color,
    },
];

struct PageSelectors {
    heading: Selector,
    meta_wrapper: Selector,
    meta_label: Selector,
    meta_value: Selector,
    gallery: Selector,
    caption: Selector,
    table: Selector,
    row: Selector,
    image: Selector,
}

impl PageSelectors {
    fn new() -> Self {
        Self {
            heading: Selector::parse("section.tds-layout-main h1").expect("heading selector"),
            meta_wrapper: Selector::parse("div.connector-meta div.wrapper")
                .expect("meta wrapper selector"),
            meta_label: Selector::parse("div.label").expect("meta label selector"),
            meta_value: Selector::parse("div.value").expect("meta value selector"),
            gallery: Selector::parse("div.connector-images").expect("gallery selector"),
            caption: Selector::parse("figcaption").expect("caption selector"),
            table: Selector::parse("table").expect("table selector"),
            row: Selector::parse("tr").expect("row selector"),
            image: Selector::parse("img[src]").expect("image selector"),
        }
    }
}

/// Extracts connector records from page HTML
#[derive(Debug, Clone)]
pub struct RecordExtractor {
    rules: Vec<LabelRule>,
}

impl Default for RecordExtractor {
    fn default() -> Self {
        Self::with_rules(DEFAULT_LABEL_RULES.to_vec())
    }
}

impl RecordExtractor {
    /// Uses a custom label table instead of [`DEFAULT_LABEL_RULES`]
    pub fn with_rules(rules: Vec<LabelRule>) -> Self {
        Self { rules }
    }

    /// Extracts a record from one connector page
    ///
    /// # Errors
    ///
    /// `CrawlError::Structure` if the document has no content at all.
    pub fn extract(&self, html: &str, page_url: &Url) -> Result<ConnectorRecord> {
        if html.trim().is_empty() {
            return Err(CrawlError::structure(page_url.as_str(), "empty document"));
        }

        let document = Html::parse_document(html);
        let selectors = PageSelectors::new();

        let mut record = ConnectorRecord::new(page_url.as_str());
        record.name = document
            .select(&selectors.heading)
            .next()
            .map(|heading| stripped_text(heading, ""))
            .filter(|name| !name.is_empty());

        self.extract_meta(&document, &selectors, &mut record);
        record.description = extract_description(&document, &selectors);
        record.pinout_rows = extract_pinout(&document, &selectors);
        record.image_urls = extract_images(&document, &selectors, page_url);

        Ok(record)
    }

    fn extract_meta(&self, document: &Html, selectors: &PageSelectors, record: &mut ConnectorRecord) {
        for wrapper in document.select(&selectors.meta_wrapper) {
            let label = wrapper.select(&selectors.meta_label).next();
            let value = wrapper.select(&selectors.meta_value).next();
            let (Some(label), Some(value)) = (label, value) else {
                continue;
            };

            let label = stripped_text(label, "").to_lowercase();
            let Some(rule) = self.rules.iter().find(|rule| rule.matcher.matches(&label)) else {
                tracing::trace!("Ignoring meta label {:?} on {}", label, record.source_url);
                continue;
            };

            let value = Some(stripped_text(value, "")).filter(|v| !v.is_empty());
            match rule.field {
                MetaField::PartNumber => record.part_number = value,
                MetaField::Connector => record.connector_designator = value,
                MetaField::Color => record.body_color = value,
            }
        }
    }
}

/// Convenience wrapper using the default label rules
pub fn extract_record(html: &str, page_url: &Url) -> Result<ConnectorRecord> {
    RecordExtractor::default().extract(html, page_url)
}

/// Text nodes of `element`, each trimmed, empties dropped, joined by `separator`
fn stripped_text(element: ElementRef<'_>, separator: &str) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

fn extract_description(document: &Html, selectors: &PageSelectors) -> Option<String> {
    let gallery = document.select(&selectors.gallery).next()?;
    let captions: Vec<String> = gallery
        .select(&selectors.caption)
        .map(|caption| stripped_text(caption, " "))
        .filter(|caption| !caption.is_empty())
        .collect();

    if captions.is_empty() {
        None
    } else {
        Some(captions.join(" "))
    }
}

fn extract_pinout(document: &Html, selectors: &PageSelectors) -> Vec<PinoutRow> {
    let Some(table) = document.select(&selectors.table).next() else {
        return Vec::new();
    };

    let rows: Vec<ElementRef<'_>> = table.select(&selectors.row).collect();
    let Some((header_row, body_rows)) = rows.split_first() else {
        return Vec::new();
    };

    let headers = header_cells(*header_row);
    if headers.is_empty() {
        return Vec::new();
    }

    body_rows
        .iter()
        .filter_map(|row| {
            let cells = child_cells(*row, "td");
            if cells.is_empty() {
                return None;
            }
            Some(if is_unused_row(&cells) {
                unused_row(&headers, cells[0])
            } else {
                data_row(&headers, &cells)
            })
        })
        .collect()
}

/// Header texts of the first row; `td` cells stand in when there is no `th`
fn header_cells(row: ElementRef<'_>) -> Vec<String> {
    let mut cells = child_cells(row, "th");
    if cells.is_empty() {
        cells = child_cells(row, "td");
    }
    cells.into_iter().map(|cell| stripped_text(cell, "")).collect()
}

fn child_cells<'a>(row: ElementRef<'a>, name: &str) -> Vec<ElementRef<'a>> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|cell| cell.value().name() == name)
        .collect()
}

fn is_unused_row(cells: &[ElementRef<'_>]) -> bool {
    cells.len() == 2
        && spans_columns(cells[1])
        && stripped_text(cells[1], "").to_lowercase().contains(UNUSED)
}

/// A colspan we cannot read still counts as a merged cell
fn spans_columns(cell: ElementRef<'_>) -> bool {
    cell.value()
        .attr("colspan")
        .map(|span| span.trim().parse::<u32>().map_or(true, |span| span > 1))
        .unwrap_or(false)
}

fn unused_row(headers: &[String], cavity: ElementRef<'_>) -> PinoutRow {
    let mut row = PinoutRow::new();
    for (index, header) in headers.iter().enumerate() {
        let value = if index == 0 {
            stripped_text(cavity, "")
        } else {
            UNUSED.to_string()
        };
        row.insert(header.as_str(), Some(value));
    }
    row
}

fn data_row(headers: &[String], cells: &[ElementRef<'_>]) -> PinoutRow {
    headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            let value = cells.get(index).map(|cell| stripped_text(*cell, ""));
            (header.as_str(), value)
        })
        .collect()
}

fn extract_images(document: &Html, selectors: &PageSelectors, page_url: &Url) -> Vec<String> {
    document
        .select(&selectors.image)
        .filter_map(|image| image.value().attr("src"))
        .filter_map(|src| resolve_link(src, page_url))
        .filter(has_image_extension)
        .map(String::from)
        .collect()
}
