//! Pinout table rows
//!
//! A row maps column headers to cell values. Key order follows header order
//! so that written files diff cleanly.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One row of a pinout table, keyed by column header
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PinoutRow(IndexMap<String, Option<String>>);

impl PinoutRow {
    /// Creates an empty row
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `header` to `value`; a repeated header keeps its first position
    pub fn insert(&mut self, header: impl Into<String>, value: Option<String>) {
        self.0.insert(header.into(), value);
    }

    /// Returns the cell for `header`
    ///
    /// The outer `Option` is `None` when the header is not part of the row;
    /// the inner one is `None` when the source cell was absent.
    pub fn get(&self, header: &str) -> Option<Option<&str>> {
        self.0.get(header).map(Option::as_deref)
    }

    /// Header keys in column order
    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when every non-first column holds the literal `"unused"`
    pub fn is_unused(&self) -> bool {
        self.0.len() > 1
            && self
                .0
                .values()
                .skip(1)
                .all(|value| value.as_deref() == Some("unused"))
    }
}

impl<K: Into<String>> FromIterator<(K, Option<String>)> for PinoutRow {
    fn from_iter<I: IntoIterator<Item = (K, Option<String>)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(header, value)| (header.into(), value))
                .collect(),
        )
    }
}
