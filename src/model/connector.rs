use crate::model::PinoutRow;
use serde::{Deserialize, Serialize};

/// Everything extracted from one connector page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorRecord {
    /// The page this record was extracted from
    #[serde(rename = "url")]
    pub source_url: String,

    /// Page heading
    pub name: Option<String>,

    /// Manufacturer part number from the meta panel
    #[serde(rename = "tesla_part_number")]
    pub part_number: Option<String>,

    /// Connector housing designator from the meta panel
    #[serde(rename = "connector")]
    pub connector_designator: Option<String>,

    /// Housing color from the meta panel
    #[serde(rename = "color")]
    pub body_color: Option<String>,

    /// Gallery captions, space-joined
    pub description: Option<String>,

    /// Pinout table rows in source order
    #[serde(rename = "pinout_table")]
    pub pinout_rows: Vec<PinoutRow>,

    /// Absolute image URLs in document order
    pub image_urls: Vec<String>,
}

impl ConnectorRecord {
    /// Creates a record with only the source URL set
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            name: None,
            part_number: None,
            connector_designator: None,
            body_color: None,
            description: None,
            pinout_rows: Vec::new(),
            image_urls: Vec::new(),
        }
    }

    /// Number of cavities marked unused
    pub fn unused_cavities(&self) -> usize {
        self.pinout_rows.iter().filter(|row| row.is_unused()).count()
    }
}
