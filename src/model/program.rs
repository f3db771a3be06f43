use crate::model::ConnectorRecord;
use serde::{Deserialize, Serialize};

/// Static identity of one program (vehicle model + production revision)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramDescriptor {
    pub model: String,

    #[serde(rename = "prog_id")]
    pub program_id: String,

    /// Stage-of-production tag
    #[serde(rename = "sop")]
    pub stage_tag: String,

    /// Build-date ranges, in configured order
    #[serde(rename = "build_information")]
    pub build_info: Vec<String>,
}

impl ProgramDescriptor {
    /// Short label used in logs, e.g. `Model3/prog-18`
    pub fn label(&self) -> String {
        format!("{}/{}", self.model, self.program_id)
    }
}

/// The per-program output document
///
/// The descriptor's fields are flattened into the top-level object so the
/// written file reads `model, prog_id, sop, build_information, connectors`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramDocument {
    #[serde(flatten)]
    pub descriptor: ProgramDescriptor,

    pub connectors: Vec<ConnectorRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PinoutRow;

    fn sample_document() -> ProgramDocument {
        let mut record = ConnectorRecord::new("https://example.com/c/x001/index.html");
        record.name = Some("X001 - Body Controller".to_string());
        record.part_number = Some("1234567-00-A".to_string());
        record.pinout_rows = vec![
            vec![
                ("Cavity", Some("1".to_string())),
                ("Wire Color", Some("BK".to_string())),
                ("Terminal Manufacturer", None),
            ]
            .into_iter()
            .collect::<PinoutRow>(),
            vec![
                ("Cavity", Some("2".to_string())),
                ("Wire Color", Some("unused".to_string())),
                ("Terminal Manufacturer", Some("unused".to_string())),
            ]
            .into_iter()
            .collect::<PinoutRow>(),
        ];
        record.image_urls = vec!["https://example.com/img/x001.png".to_string()];

        ProgramDocument {
            descriptor: ProgramDescriptor {
                model: "Model3".to_string(),
                program_id: "prog-18".to_string(),
                stage_tag: "SOP1".to_string(),
                build_info: vec!["2017-07 to 2018-12".to_string()],
            },
            connectors: vec![record],
        }
    }

    #[test]
    fn test_document_round_trip() {
        let document = sample_document();
        let json = serde_json::to_string_pretty(&document).unwrap();
        let parsed: ProgramDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, document);
    }

    #[test]
    fn test_document_top_level_key_order() {
        let json = serde_json::to_string(&sample_document()).unwrap();
        let model = json.find("\"model\"").unwrap();
        let prog_id = json.find("\"prog_id\"").unwrap();
        let sop = json.find("\"sop\"").unwrap();
        let build = json.find("\"build_information\"").unwrap();
        let connectors = json.find("\"connectors\"").unwrap();

        assert!(model < prog_id && prog_id < sop && sop < build && build < connectors);
    }

    #[test]
    fn test_null_fields_are_written() {
        let json = serde_json::to_string(&sample_document()).unwrap();
        assert!(json.contains("\"color\":null"));
        assert!(json.contains("\"Terminal Manufacturer\":null"));
    }

    #[test]
    fn test_label() {
        assert_eq!(sample_document().descriptor.label(), "Model3/prog-18");
    }
}
