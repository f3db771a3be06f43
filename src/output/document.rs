//! Program document assembly and persistence
//!
//! Documents are written to a temporary file next to their destination and
//! renamed into place, so a reader sees either the previous file or the new
//! one, never a partial write.

use crate::model::{ConnectorRecord, ProgramDescriptor, ProgramDocument};
use crate::{CrawlError, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Packages a program's descriptor with its collected records
pub fn assemble(descriptor: ProgramDescriptor, records: Vec<ConnectorRecord>) -> ProgramDocument {
    ProgramDocument {
        descriptor,
        connectors: records,
    }
}

/// Output file for a program inside `directory`: `{model}_{prog_id}.json`
pub fn document_path(directory: &Path, descriptor: &ProgramDescriptor) -> PathBuf {
    directory.join(format!("{}_{}.json", descriptor.model, descriptor.program_id))
}

/// Writes `document` as pretty-printed JSON, replacing `path` atomically
///
/// Missing parent directories are created.
///
/// # Errors
///
/// `CrawlError::Persist` for any filesystem failure, `CrawlError::Json` if
/// serialization fails.
pub fn persist_document(document: &ProgramDocument, path: &Path) -> Result<()> {
    let mut json = serde_json::to_vec_pretty(document)?;
    json.push(b'\n');
    write_atomically(path, &json)
}

/// Reads a document written by [`persist_document`]
pub fn load_document(path: &Path) -> Result<ProgramDocument> {
    let content = std::fs::read_to_string(path).map_err(|source| persist_error(path, source))?;
    Ok(serde_json::from_str(&content)?)
}

/// Writes `bytes` to a sibling temp file, syncs it, and renames it over `path`
pub fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(directory).map_err(|source| persist_error(directory, source))?;

    let mut file = NamedTempFile::new_in(directory).map_err(|source| persist_error(path, source))?;
    file.write_all(bytes)
        .and_then(|_| file.as_file().sync_all())
        .map_err(|source| persist_error(path, source))?;

    file.persist(path)
        .map_err(|e| persist_error(path, e.error))?;

    tracing::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

fn persist_error(path: &Path, source: std::io::Error) -> CrawlError {
    CrawlError::Persist {
        path: path.display().to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PinoutRow;
    use tempfile::tempdir;

    fn descriptor() -> ProgramDescriptor {
        ProgramDescriptor {
            model: "ModelY".to_string(),
            program_id: "prog-201".to_string(),
            stage_tag: "SOP2".to_string(),
            build_info: vec!["Austin 2022-04 onward".to_string()],
        }
    }

    fn record(name: &str) -> ConnectorRecord {
        let mut record = ConnectorRecord::new(format!("https://example.com/c/{}/index.html", name));
        record.name = Some(name.to_string());
        record.pinout_rows = vec![vec![
            ("Cavity", Some("1".to_string())),
            ("Wire Color", None),
        ]
        .into_iter()
        .collect::<PinoutRow>()];
        record
    }

    #[test]
    fn test_assemble_keeps_descriptor_and_order() {
        let document = assemble(descriptor(), vec![record("x001"), record("x002")]);
        assert_eq!(document.descriptor, descriptor());
        assert_eq!(document.connectors[0].name.as_deref(), Some("x001"));
        assert_eq!(document.connectors[1].name.as_deref(), Some("x002"));
    }

    #[test]
    fn test_document_path() {
        let path = document_path(Path::new("/data"), &descriptor());
        assert_eq!(path, PathBuf::from("/data/ModelY_prog-201.json"));
    }

    #[test]
    fn test_persist_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/out/ModelY_prog-201.json");
        let document = assemble(descriptor(), vec![record("x001")]);

        persist_document(&document, &path).unwrap();
        let loaded = load_document(&path).unwrap();

        assert_eq!(loaded, document);
    }

    #[test]
    fn test_persist_overwrites_wholesale() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.json");

        persist_document(&assemble(descriptor(), vec![record("a"), record("b")]), &path).unwrap();
        persist_document(&assemble(descriptor(), vec![record("c")]), &path).unwrap();

        let loaded = load_document(&path).unwrap();
        assert_eq!(loaded.connectors.len(), 1);
        assert_eq!(loaded.connectors[0].name.as_deref(), Some("c"));
    }

    #[test]
    fn test_persist_leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.json");
        persist_document(&assemble(descriptor(), vec![]), &path).unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("doc.json")]);
    }

    #[test]
    fn test_written_file_is_pretty_utf8() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.json");
        let mut connector = record("x001");
        connector.description = Some("Vue arrière – côté faisceau".to_string());
        persist_document(&assemble(descriptor(), vec![connector]), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\n  \"model\": \"ModelY\""));
        assert!(content.contains("Vue arrière – côté faisceau"));
        assert!(content.ends_with("}\n"));
    }

    #[test]
    fn test_persist_failure_is_reported() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();

        let result = persist_document(&assemble(descriptor(), vec![]), &blocker.join("doc.json"));
        assert!(matches!(result, Err(CrawlError::Persist { .. })));
    }
}
