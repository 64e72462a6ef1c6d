//! File-based storage for PRD Rails
//!
//! Every project lives in its own directory under the data root:
//!
//! - `projects/{id}/project.json` - Project record
//! - `projects/{id}/metadata.json` - Lifecycle metadata
//! - `projects/{id}/answers.json` - Questionnaire answers
//! - `projects/{id}/prd.md` / `prd-refined.md` - Original and refined PRD
//! - `projects/{id}/refinements.json` - Refinement questions and answers
//! - `projects/{id}/docs/{target}/{filename}` - Generated documentation files
//!
//! Each artifact is written atomically on its own; there is no cross-artifact
//! transaction.

pub mod artifacts;

pub use artifacts::{ArtifactKind, ArtifactStore};

use std::fs;
use std::path::{Path, PathBuf};

/// Common file operations result type
pub type FileResult<T> = Result<T, String>;

/// Get the default data directory in the user's home
pub fn get_default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".prd-rails")
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> FileResult<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .map_err(|e| format!("Failed to create directory {:?}: {}", path, e))?;
    }
    Ok(())
}

/// Write data to a file atomically (unique temp file + rename)
///
/// The temp name is unique per call, so concurrent writers to the same path
/// never share a temp file; the last rename wins.
pub fn atomic_write(path: &Path, content: &[u8]) -> FileResult<()> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| format!("Invalid file path {:?}", path))?;
    let temp_path = path.with_file_name(format!(".{}.{}.tmp", file_name, uuid::Uuid::new_v4()));

    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    fs::write(&temp_path, content)
        .map_err(|e| format!("Failed to write temp file {:?}: {}", temp_path, e))?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        format!("Failed to rename {:?} to {:?}: {}", temp_path, path, e)
    })?;

    Ok(())
}

/// Read a JSON file and deserialize it
pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> FileResult<T> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read file {:?}: {}", path, e))?;

    serde_json::from_str(&content)
        .map_err(|e| format!("Failed to parse JSON from {:?}: {}", path, e))
}

/// Write data as pretty-printed JSON atomically
pub fn write_json<T: serde::Serialize>(path: &Path, data: &T) -> FileResult<()> {
    let content = serde_json::to_string_pretty(data)
        .map_err(|e| format!("Failed to serialize to JSON: {}", e))?;

    atomic_write(path, content.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_dir() {
        let temp_dir = TempDir::new().unwrap();
        let nested_path = temp_dir.path().join("a").join("b").join("c");

        assert!(!nested_path.exists());
        ensure_dir(&nested_path).unwrap();
        assert!(nested_path.exists());
    }

    #[test]
    fn test_atomic_write_leaves_no_temp_files() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("nested").join("prd.md");

        atomic_write(&file_path, b"# PRD").unwrap();
        atomic_write(&file_path, b"# PRD v2").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "# PRD v2");
        let leftovers: Vec<_> = fs::read_dir(file_path.parent().unwrap())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_concurrent_writes_never_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("answers.json");

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let path = file_path.clone();
                std::thread::spawn(move || {
                    let body = format!("{{\"writer\":{},\"pad\":\"{}\"}}", i, "x".repeat(4096));
                    atomic_write(&path, body.as_bytes()).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let value: serde_json::Value = read_json(&file_path).unwrap();
        assert!(value["writer"].as_u64().unwrap() < 8);
    }

    #[test]
    fn test_read_write_json() {
        use serde::{Deserialize, Serialize};

        #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
        struct TestData {
            name: String,
            value: i32,
        }

        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test.json");

        let data = TestData {
            name: "test".to_string(),
            value: 42,
        };

        write_json(&file_path, &data).unwrap();
        let read_data: TestData = read_json(&file_path).unwrap();

        assert_eq!(data, read_data);
    }
}
