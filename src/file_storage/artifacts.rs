//! Project-scoped artifact store
//!
//! Records are addressed by `(project id, kind)`. Reads distinguish a missing
//! artifact (`NotFound`) from one that exists but is empty.

use super::{atomic_write, ensure_dir, read_json, write_json};
use crate::error::{AppError, AppResult};
use crate::models::Target;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Artifact kinds stored per project
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactKind {
    /// project.json - Project record
    Project,
    /// metadata.json - Lifecycle metadata
    Metadata,
    /// answers.json - Questionnaire answers
    Answers,
    /// prd.md - Original PRD
    Prd,
    /// prd-refined.md - Refined PRD
    RefinedPrd,
    /// refinements.json - Refinement questions and answers
    Refinements,
    /// docs/{target}/{filename} - Generated documentation file
    DocFile { target: Target, filename: String },
    /// docs/{target}/{filename}.status.json - Generation status sidecar
    DocState { target: Target, filename: String },
}

impl ArtifactKind {
    pub fn doc_file(target: Target, filename: &str) -> Self {
        ArtifactKind::DocFile {
            target,
            filename: filename.to_string(),
        }
    }

    pub fn doc_state(target: Target, filename: &str) -> Self {
        ArtifactKind::DocState {
            target,
            filename: filename.to_string(),
        }
    }

    /// Path of this artifact relative to the project directory
    pub fn relative_path(&self) -> PathBuf {
        match self {
            ArtifactKind::Project => PathBuf::from("project.json"),
            ArtifactKind::Metadata => PathBuf::from("metadata.json"),
            ArtifactKind::Answers => PathBuf::from("answers.json"),
            ArtifactKind::Prd => PathBuf::from("prd.md"),
            ArtifactKind::RefinedPrd => PathBuf::from("prd-refined.md"),
            ArtifactKind::Refinements => PathBuf::from("refinements.json"),
            ArtifactKind::DocFile { target, filename } => {
                Path::new("docs").join(target.as_str()).join(filename)
            }
            ArtifactKind::DocState { target, filename } => Path::new("docs")
                .join(target.as_str())
                .join(format!("{}.status.json", filename)),
        }
    }

    /// Human-readable name used in error messages
    pub fn label(&self) -> String {
        match self {
            ArtifactKind::Project => "Project".to_string(),
            ArtifactKind::Metadata => "Project metadata".to_string(),
            ArtifactKind::Answers => "Project answers".to_string(),
            ArtifactKind::Prd => "PRD".to_string(),
            ArtifactKind::RefinedPrd => "Refined PRD".to_string(),
            ArtifactKind::Refinements => "Refinement questions".to_string(),
            ArtifactKind::DocFile { target, filename } => {
                format!("Generated file {} for {}", filename, target.display_name())
            }
            ArtifactKind::DocState { target, filename } => {
                format!("Generation status of {} for {}", filename, target.display_name())
            }
        }
    }

    fn file_name_segment(&self) -> Option<&str> {
        match self {
            ArtifactKind::DocFile { filename, .. } | ArtifactKind::DocState { filename, .. } => {
                Some(filename)
            }
            _ => None,
        }
    }
}

static SEGMENT_PATTERN: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();

fn segment_pattern() -> AppResult<&'static Regex> {
    SEGMENT_PATTERN
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]{0,127}$"))
        .as_ref()
        .map_err(|e| AppError::Storage(format!("Invalid path pattern: {}", e)))
}

/// Reject identifiers that could escape the project directory
fn check_segment(what: &str, value: &str) -> AppResult<()> {
    if value.contains("..") || !segment_pattern()?.is_match(value) {
        return Err(AppError::validation(format!("Invalid {}: {:?}", what, value)));
    }
    Ok(())
}

fn storage_err(e: String) -> AppError {
    AppError::Storage(e)
}

/// Durable, project-scoped storage of named records
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn projects_dir(&self) -> PathBuf {
        self.root.join("projects")
    }

    pub fn project_dir(&self, project_id: &str) -> AppResult<PathBuf> {
        check_segment("project id", project_id)?;
        Ok(self.projects_dir().join(project_id))
    }

    /// Absolute path of an artifact
    pub fn path(&self, project_id: &str, kind: &ArtifactKind) -> AppResult<PathBuf> {
        if let Some(filename) = kind.file_name_segment() {
            check_segment("filename", filename)?;
        }
        Ok(self.project_dir(project_id)?.join(kind.relative_path()))
    }

    pub fn project_exists(&self, project_id: &str) -> AppResult<bool> {
        Ok(self.path(project_id, &ArtifactKind::Project)?.is_file())
    }

    pub fn exists(&self, project_id: &str, kind: &ArtifactKind) -> AppResult<bool> {
        Ok(self.path(project_id, kind)?.is_file())
    }

    /// Read a text artifact, `None` if it does not exist
    pub fn try_get_text(&self, project_id: &str, kind: &ArtifactKind) -> AppResult<Option<String>> {
        let path = self.path(project_id, kind)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Storage(format!(
                "Failed to read {:?}: {}",
                path, e
            ))),
        }
    }

    /// Read a text artifact, failing with `NotFound` if absent
    pub fn get_text(&self, project_id: &str, kind: &ArtifactKind) -> AppResult<String> {
        self.try_get_text(project_id, kind)?
            .ok_or_else(|| not_found(project_id, kind))
    }

    pub fn put_text(&self, project_id: &str, kind: &ArtifactKind, content: &str) -> AppResult<()> {
        let path = self.path(project_id, kind)?;
        atomic_write(&path, content.as_bytes()).map_err(storage_err)?;
        log::debug!("Wrote {} for project {}", kind.label(), project_id);
        Ok(())
    }

    pub fn try_get_json<T: DeserializeOwned>(
        &self,
        project_id: &str,
        kind: &ArtifactKind,
    ) -> AppResult<Option<T>> {
        let path = self.path(project_id, kind)?;
        if !path.is_file() {
            return Ok(None);
        }
        read_json(&path).map(Some).map_err(storage_err)
    }

    pub fn get_json<T: DeserializeOwned>(&self, project_id: &str, kind: &ArtifactKind) -> AppResult<T> {
        self.try_get_json(project_id, kind)?
            .ok_or_else(|| not_found(project_id, kind))
    }

    pub fn put_json<T: Serialize>(&self, project_id: &str, kind: &ArtifactKind, data: &T) -> AppResult<()> {
        let path = self.path(project_id, kind)?;
        write_json(&path, data).map_err(storage_err)?;
        log::debug!("Wrote {} for project {}", kind.label(), project_id);
        Ok(())
    }

    /// Read-modify-write a JSON artifact under an exclusive file lock
    ///
    /// Serializes concurrent updates of the same record (e.g. two documentation
    /// files finishing at once both registering themselves in the metadata).
    pub fn update_json<T, F>(&self, project_id: &str, kind: &ArtifactKind, update: F) -> AppResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut T) -> AppResult<()>,
    {
        let path = self.path(project_id, kind)?;
        let dir = path
            .parent()
            .ok_or_else(|| AppError::Storage(format!("Invalid artifact path {:?}", path)))?;
        if !dir.is_dir() {
            return Err(not_found(project_id, kind));
        }

        let lock_path = dir.join(format!(
            ".{}.lock",
            path.file_name().and_then(|n| n.to_str()).unwrap_or("artifact")
        ));
        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| AppError::Storage(format!("Failed to open lock {:?}: {}", lock_path, e)))?;
        fs2::FileExt::lock_exclusive(&lock_file)
            .map_err(|e| AppError::Storage(format!("Failed to lock {:?}: {}", lock_path, e)))?;

        // Lock is released when `lock_file` is dropped
        let mut value: T = self.get_json(project_id, kind)?;
        update(&mut value)?;
        self.put_json(project_id, kind, &value)?;
        Ok(value)
    }

    /// Delete a project and every artifact that belongs to it
    pub fn delete_project(&self, project_id: &str) -> AppResult<()> {
        let dir = self.project_dir(project_id)?;
        if !dir.is_dir() {
            return Err(AppError::not_found(format!("Project not found: {}", project_id)));
        }
        fs::remove_dir_all(&dir)
            .map_err(|e| AppError::Storage(format!("Failed to delete {:?}: {}", dir, e)))?;
        log::info!("Deleted project {} and all artifacts", project_id);
        Ok(())
    }

    /// Ids of all projects that have a project record
    pub fn list_project_ids(&self) -> AppResult<Vec<String>> {
        let dir = self.projects_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&dir)
            .map_err(|e| AppError::Storage(format!("Failed to read {:?}: {}", dir, e)))?;

        let mut ids: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().join("project.json").is_file())
            .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
            .collect();
        ids.sort();
        Ok(ids)
    }

    /// Create the data root if needed
    pub fn init(&self) -> AppResult<()> {
        ensure_dir(&self.projects_dir()).map_err(storage_err)
    }
}

fn not_found(project_id: &str, kind: &ArtifactKind) -> AppError {
    AppError::not_found(format!("{} not found for project {}", kind.label(), project_id))
}
