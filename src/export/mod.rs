//! Target-specific export packaging
//!
//! Each target has a manifest of archive entries. Every entry is read and
//! checked to be present and non-empty before the archive is built, so a
//! missing prerequisite fails with `NotFound` naming the first missing item
//! and no partial archive is produced.

use crate::error::{AppError, AppResult};
use crate::file_storage::{ArtifactKind, ArtifactStore};
use crate::models::Target;
use std::fs;
use std::io::{Cursor, ErrorKind, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Static rule template file names in the rule template directory
pub const GENERATE_RULES: &str = "generate.md";
pub const WORKFLOW_RULES: &str = "workflow.md";

/// Where an archive entry's bytes come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportSource {
    /// A project artifact
    Artifact(ArtifactKind),
    /// A file from the shared rule template directory
    RuleTemplate(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportEntry {
    pub archive_path: String,
    pub source: ExportSource,
}

impl ExportEntry {
    fn artifact(archive_path: impl Into<String>, kind: ArtifactKind) -> Self {
        Self {
            archive_path: archive_path.into(),
            source: ExportSource::Artifact(kind),
        }
    }

    fn rule(archive_path: impl Into<String>, name: &'static str) -> Self {
        Self {
            archive_path: archive_path.into(),
            source: ExportSource::RuleTemplate(name),
        }
    }
}

/// A packaged archive ready for download
#[derive(Debug, Clone)]
pub struct ExportArchive {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Suggested download name for a target archive
pub fn archive_filename(target: Target, project_id: &str) -> String {
    format!("{}-project-{}.zip", target.as_str(), project_id)
}

/// Archive entries for a target, refined PRD first
///
/// `registered` lists generated documentation files to include.
pub fn manifest(target: Target, registered: &[String]) -> AppResult<Vec<ExportEntry>> {
    target.require_available()?;

    let mut entries = vec![ExportEntry::artifact("PRD.md", ArtifactKind::RefinedPrd)];
    match target {
        Target::Cursor => {
            entries.push(ExportEntry::rule(".cursor/rules/generate.mdc", GENERATE_RULES));
            entries.push(ExportEntry::rule(".cursor/rules/workflow.mdc", WORKFLOW_RULES));
        }
        Target::Nora => {
            entries.push(ExportEntry::rule(".nora/rules/workflow.mdc", WORKFLOW_RULES));
            for filename in registered {
                entries.push(ExportEntry::artifact(
                    format!("docs/{}", filename),
                    ArtifactKind::doc_file(target, filename),
                ));
            }
        }
        _ => {
            return Err(AppError::validation(format!(
                "Export is not supported for {}",
                target.display_name()
            )))
        }
    }
    Ok(entries)
}

fn read_rule_template(rules_dir: &Path, name: &str) -> AppResult<Option<String>> {
    let path = rules_dir.join(name);
    match fs::read_to_string(&path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(AppError::Storage(format!("Failed to read {:?}: {}", path, e))),
    }
}

/// Read every manifest entry, failing on the first missing or empty one
pub fn collect_entries(
    store: &ArtifactStore,
    rules_dir: &Path,
    project_id: &str,
    entries: &[ExportEntry],
) -> AppResult<Vec<(String, String)>> {
    let mut files = Vec::with_capacity(entries.len());

    for entry in entries {
        let (content, label) = match &entry.source {
            ExportSource::Artifact(kind) => (store.try_get_text(project_id, kind)?, kind.label()),
            ExportSource::RuleTemplate(name) => (
                read_rule_template(rules_dir, name)?,
                format!("Rule template {}", name),
            ),
        };

        match content {
            Some(content) if !content.trim().is_empty() => {
                files.push((entry.archive_path.clone(), content))
            }
            Some(_) => {
                return Err(AppError::not_found(format!(
                    "{} is empty for project {}",
                    label, project_id
                )))
            }
            None => {
                return Err(AppError::not_found(format!(
                    "{} not found for project {}",
                    label, project_id
                )))
            }
        }
    }

    Ok(files)
}

/// Serialize files into an in-memory zip archive
pub fn build_zip(files: &[(String, String)]) -> AppResult<Vec<u8>> {
    let zip_err = |e: zip::result::ZipError| AppError::Storage(format!("Failed to build archive: {}", e));

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (path, content) in files {
        writer.start_file(path.as_str(), options).map_err(zip_err)?;
        writer.write_all(content.as_bytes())?;
    }

    Ok(writer.finish().map_err(zip_err)?.into_inner())
}

/// Validate prerequisites and package a project for a target
pub fn package_for_target(
    store: &ArtifactStore,
    rules_dir: &Path,
    project_id: &str,
    target: Target,
    registered: &[String],
) -> AppResult<ExportArchive> {
    let entries = manifest(target, registered)?;
    let files = collect_entries(store, rules_dir, project_id, &entries)?;
    let bytes = build_zip(&files)?;

    log::info!(
        "Packaged {} files for {} (project {}, {} bytes)",
        files.len(),
        target.display_name(),
        project_id,
        bytes.len()
    );

    Ok(ExportArchive {
        filename: archive_filename(target, project_id),
        bytes,
    })
}
