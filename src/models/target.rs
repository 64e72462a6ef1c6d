// Downstream AI coding tool profiles

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A downstream AI coding tool that projects can be exported to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Target {
    Cursor,
    Nora,
    Windsurf,
    V0,
    Lovable,
    ClaudeCode,
}

const NORA_DOC_FILES: &[&str] = &[
    "Implementation.md",
    "project_structure.md",
    "UI_UX_doc.md",
    "Bug_tracking.md",
];

impl Target {
    /// Get all known targets, available ones first
    pub fn all() -> &'static [Target] {
        &[
            Target::Cursor,
            Target::Nora,
            Target::Windsurf,
            Target::V0,
            Target::Lovable,
            Target::ClaudeCode,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Target::Cursor => "cursor",
            Target::Nora => "nora",
            Target::Windsurf => "windsurf",
            Target::V0 => "v0",
            Target::Lovable => "lovable",
            Target::ClaudeCode => "claude-code",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Target::Cursor => "Cursor",
            Target::Nora => "Nora",
            Target::Windsurf => "Windsurf",
            Target::V0 => "v0",
            Target::Lovable => "Lovable",
            Target::ClaudeCode => "Claude Code",
        }
    }

    /// Whether projects can currently be selected for and exported to this target
    pub fn is_available(&self) -> bool {
        matches!(self, Target::Cursor | Target::Nora)
    }

    /// Fixed allow-list of documentation files that can be generated for this target
    pub fn doc_files(&self) -> &'static [&'static str] {
        match self {
            Target::Nora => NORA_DOC_FILES,
            _ => &[],
        }
    }

    /// Validate that `filename` may be generated for this target
    pub fn check_doc_file(&self, filename: &str) -> AppResult<()> {
        let allowed = self.doc_files();
        if allowed.is_empty() {
            return Err(AppError::validation(format!(
                "Documentation generation is not supported for {}",
                self.display_name()
            )));
        }
        if !allowed.contains(&filename) {
            return Err(AppError::validation(format!(
                "'{}' is not a documentation file for {} (expected one of: {})",
                filename,
                self.display_name(),
                allowed.join(", ")
            )));
        }
        Ok(())
    }

    /// Fail unless the target is available for selection and export
    pub fn require_available(&self) -> AppResult<()> {
        if self.is_available() {
            Ok(())
        } else {
            Err(AppError::validation(format!(
                "{} support is coming soon",
                self.display_name()
            )))
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Target {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Target::all()
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AppError::validation(format!("Unknown target: {}", s)))
    }
}

/// Entry describing one target for listing endpoints
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetInfo {
    pub id: Target,
    pub name: &'static str,
    pub available: bool,
    pub doc_files: Vec<&'static str>,
}

impl From<Target> for TargetInfo {
    fn from(target: Target) -> Self {
        Self {
            id: target,
            name: target.display_name(),
            available: target.is_available(),
            doc_files: target.doc_files().to_vec(),
        }
    }
}
