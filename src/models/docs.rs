// Generated documentation file records

use super::Target;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocStatus {
    NotGenerated,
    Generating,
    Generated,
    Error,
}

impl Default for DocStatus {
    fn default() -> Self {
        DocStatus::NotGenerated
    }
}

/// Status sidecar stored next to each generated file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocFileState {
    pub status: DocStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl DocFileState {
    pub fn with_status(status: DocStatus, now: DateTime<Utc>) -> Self {
        Self {
            status,
            error_message: None,
            updated_at: Some(now),
        }
    }

    pub fn failed(message: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            status: DocStatus::Error,
            error_message: Some(message.into()),
            updated_at: Some(now),
        }
    }
}

/// One generated file as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedDocFile {
    pub target: Target,
    pub filename: String,
    pub status: DocStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Result of a successful generation: the file plus the updated registry
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocGenerationResult {
    pub file: GeneratedDocFile,
    pub generated_files: Vec<String>,
}
