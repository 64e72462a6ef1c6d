// Error taxonomy shared by every command

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed input, unsupported target/filename, incomplete answers
    #[error("{0}")]
    Validation(String),

    /// A referenced artifact or project does not exist
    #[error("{0}")]
    NotFound(String),

    /// The language model call failed or returned a non-success status
    #[error("Language model request failed: {0}")]
    Upstream(String),

    /// Model output could not be decoded into the expected shape
    #[error("Failed to parse model output: {0}")]
    Parse(String),

    /// Underlying read/write failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// A prompt or document template could not be resolved or rendered
    #[error("Template error: {0}")]
    Template(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    /// True for errors caused by the caller rather than the service
    pub fn is_client_error(&self) -> bool {
        matches!(self, AppError::Validation(_) | AppError::NotFound(_))
    }

    /// Short machine-readable kind, used in HTTP error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation",
            AppError::NotFound(_) => "not_found",
            AppError::Upstream(_) => "upstream",
            AppError::Parse(_) => "parse",
            AppError::Storage(_) => "storage",
            AppError::Template(_) => "template",
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Storage(e.to_string())
    }
}
