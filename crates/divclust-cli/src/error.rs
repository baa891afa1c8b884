//! Error types for divclust-cli

use divclust::DivclustError;
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

/// Result type alias for CLI operations
pub(crate) type Result<T> = std::result::Result<T, CliError>;

/// CLI error types
#[derive(Error, Debug)]
pub(crate) enum CliError {
    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Not a file (e.g., directory)
    #[error("Not a file: {0}")]
    NotAFile(PathBuf),

    /// Malformed CSV, config or flag value
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Clustering failed
    #[error("Clustering error: {0}")]
    Divclust(String),
}

impl CliError {
    /// Get exit code for this error
    pub(crate) fn exit_code(&self) -> ExitCode {
        match self {
            Self::FileNotFound(_) | Self::NotAFile(_) => ExitCode::from(3),
            Self::InvalidInput(_) => ExitCode::from(4),
            Self::Io(_) => ExitCode::from(7),
            Self::Divclust(_) => ExitCode::from(1),
        }
    }
}

impl From<DivclustError> for CliError {
    fn from(e: DivclustError) -> Self {
        match e {
            DivclustError::InvalidInput { .. } | DivclustError::InvalidHyperparameter { .. } => {
                Self::InvalidInput(e.to_string())
            }
            other => Self::Divclust(other.to_string()),
        }
    }
}

impl From<csv::Error> for CliError {
    fn from(e: csv::Error) -> Self {
        Self::InvalidInput(format!("CSV: {e}"))
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::InvalidInput(format!("JSON: {e}"))
    }
}
