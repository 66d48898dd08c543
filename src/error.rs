use std::path::PathBuf;
use std::process::ExitCode;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Usage: {0}")]
    Usage(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Collector {collector} failed: {reason}")]
    Collector { collector: String, reason: String },

    #[error("Filesystem error at {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// Process exit status for this failure. Usage errors are distinguished
    /// from run failures so wrapper scripts can tell them apart.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Usage(_) => 2,
            _ => 1,
        }
    }
}

impl From<&AppError> for ExitCode {
    fn from(error: &AppError) -> Self {
        ExitCode::from(error.exit_code())
    }
}

pub type AppResult<T> = Result<T, AppError>;
