use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::model::{PackageIdentifier, ParseIdentifierError};
use crate::transfer::DownloadError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PackageError {
    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error("Failed to {operation} {path:?}: {message}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        message: String,
    },

    #[error("Cannot determine engine version from {path:?}: {message}")]
    EngineVersion { path: PathBuf, message: String },

    #[error("Refusing to operate on {id}: {message}")]
    InvalidIdentifier { id: String, message: String },
}

impl PackageError {
    pub(crate) fn io(
        operation: &'static str,
        path: &Path,
        error: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Io {
            operation,
            path: path.to_path_buf(),
            message: format!("{:#}", error.into()),
        }
    }

    pub(crate) fn invalid_identifier(id: &PackageIdentifier, error: ParseIdentifierError) -> Self {
        Self::InvalidIdentifier {
            id: id.to_string(),
            message: error.to_string(),
        }
    }

    pub(crate) fn engine_version(path: &Path, message: impl Into<String>) -> Self {
        Self::EngineVersion {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}
