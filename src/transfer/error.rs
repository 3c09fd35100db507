use std::path::{Path, PathBuf};
use thiserror::Error;

/// Why a transfer did not produce its destination file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DownloadError {
    #[error(
        "Not enough free space to download {url}: {required} bytes required, {available} available"
    )]
    InsufficientSpace {
        url: String,
        required: u64,
        available: u64,
    },

    #[error("Failed to download {url}: {message}")]
    TransferFailed { url: String, message: String },

    #[error("Download of {url} is incomplete: expected {expected} bytes, received {written}")]
    VerificationFailed {
        url: String,
        expected: u64,
        written: u64,
    },

    #[error("I/O error on {path:?}: {message}")]
    Io { path: PathBuf, message: String },
}

impl DownloadError {
    pub(crate) fn transfer_failed(url: &str, error: impl Into<anyhow::Error>) -> Self {
        Self::TransferFailed {
            url: url.to_string(),
            message: format!("{:#}", error.into()),
        }
    }

    pub(crate) fn io(path: &Path, error: impl Into<anyhow::Error>) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            message: format!("{:#}", error.into()),
        }
    }
}
