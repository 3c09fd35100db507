//! Verified, cancellable downloads into a destination file.
//!
//! A transfer writes into `<destination>.part` and renames it onto the
//! destination only after the byte count matches the advertised length, so
//! the final path either holds a complete file or nothing.

mod error;

pub use error::DownloadError;

use log::debug;
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::http::HttpClient;
use crate::model::RemoteResource;
use crate::progress::ProgressSink;
use crate::runtime::Runtime;

pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024;

/// How a transfer that did not fail ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    Completed,
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct TransferEngine {
    http: HttpClient,
    chunk_size: usize,
}

impl TransferEngine {
    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Sets the write granularity. Cancellation is polled around each write.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Downloads `resource` into `directory`, under its own file name.
    pub async fn fetch<T, R, S>(
        &self,
        runtime: &R,
        resource: &T,
        directory: &Path,
        sink: &S,
    ) -> Result<TransferOutcome, DownloadError>
    where
        T: RemoteResource + ?Sized,
        R: Runtime,
        S: ProgressSink + ?Sized,
    {
        let destination = directory.join(resource.file_name());
        debug!("Fetching {} into {:?}", resource.info(), destination);
        self.transfer(runtime, resource.url(), &destination, sink)
            .await
    }

    /// Downloads `url` to `destination`.
    ///
    /// Reports 0 before the body is read, 1..=99 after each chunk and 100
    /// once the file is in place. A cancelled transfer leaves its `.part`
    /// file behind and never touches `destination`.
    #[tracing::instrument(skip(self, runtime, sink))]
    pub async fn transfer<R, S>(
        &self,
        runtime: &R,
        url: &str,
        destination: &Path,
        sink: &S,
    ) -> Result<TransferOutcome, DownloadError>
    where
        R: Runtime,
        S: ProgressSink + ?Sized,
    {
        let expected = self
            .http
            .content_length(url)
            .await
            .map_err(|e| DownloadError::transfer_failed(url, e))?
            .ok_or_else(|| DownloadError::TransferFailed {
                url: url.to_string(),
                message: "HEAD request returned no Content-Length header".to_string(),
            })?;

        let parent = match destination.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if !runtime.exists(&parent) {
            runtime
                .create_dir_all(&parent)
                .map_err(|e| DownloadError::io(&parent, e))?;
        }

        let available = runtime
            .available_space(&parent)
            .map_err(|e| DownloadError::io(&parent, e))?;
        if expected > available {
            return Err(DownloadError::InsufficientSpace {
                url: url.to_string(),
                required: expected,
                available,
            });
        }

        let part = part_path(destination);
        if runtime.exists(&part) {
            debug!("Removing stale partial download {:?}", part);
            runtime
                .remove_file(&part)
                .map_err(|e| DownloadError::io(&part, e))?;
        }

        sink.notify_percent(0);
        if sink.is_cancelled() {
            debug!("Transfer of {} cancelled before start", url);
            return Ok(TransferOutcome::Cancelled);
        }

        let mut response = self
            .http
            .get(url)
            .await
            .map_err(|e| DownloadError::transfer_failed(url, e))?;
        let mut file = runtime
            .create_file(&part)
            .map_err(|e| DownloadError::io(&part, e))?;

        let mut written: u64 = 0;
        while let Some(bytes) = response
            .chunk()
            .await
            .map_err(|e| DownloadError::transfer_failed(url, e))?
        {
            for piece in bytes.chunks(self.chunk_size) {
                if sink.is_cancelled() {
                    debug!("Transfer of {} cancelled after {} bytes", url, written);
                    return Ok(TransferOutcome::Cancelled);
                }
                file.write_all(piece)
                    .map_err(|e| DownloadError::io(&part, e))?;
                written += piece.len() as u64;
                sink.notify_percent(running_percent(written, expected));
                if sink.is_cancelled() {
                    debug!("Transfer of {} cancelled after {} bytes", url, written);
                    return Ok(TransferOutcome::Cancelled);
                }
            }
        }

        file.flush().map_err(|e| DownloadError::io(&part, e))?;
        drop(file);

        if written != expected {
            return Err(DownloadError::VerificationFailed {
                url: url.to_string(),
                expected,
                written,
            });
        }

        runtime
            .rename(&part, destination)
            .map_err(|e| DownloadError::io(destination, e))?;
        sink.notify_percent(100);

        debug!("Downloaded {} bytes from {} to {:?}", written, url, destination);
        Ok(TransferOutcome::Completed)
    }
}

/// `<destination>.part`, next to the destination.
pub fn part_path(destination: &Path) -> PathBuf {
    let mut name = OsString::from(destination.as_os_str());
    name.push(".part");
    PathBuf::from(name)
}

/// Percentage while bytes are still flowing. Never 0 or 100: those mark the
/// start and the completed rename.
fn running_percent(written: u64, expected: u64) -> u8 {
    if expected == 0 {
        return 99;
    }
    let percent = (written as u128 * 100 / expected as u128).clamp(1, 99);
    percent as u8
}
