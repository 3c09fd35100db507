//! Package management module
//!
//! Installs releases from the download cache into the install root, removes
//! them again and keeps the in-memory index of what is installed.

mod discovery;
mod engine;
mod error;
mod layout;

pub use discovery::scan_install_root;
pub use engine::detect_engine_version;
pub use error::PackageError;
pub use layout::{cache_path, install_path};

use log::debug;
use semver::Version;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use crate::archive::{ArchiveExtractor, ArchiveExtractorImpl};
use crate::model::{PackageIdentifier, ReleaseDescriptor};
use crate::progress::ProgressSink;
use crate::runtime::Runtime;
use crate::transfer::{TransferEngine, TransferOutcome};

/// How an install that did not fail ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed,
    Cancelled,
}

pub struct PackageManager<R: Runtime> {
    runtime: R,
    cache_root: PathBuf,
    install_root: PathBuf,
    transfer: TransferEngine,
    extractor: ArchiveExtractorImpl,
    installed: RwLock<HashSet<PackageIdentifier>>,
}

impl<R: Runtime> PackageManager<R> {
    /// Creates a manager and seeds its index from the install root.
    pub fn new(
        runtime: R,
        cache_root: impl Into<PathBuf>,
        install_root: impl Into<PathBuf>,
        transfer: TransferEngine,
    ) -> Self {
        let cache_root = cache_root.into();
        let install_root = install_root.into();
        let installed = scan_install_root(&runtime, &install_root);
        Self {
            runtime,
            cache_root,
            install_root,
            transfer,
            extractor: ArchiveExtractorImpl::new(),
            installed: RwLock::new(installed),
        }
    }

    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    pub fn install_root(&self) -> &Path {
        &self.install_root
    }

    pub fn install_path(&self, id: &PackageIdentifier) -> PathBuf {
        install_path(&self.install_root, id)
    }

    pub fn cache_path(&self, id: &PackageIdentifier) -> PathBuf {
        cache_path(&self.cache_root, id)
    }

    /// Snapshot of the installed packages.
    pub fn installed_packages(&self) -> HashSet<PackageIdentifier> {
        self.installed
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_installed(&self, id: &PackageIdentifier) -> bool {
        self.installed
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(id)
    }

    /// Downloads the release into the cache unless it is already there, then
    /// extracts it into its install path.
    ///
    /// The index only changes when the whole install succeeds.
    #[tracing::instrument(skip(self, sink), fields(id = %release.id()))]
    pub async fn install<S>(
        &self,
        release: &ReleaseDescriptor,
        sink: &S,
    ) -> Result<InstallOutcome, PackageError>
    where
        S: ProgressSink + ?Sized,
    {
        let id = release.id();
        let destination = self.checked_install_path(id)?;
        let archive = self.cache_path(id);

        if self.runtime.exists(&archive) {
            debug!("Using cached archive {:?}", archive);
        } else {
            let outcome = self
                .transfer
                .fetch(&self.runtime, release, &self.cache_root, sink)
                .await?;
            if outcome == TransferOutcome::Cancelled {
                debug!("Install of {} cancelled during download", id);
                return Ok(InstallOutcome::Cancelled);
            }
        }

        if sink.is_cancelled() {
            debug!("Install of {} cancelled before extraction", id);
            return Ok(InstallOutcome::Cancelled);
        }

        sink.notify();
        self.extractor
            .extract(&self.runtime, &archive, &destination)
            .map_err(|e| PackageError::io("extract", &destination, e))?;

        self.installed
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone());
        debug!("Installed {} into {:?}", id, destination);
        Ok(InstallOutcome::Installed)
    }

    /// Deletes the install path of `id` and drops it from the index.
    ///
    /// A failure midway leaves whatever was not yet deleted in place and the
    /// index untouched. An already missing install path counts as removed.
    #[tracing::instrument(skip(self), fields(id = %id))]
    pub fn remove(&self, id: &PackageIdentifier) -> Result<(), PackageError> {
        let path = self.checked_install_path(id)?;

        if self.runtime.exists(&path) || self.runtime.is_symlink(&path) {
            delete_tree(&self.runtime, &path)?;
        } else {
            debug!("Install path {:?} already gone", path);
        }

        self.installed
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);
        debug!("Removed {}", id);
        Ok(())
    }

    /// Engine version of an installed package, read from its engine jar.
    pub fn engine_version(&self, id: &PackageIdentifier) -> Result<Option<Version>, PackageError> {
        detect_engine_version(&self.runtime, &self.checked_install_path(id)?)
    }

    /// Install path of `id`, refusing core versions that would escape their
    /// own leaf directory.
    fn checked_install_path(&self, id: &PackageIdentifier) -> Result<PathBuf, PackageError> {
        id.validate()
            .map_err(|e| PackageError::invalid_identifier(id, e))?;
        Ok(self.install_path(id))
    }
}

/// Deletes `path` bottom-up. Symlinks are unlinked, never followed.
fn delete_tree<R: Runtime>(runtime: &R, path: &Path) -> Result<(), PackageError> {
    if !runtime.is_symlink(path) && runtime.is_dir(path) {
        let children = runtime
            .read_dir(path)
            .map_err(|e| PackageError::io("read directory", path, e))?;
        for child in children {
            delete_tree(runtime, &child)?;
        }
        runtime
            .remove_dir(path)
            .map_err(|e| PackageError::io("remove directory", path, e))
    } else {
        runtime
            .remove_file(path)
            .map_err(|e| PackageError::io("remove file", path, e))
    }
}
