use log::debug;
use std::path::{Path, PathBuf};

use super::RuntimeArtefact;
use crate::archive::{ArchiveExtractor, ArchiveExtractorImpl};
use crate::model::RemoteResource;
use crate::package::{InstallOutcome, PackageError};
use crate::progress::ProgressSink;
use crate::runtime::Runtime;
use crate::transfer::{TransferEngine, TransferOutcome};

/// Downloads managed runtimes into the cache and unpacks them into
/// `<runtimes_root>/<major>/<os>-<arch>/`.
pub struct RuntimeInstaller<R: Runtime> {
    runtime: R,
    cache_root: PathBuf,
    runtimes_root: PathBuf,
    transfer: TransferEngine,
    extractor: ArchiveExtractorImpl,
}

impl<R: Runtime> RuntimeInstaller<R> {
    pub fn new(
        runtime: R,
        cache_root: impl Into<PathBuf>,
        runtimes_root: impl Into<PathBuf>,
        transfer: TransferEngine,
    ) -> Self {
        Self {
            runtime,
            cache_root: cache_root.into(),
            runtimes_root: runtimes_root.into(),
            transfer,
            extractor: ArchiveExtractorImpl::new(),
        }
    }

    pub fn runtimes_root(&self) -> &Path {
        &self.runtimes_root
    }

    /// Where `artefact` is (or would be) unpacked.
    pub fn runtime_home(&self, artefact: &RuntimeArtefact) -> PathBuf {
        self.runtimes_root
            .join(artefact.major_version.to_string())
            .join(artefact.platform.dir_name())
    }

    pub fn is_installed(&self, artefact: &RuntimeArtefact) -> bool {
        self.runtime.is_dir(&self.runtime_home(artefact))
    }

    #[tracing::instrument(skip(self, sink), fields(runtime = %artefact))]
    pub async fn install<S>(
        &self,
        artefact: &RuntimeArtefact,
        sink: &S,
    ) -> Result<InstallOutcome, PackageError>
    where
        S: ProgressSink + ?Sized,
    {
        let archive = self.cache_root.join(artefact.file_name());

        if self.runtime.exists(&archive) {
            debug!("Using cached runtime archive {:?}", archive);
        } else {
            let outcome = self
                .transfer
                .fetch(&self.runtime, artefact, &self.cache_root, sink)
                .await?;
            if outcome == TransferOutcome::Cancelled {
                return Ok(InstallOutcome::Cancelled);
            }
        }

        if sink.is_cancelled() {
            return Ok(InstallOutcome::Cancelled);
        }

        let home = self.runtime_home(artefact);
        sink.notify();
        self.extractor
            .extract(&self.runtime, &archive, &home)
            .map_err(|e| PackageError::io("extract", &home, e))?;

        debug!("Installed {} into {:?}", artefact, home);
        Ok(InstallOutcome::Installed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpClient;
    use crate::platform::{Arch, Os, Platform};
    use crate::progress::ProgressHandle;
    use crate::runtime::RealRuntime;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn jre_tar_gz() -> Vec<u8> {
        let enc = GzEncoder::new(Vec::new(), Compression::default());
        let mut tar = tar::Builder::new(enc);
        let content = b"#!/bin/sh\necho java";
        let mut header = tar::Header::new_gnu();
        header.set_path("jdk-17.0.9+9-jre/bin/java").unwrap();
        header.set_size(content.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        tar.append(&header, &content[..]).unwrap();
        tar.into_inner().unwrap().finish().unwrap()
    }

    fn installer(dir: &TempDir) -> RuntimeInstaller<RealRuntime> {
        RuntimeInstaller::new(
            RealRuntime,
            dir.path().join("cache"),
            dir.path().join("runtimes"),
            TransferEngine::new(HttpClient::new(reqwest::Client::new())),
        )
    }

    fn linux_artefact(url: String) -> RuntimeArtefact {
        RuntimeArtefact::new(17, Platform::new(Os::Linux, Arch::X64), url, "unused")
    }

    #[test]
    fn test_runtime_home_layout() {
        let dir = tempdir().unwrap();
        let installer = installer(&dir);
        let artefact = linux_artefact("https://example.com/jre.tar.gz".into());

        assert_eq!(
            installer.runtime_home(&artefact),
            dir.path().join("runtimes/17/linux-x64")
        );
        assert!(!installer.is_installed(&artefact));
    }

    #[tokio::test]
    async fn test_install_runtime() {
        // --- Setup ---
        let mut server = mockito::Server::new_async().await;
        let body = jre_tar_gz();
        server
            .mock("HEAD", "/OpenJDK17U-jre_x64_linux.tar.gz")
            .with_status(200)
            .with_body(&body)
            .with_header("content-length", &body.len().to_string())
            .create_async()
            .await;
        server
            .mock("GET", "/OpenJDK17U-jre_x64_linux.tar.gz")
            .with_status(200)
            .with_body(&body)
            .create_async()
            .await;

        let dir = tempdir().unwrap();
        let installer = installer(&dir);
        let artefact = linux_artefact(format!(
            "{}/OpenJDK17U-jre_x64_linux.tar.gz",
            server.url()
        ));

        // --- Execute ---
        let outcome = installer
            .install(&artefact, &ProgressHandle::new())
            .await
            .unwrap();

        // --- Verify ---
        assert_eq!(outcome, InstallOutcome::Installed);
        assert!(dir.path().join("cache/OpenJDK17U-jre_x64_linux.tar.gz").exists());
        let java = installer.runtime_home(&artefact).join("jdk-17.0.9+9-jre/bin/java");
        assert!(fs::read_to_string(java).unwrap().contains("echo java"));
        assert!(installer.is_installed(&artefact));
    }

    #[tokio::test]
    async fn test_install_runtime_cancelled() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("HEAD", "/jre.tar.gz")
            .with_status(200)
            .with_body(vec![0u8; 64])
            .with_header("content-length", "64")
            .create_async()
            .await;

        let dir = tempdir().unwrap();
        let installer = installer(&dir);
        let artefact = linux_artefact(format!("{}/jre.tar.gz", server.url()));
        let handle = ProgressHandle::new();
        handle.cancel();

        let outcome = installer.install(&artefact, &handle).await.unwrap();

        assert_eq!(outcome, InstallOutcome::Cancelled);
        assert!(!installer.is_installed(&artefact));
    }

    #[tokio::test]
    async fn test_install_runtime_cancelled_before_extraction() {
        // --- Setup ---
        let mut server = mockito::Server::new_async().await;
        let head = server
            .mock("HEAD", "/jre.tar.gz")
            .expect(0)
            .create_async()
            .await;

        let dir = tempdir().unwrap();
        let installer = installer(&dir);
        let artefact = linux_artefact(format!("{}/jre.tar.gz", server.url()));
        let cached = dir.path().join("cache/jre.tar.gz");
        fs::create_dir_all(cached.parent().unwrap()).unwrap();
        fs::write(&cached, jre_tar_gz()).unwrap();

        let handle = ProgressHandle::new();
        handle.cancel();

        // --- Execute ---
        let outcome = installer.install(&artefact, &handle).await.unwrap();

        // --- Verify ---
        head.assert_async().await;
        assert_eq!(outcome, InstallOutcome::Cancelled);
        assert!(cached.exists());
        assert!(!installer.runtime_home(&artefact).exists());
    }
}
