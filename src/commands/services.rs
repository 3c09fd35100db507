//! Service factory for building command dependencies from a [`Config`].

use anyhow::Result;

use super::config::Config;
use crate::http::HttpClient;
use crate::managed_runtime::RuntimeInstaller;
use crate::package::PackageManager;
use crate::runtime::Runtime;
use crate::transfer::TransferEngine;

/// Build an HTTP client with the configured timeouts
pub fn build_http_client(config: &Config) -> Result<HttpClient> {
    HttpClient::with_timeouts(config.connect_timeout, config.read_timeout)
}

pub fn build_transfer_engine(config: &Config) -> Result<TransferEngine> {
    Ok(TransferEngine::new(build_http_client(config)?).with_chunk_size(config.chunk_size))
}

/// Build a package manager; this scans the install directory.
pub fn build_package_manager<R: Runtime>(runtime: R, config: &Config) -> Result<PackageManager<R>> {
    Ok(PackageManager::new(
        runtime,
        &config.cache_dir,
        &config.install_dir,
        build_transfer_engine(config)?,
    ))
}

pub fn build_runtime_installer<R: Runtime>(
    runtime: R,
    config: &Config,
) -> Result<RuntimeInstaller<R>> {
    Ok(RuntimeInstaller::new(
        runtime,
        &config.cache_dir,
        &config.runtimes_dir,
        build_transfer_engine(config)?,
    ))
}
