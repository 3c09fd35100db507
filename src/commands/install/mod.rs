use anyhow::{Result, bail};
use log::debug;
use std::sync::Arc;

use super::config::Config;
use super::services::build_package_manager;
use super::{run_cancellable, terminal_progress};
use crate::model::ReleaseDescriptor;
use crate::package::InstallOutcome;
use crate::runtime::Runtime;

/// Install a release unless it is already installed.
#[tracing::instrument(skip(runtime, config, release), fields(id = %release.id()))]
pub async fn install<R: Runtime + 'static>(
    runtime: R,
    config: &Config,
    release: ReleaseDescriptor,
) -> Result<()> {
    let manager = Arc::new(build_package_manager(runtime, config)?);
    let id = release.id().clone();
    let target = manager.install_path(&id);

    if manager.is_installed(&id) {
        println!("{} is already installed at {}", id, target.display());
        return Ok(());
    }

    debug!("Installing {} from {}", id, release.download_url());
    let progress = terminal_progress(id.to_string());
    let worker = {
        let manager = Arc::clone(&manager);
        let sink = progress.clone();
        async move { manager.install(&release, &sink).await }
    };

    match run_cancellable(&progress, worker).await?? {
        InstallOutcome::Installed => {
            println!("Installed {} to {}", id, target.display());
            Ok(())
        }
        InstallOutcome::Cancelled => bail!("Installation of {} was cancelled", id),
    }
}
