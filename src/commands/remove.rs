use anyhow::{Context, Result, bail};
use log::debug;

use super::config::Config;
use super::services::build_package_manager;
use crate::model::PackageIdentifier;
use crate::runtime::Runtime;

/// Remove an installed package. The cached archive is kept.
#[tracing::instrument(skip(runtime, config))]
pub fn remove<R: Runtime>(runtime: R, config: &Config, id: &PackageIdentifier) -> Result<()> {
    let manager = build_package_manager(runtime, config)?;

    if !manager.is_installed(id) {
        bail!("Package {} is not installed", id);
    }

    let target = manager.install_path(id);
    debug!("Removing {} from {}", id, target.display());
    manager
        .remove(id)
        .with_context(|| format!("Failed to remove {}", id))?;

    println!("Removed {}", id);
    Ok(())
}
