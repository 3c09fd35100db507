use anyhow::Result;
use log::debug;

use super::config::Config;
use super::services::build_package_manager;
use crate::model::PackageIdentifier;
use crate::runtime::Runtime;

/// List all installed packages
#[tracing::instrument(skip(runtime, config))]
pub fn list<R: Runtime>(runtime: R, config: &Config) -> Result<()> {
    let manager = build_package_manager(runtime, config)?;

    let mut installed: Vec<_> = manager.installed_packages().into_iter().collect();
    if installed.is_empty() {
        println!("No packages installed.");
        return Ok(());
    }
    installed.sort_by_key(|id| id.to_string());

    for id in installed {
        match manager.engine_version(&id) {
            Ok(Some(engine)) => println!("{} (engine {})", id, engine),
            Ok(None) => println!("{}", id),
            Err(e) => {
                debug!("No engine version for {}: {}", id, e);
                println!("{}", id);
            }
        }
    }
    Ok(())
}

/// Print the install path of a package
#[tracing::instrument(skip(runtime, config))]
pub fn path<R: Runtime>(runtime: R, config: &Config, id: &PackageIdentifier) -> Result<()> {
    let manager = build_package_manager(runtime, config)?;
    if !manager.is_installed(id) {
        debug!("{} is not installed", id);
    }
    println!("{}", manager.install_path(id).display());
    Ok(())
}
