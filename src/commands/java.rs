use anyhow::{Context, Result, bail};

use super::config::Config;
use super::services::build_runtime_installer;
use super::{run_cancellable, terminal_progress};
use crate::host::HostContext;
use crate::managed_runtime::SUPPORTED_RUNTIME_VERSIONS;
use crate::package::InstallOutcome;
use crate::runtime::Runtime;

/// Show the managed runtimes for this host, or only `java` when given.
#[tracing::instrument(skip(runtime, config, host))]
pub fn runtimes<R: Runtime>(
    runtime: R,
    config: &Config,
    host: &HostContext,
    java: Option<u32>,
) -> Result<()> {
    let installer = build_runtime_installer(runtime, config)?;
    let versions = match java {
        Some(v) => vec![v],
        None => SUPPORTED_RUNTIME_VERSIONS.to_vec(),
    };

    for version in versions {
        let artefact = host.runtime_for(version)?;
        let status = if installer.is_installed(artefact) {
            format!("installed at {}", installer.runtime_home(artefact).display())
        } else {
            "not installed".to_string()
        };
        println!("Java {}: {} ({})", version, artefact.url, status);
    }
    Ok(())
}

/// Download and unpack the managed runtime `java` for this host.
#[tracing::instrument(skip(runtime, config, host))]
pub async fn install_runtime<R: Runtime + 'static>(
    runtime: R,
    config: &Config,
    host: &HostContext,
    java: u32,
) -> Result<()> {
    let artefact = host.runtime_for(java)?.clone();
    let installer = build_runtime_installer(runtime, config)?;
    let home = installer.runtime_home(&artefact);

    if installer.is_installed(&artefact) {
        println!("Java {} is already installed at {}", java, home.display());
        return Ok(());
    }

    let progress = terminal_progress(format!("Java {}", java));
    let worker = {
        let sink = progress.clone();
        async move { installer.install(&artefact, &sink).await }
    };

    let outcome = run_cancellable(&progress, worker)
        .await?
        .with_context(|| format!("Failed to install Java {}", java))?;
    match outcome {
        InstallOutcome::Installed => {
            println!("Installed Java {} to {}", java, home.display());
            Ok(())
        }
        InstallOutcome::Cancelled => bail!("Installation of Java {} was cancelled", java),
    }
}
