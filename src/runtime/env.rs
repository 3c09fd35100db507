//! Host environment: the user's home and privilege level.
//!
//! `commands::paths` uses these to pick the default root.

use std::path::PathBuf;

use super::RealRuntime;

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn home_dir_impl(&self) -> Option<PathBuf> {
        let home = dirs::home_dir();
        if home.is_none() {
            log::debug!("No home directory for the current user");
        }
        home
    }

    /// Root on Unix, an elevated token on Windows.
    #[tracing::instrument(skip(self))]
    pub(crate) fn is_privileged_impl(&self) -> bool {
        #[cfg(unix)]
        let privileged = nix::unistd::geteuid().is_root();

        #[cfg(windows)]
        let privileged = is_elevated::is_elevated();

        log::debug!("Running privileged: {}", privileged);
        privileged
    }
}
