use log::{debug, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::model::{BuildChannel, PackageIdentifier, Profile};
use crate::runtime::Runtime;

/// Reconstructs the installed packages from the directory tree under `root`.
///
/// Walks `<root>/<PROFILE>/<BUILD_CHANNEL>/<version>` and nothing deeper.
/// Unknown names and plain files are skipped; unreadable directories are
/// logged and skipped. A missing root yields an empty set.
#[tracing::instrument(skip(runtime))]
pub fn scan_install_root<R: Runtime>(runtime: &R, root: &Path) -> HashSet<PackageIdentifier> {
    let mut found = HashSet::new();

    if !runtime.exists(root) {
        debug!("Install root {:?} does not exist yet", root);
        return found;
    }

    for profile_path in subdirectories(runtime, root) {
        let Some(profile) = dir_name(&profile_path).and_then(Profile::from_name) else {
            debug!("Skipping unknown profile directory {:?}", profile_path);
            continue;
        };

        for channel_path in subdirectories(runtime, &profile_path) {
            let Some(channel) = dir_name(&channel_path).and_then(BuildChannel::from_name) else {
                debug!("Skipping unknown channel directory {:?}", channel_path);
                continue;
            };

            for version_path in subdirectories(runtime, &channel_path) {
                let Some(version) = dir_name(&version_path) else {
                    continue;
                };
                let id = PackageIdentifier::new(version, channel, profile);
                if id.validate().is_err() {
                    debug!("Skipping version directory {:?}", version_path);
                    continue;
                }
                found.insert(id);
            }
        }
    }

    debug!("Found {} installed packages under {:?}", found.len(), root);
    found
}

fn subdirectories<R: Runtime>(runtime: &R, dir: &Path) -> Vec<PathBuf> {
    match runtime.read_dir(dir) {
        Ok(entries) => entries.into_iter().filter(|p| runtime.is_dir(p)).collect(),
        Err(e) => {
            warn!("Skipping unreadable directory {:?}: {:#}", dir, e);
            Vec::new()
        }
    }
}

fn dir_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}
