use std::path::{Path, PathBuf};

use crate::model::PackageIdentifier;

/// `<install_root>/<PROFILE>/<BUILD_CHANNEL>/<core_version>`
pub fn install_path(install_root: &Path, id: &PackageIdentifier) -> PathBuf {
    install_root
        .join(id.profile.as_str())
        .join(id.channel.as_str())
        .join(&id.core_version)
}

/// `<cache_root>/terasology-<profile>-<core_version>-<channel>.zip`
pub fn cache_path(cache_root: &Path, id: &PackageIdentifier) -> PathBuf {
    cache_root.join(id.cache_file_name())
}
