use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{PackageIdentifier, RemoteResource};

/// A downloadable package release, as produced by a release feed.
///
/// Immutable once constructed. Two descriptors are equal when they name the
/// same package and were built at the same time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseDescriptor {
    id: PackageIdentifier,
    url: String,
    #[serde(default)]
    changelog: Vec<String>,
    timestamp: DateTime<Utc>,
    #[serde(default)]
    alternate_runtime_loader: bool,
}

impl ReleaseDescriptor {
    pub fn new(
        id: PackageIdentifier,
        url: impl Into<String>,
        changelog: Vec<String>,
        timestamp: DateTime<Utc>,
        alternate_runtime_loader: bool,
    ) -> Self {
        Self {
            id,
            url: url.into(),
            changelog,
            timestamp,
            alternate_runtime_loader,
        }
    }

    pub fn id(&self) -> &PackageIdentifier {
        &self.id
    }

    pub fn download_url(&self) -> &str {
        &self.url
    }

    pub fn changelog(&self) -> &[String] {
        &self.changelog
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Whether the release must be started with the alternate runtime loader.
    pub fn uses_alternate_runtime_loader(&self) -> bool {
        self.alternate_runtime_loader
    }
}

impl PartialEq for ReleaseDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.timestamp == other.timestamp
    }
}

impl Eq for ReleaseDescriptor {}

impl RemoteResource for ReleaseDescriptor {
    type Info = PackageIdentifier;

    fn url(&self) -> &str {
        &self.url
    }

    fn file_name(&self) -> String {
        self.id.cache_file_name()
    }

    fn info(&self) -> &PackageIdentifier {
        &self.id
    }
}
