use anyhow::Result;
use log::debug;
use std::path::PathBuf;
use std::time::Duration;

use super::paths::default_root;
use crate::runtime::Runtime;
use crate::transfer::DEFAULT_CHUNK_SIZE;

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Where terapkg keeps its files and how it talks to the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub root: PathBuf,
    /// Downloaded archives, flat.
    pub cache_dir: PathBuf,
    /// `<PROFILE>/<BUILD_CHANNEL>/<version>` trees.
    pub install_dir: PathBuf,
    /// `<major>/<os>-<arch>` runtime homes.
    pub runtimes_dir: PathBuf,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub chunk_size: usize,
}

impl Config {
    /// Default layout under `root`.
    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            cache_dir: root.join("cache"),
            install_dir: root.join("games"),
            runtimes_dir: root.join("runtimes"),
            root,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Uses `root` when given, otherwise the default root for this user.
    pub fn load<R: Runtime>(runtime: &R, root: Option<PathBuf>) -> Result<Self> {
        let root = match root {
            Some(path) => path,
            None => default_root(runtime)?,
        };
        debug!("Using root: {}", root.display());
        Ok(Self::from_root(root))
    }

    /// Overrides the timeouts given in seconds.
    pub fn with_timeouts(mut self, connect_secs: Option<u64>, read_secs: Option<u64>) -> Self {
        if let Some(secs) = connect_secs {
            self.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = read_secs {
            self.read_timeout = Duration::from_secs(secs);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;

    #[test]
    fn test_from_root_layout() {
        let config = Config::from_root("/data/terapkg");

        assert_eq!(config.cache_dir, PathBuf::from("/data/terapkg/cache"));
        assert_eq!(config.install_dir, PathBuf::from("/data/terapkg/games"));
        assert_eq!(config.runtimes_dir, PathBuf::from("/data/terapkg/runtimes"));
        assert_eq!(config.connect_timeout, Duration::from_secs(30));
        assert_eq!(config.read_timeout, Duration::from_secs(300));
        assert_eq!(config.chunk_size, 8192);
    }

    #[test]
    fn test_load_with_explicit_root() {
        // Strict mock: an explicit root needs no home or privilege lookup
        let runtime = MockRuntime::new();

        let config = Config::load(&runtime, Some(PathBuf::from("/tmp/tp"))).unwrap();

        assert_eq!(config.root, PathBuf::from("/tmp/tp"));
    }

    #[test]
    fn test_load_default_root() {
        let mut runtime = MockRuntime::new();
        runtime.expect_is_privileged().returning(|| false);
        runtime
            .expect_home_dir()
            .returning(|| Some(PathBuf::from("/home/user")));

        let config = Config::load(&runtime, None).unwrap();

        assert_eq!(config.root, PathBuf::from("/home/user/.terapkg"));
        assert_eq!(config.install_dir, PathBuf::from("/home/user/.terapkg/games"));
    }

    #[test]
    fn test_with_timeouts() {
        let config = Config::from_root("/r").with_timeouts(Some(5), None);
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.read_timeout, DEFAULT_READ_TIMEOUT);

        let config = Config::from_root("/r").with_timeouts(None, Some(60));
        assert_eq!(config.connect_timeout, DEFAULT_CONNECT_TIMEOUT);
        assert_eq!(config.read_timeout, Duration::from_secs(60));
    }
}
