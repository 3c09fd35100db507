use crate::managed_runtime::{RuntimeArtefact, RuntimeRegistry, UnsupportedRuntimeError};
use crate::platform::{Platform, resolve_host_platform};

/// What the process knows about the machine it runs on. Built once at
/// startup and passed down by reference.
#[derive(Debug, Clone)]
pub struct HostContext {
    pub platform: Platform,
    pub runtimes: RuntimeRegistry,
}

impl HostContext {
    pub fn new(platform: Platform, runtimes: RuntimeRegistry) -> Self {
        Self { platform, runtimes }
    }

    /// The host platform with the built-in runtime table.
    pub fn detect() -> Self {
        Self::new(resolve_host_platform(), RuntimeRegistry::builtin())
    }

    /// The managed runtime of `major_version` for this host.
    pub fn runtime_for(&self, major_version: u32) -> Result<&RuntimeArtefact, UnsupportedRuntimeError> {
        self.runtimes.runtime_for(self.platform, major_version)
    }
}
