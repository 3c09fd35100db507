//! Managed Java runtimes: a fixed table of Temurin JRE builds keyed by
//! platform and major version, and an installer that unpacks them.

mod installer;

pub use installer::RuntimeInstaller;

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::model::RemoteResource;
use crate::platform::{Arch, Os, Platform};

/// Java major versions with a managed runtime for every supported platform.
pub const SUPPORTED_RUNTIME_VERSIONS: [u32; 3] = [8, 11, 17];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("No managed runtime for Java {major_version} on {platform}")]
pub struct UnsupportedRuntimeError {
    pub platform: Platform,
    pub major_version: u32,
}

/// A downloadable runtime build.
///
/// The checksum is carried along but never verified.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RuntimeArtefact {
    pub major_version: u32,
    pub platform: Platform,
    pub url: String,
    pub checksum: String,
}

impl RuntimeArtefact {
    pub fn new(
        major_version: u32,
        platform: Platform,
        url: impl Into<String>,
        checksum: impl Into<String>,
    ) -> Self {
        Self {
            major_version,
            platform,
            url: url.into(),
            checksum: checksum.into(),
        }
    }
}

impl fmt::Display for RuntimeArtefact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Java {} for {}", self.major_version, self.platform)
    }
}

impl RemoteResource for RuntimeArtefact {
    type Info = Self;

    fn url(&self) -> &str {
        &self.url
    }

    /// Last path segment of the URL, without any query string.
    fn file_name(&self) -> String {
        let path = self.url.split(['?', '#']).next().unwrap_or_default();
        path.rsplit('/').next().unwrap_or_default().to_string()
    }

    fn info(&self) -> &Self {
        self
    }
}

const LINUX_X64: Platform = Platform::new(Os::Linux, Arch::X64);
const MAC_X64: Platform = Platform::new(Os::Mac, Arch::X64);
const WINDOWS_X64: Platform = Platform::new(Os::Windows, Arch::X64);

const TEMURIN_JRES: [(u32, Platform, &str, &str); 9] = [
    (
        8,
        LINUX_X64,
        "https://github.com/adoptium/temurin8-binaries/releases/download/jdk8u392-b08/OpenJDK8U-jre_x64_linux_hotspot_8u392b08.tar.gz",
        "91d31027da0d985be3549714389593d9e0da3da5057d87e3831c7c538b9a2a0f",
    ),
    (
        11,
        LINUX_X64,
        "https://github.com/adoptium/temurin11-binaries/releases/download/jdk-11.0.21%2B9/OpenJDK11U-jre_x64_linux_hotspot_11.0.21_9.tar.gz",
        "156861bb901ef18759e05f6f008595220c7d1318a46758531b957b0c950ef2c3",
    ),
    (
        17,
        LINUX_X64,
        "https://github.com/adoptium/temurin17-binaries/releases/download/jdk-17.0.9%2B9.1/OpenJDK17U-jre_x64_linux_hotspot_17.0.9_9.tar.gz",
        "c37f729200b572884b8f8e157852c739be728d61d9a1da0f920104876d324733",
    ),
    (
        8,
        MAC_X64,
        "https://github.com/adoptium/temurin8-binaries/releases/download/jdk8u392-b08/OpenJDK8U-jre_x64_mac_hotspot_8u392b08.tar.gz",
        "f1f15920ed299e10c789aef6274d88d45eb21b72f9a7b0d246a352107e344e6a",
    ),
    (
        11,
        MAC_X64,
        "https://github.com/adoptium/temurin11-binaries/releases/download/jdk-11.0.21%2B9/OpenJDK11U-jre_x64_mac_hotspot_11.0.21_9.tar.gz",
        "43d29affe994a09de31bf2fb6f8ab6d6792ba4267b9a2feacaa1f6e042481b9b",
    ),
    (
        17,
        MAC_X64,
        "https://github.com/adoptium/temurin17-binaries/releases/download/jdk-17.0.9%2B9.1/OpenJDK17U-jre_x64_mac_hotspot_17.0.9_9.tar.gz",
        "c69b37ea72136df49ce54972408803584b49b2c91b0fbc876d7125e963c7db37",
    ),
    (
        8,
        WINDOWS_X64,
        "https://github.com/adoptium/temurin8-binaries/releases/download/jdk8u392-b08/OpenJDK8U-jre_x64_windows_hotspot_8u392b08.zip",
        "a6b7e671cc12f9fc16db59419bda8be00da037e14aaf5d5afb78042c145b76ed",
    ),
    (
        11,
        WINDOWS_X64,
        "https://github.com/adoptium/temurin11-binaries/releases/download/jdk-11.0.21%2B9/OpenJDK11U-jre_x64_windows_hotspot_11.0.21_9.zip",
        "a93d8334a85f6cbb228694346aad0353a8cb9ff3c84b5dc3221daf2c54a11e54",
    ),
    (
        17,
        WINDOWS_X64,
        "https://github.com/adoptium/temurin17-binaries/releases/download/jdk-17.0.9%2B9.1/OpenJDK17U-jre_x64_windows_hotspot_17.0.9_9.zip",
        "6c491d6f8c28c6f451f08110a30348696a04b009f8c58592191046e0fab1477b",
    ),
];

/// Read-only lookup table of runtime artefacts.
#[derive(Debug, Clone, Default)]
pub struct RuntimeRegistry {
    entries: Vec<RuntimeArtefact>,
}

impl RuntimeRegistry {
    pub fn new(entries: Vec<RuntimeArtefact>) -> Self {
        Self { entries }
    }

    /// The Temurin JRE builds for every supported platform.
    pub fn builtin() -> Self {
        let entries = TEMURIN_JRES
            .iter()
            .map(|(major, platform, url, checksum)| {
                RuntimeArtefact::new(*major, *platform, *url, *checksum)
            })
            .collect();
        Self::new(entries)
    }

    pub fn entries(&self) -> &[RuntimeArtefact] {
        &self.entries
    }

    /// The artefact for exactly this platform and major version.
    pub fn runtime_for(
        &self,
        platform: Platform,
        major_version: u32,
    ) -> Result<&RuntimeArtefact, UnsupportedRuntimeError> {
        self.entries
            .iter()
            .find(|a| a.platform == platform && a.major_version == major_version)
            .ok_or(UnsupportedRuntimeError {
                platform,
                major_version,
            })
    }
}
