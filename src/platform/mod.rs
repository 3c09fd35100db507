//! Host platform classification.
//!
//! Maps the raw OS and architecture names of the host onto the small closed
//! set of [`Os`] and [`Arch`] values that package and runtime tables are keyed
//! by. Classification never fails: unknown hosts get a best guess.

use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Simplified operating system identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Os {
    Windows,
    Mac,
    Linux,
}

/// Simplified architecture identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Arch {
    X64,
    X86,
    Arm64,
}

impl Os {
    pub fn as_str(&self) -> &'static str {
        match self {
            Os::Windows => "WINDOWS",
            Os::Mac => "MAC",
            Os::Linux => "LINUX",
        }
    }
}

impl Arch {
    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::X64 => "X64",
            Arch::X86 => "X86",
            Arch::Arm64 => "ARM64",
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An operating system and architecture pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Platform {
    pub os: Os,
    pub arch: Arch,
}

/// Platforms supported by both the packages and the managed runtimes.
pub const SUPPORTED_PLATFORMS: [Platform; 3] = [
    Platform::new(Os::Linux, Arch::X64),
    Platform::new(Os::Mac, Arch::X64),
    Platform::new(Os::Windows, Arch::X64),
];

/// OS markers, checked in order against the tokens of the raw OS name.
const OS_MARKERS: &[(&str, Os)] = &[
    ("windows", Os::Windows),
    ("macos", Os::Mac),
    ("mac", Os::Mac),
    ("darwin", Os::Mac),
    ("osx", Os::Mac),
    ("linux", Os::Linux),
];

const FALLBACK_OS: Os = Os::Linux;
const FALLBACK_ARCH: Arch = Arch::X64;

impl Platform {
    pub const fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    pub fn is_linux(&self) -> bool {
        self.os == Os::Linux
    }

    pub fn is_mac(&self) -> bool {
        self.os == Os::Mac
    }

    pub fn is_windows(&self) -> bool {
        self.os == Os::Windows
    }

    pub fn is_supported(&self) -> bool {
        SUPPORTED_PLATFORMS.contains(self)
    }

    /// Directory-friendly key, e.g. `linux-x64`.
    pub fn dir_name(&self) -> String {
        format!(
            "{}-{}",
            self.os.as_str().to_lowercase(),
            self.arch.as_str().to_lowercase()
        )
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OS '{}', arch '{}'", self.os, self.arch)
    }
}

/// Classify the platform the current process is running on.
#[tracing::instrument]
pub fn resolve_host_platform() -> Platform {
    classify(std::env::consts::OS, std::env::consts::ARCH)
}

/// Classify raw OS and architecture names.
pub fn classify(raw_os: &str, raw_arch: &str) -> Platform {
    Platform::new(classify_os(raw_os), classify_arch(raw_arch))
}

/// Match the lower-cased OS name by whole alphanumeric tokens, first marker wins.
pub fn classify_os(raw_os: &str) -> Os {
    let lowered = raw_os.to_lowercase();
    let tokens: Vec<&str> = lowered
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();

    OS_MARKERS
        .iter()
        .find(|(marker, _)| tokens.contains(marker))
        .map(|(_, os)| *os)
        .unwrap_or_else(|| {
            debug!("Unrecognized OS {:?}, assuming {}", raw_os, FALLBACK_OS);
            FALLBACK_OS
        })
}

pub fn classify_arch(raw_arch: &str) -> Arch {
    match raw_arch.trim().to_lowercase().as_str() {
        "x86_64" | "amd64" | "x64" => Arch::X64,
        "x86" | "i386" | "i586" | "i686" => Arch::X86,
        "aarch64" | "arm64" => Arch::Arm64,
        other => {
            debug!("Unrecognized architecture {:?}, assuming {}", other, FALLBACK_ARCH);
            FALLBACK_ARCH
        }
    }
}
