use semver::Version;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use thiserror::Error;

/// Which content bundle a release contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Profile {
    /// The game with its default module bundle.
    Full,
    /// The bare engine.
    EngineOnly,
}

/// Release stability line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildChannel {
    Stable,
    Nightly,
}

impl Profile {
    pub const ALL: [Profile; 2] = [Profile::Full, Profile::EngineOnly];

    /// Enum name as used for install directories, e.g. `ENGINE_ONLY`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Full => "FULL",
            Profile::EngineOnly => "ENGINE_ONLY",
        }
    }

    /// Exact, case-sensitive lookup by enum name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == name)
    }
}

impl BuildChannel {
    pub const ALL: [BuildChannel; 2] = [BuildChannel::Stable, BuildChannel::Nightly];

    pub fn as_str(&self) -> &'static str {
        match self {
            BuildChannel::Stable => "STABLE",
            BuildChannel::Nightly => "NIGHTLY",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for BuildChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one package release.
///
/// Two identifiers are equal when their core version, channel and profile
/// are equal. The engine version is descriptive only: identifiers rebuilt
/// from the install tree never carry one.
///
/// The core version doubles as the leaf directory name of the install path,
/// so it must be a single plain path component.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "IdentifierFields")]
pub struct PackageIdentifier {
    pub core_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_version: Option<Version>,
    pub channel: BuildChannel,
    pub profile: Profile,
}

impl PackageIdentifier {
    pub fn new(core_version: impl Into<String>, channel: BuildChannel, profile: Profile) -> Self {
        Self {
            core_version: core_version.into(),
            engine_version: None,
            channel,
            profile,
        }
    }

    /// Checks that the core version can be used as a directory name.
    pub fn validate(&self) -> Result<(), ParseIdentifierError> {
        validate_core_version(&self.core_version)
    }

    pub fn with_engine_version(mut self, engine_version: Version) -> Self {
        self.engine_version = Some(engine_version);
        self
    }

    /// Name of the cached archive for this release,
    /// e.g. `terasology-full-5.1.1-stable.zip`.
    pub fn cache_file_name(&self) -> String {
        format!(
            "terasology-{}-{}-{}.zip",
            self.profile.as_str().to_lowercase(),
            self.core_version,
            self.channel.as_str().to_lowercase()
        )
    }
}

impl PartialEq for PackageIdentifier {
    fn eq(&self, other: &Self) -> bool {
        self.core_version == other.core_version
            && self.channel == other.channel
            && self.profile == other.profile
    }
}

impl Eq for PackageIdentifier {}

impl Hash for PackageIdentifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.core_version.hash(state);
        self.channel.hash(state);
        self.profile.hash(state);
    }
}

/// Rejects core versions that are empty, `.` or `..`, or that contain a path
/// separator or NUL.
pub fn validate_core_version(version: &str) -> Result<(), ParseIdentifierError> {
    let invalid = version.is_empty()
        || version == "."
        || version == ".."
        || version.contains(['/', '\\', '\0']);
    if invalid {
        return Err(ParseIdentifierError::InvalidVersion(version.to_string()));
    }
    Ok(())
}

#[derive(Deserialize)]
struct IdentifierFields {
    core_version: String,
    #[serde(default)]
    engine_version: Option<Version>,
    channel: BuildChannel,
    profile: Profile,
}

impl TryFrom<IdentifierFields> for PackageIdentifier {
    type Error = ParseIdentifierError;

    fn try_from(fields: IdentifierFields) -> Result<Self, Self::Error> {
        validate_core_version(&fields.core_version)?;
        Ok(Self {
            core_version: fields.core_version,
            engine_version: fields.engine_version,
            channel: fields.channel,
            profile: fields.profile,
        })
    }
}

/// Formats as `<PROFILE>@<core version>+<CHANNEL>`, e.g. `FULL@5.1.1+STABLE`.
impl fmt::Display for PackageIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}+{}", self.profile, self.core_version, self.channel)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseIdentifierError {
    #[error("'{0}' is not of the form PROFILE@VERSION+CHANNEL")]
    Malformed(String),
    #[error("unknown profile '{0}'")]
    UnknownProfile(String),
    #[error("unknown build channel '{0}'")]
    UnknownChannel(String),
    #[error("'{0}' is not a valid core version")]
    InvalidVersion(String),
}

impl FromStr for PackageIdentifier {
    type Err = ParseIdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ParseIdentifierError::Malformed(s.to_string());

        let (profile, rest) = s.split_once('@').ok_or_else(malformed)?;
        // Versions may carry their own '+' build suffix; the channel is always last.
        let (version, channel) = rest.rsplit_once('+').ok_or_else(malformed)?;
        if version.is_empty() {
            return Err(malformed());
        }

        let profile = Profile::from_name(profile)
            .ok_or_else(|| ParseIdentifierError::UnknownProfile(profile.to_string()))?;
        let channel = BuildChannel::from_name(channel)
            .ok_or_else(|| ParseIdentifierError::UnknownChannel(channel.to_string()))?;
        validate_core_version(version)?;

        Ok(Self::new(version, channel, profile))
    }
}
