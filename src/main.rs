use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use std::path::PathBuf;

use terapkg::commands::{self, config::Config};
use terapkg::host::HostContext;
use terapkg::model::{BuildChannel, PackageIdentifier, Profile, ReleaseDescriptor};
use terapkg::runtime::RealRuntime;

/// terapkg - Terasology package manager
///
/// Download, install and remove Terasology releases and the managed Java
/// runtimes they run on.
///
/// Examples:
///   terapkg install --profile FULL --channel STABLE --version 5.1.1 --url <URL>
///   terapkg list
///   terapkg remove FULL@5.1.1+STABLE
#[derive(Parser, Debug)]
#[command(author, version = env!("TERAPKG_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Root directory for cache, games and runtimes (also via TERAPKG_ROOT)
    #[arg(
        long = "root",
        short = 'r',
        env = "TERAPKG_ROOT",
        value_name = "PATH",
        global = true
    )]
    root: Option<PathBuf>,

    /// Connect timeout in seconds (default 30)
    #[arg(long = "connect-timeout", value_name = "SECS", global = true)]
    connect_timeout: Option<u64>,

    /// Whole-request timeout in seconds (default 300)
    #[arg(long = "read-timeout", value_name = "SECS", global = true)]
    read_timeout: Option<u64>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Download and install a release
    Install(InstallArgs),

    /// Remove an installed release
    Remove(IdArgs),

    /// List installed releases
    List,

    /// Print the install directory of a release
    Path(IdArgs),

    /// Show the detected host platform
    Platform,

    /// Show or install the managed Java runtimes for this host
    Runtime(RuntimeArgs),
}

#[derive(clap::Args, Debug)]
struct InstallArgs {
    /// Release descriptor as JSON, instead of the flags below
    #[arg(
        long = "release-file",
        value_name = "FILE",
        conflicts_with_all = ["profile", "channel", "version", "url"]
    )]
    release_file: Option<PathBuf>,

    /// FULL or ENGINE_ONLY
    #[arg(long, value_parser = parse_profile, required_unless_present = "release_file")]
    profile: Option<Profile>,

    /// STABLE or NIGHTLY
    #[arg(long, value_parser = parse_channel, required_unless_present = "release_file")]
    channel: Option<BuildChannel>,

    /// Core version of the release, e.g. 5.1.1
    #[arg(long, required_unless_present = "release_file")]
    version: Option<String>,

    /// Download URL of the release archive
    #[arg(long, required_unless_present = "release_file")]
    url: Option<String>,

    /// Engine version the release was built against
    #[arg(long = "engine-version")]
    engine_version: Option<semver::Version>,

    /// Build timestamp (RFC 3339), defaults to now
    #[arg(long, value_parser = parse_timestamp)]
    timestamp: Option<DateTime<Utc>>,

    /// Changelog line, may be repeated
    #[arg(long = "changelog", value_name = "LINE")]
    changelog: Vec<String>,
}

#[derive(clap::Args, Debug)]
struct IdArgs {
    /// Package identifier, e.g. FULL@5.1.1+STABLE
    #[arg(value_name = "ID")]
    id: PackageIdentifier,
}

#[derive(clap::Args, Debug)]
struct RuntimeArgs {
    /// Java major version
    #[arg(long = "java", value_name = "N")]
    java: Option<u32>,

    /// Download and unpack the runtime
    #[arg(long, requires = "java")]
    install: bool,
}

fn parse_profile(s: &str) -> Result<Profile, String> {
    Profile::from_name(s).ok_or_else(|| format!("unknown profile '{}' (FULL, ENGINE_ONLY)", s))
}

fn parse_channel(s: &str) -> Result<BuildChannel, String> {
    BuildChannel::from_name(s).ok_or_else(|| format!("unknown channel '{}' (STABLE, NIGHTLY)", s))
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| e.to_string())
}

impl InstallArgs {
    fn into_release(self) -> Result<ReleaseDescriptor> {
        if let Some(path) = self.release_file {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read release file {:?}", path))?;
            return serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse release file {:?}", path));
        }

        let (Some(profile), Some(channel), Some(version), Some(url)) =
            (self.profile, self.channel, self.version, self.url)
        else {
            anyhow::bail!("--profile, --channel, --version and --url are required");
        };

        let mut id = PackageIdentifier::new(version, channel, profile);
        id.validate()?;
        if let Some(engine) = self.engine_version {
            id = id.with_engine_version(engine);
        }
        Ok(ReleaseDescriptor::new(
            id,
            url,
            self.changelog,
            self.timestamp.unwrap_or_else(Utc::now),
            false,
        ))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = RealRuntime;
    let host = HostContext::detect();
    let config =
        Config::load(&runtime, cli.root)?.with_timeouts(cli.connect_timeout, cli.read_timeout);

    match cli.command {
        Commands::Install(args) => {
            commands::install(runtime, &config, args.into_release()?).await?
        }
        Commands::Remove(args) => commands::remove(runtime, &config, &args.id)?,
        Commands::List => commands::list(runtime, &config)?,
        Commands::Path(args) => commands::path(runtime, &config, &args.id)?,
        Commands::Platform => commands::platform(&host)?,
        Commands::Runtime(args) => match (args.java, args.install) {
            (Some(java), true) => commands::install_runtime(runtime, &config, &host, java).await?,
            (java, _) => commands::runtimes(runtime, &config, &host, java)?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_install_parsing() {
        let cli = Cli::try_parse_from([
            "terapkg",
            "install",
            "--profile",
            "FULL",
            "--channel",
            "STABLE",
            "--version",
            "5.1.1",
            "--url",
            "https://example.com/TerasologyOmega.zip",
            "--changelog",
            "first",
            "--changelog",
            "second",
        ])
        .unwrap();
        match cli.command {
            Commands::Install(args) => {
                let release = args.into_release().unwrap();
                assert_eq!(release.id().to_string(), "FULL@5.1.1+STABLE");
                assert_eq!(
                    release.download_url(),
                    "https://example.com/TerasologyOmega.zip"
                );
                assert_eq!(release.changelog(), ["first", "second"]);
            }
            _ => panic!("Expected Install command"),
        }
        assert_eq!(cli.root, None);
    }

    #[test]
    fn test_cli_install_with_engine_version_and_timestamp() {
        let cli = Cli::try_parse_from([
            "terapkg",
            "install",
            "--profile",
            "ENGINE_ONLY",
            "--channel",
            "NIGHTLY",
            "--version",
            "5.2.0-SNAPSHOT",
            "--url",
            "https://example.com/engine.zip",
            "--engine-version",
            "5.2.0-SNAPSHOT",
            "--timestamp",
            "2024-01-15T12:00:00Z",
        ])
        .unwrap();
        match cli.command {
            Commands::Install(args) => {
                let release = args.into_release().unwrap();
                assert_eq!(
                    release.id().engine_version,
                    Some(semver::Version::parse("5.2.0-SNAPSHOT").unwrap())
                );
                assert_eq!(release.timestamp().to_rfc3339(), "2024-01-15T12:00:00+00:00");
            }
            _ => panic!("Expected Install command"),
        }
    }

    #[test]
    fn test_cli_install_rejects_lowercase_profile() {
        let result = Cli::try_parse_from([
            "terapkg",
            "install",
            "--profile",
            "full",
            "--channel",
            "STABLE",
            "--version",
            "5.1.1",
            "--url",
            "https://example.com/a.zip",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_install_requires_url() {
        let result = Cli::try_parse_from([
            "terapkg",
            "install",
            "--profile",
            "FULL",
            "--channel",
            "STABLE",
            "--version",
            "5.1.1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_install_release_file_conflicts_with_flags() {
        let result = Cli::try_parse_from([
            "terapkg",
            "install",
            "--release-file",
            "release.json",
            "--url",
            "https://example.com/a.zip",
        ]);
        assert!(result.is_err());

        let cli = Cli::try_parse_from(["terapkg", "install", "--release-file", "release.json"])
            .unwrap();
        match cli.command {
            Commands::Install(args) => {
                assert_eq!(args.release_file, Some(PathBuf::from("release.json")));
            }
            _ => panic!("Expected Install command"),
        }
    }

    #[test]
    fn test_cli_install_rejects_path_like_version() {
        let cli = Cli::try_parse_from([
            "terapkg",
            "install",
            "--profile",
            "FULL",
            "--channel",
            "STABLE",
            "--version",
            "../5.1.1",
            "--url",
            "https://example.com/a.zip",
        ])
        .unwrap();
        match cli.command {
            Commands::Install(args) => {
                let err = args.into_release().unwrap_err();
                assert!(err.to_string().contains("not a valid core version"));
            }
            _ => panic!("Expected Install command"),
        }
    }

    #[test]
    fn test_cli_install_release_file_rejects_path_like_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("release.json");
        std::fs::write(
            &path,
            r#"{
                "id": {"core_version": "..", "channel": "STABLE", "profile": "FULL"},
                "url": "https://example.com/a.zip",
                "timestamp": "2024-01-15T12:00:00Z"
            }"#,
        )
        .unwrap();

        let args = InstallArgs {
            release_file: Some(path),
            profile: None,
            channel: None,
            version: None,
            url: None,
            engine_version: None,
            timestamp: None,
            changelog: Vec::new(),
        };

        assert!(args.into_release().is_err());
    }

    #[test]
    fn test_cli_remove_parsing() {
        let cli = Cli::try_parse_from(["terapkg", "remove", "FULL@5.1.1+STABLE"]).unwrap();
        match cli.command {
            Commands::Remove(args) => {
                assert_eq!(
                    args.id,
                    PackageIdentifier::new("5.1.1", BuildChannel::Stable, Profile::Full)
                );
            }
            _ => panic!("Expected Remove command"),
        }
    }

    #[test]
    fn test_cli_remove_rejects_bad_identifier() {
        let result = Cli::try_parse_from(["terapkg", "remove", "STABLE@5.1.1+FULL"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_global_options() {
        let cli = Cli::try_parse_from([
            "terapkg",
            "--root",
            "/tmp",
            "--connect-timeout",
            "5",
            "list",
            "--read-timeout",
            "60",
        ])
        .unwrap();
        assert_eq!(cli.root, Some(PathBuf::from("/tmp")));
        assert_eq!(cli.connect_timeout, Some(5));
        assert_eq!(cli.read_timeout, Some(60));
    }

    #[test]
    fn test_cli_runtime_install_requires_java() {
        assert!(Cli::try_parse_from(["terapkg", "runtime", "--install"]).is_err());

        let cli = Cli::try_parse_from(["terapkg", "runtime", "--java", "17", "--install"]).unwrap();
        match cli.command {
            Commands::Runtime(args) => {
                assert_eq!(args.java, Some(17));
                assert!(args.install);
            }
            _ => panic!("Expected Runtime command"),
        }
    }

    #[test]
    fn test_cli_no_subcommand_fails() {
        assert!(Cli::try_parse_from(["terapkg"]).is_err());
    }
}
