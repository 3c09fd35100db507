//! Engine version probe for an installed package.
//!
//! The engine jar (`lib/engine*.jar` or `libs/engine*.jar`) carries a
//! `versionInfo.properties` entry whose `engineVersion` key names the engine
//! the package was built against.

use log::debug;
use semver::Version;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use zip::ZipArchive;

use super::PackageError;
use crate::runtime::Runtime;

const MAX_DEPTH: usize = 3;
const ENGINE_JAR_PATTERN: &str = "engine*.jar";
const LIB_DIRS: [&str; 2] = ["lib", "libs"];
const VERSION_INFO_SUFFIX: &str = "versionInfo.properties";
const ENGINE_VERSION_KEY: &str = "engineVersion";

/// Finds the engine version of the package installed in `dir`.
///
/// Returns `Ok(None)` when there is no engine jar. Several candidate jars,
/// a jar without version info or an unparsable version are errors.
#[tracing::instrument(skip(runtime))]
pub fn detect_engine_version<R: Runtime>(
    runtime: &R,
    dir: &Path,
) -> Result<Option<Version>, PackageError> {
    let pattern = glob::Pattern::new(ENGINE_JAR_PATTERN)
        .map_err(|e| PackageError::engine_version(dir, e.to_string()))?;

    let mut jars = Vec::new();
    find_engine_jars(runtime, dir, 1, &pattern, &mut jars)?;

    let jar = match jars.as_slice() {
        [] => {
            debug!("No engine jar under {:?}", dir);
            return Ok(None);
        }
        [jar] => jar,
        _ => {
            return Err(PackageError::engine_version(
                dir,
                format!("ambiguous engine jars {:?}", jars),
            ));
        }
    };

    debug!("Reading engine version from {:?}", jar);
    let properties = read_version_info(runtime, jar)?;
    let raw = property(&properties, ENGINE_VERSION_KEY).ok_or_else(|| {
        PackageError::engine_version(jar, format!("no {} property", ENGINE_VERSION_KEY))
    })?;

    Version::parse(raw)
        .map(Some)
        .map_err(|e| PackageError::engine_version(jar, format!("invalid version {:?}: {}", raw, e)))
}

fn find_engine_jars<R: Runtime>(
    runtime: &R,
    dir: &Path,
    depth: usize,
    pattern: &glob::Pattern,
    found: &mut Vec<PathBuf>,
) -> Result<(), PackageError> {
    let entries = runtime
        .read_dir(dir)
        .map_err(|e| PackageError::io("read directory", dir, e))?;

    for entry in entries {
        if runtime.is_symlink(&entry) {
            continue;
        }
        if runtime.is_dir(&entry) {
            if depth < MAX_DEPTH {
                find_engine_jars(runtime, &entry, depth + 1, pattern, found)?;
            }
            continue;
        }
        if is_engine_jar(&entry, pattern) {
            found.push(entry);
        }
    }
    Ok(())
}

fn is_engine_jar(path: &Path, pattern: &glob::Pattern) -> bool {
    let in_lib_dir = path
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .is_some_and(|n| LIB_DIRS.contains(&n));
    let name_matches = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| pattern.matches(n));
    in_lib_dir && name_matches
}

fn read_version_info<R: Runtime>(runtime: &R, jar: &Path) -> Result<String, PackageError> {
    let mut buffer = Vec::new();
    runtime
        .open(jar)
        .and_then(|mut r| Ok(r.read_to_end(&mut buffer)?))
        .map_err(|e| PackageError::io("read", jar, e))?;

    let mut archive = ZipArchive::new(Cursor::new(buffer))
        .map_err(|e| PackageError::engine_version(jar, e.to_string()))?;

    let name = archive
        .file_names()
        .find(|n| n.ends_with(VERSION_INFO_SUFFIX))
        .map(str::to_string)
        .ok_or_else(|| {
            PackageError::engine_version(jar, format!("no {} entry", VERSION_INFO_SUFFIX))
        })?;

    let mut contents = String::new();
    archive
        .by_name(&name)
        .map_err(anyhow::Error::from)
        .and_then(|mut entry| Ok(entry.read_to_string(&mut contents)?))
        .map_err(|e| PackageError::io("read", &jar.join(&name), e))?;
    Ok(contents)
}

/// Looks up `key` in Java properties text (`key=value` or `key: value`).
fn property<'a>(properties: &'a str, key: &str) -> Option<&'a str> {
    properties
        .lines()
        .map(str::trim_start)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('!'))
        .find_map(|line| {
            let split = line.find(['=', ':'])?;
            let (k, v) = line.split_at(split);
            (k.trim() == key).then(|| v[1..].trim())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::RealRuntime;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::tempdir;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    fn write_jar(path: &Path, entries: &[(&str, &str)]) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut zip = ZipWriter::new(File::create(path).unwrap());
        for (name, content) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_property_lookup() {
        let text = "# generated\n  engineVersion = 5.3.0\nbuildNumber: 42\n!comment=x\n";
        assert_eq!(property(text, "engineVersion"), Some("5.3.0"));
        assert_eq!(property(text, "buildNumber"), Some("42"));
        assert_eq!(property(text, "comment"), None);
        assert_eq!(property(text, "missing"), None);
    }

    #[test]
    fn test_detects_version_from_libs_jar() {
        let dir = tempdir().unwrap();
        write_jar(
            &dir.path().join("Terasology/libs/engine-5.3.0.jar"),
            &[(
                "org/terasology/engine/version/versionInfo.properties",
                "displayVersion=alpha\nengineVersion=5.3.0\n",
            )],
        );

        let version = detect_engine_version(&RealRuntime, dir.path()).unwrap();

        assert_eq!(version, Some(Version::new(5, 3, 0)));
    }

    #[test]
    fn test_detects_prerelease_version_from_lib_jar() {
        let dir = tempdir().unwrap();
        write_jar(
            &dir.path().join("lib/engine.jar"),
            &[("versionInfo.properties", "engineVersion=5.4.0-SNAPSHOT")],
        );

        let version = detect_engine_version(&RealRuntime, dir.path()).unwrap();

        assert_eq!(version, Some(Version::parse("5.4.0-SNAPSHOT").unwrap()));
    }

    #[test]
    fn test_no_engine_jar() {
        let dir = tempdir().unwrap();
        // Right name, wrong directory
        write_jar(&dir.path().join("modules/engine.jar"), &[]);
        // Too deep
        write_jar(&dir.path().join("a/b/c/libs/engine.jar"), &[]);

        assert_eq!(detect_engine_version(&RealRuntime, dir.path()).unwrap(), None);
    }

    #[test]
    fn test_ambiguous_engine_jars() {
        let dir = tempdir().unwrap();
        write_jar(&dir.path().join("lib/engine-a.jar"), &[]);
        write_jar(&dir.path().join("libs/engine-b.jar"), &[]);

        let err = detect_engine_version(&RealRuntime, dir.path()).unwrap_err();

        assert!(matches!(err, PackageError::EngineVersion { .. }));
        assert!(err.to_string().contains("ambiguous"));
    }

    #[test]
    fn test_jar_without_version_info() {
        let dir = tempdir().unwrap();
        write_jar(&dir.path().join("libs/engine.jar"), &[("META-INF/MANIFEST.MF", "")]);

        let err = detect_engine_version(&RealRuntime, dir.path()).unwrap_err();

        assert!(err.to_string().contains("versionInfo.properties"));
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let dir = tempdir().unwrap();

        let err = detect_engine_version(&RealRuntime, &dir.path().join("absent")).unwrap_err();

        assert!(matches!(err, PackageError::Io { .. }));
    }
}
