//! Project version resolution.
//!
//! The manifest version is a semantic version that may end in the snapshot
//! marker `-*`, which is replaced at parse time by a caller-supplied build
//! identifier. The four-part file version is derived independently.

use std::fmt;
use std::path::Path;

use semver::Version;
use serde::{Serialize, Serializer};

use crate::core::errors::{ManifestError, ManifestResult};

/// Version used when the manifest has no `version` field.
pub const DEFAULT_VERSION: &str = "1.0.0";

fn default_version() -> Version {
    Version::new(1, 0, 0)
}

/// Suffix marking a snapshot version.
pub const SNAPSHOT_SUFFIX: &str = "-*";

/// Resolve the `version` field of a manifest.
///
/// A trailing `-*` is stripped; a non-empty `build_version` is appended as
/// a prerelease segment.
pub fn resolve_version(
    raw: Option<&str>,
    build_version: &str,
    manifest_path: &Path,
) -> ManifestResult<Version> {
    let Some(raw) = raw else {
        return Ok(default_version());
    };

    let raw = raw.trim();
    let candidate = substitute_snapshot(raw, build_version);

    let version = parse_version_lenient(&candidate).ok_or_else(|| {
        let reason = match candidate.parse::<Version>() {
            Err(e) => e.to_string(),
            Ok(_) => "not a semantic version".to_string(),
        };
        ManifestError::version("version", raw, reason, manifest_path)
    })?;

    tracing::debug!("resolved project version {} from `{}`", version, raw);
    Ok(version)
}

/// Replace the snapshot marker with the build identifier.
pub fn substitute_snapshot(version: &str, build_version: &str) -> String {
    match version.strip_suffix(SNAPSHOT_SUFFIX) {
        Some(base) if build_version.is_empty() => base.to_string(),
        Some(base) => format!("{}-{}", base, build_version),
        None => version.to_string(),
    }
}

/// Parse a version string, allowing for missing minor/patch components.
///
/// `1` and `1.2` are read as `1.0.0` and `1.2.0`; a prerelease or build
/// suffix is kept.
pub fn parse_version_lenient(s: &str) -> Option<Version> {
    if let Ok(v) = s.parse() {
        return Some(v);
    }

    // Split off the prerelease/build part and pad the numeric core
    let split_at = s.find(['-', '+']).unwrap_or(s.len());
    let (core, rest) = s.split_at(split_at);

    let parts: Vec<&str> = core.split('.').collect();
    if parts.is_empty() || parts.len() > 2 {
        return None;
    }
    if parts.iter().any(|p| p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit())) {
        return None;
    }

    let padded = match parts.len() {
        1 => format!("{}.0.0{}", parts[0], rest),
        _ => format!("{}.{}.0{}", parts[0], parts[1], rest),
    };
    padded.parse().ok()
}

/// A four-part `major.minor.build.revision` file version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FileVersion {
    pub major: u64,
    pub minor: u64,
    pub build: u64,
    pub revision: u64,
}

impl FileVersion {
    pub fn new(major: u64, minor: u64, build: u64, revision: u64) -> Self {
        FileVersion {
            major,
            minor,
            build,
            revision,
        }
    }

    /// Derive the file version from the semantic version.
    ///
    /// `revision_override` supplies the fourth component; a blank override
    /// is treated as absent. Non-numeric overrides are rejected.
    pub fn resolve(
        version: &Version,
        revision_override: Option<&str>,
        manifest_path: &Path,
    ) -> ManifestResult<Self> {
        let revision = match revision_override.map(str::trim) {
            None | Some("") => 0,
            Some(value) => value.parse::<u64>().map_err(|_| {
                ManifestError::format(
                    format!(
                        "the assembly file version override `{}` is not a number",
                        value
                    ),
                    manifest_path,
                )
            })?,
        };

        Ok(FileVersion::new(
            version.major,
            version.minor,
            version.patch,
            revision,
        ))
    }
}

impl fmt::Display for FileVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

impl Serialize for FileVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path() -> &'static Path {
        Path::new("/work/app/project.json")
    }

    #[test]
    fn test_missing_version_defaults() {
        let v = resolve_version(None, "build123", path()).unwrap();
        assert_eq!(v.to_string(), DEFAULT_VERSION);
    }

    #[test]
    fn test_snapshot_without_build_version() {
        let v = resolve_version(Some("2.0.0-*"), "", path()).unwrap();
        assert_eq!(v.to_string(), "2.0.0");
        assert!(v.pre.is_empty());
    }

    #[test]
    fn test_snapshot_with_build_version() {
        let v = resolve_version(Some("2.0.0-*"), "build123", path()).unwrap();
        assert_eq!(v.to_string(), "2.0.0-build123");
    }

    #[test]
    fn test_snapshot_keeps_existing_prerelease() {
        let v = resolve_version(Some("1.0.0-beta-*"), "42", path()).unwrap();
        assert_eq!(v.to_string(), "1.0.0-beta-42");
    }

    #[test]
    fn test_plain_version_ignores_build_version() {
        let v = resolve_version(Some("3.1.4"), "build123", path()).unwrap();
        assert_eq!(v, Version::new(3, 1, 4));
    }

    #[test]
    fn test_malformed_version_is_rejected() {
        let err = resolve_version(Some("one.two"), "", path()).unwrap_err();
        match err {
            ManifestError::VersionParse { field, value, .. } => {
                assert_eq!(field, "version");
                assert_eq!(value, "one.two");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_version_lenient() {
        assert_eq!(parse_version_lenient("1"), Some(Version::new(1, 0, 0)));
        assert_eq!(parse_version_lenient("1.2"), Some(Version::new(1, 2, 0)));
        assert_eq!(
            parse_version_lenient("1.2-rc1").map(|v| v.to_string()),
            Some("1.2.0-rc1".to_string())
        );
        assert_eq!(parse_version_lenient("1.2.3.4"), None);
        assert_eq!(parse_version_lenient("x"), None);
    }

    #[test]
    fn test_file_version_without_override() {
        let v = Version::new(1, 2, 3);
        let fv = FileVersion::resolve(&v, None, path()).unwrap();
        assert_eq!(fv.to_string(), "1.2.3.0");
    }

    #[test]
    fn test_file_version_with_override() {
        let v: Version = "1.2.3-beta".parse().unwrap();
        let fv = FileVersion::resolve(&v, Some("4567"), path()).unwrap();
        assert_eq!(fv, FileVersion::new(1, 2, 3, 4567));
    }

    #[test]
    fn test_file_version_blank_override() {
        let v = Version::new(2, 0, 0);
        let fv = FileVersion::resolve(&v, Some("  "), path()).unwrap();
        assert_eq!(fv.revision, 0);
    }

    #[test]
    fn test_file_version_non_numeric_override() {
        let v = Version::new(2, 0, 0);
        let err = FileVersion::resolve(&v, Some("abc"), path()).unwrap_err();
        assert!(matches!(err, ManifestError::Format { .. }));
        assert!(err.to_string().contains("`abc`"));
    }
}
