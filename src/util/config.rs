//! Layered TOML configuration.
//!
//! Settings are read from, lowest precedence first:
//! - `~/.quay/config.toml` (user-wide)
//! - `.quay/config.toml` under the working directory
//! - `QUAY_BUILD_VERSION` / `QUAY_ASSEMBLY_FILE_VERSION`
//!
//! ```toml
//! [build]
//! configuration = "Release"
//! framework = "dnx451"
//! build-version = "ci-42"
//! assembly-file-version = "42"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::util::fs;

/// Snapshot build identifier substituted for a trailing `-*`.
pub const BUILD_VERSION_ENV: &str = "QUAY_BUILD_VERSION";

/// Revision component of the assembly file version.
pub const ASSEMBLY_FILE_VERSION_ENV: &str = "QUAY_ASSEMBLY_FILE_VERSION";

/// Name of the per-user and per-project configuration directory.
const CONFIG_DIR: &str = ".quay";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub build: BuildConfig,
}

/// The `[build]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BuildConfig {
    /// Configuration used by `quay flags` when none is given.
    pub configuration: Option<String>,

    /// Framework moniker used when none is given.
    pub framework: Option<String>,

    pub build_version: Option<String>,

    pub assembly_file_version: Option<String>,
}

impl BuildConfig {
    /// Values set in `top` win over values set in `self`.
    fn overlay(self, top: BuildConfig) -> BuildConfig {
        BuildConfig {
            configuration: top.configuration.or(self.configuration),
            framework: top.framework.or(self.framework),
            build_version: top.build_version.or(self.build_version),
            assembly_file_version: top.assembly_file_version.or(self.assembly_file_version),
        }
    }
}

impl Config {
    /// Parse a single config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        toml::from_str(&text).with_context(|| format!("invalid TOML in {}", path.display()))
    }

    /// Read a layer if the file exists. A broken file is reported and skipped.
    fn read_layer(path: &Path) -> Option<Self> {
        if !path.is_file() {
            return None;
        }
        match Self::from_file(path) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!("ignoring config {}: {:#}", path.display(), e);
                None
            }
        }
    }

    /// Fold config files together; later paths take precedence.
    pub fn layered<P: AsRef<Path>>(paths: &[P]) -> Self {
        paths
            .iter()
            .filter_map(|path| Self::read_layer(path.as_ref()))
            .fold(Config::default(), |base, top| base.overlay(top))
    }

    pub fn overlay(self, top: Config) -> Config {
        Config {
            build: self.build.overlay(top.build),
        }
    }

    /// Apply environment overrides, read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = BuildConfig {
            build_version: lookup(BUILD_VERSION_ENV),
            assembly_file_version: lookup(ASSEMBLY_FILE_VERSION_ENV),
            ..BuildConfig::default()
        };
        self.build = std::mem::take(&mut self.build).overlay(env);
    }
}

/// `~/.quay`, when a home directory can be determined.
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|dirs| dirs.home_dir().join(CONFIG_DIR))
}

/// Config file inside a quay home directory.
pub fn config_file(home: &Path) -> PathBuf {
    home.join(CONFIG_FILE)
}

/// `<root>/.quay/config.toml`.
pub fn project_config_path(root: &Path) -> PathBuf {
    config_file(&root.join(CONFIG_DIR))
}
