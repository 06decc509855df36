//! Process-wide state shared by every command: where we are, where the
//! user's settings live, and how output should look.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::errors::ManifestResult;
use crate::core::manifest::ParseOptions;
use crate::core::workspace::find_manifest_upward;
use crate::util::config::{config_file, global_config_dir, project_config_path, Config};

#[derive(Debug, Clone)]
pub struct GlobalContext {
    cwd: PathBuf,
    /// `~/.quay`; `None` when no home directory is known
    home: Option<PathBuf>,
    verbose: bool,
    color: bool,
    config: Config,
}

impl GlobalContext {
    /// Context for the process working directory.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("could not determine the working directory")?;
        Ok(Self::in_dir(cwd))
    }

    /// Context rooted at `cwd`, with an empty configuration.
    pub fn in_dir(cwd: impl Into<PathBuf>) -> Self {
        GlobalContext {
            cwd: cwd.into(),
            home: global_config_dir(),
            verbose: false,
            color: true,
            config: Config::default(),
        }
    }

    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Config file paths, lowest precedence first.
    pub fn config_paths(&self) -> Vec<PathBuf> {
        self.home
            .as_deref()
            .map(config_file)
            .into_iter()
            .chain(std::iter::once(project_config_path(&self.cwd)))
            .collect()
    }

    /// Read the config files, then the process environment.
    pub fn load_config(&mut self) {
        let mut config = Config::layered(&self.config_paths());
        config.apply_env(|key| std::env::var(key).ok());
        tracing::debug!("build settings: {:?}", config.build);
        self.config = config;
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    pub fn set_color(&mut self, color: bool) {
        self.color = color;
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn color(&self) -> bool {
        self.color
    }

    /// Parse inputs carried by the configuration.
    pub fn parse_options(&self) -> ParseOptions {
        let build = &self.config.build;
        let mut options = ParseOptions::new();
        if let Some(build_version) = &build.build_version {
            options = options.with_build_version(build_version.clone());
        }
        if let Some(file_version) = &build.assembly_file_version {
            options = options.with_assembly_file_version(file_version.clone());
        }
        options
    }

    /// The nearest `project.json` at or above the working directory.
    pub fn find_manifest(&self) -> ManifestResult<PathBuf> {
        find_manifest_upward(&self.cwd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::ManifestError;
    use tempfile::TempDir;

    #[test]
    fn test_new_uses_absolute_cwd() {
        let ctx = GlobalContext::new().unwrap();
        assert!(ctx.cwd().is_absolute());
        assert!(ctx.color());
        assert!(!ctx.is_verbose());
    }

    #[test]
    fn test_config_paths_order() {
        let ctx = GlobalContext::in_dir("/work/app").with_home("/home/me/.quay");
        assert_eq!(
            ctx.config_paths(),
            vec![
                PathBuf::from("/home/me/.quay/config.toml"),
                PathBuf::from("/work/app/.quay/config.toml"),
            ]
        );
    }

    #[test]
    fn test_find_manifest_from_subdirectory() {
        let tmp = TempDir::new().unwrap();
        let manifest = tmp.path().join("project.json");
        std::fs::write(&manifest, "{}").unwrap();
        let nested = tmp.path().join("Views");
        std::fs::create_dir(&nested).unwrap();

        let ctx = GlobalContext::in_dir(nested);
        assert_eq!(ctx.find_manifest().ok(), Some(manifest));
    }

    #[test]
    fn test_find_manifest_missing() {
        let tmp = TempDir::new().unwrap();
        let ctx = GlobalContext::in_dir(tmp.path().join("nowhere"));
        assert!(matches!(ctx.find_manifest(), Err(ManifestError::NotFound { .. })));
    }

    #[test]
    fn test_project_settings_override_home() {
        let tmp = TempDir::new().unwrap();
        let home = tmp.path().join("home");
        let project = tmp.path().join("project");
        std::fs::create_dir_all(&home).unwrap();
        std::fs::create_dir_all(project.join(".quay")).unwrap();
        std::fs::write(
            home.join("config.toml"),
            "[build]\nframework = \"dnx451\"\nconfiguration = \"Debug\"\n",
        )
        .unwrap();
        std::fs::write(
            project.join(".quay/config.toml"),
            "[build]\nconfiguration = \"Release\"\n",
        )
        .unwrap();

        let mut ctx = GlobalContext::in_dir(project).with_home(home);
        ctx.load_config();

        assert_eq!(ctx.config().build.framework.as_deref(), Some("dnx451"));
        assert_eq!(ctx.config().build.configuration.as_deref(), Some("Release"));
    }

    #[test]
    fn test_parse_options_carry_versions() {
        let mut config = Config::default();
        config.build.build_version = Some("ci-7".to_string());
        config.build.assembly_file_version = Some("7".to_string());

        let options = GlobalContext::in_dir("/work").with_config(config).parse_options();
        assert_eq!(options.build_version, "ci-7");
        assert_eq!(options.assembly_file_version.as_deref(), Some("7"));
        assert!(options.name.is_none());
    }
}
