//! Per-framework target information.
//!
//! Every block under `frameworks` describes one target framework: its own
//! compiler options and dependencies, an optional wrapped legacy project and
//! optional precompiled binaries.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::core::compiler_options::{CompilerOptions, COMPILATION_OPTIONS_KEY};
use crate::core::dependency::{build_dependencies, DependencyDescriptor};
use crate::core::errors::ManifestResult;
use crate::core::framework::{framework_define, FrameworkName};
use crate::core::json::JsonObject;
use crate::util::fs::{relative_path, resolve_relative, to_forward_slashes};

/// Key of the framework table in the manifest.
pub const FRAMEWORKS_KEY: &str = "frameworks";

/// What a project looks like for one target framework.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetFrameworkInfo {
    /// `None` for the project-level default entry
    framework: Option<FrameworkName>,

    /// Own `dependencies` followed by `frameworkAssemblies`
    dependencies: Vec<DependencyDescriptor>,

    #[serde(skip_serializing_if = "Option::is_none")]
    wrapped_project: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    assembly_path: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pdb_path: Option<PathBuf>,
}

impl TargetFrameworkInfo {
    /// The framework-less entry used when no declared framework applies.
    pub fn default_target(dependencies: Vec<DependencyDescriptor>) -> Self {
        TargetFrameworkInfo {
            dependencies,
            ..Default::default()
        }
    }

    /// Build the entry for one `frameworks` block.
    ///
    /// Returns `None` when the moniker does not name a supported framework.
    /// The returned options carry the framework define.
    pub fn from_json(
        moniker: &str,
        block: JsonObject<'_>,
        project_dir: &Path,
        manifest_path: &Path,
    ) -> ManifestResult<Option<(TargetFrameworkInfo, CompilerOptions)>> {
        let mut options = CompilerOptions::from_json(block).unwrap_or_default();

        let framework = FrameworkName::parse_moniker(moniker);
        if framework.is_unsupported() {
            tracing::debug!("skipping unsupported target framework `{}`", moniker);
            return Ok(None);
        }

        if let Some(define) = framework_define(&framework) {
            options.add_define(define);
        }

        let mut dependencies = build_dependencies(
            block.value_as_json_object("dependencies"),
            false,
            manifest_path,
        )?;
        dependencies.extend(build_dependencies(
            block.value_as_json_object("frameworkAssemblies"),
            true,
            manifest_path,
        )?);

        let resolve = |raw: &str| resolve_relative(project_dir, raw.trim());
        let wrapped_project = block.value_as_string("wrappedProject").map(resolve);

        let (assembly_path, pdb_path) = match block.value_as_json_object("bin") {
            Some(bin) => (
                bin.value_as_string("assembly").map(resolve),
                bin.value_as_string("pdb").map(resolve),
            ),
            None => (None, None),
        };

        tracing::debug!(
            "target framework `{}` resolved to {} with {} dependencies",
            moniker,
            framework,
            dependencies.len()
        );

        let info = TargetFrameworkInfo {
            framework: Some(framework),
            dependencies,
            wrapped_project,
            assembly_path,
            pdb_path,
        };
        Ok(Some((info, options)))
    }

    pub fn framework(&self) -> Option<&FrameworkName> {
        self.framework.as_ref()
    }

    pub fn dependencies(&self) -> &[DependencyDescriptor] {
        &self.dependencies
    }

    pub fn wrapped_project(&self) -> Option<&Path> {
        self.wrapped_project.as_deref()
    }

    pub fn assembly_path(&self) -> Option<&Path> {
        self.assembly_path.as_deref()
    }

    pub fn pdb_path(&self) -> Option<&Path> {
        self.pdb_path.as_deref()
    }

    /// The manifest block for this framework.
    ///
    /// Paths are written relative to `project_dir` when they live under it.
    pub fn to_json_value(&self, options: Option<&CompilerOptions>, project_dir: &Path) -> Value {
        let mut block = Map::new();

        if let Some(options) = options.filter(|o| !o.is_empty()) {
            block.insert(COMPILATION_OPTIONS_KEY.to_string(), options.to_json_value());
        }

        let (framework_refs, deps): (Vec<_>, Vec<_>) = self
            .dependencies
            .iter()
            .partition(|d| d.is_framework_reference());
        for (key, list) in [("dependencies", deps), ("frameworkAssemblies", framework_refs)] {
            if !list.is_empty() {
                let obj: Map<String, Value> = list
                    .into_iter()
                    .map(|d| (d.name().to_string(), d.to_json_value()))
                    .collect();
                block.insert(key.to_string(), Value::Object(obj));
            }
        }

        let relative = |p: &Path| Value::String(to_forward_slashes(&relative_path(project_dir, p)));
        if let Some(wrapped) = &self.wrapped_project {
            block.insert("wrappedProject".to_string(), relative(wrapped.as_path()));
        }

        let mut bin = Map::new();
        if let Some(assembly) = &self.assembly_path {
            bin.insert("assembly".to_string(), relative(assembly.as_path()));
        }
        if let Some(pdb) = &self.pdb_path {
            bin.insert("pdb".to_string(), relative(pdb.as_path()));
        }
        if !bin.is_empty() {
            block.insert("bin".to_string(), Value::Object(bin));
        }

        Value::Object(block)
    }
}
