//! Manifest parsing for `project.json`.
//!
//! A [`Manifest`] is built in one pass from the parsed JSON tree and is
//! immutable afterwards. Construction either yields a fully valid manifest or
//! a [`ManifestError`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use semver::Version;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::core::compiler_options::{CompilerOptions, COMPILATION_OPTIONS_KEY};
use crate::core::dependency::{build_dependencies, DependencyDescriptor};
use crate::core::errors::{ManifestError, ManifestResult};
use crate::core::framework::{
    nearest, DefaultCompatibility, FrameworkCompatibility, FrameworkName,
};
use crate::core::json::{string_or_array, JsonObject};
use crate::core::patterns::{disk_probe, DirProbe, ProjectFiles};
use crate::core::target::{TargetFrameworkInfo, FRAMEWORKS_KEY};
use crate::core::version::{resolve_version, FileVersion};
use crate::util::fs::normalize_path;

/// The manifest file name.
pub const MANIFEST_NAME: &str = "project.json";

/// Inputs supplied by the caller rather than read from the manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Project name; defaults to the name of the manifest's directory
    pub name: Option<String>,

    /// Build identifier substituted for a trailing `-*` in the version
    pub build_version: String,

    /// Fourth component of the assembly file version
    pub assembly_file_version: Option<String>,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_build_version(mut self, build_version: impl Into<String>) -> Self {
        self.build_version = build_version.into();
        self
    }

    pub fn with_assembly_file_version(mut self, version: impl Into<String>) -> Self {
        self.assembly_file_version = Some(version.into());
        self
    }
}

/// Descriptive package metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,

    /// Neutral language of the package
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub owners: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,

    pub require_license_acceptance: bool,
}

impl PackageMetadata {
    fn from_json(obj: JsonObject<'_>) -> Self {
        let string = |key: &str| obj.value_as_string(key).map(str::to_string);
        let list = |key: &str| obj.value_as_string_array(key).unwrap_or_default();

        PackageMetadata {
            title: string("title"),
            description: string("description"),
            summary: string("summary"),
            copyright: string("copyright"),
            language: string("language"),
            authors: list("authors"),
            owners: list("owners"),
            tags: list("tags"),
            project_url: string("projectUrl"),
            license_url: string("licenseUrl"),
            icon_url: string("iconUrl"),
            require_license_acceptance: obj.value_as_boolean("requireLicenseAcceptance", false),
        }
    }
}

/// Configuration name → compiler options, with case-insensitive names.
///
/// Always seeded with `Debug` and `Release`; a user configuration of the
/// same name replaces the built-in one.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Configurations {
    entries: Vec<(String, CompilerOptions)>,
}

impl Configurations {
    fn with_builtins() -> Self {
        Configurations {
            entries: vec![
                ("Debug".to_string(), CompilerOptions::debug()),
                ("Release".to_string(), CompilerOptions::release()),
            ],
        }
    }

    fn insert(&mut self, name: &str, options: CompilerOptions) {
        match self
            .entries
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
        {
            Some(entry) => *entry = (name.to_string(), options),
            None => self.entries.push((name.to_string(), options)),
        }
    }

    fn get(&self, name: &str) -> Option<&CompilerOptions> {
        self.entries
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, options)| options)
    }

    fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }
}

/// A parsed `project.json`.
#[derive(Debug, Clone)]
pub struct Manifest {
    name: String,
    manifest_path: PathBuf,
    project_dir: PathBuf,
    version: Version,
    assembly_file_version: FileVersion,
    metadata: PackageMetadata,
    is_loadable: bool,
    entry_point: Option<String>,
    web_root: Option<String>,
    embed_interop_types: bool,

    /// Project-level dependencies, shared by every framework
    dependencies: Vec<DependencyDescriptor>,

    /// Root `compilationOptions`
    compiler_options: CompilerOptions,
    configurations: Configurations,
    frameworks: BTreeMap<FrameworkName, TargetFrameworkInfo>,
    framework_options: BTreeMap<FrameworkName, CompilerOptions>,
    default_target: TargetFrameworkInfo,

    commands: BTreeMap<String, String>,
    scripts: BTreeMap<String, Vec<String>>,
    files: ProjectFiles,
}

impl Manifest {
    /// Load a manifest from a file path.
    pub fn load(path: &Path, options: &ParseOptions) -> ManifestResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ManifestError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ManifestError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        Self::parse(&content, path, options)
    }

    /// Parse manifest content. Folder shorthand in file patterns is checked
    /// against the real filesystem.
    pub fn parse(content: &str, path: &Path, options: &ParseOptions) -> ManifestResult<Self> {
        let value: Value = serde_json::from_str(content).map_err(|source| ManifestError::Json {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_value(&value, path, options, &disk_probe)
    }

    /// Build a manifest from an already-parsed JSON tree.
    pub fn from_value(
        value: &Value,
        path: &Path,
        options: &ParseOptions,
        dir_exists: DirProbe<'_>,
    ) -> ManifestResult<Self> {
        let root = JsonObject::from_value(value).ok_or_else(|| ManifestError::NotAnObject {
            path: path.to_path_buf(),
        })?;

        let project_dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => normalize_path(parent),
            _ => PathBuf::from("."),
        };

        let name = options.name.clone().unwrap_or_else(|| {
            project_dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        });

        let version = resolve_version(root.value_as_string("version"), &options.build_version, path)?;
        let assembly_file_version =
            FileVersion::resolve(&version, options.assembly_file_version.as_deref(), path)?;

        let dependencies = build_dependencies(root.value_as_json_object("dependencies"), false, path)?;

        let compiler_options = CompilerOptions::from_json(root).unwrap_or_default();
        let configurations = Self::read_configurations(root, path)?;
        let (frameworks, framework_options) = Self::read_frameworks(root, &project_dir, path)?;

        let manifest = Manifest {
            name,
            manifest_path: path.to_path_buf(),
            version,
            assembly_file_version,
            metadata: PackageMetadata::from_json(root),
            is_loadable: root.value_as_boolean("loadable", true),
            entry_point: root.value_as_string("entryPoint").map(str::to_string),
            web_root: root.value_as_string("webroot").map(str::to_string),
            embed_interop_types: root.value_as_boolean("embedInteropTypes", false),
            default_target: TargetFrameworkInfo::default_target(dependencies.clone()),
            dependencies,
            compiler_options,
            configurations,
            frameworks,
            framework_options,
            commands: Self::read_commands(root),
            scripts: Self::read_scripts(root, path)?,
            files: ProjectFiles::from_json(root, &project_dir, path, dir_exists)?,
            project_dir,
        };

        tracing::debug!(
            "parsed {} {} with {} target frameworks",
            manifest.name,
            manifest.version,
            manifest.frameworks.len()
        );

        Ok(manifest)
    }

    fn read_configurations(root: JsonObject<'_>, path: &Path) -> ManifestResult<Configurations> {
        let mut configurations = Configurations::with_builtins();
        let Some(declared) = root.value_as_json_object("configurations") else {
            return Ok(configurations);
        };

        for (name, value) in declared.entries() {
            let options = match value {
                Value::Object(map) => {
                    CompilerOptions::from_json(JsonObject::new(map)).unwrap_or_default()
                }
                Value::Null => CompilerOptions::default(),
                _ => {
                    return Err(ManifestError::format(
                        format!("configuration `{}` must be an object", name),
                        path,
                    ))
                }
            };
            configurations.insert(name, options);
        }

        Ok(configurations)
    }

    #[allow(clippy::type_complexity)]
    fn read_frameworks(
        root: JsonObject<'_>,
        project_dir: &Path,
        path: &Path,
    ) -> ManifestResult<(
        BTreeMap<FrameworkName, TargetFrameworkInfo>,
        BTreeMap<FrameworkName, CompilerOptions>,
    )> {
        let mut frameworks = BTreeMap::new();
        let mut framework_options = BTreeMap::new();

        let Some(declared) = root.value_as_json_object(FRAMEWORKS_KEY) else {
            return Ok((frameworks, framework_options));
        };

        let empty = Map::new();
        for (moniker, value) in declared.entries() {
            let block = match value {
                Value::Object(map) => JsonObject::new(map),
                Value::Null => JsonObject::new(&empty),
                _ => {
                    return Err(ManifestError::format(
                        format!("framework `{}` must be an object", moniker),
                        path,
                    ))
                }
            };

            if let Some((info, options)) =
                TargetFrameworkInfo::from_json(moniker, block, project_dir, path)?
            {
                let Some(framework) = info.framework().cloned() else {
                    continue;
                };
                if frameworks.contains_key(&framework) {
                    tracing::debug!("`{}` redeclares {}, last one wins", moniker, framework);
                }
                framework_options.insert(framework.clone(), options);
                frameworks.insert(framework, info);
            }
        }

        Ok((frameworks, framework_options))
    }

    fn read_commands(root: JsonObject<'_>) -> BTreeMap<String, String> {
        let Some(declared) = root.value_as_json_object("commands") else {
            return BTreeMap::new();
        };

        declared
            .entries()
            .filter_map(|(name, value)| match value.as_str() {
                Some(command) => Some((name.to_string(), command.to_string())),
                None => {
                    tracing::warn!("ignoring command `{}`: value is not a string", name);
                    None
                }
            })
            .collect()
    }

    fn read_scripts(
        root: JsonObject<'_>,
        path: &Path,
    ) -> ManifestResult<BTreeMap<String, Vec<String>>> {
        let Some(declared) = root.value_as_json_object("scripts") else {
            return Ok(BTreeMap::new());
        };

        declared
            .entries()
            .map(|(name, value)| {
                let commands = string_or_array(value).ok_or_else(|| {
                    ManifestError::format(
                        format!(
                            "script `{}` must be a string or an array of strings",
                            name
                        ),
                        path,
                    )
                })?;
                Ok((name.to_string(), commands))
            })
            .collect()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn assembly_file_version(&self) -> FileVersion {
        self.assembly_file_version
    }

    pub fn metadata(&self) -> &PackageMetadata {
        &self.metadata
    }

    pub fn is_loadable(&self) -> bool {
        self.is_loadable
    }

    pub fn entry_point(&self) -> Option<&str> {
        self.entry_point.as_deref()
    }

    pub fn web_root(&self) -> Option<&str> {
        self.web_root.as_deref()
    }

    pub fn embed_interop_types(&self) -> bool {
        self.embed_interop_types
    }

    /// Project-level dependencies.
    pub fn dependencies(&self) -> &[DependencyDescriptor] {
        &self.dependencies
    }

    pub fn commands(&self) -> &BTreeMap<String, String> {
        &self.commands
    }

    pub fn scripts(&self) -> &BTreeMap<String, Vec<String>> {
        &self.scripts
    }

    pub fn files(&self) -> &ProjectFiles {
        &self.files
    }

    /// Root compiler options.
    pub fn compiler_options(&self) -> &CompilerOptions {
        &self.compiler_options
    }

    /// Options of a configuration, matched case-insensitively.
    pub fn configuration_options(&self, configuration: &str) -> Option<&CompilerOptions> {
        self.configurations.get(configuration)
    }

    /// Options declared by exactly this framework (including its define).
    pub fn framework_options(&self, framework: &FrameworkName) -> Option<&CompilerOptions> {
        self.framework_options.get(framework)
    }

    /// Merge root, configuration and framework options, in that order.
    ///
    /// The framework layer comes from the exact framework or, failing that,
    /// the nearest compatible declared framework.
    pub fn combined_compiler_options(
        &self,
        framework: Option<&FrameworkName>,
        configuration: Option<&str>,
    ) -> CompilerOptions {
        let configuration = configuration.and_then(|name| self.configuration_options(name));
        let framework = framework.and_then(|requested| {
            self.framework_options(requested).or_else(|| {
                self.resolve_target_framework(requested)
                    .and_then(TargetFrameworkInfo::framework)
                    .and_then(|resolved| self.framework_options(resolved))
            })
        });

        CompilerOptions::combine_layers(Some(&self.compiler_options), configuration, framework)
    }

    /// The target for a framework, falling back to the framework-less
    /// default entry when nothing declared applies.
    pub fn target_framework(&self, framework: &FrameworkName) -> &TargetFrameworkInfo {
        self.resolve_target_framework(framework)
            .unwrap_or(&self.default_target)
    }

    /// Exact or compatible declared target, using [`DefaultCompatibility`].
    pub fn resolve_target_framework(
        &self,
        framework: &FrameworkName,
    ) -> Option<&TargetFrameworkInfo> {
        self.resolve_target_framework_with(framework, &DefaultCompatibility)
    }

    /// Exact or compatible declared target under a custom compatibility
    /// predicate. Candidates are ordered by same identifier first, then by
    /// highest version.
    pub fn resolve_target_framework_with<C>(
        &self,
        framework: &FrameworkName,
        compatibility: &C,
    ) -> Option<&TargetFrameworkInfo>
    where
        C: FrameworkCompatibility + ?Sized,
    {
        if let Some(exact) = self.frameworks.get(framework) {
            return Some(exact);
        }

        let pick = nearest(framework, self.frameworks.keys(), compatibility)?;
        tracing::debug!("{} resolved to compatible framework {}", framework, pick);
        self.frameworks.get(pick)
    }

    /// The framework-less entry.
    pub fn default_target_framework(&self) -> &TargetFrameworkInfo {
        &self.default_target
    }

    /// Configuration names, built-ins first.
    pub fn configurations(&self) -> impl Iterator<Item = &str> {
        self.configurations.names()
    }

    /// Declared target frameworks, ordered by framework identity.
    pub fn target_frameworks(&self) -> impl Iterator<Item = &TargetFrameworkInfo> {
        self.frameworks.values()
    }

    /// Re-serialize the fields this crate reads.
    ///
    /// Parsing the result yields an equivalent manifest.
    pub fn to_json(&self) -> Value {
        let mut root = Map::new();
        root.insert("version".to_string(), Value::String(self.version.to_string()));

        if let Ok(Value::Object(metadata)) = serde_json::to_value(&self.metadata) {
            root.extend(metadata);
        }
        if !self.is_loadable {
            root.insert("loadable".to_string(), Value::Bool(false));
        }
        if let Some(entry_point) = &self.entry_point {
            root.insert("entryPoint".to_string(), Value::String(entry_point.clone()));
        }
        if let Some(web_root) = &self.web_root {
            root.insert("webroot".to_string(), Value::String(web_root.clone()));
        }
        if self.embed_interop_types {
            root.insert("embedInteropTypes".to_string(), Value::Bool(true));
        }

        if !self.compiler_options.is_empty() {
            root.insert(
                COMPILATION_OPTIONS_KEY.to_string(),
                self.compiler_options.to_json_value(),
            );
        }

        let dependencies: Map<String, Value> = self
            .dependencies
            .iter()
            .map(|d| (d.name().to_string(), d.to_json_value()))
            .collect();
        if !dependencies.is_empty() {
            root.insert("dependencies".to_string(), Value::Object(dependencies));
        }

        let configurations: Map<String, Value> = self
            .configurations
            .entries
            .iter()
            .map(|(name, options)| {
                let mut block = Map::new();
                block.insert(COMPILATION_OPTIONS_KEY.to_string(), options.to_json_value());
                (name.clone(), Value::Object(block))
            })
            .collect();
        root.insert("configurations".to_string(), Value::Object(configurations));

        let frameworks: Map<String, Value> = self
            .frameworks
            .iter()
            .map(|(framework, info)| {
                let options = self.framework_options.get(framework);
                (
                    framework.short_name(),
                    info.to_json_value(options, &self.project_dir),
                )
            })
            .collect();
        if !frameworks.is_empty() {
            root.insert(FRAMEWORKS_KEY.to_string(), Value::Object(frameworks));
        }

        if !self.commands.is_empty() {
            let commands = self
                .commands
                .iter()
                .map(|(name, command)| (name.clone(), Value::String(command.clone())))
                .collect();
            root.insert("commands".to_string(), Value::Object(commands));
        }
        if !self.scripts.is_empty() {
            let scripts = self
                .scripts
                .iter()
                .map(|(name, commands)| {
                    let commands = commands.iter().cloned().map(Value::String).collect();
                    (name.clone(), Value::Array(commands))
                })
                .collect();
            root.insert("scripts".to_string(), Value::Object(scripts));
        }

        Value::Object(root)
    }
}
