//! Dependencies declared in a manifest.
//!
//! A [`DependencyDescriptor`] describes what a project requires from another
//! library: a name, an optional version range, and a dependency type that
//! controls how the library participates in compilation and packaging.

use std::fmt;
use std::path::{Path, PathBuf};

use bitflags::bitflags;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::core::errors::{ManifestError, ManifestResult};
use crate::core::json::{string_or_array, JsonObject};
use crate::core::version_range::VersionRange;

bitflags! {
    /// How a dependency participates in the build.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DependencyTypeFlags: u16 {
        /// Referenced when compiling the main sources
        const MAIN_REFERENCE = 1 << 0;
        /// Sources shared into the main compilation
        const MAIN_SOURCE = 1 << 1;
        /// Exposed to consumers of this project
        const MAIN_EXPORT = 1 << 2;
        /// Referenced by preprocess sources
        const PREPROCESS_REFERENCE = 1 << 3;
        /// Copied next to the output at runtime
        const RUNTIME_COMPONENT = 1 << 4;
        /// Only used during development
        const DEV_COMPONENT = 1 << 5;
        /// Participates in preprocessing
        const PREPROCESS_COMPONENT = 1 << 6;
        /// Emitted as a dependency of the produced package
        const BECOMES_NUPKG_DEPENDENCY = 1 << 7;
    }
}

/// A recognized `"type"` token and the flags it adds and removes.
struct TypeKeyword {
    name: &'static str,
    add: DependencyTypeFlags,
    remove: DependencyTypeFlags,
}

const TYPE_KEYWORDS: &[TypeKeyword] = &[
    TypeKeyword {
        name: "default",
        add: DependencyTypeFlags::MAIN_REFERENCE
            .union(DependencyTypeFlags::MAIN_SOURCE)
            .union(DependencyTypeFlags::MAIN_EXPORT)
            .union(DependencyTypeFlags::RUNTIME_COMPONENT)
            .union(DependencyTypeFlags::BECOMES_NUPKG_DEPENDENCY),
        remove: DependencyTypeFlags::empty(),
    },
    TypeKeyword {
        name: "private",
        add: DependencyTypeFlags::MAIN_REFERENCE
            .union(DependencyTypeFlags::MAIN_SOURCE)
            .union(DependencyTypeFlags::RUNTIME_COMPONENT)
            .union(DependencyTypeFlags::BECOMES_NUPKG_DEPENDENCY),
        remove: DependencyTypeFlags::empty(),
    },
    TypeKeyword {
        name: "build",
        add: DependencyTypeFlags::MAIN_SOURCE.union(DependencyTypeFlags::PREPROCESS_COMPONENT),
        remove: DependencyTypeFlags::empty(),
    },
    TypeKeyword {
        name: "preprocess",
        add: DependencyTypeFlags::PREPROCESS_REFERENCE,
        remove: DependencyTypeFlags::empty(),
    },
    TypeKeyword {
        name: "dev",
        add: DependencyTypeFlags::DEV_COMPONENT,
        remove: DependencyTypeFlags::MAIN_EXPORT
            .union(DependencyTypeFlags::BECOMES_NUPKG_DEPENDENCY),
    },
];

/// Dependency type tag parsed from `"type"` tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DependencyType {
    flags: DependencyTypeFlags,
}

impl DependencyType {
    /// Type of a dependency with no `"type"` field.
    pub const DEFAULT: DependencyType = DependencyType {
        flags: TYPE_KEYWORDS[0].add,
    };

    /// Names of every recognized token.
    pub fn keyword_names() -> impl Iterator<Item = &'static str> {
        TYPE_KEYWORDS.iter().map(|k| k.name)
    }

    /// The type a single token produces.
    pub fn keyword(name: &str) -> Option<Self> {
        Self::parse([name]).ok()
    }

    /// Combine tokens, starting from no flags.
    ///
    /// Returns the first unrecognized token on failure.
    pub fn parse<I, S>(tokens: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut flags = DependencyTypeFlags::empty();
        for token in tokens {
            let token = token.as_ref();
            let keyword = TYPE_KEYWORDS
                .iter()
                .find(|k| k.name == token)
                .ok_or_else(|| token.to_string())?;
            flags = (flags | keyword.add) - keyword.remove;
        }
        Ok(DependencyType { flags })
    }

    pub fn flags(&self) -> DependencyTypeFlags {
        self.flags
    }

    pub fn contains(&self, flag: DependencyTypeFlags) -> bool {
        self.flags.contains(flag)
    }

    /// Shortest token list that reproduces this type when parsed.
    pub fn keywords(&self) -> Vec<&'static str> {
        let count = TYPE_KEYWORDS.len();
        let mut best: Option<Vec<&'static str>> = None;

        for mask in 0u32..(1 << count) {
            let picked: Vec<&'static str> = TYPE_KEYWORDS
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, k)| k.name)
                .collect();

            // `dev` removes flags, so its position matters
            let mut dev_first = picked.clone();
            dev_first.sort_by_key(|name| *name != "dev");

            for candidate in [picked, dev_first] {
                let shorter = best.as_ref().map_or(true, |b| candidate.len() < b.len());
                if shorter && Self::parse(&candidate).ok() == Some(*self) {
                    best = Some(candidate);
                }
            }
        }

        best.unwrap_or_default()
    }
}

impl Default for DependencyType {
    fn default() -> Self {
        DependencyType::DEFAULT
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keywords().join(","))
    }
}

impl Serialize for DependencyType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.keywords().serialize(serializer)
    }
}

/// What kind of library satisfies a dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyTarget {
    /// A package or a project, whichever is found
    #[default]
    Any,
    /// Only a package
    Package,
    /// Only a sibling project
    Project,
}

impl DependencyTarget {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "any" => Some(DependencyTarget::Any),
            "package" => Some(DependencyTarget::Package),
            "project" => Some(DependencyTarget::Project),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyTarget::Any => "any",
            DependencyTarget::Package => "package",
            DependencyTarget::Project => "project",
        }
    }
}

/// A dependency declared in a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyDescriptor {
    /// Library name
    name: String,

    /// Version range; `None` accepts any version
    #[serde(rename = "version", skip_serializing_if = "Option::is_none")]
    version_range: Option<VersionRange>,

    /// How the dependency participates in the build
    #[serde(rename = "type")]
    dependency_type: DependencyType,

    /// Restricts the kind of library that satisfies the dependency
    target: DependencyTarget,

    /// Whether this came from a `frameworkAssemblies` block
    is_framework_reference: bool,

    /// Manifest that declared the dependency
    #[serde(skip)]
    manifest_path: PathBuf,
}

impl DependencyDescriptor {
    /// Create a dependency on any version of `name`.
    pub fn new(name: impl Into<String>, manifest_path: impl Into<PathBuf>) -> Self {
        DependencyDescriptor {
            name: name.into(),
            version_range: None,
            dependency_type: DependencyType::DEFAULT,
            target: DependencyTarget::Any,
            is_framework_reference: false,
            manifest_path: manifest_path.into(),
        }
    }

    /// Set the version range.
    pub fn with_version_range(mut self, range: Option<VersionRange>) -> Self {
        self.version_range = range;
        self
    }

    /// Set the dependency type.
    pub fn with_type(mut self, dependency_type: DependencyType) -> Self {
        self.dependency_type = dependency_type;
        self
    }

    /// Set the library kind.
    pub fn with_target(mut self, target: DependencyTarget) -> Self {
        self.target = target;
        self
    }

    /// Mark as a framework reference.
    pub fn framework_reference(mut self, is_framework_reference: bool) -> Self {
        self.is_framework_reference = is_framework_reference;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version_range(&self) -> Option<&VersionRange> {
        self.version_range.as_ref()
    }

    pub fn dependency_type(&self) -> DependencyType {
        self.dependency_type
    }

    pub fn target(&self) -> DependencyTarget {
        self.target
    }

    pub fn is_framework_reference(&self) -> bool {
        self.is_framework_reference
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    /// Check if a version satisfies this dependency.
    pub fn matches_version(&self, version: &semver::Version) -> bool {
        self.version_range
            .as_ref()
            .map_or(true, |range| range.satisfies(version))
    }

    /// The manifest form of this dependency's value.
    ///
    /// Uses the short string form when nothing but the range is set.
    pub fn to_json_value(&self) -> Value {
        let range = self.version_range.as_ref().map(ToString::to_string);
        if self.dependency_type == DependencyType::DEFAULT && self.target == DependencyTarget::Any {
            return range.map_or(Value::Null, Value::String);
        }

        let mut obj = Map::new();
        if let Some(range) = range {
            obj.insert("version".to_string(), Value::String(range));
        }
        if self.dependency_type != DependencyType::DEFAULT {
            obj.insert("type".to_string(), json!(self.dependency_type.keywords()));
        }
        if self.target != DependencyTarget::Any {
            obj.insert("target".to_string(), json!(self.target.as_str()));
        }
        Value::Object(obj)
    }
}

/// Dependency value as it appears in `project.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
enum DependencySpec<'a> {
    /// `"Foo": "1.0.0"`
    Simple(&'a str),

    /// `"Foo": { "version": "1.0.0", "type": "build" }`
    Detailed {
        version: Option<&'a str>,
        types: Option<Vec<String>>,
        target: Option<&'a str>,
    },

    /// `"Foo": null`
    Any,
}

impl<'a> DependencySpec<'a> {
    fn from_json(name: &str, value: &'a Value, manifest_path: &Path) -> ManifestResult<Self> {
        match value {
            Value::String(s) => Ok(DependencySpec::Simple(s)),
            Value::Null => Ok(DependencySpec::Any),
            Value::Object(map) => {
                let obj = JsonObject::new(map);
                let types = match obj.get("type") {
                    None | Some(Value::Null) => None,
                    Some(raw) => Some(string_or_array(raw).ok_or_else(|| {
                        ManifestError::format(
                            format!(
                                "the `type` of dependency `{}` must be a string or an array of strings",
                                name
                            ),
                            manifest_path,
                        )
                    })?),
                };
                Ok(DependencySpec::Detailed {
                    version: obj.value_as_string("version"),
                    types,
                    target: obj.value_as_string("target"),
                })
            }
            _ => Err(ManifestError::format(
                format!(
                    "dependency `{}` must be a version string or an object",
                    name
                ),
                manifest_path,
            )),
        }
    }

    fn into_descriptor(
        self,
        name: &str,
        is_framework_reference: bool,
        manifest_path: &Path,
    ) -> ManifestResult<DependencyDescriptor> {
        let (version, types, target) = match self {
            DependencySpec::Simple(version) => (Some(version), None, None),
            DependencySpec::Any => (None, None, None),
            DependencySpec::Detailed {
                version,
                types,
                target,
            } => (version, types, target),
        };

        let version_range = match version.map(str::trim) {
            None | Some("") => None,
            Some(expr) => Some(VersionRange::parse(expr).map_err(|e| {
                ManifestError::version(
                    format!("version range for dependency `{}`", name),
                    expr,
                    e,
                    manifest_path,
                )
            })?),
        };

        let dependency_type = match types {
            None => DependencyType::DEFAULT,
            Some(values) => {
                let tokens: Vec<&str> = values
                    .iter()
                    .flat_map(|v| v.split(|c: char| c.is_whitespace() || c == ','))
                    .filter(|t| !t.is_empty())
                    .collect();
                DependencyType::parse(tokens).map_err(|bad| {
                    ManifestError::format(
                        format!(
                            "unrecognized dependency type `{}` for `{}` (expected one of: {})",
                            bad,
                            name,
                            DependencyType::keyword_names().collect::<Vec<_>>().join(", ")
                        ),
                        manifest_path,
                    )
                })?
            }
        };

        let target = match target {
            None => DependencyTarget::Any,
            Some(raw) => DependencyTarget::parse(raw).ok_or_else(|| {
                ManifestError::format(
                    format!(
                        "unrecognized target `{}` for dependency `{}` (expected any, package or project)",
                        raw, name
                    ),
                    manifest_path,
                )
            })?,
        };

        Ok(DependencyDescriptor::new(name, manifest_path)
            .with_version_range(version_range)
            .with_type(dependency_type)
            .with_target(target)
            .framework_reference(is_framework_reference))
    }
}

/// Build dependency descriptors from a `dependencies`-style object.
///
/// A missing object yields an empty list.
pub fn build_dependencies(
    dependencies: Option<JsonObject<'_>>,
    is_framework_reference: bool,
    manifest_path: &Path,
) -> ManifestResult<Vec<DependencyDescriptor>> {
    let Some(dependencies) = dependencies else {
        return Ok(Vec::new());
    };

    let mut result = Vec::with_capacity(dependencies.len());
    for (name, value) in dependencies.entries() {
        if name.trim().is_empty() {
            return Err(ManifestError::format(
                "unable to resolve dependency ''",
                manifest_path,
            ));
        }

        let spec = DependencySpec::from_json(name, value, manifest_path)?;
        result.push(spec.into_descriptor(name, is_framework_reference, manifest_path)?);
    }

    Ok(result)
}
