//! File pattern derivation.
//!
//! Each category of project files (compile sources, resources, content, ...)
//! is described by include patterns, exclude patterns and literal file
//! references. Folder shorthand such as `src/` is expanded to `src/**/*`;
//! rooted patterns are rejected. Globbing itself happens elsewhere.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;

use crate::core::errors::{ManifestError, ManifestResult};
use crate::core::json::{string_or_array, JsonObject};
use crate::core::named_resources::{
    apply_named_resources, read_named_resources, NamedResourceMap, NAMED_RESOURCE_KEY,
};

/// A predicate telling whether a directory exists.
pub type DirProbe<'a> = &'a dyn Fn(&Path) -> bool;

/// Probe the real filesystem.
pub fn disk_probe(path: &Path) -> bool {
    path.is_dir()
}

/// A category of project files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PatternCategory {
    Compile,
    Preprocess,
    Shared,
    Resources,
    Content,
    Exclude,
    PublishExclude,
}

impl PatternCategory {
    pub const ALL: [PatternCategory; 7] = [
        PatternCategory::Compile,
        PatternCategory::Preprocess,
        PatternCategory::Shared,
        PatternCategory::Resources,
        PatternCategory::Content,
        PatternCategory::Exclude,
        PatternCategory::PublishExclude,
    ];

    /// Manifest key of the include list.
    pub fn key(&self) -> &'static str {
        match self {
            PatternCategory::Compile => "compile",
            PatternCategory::Preprocess => "preprocess",
            PatternCategory::Shared => "shared",
            PatternCategory::Resources => "resources",
            PatternCategory::Content => "content",
            PatternCategory::Exclude => "exclude",
            PatternCategory::PublishExclude => "publishExclude",
        }
    }

    /// Older key read when the current one is absent.
    fn legacy_key(&self) -> Option<&'static str> {
        match self {
            PatternCategory::Compile => Some("code"),
            PatternCategory::PublishExclude => Some("bundleExclude"),
            _ => None,
        }
    }

    /// Whether the category also has `<key>Exclude` and `<key>Files` keys.
    fn has_sub_keys(&self) -> bool {
        !matches!(
            self,
            PatternCategory::Exclude | PatternCategory::PublishExclude
        )
    }

    /// Patterns used when the manifest does not mention the category.
    pub fn default_patterns(&self) -> &'static [&'static str] {
        match self {
            PatternCategory::Compile => &["**/*.cs"],
            PatternCategory::Preprocess => &["compiler/preprocess/**/*.cs"],
            PatternCategory::Shared => &["compiler/shared/**/*.cs"],
            PatternCategory::Resources => &["compiler/resources/**/*"],
            PatternCategory::Content => &["**/*"],
            PatternCategory::Exclude => &["bin/**", "obj/**", "**/*.xproj"],
            PatternCategory::PublishExclude => &["bin/**", "obj/**", "**/.*/**"],
        }
    }

    /// Categories whose includes this category excludes, besides `exclude`.
    fn excluded_categories(&self) -> &'static [PatternCategory] {
        match self {
            PatternCategory::Compile => &[PatternCategory::Preprocess, PatternCategory::Shared],
            PatternCategory::Content => &[
                PatternCategory::Compile,
                PatternCategory::Preprocess,
                PatternCategory::Shared,
                PatternCategory::Resources,
            ],
            _ => &[],
        }
    }
}

impl fmt::Display for PatternCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for PatternCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PatternCategory::ALL
            .into_iter()
            .find(|c| c.key().eq_ignore_ascii_case(s) || c.legacy_key() == Some(s))
            .ok_or_else(|| {
                let names: Vec<_> = PatternCategory::ALL.iter().map(|c| c.key()).collect();
                format!(
                    "unknown file category `{}` (expected one of: {})",
                    s,
                    names.join(", ")
                )
            })
    }
}

/// Resolved include/exclude patterns and literal files for one category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternGroup {
    include_patterns: Vec<String>,
    exclude_patterns: Vec<String>,
    include_literals: Vec<String>,
}

impl PatternGroup {
    pub fn new(
        include_patterns: Vec<String>,
        exclude_patterns: Vec<String>,
        include_literals: Vec<String>,
    ) -> Self {
        PatternGroup {
            include_patterns,
            exclude_patterns,
            include_literals,
        }
    }

    pub fn include_patterns(&self) -> &[String] {
        &self.include_patterns
    }

    pub fn exclude_patterns(&self) -> &[String] {
        &self.exclude_patterns
    }

    pub fn include_literals(&self) -> &[String] {
        &self.include_literals
    }
}

/// Raw lists read for one category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct CategoryPatterns {
    includes: Vec<String>,
    excludes: Vec<String>,
    literals: Vec<String>,
}

fn split_pattern_list(raw: &[String]) -> impl Iterator<Item = String> + '_ {
    raw.iter()
        .flat_map(|s| s.split(';'))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.replace('\\', "/"))
}

fn is_rooted(pattern: &str) -> bool {
    if pattern.starts_with('/') || Path::new(pattern).is_absolute() {
        return true;
    }
    // Drive-qualified paths, whatever the host platform
    let bytes = pattern.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

fn has_wildcard(pattern: &str) -> bool {
    pattern.contains(['*', '?'])
}

fn reject_rooted(pattern: &str, manifest_path: &Path) -> ManifestResult<()> {
    if is_rooted(pattern) {
        return Err(ManifestError::InvalidPattern {
            pattern: pattern.to_string(),
            path: manifest_path.to_path_buf(),
        });
    }
    Ok(())
}

/// Turn raw pattern strings into glob patterns.
///
/// Strings are split on `;`. Wildcard patterns pass through; a candidate
/// ending in `/` or naming an existing directory under `project_dir` becomes
/// `dir/**/*`; anything else is kept as a literal file reference.
pub fn resolve_patterns(
    raw: &[String],
    project_dir: &Path,
    dir_exists: DirProbe<'_>,
    manifest_path: &Path,
) -> ManifestResult<Vec<String>> {
    let mut result = Vec::new();

    for candidate in split_pattern_list(raw) {
        reject_rooted(&candidate, manifest_path)?;

        let resolved = if has_wildcard(&candidate) {
            candidate
        } else if let Some(dir) = candidate.strip_suffix('/') {
            format!("{}/**/*", dir.trim_end_matches('/'))
        } else if dir_exists(&project_dir.join(&candidate)) {
            format!("{}/**/*", candidate)
        } else {
            candidate
        };

        result.push(resolved);
    }

    Ok(result)
}

/// Split and validate literal file references.
pub fn resolve_literals(raw: &[String], manifest_path: &Path) -> ManifestResult<Vec<String>> {
    split_pattern_list(raw)
        .map(|literal| {
            reject_rooted(&literal, manifest_path)?;
            Ok(literal)
        })
        .collect()
}

/// Read a pattern key that must hold a string or an array of strings.
fn read_pattern_key(
    obj: JsonObject<'_>,
    key: &str,
    manifest_path: &Path,
) -> ManifestResult<Option<Vec<String>>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => string_or_array(value).map(Some).ok_or_else(|| {
            ManifestError::format(
                format!("`{}` must be a string or an array of strings", key),
                manifest_path,
            )
        }),
    }
}

/// All file patterns and named resources of a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectFiles {
    project_dir: PathBuf,
    categories: BTreeMap<PatternCategory, CategoryPatterns>,
    named_resources: NamedResourceMap,
}

impl ProjectFiles {
    /// Read every file category and the named resources from the manifest
    /// root object.
    pub fn from_json(
        obj: JsonObject<'_>,
        project_dir: &Path,
        manifest_path: &Path,
        dir_exists: DirProbe<'_>,
    ) -> ManifestResult<Self> {
        let mut categories = BTreeMap::new();

        for category in PatternCategory::ALL {
            let mut raw = read_pattern_key(obj, category.key(), manifest_path)?;
            if raw.is_none() {
                if let Some(legacy) = category.legacy_key() {
                    raw = read_pattern_key(obj, legacy, manifest_path)?;
                }
            }
            let raw = raw.unwrap_or_else(|| {
                category
                    .default_patterns()
                    .iter()
                    .map(|p| p.to_string())
                    .collect()
            });

            let mut patterns = CategoryPatterns {
                includes: resolve_patterns(&raw, project_dir, dir_exists, manifest_path)?,
                ..Default::default()
            };

            if category.has_sub_keys() {
                let exclude_key = format!("{}Exclude", category.key());
                if let Some(raw) = read_pattern_key(obj, &exclude_key, manifest_path)? {
                    patterns.excludes =
                        resolve_patterns(&raw, project_dir, dir_exists, manifest_path)?;
                }

                let files_key = format!("{}Files", category.key());
                if let Some(raw) = read_pattern_key(obj, &files_key, manifest_path)? {
                    patterns.literals = resolve_literals(&raw, manifest_path)?;
                }
            }

            categories.insert(category, patterns);
        }

        let named_resources = read_named_resources(
            obj.value_as_json_object(NAMED_RESOURCE_KEY),
            project_dir,
            manifest_path,
        )?;

        Ok(ProjectFiles {
            project_dir: project_dir.to_path_buf(),
            categories,
            named_resources,
        })
    }

    fn includes(&self, category: PatternCategory) -> &[String] {
        self.categories
            .get(&category)
            .map_or(&[][..], |p| p.includes.as_slice())
    }

    /// The include patterns declared for a category.
    pub fn patterns(&self, category: PatternCategory) -> &[String] {
        self.includes(category)
    }

    /// The effective pattern group for a category, with the exclusions
    /// implied by other categories applied.
    pub fn group(&self, category: PatternCategory) -> PatternGroup {
        let Some(own) = self.categories.get(&category) else {
            return PatternGroup::default();
        };

        let mut excludes = own.excludes.clone();
        if category.has_sub_keys() {
            excludes.extend_from_slice(self.includes(PatternCategory::Exclude));
            for other in category.excluded_categories() {
                excludes.extend_from_slice(self.includes(*other));
            }
        }

        let mut seen = HashSet::new();
        excludes.retain(|p| seen.insert(p.clone()));

        PatternGroup::new(own.includes.clone(), excludes, own.literals.clone())
    }

    pub fn named_resources(&self) -> &NamedResourceMap {
        &self.named_resources
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Resource files found by `search`, with named resources applied.
    ///
    /// `search` receives the project directory and the resources group.
    pub fn resource_files<F, E>(&self, search: F) -> Result<BTreeMap<PathBuf, Option<String>>, E>
    where
        F: FnOnce(&Path, &PatternGroup) -> Result<Vec<PathBuf>, E>,
    {
        let found = search(&self.project_dir, &self.group(PatternCategory::Resources))?;
        let mut resources: BTreeMap<PathBuf, Option<String>> =
            found.into_iter().map(|path| (path, None)).collect();
        apply_named_resources(&self.named_resources, &mut resources);
        Ok(resources)
    }
}
