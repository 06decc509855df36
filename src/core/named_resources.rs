//! Named resources: logical resource names mapped to files.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use crate::core::errors::{ManifestError, ManifestResult};
use crate::core::json::JsonObject;
use crate::util::fs::resolve_relative;

/// Key of the named resource object.
pub const NAMED_RESOURCE_KEY: &str = "namedResource";

/// Logical name → absolute path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NamedResourceMap {
    entries: BTreeMap<String, PathBuf>,
}

impl NamedResourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource. Logical names must be unique.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        path: PathBuf,
        manifest_path: &Path,
    ) -> ManifestResult<()> {
        let name = name.into();
        if self.entries.contains_key(&name) {
            return Err(ManifestError::format(
                format!("named resource `{}` already exists", name),
                manifest_path,
            ));
        }
        self.entries.insert(name, path);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Path> {
        self.entries.get(name).map(PathBuf::as_path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.entries
            .iter()
            .map(|(name, path)| (name.as_str(), path.as_path()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Read the `namedResource` object. Paths are resolved against `project_dir`.
pub fn read_named_resources(
    resources: Option<JsonObject<'_>>,
    project_dir: &Path,
    manifest_path: &Path,
) -> ManifestResult<NamedResourceMap> {
    let mut map = NamedResourceMap::new();
    let Some(resources) = resources else {
        return Ok(map);
    };

    for (name, value) in resources.entries() {
        let Value::String(raw) = value else {
            return Err(ManifestError::format(
                format!("named resource `{}` must be a file path string", name),
                manifest_path,
            ));
        };

        if raw.contains(['*', '?']) {
            return Err(ManifestError::format(
                format!(
                    "named resource `{}` cannot contain wildcards (found `{}`)",
                    name, raw
                ),
                manifest_path,
            ));
        }

        map.insert(name, resolve_relative(project_dir, raw.trim()), manifest_path)?;
    }

    Ok(map)
}

/// Merge named resources into discovered resource files.
///
/// Files keyed by the same absolute path get the logical name; other named
/// resources are added.
pub fn apply_named_resources(
    named: &NamedResourceMap,
    resources: &mut BTreeMap<PathBuf, Option<String>>,
) {
    for (name, path) in named.iter() {
        resources.insert(path.to_path_buf(), Some(name.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn manifest_path() -> &'static Path {
        Path::new("/work/app/project.json")
    }

    fn read(value: Value) -> ManifestResult<NamedResourceMap> {
        let obj = JsonObject::from_value(&value).unwrap();
        read_named_resources(Some(obj), Path::new("/work/app"), manifest_path())
    }

    #[test]
    fn test_read_resolves_paths() {
        let map = read(json!({
            "App.Strings": "Resources/Strings.resx",
            "Shared.Logo": "..\\shared\\logo.png"
        }))
        .unwrap();

        assert_eq!(map.len(), 2);
        assert_eq!(
            map.get("App.Strings"),
            Some(Path::new("/work/app/Resources/Strings.resx"))
        );
        assert_eq!(map.get("Shared.Logo"), Some(Path::new("/work/shared/logo.png")));
    }

    #[test]
    fn test_absent_object_is_empty() {
        let map = read_named_resources(None, Path::new("/work/app"), manifest_path()).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_non_string_value_is_rejected() {
        let err = read(json!({ "App.Strings": null })).unwrap_err();
        assert!(matches!(err, ManifestError::Format { .. }));
        assert!(read(json!({ "App.Strings": 3 })).is_err());
    }

    #[test]
    fn test_wildcard_is_rejected() {
        let err = read(json!({ "All": "Resources/*.resx" })).unwrap_err();
        assert!(err.to_string().contains("wildcards"));
    }

    #[test]
    fn test_same_path_under_two_names_is_allowed() {
        let map = read(json!({ "A": "res/a.txt", "B": "res/a.txt" })).unwrap();
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_duplicate_name_is_rejected() {
        let mut map = NamedResourceMap::new();
        map.insert("A", PathBuf::from("/work/app/a.txt"), manifest_path())
            .unwrap();
        let err = map
            .insert("A", PathBuf::from("/work/app/b.txt"), manifest_path())
            .unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_apply_overwrites_and_extends() {
        let mut named = NamedResourceMap::new();
        named
            .insert("App.Logo", PathBuf::from("/work/app/logo.png"), manifest_path())
            .unwrap();
        named
            .insert("App.Extra", PathBuf::from("/work/app/extra.txt"), manifest_path())
            .unwrap();

        let mut resources = BTreeMap::new();
        resources.insert(PathBuf::from("/work/app/logo.png"), None);
        resources.insert(PathBuf::from("/work/app/other.txt"), None);

        apply_named_resources(&named, &mut resources);

        assert_eq!(resources.len(), 3);
        assert_eq!(
            resources[Path::new("/work/app/logo.png")].as_deref(),
            Some("App.Logo")
        );
        assert_eq!(resources[Path::new("/work/app/other.txt")], None);
        assert_eq!(
            resources[Path::new("/work/app/extra.txt")].as_deref(),
            Some("App.Extra")
        );
    }
}
