//! Test fixtures for common test scenarios.
//!
//! This module provides pre-built manifests and fixture generators for
//! common testing patterns in quay.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::core::manifest::MANIFEST_NAME;

/// Fixture for a complete project directory.
#[derive(Debug, Clone)]
pub struct ProjectFixture {
    /// Project (directory) name.
    pub name: String,
    /// project.json content.
    pub manifest: String,
    /// Other files (path relative to project root -> content).
    pub files: BTreeMap<PathBuf, String>,
}

impl ProjectFixture {
    /// Create a project with an empty manifest object.
    pub fn new(name: impl Into<String>) -> Self {
        ProjectFixture {
            name: name.into(),
            manifest: manifests::empty().to_string(),
            files: BTreeMap::new(),
        }
    }

    /// A console application targeting `dnx451` and `dnxcore50`.
    pub fn console_app(name: impl Into<String>) -> Self {
        Self::new(name)
            .with_manifest(manifests::console_app())
            .with_file("Program.cs", "public class Program { }")
            .with_file("compiler/resources/strings.resx", "<root />")
    }

    pub fn with_manifest(mut self, manifest: impl Into<String>) -> Self {
        self.manifest = manifest.into();
        self
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }

    /// Write the project under `base_path/<name>` and return the manifest path.
    pub fn write_to(&self, base_path: &Path) -> std::io::Result<PathBuf> {
        let root = base_path.join(&self.name);
        std::fs::create_dir_all(&root)?;

        let manifest_path = root.join(MANIFEST_NAME);
        std::fs::write(&manifest_path, &self.manifest)?;

        for (path, content) in &self.files {
            let full = root.join(path);
            if let Some(parent) = full.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(full, content)?;
        }

        Ok(manifest_path)
    }

    /// Write the project into a mock filesystem.
    pub fn write_to_mock(&self, fs: &mut super::MockFileSystem, base_path: &Path) -> PathBuf {
        let root = base_path.join(&self.name);
        let manifest_path = root.join(MANIFEST_NAME);
        fs.add_file(&manifest_path, self.manifest.as_bytes());
        for (path, content) in &self.files {
            fs.add_file(root.join(path), content.as_bytes());
        }
        manifest_path
    }
}

/// Sample `project.json` documents.
pub mod manifests {
    /// An empty manifest.
    pub fn empty() -> &'static str {
        "{}"
    }

    /// A console application with two target frameworks.
    pub fn console_app() -> &'static str {
        r#"{
  "version": "1.0.0-*",
  "description": "Sample console app",
  "authors": ["quay"],
  "compilationOptions": { "emitEntryPoint": true },
  "dependencies": {
    "Newtonsoft.Json": "8.0.3",
    "Tools.Build": { "version": "1.0.0", "type": "build" }
  },
  "commands": { "run": "ConsoleApp" },
  "frameworks": {
    "dnx451": {
      "frameworkAssemblies": { "System.Runtime": "" }
    },
    "dnxcore50": {
      "dependencies": { "System.Console": "4.0.0-beta-*" }
    }
  },
  "namedResource": { "ConsoleApp.Strings": "compiler/resources/strings.resx" }
}
"#
    }

    /// A manifest whose dependency uses an unknown type token.
    pub fn bad_dependency_type() -> &'static str {
        r#"{ "dependencies": { "Foo": { "version": "1.0.0", "type": "bogus" } } }"#
    }

    /// A manifest with a rooted compile pattern.
    pub fn rooted_pattern() -> &'static str {
        r#"{ "compile": "/etc/passwd" }"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockFileSystem;
    use tempfile::TempDir;

    #[test]
    fn test_write_to() {
        let tmp = TempDir::new().unwrap();
        let manifest_path = ProjectFixture::console_app("ConsoleApp")
            .write_to(tmp.path())
            .unwrap();

        assert_eq!(manifest_path, tmp.path().join("ConsoleApp").join(MANIFEST_NAME));
        assert!(manifest_path.is_file());
        assert!(tmp.path().join("ConsoleApp/compiler/resources/strings.resx").is_file());
    }

    #[test]
    fn test_write_to_mock() {
        let mut fs = MockFileSystem::new();
        let manifest_path = ProjectFixture::console_app("ConsoleApp")
            .write_to_mock(&mut fs, Path::new("/work"));

        assert!(fs.is_file(&manifest_path));
        assert!(fs.is_dir(Path::new("/work/ConsoleApp/compiler/resources")));
    }

    #[test]
    fn test_sample_manifests_are_json() {
        for doc in [
            manifests::empty(),
            manifests::console_app(),
            manifests::bad_dependency_type(),
            manifests::rooted_pattern(),
        ] {
            let value: serde_json::Value = serde_json::from_str(doc).unwrap();
            assert!(value.is_object());
        }
    }
}
