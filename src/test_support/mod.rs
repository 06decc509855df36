//! Helpers for unit tests.
//!
//! Folder shorthand in file patterns (`"compile": "Views"`) asks the
//! filesystem whether a path is a directory. [`MockFileSystem`] answers that
//! question from memory, so manifests can be parsed in tests without
//! touching the disk:
//!
//! ```rust,ignore
//! let mut fs = MockFileSystem::new();
//! fs.add_dir("/work/app/Views");
//! let manifest = Manifest::from_value(&value, path, &options, &fs.probe())?;
//! ```

pub mod fixtures;

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

pub use fixtures::{manifests, ProjectFixture};

/// In-memory files and directories.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    files: HashMap<PathBuf, Vec<u8>>,
    dirs: BTreeSet<PathBuf>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file; its parent directories come into existence with it.
    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = path.as_ref();
        path.parent().into_iter().for_each(|dir| self.add_dir(dir));
        self.files.insert(path.to_path_buf(), content.into());
    }

    /// Add a directory and all of its ancestors.
    pub fn add_dir(&mut self, path: impl AsRef<Path>) {
        for ancestor in path.as_ref().ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            self.dirs.insert(ancestor.to_path_buf());
        }
    }

    /// Read a file's content.
    pub fn read(&self, path: &Path) -> Option<&[u8]> {
        self.files.get(path).map(Vec::as_slice)
    }

    pub fn is_file(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    pub fn is_dir(&self, path: &Path) -> bool {
        self.dirs.contains(path)
    }

    /// A directory probe backed by this filesystem.
    pub fn probe(&self) -> impl Fn(&Path) -> bool + '_ {
        move |path| self.is_dir(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_file_creates_parents() {
        let mut fs = MockFileSystem::new();
        fs.add_file("/work/app/src/Program.cs", "class Program {}");

        assert!(fs.is_file(Path::new("/work/app/src/Program.cs")));
        assert!(fs.is_dir(Path::new("/work/app/src")));
        assert!(fs.is_dir(Path::new("/work")));
        assert!(!fs.is_dir(Path::new("/work/app/src/Program.cs")));
        assert_eq!(
            fs.read(Path::new("/work/app/src/Program.cs")),
            Some(&b"class Program {}"[..])
        );
    }

    #[test]
    fn test_probe() {
        let mut fs = MockFileSystem::new();
        fs.add_dir("/work/app/Views");

        let probe = fs.probe();
        assert!(probe(Path::new("/work/app/Views")));
        assert!(!probe(Path::new("/work/app/Models")));
    }
}
