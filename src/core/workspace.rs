//! Manifest discovery.

use std::path::{Path, PathBuf};

use crate::core::errors::{ManifestError, ManifestResult};
use crate::core::manifest::MANIFEST_NAME;

/// Find the manifest in `dir`.
pub fn find_manifest(dir: &Path) -> ManifestResult<PathBuf> {
    let path = dir.join(MANIFEST_NAME);
    if path.is_file() {
        Ok(path)
    } else {
        Err(ManifestError::NotFound { path })
    }
}

/// Find the manifest in `start` or the nearest ancestor directory.
pub fn find_manifest_upward(start: &Path) -> ManifestResult<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        match find_manifest(&current) {
            Ok(path) => return Ok(path),
            Err(ManifestError::NotFound { .. }) => {
                if !current.pop() {
                    return Err(ManifestError::NotFound {
                        path: start.join(MANIFEST_NAME),
                    });
                }
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_manifest_in_dir() {
        let tmp = TempDir::new().unwrap();
        let manifest = tmp.path().join(MANIFEST_NAME);
        std::fs::write(&manifest, "{}").unwrap();

        assert_eq!(find_manifest(tmp.path()).ok(), Some(manifest));
    }

    #[test]
    fn test_find_manifest_missing() {
        let tmp = TempDir::new().unwrap();
        let err = find_manifest(tmp.path()).unwrap_err();
        assert!(matches!(err, ManifestError::NotFound { .. }));
    }

    #[test]
    fn test_directory_named_like_manifest_is_ignored() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join(MANIFEST_NAME)).unwrap();
        assert!(find_manifest(tmp.path()).is_err());
    }

    #[test]
    fn test_find_manifest_upward() {
        let tmp = TempDir::new().unwrap();
        let manifest = tmp.path().join(MANIFEST_NAME);
        std::fs::write(&manifest, "{}").unwrap();

        let nested = tmp.path().join("src").join("Controllers");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_manifest_upward(&nested).ok(), Some(manifest));
    }
}
