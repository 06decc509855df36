//! Filesystem utilities.

use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use glob::{glob_with, MatchOptions, Pattern};

use crate::core::patterns::PatternGroup;

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read file: {}", path.display()))
}

/// Lexically normalize a path, resolving `.` and `..` without touching disk.
///
/// `..` at the root is dropped; leading `..` of a relative path are kept.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match result.components().next_back() {
                Some(Component::Normal(_)) => {
                    result.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => result.push(".."),
            },
            other => result.push(other.as_os_str()),
        }
    }
    result
}

/// Resolve a manifest-relative path string against `base`.
pub fn resolve_relative(base: &Path, relative: &str) -> PathBuf {
    normalize_path(&base.join(relative.replace('\\', "/")))
}

/// Get `path` relative to `base`, or the path unchanged when it is not
/// inside `base`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(base)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| path.to_path_buf())
}

/// `/`-separated form of a path, as used in manifest patterns.
pub fn to_forward_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn match_options() -> MatchOptions {
    MatchOptions {
        case_sensitive: true,
        require_literal_separator: false,
        require_literal_leading_dot: false,
    }
}

/// Find the files a pattern group selects under `base`.
///
/// Include patterns are globbed, matches against any exclude pattern are
/// dropped, and include literals that exist are added back. Results are
/// sorted and deduplicated.
pub fn search_files(base: &Path, group: &PatternGroup) -> Result<Vec<PathBuf>> {
    let excludes = group
        .exclude_patterns()
        .iter()
        .map(|p| Pattern::new(p).with_context(|| format!("invalid exclude pattern: {}", p)))
        .collect::<Result<Vec<_>>>()?;

    let is_excluded = |path: &Path| {
        let relative = to_forward_slashes(&relative_path(base, path));
        excludes
            .iter()
            .any(|pattern| pattern.matches_with(&relative, match_options()))
    };

    let escaped_base = Pattern::escape(&to_forward_slashes(base));
    let mut results = Vec::new();

    for pattern in group.include_patterns() {
        let full_pattern = format!("{}/{}", escaped_base.trim_end_matches('/'), pattern);

        for entry in glob_with(&full_pattern, match_options())
            .with_context(|| format!("invalid glob pattern: {}", pattern))?
        {
            match entry {
                Ok(path) => {
                    if path.is_file() && !is_excluded(&path) {
                        results.push(path);
                    }
                }
                Err(e) => {
                    tracing::warn!("glob error: {}", e);
                }
            }
        }
    }

    for literal in group.include_literals() {
        let path = resolve_relative(base, literal);
        if path.is_file() {
            results.push(path);
        } else {
            tracing::warn!("included file `{}` does not exist", literal);
        }
    }

    results.sort();
    results.dedup();
    Ok(results)
}
