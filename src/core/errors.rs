//! Manifest error types and diagnostics.

use std::path::{Path, PathBuf};

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// Result alias used throughout manifest parsing.
pub type ManifestResult<T> = Result<T, ManifestError>;

/// Error raised while reading or resolving a `project.json`.
///
/// Any of these aborts manifest construction; there is no partial manifest.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum ManifestError {
    /// A field is malformed or has the wrong shape.
    #[error("{message}")]
    #[diagnostic(code(quay::manifest::format))]
    Format { message: String, path: PathBuf },

    /// A file pattern is rooted or absolute.
    #[error("pattern `{pattern}` is a rooted path, which is not supported")]
    #[diagnostic(
        code(quay::manifest::invalid_pattern),
        help("use a path relative to the project directory")
    )]
    InvalidPattern { pattern: String, path: PathBuf },

    /// A semantic version or version range could not be parsed.
    #[error("invalid {field} `{value}`: {reason}")]
    #[diagnostic(code(quay::manifest::version))]
    VersionParse {
        field: String,
        value: String,
        reason: String,
        path: PathBuf,
    },

    /// No manifest file at the given path.
    #[error("manifest not found: {}", path.display())]
    #[diagnostic(code(quay::manifest::not_found))]
    NotFound { path: PathBuf },

    /// The top-level JSON value is not an object.
    #[error("the top-level value of {} is not a JSON object", path.display())]
    #[diagnostic(code(quay::manifest::not_an_object))]
    NotAnObject { path: PathBuf },

    #[error("failed to parse JSON in {}", path.display())]
    #[diagnostic(code(quay::manifest::json))]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read manifest {}", path.display())]
    #[diagnostic(code(quay::manifest::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ManifestError {
    /// Create a format error for the given manifest.
    pub fn format(message: impl Into<String>, path: &Path) -> Self {
        ManifestError::Format {
            message: message.into(),
            path: path.to_path_buf(),
        }
    }

    /// Create a version parse error naming the offending field and value.
    pub fn version(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl ToString,
        path: &Path,
    ) -> Self {
        ManifestError::VersionParse {
            field: field.into(),
            value: value.into(),
            reason: reason.to_string(),
            path: path.to_path_buf(),
        }
    }

    /// The manifest this error originated from.
    pub fn manifest_path(&self) -> &Path {
        match self {
            ManifestError::Format { path, .. }
            | ManifestError::InvalidPattern { path, .. }
            | ManifestError::VersionParse { path, .. }
            | ManifestError::NotFound { path }
            | ManifestError::NotAnObject { path }
            | ManifestError::Json { path, .. }
            | ManifestError::Io { path, .. } => path,
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::error(self.to_string()).with_location(self.manifest_path());

        match self {
            ManifestError::InvalidPattern { pattern, .. } => {
                diag = diag.with_suggestion(format!(
                    "Rewrite `{}` relative to the project directory",
                    pattern.trim_start_matches(['/', '\\'])
                ));
            }
            ManifestError::VersionParse { field, .. } => {
                diag = diag
                    .with_context(format!("while reading `{}`", field))
                    .with_suggestion(
                        "Use `major.minor.patch[-prerelease]` or a range such as `[1.0.0, 2.0.0)`",
                    );
            }
            ManifestError::NotFound { .. } => {
                diag = diag.with_suggestion(suggestions::NO_MANIFEST);
            }
            ManifestError::Json { source, .. } => {
                diag = diag.with_context(format!(
                    "line {}, column {}: {}",
                    source.line(),
                    source.column(),
                    source
                ));
            }
            ManifestError::Io { source, .. } => {
                diag = diag.with_context(source.to_string());
            }
            ManifestError::Format { .. } | ManifestError::NotAnObject { .. } => {}
        }

        diag
    }
}
