//! Core data structures for quay.
//!
//! This module contains the manifest model and the builders that produce it:
//! - Typed access over the parsed JSON tree
//! - Versions, version ranges and dependencies
//! - Compiler options and target frameworks
//! - File patterns and named resources
//! - Manifest discovery

pub mod compiler_options;
pub mod dependency;
pub mod errors;
pub mod framework;
pub mod json;
pub mod manifest;
pub mod named_resources;
pub mod patterns;
pub mod target;
pub mod version;
pub mod version_range;
pub mod workspace;

pub use compiler_options::CompilerOptions;
pub use dependency::{DependencyDescriptor, DependencyTarget, DependencyType, DependencyTypeFlags};
pub use errors::{ManifestError, ManifestResult};
pub use framework::{DefaultCompatibility, FrameworkCompatibility, FrameworkName};
pub use manifest::{Manifest, ParseOptions, MANIFEST_NAME};
pub use named_resources::NamedResourceMap;
pub use patterns::{PatternCategory, PatternGroup, ProjectFiles};
pub use target::TargetFrameworkInfo;
pub use version::FileVersion;
pub use version_range::VersionRange;
pub use workspace::{find_manifest, find_manifest_upward};
