//! quay - a resolver for `project.json` manifests
//!
//! This crate parses a JSON project manifest into a validated, typed model:
//! versions, per-framework dependencies, layered compiler options, file
//! patterns and named resources.

pub mod core;
pub mod util;

/// Test utilities and mocks for quay unit tests.
///
/// This module is only available when compiling with `--cfg test`. It
/// provides a mock filesystem and manifest fixtures.
#[cfg(test)]
pub mod test_support;

pub use core::{
    compiler_options::CompilerOptions, dependency::DependencyDescriptor,
    framework::FrameworkName, manifest::Manifest, manifest::ParseOptions,
    target::TargetFrameworkInfo,
};

pub use util::context::GlobalContext;
