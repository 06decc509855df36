//! Command implementations

pub mod deps;
pub mod files;
pub mod flags;
pub mod frameworks;
pub mod inspect;

use std::path::Path;

use anyhow::Result;

use quay::core::{FrameworkName, Manifest};
use quay::util::diagnostic::{emit, suggestions, Diagnostic};
use quay::GlobalContext;

/// Load the manifest at `manifest_path`, or the nearest one above the cwd.
pub fn load_manifest(ctx: &GlobalContext, manifest_path: Option<&Path>) -> Result<Manifest> {
    let path = match manifest_path {
        Some(path) => ctx.cwd().join(path),
        None => ctx.find_manifest()?,
    };

    tracing::debug!("loading manifest {}", path.display());
    Ok(Manifest::load(&path, &ctx.parse_options())?)
}

/// The framework to resolve against: the argument, else the configured default.
pub fn requested_framework(ctx: &GlobalContext, arg: Option<&str>) -> Option<FrameworkName> {
    arg.or(ctx.config().build.framework.as_deref())
        .map(FrameworkName::parse_moniker)
}

/// Warn when `framework` matches no declared target, exactly or by compatibility.
pub fn warn_if_undeclared(ctx: &GlobalContext, manifest: &Manifest, framework: &FrameworkName) {
    if manifest.resolve_target_framework(framework).is_none() {
        let diag = Diagnostic::warning(format!(
            "framework `{}` is not declared by {}",
            framework.short_name(),
            manifest.name()
        ))
        .with_location(manifest.manifest_path())
        .with_suggestion(suggestions::FRAMEWORK_NOT_FOUND);
        emit(&diag, ctx.color());
    }
}
