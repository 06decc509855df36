//! `quay deps` command

use anyhow::Result;

use super::{requested_framework, warn_if_undeclared};
use crate::cli::DepsArgs;
use quay::core::{DependencyDescriptor, DependencyTarget, DependencyType, Manifest};
use quay::GlobalContext;

pub fn execute(args: DepsArgs, ctx: &GlobalContext, manifest: &Manifest) -> Result<()> {
    println!("{} v{}", manifest.name(), manifest.version());
    print_dependencies(manifest.dependencies());

    let Some(framework) = requested_framework(ctx, args.framework.as_deref()) else {
        return Ok(());
    };

    warn_if_undeclared(ctx, manifest, &framework);

    let target = manifest.target_framework(&framework);
    if let Some(resolved) = target.framework() {
        if resolved == &framework {
            println!("[{}]", resolved.short_name());
        } else {
            println!("[{} via {}]", framework.short_name(), resolved.short_name());
        }
        print_dependencies(target.dependencies());
    }

    Ok(())
}

fn print_dependencies(dependencies: &[DependencyDescriptor]) {
    if dependencies.is_empty() {
        println!("  (no dependencies)");
        return;
    }

    for dep in dependencies {
        let version = dep
            .version_range()
            .map(|r| r.to_string())
            .unwrap_or_else(|| "*".to_string());

        let mut notes = Vec::new();
        if dep.is_framework_reference() {
            notes.push("framework assembly".to_string());
        }
        if dep.dependency_type() != DependencyType::DEFAULT {
            notes.push(format!("type: {}", dep.dependency_type()));
        }
        if dep.target() != DependencyTarget::Any {
            notes.push(format!("target: {}", dep.target().as_str()));
        }

        if notes.is_empty() {
            println!("  {} {}", dep.name(), version);
        } else {
            println!("  {} {} ({})", dep.name(), version, notes.join(", "));
        }
    }
}
