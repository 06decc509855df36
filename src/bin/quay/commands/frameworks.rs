//! `quay frameworks` command

use anyhow::Result;

use crate::cli::FrameworksArgs;
use quay::core::Manifest;

pub fn execute(_args: FrameworksArgs, manifest: &Manifest) -> Result<()> {
    let mut any = false;

    for target in manifest.target_frameworks() {
        let Some(framework) = target.framework() else {
            continue;
        };
        any = true;

        println!("{:<16} {}", framework.short_name(), framework);

        let defines = manifest
            .framework_options(framework)
            .map(|o| o.defines.join(";"))
            .unwrap_or_default();
        if !defines.is_empty() {
            println!("  define: {}", defines);
        }
        println!("  dependencies: {}", target.dependencies().len());
        if let Some(wrapped) = target.wrapped_project() {
            println!("  wraps: {}", wrapped.display());
        }
        if let Some(assembly) = target.assembly_path() {
            println!("  assembly: {}", assembly.display());
        }
    }

    if !any {
        println!("{} declares no target frameworks", manifest.name());
    }

    Ok(())
}
