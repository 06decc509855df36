//! `quay flags` command

use anyhow::Result;

use super::{requested_framework, warn_if_undeclared};
use crate::cli::FlagsArgs;
use quay::core::Manifest;
use quay::util::diagnostic::{suggestions, Diagnostic};
use quay::GlobalContext;

pub fn execute(args: FlagsArgs, ctx: &GlobalContext, manifest: &Manifest) -> Result<()> {
    let framework = requested_framework(ctx, args.framework.as_deref());
    let configuration = args
        .configuration
        .or_else(|| ctx.config().build.configuration.clone());

    if let Some(framework) = &framework {
        warn_if_undeclared(ctx, manifest, framework);
    }

    if let Some(name) = &configuration {
        if manifest.configuration_options(name).is_none() {
            let diag = Diagnostic::error(format!("configuration `{}` not found", name))
                .with_location(manifest.manifest_path())
                .with_suggestion(suggestions::CONFIGURATION_NOT_FOUND);
            return Err(diag.into());
        }
    }

    let options = manifest.combined_compiler_options(framework.as_ref(), configuration.as_deref());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&options)?);
        return Ok(());
    }

    let framework_label = framework
        .as_ref()
        .map(|f| f.short_name())
        .unwrap_or_else(|| "(none)".to_string());
    println!(
        "# Compiler options for `{}` ({}, {})",
        manifest.name(),
        framework_label,
        configuration.as_deref().unwrap_or("no configuration")
    );

    for define in &options.defines {
        println!("  -define:{}", define);
    }
    if let Some(version) = &options.language_version {
        println!("  -langversion:{}", version);
    }
    if let Some(platform) = &options.platform {
        println!("  -platform:{}", platform);
    }
    if let Some(key_file) = &options.key_file {
        println!("  -keyfile:{}", key_file);
    }

    let switches = [
        ("unsafe", options.allow_unsafe),
        ("warnaserror", options.warnings_as_errors),
        ("optimize", options.optimize),
        ("delaysign", options.delay_sign),
    ];
    for (name, value) in switches {
        if let Some(value) = value {
            println!("  -{}{}", name, if value { "+" } else { "-" });
        }
    }

    if let Some(emit_entry_point) = options.emit_entry_point {
        let target = if emit_entry_point { "exe" } else { "library" };
        println!("  -target:{}", target);
    }

    Ok(())
}
