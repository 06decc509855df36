//! `quay inspect` command

use anyhow::Result;

use crate::cli::InspectArgs;
use quay::core::{Manifest, PatternCategory};
use quay::GlobalContext;

pub fn execute(args: InspectArgs, ctx: &GlobalContext, manifest: &Manifest) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(&manifest.to_json())?);
        return Ok(());
    }

    println!("{} v{}", manifest.name(), manifest.version());
    println!("  manifest: {}", manifest.manifest_path().display());
    println!("  assembly file version: {}", manifest.assembly_file_version());

    let metadata = manifest.metadata();
    if let Some(description) = &metadata.description {
        println!("  description: {}", description);
    }
    if !metadata.authors.is_empty() {
        println!("  authors: {}", metadata.authors.join(", "));
    }
    if let Some(entry_point) = manifest.entry_point() {
        println!("  entry point: {}", entry_point);
    }
    if let Some(web_root) = manifest.web_root() {
        println!("  web root: {}", web_root);
    }
    if !manifest.is_loadable() {
        println!("  loadable: false");
    }

    let configurations: Vec<&str> = manifest.configurations().collect();
    println!("  configurations: {}", configurations.join(", "));

    let frameworks: Vec<String> = manifest
        .target_frameworks()
        .filter_map(|t| t.framework())
        .map(|f| f.short_name())
        .collect();
    if frameworks.is_empty() {
        println!("  frameworks: (none)");
    } else {
        println!("  frameworks: {}", frameworks.join(", "));
    }

    println!("  dependencies: {}", manifest.dependencies().len());

    if !manifest.commands().is_empty() {
        println!("  commands:");
        for (name, command) in manifest.commands() {
            println!("    {} = {}", name, command);
        }
    }

    if !manifest.scripts().is_empty() {
        println!("  scripts:");
        for (event, lines) in manifest.scripts() {
            println!("    {}: {}", event, lines.join(" && "));
        }
    }

    if ctx.is_verbose() {
        println!("  patterns:");
        for category in PatternCategory::ALL {
            let patterns = manifest.files().patterns(category);
            if !patterns.is_empty() {
                println!("    {}: {}", category, patterns.join(";"));
            }
        }
    }

    Ok(())
}
