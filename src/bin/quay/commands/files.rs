//! `quay files` command

use anyhow::{anyhow, Result};

use crate::cli::FilesArgs;
use quay::core::{Manifest, PatternCategory};
use quay::util::fs::{relative_path, search_files, to_forward_slashes};

pub fn execute(args: FilesArgs, manifest: &Manifest) -> Result<()> {
    let category: PatternCategory = args.category.parse().map_err(|e: String| anyhow!(e))?;
    let files = manifest.files();
    let project_dir = files.project_dir();

    if category == PatternCategory::Resources {
        let resources = files.resource_files(search_files)?;
        for (path, name) in &resources {
            let shown = to_forward_slashes(&relative_path(project_dir, path));
            match name {
                Some(name) => println!("{}  => {}", shown, name),
                None => println!("{}", shown),
            }
        }
        return Ok(());
    }

    for path in search_files(project_dir, &files.group(category))? {
        println!("{}", to_forward_slashes(&relative_path(project_dir, &path)));
    }

    Ok(())
}
