//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// quay - resolve and inspect project.json manifests
#[derive(Parser)]
#[command(name = "quay")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Path to project.json (defaults to searching upward from the current directory)
    #[arg(long, global = true, env = "QUAY_MANIFEST_PATH")]
    pub manifest_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the resolved project model
    Inspect(InspectArgs),

    /// Show the combined compiler options for a framework and configuration
    Flags(FlagsArgs),

    /// List the dependencies that apply to a framework
    Deps(DepsArgs),

    /// List the declared target frameworks
    Frameworks(FrameworksArgs),

    /// List project files matched by a pattern category
    Files(FilesArgs),
}

#[derive(Args)]
pub struct InspectArgs {
    /// Print the re-serialized manifest as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct FlagsArgs {
    /// Target framework moniker (e.g. `dnx451`)
    #[arg(short, long)]
    pub framework: Option<String>,

    /// Configuration name (e.g. `Debug`, `Release`)
    #[arg(short, long)]
    pub configuration: Option<String>,

    /// Print the options as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct DepsArgs {
    /// Target framework moniker; without it only project-wide dependencies are shown
    #[arg(short, long)]
    pub framework: Option<String>,
}

#[derive(Args)]
pub struct FrameworksArgs {}

#[derive(Args)]
pub struct FilesArgs {
    /// Pattern category (compile, preprocess, shared, resources, content, exclude, publishExclude)
    #[arg(long, default_value = "compile")]
    pub category: String,
}
