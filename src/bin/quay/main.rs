//! quay CLI - inspect project.json manifests

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use quay::core::ManifestError;
use quay::util::diagnostic::{emit, Diagnostic};
use quay::GlobalContext;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color;

    if let Err(e) = run(cli) {
        if let Some(diag) = e.downcast_ref::<Diagnostic>() {
            emit(diag, color);
        } else if let Some(manifest_err) = e.downcast_ref::<ManifestError>() {
            emit(&manifest_err.to_diagnostic(), color);
        } else {
            eprintln!("error: {:#}", e);
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("quay=debug")
    } else {
        EnvFilter::new("quay=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let mut ctx = GlobalContext::new()?;
    ctx.set_verbose(cli.verbose);
    ctx.set_color(!cli.no_color);
    ctx.load_config();

    let manifest = commands::load_manifest(&ctx, cli.manifest_path.as_deref())?;

    // Execute command
    match cli.command {
        Commands::Inspect(args) => commands::inspect::execute(args, &ctx, &manifest),
        Commands::Flags(args) => commands::flags::execute(args, &ctx, &manifest),
        Commands::Deps(args) => commands::deps::execute(args, &ctx, &manifest),
        Commands::Frameworks(args) => commands::frameworks::execute(args, &manifest),
        Commands::Files(args) => commands::files::execute(args, &manifest),
    }
}
