//! # ectd CLI entry point
//!
//! Parses arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ectd_cli::assemble::{run_assemble, AssembleArgs};
use ectd_cli::manifest::{run_manifest, ManifestArgs};
use ectd_cli::missing::{run_missing, MissingArgs};
use ectd_cli::regions::{run_regions, RegionsArgs};

/// eCTD sequence assembler toolchain.
///
/// Builds submission sequences from plan files, previews required-document
/// coverage, verifies published trees, and inspects region rules.
#[derive(Parser, Debug)]
#[command(name = "ectd", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Submission root directory.
    #[arg(long, global = true, default_value = "./submissions")]
    root: PathBuf,

    /// Region rule YAML overriding the built-in profiles.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Assemble and publish a sequence from a plan file.
    Assemble(AssembleArgs),

    /// Report required modules a plan leaves uncovered.
    Missing(MissingArgs),

    /// Backbone manifest operations (verify).
    Manifest(ManifestArgs),

    /// Print the active region rule table.
    Regions(RegionsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = cli.config.as_deref();
    let result = match &cli.command {
        Commands::Assemble(args) => run_assemble(args, &cli.root, config),
        Commands::Missing(args) => run_missing(args, config),
        Commands::Manifest(args) => run_manifest(args),
        Commands::Regions(args) => run_regions(args, config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
