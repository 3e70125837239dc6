mod commands;
mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use commands::{ExportCamerasArgs, Ply2TxtArgs, SubsampleArgs};

#[derive(Parser)]
#[command(name = "splatprep", version, about = "Prepare point clouds and cameras for Gaussian-splat training", long_about = None)]
struct Cli {
    /// Configuration file [default: $SPLATPREP_CONFIG, then ./splatprep.toml]
    #[arg(long, global = true, value_name = "TOML")]
    config: Option<PathBuf>,

    /// Log at debug level (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Keep exactly N points, spread evenly along a Morton curve
    Subsample(SubsampleArgs),

    /// Convert a colored PLY cloud to COLMAP points3D.txt
    Ply2txt(Ply2TxtArgs),

    /// Convert Open3D camera JSON files to COLMAP cameras.txt and images.txt
    ExportCameras(ExportCamerasArgs),
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = config::load_config(cli.config.as_deref()).context("failed to load configuration")?;

    match &cli.command {
        Commands::Subsample(args) => commands::run_subsample(args, &config),
        Commands::Ply2txt(args) => commands::run_ply2txt(args),
        Commands::ExportCameras(args) => commands::run_export_cameras(args, &config),
    }
}
