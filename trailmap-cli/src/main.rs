//! Trailmap CLI - Command-line interface
//!
//! Runs the moving map on a Linux board, renders previews and snapshots, and
//! manages the configuration file.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::preview::PreviewArgs;
use commands::run::RunArgs;
use commands::snapshot::SnapshotArgs;

#[derive(Debug, Parser)]
#[command(name = "trailmap", version, about = "GPS moving map for SPI TFT panels")]
struct Cli {
    /// Configuration file (defaults to the per-user config.ini)
    #[arg(long = "config", global = true, value_name = "FILE")]
    config_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Follow the GPS and keep the panel updated
    Run(RunArgs),

    /// Show the map for a fixed position on the panel
    Preview(PreviewArgs),

    /// Render the map for a fixed position to an image file
    Snapshot(SnapshotArgs),

    /// Describe the tile database
    Info {
        /// MBTiles database (overrides tiles.path)
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// View or change configuration settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run(args) => commands::run::run(cli.config_file, args),
        Commands::Preview(args) => commands::preview::run(cli.config_file, args),
        Commands::Snapshot(args) => commands::snapshot::run(cli.config_file, args),
        Commands::Info { db } => commands::info::run(cli.config_file, db),
        Commands::Init { force } => commands::init::run(cli.config_file, force),
        Commands::Config { command } => commands::config::run(cli.config_file, command),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
