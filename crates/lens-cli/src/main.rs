mod commands;
mod display;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lens", about = "Image viewer tools: fit math, safe in-place rotation")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show image metadata and how it would be framed
    Info(commands::info::InfoArgs),
    /// Rotate an image in place through the backup/rollback pipeline
    Rotate(commands::rotate::RotateArgs),
    /// Restore files from backups left by an interrupted rotation
    Recover(commands::recover::RecoverArgs),
    /// Print or save the default viewer config as TOML
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Info(args) => commands::info::run(args),
        Commands::Rotate(args) => commands::rotate::run(args),
        Commands::Recover(args) => commands::recover::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
