use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd;
mod output;
mod prompts;

/// mpysync - selective MicroPython deployment over serial
#[derive(Parser)]
#[command(name = "mpysync")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Compile the project and deploy changed files to the board
  Install {
    /// Path to the project root
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Serial port the board is connected to
    #[arg(short, long, default_value = "/dev/ttyUSB0")]
    port: String,

    /// Transfer every file, even those the board reports as unchanged
    #[arg(short, long)]
    force: bool,
  },

  /// Run the project's entry module locally
  Run {
    /// Path to the project root
    #[arg(default_value = ".")]
    path: PathBuf,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let default_filter = if cli.verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
    .without_time()
    .init();

  match cli.command {
    Commands::Install { path, port, force } => cmd::cmd_install(&path, &port, force),
    Commands::Run { path } => cmd::cmd_run(&path),
  }
}
