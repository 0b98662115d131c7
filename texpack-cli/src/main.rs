//! Texpack CLI - inspect and prepare custom texture packs
//!
//! ```bash
//! # List what a pack provides
//! texpack scan --program-id 0004000000055D00 --list
//!
//! # Decode every texture once to find broken files
//! texpack preload --program-id 0004000000055D00
//!
//! # Write a pack.ini template next to dumped textures
//! texpack init --program-id 0004000000055D00
//! ```

mod commands;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use commands::{init, preload, scan};
use error::CliError;

#[derive(Debug, Parser)]
#[command(
    name = "texpack",
    author,
    version,
    about = "Inspect and preload custom texture replacement packs"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// User data directory holding `textures/` and `dump-textures/`
    #[arg(long, global = true)]
    user_root: Option<PathBuf>,

    /// Show debug diagnostics (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scan a program's pack and report what it registers
    Scan(scan::ScanArgs),

    /// Decode every texture in a pack on the worker pool
    Preload(preload::PreloadArgs),

    /// Write a default pack.ini into a program's dump directory
    Init(init::InitArgs),
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    let user_root = commands::resolve_user_root(cli.user_root)?;
    debug!(user_root = %user_root.display(), "Using user data directory");

    match cli.command {
        Commands::Scan(args) => scan::run(&user_root, args),
        Commands::Preload(args) => preload::run(&user_root, args),
        Commands::Init(args) => init::run(&user_root, args),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
