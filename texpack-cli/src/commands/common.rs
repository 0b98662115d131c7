//! Common arguments and helpers shared across CLI commands.

use std::path::{Path, PathBuf};

use clap::Args;
use texpack::config::parse_hash_literal;
use texpack::settings::CacheSettings;

use crate::error::CliError;

/// Directory name used under the platform data directory.
const APP_DIR: &str = "texpack";

/// Selects the program whose pack a command works on.
#[derive(Debug, Clone, Args)]
pub struct ProgramArgs {
    /// Program id as hex (e.g. 0004000000055D00)
    #[arg(long, short, value_parser = parse_program_id)]
    pub program_id: u64,

    /// Worker threads (defaults to hardware threads minus one)
    #[arg(long)]
    pub workers: Option<usize>,
}

impl ProgramArgs {
    /// Cache settings for this program under `user_root`.
    pub fn settings(&self, user_root: &Path) -> CacheSettings {
        let settings = CacheSettings::new(user_root, self.program_id);
        match self.workers {
            Some(workers) => settings.with_worker_count(workers),
            None => settings,
        }
    }
}

/// Parse a program id for clap.
pub fn parse_program_id(value: &str) -> Result<u64, String> {
    parse_hash_literal(value)
        .map_err(|_| format!("'{value}' is not a hex program id of at most 16 digits"))
}

/// `--user-root` if given, else `<data dir>/texpack`.
pub fn resolve_user_root(cli_root: Option<PathBuf>) -> Result<PathBuf, CliError> {
    match cli_root {
        Some(root) => Ok(root),
        None => dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(CliError::NoUserRoot),
    }
}

/// Format a byte count for display.
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;
    const GB: usize = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
