//! Error types for pack configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading or writing `pack.ini`.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read or parsed.
    #[error("Failed to read pack config {path}: {message}")]
    Read { path: PathBuf, message: String },

    /// A `[Hashes]` key is not a 64-bit hex literal.
    #[error("Invalid hash literal '{0}'")]
    InvalidHash(String),

    /// Writing the default config template failed.
    #[error("Failed to write pack config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
