//! CLI error types.

use std::path::PathBuf;

use thiserror::Error;
use texpack::config::ConfigError;

/// Errors surfaced to the user by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// No `--user-root` given and no platform data directory.
    #[error("Unable to determine a user data directory, pass --user-root")]
    NoUserRoot,

    /// The program's load directory is missing.
    #[error("No texture pack at {0}")]
    PackNotFound(PathBuf),

    /// Reading or writing pack configuration failed.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CliError::PackNotFound(PathBuf::from("/data/textures/0000000000000001"));
        assert_eq!(
            err.to_string(),
            "No texture pack at /data/textures/0000000000000001"
        );

        let err = CliError::from(ConfigError::InvalidHash("zz".to_string()));
        assert_eq!(err.to_string(), "Invalid hash literal 'zz'");
    }
}
