//! Commented `pack.ini` template for pack authors.

use std::path::Path;

use tracing::info;

use super::{ConfigError, PACK_CONFIG_FILENAME};

/// Template written next to dumped textures so authors start from a
/// non-legacy pack.
pub const DEFAULT_PACK_CONFIG: &str = r#"
[Info]
# The name of the pack (without whitespaces)
name =

# The author of the pack (without whitespaces)
author =

[Options]
# Skip mipmap uploads to surfaces and generate them from the base level instead.
# Intended for legacy packs only; enabling it disables DDS/KTX support.
# 0: Off (Default), 1: On
skip_mipmap =

# Flip PNG files vertically on load. Leave disabled for packs whose PNGs are
# already stored in the order the game expects.
# 0: Off (Default), 1: On
flip_png_files =

# Use the new, faster texture hash. Disabling it marks the pack as legacy.
# 0: Off, 1: On (Default)
use_new_hash =

# Map individual hashes to specific filenames
#[Hashes]
#DBD0A793F2756679 = bottom_screen.png
"#;

/// Write [`DEFAULT_PACK_CONFIG`] into `dir` unless a `pack.ini` is already
/// there. Returns `true` when a file was written.
pub fn write_default_config(dir: &Path) -> Result<bool, ConfigError> {
    let path = dir.join(PACK_CONFIG_FILENAME);
    if path.exists() {
        return Ok(false);
    }

    std::fs::create_dir_all(dir).map_err(|source| ConfigError::Write {
        path: path.clone(),
        source,
    })?;
    std::fs::write(&path, DEFAULT_PACK_CONFIG).map_err(|source| ConfigError::Write {
        path: path.clone(),
        source,
    })?;

    info!(path = %path.display(), "Wrote default pack config");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PackConfig;
    use tempfile::TempDir;

    #[test]
    fn test_write_default_config_creates_file() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("dump").join("0004000000055D00");

        assert!(write_default_config(&dir).unwrap());
        let written = std::fs::read_to_string(dir.join(PACK_CONFIG_FILENAME)).unwrap();
        assert_eq!(written, DEFAULT_PACK_CONFIG);
    }

    #[test]
    fn test_write_default_config_keeps_existing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(PACK_CONFIG_FILENAME);
        std::fs::write(&path, "[Options]\nflip_png_files = 1\n").unwrap();

        assert!(!write_default_config(temp.path()).unwrap());
        let kept = std::fs::read_to_string(&path).unwrap();
        assert!(kept.contains("flip_png_files = 1"));
    }

    #[test]
    fn test_template_loads_as_modern_pack() {
        let temp = TempDir::new().unwrap();
        write_default_config(temp.path()).unwrap();

        let config = PackConfig::load(temp.path());
        let options = config.options();
        assert!(!options.skip_mipmap());
        assert!(!options.flip_on_load());
        assert!(options.use_new_hash());
        assert!(!options.legacy_pack());
        assert!(config.hash_overrides().is_empty());
    }
}
