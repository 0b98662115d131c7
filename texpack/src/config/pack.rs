//! Pack options and hash overrides read from `pack.ini`.

use std::collections::HashMap;
use std::path::Path;

use ini::{Ini, ParseOption};
use tracing::{error, info, warn};

use super::ConfigError;
use crate::texture::HexHash;

/// Name of the per-pack config file, looked up in the load root.
pub const PACK_CONFIG_FILENAME: &str = "pack.ini";

const OPTIONS_SECTION: &str = "Options";
const HASHES_SECTION: &str = "Hashes";

/// Options governing how a pack's files are interpreted.
///
/// `legacy_pack` is derived: a pack that skips mipmaps or uses the old hash
/// predates compressed container support, so DDS and KTX files are refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackOptions {
    skip_mipmap: bool,
    flip_on_load: bool,
    use_new_hash: bool,
    legacy_pack: bool,
}

impl Default for PackOptions {
    /// Defaults for a pack that ships a `pack.ini` without overriding anything.
    fn default() -> Self {
        Self::new(false, false, true)
    }
}

impl PackOptions {
    /// Build options from explicit values, deriving `legacy_pack`.
    pub fn new(skip_mipmap: bool, flip_on_load: bool, use_new_hash: bool) -> Self {
        Self {
            skip_mipmap,
            flip_on_load,
            use_new_hash,
            legacy_pack: skip_mipmap || !use_new_hash,
        }
    }

    /// Options for a pack without any `pack.ini`.
    pub fn legacy() -> Self {
        Self {
            skip_mipmap: true,
            flip_on_load: true,
            use_new_hash: false,
            legacy_pack: true,
        }
    }

    pub fn skip_mipmap(&self) -> bool {
        self.skip_mipmap
    }

    /// Whether PNG rows are reversed after decoding (`flip_png_files`).
    pub fn flip_on_load(&self) -> bool {
        self.flip_on_load
    }

    pub fn use_new_hash(&self) -> bool {
        self.use_new_hash
    }

    /// Whether compressed containers must be refused.
    pub fn legacy_pack(&self) -> bool {
        self.legacy_pack
    }
}

/// Resolved pack configuration: options plus explicit filename→hash bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackConfig {
    options: PackOptions,
    hash_overrides: HashMap<String, u64>,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            options: PackOptions::legacy(),
            hash_overrides: HashMap::new(),
        }
    }
}

impl PackConfig {
    /// Load `pack.ini` from `dir`.
    ///
    /// Never fails: a missing or unreadable file yields legacy defaults.
    pub fn load(dir: &Path) -> Self {
        let path = dir.join(PACK_CONFIG_FILENAME);
        if !path.is_file() {
            info!(
                path = %path.display(),
                "Unable to find pack config file, using legacy defaults"
            );
            return Self::default();
        }

        match read_ini(&path) {
            Ok(ini) => Self::from_ini(&ini),
            Err(e) => {
                error!(error = %e, "Pack config unreadable, using legacy defaults");
                Self::default()
            }
        }
    }

    /// Resolve options and overrides from a parsed INI document.
    pub fn from_ini(ini: &Ini) -> Self {
        let options = ini.section(Some(OPTIONS_SECTION));
        let flag = |key: &str, default: bool| {
            options
                .and_then(|props| props.get(key))
                .map_or(default, |value| parse_bool(value, default))
        };

        let options = PackOptions::new(
            flag("skip_mipmap", false),
            flag("flip_png_files", false),
            flag("use_new_hash", true),
        );
        if options.skip_mipmap() {
            warn!("Skip mipmap option is enabled, pack is considered legacy");
        }
        if !options.use_new_hash() {
            warn!("Legacy hash is used, pack is considered legacy");
        }

        let mut hash_overrides: HashMap<String, u64> = HashMap::new();
        if let Some(hashes) = ini.section(Some(HASHES_SECTION)) {
            for (key, file) in hashes.iter() {
                let hash = match parse_hash_literal(key) {
                    Ok(hash) => hash,
                    Err(e) => {
                        error!(key, file, error = %e, "Hash mapping is invalid, skipping");
                        continue;
                    }
                };

                let filename = bare_filename(file).to_string();
                if let Some(existing) = hash_overrides.get(&filename) {
                    error!(
                        file,
                        key,
                        existing = %HexHash(*existing),
                        "File is already mapped to another hash, skipping"
                    );
                    continue;
                }
                hash_overrides.insert(filename, hash);
            }
        }

        Self {
            options,
            hash_overrides,
        }
    }

    pub fn options(&self) -> PackOptions {
        self.options
    }

    /// Explicit hash for a bare file name, if `[Hashes]` binds one.
    pub fn hash_for(&self, filename: &str) -> Option<u64> {
        self.hash_overrides.get(filename).copied()
    }

    pub fn hash_overrides(&self) -> &HashMap<String, u64> {
        &self.hash_overrides
    }
}

fn read_ini(path: &Path) -> Result<Ini, ConfigError> {
    // Escapes off so Windows-style paths in [Hashes] survive intact
    let opt = ParseOption {
        enabled_escape: false,
        ..ParseOption::default()
    };
    Ini::load_from_file_opt(path, opt).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Parse a hex hash literal such as `DBD0A793F2756679` or `0xdbd0a793`.
pub fn parse_hash_literal(literal: &str) -> Result<u64, ConfigError> {
    let trimmed = literal.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if digits.is_empty() || digits.len() > 16 || !digits.bytes().all(|b| b.is_ascii_hexdigit())
    {
        return Err(ConfigError::InvalidHash(literal.to_string()));
    }

    u64::from_str_radix(digits, 16).map_err(|_| ConfigError::InvalidHash(literal.to_string()))
}

/// INI boolean: `true/yes/on/1` or `false/no/off/0`, anything else is `default`.
fn parse_bool(value: &str, default: bool) -> bool {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => true,
        "false" | "no" | "off" | "0" => false,
        _ => default,
    }
}

/// Last path component, accepting either separator.
fn bare_filename(value: &str) -> &str {
    value
        .trim()
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
}
