//! Replacement texture filename parsing.
//!
//! Pack authors name replacement files after the texture they replace:
//! `tex1_{width}x{height}_{hash}_{format}.{ext}`
//!
//! Examples:
//! - `tex1_256x256_0123456789ABCDEF_0.png`
//! - `tex1_512x128_00000000DEADBEEF_13.dds`
//!
//! The hash is the 64-bit content hash of the original texture in hex,
//! the format is the emulated pixel format id. Text after the format id
//! (such as the `_mip0` suffix of dumped files) is ignored so that dumped
//! textures can be dropped into a pack unchanged.

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

use super::FileFormat;

/// Fields encoded in a canonical replacement filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureFilename {
    /// Width of the original texture
    pub width: u32,
    /// Height of the original texture
    pub height: u32,
    /// Content hash of the original texture
    pub hash: u64,
    /// Emulated pixel format id of the original texture
    pub format: u32,
}

impl TextureFilename {
    /// Render the canonical filename with the given container extension.
    pub fn to_filename(&self, container: FileFormat) -> String {
        format!(
            "tex1_{}x{}_{:016X}_{}.{}",
            self.width,
            self.height,
            self.hash,
            self.format,
            container.extension()
        )
    }
}

/// Error parsing a replacement filename.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilenameError {
    /// Filename doesn't match expected pattern
    #[error("Filename doesn't match texture pattern")]
    InvalidPattern,
    /// Width is out of range
    #[error("Invalid width: {0}")]
    InvalidWidth(String),
    /// Height is out of range
    #[error("Invalid height: {0}")]
    InvalidHeight(String),
    /// Hash doesn't fit in 64 bits
    #[error("Invalid hash: {0}")]
    InvalidHash(String),
    /// Format id is out of range
    #[error("Invalid format id: {0}")]
    InvalidFormat(String),
}

/// Get the replacement filename regex.
///
/// We capture:
/// - Group 1: width (decimal)
/// - Group 2: height (decimal)
/// - Group 3: hash (hex)
/// - Group 4: format id (decimal)
fn texture_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^tex1_(\d+)x(\d+)_([0-9A-Fa-f]+)_(\d+)")
            .expect("texture filename pattern is valid")
    })
}

/// Parse a bare replacement filename.
///
/// # Examples
///
/// ```
/// use texpack::texture::parse_texture_filename;
///
/// let name = parse_texture_filename("tex1_256x256_0123456789ABCDEF_0.png").unwrap();
/// assert_eq!(name.width, 256);
/// assert_eq!(name.height, 256);
/// assert_eq!(name.hash, 0x0123456789ABCDEF);
/// assert_eq!(name.format, 0);
/// ```
pub fn parse_texture_filename(filename: &str) -> Result<TextureFilename, FilenameError> {
    let captures = texture_pattern()
        .captures(filename)
        .ok_or(FilenameError::InvalidPattern)?;

    let width_str = &captures[1];
    let width = width_str
        .parse::<u32>()
        .map_err(|_| FilenameError::InvalidWidth(width_str.to_string()))?;

    let height_str = &captures[2];
    let height = height_str
        .parse::<u32>()
        .map_err(|_| FilenameError::InvalidHeight(height_str.to_string()))?;

    let hash_str = &captures[3];
    let hash = u64::from_str_radix(hash_str, 16)
        .map_err(|_| FilenameError::InvalidHash(hash_str.to_string()))?;

    let format_str = &captures[4];
    let format = format_str
        .parse::<u32>()
        .map_err(|_| FilenameError::InvalidFormat(format_str.to_string()))?;

    Ok(TextureFilename {
        width,
        height,
        hash,
        format,
    })
}

/// Filename used when exporting an original texture level.
pub fn dump_filename(width: u32, height: u32, hash: u64, format: u32, level: u32) -> String {
    format!("tex1_{width}x{height}_{hash:016X}_{format}_mip{level}.png")
}
