//! Container kinds and pixel formats of replacement textures.

use std::fmt;
use std::path::Path;

/// On-disk container kind of a replacement file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    /// Uncompressed PNG image, decoded to RGBA8 on the CPU.
    Png,
    /// DirectDraw Surface container holding pre-compressed data.
    Dds,
    /// Khronos KTX (version 1) container holding pre-compressed data.
    Ktx,
}

impl FileFormat {
    /// Classify a file extension (without the dot, case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        if ext.eq_ignore_ascii_case("png") {
            Some(FileFormat::Png)
        } else if ext.eq_ignore_ascii_case("dds") {
            Some(FileFormat::Dds)
        } else if ext.eq_ignore_ascii_case("ktx") {
            Some(FileFormat::Ktx)
        } else {
            None
        }
    }

    /// Classify a path by its extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Canonical lower-case extension.
    pub fn extension(&self) -> &'static str {
        match self {
            FileFormat::Png => "png",
            FileFormat::Dds => "dds",
            FileFormat::Ktx => "ktx",
        }
    }

    /// Whether the container carries GPU-compressed data.
    ///
    /// Legacy packs refuse these containers.
    pub fn is_compressed(&self) -> bool {
        matches!(self, FileFormat::Dds | FileFormat::Ktx)
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileFormat::Png => write!(f, "PNG"),
            FileFormat::Dds => write!(f, "DDS"),
            FileFormat::Ktx => write!(f, "KTX"),
        }
    }
}

/// Pixel format of a decoded replacement texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PixelFormat {
    #[default]
    Rgba8,
    Bc1,
    Bc3,
    Bc5,
    Bc7,
    Astc4,
    Astc6,
    Astc8,
}

impl PixelFormat {
    /// Block footprint in texels (1×1 for uncompressed data).
    pub fn block_dimensions(&self) -> (u32, u32) {
        match self {
            PixelFormat::Rgba8 => (1, 1),
            PixelFormat::Bc1 | PixelFormat::Bc3 | PixelFormat::Bc5 | PixelFormat::Bc7 => (4, 4),
            PixelFormat::Astc4 => (4, 4),
            PixelFormat::Astc6 => (6, 6),
            PixelFormat::Astc8 => (8, 6),
        }
    }

    /// Bytes per block (per texel for uncompressed data).
    pub fn block_size(&self) -> usize {
        match self {
            PixelFormat::Rgba8 => 4,
            PixelFormat::Bc1 => 8,
            _ => 16,
        }
    }

    /// Whether the format is block compressed.
    pub fn is_compressed(&self) -> bool {
        !matches!(self, PixelFormat::Rgba8)
    }

    /// Size in bytes of a single mip level with the given dimensions.
    ///
    /// Returns `None` when the size does not fit in `usize`. Dimensions come
    /// straight from file headers, so callers must treat that as a bad file.
    pub fn level_size(&self, width: u32, height: u32) -> Option<usize> {
        let (block_w, block_h) = self.block_dimensions();
        let blocks_wide = width.div_ceil(block_w) as usize;
        let blocks_high = height.div_ceil(block_h) as usize;
        blocks_wide
            .checked_mul(blocks_high)?
            .checked_mul(self.block_size())
    }

    /// Short name for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            PixelFormat::Rgba8 => "RGBA8",
            PixelFormat::Bc1 => "BC1",
            PixelFormat::Bc3 => "BC3",
            PixelFormat::Bc5 => "BC5",
            PixelFormat::Bc7 => "BC7",
            PixelFormat::Astc4 => "ASTC4x4",
            PixelFormat::Astc6 => "ASTC6x6",
            PixelFormat::Astc8 => "ASTC8x6",
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension_is_case_insensitive() {
        assert_eq!(FileFormat::from_extension("png"), Some(FileFormat::Png));
        assert_eq!(FileFormat::from_extension("PNG"), Some(FileFormat::Png));
        assert_eq!(FileFormat::from_extension("Dds"), Some(FileFormat::Dds));
        assert_eq!(FileFormat::from_extension("ktx"), Some(FileFormat::Ktx));
        assert_eq!(FileFormat::from_extension("jpg"), None);
        assert_eq!(FileFormat::from_extension(""), None);
    }

    #[test]
    fn test_from_path() {
        let path = Path::new("/packs/0004000000030800/tex1_64x64_00000000DEADBEEF_12.ktx");
        assert_eq!(FileFormat::from_path(path), Some(FileFormat::Ktx));
        assert_eq!(FileFormat::from_path(Path::new("pack.ini")), None);
        assert_eq!(FileFormat::from_path(Path::new("README")), None);
    }

    #[test]
    fn test_compressed_containers() {
        assert!(!FileFormat::Png.is_compressed());
        assert!(FileFormat::Dds.is_compressed());
        assert!(FileFormat::Ktx.is_compressed());
    }

    #[test]
    fn test_level_size_uncompressed() {
        assert_eq!(PixelFormat::Rgba8.level_size(256, 256), Some(256 * 256 * 4));
        assert_eq!(PixelFormat::Rgba8.level_size(3, 5), Some(60));
    }

    #[test]
    fn test_level_size_rounds_up_to_blocks() {
        // 5×5 needs 2×2 blocks
        assert_eq!(PixelFormat::Bc1.level_size(5, 5), Some(4 * 8));
        assert_eq!(PixelFormat::Bc3.level_size(5, 5), Some(4 * 16));
        assert_eq!(PixelFormat::Bc7.level_size(1, 1), Some(16));
        // 8×6 blocks: 16×12 → 2×2 blocks
        assert_eq!(PixelFormat::Astc8.level_size(16, 12), Some(4 * 16));
        assert_eq!(PixelFormat::Astc6.level_size(12, 12), Some(4 * 16));
    }

    #[test]
    fn test_level_size_overflow_is_none() {
        // 2^31 * 2^31 * 4 = 2^64
        assert_eq!(PixelFormat::Rgba8.level_size(0x8000_0000, 0x8000_0000), None);
        assert_eq!(PixelFormat::Rgba8.level_size(u32::MAX, u32::MAX), None);
        // 4×4 blocks keep the same header dimensions in range
        assert!(PixelFormat::Bc1.level_size(0x8000_0000, 0x8000_0000).is_some());
    }

    #[test]
    fn test_pixel_format_display() {
        assert_eq!(PixelFormat::Rgba8.to_string(), "RGBA8");
        assert_eq!(PixelFormat::Astc6.to_string(), "ASTC6x6");
        assert_eq!(PixelFormat::default(), PixelFormat::Rgba8);
    }
}
