//! DirectDraw Surface (DDS) container parsing.
//!
//! Only the base mip level of the first surface is extracted. The data is
//! handed to the renderer untouched, so packs must store DDS files already
//! flipped into the emulator's row order.
//!
//! ```text
//! offset  size  field
//! 0       4     magic "DDS "
//! 4       124   DDS_HEADER (pixel format at header offset 72)
//! 128     20    DDS_HEADER_DXT10 (only when FourCC is "DX10")
//! ...           surface data, base level first
//! ```

use super::{CodecError, DecodedImage};
use crate::texture::PixelFormat;

const CONTAINER: &str = "DDS";

const MAGIC: &[u8; 4] = b"DDS ";
const HEADER_SIZE: u32 = 124;
const DATA_OFFSET: usize = 4 + HEADER_SIZE as usize;
const DX10_DATA_OFFSET: usize = DATA_OFFSET + 20;

// Offsets relative to the start of the file
const HEIGHT_OFFSET: usize = 12;
const WIDTH_OFFSET: usize = 16;
const PF_FLAGS_OFFSET: usize = 80;
const PF_FOURCC_OFFSET: usize = 84;
const PF_BIT_COUNT_OFFSET: usize = 88;
const PF_R_MASK_OFFSET: usize = 92;

const DDPF_FOURCC: u32 = 0x4;
const DDPF_RGB: u32 = 0x40;

/// Check for the DDS magic.
pub fn is_dds(bytes: &[u8]) -> bool {
    bytes.starts_with(MAGIC)
}

fn read_u32(bytes: &[u8], offset: usize) -> Result<u32, CodecError> {
    bytes
        .get(offset..offset + 4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .ok_or(CodecError::Truncated {
            container: CONTAINER,
            needed: offset + 4,
            available: bytes.len(),
        })
}

/// Map a DXGI format from the DX10 extension header.
fn from_dxgi(dxgi_format: u32) -> Result<PixelFormat, CodecError> {
    match dxgi_format {
        // R8G8B8A8_UNORM, R8G8B8A8_UNORM_SRGB
        28 | 29 => Ok(PixelFormat::Rgba8),
        // BC1_UNORM, BC1_UNORM_SRGB
        71 | 72 => Ok(PixelFormat::Bc1),
        // BC3_UNORM, BC3_UNORM_SRGB
        77 | 78 => Ok(PixelFormat::Bc3),
        // BC5_UNORM, BC5_SNORM
        83 | 84 => Ok(PixelFormat::Bc5),
        // BC7_UNORM, BC7_UNORM_SRGB
        98 | 99 => Ok(PixelFormat::Bc7),
        other => Err(CodecError::UnsupportedFormat(format!("DXGI format {other}"))),
    }
}

/// Extract the base level of a DDS file.
pub fn decode(bytes: &[u8]) -> Result<DecodedImage, CodecError> {
    if bytes.len() < DATA_OFFSET {
        return Err(CodecError::Truncated {
            container: CONTAINER,
            needed: DATA_OFFSET,
            available: bytes.len(),
        });
    }
    if !is_dds(bytes) {
        return Err(CodecError::InvalidHeader {
            container: CONTAINER,
            reason: "missing DDS magic".to_string(),
        });
    }

    let header_size = read_u32(bytes, 4)?;
    if header_size != HEADER_SIZE {
        return Err(CodecError::InvalidHeader {
            container: CONTAINER,
            reason: format!("header size {header_size}, expected {HEADER_SIZE}"),
        });
    }

    let height = read_u32(bytes, HEIGHT_OFFSET)?;
    let width = read_u32(bytes, WIDTH_OFFSET)?;
    if width == 0 || height == 0 {
        return Err(CodecError::InvalidDimensions {
            width,
            height,
            reason: "zero-sized surface".to_string(),
        });
    }

    let pf_flags = read_u32(bytes, PF_FLAGS_OFFSET)?;
    let mut swap_red_blue = false;
    let (format, data_offset) = if pf_flags & DDPF_FOURCC != 0 {
        let fourcc = &bytes[PF_FOURCC_OFFSET..PF_FOURCC_OFFSET + 4];
        match fourcc {
            b"DXT1" => (PixelFormat::Bc1, DATA_OFFSET),
            b"DXT4" | b"DXT5" => (PixelFormat::Bc3, DATA_OFFSET),
            b"ATI2" | b"BC5U" => (PixelFormat::Bc5, DATA_OFFSET),
            b"DX10" => (from_dxgi(read_u32(bytes, DATA_OFFSET)?)?, DX10_DATA_OFFSET),
            other => {
                return Err(CodecError::UnsupportedFormat(format!(
                    "FourCC {}",
                    String::from_utf8_lossy(other)
                )))
            }
        }
    } else if pf_flags & DDPF_RGB != 0 && read_u32(bytes, PF_BIT_COUNT_OFFSET)? == 32 {
        match read_u32(bytes, PF_R_MASK_OFFSET)? {
            0x0000_00FF => {}
            0x00FF_0000 => swap_red_blue = true,
            mask => {
                return Err(CodecError::UnsupportedFormat(format!(
                    "32-bit RGB with red mask {mask:#010X}"
                )))
            }
        }
        (PixelFormat::Rgba8, DATA_OFFSET)
    } else {
        return Err(CodecError::UnsupportedFormat(format!(
            "pixel format flags {pf_flags:#X}"
        )));
    };

    let size = format
        .level_size(width, height)
        .ok_or_else(|| CodecError::InvalidDimensions {
            width,
            height,
            reason: format!("{format} level size overflows"),
        })?;
    let end = data_offset
        .checked_add(size)
        .ok_or_else(|| CodecError::InvalidDimensions {
            width,
            height,
            reason: format!("{format} level ends past the addressable range"),
        })?;
    let mut data = bytes
        .get(data_offset..end)
        .ok_or(CodecError::Truncated {
            container: CONTAINER,
            needed: end,
            available: bytes.len(),
        })?
        .to_vec();

    if swap_red_blue {
        for pixel in data.chunks_exact_mut(4) {
            pixel.swap(0, 2);
        }
    }

    Ok(DecodedImage {
        width,
        height,
        format,
        data,
    })
}
