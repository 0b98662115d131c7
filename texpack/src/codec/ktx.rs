//! KTX (version 1) container parsing.
//!
//! ```text
//! offset  size  field
//! 0       12    identifier «KTX 11»\r\n\x1A\n
//! 12      4     endianness (0x04030201 in file byte order)
//! 28      4     glInternalFormat
//! 36      8     pixelWidth, pixelHeight
//! 60      4     bytesOfKeyValueData
//! 64      ..    key/value data, then imageSize + base level
//! ```
//!
//! As with DDS, only the first face/layer of the base level is returned and
//! no row flip is applied.

use super::{CodecError, DecodedImage};
use crate::texture::PixelFormat;

const CONTAINER: &str = "KTX";

const IDENTIFIER: [u8; 12] = [
    0xAB, 0x4B, 0x54, 0x58, 0x20, 0x31, 0x31, 0xBB, 0x0D, 0x0A, 0x1A, 0x0A,
];
const ENDIANNESS: u32 = 0x0403_0201;
const HEADER_SIZE: usize = 64;

const INTERNAL_FORMAT_OFFSET: usize = 28;
const WIDTH_OFFSET: usize = 36;
const HEIGHT_OFFSET: usize = 40;
const KEY_VALUE_BYTES_OFFSET: usize = 60;

/// Check for the KTX 1.1 identifier.
pub fn is_ktx(bytes: &[u8]) -> bool {
    bytes.starts_with(&IDENTIFIER)
}

/// Field reader honouring the file's declared byte order.
struct Reader<'a> {
    bytes: &'a [u8],
    big_endian: bool,
}

impl Reader<'_> {
    fn u32(&self, offset: usize) -> Result<u32, CodecError> {
        let end = offset.saturating_add(4);
        let b = self
            .bytes
            .get(offset..end)
            .ok_or(CodecError::Truncated {
                container: CONTAINER,
                needed: end,
                available: self.bytes.len(),
            })?;
        let raw = [b[0], b[1], b[2], b[3]];
        Ok(if self.big_endian {
            u32::from_be_bytes(raw)
        } else {
            u32::from_le_bytes(raw)
        })
    }
}

/// Map a GL internal format to a renderer pixel format.
fn from_gl_internal_format(internal_format: u32) -> Result<PixelFormat, CodecError> {
    match internal_format {
        // GL_RGBA8, GL_SRGB8_ALPHA8
        0x8058 | 0x8C43 => Ok(PixelFormat::Rgba8),
        // S3TC DXT1 (RGB/RGBA, linear/sRGB)
        0x83F0 | 0x83F1 | 0x8C4C | 0x8C4D => Ok(PixelFormat::Bc1),
        // S3TC DXT5 (linear/sRGB)
        0x83F3 | 0x8C4F => Ok(PixelFormat::Bc3),
        // RGTC2
        0x8DBD => Ok(PixelFormat::Bc5),
        // BPTC (linear/sRGB)
        0x8E8C | 0x8E8D => Ok(PixelFormat::Bc7),
        // ASTC 4x4, 6x6, 8x6 (linear/sRGB)
        0x93B0 | 0x93D0 => Ok(PixelFormat::Astc4),
        0x93B4 | 0x93D4 => Ok(PixelFormat::Astc6),
        0x93B6 | 0x93D6 => Ok(PixelFormat::Astc8),
        other => Err(CodecError::UnsupportedFormat(format!(
            "GL internal format {other:#06X}"
        ))),
    }
}

/// Extract the base level of a KTX file.
pub fn decode(bytes: &[u8]) -> Result<DecodedImage, CodecError> {
    if bytes.len() < HEADER_SIZE {
        return Err(CodecError::Truncated {
            container: CONTAINER,
            needed: HEADER_SIZE,
            available: bytes.len(),
        });
    }
    if !is_ktx(bytes) {
        return Err(CodecError::InvalidHeader {
            container: CONTAINER,
            reason: "missing KTX 11 identifier".to_string(),
        });
    }

    let little = Reader {
        bytes,
        big_endian: false,
    };
    let marker = little.u32(12)?;
    let reader = match marker {
        ENDIANNESS => little,
        value if value.swap_bytes() == ENDIANNESS => Reader {
            bytes,
            big_endian: true,
        },
        value => {
            return Err(CodecError::InvalidHeader {
                container: CONTAINER,
                reason: format!("bad endianness marker {value:#010X}"),
            })
        }
    };

    let format = from_gl_internal_format(reader.u32(INTERNAL_FORMAT_OFFSET)?)?;
    let width = reader.u32(WIDTH_OFFSET)?;
    // 1D textures store a height of zero
    let height = reader.u32(HEIGHT_OFFSET)?.max(1);
    if width == 0 {
        return Err(CodecError::InvalidDimensions {
            width,
            height,
            reason: "zero-sized texture".to_string(),
        });
    }

    let key_value_bytes = reader.u32(KEY_VALUE_BYTES_OFFSET)? as usize;
    let image_size_offset = HEADER_SIZE.saturating_add(key_value_bytes);
    let image_size = reader.u32(image_size_offset)? as usize;
    // reader.u32 succeeded, so this is within the buffer
    let data_offset = image_size_offset + 4;

    let size = format
        .level_size(width, height)
        .ok_or_else(|| CodecError::InvalidDimensions {
            width,
            height,
            reason: format!("{format} level size overflows"),
        })?;
    if image_size < size {
        return Err(CodecError::InvalidHeader {
            container: CONTAINER,
            reason: format!("base level holds {image_size} bytes, need {size}"),
        });
    }

    let end = data_offset.saturating_add(size);
    let data = bytes
        .get(data_offset..end)
        .ok_or(CodecError::Truncated {
            container: CONTAINER,
            needed: end,
            available: bytes.len(),
        })?
        .to_vec();

    Ok(DecodedImage {
        width,
        height,
        format,
        data,
    })
}
