//! PNG decoding and encoding through the `image` crate.

use std::path::Path;

use image::{ExtendedColorType, ImageFormat};

use super::{CodecError, DecodedImage};
use crate::texture::PixelFormat;

/// Decode PNG bytes into a tightly packed RGBA8 image.
///
/// Palette, grey and 16-bit images are converted to 8-bit RGBA.
pub fn decode(bytes: &[u8]) -> Result<DecodedImage, CodecError> {
    let image = image::load_from_memory_with_format(bytes, ImageFormat::Png)
        .map_err(|e| CodecError::PngDecode(e.to_string()))?;

    let rgba = image.into_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(DecodedImage {
        width,
        height,
        format: PixelFormat::Rgba8,
        data: rgba.into_raw(),
    })
}

/// Encode an RGBA8 buffer as a PNG file at `path`.
pub fn encode(path: &Path, rgba: &[u8], width: u32, height: u32) -> Result<(), CodecError> {
    let expected = PixelFormat::Rgba8
        .level_size(width, height)
        .filter(|&size| size > 0)
        .ok_or_else(|| CodecError::InvalidDimensions {
            width,
            height,
            reason: "surface size is zero or overflows".to_string(),
        })?;
    if rgba.len() < expected {
        return Err(CodecError::InvalidDimensions {
            width,
            height,
            reason: format!("buffer holds {} bytes, need {}", rgba.len(), expected),
        });
    }

    image::save_buffer_with_format(
        path,
        &rgba[..expected],
        width,
        height,
        ExtendedColorType::Rgba8,
        ImageFormat::Png,
    )
    .map_err(|e| CodecError::PngEncode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
