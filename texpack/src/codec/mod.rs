//! Image codec abstractions for replacement textures.
//!
//! The cache never touches image bytes directly; it goes through the
//! [`ImageCodec`] trait so frontends can substitute their own decoders.
//!
//! ```text
//! ┌─────────────────────┐
//! │ CustomTextureCache  │
//! │                     │
//! │ Arc<dyn ImageCodec> │
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │    ImageCodec       │ (trait)
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │   StandardCodec     │  PNG via `image`, DDS/KTX header parsing
//! └─────────────────────┘
//! ```

pub mod dds;
mod error;
mod flip;
pub mod ktx;
pub mod png;

use std::path::Path;

pub use error::CodecError;
pub use flip::flip_rgba8;

use crate::texture::PixelFormat;

/// Pixel data produced by a decode.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub data: Vec<u8>,
}

impl DecodedImage {
    /// Placeholder stored when a decode fails.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the image carries no pixel data (a failed decode).
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Image decoding and encoding used by the texture cache.
///
/// Implementations are called from worker threads.
pub trait ImageCodec: Send + Sync {
    /// Decode an uncompressed image container into RGBA8 pixels.
    fn decode_png(&self, bytes: &[u8]) -> Result<DecodedImage, CodecError>;

    /// Extract the base level of a compressed container (DDS or KTX)
    /// together with its native pixel format.
    fn decode_compressed(&self, bytes: &[u8]) -> Result<DecodedImage, CodecError>;

    /// Write RGBA8 pixels to `path` as PNG.
    fn encode_png(&self, path: &Path, rgba: &[u8], width: u32, height: u32)
        -> Result<(), CodecError>;
}

/// Default codec: PNG through the `image` crate, DDS and KTX parsed in-crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardCodec;

impl ImageCodec for StandardCodec {
    fn decode_png(&self, bytes: &[u8]) -> Result<DecodedImage, CodecError> {
        png::decode(bytes)
    }

    fn decode_compressed(&self, bytes: &[u8]) -> Result<DecodedImage, CodecError> {
        if ktx::is_ktx(bytes) {
            ktx::decode(bytes)
        } else {
            dds::decode(bytes)
        }
    }

    fn encode_png(
        &self,
        path: &Path,
        rgba: &[u8],
        width: u32,
        height: u32,
    ) -> Result<(), CodecError> {
        png::encode(path, rgba, width, height)
    }
}
