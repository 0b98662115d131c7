//! Cache-resident replacement texture records.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::OnceLock;

use crate::codec::DecodedImage;

use super::{FileFormat, PixelFormat};

/// Decode progress of a replacement texture.
///
/// Transitions are monotonic: `None → Pending → Decoded`, or straight from
/// `None` to `Decoded` for synchronous decodes. There is no failed state; a
/// failed decode still ends in `Decoded` with an empty buffer so the texture
/// is never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DecodeState {
    None = 0,
    Pending = 1,
    Decoded = 2,
}

impl DecodeState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => DecodeState::None,
            1 => DecodeState::Pending,
            _ => DecodeState::Decoded,
        }
    }
}

/// One replacement file discovered during the pack scan.
///
/// Everything except the decode state and decoded payload is fixed at scan
/// time. The payload is written once by the decoding thread before the state
/// is released as `Decoded`, so any thread that observes `Decoded` also sees
/// the complete buffer.
pub struct TextureDescriptor {
    hash: u64,
    file_format: FileFormat,
    path: PathBuf,
    width: u32,
    height: u32,
    state: AtomicU8,
    decoded: OnceLock<DecodedImage>,
}

impl TextureDescriptor {
    /// Create a descriptor in the `None` state.
    ///
    /// `width` and `height` come from the canonical filename and may be zero
    /// for files bound through the pack's hash table; decoded dimensions take
    /// precedence once available.
    pub fn new(
        hash: u64,
        file_format: FileFormat,
        path: impl Into<PathBuf>,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            hash,
            file_format,
            path: path.into(),
            width,
            height,
            state: AtomicU8::new(DecodeState::None as u8),
            decoded: OnceLock::new(),
        }
    }

    /// Content hash of the texture this file replaces.
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Container kind of the replacement file.
    pub fn file_format(&self) -> FileFormat {
        self.file_format
    }

    /// Path of the replacement file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decoded width, or the filename width before a successful decode.
    pub fn width(&self) -> u32 {
        self.usable().map_or(self.width, |image| image.width)
    }

    pub fn height(&self) -> u32 {
        self.usable().map_or(self.height, |image| image.height)
    }

    /// Pixel format of the decoded data (RGBA8 until decoded).
    pub fn format(&self) -> PixelFormat {
        self.decoded().map_or(PixelFormat::Rgba8, |image| image.format)
    }

    pub fn state(&self) -> DecodeState {
        DecodeState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_none(&self) -> bool {
        self.state() == DecodeState::None
    }

    pub fn is_pending(&self) -> bool {
        self.state() == DecodeState::Pending
    }

    pub fn is_decoded(&self) -> bool {
        self.state() == DecodeState::Decoded
    }

    /// Decoded payload, available once the state is `Decoded`.
    pub fn decoded(&self) -> Option<&DecodedImage> {
        if self.is_decoded() {
            self.decoded.get()
        } else {
            None
        }
    }

    fn usable(&self) -> Option<&DecodedImage> {
        self.decoded().filter(|image| !image.is_empty())
    }

    /// Decoded pixel bytes; empty until decoded or after a failed decode.
    pub fn data(&self) -> &[u8] {
        self.decoded()
            .map(|image| image.data.as_slice())
            .unwrap_or_default()
    }

    /// Claim the right to schedule this texture's decode.
    ///
    /// Returns `true` for exactly one caller: the one that moved the state
    /// from `None` to `Pending`.
    pub(crate) fn try_begin_decode(&self) -> bool {
        self.state
            .compare_exchange(
                DecodeState::None as u8,
                DecodeState::Pending as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Store the decoded payload and release the `Decoded` state.
    ///
    /// Returns `false` if another thread already published a payload, in
    /// which case the given image is dropped.
    pub(crate) fn publish(&self, image: DecodedImage) -> bool {
        let stored = self.decoded.set(image).is_ok();
        self.state
            .store(DecodeState::Decoded as u8, Ordering::Release);
        stored
    }
}

impl fmt::Debug for TextureDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextureDescriptor")
            .field("hash", &format_args!("{:016X}", self.hash))
            .field("file_format", &self.file_format)
            .field("path", &self.path)
            .field("width", &self.width())
            .field("height", &self.height())
            .field("state", &self.state())
            .field("data_len", &self.data().len())
            .finish()
    }
}
