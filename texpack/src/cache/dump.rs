//! Export of original textures for pack authors.
//!
//! Each content hash is dumped at most once per session. The copy of the
//! surface bytes is taken on the calling thread; conversion and PNG encoding
//! happen on the worker pool.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::codec::{flip_rgba8, CodecError, ImageCodec};
use crate::texture::{dump_filename, HexHash};
use crate::worker::Executor;

/// Largest surface edge that is dumped.
pub const MAX_DUMP_DIMENSION: u32 = 8192;

/// Shape of an emulated surface handed to [`DumpWriter::dump`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceInfo {
    pub width: u32,
    pub height: u32,
    /// Emulated pixel format id, carried into the dump file name.
    pub format: u32,
}

impl SurfaceInfo {
    pub fn new(width: u32, height: u32, format: u32) -> Self {
        Self {
            width,
            height,
            format,
        }
    }

    /// Size of the surface once converted to RGBA8, `None` on overflow.
    pub fn rgba8_size(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(4)
    }
}

/// Converts raw emulated surface bytes into RGBA8.
///
/// Supplied by the renderer, which knows the console's tiling and formats.
/// Called from worker threads.
pub trait SurfaceDecoder: Send + Sync {
    /// Fill `rgba` (exactly [`SurfaceInfo::rgba8_size`] bytes) from `encoded`.
    fn decode_rgba8(
        &self,
        surface: &SurfaceInfo,
        encoded: &[u8],
        rgba: &mut [u8],
    ) -> Result<(), CodecError>;
}

/// Decoder for surfaces already stored as linear RGBA8.
#[derive(Debug, Default, Clone, Copy)]
pub struct Rgba8Surface;

impl SurfaceDecoder for Rgba8Surface {
    fn decode_rgba8(
        &self,
        surface: &SurfaceInfo,
        encoded: &[u8],
        rgba: &mut [u8],
    ) -> Result<(), CodecError> {
        let source = encoded.get(..rgba.len()).ok_or_else(|| {
            CodecError::InvalidDimensions {
                width: surface.width,
                height: surface.height,
                reason: format!("surface holds {} bytes, need {}", encoded.len(), rgba.len()),
            }
        })?;
        rgba.copy_from_slice(source);
        Ok(())
    }
}

/// Session-deduplicated writer of original textures.
pub struct DumpWriter {
    dump_dir: PathBuf,
    decoder: Arc<dyn SurfaceDecoder>,
    codec: Arc<dyn ImageCodec>,
    dumped: HashSet<u64>,
}

impl DumpWriter {
    pub fn new(
        dump_dir: impl Into<PathBuf>,
        decoder: Arc<dyn SurfaceDecoder>,
        codec: Arc<dyn ImageCodec>,
    ) -> Self {
        Self {
            dump_dir: dump_dir.into(),
            decoder,
            codec,
            dumped: HashSet::new(),
        }
    }

    pub fn dump_dir(&self) -> &Path {
        &self.dump_dir
    }

    /// Queue an export of one mip level of an original texture.
    ///
    /// Returns `true` if a job was queued. Already dumped hashes and
    /// non-power-of-two surfaces (usually framebuffers) are ignored, as are
    /// surfaces with an edge above [`MAX_DUMP_DIMENSION`]. Rejected surfaces
    /// are not remembered.
    pub fn dump(
        &mut self,
        surface: SurfaceInfo,
        level: u32,
        data: &[u8],
        hash: u64,
        executor: &dyn Executor,
    ) -> bool {
        if self.dumped.contains(&hash) {
            return false;
        }

        if !surface.width.is_power_of_two() || !surface.height.is_power_of_two() {
            warn!(
                hash = %HexHash(hash),
                width = surface.width,
                height = surface.height,
                "Not dumping texture because size isn't a power of 2"
            );
            return false;
        }

        let size = match surface.rgba8_size() {
            Some(size)
                if surface.width <= MAX_DUMP_DIMENSION && surface.height <= MAX_DUMP_DIMENSION =>
            {
                size
            }
            _ => {
                warn!(
                    hash = %HexHash(hash),
                    width = surface.width,
                    height = surface.height,
                    "Not dumping texture because it is too large"
                );
                return false;
            }
        };

        let encoded = data.to_vec();
        let decoder = Arc::clone(&self.decoder);
        let codec = Arc::clone(&self.codec);
        let dir = self.dump_dir.clone();

        executor.execute(Box::new(move || {
            let mut rgba = vec![0u8; size];
            if let Err(e) = decoder.decode_rgba8(&surface, &encoded, &mut rgba) {
                error!(hash = %HexHash(hash), error = %e, "Unable to convert texture for dumping");
                return;
            }
            flip_rgba8(&mut rgba, surface.width, surface.height);

            if let Err(e) = std::fs::create_dir_all(&dir) {
                error!(path = %dir.display(), error = %e, "Unable to create dump directory");
                return;
            }

            let path = dir.join(dump_filename(
                surface.width,
                surface.height,
                hash,
                surface.format,
                level,
            ));
            match codec.encode_png(&path, &rgba, surface.width, surface.height) {
                Ok(()) => debug!(path = %path.display(), "Dumped texture"),
                Err(e) => error!(path = %path.display(), error = %e, "Failed to dump texture"),
            }
        }));

        self.dumped.insert(hash);
        true
    }

    pub fn is_dumped(&self, hash: u64) -> bool {
        self.dumped.contains(&hash)
    }

    pub fn dumped_count(&self) -> usize {
        self.dumped.len()
    }

    /// Forget all dumped hashes.
    pub fn clear(&mut self) {
        self.dumped.clear();
    }
}

impl std::fmt::Debug for DumpWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DumpWriter")
            .field("dump_dir", &self.dump_dir)
            .field("dumped", &self.dumped.len())
            .finish_non_exhaustive()
    }
}
