//! Per-texture decode scheduling.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error};

use crate::codec::{flip_rgba8, CodecError, DecodedImage, ImageCodec};
use crate::texture::{FileFormat, HexHash, TextureDescriptor};
use crate::worker::{panic_message, Executor};

#[derive(Debug, Error)]
enum DecodeError {
    #[error("read failed: {0}")]
    Read(#[from] std::io::Error),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("decoder panicked: {0}")]
    Panicked(String),
}

/// Decodes replacement files into their descriptors.
pub struct DecodePipeline {
    codec: Arc<dyn ImageCodec>,
    flip_on_load: bool,
}

impl DecodePipeline {
    pub fn new(codec: Arc<dyn ImageCodec>, flip_on_load: bool) -> Self {
        Self {
            codec,
            flip_on_load,
        }
    }

    /// Whether decoded PNG rows are reversed.
    pub fn flip_on_load(&self) -> bool {
        self.flip_on_load
    }

    /// Queue a decode of `texture` on `executor`.
    ///
    /// Only the caller that moves the texture out of `None` enqueues a job;
    /// every other call returns `false` without touching the executor.
    pub fn dispatch(
        self: &Arc<Self>,
        texture: &Arc<TextureDescriptor>,
        executor: &dyn Executor,
    ) -> bool {
        if !texture.try_begin_decode() {
            return false;
        }

        let pipeline = Arc::clone(self);
        let texture = Arc::clone(texture);
        executor.execute(Box::new(move || pipeline.decode(&texture)));
        true
    }

    /// Decode `texture` on the calling thread.
    ///
    /// Does nothing once the texture is decoded. Failures are logged and
    /// still publish an empty payload, so a broken file is never retried.
    /// A panicking codec counts as a failure and does not unwind past here.
    pub fn decode(&self, texture: &TextureDescriptor) {
        if texture.is_decoded() {
            return;
        }

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.load(texture)))
            .unwrap_or_else(|payload| {
                Err(DecodeError::Panicked(
                    panic_message(payload.as_ref()).to_string(),
                ))
            });

        let image = match outcome {
            Ok(image) => {
                debug!(
                    hash = %HexHash(texture.hash()),
                    width = image.width,
                    height = image.height,
                    format = %image.format,
                    "Decoded custom texture"
                );
                image
            }
            Err(e) => {
                error!(
                    hash = %HexHash(texture.hash()),
                    path = %texture.path().display(),
                    error = %e,
                    "Failed to decode custom texture"
                );
                DecodedImage::empty()
            }
        };

        texture.publish(image);
    }

    fn load(&self, texture: &TextureDescriptor) -> Result<DecodedImage, DecodeError> {
        let bytes = std::fs::read(texture.path())?;

        let image = match texture.file_format() {
            FileFormat::Png => {
                let mut image = self.codec.decode_png(&bytes)?;
                if self.flip_on_load {
                    flip_rgba8(&mut image.data, image.width, image.height);
                }
                image
            }
            FileFormat::Dds | FileFormat::Ktx => self.codec.decode_compressed(&bytes)?,
        };

        Ok(image)
    }
}

impl std::fmt::Debug for DecodePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodePipeline")
            .field("flip_on_load", &self.flip_on_load)
            .finish_non_exhaustive()
    }
}
