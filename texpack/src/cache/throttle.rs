//! Frame-bounded promotion of decoded textures.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::texture::TextureDescriptor;

/// Upper bound on completions run by one [`UploadQueue::tick`].
pub const MAX_UPLOADS_PER_TICK: usize = 16;

/// Completion run on the render thread once a texture is decoded.
///
/// Receives the decoded descriptor; the returned flag reports whether the
/// renderer accepted the upload and is only meaningful for synchronous loads.
pub type UploadFn = Box<dyn FnOnce(&TextureDescriptor) -> bool + Send>;

/// A texture waiting for its decode to finish.
pub struct PendingUpload {
    texture: Arc<TextureDescriptor>,
    on_ready: UploadFn,
}

impl PendingUpload {
    pub fn new(texture: Arc<TextureDescriptor>, on_ready: UploadFn) -> Self {
        Self { texture, on_ready }
    }

    pub fn texture(&self) -> &Arc<TextureDescriptor> {
        &self.texture
    }
}

/// FIFO of pending uploads drained once per frame.
#[derive(Default)]
pub struct UploadQueue {
    pending: VecDeque<PendingUpload>,
}

impl UploadQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, upload: PendingUpload) {
        self.pending.push_back(upload);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop all pending uploads without running them.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Run completions for decoded entries, front to back.
    ///
    /// Entries still decoding keep their position. Stops after
    /// [`MAX_UPLOADS_PER_TICK`] completions and returns how many ran.
    pub fn tick(&mut self) -> usize {
        let mut promoted = 0;
        let mut i = 0;

        while i < self.pending.len() && promoted < MAX_UPLOADS_PER_TICK {
            if !self.pending[i].texture.is_decoded() {
                i += 1;
                continue;
            }

            if let Some(upload) = self.pending.remove(i) {
                (upload.on_ready)(upload.texture.as_ref());
                promoted += 1;
            }
        }

        promoted
    }
}

impl std::fmt::Debug for UploadQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadQueue")
            .field("pending", &self.pending.len())
            .finish()
    }
}
