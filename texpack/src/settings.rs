//! Cache settings and on-disk layout.

use std::path::PathBuf;

use crate::texture::HexHash;

/// Directory under the user root holding replacement packs.
pub const LOAD_DIR_NAME: &str = "textures";

/// Directory under the user root receiving dumped originals.
pub const DUMP_DIR_NAME: &str = "dump-textures";

/// Settings for one [`CustomTextureCache`](crate::cache::CustomTextureCache).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSettings {
    /// Root of the user data directory.
    pub user_root: PathBuf,

    /// 64-bit identifier of the running program; selects the pack.
    pub program_id: u64,

    /// Decode on worker threads and promote through the frame tick.
    ///
    /// When disabled, lookups decode inline and complete immediately.
    pub async_loading: bool,

    /// Worker thread count. `None` sizes the pool from the hardware.
    pub worker_count: Option<usize>,
}

impl CacheSettings {
    /// Settings for `program_id` under `user_root`, asynchronous by default.
    pub fn new(user_root: impl Into<PathBuf>, program_id: u64) -> Self {
        Self {
            user_root: user_root.into(),
            program_id,
            async_loading: true,
            worker_count: None,
        }
    }

    /// Enable or disable asynchronous decoding.
    pub fn with_async_loading(mut self, enabled: bool) -> Self {
        self.async_loading = enabled;
        self
    }

    /// Use a fixed number of worker threads.
    pub fn with_worker_count(mut self, workers: usize) -> Self {
        self.worker_count = Some(workers);
        self
    }

    /// `<user_root>/textures/<program id>/`
    pub fn load_dir(&self) -> PathBuf {
        self.user_root
            .join(LOAD_DIR_NAME)
            .join(HexHash(self.program_id).to_string())
    }

    /// `<user_root>/dump-textures/<program id>/`
    pub fn dump_dir(&self) -> PathBuf {
        self.user_root
            .join(DUMP_DIR_NAME)
            .join(HexHash(self.program_id).to_string())
    }
}
