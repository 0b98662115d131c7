//! The custom texture cache.
//!
//! [`CustomTextureCache`] ties the pieces together for one running program:
//!
//! ```text
//!  find_custom_textures        get_texture / decode           tick_frame
//!  ────────────────────        ────────────────────           ──────────
//!  PackConfig::load            TextureRegistry::get           UploadQueue::tick
//!  TextureRegistry::scan  ──▶  DecodePipeline::dispatch  ──▶  (≤ 16 per frame)
//!                              UploadQueue::push
//! ```
//!
//! The cache itself lives on the render thread. Only decode and dump jobs
//! run elsewhere, on a worker pool created the first time it is needed.

mod dump;
mod pipeline;
mod registry;
mod throttle;

pub use dump::{DumpWriter, Rgba8Surface, SurfaceDecoder, SurfaceInfo, MAX_DUMP_DIMENSION};
pub use pipeline::DecodePipeline;
pub use registry::{ScanReport, TextureRegistry, MAX_SCAN_DEPTH};
pub use throttle::{PendingUpload, UploadFn, UploadQueue, MAX_UPLOADS_PER_TICK};

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::codec::{ImageCodec, StandardCodec};
use crate::config::{write_default_config, ConfigError, PackConfig, PackOptions};
use crate::settings::CacheSettings;
use crate::texture::{HexHash, TextureDescriptor};
use crate::worker::{default_worker_count, Executor, InlineExecutor, WorkerPool};

/// Name given to worker threads.
const WORKER_NAME: &str = "Custom textures";

/// Point-in-time counters for a cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Registered replacement textures.
    pub textures: usize,
    /// Uploads waiting for their decode or for a frame tick.
    pub pending_uploads: usize,
    /// Original textures dumped this session.
    pub dumped: usize,
}

/// Replacement texture cache for one program.
pub struct CustomTextureCache {
    settings: CacheSettings,
    codec: Arc<dyn ImageCodec>,
    surface_decoder: Arc<dyn SurfaceDecoder>,
    executor: Option<Arc<dyn Executor>>,
    config: PackConfig,
    pipeline: Arc<DecodePipeline>,
    registry: TextureRegistry,
    report: ScanReport,
    uploads: UploadQueue,
    dumper: DumpWriter,
    loaded: bool,
}

impl CustomTextureCache {
    /// Create an empty cache. Nothing touches the disk until
    /// [`find_custom_textures`](Self::find_custom_textures).
    pub fn new(settings: CacheSettings) -> Self {
        let codec: Arc<dyn ImageCodec> = Arc::new(StandardCodec);
        let surface_decoder: Arc<dyn SurfaceDecoder> = Arc::new(Rgba8Surface);
        let config = PackConfig::default();
        let pipeline = Arc::new(DecodePipeline::new(
            Arc::clone(&codec),
            config.options().flip_on_load(),
        ));
        let dumper = DumpWriter::new(
            settings.dump_dir(),
            Arc::clone(&surface_decoder),
            Arc::clone(&codec),
        );

        Self {
            settings,
            codec,
            surface_decoder,
            executor: None,
            config,
            pipeline,
            registry: TextureRegistry::default(),
            report: ScanReport::default(),
            uploads: UploadQueue::new(),
            dumper,
            loaded: false,
        }
    }

    /// Use a different image codec.
    pub fn with_codec(mut self, codec: Arc<dyn ImageCodec>) -> Self {
        self.codec = codec;
        self.rebuild_collaborators();
        self
    }

    /// Use a caller-provided executor instead of the lazily created pool.
    pub fn with_executor(mut self, executor: Arc<dyn Executor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Use the renderer's surface decoder for dumps.
    pub fn with_surface_decoder(mut self, decoder: Arc<dyn SurfaceDecoder>) -> Self {
        self.surface_decoder = decoder;
        self.rebuild_collaborators();
        self
    }

    fn rebuild_collaborators(&mut self) {
        self.pipeline = Arc::new(DecodePipeline::new(
            Arc::clone(&self.codec),
            self.config.options().flip_on_load(),
        ));
        self.dumper = DumpWriter::new(
            self.settings.dump_dir(),
            Arc::clone(&self.surface_decoder),
            Arc::clone(&self.codec),
        );
    }

    /// Executor for decode and dump jobs, created on first use.
    fn executor(&mut self) -> Arc<dyn Executor> {
        if let Some(executor) = &self.executor {
            return Arc::clone(executor);
        }

        let workers = self
            .settings
            .worker_count
            .unwrap_or_else(default_worker_count);
        let executor: Arc<dyn Executor> = match WorkerPool::new(workers, WORKER_NAME) {
            Ok(pool) => Arc::new(pool),
            Err(e) => {
                warn!(error = %e, "Unable to start texture workers, decoding inline");
                Arc::new(InlineExecutor)
            }
        };

        self.executor = Some(Arc::clone(&executor));
        executor
    }

    /// Scan the program's pack and build the texture index.
    ///
    /// Runs once; later calls return the first scan's report until
    /// [`reset`](Self::reset).
    pub fn find_custom_textures(&mut self) -> ScanReport {
        if self.loaded {
            return self.report;
        }

        self.executor();

        let load_dir = self.settings.load_dir();
        if !load_dir.exists() {
            if let Err(e) = std::fs::create_dir_all(&load_dir) {
                error!(path = %load_dir.display(), error = %e, "Unable to create texture directory");
            }
        }

        self.config = PackConfig::load(&load_dir);
        self.pipeline = Arc::new(DecodePipeline::new(
            Arc::clone(&self.codec),
            self.config.options().flip_on_load(),
        ));

        let (registry, report) = TextureRegistry::scan(&load_dir, &self.config);
        self.registry = registry;
        self.report = report;
        self.loaded = true;

        info!(
            program_id = %HexHash(self.settings.program_id),
            textures = self.registry.len(),
            "Custom textures loaded"
        );
        report
    }

    /// Whether the pack has been scanned.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Replacement registered for `hash`.
    pub fn get_texture(&self, hash: u64) -> Option<Arc<TextureDescriptor>> {
        match self.registry.get(hash) {
            Some(texture) => {
                debug!(
                    hash = %HexHash(hash),
                    path = %texture.path().display(),
                    "Assigning custom texture to surface"
                );
                Some(Arc::clone(texture))
            }
            None => {
                warn!(hash = %HexHash(hash), "Unable to find replacement for surface");
                None
            }
        }
    }

    /// Request `texture` for upload.
    ///
    /// With asynchronous loading the decode is queued (once per texture),
    /// `on_ready` is deferred to a later [`tick_frame`](Self::tick_frame) and
    /// `false` is returned. Otherwise the texture is decoded now and
    /// `on_ready`'s result is returned.
    pub fn decode(&mut self, texture: &Arc<TextureDescriptor>, on_ready: UploadFn) -> bool {
        if !self.settings.async_loading {
            self.pipeline.decode(texture);
            return on_ready(texture.as_ref());
        }

        let executor = self.executor();
        self.pipeline.dispatch(texture, executor.as_ref());
        self.uploads.push(PendingUpload::new(Arc::clone(texture), on_ready));
        false
    }

    /// Run completions for decoded textures, at most
    /// [`MAX_UPLOADS_PER_TICK`] per call. Returns how many ran.
    pub fn tick_frame(&mut self) -> usize {
        if !self.loaded {
            return 0;
        }
        self.uploads.tick()
    }

    /// Decode every registered texture and wait for completion.
    pub fn preload_textures(&mut self) {
        let executor = self.executor();
        let textures = self.registry.textures();
        if textures.is_empty() {
            return;
        }

        let workers = executor.worker_count().max(1);
        let bucket_size = textures.len() / workers;

        for i in 0..workers {
            let start = bucket_size * i;
            let end = if i + 1 == workers {
                textures.len()
            } else {
                start + bucket_size
            };
            if start == end {
                continue;
            }

            let bucket = textures[start..end].to_vec();
            let pipeline = Arc::clone(&self.pipeline);
            executor.execute(Box::new(move || {
                for texture in &bucket {
                    if texture.try_begin_decode() {
                        pipeline.decode(texture);
                    }
                }
            }));
        }

        executor.wait_idle();
        info!(textures = textures.len(), "Preloaded custom textures");
    }

    /// Export an original texture for pack authors. Returns `true` if a
    /// dump was queued.
    pub fn dump_texture(
        &mut self,
        surface: SurfaceInfo,
        level: u32,
        data: &[u8],
        hash: u64,
    ) -> bool {
        let executor = self.executor();
        self.dumper.dump(surface, level, data, hash, executor.as_ref())
    }

    /// Write the default `pack.ini` into the dump directory if missing.
    pub fn write_config(&self) -> Result<bool, ConfigError> {
        write_default_config(&self.settings.dump_dir())
    }

    /// Drop everything loaded for the current program.
    ///
    /// Waits for queued jobs first. The next
    /// [`find_custom_textures`](Self::find_custom_textures) scans again.
    pub fn reset(&mut self) {
        if let Some(executor) = &self.executor {
            executor.wait_idle();
        }

        self.uploads.clear();
        self.registry = TextureRegistry::default();
        self.report = ScanReport::default();
        self.dumper.clear();
        self.config = PackConfig::default();
        self.rebuild_collaborators();
        self.loaded = false;
    }

    /// Reset and point the cache at another program.
    pub fn switch_program(&mut self, program_id: u64) {
        self.reset();
        self.settings.program_id = program_id;
        self.rebuild_collaborators();
    }

    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    pub fn registry(&self) -> &TextureRegistry {
        &self.registry
    }

    pub fn pack_options(&self) -> PackOptions {
        self.config.options()
    }

    /// Whether the renderer should generate mipmaps instead of uploading them.
    pub fn skip_mipmaps(&self) -> bool {
        self.config.options().skip_mipmap()
    }

    /// Whether the renderer should compute texture hashes the new way.
    pub fn use_new_hash(&self) -> bool {
        self.config.options().use_new_hash()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            textures: self.registry.len(),
            pending_uploads: self.uploads.len(),
            dumped: self.dumper.dumped_count(),
        }
    }
}

impl Drop for CustomTextureCache {
    fn drop(&mut self) {
        if let Some(executor) = &self.executor {
            executor.wait_idle();
        }
    }
}

impl std::fmt::Debug for CustomTextureCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomTextureCache")
            .field("settings", &self.settings)
            .field("loaded", &self.loaded)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::pipeline::tests::QueuedExecutor;
    use crate::config::PACK_CONFIG_FILENAME;
    use image::{ImageFormat, RgbaImage};
    use parking_lot::Mutex;
    use std::io::Cursor;
    use std::path::Path;
    use std::sync::atomic::Ordering;
    use tempfile::TempDir;

    const PROGRAM_ID: u64 = 0x0004_0000_0005_5D00;

    fn write_png(dir: &Path, hash: u64, size: u32) {
        std::fs::create_dir_all(dir).unwrap();
        let image = RgbaImage::from_pixel(size, size, image::Rgba([10, 20, 30, 255]));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        let name = format!("tex1_{size}x{size}_{hash:016X}_0.png");
        std::fs::write(dir.join(name), bytes).unwrap();
    }

    fn modern_pack(settings: &CacheSettings) {
        let dir = settings.load_dir();
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(PACK_CONFIG_FILENAME), "[Options]\n").unwrap();
    }

    fn counter() -> (Arc<Mutex<usize>>, UploadFn) {
        let count = Arc::new(Mutex::new(0));
        let hits = Arc::clone(&count);
        let on_ready: UploadFn = Box::new(move |_: &TextureDescriptor| {
            *hits.lock() += 1;
            true
        });
        (count, on_ready)
    }

    #[test]
    fn test_find_creates_load_dir_and_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let settings = CacheSettings::new(temp.path(), PROGRAM_ID).with_worker_count(1);
        let mut cache = CustomTextureCache::new(settings.clone());

        assert!(!cache.is_loaded());
        cache.find_custom_textures();
        assert!(cache.is_loaded());
        assert!(settings.load_dir().is_dir());

        write_png(&settings.load_dir(), 1, 4);
        let report = cache.find_custom_textures();
        assert_eq!(report.registered, 0);
        assert!(cache.get_texture(1).is_none());
    }

    #[test]
    fn test_sync_decode_runs_callback_immediately() {
        let temp = TempDir::new().unwrap();
        let settings = CacheSettings::new(temp.path(), PROGRAM_ID).with_async_loading(false);
        write_png(&settings.load_dir(), 0xAB, 4);
        let mut cache = CustomTextureCache::new(settings).with_executor(Arc::new(InlineExecutor));
        cache.find_custom_textures();

        let texture = cache.get_texture(0xAB).unwrap();
        let (count, on_ready) = counter();
        assert!(cache.decode(&texture, on_ready));
        assert_eq!(*count.lock(), 1);
        assert!(texture.is_decoded());
        assert_eq!(texture.data().len(), 4 * 4 * 4);
        assert_eq!(cache.stats().pending_uploads, 0);
    }

    #[test]
    fn test_async_decode_defers_callback_to_tick() {
        let temp = TempDir::new().unwrap();
        let settings = CacheSettings::new(temp.path(), PROGRAM_ID);
        modern_pack(&settings);
        write_png(&settings.load_dir(), 0xCD, 8);

        let executor = Arc::new(QueuedExecutor::default());
        let mut cache = CustomTextureCache::new(settings)
            .with_executor(Arc::clone(&executor) as Arc<dyn Executor>);
        cache.find_custom_textures();

        let texture = cache.get_texture(0xCD).unwrap();
        let (count, first) = counter();
        let (_, second) = counter();
        assert!(!cache.decode(&texture, first));
        assert!(!cache.decode(&texture, second));
        assert_eq!(executor.submitted.load(Ordering::SeqCst), 1);
        assert_eq!(cache.stats().pending_uploads, 2);

        assert_eq!(cache.tick_frame(), 0);
        executor.run_all();
        assert_eq!(cache.tick_frame(), 2);
        assert_eq!(*count.lock(), 1);
        assert_eq!(cache.stats().pending_uploads, 0);
    }

    #[test]
    fn test_tick_before_scan_is_noop() {
        let temp = TempDir::new().unwrap();
        let settings = CacheSettings::new(temp.path(), PROGRAM_ID);
        let mut cache = CustomTextureCache::new(settings).with_executor(Arc::new(InlineExecutor));

        let texture = Arc::new(TextureDescriptor::new(
            1,
            crate::texture::FileFormat::Png,
            temp.path().join("missing.png"),
            1,
            1,
        ));
        let (count, on_ready) = counter();
        cache.decode(&texture, on_ready);

        assert!(texture.is_decoded());
        assert_eq!(cache.tick_frame(), 0);
        assert_eq!(*count.lock(), 0);
    }

    #[test]
    fn test_preload_decodes_everything() {
        let temp = TempDir::new().unwrap();
        let settings = CacheSettings::new(temp.path(), PROGRAM_ID).with_worker_count(3);
        modern_pack(&settings);
        for hash in 1..=7 {
            write_png(&settings.load_dir(), hash, 2);
        }

        let mut cache = CustomTextureCache::new(settings);
        assert_eq!(cache.find_custom_textures().registered, 7);
        cache.preload_textures();

        assert!(cache.registry().iter().all(|t| t.is_decoded()));
        assert!(cache.registry().iter().all(|t| t.data().len() == 16));
    }

    #[test]
    fn test_options_accessors() {
        let temp = TempDir::new().unwrap();
        let settings = CacheSettings::new(temp.path(), PROGRAM_ID).with_worker_count(1);
        let mut cache = CustomTextureCache::new(settings.clone());
        cache.find_custom_textures();
        assert!(cache.skip_mipmaps());
        assert!(!cache.use_new_hash());
        assert!(cache.pack_options().legacy_pack());

        modern_pack(&settings);
        cache.reset();
        cache.find_custom_textures();
        assert!(!cache.skip_mipmaps());
        assert!(cache.use_new_hash());
    }

    #[test]
    fn test_reset_clears_state() {
        let temp = TempDir::new().unwrap();
        let settings = CacheSettings::new(temp.path(), PROGRAM_ID);
        write_png(&settings.load_dir(), 5, 4);

        let executor = Arc::new(QueuedExecutor::default());
        let mut cache = CustomTextureCache::new(settings)
            .with_executor(Arc::clone(&executor) as Arc<dyn Executor>);
        cache.find_custom_textures();
        let texture = cache.get_texture(5).unwrap();
        let (count, on_ready) = counter();
        cache.decode(&texture, on_ready);
        cache.dump_texture(SurfaceInfo::new(1, 1, 0), 0, &[0; 4], 77);

        cache.reset();
        assert!(!cache.is_loaded());
        assert_eq!(cache.stats(), CacheStats::default());
        assert!(texture.is_decoded());
        assert_eq!(*count.lock(), 0);
    }

    #[test]
    fn test_switch_program_changes_directories() {
        let temp = TempDir::new().unwrap();
        let settings = CacheSettings::new(temp.path(), 1).with_worker_count(1);
        write_png(&CacheSettings::new(temp.path(), 2).load_dir(), 9, 4);

        let mut cache = CustomTextureCache::new(settings);
        cache.find_custom_textures();
        assert!(cache.get_texture(9).is_none());

        cache.switch_program(2);
        cache.find_custom_textures();
        assert!(cache.get_texture(9).is_some());
    }

    #[test]
    fn test_write_config_targets_dump_dir() {
        let temp = TempDir::new().unwrap();
        let settings = CacheSettings::new(temp.path(), PROGRAM_ID);
        let cache = CustomTextureCache::new(settings.clone());

        assert!(cache.write_config().unwrap());
        assert!(settings.dump_dir().join(PACK_CONFIG_FILENAME).is_file());
        assert!(!cache.write_config().unwrap());
    }
}
