//! Integration tests for the custom texture cache.
//!
//! These tests build packs on disk and drive the cache the way a renderer
//! would: scan, look up, request, then tick once per frame.
//!
//! Run with: `cargo test --test cache_integration`

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use image::{ImageFormat, RgbaImage};
use parking_lot::Mutex;
use tempfile::TempDir;

use texpack::cache::{CustomTextureCache, SurfaceInfo, UploadFn, MAX_UPLOADS_PER_TICK};
use texpack::config::PACK_CONFIG_FILENAME;
use texpack::settings::CacheSettings;
use texpack::texture::{FileFormat, TextureDescriptor};
use texpack::worker::{Executor, InlineExecutor};

// ============================================================================
// Helper Functions
// ============================================================================

const PROGRAM_ID: u64 = 0x0004_0000_0015_5100;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("texpack=debug")
        .with_test_writer()
        .try_init();
}

/// Encode an image whose row `y` is filled with the value `y`.
fn row_coded_png(width: u32, height: u32) -> Vec<u8> {
    let image = RgbaImage::from_fn(width, height, |_, y| {
        let v = y as u8;
        image::Rgba([v, v, v, 255])
    });
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn write_file(dir: &Path, name: &str, bytes: &[u8]) {
    let path = dir.join(name);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, bytes).unwrap();
}

fn write_pack_ini(settings: &CacheSettings, text: &str) {
    write_file(&settings.load_dir(), PACK_CONFIG_FILENAME, text.as_bytes());
}

fn counting_upload(count: &Arc<Mutex<usize>>) -> UploadFn {
    let count = Arc::clone(count);
    Box::new(move |texture: &TextureDescriptor| {
        assert!(texture.is_decoded());
        *count.lock() += 1;
        true
    })
}

// ============================================================================
// Integration Tests
// ============================================================================

#[test]
fn test_canonical_png_is_decoded_and_flipped() {
    init_tracing();
    let temp = TempDir::new().unwrap();
    let settings = CacheSettings::new(temp.path(), PROGRAM_ID).with_worker_count(2);
    write_pack_ini(&settings, "[Options]\nflip_png_files = 1\n");
    write_file(
        &settings.load_dir(),
        "tex1_256x256_0123456789ABCDEF_0.png",
        &row_coded_png(256, 256),
    );

    let mut cache = CustomTextureCache::new(settings);
    cache.find_custom_textures();

    let texture = cache.get_texture(0x0123_4567_89AB_CDEF).unwrap();
    assert_eq!(texture.width(), 256);
    assert_eq!(texture.height(), 256);
    assert_eq!(texture.file_format(), FileFormat::Png);

    let uploads = Arc::new(Mutex::new(0));
    assert!(!cache.decode(&texture, counting_upload(&uploads)));

    // Poll frames until the worker finishes
    let mut frames = 0;
    while *uploads.lock() == 0 {
        cache.tick_frame();
        frames += 1;
        assert!(frames < 10_000, "decode never completed");
        std::thread::sleep(std::time::Duration::from_millis(1));
    }

    let data = texture.data();
    assert_eq!(data.len(), 256 * 256 * 4);
    // First output row holds the last source row
    assert_eq!(data[0], 255);
    assert_eq!(data[data.len() - 4], 0);
}

#[test]
fn test_legacy_pack_with_compressed_file_registers_nothing() {
    init_tracing();
    let temp = TempDir::new().unwrap();
    let settings = CacheSettings::new(temp.path(), PROGRAM_ID).with_worker_count(1);
    let dir = settings.load_dir();
    write_file(&dir, "tex1_64x64_0000000000000001_0.png", &row_coded_png(64, 64));
    write_file(&dir, "tex1_64x64_0000000000000002_0.dds", b"DDS ");

    let mut cache = CustomTextureCache::new(settings);
    let report = cache.find_custom_textures();

    assert!(report.aborted);
    assert!(cache.is_loaded());
    assert_eq!(cache.stats().textures, 0);
    assert!(cache.get_texture(1).is_none());
}

#[test]
fn test_hash_collision_keeps_first_file() {
    init_tracing();
    let temp = TempDir::new().unwrap();
    let settings = CacheSettings::new(temp.path(), PROGRAM_ID).with_worker_count(1);
    let dir = settings.load_dir();
    write_file(&dir, "a/tex1_8x8_00000000000000AA_0.png", &row_coded_png(8, 8));
    write_file(&dir, "b/tex1_16x16_00000000000000AA_0.png", &row_coded_png(16, 16));

    let mut cache = CustomTextureCache::new(settings);
    let report = cache.find_custom_textures();
    assert_eq!(report.collisions, 1);

    let texture = cache.get_texture(0xAA).unwrap();
    assert!(texture.path().starts_with(dir.join("a")));
    assert_eq!(texture.width(), 8);
}

#[test]
fn test_hashes_section_binds_arbitrary_names() {
    init_tracing();
    let temp = TempDir::new().unwrap();
    let settings = CacheSettings::new(temp.path(), PROGRAM_ID).with_async_loading(false);
    write_pack_ini(
        &settings,
        "[Options]\n[Hashes]\nDBD0A793F2756679 = screens/bottom_screen.png\n",
    );
    write_file(
        &settings.load_dir(),
        "art/bottom_screen.png",
        &row_coded_png(32, 16),
    );

    let mut cache = CustomTextureCache::new(settings).with_executor(Arc::new(InlineExecutor));
    cache.find_custom_textures();

    let texture = cache.get_texture(0xDBD0_A793_F275_6679).unwrap();
    let uploads = Arc::new(Mutex::new(0));
    assert!(cache.decode(&texture, counting_upload(&uploads)));
    assert_eq!(*uploads.lock(), 1);
    assert_eq!(texture.width(), 32);
    assert_eq!(texture.height(), 16);
    // No flip: first row is source row zero
    assert_eq!(texture.data()[0], 0);
}

#[test]
fn test_tick_promotes_at_most_sixteen_per_frame() {
    init_tracing();
    let temp = TempDir::new().unwrap();
    let settings = CacheSettings::new(temp.path(), PROGRAM_ID);
    write_pack_ini(&settings, "[Options]\n");
    for hash in 1..=40u64 {
        write_file(
            &settings.load_dir(),
            &format!("tex1_4x4_{hash:016X}_0.png"),
            &row_coded_png(4, 4),
        );
    }

    let executor: Arc<dyn Executor> = Arc::new(InlineExecutor);
    let mut cache = CustomTextureCache::new(settings).with_executor(executor);
    assert_eq!(cache.find_custom_textures().registered, 40);

    let uploads = Arc::new(Mutex::new(0));
    for hash in 1..=40u64 {
        let texture = cache.get_texture(hash).unwrap();
        cache.decode(&texture, counting_upload(&uploads));
    }

    assert_eq!(cache.tick_frame(), MAX_UPLOADS_PER_TICK);
    assert_eq!(cache.tick_frame(), MAX_UPLOADS_PER_TICK);
    assert_eq!(cache.tick_frame(), 8);
    assert_eq!(*uploads.lock(), 40);
    assert_eq!(cache.stats().pending_uploads, 0);
}

#[test]
fn test_dumping_same_hash_twice_writes_one_file() {
    init_tracing();
    let temp = TempDir::new().unwrap();
    let settings = CacheSettings::new(temp.path(), PROGRAM_ID).with_worker_count(2);
    let dump_dir = settings.dump_dir();

    {
        let mut cache = CustomTextureCache::new(settings);
        let surface = SurfaceInfo::new(8, 8, 12);
        let data = vec![128u8; 8 * 8 * 4];
        assert!(cache.dump_texture(surface, 0, &data, 0xFEED));
        assert!(!cache.dump_texture(surface, 0, &data, 0xFEED));
        assert_eq!(cache.stats().dumped, 1);
    }

    let files: Vec<_> = std::fs::read_dir(&dump_dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(files, vec!["tex1_8x8_000000000000FEED_12_mip0.png"]);
}
