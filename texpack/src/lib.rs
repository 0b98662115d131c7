//! Texpack - custom texture replacement cache
//!
//! This library lets users replace an emulated program's textures with
//! higher-resolution art. Replacement files are discovered once per program,
//! indexed by the 64-bit content hash of the texture they replace, decoded
//! on a worker pool, and handed to the renderer a bounded number per frame.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use texpack::cache::CustomTextureCache;
//! use texpack::settings::CacheSettings;
//! use texpack::texture::TextureDescriptor;
//!
//! let settings = CacheSettings::new("/home/user/.local/share/texpack", 0x0004000000055D00);
//! let mut cache = CustomTextureCache::new(settings);
//! cache.find_custom_textures();
//!
//! if let Some(texture) = cache.get_texture(0x0123456789ABCDEF) {
//!     cache.decode(
//!         &texture,
//!         Box::new(|texture: &TextureDescriptor| {
//!             // upload texture.data() to the GPU
//!             !texture.data().is_empty()
//!         }),
//!     );
//! }
//!
//! // once per frame
//! cache.tick_frame();
//! ```

pub mod cache;
pub mod codec;
pub mod config;
pub mod settings;
pub mod texture;
pub mod worker;

pub use cache::{CacheStats, CustomTextureCache};
pub use settings::CacheSettings;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
