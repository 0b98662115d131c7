//! Pack configuration.
//!
//! A pack may ship a `pack.ini` in its load root:
//!
//! ```ini
//! [Options]
//! skip_mipmap = 0
//! flip_png_files = 0
//! use_new_hash = 1
//!
//! [Hashes]
//! DBD0A793F2756679 = bottom_screen.png
//! ```
//!
//! Packs without the file are treated as legacy packs.

mod error;
mod pack;
mod template;

pub use error::ConfigError;
pub use pack::{parse_hash_literal, PackConfig, PackOptions, PACK_CONFIG_FILENAME};
pub use template::{write_default_config, DEFAULT_PACK_CONFIG};
