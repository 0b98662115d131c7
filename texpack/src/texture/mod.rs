//! Replacement texture records and naming.
//!
//! - [`TextureDescriptor`] - one discovered replacement file and its decode state
//! - [`FileFormat`] / [`PixelFormat`] - container kind and decoded pixel layout
//! - [`parse_texture_filename`] - canonical `tex1_...` filename parser

mod descriptor;
mod filename;
mod format;

pub use descriptor::{DecodeState, TextureDescriptor};
pub use filename::{dump_filename, parse_texture_filename, FilenameError, TextureFilename};
pub use format::{FileFormat, PixelFormat};

use std::fmt;

/// Displays a content hash as 16 upper-case hex digits, as in file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexHash(pub u64);

impl fmt::Display for HexHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016X}", self.0)
    }
}
