//! Error types for image decoding and encoding.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while decoding or encoding texture images.
#[derive(Debug, Error)]
pub enum CodecError {
    /// PNG data could not be decoded.
    #[error("PNG decoding failed: {0}")]
    PngDecode(String),

    /// PNG data could not be written.
    #[error("PNG encoding failed for {path}: {reason}")]
    PngEncode { path: PathBuf, reason: String },

    /// Container data ended before the expected payload.
    #[error("Truncated {container} data: need {needed} bytes, have {available}")]
    Truncated {
        container: &'static str,
        needed: usize,
        available: usize,
    },

    /// Container header is malformed.
    #[error("Invalid {container} header: {reason}")]
    InvalidHeader {
        container: &'static str,
        reason: String,
    },

    /// Container holds a pixel format we cannot hand to the renderer.
    #[error("Unsupported pixel format: {0}")]
    UnsupportedFormat(String),

    /// Image dimensions are invalid.
    #[error("Invalid dimensions {width}×{height}: {reason}")]
    InvalidDimensions {
        width: u32,
        height: u32,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_truncated() {
        let err = CodecError::Truncated {
            container: "DDS",
            needed: 148,
            available: 4,
        };
        assert_eq!(err.to_string(), "Truncated DDS data: need 148 bytes, have 4");
    }

    #[test]
    fn test_display_invalid_dimensions() {
        let err = CodecError::InvalidDimensions {
            width: 0,
            height: 16,
            reason: "zero-sized image".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid dimensions 0×16: zero-sized image");
    }

    #[test]
    fn test_display_unsupported_format() {
        let err = CodecError::UnsupportedFormat("FourCC DXT3".to_string());
        assert_eq!(err.to_string(), "Unsupported pixel format: FourCC DXT3");
    }
}
