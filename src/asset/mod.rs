//! Input image normalization.
//!
//! Uploaded images are constrained to the envelope the generation service
//! accepts: JPEG or PNG, with the longer side at most
//! [`MAX_IMAGE_DIMENSION`](crate::config::MAX_IMAGE_DIMENSION) pixels.

mod normalizer;

pub use normalizer::{read_header, supported_mime, target_dimensions, AssetNormalizer, ImageHeader};

use bytes::Bytes;

/// A raw image as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputImage {
    /// Encoded image bytes.
    pub bytes: Bytes,
    /// MIME type declared by the caller (e.g. from a file picker).
    pub mime_type: String,
}

impl InputImage {
    /// Creates an input image.
    pub fn new(bytes: impl Into<Bytes>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: mime_type.into(),
        }
    }
}

/// A normalized image ready for encoding into a request part.
///
/// `mime_type` is always `image/jpeg` or `image/png` and
/// `max(width, height)` never exceeds the normalizer's bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    /// Encoded image bytes.
    pub data: Bytes,
    /// MIME type of `data`.
    pub mime_type: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}
