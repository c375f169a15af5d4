use std::io::Cursor;

use bytes::Bytes;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, GenericImageView, ImageEncoder, ImageFormat};

use super::{ImageAsset, InputImage};
use crate::config::MAX_IMAGE_DIMENSION;
use crate::error::{AssetError, ImageResult};

/// Returns the canonical MIME type if `declared` is one the service accepts.
pub fn supported_mime(declared: &str) -> Option<&'static str> {
    let parsed: mime::Mime = declared.trim().parse().ok()?;
    if !parsed.type_().as_str().eq_ignore_ascii_case("image") {
        return None;
    }
    match parsed.subtype().as_str().to_ascii_lowercase().as_str() {
        "jpeg" | "jpg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        _ => None,
    }
}

/// Computes the output size for an image of `width` x `height`.
///
/// The longer side becomes exactly `max_dimension`; the shorter side is
/// scaled by the same factor, rounded, and never drops below 1.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn target_dimensions(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let longer = width.max(height);
    if longer <= max_dimension {
        return (width, height);
    }

    let scale = f64::from(max_dimension) / f64::from(longer);
    let shorter = |side: u32| ((f64::from(side) * scale).round() as u32).max(1);

    if width >= height {
        (max_dimension, shorter(height))
    } else {
        (shorter(width), max_dimension)
    }
}

/// Header facts read from encoded bytes without decoding pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHeader {
    /// Format sniffed from the magic bytes.
    pub format: ImageFormat,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ImageHeader {
    /// Whether the sniffed format is the one `declared_mime` names.
    pub fn matches_mime(&self, declared_mime: &str) -> bool {
        let actual = match self.format {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            _ => return false,
        };
        supported_mime(declared_mime) == Some(actual)
    }
}

/// Sniffs the format and reads pixel dimensions from the image header.
pub fn read_header(bytes: &[u8]) -> ImageResult<ImageHeader> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| AssetError::Decode {
            message: e.to_string(),
        })?;
    let format = reader.format().ok_or_else(|| AssetError::Decode {
        message: "unrecognized image format".to_string(),
    })?;
    let (width, height) = reader.into_dimensions()?;
    Ok(ImageHeader {
        format,
        width,
        height,
    })
}

/// Constrains input images to the accepted format and size envelope.
#[derive(Debug, Clone, Copy)]
pub struct AssetNormalizer {
    max_dimension: u32,
}

impl Default for AssetNormalizer {
    fn default() -> Self {
        Self {
            max_dimension: MAX_IMAGE_DIMENSION,
        }
    }
}

impl AssetNormalizer {
    /// Creates a normalizer with the default bound.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a normalizer with a custom bound on the longer side.
    pub fn with_max_dimension(max_dimension: u32) -> Self {
        Self {
            max_dimension: max_dimension.max(1),
        }
    }

    /// The bound on the longer side.
    pub fn max_dimension(&self) -> u32 {
        self.max_dimension
    }

    /// Normalizes an image whose dimensions are already known.
    ///
    /// Compliant images are returned unchanged without decoding. Everything
    /// else is decoded, downscaled if needed, and re-encoded as PNG on the
    /// blocking thread pool.
    ///
    /// # Errors
    ///
    /// `AssetError::Decode` when the bytes are not a readable image,
    /// `AssetError::Encode` when PNG encoding fails, and
    /// `AssetError::SurfaceUnavailable` when the worker could not run.
    pub async fn normalize(
        &self,
        bytes: Bytes,
        declared_mime: &str,
        width: u32,
        height: u32,
    ) -> ImageResult<ImageAsset> {
        if let Some(asset) = self.passthrough(&bytes, declared_mime, width, height) {
            return Ok(asset);
        }

        let normalizer = *self;
        run_blocking(move || normalizer.convert(&bytes)).await
    }

    /// Normalizes a caller-supplied image, reading its header first.
    ///
    /// When the sniffed format disagrees with the declared MIME type the
    /// image is always re-encoded, so the label sent on the wire matches
    /// the bytes.
    pub async fn normalize_input(&self, input: InputImage) -> ImageResult<ImageAsset> {
        let header = read_header(&input.bytes)?;
        tracing::debug!(
            mime_type = %input.mime_type,
            format = ?header.format,
            width = header.width,
            height = header.height,
            "Normalizing input image"
        );

        if !header.matches_mime(&input.mime_type) {
            let normalizer = *self;
            let bytes = input.bytes;
            return run_blocking(move || normalizer.convert(&bytes)).await;
        }
        self.normalize(input.bytes, &input.mime_type, header.width, header.height)
            .await
    }

    /// Synchronous form of [`normalize`](Self::normalize).
    pub fn normalize_blocking(
        &self,
        bytes: Bytes,
        declared_mime: &str,
        width: u32,
        height: u32,
    ) -> ImageResult<ImageAsset> {
        match self.passthrough(&bytes, declared_mime, width, height) {
            Some(asset) => Ok(asset),
            None => self.convert(&bytes),
        }
    }

    fn passthrough(
        &self,
        bytes: &Bytes,
        declared_mime: &str,
        width: u32,
        height: u32,
    ) -> Option<ImageAsset> {
        let mime_type = supported_mime(declared_mime)?;
        let within_bound = width > 0 && height > 0 && width.max(height) <= self.max_dimension;
        within_bound.then(|| ImageAsset {
            data: bytes.clone(),
            mime_type: mime_type.to_string(),
            width,
            height,
        })
    }

    fn convert(&self, bytes: &[u8]) -> ImageResult<ImageAsset> {
        let decoded = image::load_from_memory(bytes)?;
        let (width, height) = decoded.dimensions();
        let (target_width, target_height) = target_dimensions(width, height, self.max_dimension);

        let data = if (target_width, target_height) == (width, height) {
            encode_png(&decoded)?
        } else {
            tracing::debug!(
                from_width = width,
                from_height = height,
                to_width = target_width,
                to_height = target_height,
                "Downscaling image"
            );
            encode_png(&decoded.resize_exact(target_width, target_height, FilterType::Triangle))?
        };

        Ok(ImageAsset {
            data,
            mime_type: "image/png".to_string(),
            width: target_width,
            height: target_height,
        })
    }
}

fn encode_png(image: &DynamicImage) -> ImageResult<Bytes> {
    let rgba = image.to_rgba8();
    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer)
        .write_image(
            rgba.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| AssetError::Encode {
            message: e.to_string(),
        })?;
    Ok(Bytes::from(buffer))
}

async fn run_blocking<F, T>(task: F) -> ImageResult<T>
where
    F: FnOnce() -> ImageResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| AssetError::SurfaceUnavailable {
            message: e.to_string(),
        })?
}
