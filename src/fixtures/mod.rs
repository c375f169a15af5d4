//! Test fixtures for the image client.
//!
//! Canned service responses live under `src/fixtures/responses/`. Images are
//! generated in memory so tests never depend on binary files.

use std::io::Cursor;
use std::path::PathBuf;

use bytes::Bytes;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use serde_json::{json, Value};

use crate::asset::InputImage;

/// Base64 payload of a 1x1 PNG.
pub const TINY_PNG_BASE64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

/// Get the path to a fixture file.
pub fn fixture_path(relative_path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("src")
        .join("fixtures")
        .join(relative_path)
}

/// Load a fixture file as a string.
pub fn load_fixture(relative_path: &str) -> String {
    std::fs::read_to_string(fixture_path(relative_path))
        .unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", relative_path, e))
}

/// Load a JSON fixture and parse it.
pub fn load_json_fixture<T: serde::de::DeserializeOwned>(relative_path: &str) -> T {
    let content = load_fixture(relative_path);
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse JSON fixture {}: {}", relative_path, e))
}

/// Encodes a `width` x `height` gradient image in `format`.
pub fn encoded_image(width: u32, height: u32, format: ImageFormat) -> Bytes {
    let pixels = RgbImage::from_fn(width, height, |x, y| {
        #[allow(clippy::cast_possible_truncation)]
        let shade = |v: u32, max: u32| ((v * 255) / max.max(1)) as u8;
        Rgb([shade(x, width), shade(y, height), 128])
    });

    let mut buffer = Vec::new();
    DynamicImage::ImageRgb8(pixels)
        .write_to(&mut Cursor::new(&mut buffer), format)
        .unwrap_or_else(|e| panic!("Failed to encode {format:?} test image: {e}"));
    Bytes::from(buffer)
}

/// A PNG input image of the given size.
pub fn png_input(width: u32, height: u32) -> InputImage {
    InputImage::new(encoded_image(width, height, ImageFormat::Png), "image/png")
}

/// A `generateContent` body whose only part is an inline image.
pub fn image_response(mime_type: &str, data: &str) -> Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"inlineData": {"mimeType": mime_type, "data": data}}]},
            "finishReason": "STOP",
            "index": 0
        }]
    })
}

/// A `generateContent` body whose only part is text.
pub fn text_response(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP",
            "index": 0
        }]
    })
}

/// The service's error envelope.
pub fn error_body(code: u16, message: &str, status: &str) -> Value {
    json!({"error": {"code": code, "message": message, "status": status}})
}
