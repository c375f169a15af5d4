use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::asset::ImageAsset;
use crate::types::Part;

/// Encodes a normalized asset as an inline image part.
pub fn to_inline_part(asset: &ImageAsset) -> Part {
    Part::inline(asset.mime_type.clone(), STANDARD.encode(&asset.data))
}

/// Formats an already base64-encoded payload as a `data:` URL.
pub fn to_data_url(mime_type: &str, base64_data: &str) -> String {
    format!("data:{mime_type};base64,{base64_data}")
}
