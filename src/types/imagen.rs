//! Types for the text-to-image `:predict` surface.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Aspect ratio of a generated image.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum AspectRatio {
    /// Square.
    #[default]
    #[serde(rename = "1:1")]
    Square,
    /// Landscape 16:9.
    #[serde(rename = "16:9")]
    Widescreen,
    /// Portrait 9:16.
    #[serde(rename = "9:16")]
    Portrait,
    /// Landscape 4:3.
    #[serde(rename = "4:3")]
    Landscape,
    /// Portrait 3:4.
    #[serde(rename = "3:4")]
    Tall,
}

impl AspectRatio {
    /// Wire form, e.g. `"16:9"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Widescreen => "16:9",
            AspectRatio::Portrait => "9:16",
            AspectRatio::Landscape => "4:3",
            AspectRatio::Tall => "3:4",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AspectRatio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1:1" => Ok(AspectRatio::Square),
            "16:9" => Ok(AspectRatio::Widescreen),
            "9:16" => Ok(AspectRatio::Portrait),
            "4:3" => Ok(AspectRatio::Landscape),
            "3:4" => Ok(AspectRatio::Tall),
            other => Err(format!("unsupported aspect ratio: {other}")),
        }
    }
}

/// A single prompt instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PredictInstance {
    /// The text prompt.
    pub prompt: String,
}

/// Generation parameters for `:predict`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PredictParameters {
    /// Number of images to generate.
    pub sample_count: u32,
    /// Encoding of the returned images.
    pub output_mime_type: String,
    /// Aspect ratio of the returned images.
    pub aspect_ratio: AspectRatio,
}

/// Request body for `:predict`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PredictRequest {
    /// Prompt instances.
    pub instances: Vec<PredictInstance>,
    /// Shared parameters.
    pub parameters: PredictParameters,
}

impl PredictRequest {
    /// A request for a single PNG image.
    pub fn single_png(prompt: impl Into<String>, aspect_ratio: AspectRatio) -> Self {
        Self {
            instances: vec![PredictInstance {
                prompt: prompt.into(),
            }],
            parameters: PredictParameters {
                sample_count: 1,
                output_mime_type: "image/png".to_string(),
                aspect_ratio,
            },
        }
    }
}

/// One generated image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    /// Base64 image payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes_base64_encoded: Option<String>,
    /// MIME type of the payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Set when the image was filtered out.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rai_filtered_reason: Option<String>,
}

/// Response body of `:predict`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PredictResponse {
    /// Generated images; may be empty or absent.
    #[serde(default)]
    pub predictions: Vec<Prediction>,
}
