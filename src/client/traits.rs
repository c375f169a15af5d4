//! Client trait definitions.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ImageResult;
use crate::types::{AspectRatio, GenerateContentResponse, Modality, Part};

/// The remote generation capability consumed by the orchestrator.
///
/// Implementations resolve their configuration on every call and never
/// retry on their own.
#[async_trait]
pub trait ImageService: Send + Sync {
    /// Sends interleaved image and text parts to the editing model.
    async fn invoke(
        &self,
        parts: Vec<Part>,
        modalities: Vec<Modality>,
    ) -> ImageResult<GenerateContentResponse>;

    /// Sends parts to the text model and parses its JSON answer against `schema`.
    async fn invoke_structured(&self, parts: Vec<Part>, schema: Value) -> ImageResult<Value>;

    /// Generates one image from a text prompt; returns a `data:` URL.
    async fn generate_images(&self, prompt: &str, aspect_ratio: AspectRatio) -> ImageResult<String>;
}
