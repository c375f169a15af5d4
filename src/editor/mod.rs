//! The editing facade.
//!
//! [`ImageEditor`] is the composition root: it owns the asset normalizer,
//! the generation service (and through it the client cache) and the retry
//! orchestrator, and exposes one method per editing operation. Every method
//! returns either a `data:` URL or a [`ClassifiedError`] tagged with the
//! operation's action label.

use futures::future::try_join_all;
use serde_json::json;
use std::sync::Arc;

use crate::asset::{AssetNormalizer, ImageAsset, InputImage};
use crate::client::{GeminiImageService, ImageService};
use crate::config::UserSettings;
use crate::error::{classify, ClassifiedError, ImageError, ResponseError};
use crate::observability::{default_logger, Logger};
use crate::orchestrator::RetryOrchestrator;
use crate::parts::{self, EditKind, HotSpot, RetryPlan};
use crate::types::{suggestion_schema, AspectRatio, Suggestion, SuggestionList};

/// Result type returned by every editor operation.
pub type EditResult<T> = Result<T, ClassifiedError>;

/// Action labels used in classified errors and logs.
pub mod actions {
    /// Localized edit at a hotspot.
    pub const RETOUCH: &str = "retouch";
    /// Background removal.
    pub const REMOVE_BACKGROUND: &str = "remove background";
    /// Multi-image composition.
    pub const FUSE: &str = "fuse images";
    /// Decade transformation.
    pub const DECADE: &str = "decade transform";
    /// Text-to-image generation.
    pub const GENERATE: &str = "generate image";
    /// Structured suggestions.
    pub const SUGGEST: &str = "suggest edits";
}

/// High-level image editing operations.
///
/// # Example
///
/// ```no_run
/// use integrations_gemini_image::asset::InputImage;
/// use integrations_gemini_image::config::UserSettings;
/// use integrations_gemini_image::editor::ImageEditor;
/// use std::sync::Arc;
///
/// # async fn example(bytes: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
/// let editor = ImageEditor::with_settings(Arc::new(UserSettings::with_api_key("your-api-key")));
/// let image = InputImage::new(bytes, "image/jpeg");
///
/// let data_url = editor.apply_filter(image, "vintage sepia").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ImageEditor {
    normalizer: AssetNormalizer,
    service: Arc<dyn ImageService>,
    orchestrator: RetryOrchestrator,
    logger: Arc<dyn Logger>,
}

impl ImageEditor {
    /// Creates an editor around an existing service.
    pub fn new(service: Arc<dyn ImageService>, logger: Arc<dyn Logger>) -> Self {
        Self {
            normalizer: AssetNormalizer::new(),
            orchestrator: RetryOrchestrator::new(Arc::clone(&service), Arc::clone(&logger)),
            service,
            logger,
        }
    }

    /// Creates an editor using the hosted service, reading settings from
    /// `settings` and then the environment.
    pub fn with_settings(settings: Arc<UserSettings>) -> Self {
        let logger = default_logger();
        let service = GeminiImageService::builder()
            .settings(settings)
            .logger(Arc::clone(&logger))
            .build();
        Self::new(Arc::new(service), logger)
    }

    /// Replaces the asset normalizer.
    pub fn with_normalizer(mut self, normalizer: AssetNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Edits the region around `spot` as described by `prompt`.
    ///
    /// A refusal is terminal.
    pub async fn retouch(&self, image: InputImage, prompt: &str, spot: HotSpot) -> EditResult<String> {
        let asset = self.prepare(actions::RETOUCH, image).await?;
        self.run(actions::RETOUCH, parts::point_edit(&asset, prompt, spot)).await
    }

    /// Applies a photographic filter.
    pub async fn apply_filter(&self, image: InputImage, prompt: &str) -> EditResult<String> {
        self.styled(EditKind::Filter, image, prompt).await
    }

    /// Applies a tonal or colour adjustment.
    pub async fn apply_adjustment(&self, image: InputImage, prompt: &str) -> EditResult<String> {
        self.styled(EditKind::Adjustment, image, prompt).await
    }

    /// Applies a surface texture.
    pub async fn apply_texture(&self, image: InputImage, prompt: &str) -> EditResult<String> {
        self.styled(EditKind::Texture, image, prompt).await
    }

    /// Applies an artistic style.
    pub async fn apply_style(&self, image: InputImage, prompt: &str) -> EditResult<String> {
        self.styled(EditKind::Style, image, prompt).await
    }

    /// Removes the background. A refusal is terminal.
    pub async fn remove_background(&self, image: InputImage) -> EditResult<String> {
        let asset = self.prepare(actions::REMOVE_BACKGROUND, image).await?;
        self.run(actions::REMOVE_BACKGROUND, parts::background_removal(&asset))
            .await
    }

    /// Composes `sources` into `main`.
    ///
    /// All images are normalized concurrently; the parts keep the order in
    /// which the sources were given.
    pub async fn fuse(&self, main: InputImage, sources: Vec<InputImage>, prompt: &str) -> EditResult<String> {
        let normalizer = &self.normalizer;
        let (main, sources) = futures::try_join!(
            normalizer.normalize_input(main),
            try_join_all(sources.into_iter().map(|image| normalizer.normalize_input(image))),
        )
        .map_err(|e| self.fail(actions::FUSE, &e))?;

        self.run(actions::FUSE, parts::fusion(&main, &sources, prompt)).await
    }

    /// Places the subject in the decade named by `prompt`.
    ///
    /// When the prompt names a decade such as `1970s`, a refusal is retried
    /// once with a generic era prompt.
    pub async fn transform_decade(&self, image: InputImage, prompt: &str) -> EditResult<String> {
        let asset = self.prepare(actions::DECADE, image).await?;
        self.run(actions::DECADE, parts::decade_transform(&asset, prompt)).await
    }

    /// Generates a new image from a text prompt.
    pub async fn generate_image(&self, prompt: &str, aspect_ratio: AspectRatio) -> EditResult<String> {
        self.service
            .generate_images(prompt, aspect_ratio)
            .await
            .map_err(|e| self.fail(actions::GENERATE, &e))
    }

    /// Asks for `count` edit suggestions for `image`, named in `language`.
    pub async fn suggest(&self, image: InputImage, language: &str, count: usize) -> EditResult<Vec<Suggestion>> {
        let asset = self.prepare(actions::SUGGEST, image).await?;
        let value = self
            .service
            .invoke_structured(parts::suggestion_parts(&asset, language, count), suggestion_schema())
            .await
            .map_err(|e| self.fail(actions::SUGGEST, &e))?;

        let list: SuggestionList = serde_json::from_value(value).map_err(|e| {
            let error = ImageError::from(ResponseError::InvalidStructuredOutput {
                message: format!("suggestions did not match the schema: {}", e),
            });
            self.fail(actions::SUGGEST, &error)
        })?;

        self.logger.debug(
            "Suggestions received",
            json!({
                "requested": count,
                "received": list.suggestions.len(),
            }),
        );
        Ok(list.suggestions)
    }

    async fn styled(&self, kind: EditKind, image: InputImage, prompt: &str) -> EditResult<String> {
        let asset = self.prepare(kind.action(), image).await?;
        self.run(kind.action(), parts::styled_edit(kind, &asset, prompt)).await
    }

    async fn prepare(&self, action: &str, image: InputImage) -> EditResult<ImageAsset> {
        self.normalizer
            .normalize_input(image)
            .await
            .map_err(|e| self.fail(action, &e))
    }

    async fn run(&self, action: &str, plan: RetryPlan) -> EditResult<String> {
        self.orchestrator.run(action, plan).await
    }

    fn fail(&self, action: &str, error: &ImageError) -> ClassifiedError {
        let classified = classify(error, action);
        self.logger.error(
            "Operation failed",
            json!({
                "action": action,
                "category": classified.category.to_string(),
                "error": classified.user_message,
            }),
        );
        classified
    }
}

impl std::fmt::Debug for ImageEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageEditor")
            .field("normalizer", &self.normalizer)
            .finish_non_exhaustive()
    }
}
