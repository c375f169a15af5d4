//! The service implementation backed by the generation REST API.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;

use crate::config::{ConfigResolver, ServiceConfig};
use crate::error::{ImageResult, ResponseError};
use crate::observability::Logger;
use crate::parts::to_data_url;
use crate::transport::{endpoints, ResponseParser, TransportFactory};
use crate::types::{
    AspectRatio, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    Modality, Part, PredictRequest, PredictResponse,
};

use super::builder::ImageServiceBuilder;
use super::cache::{ClientCache, ClientHandle};
use super::traits::ImageService;
use super::validation::{validate_generate_request, validate_predict_request};

/// [`ImageService`] implementation talking to the hosted models.
///
/// The configuration is resolved again for every call, so a key entered by
/// the user after construction is picked up without rebuilding the service.
///
/// # Example
///
/// ```no_run
/// use integrations_gemini_image::client::{GeminiImageService, ImageService};
/// use integrations_gemini_image::types::AspectRatio;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let service = GeminiImageService::builder().build();
/// let data_url = service.generate_images("a lighthouse at dusk", AspectRatio::Widescreen).await?;
/// # Ok(())
/// # }
/// ```
pub struct GeminiImageService {
    resolver: ConfigResolver,
    cache: ClientCache,
    logger: Arc<dyn Logger>,
}

impl GeminiImageService {
    /// Creates a new service builder.
    pub fn builder() -> ImageServiceBuilder {
        ImageServiceBuilder::new()
    }

    pub(super) fn from_parts(
        resolver: ConfigResolver,
        factory: Arc<dyn TransportFactory>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            resolver,
            cache: ClientCache::new(factory),
            logger,
        }
    }

    /// Resolves the current configuration without sending anything.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when no API key is available.
    pub fn current_config(&self) -> ImageResult<ServiceConfig> {
        self.resolver.resolve()
    }

    /// Drops the cached connection; the next call builds a new one.
    pub fn invalidate(&self) {
        self.cache.invalidate();
    }

    fn handle(&self) -> ImageResult<Arc<ClientHandle>> {
        let config = self.resolver.resolve()?;
        self.cache.get_or_create(&config)
    }

    async fn post<B, T>(&self, handle: &ClientHandle, model: &str, path: &str, body: &B) -> ImageResult<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let start = Instant::now();
        let request = handle.request_builder().post_json(path, body)?;

        let response = match handle.transport().send(request).await {
            Ok(response) => response,
            Err(e) => {
                self.logger.error(
                    "Network error during generation request",
                    json!({
                        "model": model,
                        "error": e.to_string(),
                    }),
                );
                return Err(e.into());
            }
        };

        let status = response.status;
        let parsed = ResponseParser::parse_response(response);

        match &parsed {
            Ok(_) => self.logger.debug(
                "Generation request completed",
                json!({
                    "model": model,
                    "status": status,
                    "duration_ms": start.elapsed().as_millis(),
                }),
            ),
            Err(e) => self.logger.error(
                "Generation request failed",
                json!({
                    "model": model,
                    "status": status,
                    "error": e.to_string(),
                    "duration_ms": start.elapsed().as_millis(),
                }),
            ),
        }

        parsed
    }

    fn content_request(parts: Vec<Part>, generation_config: GenerationConfig) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content::user(parts)],
            generation_config: Some(generation_config),
        }
    }
}

#[async_trait]
impl ImageService for GeminiImageService {
    async fn invoke(
        &self,
        parts: Vec<Part>,
        modalities: Vec<Modality>,
    ) -> ImageResult<GenerateContentResponse> {
        let handle = self.handle()?;
        let model = handle.config().edit_model.clone();

        let image_parts = parts.iter().filter(|p| p.as_inline_data().is_some()).count();
        self.logger.debug(
            "Starting image edit request",
            json!({
                "model": model,
                "image_parts": image_parts,
                "text_parts": parts.len() - image_parts,
            }),
        );

        let request = Self::content_request(parts, GenerationConfig::with_modalities(modalities));
        validate_generate_request(&request)?;

        self.post(&handle, &model, &endpoints::generate_content(&model), &request)
            .await
    }

    async fn invoke_structured(&self, parts: Vec<Part>, schema: Value) -> ImageResult<Value> {
        let handle = self.handle()?;
        let model = handle.config().text_model.clone();

        self.logger.debug(
            "Starting structured request",
            json!({
                "model": model,
                "parts": parts.len(),
            }),
        );

        let request = Self::content_request(parts, GenerationConfig::structured(schema));
        validate_generate_request(&request)?;

        let response: GenerateContentResponse = self
            .post(&handle, &model, &endpoints::generate_content(&model), &request)
            .await?;

        let text = response.first_text().ok_or_else(|| ResponseError::InvalidStructuredOutput {
            message: "response contained no text".to_string(),
        })?;

        serde_json::from_str(text.trim()).map_err(|e| {
            ResponseError::InvalidStructuredOutput {
                message: format!("response was not valid JSON: {}", e),
            }
            .into()
        })
    }

    async fn generate_images(&self, prompt: &str, aspect_ratio: AspectRatio) -> ImageResult<String> {
        let handle = self.handle()?;
        let model = handle.config().image_model.clone();

        self.logger.debug(
            "Starting image generation",
            json!({
                "model": model,
                "aspect_ratio": aspect_ratio.as_str(),
            }),
        );

        let request = PredictRequest::single_png(prompt.trim(), aspect_ratio);
        validate_predict_request(&request)?;

        let response: PredictResponse = self
            .post(&handle, &model, &endpoints::predict(&model), &request)
            .await?;

        let prediction = response
            .predictions
            .into_iter()
            .find(|p| p.bytes_base64_encoded.as_deref().is_some_and(|b| !b.is_empty()));

        match prediction {
            Some(prediction) => {
                let mime = prediction.mime_type.as_deref().unwrap_or("image/png");
                let data = prediction.bytes_base64_encoded.unwrap_or_default();
                Ok(to_data_url(mime, &data))
            }
            None => Err(ResponseError::EmptyResult {
                message: "image generation returned no images".to_string(),
            }
            .into()),
        }
    }
}

impl std::fmt::Debug for GeminiImageService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiImageService")
            .field("resolver", &self.resolver)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
