//! # Gemini Image Client
//!
//! Resilient Rust client for image editing and generation on the Gemini API.
//!
//! ## Features
//!
//! - Input normalization: JPEG/PNG only, longer side capped at 2048 pixels
//! - Multi-part edit requests (point edits, filters, styles, fusion, decades)
//! - Response interpretation into image, refusal or malformed outcomes
//! - One bounded fallback retry when the model answers with text
//! - Error classification into a small caller-facing taxonomy
//! - Per-call configuration resolution with a memoized client
//! - Secure credential handling with `SecretString`
//! - Mockable transport for tests
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use integrations_gemini_image::{ImageEditor, InputImage, UserSettings};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = Arc::new(UserSettings::with_api_key("your-api-key"));
//!     let editor = ImageEditor::with_settings(settings);
//!
//!     let photo = InputImage::new(std::fs::read("photo.jpg")?, "image/jpeg");
//!     let data_url = editor.apply_style(photo, "watercolor painting").await?;
//!     assert!(data_url.starts_with("data:image/"));
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - `editor` - The editing facade and composition root
//! - `orchestrator` - Refusal fallback retry loop
//! - `interpret` - Response interpretation
//! - `parts` - Request part construction and fallback prompts
//! - `asset` - Input image normalization
//! - `client` - Service client, client cache and request validation
//! - `config` - Configuration types and layered settings
//! - `auth` - API key authentication
//! - `transport` - HTTP transport layer
//! - `error` - Error types, status mapping and classification
//! - `types` - Wire types

#![warn(missing_docs)]
#![warn(clippy::all)]

// Public modules
pub mod asset;
pub mod auth;
pub mod client;
pub mod config;
pub mod editor;
pub mod error;
pub mod interpret;
pub mod observability;
pub mod orchestrator;
pub mod parts;
pub mod transport;
pub mod types;

// Development/testing modules - always available for integration tests
pub mod mocks;
pub mod fixtures;

// Re-exports for convenience
pub use asset::{AssetNormalizer, ImageAsset, InputImage};
pub use auth::{ApiKeyAuthManager, AuthManager};
pub use client::{ClientCache, GeminiImageService, ImageService, ImageServiceBuilder};
pub use config::{
    AuthMethod, ConfigResolver, EnvSettings, LogLevel, ServiceConfig, ServiceConfigBuilder,
    SettingsSource, UserSettings, DEFAULT_API_VERSION, DEFAULT_BASE_URL, DEFAULT_EDIT_MODEL,
    DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL, MAX_IMAGE_DIMENSION,
};
pub use editor::{EditResult, ImageEditor};
pub use error::{
    // Main error types
    ImageError,
    ImageResult,
    // Error categories
    AssetError,
    AuthenticationError,
    ConfigurationError,
    GenerationError,
    NetworkError,
    RequestError,
    ResponseError,
    SafetyDetail,
    ServerError,
    ValidationDetail,
    // Classification
    classify,
    ClassifiedError,
    ErrorCategory,
    // Error mapping utilities
    map_http_status,
    map_http_status_with_body,
};
pub use interpret::{interpret, GenerationOutcome};
pub use orchestrator::{AttemptState, RetryOrchestrator};
pub use parts::{EditKind, HotSpot, RetryPlan};
pub use transport::{
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, RequestBuilder, ResponseParser,
    TransportError, TransportFactory,
};

// Type re-exports
pub use types::{
    AspectRatio, Blob, Candidate, Content, FinishReason, GenerateContentRequest,
    GenerateContentResponse, GenerationConfig, Modality, Part, Role, SafetyRating, Suggestion,
};

// Observability re-exports
pub use observability::{Logger, NoopLogger, StructuredLogger};
