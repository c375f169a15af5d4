//! Configuration types for the image client.
//!
//! A [`ServiceConfig`] is derived on every invocation by a [`ConfigResolver`]
//! walking ordered [`SettingsSource`] layers: the user's own overrides first,
//! then the process environment.

mod settings;

pub use settings::{ConfigResolver, EnvSettings, SettingsSource, UserSettings};

use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::time::Duration;
use url::Url;
use crate::error::{ImageError, ConfigurationError};

/// Default Gemini API base URL.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default API version.
pub const DEFAULT_API_VERSION: &str = "v1beta";

/// Default request timeout (120 seconds).
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default connect timeout (30 seconds).
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Model used for image editing and multimodal generation.
pub const DEFAULT_EDIT_MODEL: &str = "gemini-2.5-flash-image-preview";

/// Model used for text-to-image generation.
pub const DEFAULT_IMAGE_MODEL: &str = "imagen-4.0-generate-001";

/// Model used for structured text output.
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";

/// Longest side, in pixels, accepted for uploaded images.
pub const MAX_IMAGE_DIMENSION: u32 = 2048;

/// Authentication method for API key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AuthMethod {
    /// Use x-goog-api-key header (recommended).
    #[default]
    Header,
    /// Use ?key= query parameter.
    QueryParam,
}

/// Log level for the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    /// Error level - only errors.
    Error,
    /// Warning level - errors and warnings.
    Warn,
    /// Info level - general information.
    #[default]
    Info,
    /// Debug level - detailed information.
    Debug,
    /// Trace level - very detailed information.
    Trace,
}

/// Connection configuration for the generation service.
#[derive(Clone)]
pub struct ServiceConfig {
    /// API key (required).
    pub api_key: SecretString,
    /// Base URL for the API.
    pub base_url: Url,
    /// API version.
    pub api_version: String,
    /// Default timeout for requests.
    pub timeout: Duration,
    /// Connect timeout.
    pub connect_timeout: Duration,
    /// Authentication method.
    pub auth_method: AuthMethod,
    /// Image editing model id.
    pub edit_model: String,
    /// Text-to-image model id.
    pub image_model: String,
    /// Structured text model id.
    pub text_model: String,
}

impl ServiceConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::default()
    }
}

impl PartialEq for ServiceConfig {
    fn eq(&self, other: &Self) -> bool {
        self.api_key.expose_secret() == other.api_key.expose_secret()
            && self.base_url == other.base_url
            && self.api_version == other.api_version
            && self.timeout == other.timeout
            && self.connect_timeout == other.connect_timeout
            && self.auth_method == other.auth_method
            && self.edit_model == other.edit_model
            && self.image_model == other.image_model
            && self.text_model == other.text_model
    }
}

impl Eq for ServiceConfig {}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url.as_str())
            .field("api_version", &self.api_version)
            .field("auth_method", &self.auth_method)
            .field("edit_model", &self.edit_model)
            .field("image_model", &self.image_model)
            .field("text_model", &self.text_model)
            .finish()
    }
}

/// Builder for ServiceConfig.
#[derive(Default)]
pub struct ServiceConfigBuilder {
    api_key: Option<SecretString>,
    base_url: Option<Url>,
    api_version: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    auth_method: Option<AuthMethod>,
    edit_model: Option<String>,
    image_model: Option<String>,
    text_model: Option<String>,
}

impl ServiceConfigBuilder {
    /// Set the API key.
    pub fn api_key(mut self, api_key: SecretString) -> Self {
        self.api_key = Some(api_key);
        self
    }

    /// Set the base URL.
    pub fn base_url(mut self, base_url: &str) -> Result<Self, ImageError> {
        self.base_url = Some(Url::parse(base_url)?);
        Ok(self)
    }

    /// Set the API version.
    pub fn api_version(mut self, version: &str) -> Self {
        self.api_version = Some(version.to_string());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the authentication method.
    pub fn auth_method(mut self, method: AuthMethod) -> Self {
        self.auth_method = Some(method);
        self
    }

    /// Set the image editing model.
    pub fn edit_model(mut self, model: &str) -> Self {
        self.edit_model = Some(model.to_string());
        self
    }

    /// Set the text-to-image model.
    pub fn image_model(mut self, model: &str) -> Self {
        self.image_model = Some(model.to_string());
        self
    }

    /// Set the structured text model.
    pub fn text_model(mut self, model: &str) -> Self {
        self.text_model = Some(model.to_string());
        self
    }

    /// Build the configuration.
    pub fn build(self) -> Result<ServiceConfig, ImageError> {
        let api_key = self.api_key
            .filter(|key| !key.expose_secret().trim().is_empty())
            .ok_or(ConfigurationError::MissingApiKey)?;

        let base_url = match self.base_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_BASE_URL)?,
        };

        if base_url.cannot_be_a_base() {
            return Err(ConfigurationError::InvalidBaseUrl {
                url: base_url.to_string(),
            }
            .into());
        }

        Ok(ServiceConfig {
            api_key,
            base_url,
            api_version: self.api_version.unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            timeout: self.timeout.unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            connect_timeout: self.connect_timeout.unwrap_or(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS)),
            auth_method: self.auth_method.unwrap_or_default(),
            edit_model: self.edit_model.unwrap_or_else(|| DEFAULT_EDIT_MODEL.to_string()),
            image_model: self.image_model.unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()),
            text_model: self.text_model.unwrap_or_else(|| DEFAULT_TEXT_MODEL.to_string()),
        })
    }
}
