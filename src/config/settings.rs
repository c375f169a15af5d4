//! Layered settings sources and config resolution.

use secrecy::SecretString;
use std::sync::{Arc, PoisonError, RwLock};

use super::{ServiceConfig, ServiceConfigBuilder, DEFAULT_BASE_URL};
use crate::error::{ConfigurationError, ImageResult};

/// A source of user-adjustable connection settings.
///
/// Empty or whitespace-only values are treated as absent, so the next layer
/// is consulted.
pub trait SettingsSource: Send + Sync {
    /// The API key, if this layer provides one.
    fn api_key(&self) -> Option<String>;

    /// The base URL override, if this layer provides one.
    fn base_url(&self) -> Option<String>;
}

/// Settings supplied by the user at runtime, e.g. from a settings dialog.
#[derive(Debug, Default)]
pub struct UserSettings {
    api_key: RwLock<Option<String>>,
    base_url: RwLock<Option<String>>,
}

impl UserSettings {
    /// Creates empty user settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates user settings with an initial API key.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        let settings = Self::new();
        settings.set_api_key(Some(api_key.into()));
        settings
    }

    /// Replaces the API key override.
    pub fn set_api_key(&self, api_key: Option<String>) {
        *self.api_key.write().unwrap_or_else(PoisonError::into_inner) = api_key;
    }

    /// Replaces the base URL override.
    pub fn set_base_url(&self, base_url: Option<String>) {
        *self.base_url.write().unwrap_or_else(PoisonError::into_inner) = base_url;
    }
}

impl SettingsSource for UserSettings {
    fn api_key(&self) -> Option<String> {
        self.api_key
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn base_url(&self) -> Option<String> {
        self.base_url
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Settings read from the process environment.
///
/// - `GEMINI_API_KEY`, falling back to `GOOGLE_API_KEY`
/// - `GEMINI_BASE_URL`
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSettings;

impl SettingsSource for EnvSettings {
    fn api_key(&self) -> Option<String> {
        std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("GOOGLE_API_KEY"))
            .ok()
    }

    fn base_url(&self) -> Option<String> {
        std::env::var("GEMINI_BASE_URL").ok()
    }
}

/// Derives a [`ServiceConfig`] from ordered settings layers.
#[derive(Clone)]
pub struct ConfigResolver {
    layers: Vec<Arc<dyn SettingsSource>>,
    template: Arc<dyn Fn(ServiceConfigBuilder) -> ServiceConfigBuilder + Send + Sync>,
}

impl ConfigResolver {
    /// Creates a resolver over the given layers, highest priority first.
    pub fn new(layers: Vec<Arc<dyn SettingsSource>>) -> Self {
        Self {
            layers,
            template: Arc::new(|builder| builder),
        }
    }

    /// Creates the standard resolver: user settings, then the environment.
    pub fn layered(user: Arc<UserSettings>) -> Self {
        Self::new(vec![user as Arc<dyn SettingsSource>, Arc::new(EnvSettings)])
    }

    /// Applies extra builder settings (models, timeouts) to every resolved config.
    pub fn with_template<F>(mut self, template: F) -> Self
    where
        F: Fn(ServiceConfigBuilder) -> ServiceConfigBuilder + Send + Sync + 'static,
    {
        self.template = Arc::new(template);
        self
    }

    /// Resolves the current configuration.
    ///
    /// # Errors
    ///
    /// Returns `MissingApiKey` when no layer provides a key, and
    /// `InvalidBaseUrl` when the first provided URL does not parse.
    pub fn resolve(&self) -> ImageResult<ServiceConfig> {
        let api_key = self
            .first_non_empty(|layer| layer.api_key())
            .ok_or(ConfigurationError::MissingApiKey)?;

        let base_url = self
            .first_non_empty(|layer| layer.base_url())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let builder = ServiceConfig::builder()
            .api_key(SecretString::new(api_key))
            .base_url(&base_url)?;

        (self.template)(builder).build()
    }

    fn first_non_empty<F>(&self, read: F) -> Option<String>
    where
        F: Fn(&dyn SettingsSource) -> Option<String>,
    {
        self.layers
            .iter()
            .filter_map(|layer| read(layer.as_ref()))
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty())
    }
}

impl std::fmt::Debug for ConfigResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigResolver")
            .field("layers", &self.layers.len())
            .finish()
    }
}
