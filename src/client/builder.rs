//! Builder for [`GeminiImageService`].

use std::sync::Arc;

use crate::config::{ConfigResolver, UserSettings};
use crate::observability::{default_logger, Logger};
use crate::transport::{ReqwestTransportFactory, TransportFactory};

use super::client::GeminiImageService;

/// Builder for creating a [`GeminiImageService`].
///
/// Everything has a default: settings come from a fresh [`UserSettings`]
/// layered over the environment, and transports are built with `reqwest`.
///
/// ```
/// use integrations_gemini_image::client::ImageServiceBuilder;
/// use integrations_gemini_image::config::UserSettings;
/// use std::sync::Arc;
///
/// let settings = Arc::new(UserSettings::with_api_key("your-api-key"));
/// let service = ImageServiceBuilder::new()
///     .settings(settings)
///     .build();
/// ```
pub struct ImageServiceBuilder {
    resolver: Option<ConfigResolver>,

    // Injectable dependencies for testing
    transport_factory: Option<Arc<dyn TransportFactory>>,
    logger: Option<Arc<dyn Logger>>,
}

impl ImageServiceBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self {
            resolver: None,
            transport_factory: None,
            logger: None,
        }
    }

    /// Uses the standard layering over the given user settings.
    pub fn settings(mut self, settings: Arc<UserSettings>) -> Self {
        self.resolver = Some(ConfigResolver::layered(settings));
        self
    }

    /// Sets a custom config resolver.
    pub fn resolver(mut self, resolver: ConfigResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Sets a custom transport factory (for testing).
    pub fn transport_factory(mut self, factory: Arc<dyn TransportFactory>) -> Self {
        self.transport_factory = Some(factory);
        self
    }

    /// Sets a custom logger.
    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Builds the service.
    ///
    /// No connection is made and no key is required here; both happen on
    /// the first call.
    pub fn build(self) -> GeminiImageService {
        let resolver = self
            .resolver
            .unwrap_or_else(|| ConfigResolver::layered(Arc::new(UserSettings::new())));

        let factory: Arc<dyn TransportFactory> = self
            .transport_factory
            .unwrap_or_else(|| Arc::new(ReqwestTransportFactory));

        let logger = self.logger.unwrap_or_else(default_logger);

        logger.info(
            "Image service initialized",
            serde_json::json!({
                "resolver": format!("{:?}", resolver),
            }),
        );

        GeminiImageService::from_parts(resolver, factory, logger)
    }
}

impl Default for ImageServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{MockHttpTransport, MockTransportFactory};
    use crate::observability::NoopLogger;

    #[test]
    fn test_build_without_key_succeeds() {
        let service = ImageServiceBuilder::new()
            .resolver(ConfigResolver::new(vec![]))
            .logger(Arc::new(NoopLogger))
            .build();

        assert!(service.current_config().is_err());
    }

    #[test]
    fn test_settings_are_live() {
        let settings = Arc::new(UserSettings::new());
        let factory = Arc::new(MockTransportFactory::new(Arc::new(MockHttpTransport::new())));
        let service = ImageServiceBuilder::new()
            .resolver(ConfigResolver::new(vec![settings.clone() as Arc<dyn crate::config::SettingsSource>]))
            .transport_factory(factory)
            .logger(Arc::new(NoopLogger))
            .build();

        assert!(service.current_config().is_err());
        settings.set_api_key(Some("later".to_string()));
        assert!(service.current_config().is_ok());
    }
}
