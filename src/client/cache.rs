//! Memoized client handles keyed by configuration.

use std::sync::{Arc, Mutex, PoisonError};

use crate::config::ServiceConfig;
use crate::error::{ImageResult, NetworkError};
use crate::transport::{HttpTransport, RequestBuilder, TransportFactory};

/// A live connection for one configuration.
pub struct ClientHandle {
    config: ServiceConfig,
    transport: Arc<dyn HttpTransport>,
    request_builder: RequestBuilder,
}

impl ClientHandle {
    /// Creates a handle from its parts.
    pub fn new(config: ServiceConfig, transport: Arc<dyn HttpTransport>) -> Self {
        let request_builder = RequestBuilder::from_config(&config);
        Self {
            config,
            transport,
            request_builder,
        }
    }

    /// The configuration this handle was built for.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// The underlying transport.
    pub fn transport(&self) -> &Arc<dyn HttpTransport> {
        &self.transport
    }

    /// Request builder authenticated for this configuration.
    pub fn request_builder(&self) -> &RequestBuilder {
        &self.request_builder
    }
}

impl std::fmt::Debug for ClientHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientHandle")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Holds at most one [`ClientHandle`] and rebuilds it when the config changes.
///
/// The lock is held only while comparing and constructing, never across an
/// `.await`, so callers never observe a half-built handle.
pub struct ClientCache {
    factory: Arc<dyn TransportFactory>,
    slot: Mutex<Option<Arc<ClientHandle>>>,
}

impl ClientCache {
    /// Creates an empty cache.
    pub fn new(factory: Arc<dyn TransportFactory>) -> Self {
        Self {
            factory,
            slot: Mutex::new(None),
        }
    }

    /// Returns the cached handle for `config`, constructing a new one if the
    /// cached handle was built for a different configuration.
    ///
    /// # Errors
    ///
    /// Returns a network error when the transport cannot be constructed. The
    /// cache is left empty so the next call tries again.
    pub fn get_or_create(&self, config: &ServiceConfig) -> ImageResult<Arc<ClientHandle>> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(handle) = slot.as_ref() {
            if handle.config() == config {
                return Ok(Arc::clone(handle));
            }
            tracing::debug!("Service configuration changed; rebuilding client");
        }

        match self.factory.create(config) {
            Ok(transport) => {
                let handle = Arc::new(ClientHandle::new(config.clone(), transport));
                *slot = Some(Arc::clone(&handle));
                Ok(handle)
            }
            Err(e) => {
                *slot = None;
                Err(NetworkError::ConnectionFailed {
                    message: format!("Failed to create HTTP transport: {}", e),
                }
                .into())
            }
        }
    }

    /// Drops the cached handle.
    pub fn invalidate(&self) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Whether a handle is currently cached.
    pub fn is_populated(&self) -> bool {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).is_some()
    }
}

impl std::fmt::Debug for ClientCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCache")
            .field("populated", &self.is_populated())
            .finish()
    }
}
