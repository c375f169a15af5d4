//! Observability for the image client.
//!
//! Structured logging through the [`Logger`] trait, emitted via `tracing`
//! with credentials redacted.
//!
//! ```rust
//! use integrations_gemini_image::observability::{Logger, StructuredLogger};
//! use integrations_gemini_image::config::LogLevel;
//! use serde_json::json;
//!
//! let logger = StructuredLogger::new("gemini.image")
//!     .with_level(LogLevel::Debug);
//!
//! logger.info("Starting image edit", json!({
//!     "action": "apply filter",
//!     "attempt": 1
//! }));
//! ```

pub mod logging;

pub use logging::{redact_sensitive_fields, Logger, NoopLogger, StructuredLogger, LOG_TARGET};

use std::sync::Arc;

/// The logger used when none is supplied.
pub fn default_logger() -> Arc<dyn Logger> {
    Arc::new(StructuredLogger::new("gemini.image"))
}
