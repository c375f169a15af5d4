//! Structured logging for the image client.
//!
//! Provides trait-based logging with structured field support.

use serde_json::Value;
use crate::config::LogLevel;

/// Target used for every event emitted by [`StructuredLogger`].
pub const LOG_TARGET: &str = "gemini_image";

const REDACTED: &str = "***REDACTED***";

const SENSITIVE_KEYS: &[&str] = &[
    "api_key", "apiKey", "key",
    "token", "access_token", "accessToken",
    "secret", "password", "credential",
    "authorization", "auth", "x-goog-api-key",
];

/// Logger trait for structured logging.
///
/// Implementations can integrate with various logging backends.
pub trait Logger: Send + Sync {
    /// Log a debug message with structured context.
    fn debug(&self, message: &str, fields: Value);

    /// Log an info message with structured context.
    fn info(&self, message: &str, fields: Value);

    /// Log a warning message with structured context.
    fn warn(&self, message: &str, fields: Value);

    /// Log an error message with structured context.
    fn error(&self, message: &str, fields: Value);
}

/// Structured logger backed by `tracing`.
///
/// Events carry the logger name and a JSON rendering of the context fields,
/// with credentials masked.
pub struct StructuredLogger {
    name: String,
    level: LogLevel,
}

impl StructuredLogger {
    /// Create a new structured logger with the given name.
    ///
    /// ```
    /// use integrations_gemini_image::observability::StructuredLogger;
    ///
    /// let logger = StructuredLogger::new("gemini.image");
    /// ```
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            level: LogLevel::Info,
        }
    }

    /// Set the minimum log level for this logger.
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    fn should_log(&self, level: LogLevel) -> bool {
        level <= self.level
    }
}

/// Masks credential-like keys at any depth.
pub fn redact_sensitive_fields(mut fields: Value) -> Value {
    match &mut fields {
        Value::Object(obj) => {
            for (key, value) in obj.iter_mut() {
                if SENSITIVE_KEYS.iter().any(|s| s.eq_ignore_ascii_case(key)) {
                    *value = Value::String(REDACTED.to_string());
                } else if value.is_object() || value.is_array() {
                    *value = redact_sensitive_fields(value.take());
                }
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                *item = redact_sensitive_fields(item.take());
            }
        }
        _ => {}
    }
    fields
}

impl Logger for StructuredLogger {
    fn debug(&self, message: &str, fields: Value) {
        if !self.should_log(LogLevel::Debug) {
            return;
        }

        let redacted_fields = redact_sensitive_fields(fields);
        tracing::debug!(
            target: LOG_TARGET,
            logger = %self.name,
            fields = %redacted_fields,
            "{}",
            message
        );
    }

    fn info(&self, message: &str, fields: Value) {
        if !self.should_log(LogLevel::Info) {
            return;
        }

        let redacted_fields = redact_sensitive_fields(fields);
        tracing::info!(
            target: LOG_TARGET,
            logger = %self.name,
            fields = %redacted_fields,
            "{}",
            message
        );
    }

    fn warn(&self, message: &str, fields: Value) {
        if !self.should_log(LogLevel::Warn) {
            return;
        }

        let redacted_fields = redact_sensitive_fields(fields);
        tracing::warn!(
            target: LOG_TARGET,
            logger = %self.name,
            fields = %redacted_fields,
            "{}",
            message
        );
    }

    fn error(&self, message: &str, fields: Value) {
        if !self.should_log(LogLevel::Error) {
            return;
        }

        let redacted_fields = redact_sensitive_fields(fields);
        tracing::error!(
            target: LOG_TARGET,
            logger = %self.name,
            fields = %redacted_fields,
            "{}",
            message
        );
    }
}

/// Logger that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn debug(&self, _message: &str, _fields: Value) {}
    fn info(&self, _message: &str, _fields: Value) {}
    fn warn(&self, _message: &str, _fields: Value) {}
    fn error(&self, _message: &str, _fields: Value) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_structured_logger_with_level() {
        let logger = StructuredLogger::new("test").with_level(LogLevel::Debug);
        assert_eq!(logger.name, "test");
        assert_eq!(logger.level, LogLevel::Debug);
    }

    #[test]
    fn test_should_log() {
        let logger = StructuredLogger::new("test").with_level(LogLevel::Info);
        assert!(logger.should_log(LogLevel::Error));
        assert!(logger.should_log(LogLevel::Warn));
        assert!(logger.should_log(LogLevel::Info));
        assert!(!logger.should_log(LogLevel::Debug));
        assert!(!logger.should_log(LogLevel::Trace));
    }

    #[test]
    fn test_redact_sensitive_fields() {
        let fields = json!({
            "api_key": "secret-key-123",
            "model": "gemini-2.5-flash-image-preview",
            "action": "apply filter"
        });

        let redacted = redact_sensitive_fields(fields);

        assert_eq!(redacted["api_key"], REDACTED);
        assert_eq!(redacted["model"], "gemini-2.5-flash-image-preview");
        assert_eq!(redacted["action"], "apply filter");
    }

    #[test]
    fn test_redact_nested_sensitive_fields() {
        let fields = json!({
            "request": {
                "headers": [{"X-Goog-Api-Key": "abc"}],
                "authorization": "Bearer token-123",
                "model": "m"
            }
        });

        let redacted = redact_sensitive_fields(fields);

        assert_eq!(redacted["request"]["authorization"], REDACTED);
        assert_eq!(redacted["request"]["headers"][0]["X-Goog-Api-Key"], REDACTED);
        assert_eq!(redacted["request"]["model"], "m");
    }

    #[test]
    fn test_logging_without_subscriber_is_silent() {
        let logger = StructuredLogger::new("test").with_level(LogLevel::Trace);
        logger.debug("debug", json!({"key": "k"}));
        logger.error("error", json!(null));
        NoopLogger.warn("ignored", json!({}));
    }
}
