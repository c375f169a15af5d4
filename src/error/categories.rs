//! Error category types for granular error handling.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Configuration-related errors.
#[derive(Error, Debug, Clone)]
pub enum ConfigurationError {
    #[error("Missing API key")]
    MissingApiKey,

    #[error("Invalid base URL: {url}")]
    InvalidBaseUrl { url: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },
}

/// Authentication-related errors reported by the service.
#[derive(Error, Debug, Clone)]
pub enum AuthenticationError {
    #[error("{body}")]
    InvalidApiKey { status: u16, body: String },

    #[error("{body}")]
    PermissionDenied { status: u16, body: String },
}

/// Request rejected by the service.
#[derive(Error, Debug, Clone)]
pub enum RequestError {
    #[error("Validation error: {message}")]
    ValidationError { message: String, details: Vec<ValidationDetail> },

    #[error("{body}")]
    Rejected { status: u16, body: String },

    #[error("{body}")]
    TooManyRequests { retry_after: Option<Duration>, body: String },
}

/// Validation detail for field-level errors.
#[derive(Debug, Clone)]
pub struct ValidationDetail {
    pub field: String,
    pub description: String,
}

/// Network-related errors.
#[derive(Error, Debug, Clone)]
pub enum NetworkError {
    #[error("{message}")]
    ConnectionFailed { message: String },

    #[error("Request timed out")]
    Timeout,
}

/// Server-side errors.
#[derive(Error, Debug, Clone)]
pub enum ServerError {
    #[error("{body}")]
    InternalError { status: u16, body: String },

    #[error("{body}")]
    ServiceUnavailable { retry_after: Option<Duration>, body: String },
}

/// Response parsing errors.
#[derive(Error, Debug, Clone)]
pub enum ResponseError {
    #[error("Failed to deserialize response: {message}")]
    DeserializationError { message: String },

    #[error("The service returned no image: {message}")]
    EmptyResult { message: String },

    #[error("Invalid structured output: {message}")]
    InvalidStructuredOutput { message: String },
}

/// Input image errors. Always terminal.
#[derive(Error, Debug, Clone)]
pub enum AssetError {
    #[error("Failed to decode image: {message}")]
    Decode { message: String },

    #[error("Failed to encode image: {message}")]
    Encode { message: String },

    #[error("Rendering surface unavailable: {message}")]
    SurfaceUnavailable { message: String },
}

/// Terminal generation outcomes that did not produce an image.
#[derive(Error, Debug, Clone)]
pub enum GenerationError {
    #[error("The model responded with text instead of an image: {text}")]
    Refusal { text: String, detail: SafetyDetail },

    #[error("Malformed response from the model: {reason}{detail}")]
    Malformed { reason: String, detail: SafetyDetail },
}

impl GenerationError {
    /// Returns the safety detail attached to the outcome.
    pub fn detail(&self) -> &SafetyDetail {
        match self {
            GenerationError::Refusal { detail, .. } | GenerationError::Malformed { detail, .. } => {
                detail
            }
        }
    }
}

/// Finish and safety metadata collected from a response.
///
/// Policy blocks are reported through this detail rather than as a separate
/// outcome because the service signals them the same way as stylistic
/// refusals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SafetyDetail {
    /// Finish reason of the first candidate, if any.
    pub finish_reason: Option<String>,
    /// Prompt-level block reason, if any.
    pub block_reason: Option<String>,
    /// Safety ratings flagged on the candidate or prompt.
    pub safety_ratings: Vec<SafetyRatingInfo>,
}

/// Information about a safety rating for error reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafetyRatingInfo {
    pub category: String,
    pub probability: String,
    pub blocked: bool,
}

impl SafetyDetail {
    /// Returns true when there is nothing to report.
    pub fn is_empty(&self) -> bool {
        self.finish_reason.is_none() && self.block_reason.is_none() && self.safety_ratings.is_empty()
    }

    /// Returns true when the detail indicates a policy block.
    pub fn is_safety_block(&self) -> bool {
        const BLOCKING_REASONS: &[&str] = &[
            "SAFETY",
            "IMAGE_SAFETY",
            "PROHIBITED_CONTENT",
            "BLOCKLIST",
            "SPII",
        ];

        self.block_reason.is_some()
            || self
                .finish_reason
                .as_deref()
                .is_some_and(|reason| BLOCKING_REASONS.contains(&reason))
            || self.safety_ratings.iter().any(|rating| rating.blocked)
    }
}

impl fmt::Display for SafetyDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(reason) = &self.finish_reason {
            write!(f, " (finish reason: {reason})")?;
        }
        if let Some(reason) = &self.block_reason {
            write!(f, " (blocked: {reason})")?;
        }
        for rating in self.safety_ratings.iter().filter(|r| r.blocked) {
            write!(f, " [{}: {}]", rating.category, rating.probability)?;
        }
        Ok(())
    }
}
