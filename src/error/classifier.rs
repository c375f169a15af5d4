//! Normalizes internal errors into the caller-facing taxonomy.
//!
//! Classification is an ordered rule table evaluated top to bottom:
//!
//! 1. Terminal generation outcomes, asset failures and a missing credential
//!    map straight to their category.
//! 2. Otherwise the raw message is unwrapped from a JSON `error.message`
//!    envelope when present, then matched against [`MESSAGE_RULES`].
//! 3. If no rule matches, the error variant's own category is used, falling
//!    back to [`ErrorCategory::Unknown`] with the message kept verbatim.

use std::fmt;
use thiserror::Error;

use super::categories::{AuthenticationError, ConfigurationError, GenerationError};
use super::mapper::extract_api_message;
use super::types::ImageError;

/// Caller-facing error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The credential is missing or rejected.
    InvalidCredential,
    /// The request never reached the service or the connection broke.
    NetworkFailure,
    /// The model answered with text instead of an image.
    ServiceRefusal,
    /// The request or the output was blocked by a safety policy.
    SafetyBlock,
    /// The response did not have a usable shape.
    MalformedResponse,
    /// The input image could not be read or re-encoded.
    DecodeFailure,
    /// Anything else.
    Unknown,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::InvalidCredential => "invalid_credential",
            ErrorCategory::NetworkFailure => "network_failure",
            ErrorCategory::ServiceRefusal => "service_refusal",
            ErrorCategory::SafetyBlock => "safety_block",
            ErrorCategory::MalformedResponse => "malformed_response",
            ErrorCategory::DecodeFailure => "decode_failure",
            ErrorCategory::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// A terminal error ready for display, tagged with the action that failed.
#[derive(Error, Debug, Clone)]
#[error("Error occurred during '{action}': {user_message}")]
pub struct ClassifiedError {
    /// Error category.
    pub category: ErrorCategory,
    /// The action being attempted, e.g. "retouch".
    pub action: String,
    /// Human-readable message.
    pub user_message: String,
    /// The underlying error.
    #[source]
    pub cause: ImageError,
}

/// A substring rule mapping a raw message to a category and display text.
#[derive(Debug, Clone, Copy)]
pub struct ClassificationRule {
    /// Case-insensitive substring to look for.
    pub pattern: &'static str,
    /// Category assigned on match.
    pub category: ErrorCategory,
    /// Message shown to the user on match.
    pub message: &'static str,
}

const INVALID_KEY_MESSAGE: &str = "API key is invalid. Please check the key in your settings.";
const MISSING_KEY_MESSAGE: &str = "No API key configured. Please add a key in your settings.";
const NETWORK_MESSAGE: &str = "Network error. Please check your connection and try again.";

/// Message rules, evaluated in order.
pub const MESSAGE_RULES: &[ClassificationRule] = &[
    ClassificationRule {
        pattern: "API key not valid",
        category: ErrorCategory::InvalidCredential,
        message: INVALID_KEY_MESSAGE,
    },
    ClassificationRule {
        pattern: "API_KEY_INVALID",
        category: ErrorCategory::InvalidCredential,
        message: INVALID_KEY_MESSAGE,
    },
    ClassificationRule {
        pattern: "xhr error",
        category: ErrorCategory::NetworkFailure,
        message: NETWORK_MESSAGE,
    },
    ClassificationRule {
        pattern: "error sending request",
        category: ErrorCategory::NetworkFailure,
        message: NETWORK_MESSAGE,
    },
    ClassificationRule {
        pattern: "failed to fetch",
        category: ErrorCategory::NetworkFailure,
        message: NETWORK_MESSAGE,
    },
];

/// Classifies an error raised while performing `action`.
pub fn classify(error: &ImageError, action: &str) -> ClassifiedError {
    let (category, user_message) = match error {
        ImageError::Generation(generation) => classify_generation(generation),
        ImageError::Asset(asset) => (ErrorCategory::DecodeFailure, asset.to_string()),
        ImageError::Configuration(ConfigurationError::MissingApiKey) => {
            (ErrorCategory::InvalidCredential, MISSING_KEY_MESSAGE.to_string())
        }
        other => classify_message(&other.raw_message(), category_hint(other)),
    };

    ClassifiedError {
        category,
        action: action.to_string(),
        user_message,
        cause: error.clone(),
    }
}

/// Applies the JSON-envelope and substring rules to a raw message.
pub fn classify_message(raw: &str, hint: Option<ErrorCategory>) -> (ErrorCategory, String) {
    let basis = extract_api_message(raw).unwrap_or_else(|| raw.to_string());
    let lowered = basis.to_lowercase();

    if let Some(rule) = MESSAGE_RULES
        .iter()
        .find(|rule| lowered.contains(&rule.pattern.to_lowercase()))
    {
        return (rule.category, rule.message.to_string());
    }

    (hint.unwrap_or(ErrorCategory::Unknown), basis)
}

fn classify_generation(error: &GenerationError) -> (ErrorCategory, String) {
    let blocked = error.detail().is_safety_block();
    let category = match error {
        GenerationError::Refusal { .. } if blocked => ErrorCategory::SafetyBlock,
        GenerationError::Refusal { .. } => ErrorCategory::ServiceRefusal,
        GenerationError::Malformed { .. } if blocked => ErrorCategory::SafetyBlock,
        GenerationError::Malformed { .. } => ErrorCategory::MalformedResponse,
    };
    (category, error.to_string())
}

fn category_hint(error: &ImageError) -> Option<ErrorCategory> {
    match error {
        ImageError::Authentication(
            AuthenticationError::InvalidApiKey { .. } | AuthenticationError::PermissionDenied { .. },
        ) => Some(ErrorCategory::InvalidCredential),
        ImageError::Network(_) => Some(ErrorCategory::NetworkFailure),
        ImageError::Response(_) => Some(ErrorCategory::MalformedResponse),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{NetworkError, RequestError, SafetyDetail};

    #[test]
    fn test_nested_message_takes_precedence() {
        let (category, message) =
            classify_message(r#"{"error":{"message":"Quota exhausted"}}"#, None);
        assert_eq!(category, ErrorCategory::Unknown);
        assert_eq!(message, "Quota exhausted");
    }

    #[test]
    fn test_rules_are_case_insensitive() {
        let (category, message) = classify_message("XHR error: status 0", None);
        assert_eq!(category, ErrorCategory::NetworkFailure);
        assert_eq!(message, NETWORK_MESSAGE);
    }

    #[test]
    fn test_hint_used_when_no_rule_matches() {
        let error = ImageError::Network(NetworkError::Timeout);
        let classified = classify(&error, "apply style");
        assert_eq!(classified.category, ErrorCategory::NetworkFailure);
        assert_eq!(classified.user_message, "Request timed out");
    }

    #[test]
    fn test_display_embeds_action() {
        let error = ImageError::Request(RequestError::Rejected {
            status: 400,
            body: "plain failure".to_string(),
        });
        let classified = classify(&error, "retouch");
        assert_eq!(
            classified.to_string(),
            "Error occurred during 'retouch': plain failure"
        );
    }

    #[test]
    fn test_refusal_with_block_is_safety() {
        let error = ImageError::Generation(GenerationError::Refusal {
            text: "I can't help with that.".to_string(),
            detail: SafetyDetail {
                finish_reason: Some("SAFETY".to_string()),
                ..Default::default()
            },
        });
        assert_eq!(classify(&error, "filter").category, ErrorCategory::SafetyBlock);
    }
}
