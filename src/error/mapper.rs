//! Error mapping utilities for HTTP status codes and API responses.

use serde::Deserialize;
use super::categories::*;
use super::types::ImageError;

/// Structured API error response from Gemini.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

/// Detailed error information from API.
#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub code: Option<i32>,
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Extracts the nested `error.message` from a JSON error envelope.
///
/// Returns `None` when the text is not JSON or has no such field.
pub fn extract_api_message(raw: &str) -> Option<String> {
    serde_json::from_str::<ApiErrorResponse>(raw.trim())
        .ok()
        .map(|response| response.error.message)
}

/// Maps HTTP status codes and response body to appropriate `ImageError` variants.
///
/// The raw body is preserved on every variant so the classifier can pick the
/// service-reported message out of it later.
pub fn map_http_status_with_body(status: u16, body: &[u8]) -> ImageError {
    let body = String::from_utf8_lossy(body).to_string();
    let api_status = serde_json::from_str::<ApiErrorResponse>(&body)
        .ok()
        .and_then(|response| response.error.status);

    match status {
        401 => ImageError::Authentication(AuthenticationError::InvalidApiKey { status, body }),

        403 => {
            if api_status.as_deref() == Some("PERMISSION_DENIED") {
                ImageError::Authentication(AuthenticationError::PermissionDenied { status, body })
            } else {
                ImageError::Authentication(AuthenticationError::InvalidApiKey { status, body })
            }
        }

        429 => ImageError::Request(RequestError::TooManyRequests {
            retry_after: None, // Set from headers by the response parser
            body,
        }),

        503 => ImageError::Server(ServerError::ServiceUnavailable {
            retry_after: None, // Set from headers by the response parser
            body,
        }),

        400..=499 => ImageError::Request(RequestError::Rejected { status, body }),

        _ => ImageError::Server(ServerError::InternalError { status, body }),
    }
}

/// Maps a status code and plain message to an error.
pub fn map_http_status(status: u16, message: String) -> ImageError {
    map_http_status_with_body(status, message.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_http_status_401() {
        let error = map_http_status(401, "Invalid API key".to_string());
        assert!(matches!(
            error,
            ImageError::Authentication(AuthenticationError::InvalidApiKey { status: 401, .. })
        ));
    }

    #[test]
    fn test_map_http_status_403_permission_denied() {
        let body = r#"{"error":{"code":403,"message":"denied","status":"PERMISSION_DENIED"}}"#;
        let error = map_http_status_with_body(403, body.as_bytes());
        assert!(matches!(
            error,
            ImageError::Authentication(AuthenticationError::PermissionDenied { .. })
        ));
    }

    #[test]
    fn test_map_http_status_400_keeps_body() {
        let body = r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT"}}"#;
        let error = map_http_status_with_body(400, body.as_bytes());
        match error {
            ImageError::Request(RequestError::Rejected { status, body: kept }) => {
                assert_eq!(status, 400);
                assert_eq!(kept, body);
            }
            other => panic!("Expected Rejected, got {other:?}"),
        }
    }

    #[test]
    fn test_map_http_status_429() {
        let error = map_http_status(429, "Rate limit exceeded".to_string());
        assert!(matches!(
            error,
            ImageError::Request(RequestError::TooManyRequests { .. })
        ));
    }

    #[test]
    fn test_map_http_status_5xx() {
        assert!(matches!(
            map_http_status(503, "unavailable".to_string()),
            ImageError::Server(ServerError::ServiceUnavailable { .. })
        ));
        assert!(matches!(
            map_http_status(500, "boom".to_string()),
            ImageError::Server(ServerError::InternalError { status: 500, .. })
        ));
    }

    #[test]
    fn test_extract_api_message() {
        assert_eq!(
            extract_api_message(r#"{"error":{"message":"API key not valid"}}"#),
            Some("API key not valid".to_string())
        );
        assert_eq!(extract_api_message("xhr error"), None);
        assert_eq!(extract_api_message(r#"{"other":1}"#), None);
    }
}
