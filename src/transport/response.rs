//! HTTP response parser.
//!
//! Maps non-success statuses to [`ImageError`] variants that keep the raw
//! response body, so the classifier can later read the service's own message.

use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;

use super::http::HttpResponse;
use crate::error::{map_http_status_with_body, ImageError, RequestError, ServerError};

/// Parser for HTTP responses.
pub struct ResponseParser;

impl ResponseParser {
    /// Parses a successful HTTP response into the expected type.
    ///
    /// # Example
    ///
    /// ```
    /// use integrations_gemini_image::transport::{ResponseParser, HttpResponse};
    /// use bytes::Bytes;
    /// use serde::Deserialize;
    /// use std::collections::HashMap;
    ///
    /// #[derive(Deserialize)]
    /// struct ModelResponse {
    ///     name: String,
    /// }
    ///
    /// let response = HttpResponse {
    ///     status: 200,
    ///     headers: HashMap::new(),
    ///     body: Bytes::from(r#"{"name":"imagen"}"#),
    /// };
    ///
    /// let parsed: ModelResponse = ResponseParser::parse_response(response).unwrap();
    /// assert_eq!(parsed.name, "imagen");
    /// ```
    pub fn parse_response<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ImageError> {
        if (200..300).contains(&response.status) {
            let parsed: T = serde_json::from_slice(&response.body)?;
            Ok(parsed)
        } else {
            Err(Self::parse_error_response(response))
        }
    }

    /// Maps an error response to the matching error variant.
    ///
    /// - 401, 403 -> AuthenticationError
    /// - 429 -> RequestError::TooManyRequests (with retry_after)
    /// - 503 -> ServerError::ServiceUnavailable (with retry_after)
    /// - other 4xx -> RequestError::Rejected
    /// - other -> ServerError::InternalError
    pub fn parse_error_response(response: HttpResponse) -> ImageError {
        let retry_after = Self::parse_retry_after(&response.headers);
        let request_id = Self::extract_request_id(&response.headers);

        let mut error = map_http_status_with_body(response.status, &response.body);

        match &mut error {
            ImageError::Request(RequestError::TooManyRequests { retry_after: ra, .. })
            | ImageError::Server(ServerError::ServiceUnavailable { retry_after: ra, .. }) => {
                *ra = retry_after;
            }
            _ => {}
        }

        if let Some(ref id) = request_id {
            tracing::debug!(
                request_id = %id,
                status = response.status,
                error = %error,
                "API error occurred"
            );
        }

        error
    }

    /// Parses the Retry-After header (delay in seconds).
    ///
    /// ```
    /// use integrations_gemini_image::transport::ResponseParser;
    /// use std::collections::HashMap;
    /// use std::time::Duration;
    ///
    /// let mut headers = HashMap::new();
    /// headers.insert("Retry-After".to_string(), "60".to_string());
    ///
    /// assert_eq!(ResponseParser::parse_retry_after(&headers), Some(Duration::from_secs(60)));
    /// ```
    pub fn parse_retry_after(headers: &HashMap<String, String>) -> Option<Duration> {
        headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case("retry-after"))
            .and_then(|(_, value)| value.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
    }

    /// Extracts the request ID from response headers for debugging.
    pub fn extract_request_id(headers: &HashMap<String, String>) -> Option<String> {
        let possible_headers = ["x-request-id", "x-goog-request-id", "request-id"];

        headers
            .iter()
            .find(|(key, _)| possible_headers.contains(&key.to_lowercase().as_str()))
            .map(|(_, value)| value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthenticationError;
    use bytes::Bytes;
    use serde::Deserialize;

    #[derive(Deserialize, Debug, PartialEq)]
    struct TestResponse {
        name: String,
        value: i32,
    }

    fn create_response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::from(body.to_string()),
        }
    }

    #[test]
    fn test_parse_successful_response() {
        let response = create_response(200, r#"{"name":"test","value":42}"#);
        let parsed: TestResponse = ResponseParser::parse_response(response).unwrap();

        assert_eq!(parsed, TestResponse { name: "test".to_string(), value: 42 });
    }

    #[test]
    fn test_parse_malformed_success_body() {
        let response = create_response(200, "not json");
        let error = ResponseParser::parse_response::<TestResponse>(response).unwrap_err();

        assert!(matches!(error, ImageError::Response(_)));
    }

    #[test]
    fn test_parse_400_keeps_body() {
        let body = r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT"}}"#;
        let error = ResponseParser::parse_response::<TestResponse>(create_response(400, body)).unwrap_err();

        assert_eq!(error.raw_message(), body);
        assert_eq!(error.status(), Some(400));
    }

    #[test]
    fn test_parse_401_auth_error() {
        let response = create_response(401, r#"{"error":{"message":"Invalid API key"}}"#);
        let error = ResponseParser::parse_response::<TestResponse>(response).unwrap_err();

        assert!(matches!(
            error,
            ImageError::Authentication(AuthenticationError::InvalidApiKey { status: 401, .. })
        ));
    }

    #[test]
    fn test_parse_429_with_retry_after() {
        let mut response = create_response(429, r#"{"error":{"message":"slow down"}}"#);
        response.headers.insert("retry-after".to_string(), "30".to_string());

        let error = ResponseParser::parse_response::<TestResponse>(response).unwrap_err();
        assert_eq!(error.retry_after(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_parse_503_with_retry_after() {
        let mut response = create_response(503, "overloaded");
        response.headers.insert("Retry-After".to_string(), "5".to_string());

        let error = ResponseParser::parse_response::<TestResponse>(response).unwrap_err();
        assert!(matches!(error, ImageError::Server(ServerError::ServiceUnavailable { .. })));
        assert_eq!(error.retry_after(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_extract_request_id() {
        let mut headers = HashMap::new();
        headers.insert("X-Goog-Request-Id".to_string(), "abc123".to_string());

        assert_eq!(ResponseParser::extract_request_id(&headers), Some("abc123".to_string()));
        assert_eq!(ResponseParser::extract_request_id(&HashMap::new()), None);
    }
}
