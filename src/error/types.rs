//! Main error type for the image client.

use std::time::Duration;
use thiserror::Error;
use super::categories::*;

/// Result type alias for image client operations.
pub type ImageResult<T> = Result<T, ImageError>;

/// Top-level error type for the image client.
#[derive(Error, Debug, Clone)]
pub enum ImageError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Authentication error: {0}")]
    Authentication(#[from] AuthenticationError),

    #[error("Request error: {0}")]
    Request(#[from] RequestError),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Server error: {0}")]
    Server(#[from] ServerError),

    #[error("Response error: {0}")]
    Response(#[from] ResponseError),

    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),
}

impl ImageError {
    /// Returns the message of the innermost error without the category prefix.
    ///
    /// For service errors this is the raw response body, which may itself be
    /// a JSON error envelope.
    pub fn raw_message(&self) -> String {
        match self {
            ImageError::Configuration(e) => e.to_string(),
            ImageError::Authentication(e) => e.to_string(),
            ImageError::Request(e) => e.to_string(),
            ImageError::Network(e) => e.to_string(),
            ImageError::Server(e) => e.to_string(),
            ImageError::Response(e) => e.to_string(),
            ImageError::Asset(e) => e.to_string(),
            ImageError::Generation(e) => e.to_string(),
        }
    }

    /// Returns the HTTP status code when the error came from a service response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ImageError::Authentication(
                AuthenticationError::InvalidApiKey { status, .. }
                | AuthenticationError::PermissionDenied { status, .. },
            )
            | ImageError::Request(RequestError::Rejected { status, .. })
            | ImageError::Server(ServerError::InternalError { status, .. }) => Some(*status),
            ImageError::Request(RequestError::TooManyRequests { .. }) => Some(429),
            ImageError::Server(ServerError::ServiceUnavailable { .. }) => Some(503),
            _ => None,
        }
    }

    /// Returns the retry-after duration if the service provided one.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            ImageError::Request(RequestError::TooManyRequests { retry_after, .. })
            | ImageError::Server(ServerError::ServiceUnavailable { retry_after, .. }) => *retry_after,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ImageError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ImageError::Network(NetworkError::Timeout)
        } else {
            ImageError::Network(NetworkError::ConnectionFailed {
                message: err.to_string(),
            })
        }
    }
}

impl From<serde_json::Error> for ImageError {
    fn from(err: serde_json::Error) -> Self {
        ImageError::Response(ResponseError::DeserializationError {
            message: err.to_string(),
        })
    }
}

impl From<url::ParseError> for ImageError {
    fn from(err: url::ParseError) -> Self {
        ImageError::Configuration(ConfigurationError::InvalidBaseUrl {
            url: err.to_string(),
        })
    }
}

impl From<image::ImageError> for ImageError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::Encoding(e) => ImageError::Asset(AssetError::Encode {
                message: e.to_string(),
            }),
            other => ImageError::Asset(AssetError::Decode {
                message: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_message_strips_category_prefix() {
        let error = ImageError::Request(RequestError::Rejected {
            status: 400,
            body: r#"{"error":{"message":"bad"}}"#.to_string(),
        });

        assert_eq!(error.raw_message(), r#"{"error":{"message":"bad"}}"#);
        assert!(error.to_string().starts_with("Request error: "));
        assert_eq!(error.status(), Some(400));
    }

    #[test]
    fn test_retry_after() {
        let error = ImageError::Request(RequestError::TooManyRequests {
            retry_after: Some(Duration::from_secs(30)),
            body: String::new(),
        });
        assert_eq!(error.retry_after(), Some(Duration::from_secs(30)));

        let config_error = ImageError::Configuration(ConfigurationError::MissingApiKey);
        assert_eq!(config_error.retry_after(), None);
        assert_eq!(config_error.status(), None);
    }
}
