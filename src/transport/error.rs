//! Transport layer error types.

use crate::error::{ImageError, NetworkError};

/// Transport error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Timeout")]
    Timeout,
    #[error("Request error: {0}")]
    Request(String),
}

impl From<TransportError> for ImageError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout => ImageError::Network(NetworkError::Timeout),
            TransportError::Connection(message) | TransportError::Request(message) => {
                ImageError::Network(NetworkError::ConnectionFailed { message })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_error_keeps_message() {
        let error: ImageError =
            TransportError::Connection("error sending request for url".to_string()).into();
        assert_eq!(error.raw_message(), "error sending request for url");
    }

    #[test]
    fn test_timeout_maps_to_network_timeout() {
        let error: ImageError = TransportError::Timeout.into();
        assert!(matches!(error, ImageError::Network(NetworkError::Timeout)));
    }
}
