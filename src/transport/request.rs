//! HTTP request builder.
//!
//! This module provides the `RequestBuilder` for constructing HTTP requests
//! with authentication, headers, and URL formatting.

use bytes::Bytes;
use serde::Serialize;
use std::collections::HashMap;
use url::Url;

use super::http::{HttpMethod, HttpRequest};
use crate::auth::{ApiKeyAuthManager, AuthManager};
use crate::config::ServiceConfig;
use crate::error::ImageError;

/// Builder for constructing HTTP requests to the generation service.
///
/// The `RequestBuilder` handles:
/// - URL construction with API version prefixes
/// - Authentication via the configured auth manager
/// - Request body serialization
#[derive(Clone)]
pub struct RequestBuilder {
    base_url: Url,
    api_version: String,
    auth_manager: Box<dyn AuthManager>,
}

impl RequestBuilder {
    /// Creates a new request builder.
    pub fn new(base_url: Url, api_version: String, auth_manager: Box<dyn AuthManager>) -> Self {
        Self {
            base_url,
            api_version,
            auth_manager,
        }
    }

    /// Creates a request builder authenticated with the config's API key.
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(
            config.base_url.clone(),
            config.api_version.clone(),
            Box::new(ApiKeyAuthManager::from_config(config)),
        )
    }

    /// Builds a complete URL for the given path.
    ///
    /// A base URL with a path (e.g. a proxy prefix) keeps that path; the
    /// API version and endpoint path are appended after it.
    pub fn build_url(&self, path: &str) -> Result<Url, ImageError> {
        let path = path.trim_start_matches('/');
        let full_path = format!("{}/{}", self.api_version.trim_matches('/'), path);

        let mut base = self.base_url.clone();
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }

        // "./" keeps a `models/x:verb` segment from being read as a scheme.
        let mut url = base.join(&format!("./{}", full_path))?;

        if let Some((key, value)) = self.auth_manager.get_auth_query_param() {
            url.query_pairs_mut().append_pair(&key, &value);
        }

        Ok(url)
    }

    /// Builds an HTTP request with an optional JSON body.
    pub fn build_request<T: Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&T>,
        extra_headers: Option<HashMap<String, String>>,
    ) -> Result<HttpRequest, ImageError> {
        let url = self.build_url(path)?;

        let mut headers = HashMap::new();

        if body.is_some() {
            headers.insert("Content-Type".to_string(), "application/json".to_string());
        }

        if let Some((key, value)) = self.auth_manager.get_auth_header() {
            headers.insert(key, value);
        }

        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let body_bytes = match body {
            Some(body) => Some(Bytes::from(serde_json::to_vec(body)?)),
            None => None,
        };

        Ok(HttpRequest {
            method,
            url: url.to_string(),
            headers,
            body: body_bytes,
        })
    }

    /// Builds a JSON POST request.
    pub fn post_json<T: Serialize>(&self, path: &str, body: &T) -> Result<HttpRequest, ImageError> {
        self.build_request(HttpMethod::Post, path, Some(body), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthMethod;
    use secrecy::SecretString;
    use serde::Serialize;

    #[derive(Serialize)]
    struct TestBody {
        message: String,
    }

    fn create_test_builder(auth_method: AuthMethod, base_url: &str) -> RequestBuilder {
        let config = ServiceConfig::builder()
            .api_key(SecretString::new("test-api-key".into()))
            .base_url(base_url)
            .unwrap()
            .auth_method(auth_method)
            .build()
            .unwrap();

        RequestBuilder::from_config(&config)
    }

    #[test]
    fn test_build_url_with_version() {
        let builder = create_test_builder(AuthMethod::Header, "https://generativelanguage.googleapis.com");
        let url = builder.build_url("/models/gemini-x:generateContent").unwrap();

        assert_eq!(
            url.as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-x:generateContent"
        );
    }

    #[test]
    fn test_build_url_keeps_proxy_prefix() {
        let builder = create_test_builder(AuthMethod::Header, "https://proxy.example.com/gemini");
        let url = builder.build_url("/models/m:predict").unwrap();

        assert_eq!(url.as_str(), "https://proxy.example.com/gemini/v1beta/models/m:predict");
    }

    #[test]
    fn test_build_url_with_query_param_auth() {
        let builder = create_test_builder(AuthMethod::QueryParam, "https://example.com");
        let url = builder.build_url("/models").unwrap();

        assert!(url.query().unwrap().contains("key=test-api-key"));
    }

    #[test]
    fn test_build_url_strips_leading_slash() {
        let builder = create_test_builder(AuthMethod::Header, "https://example.com");
        assert_eq!(builder.build_url("/models").unwrap(), builder.build_url("models").unwrap());
    }

    #[test]
    fn test_post_json_sets_headers_and_body() {
        let builder = create_test_builder(AuthMethod::Header, "https://example.com");
        let body = TestBody {
            message: "test".to_string(),
        };

        let request = builder.post_json("/models/m:generateContent", &body).unwrap();

        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.headers.get("Content-Type").unwrap(), "application/json");
        assert_eq!(request.headers.get("x-goog-api-key").unwrap(), "test-api-key");
        assert_eq!(request.body.unwrap().as_ref(), br#"{"message":"test"}"#);
    }

    #[test]
    fn test_build_request_without_body() {
        let builder = create_test_builder(AuthMethod::QueryParam, "https://example.com");
        let request = builder
            .build_request::<TestBody>(HttpMethod::Get, "/models", None, None)
            .unwrap();

        assert!(!request.headers.contains_key("Content-Type"));
        assert!(!request.headers.contains_key("x-goog-api-key"));
        assert!(request.body.is_none());
    }
}
