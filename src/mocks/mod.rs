//! Mock implementations for testing.
//!
//! This module provides mock transport components for testing the image
//! client in isolation.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::ServiceConfig;
use crate::transport::{
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError, TransportFactory,
};

type QueuedResponse = (Option<Duration>, Result<HttpResponse, TransportError>);

/// Mock HTTP transport for testing.
///
/// Responses are returned in the order they were enqueued; every request is
/// recorded for later verification.
///
/// # Example
///
/// ```
/// use integrations_gemini_image::mocks::MockHttpTransport;
/// use integrations_gemini_image::transport::{HttpRequest, HttpMethod, HttpTransport};
/// use std::collections::HashMap;
///
/// # async fn example() {
/// let transport = MockHttpTransport::new();
/// transport.enqueue_json_response(200, r#"{"status": "ok"}"#);
///
/// let request = HttpRequest {
///     method: HttpMethod::Get,
///     url: "https://example.com".to_string(),
///     headers: HashMap::new(),
///     body: None,
/// };
///
/// let response = transport.send(request).await.unwrap();
/// assert_eq!(response.status, 200);
/// transport.verify_request_count(1);
/// # }
/// ```
pub struct MockHttpTransport {
    responses: Mutex<VecDeque<QueuedResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockHttpTransport {
    /// Create a new mock HTTP transport.
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Enqueue a response to be returned by the next request.
    pub fn enqueue_response(&self, response: Result<HttpResponse, TransportError>) {
        self.responses.lock().unwrap().push_back((None, response));
    }

    /// Enqueue a JSON response with the given status code and body.
    pub fn enqueue_json_response(&self, status: u16, body: &str) {
        self.enqueue_response(Ok(json_response(status, body)));
    }

    /// Enqueue a JSON value as a response body.
    pub fn enqueue_json(&self, status: u16, body: &serde_json::Value) {
        self.enqueue_json_response(status, &body.to_string());
    }

    /// Enqueue a JSON response that is delivered after `delay`.
    pub fn enqueue_delayed_json_response(&self, status: u16, body: &str, delay: Duration) {
        self.responses
            .lock()
            .unwrap()
            .push_back((Some(delay), Ok(json_response(status, body))));
    }

    /// Enqueue an error response.
    pub fn enqueue_error(&self, error: TransportError) {
        self.enqueue_response(Err(error));
    }

    /// Number of responses not yet consumed.
    pub fn pending_responses(&self) -> usize {
        self.responses.lock().unwrap().len()
    }

    /// Get all requests that were made.
    pub fn get_requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Get the last request that was made.
    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    /// The JSON body of the request at `index`.
    pub fn request_json(&self, index: usize) -> serde_json::Value {
        let requests = self.requests.lock().unwrap();
        assert!(index < requests.len(), "No request at index {}", index);
        let body = requests[index].body.as_ref().expect("request has no body");
        serde_json::from_slice(body).expect("request body is not JSON")
    }

    /// Verify that exactly `expected` requests were made.
    pub fn verify_request_count(&self, expected: usize) {
        let actual = self.requests.lock().unwrap().len();
        assert_eq!(actual, expected, "Expected {} requests, got {}", expected, actual);
    }

    /// Clear all recorded requests.
    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }

    /// Verify that a request was made with the expected method and URL.
    pub fn verify_request(&self, index: usize, method: HttpMethod, url_contains: &str) {
        let requests = self.requests.lock().unwrap();
        assert!(index < requests.len(), "No request at index {}", index);

        let request = &requests[index];
        assert_eq!(request.method, method, "Expected method {:?}, got {:?}", method, request.method);
        assert!(
            request.url.contains(url_contains),
            "Expected URL to contain '{}', got '{}'",
            url_contains,
            request.url
        );
    }

    /// Verify that a request contains a specific header.
    pub fn verify_header(&self, index: usize, header_name: &str, header_value: &str) {
        let requests = self.requests.lock().unwrap();
        assert!(index < requests.len(), "No request at index {}", index);

        let actual_value = requests[index].headers.get(header_name);
        assert_eq!(
            actual_value,
            Some(&header_value.to_string()),
            "Expected header '{}' to be '{}', got {:?}",
            header_name,
            header_value,
            actual_value
        );
    }
}

impl Default for MockHttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for MockHttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);

        let next = self.responses.lock().unwrap().pop_front();
        let (delay, response) = next.unwrap_or_else(|| {
            (
                None,
                Err(TransportError::Connection(
                    "No response configured in MockHttpTransport".into(),
                )),
            )
        });

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        response
    }
}

fn json_response(status: u16, body: &str) -> HttpResponse {
    let mut headers = HashMap::new();
    headers.insert("content-type".to_string(), "application/json".to_string());

    HttpResponse {
        status,
        headers,
        body: Bytes::from(body.to_string()),
    }
}

/// Transport factory that hands out one shared [`MockHttpTransport`].
///
/// Records every configuration it was asked to build for and can be told to
/// fail the next constructions.
pub struct MockTransportFactory {
    transport: Arc<MockHttpTransport>,
    created: Mutex<Vec<ServiceConfig>>,
    failures_remaining: AtomicUsize,
}

impl MockTransportFactory {
    /// Create a factory around `transport`.
    pub fn new(transport: Arc<MockHttpTransport>) -> Self {
        Self {
            transport,
            created: Mutex::new(Vec::new()),
            failures_remaining: AtomicUsize::new(0),
        }
    }

    /// Make the next `count` constructions fail.
    pub fn fail_next(&self, count: usize) {
        self.failures_remaining.store(count, Ordering::SeqCst);
    }

    /// Number of successful constructions.
    pub fn creation_count(&self) -> usize {
        self.created.lock().unwrap().len()
    }

    /// Configurations the factory built transports for, in order.
    pub fn created_configs(&self) -> Vec<ServiceConfig> {
        self.created.lock().unwrap().clone()
    }
}

impl TransportFactory for MockTransportFactory {
    fn create(&self, config: &ServiceConfig) -> Result<Arc<dyn HttpTransport>, TransportError> {
        let should_fail = self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(TransportError::Connection(
                "Mock transport construction failure".into(),
            ));
        }

        self.created.lock().unwrap().push(config.clone());
        Ok(self.transport.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn get_request(url: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: url.to_string(),
            headers: HashMap::new(),
            body: None,
        }
    }

    #[tokio::test]
    async fn test_mock_transport_multiple_responses() {
        let transport = MockHttpTransport::new();
        transport.enqueue_json_response(200, r#"{"id": 1}"#);
        transport.enqueue_json_response(201, r#"{"id": 2}"#);

        let response1 = transport.send(get_request("https://example.com/1")).await.unwrap();
        let response2 = transport.send(get_request("https://example.com/2")).await.unwrap();

        assert_eq!(response1.status, 200);
        assert_eq!(response2.status, 201);
        transport.verify_request_count(2);
        transport.verify_request(1, HttpMethod::Get, "/2");
    }

    #[tokio::test]
    async fn test_mock_transport_unconfigured_is_error() {
        let transport = MockHttpTransport::new();
        let result = transport.send(get_request("https://example.com")).await;

        assert!(matches!(result, Err(TransportError::Connection(_))));
        transport.verify_request_count(1);
    }

    #[tokio::test]
    async fn test_delayed_response() {
        let transport = MockHttpTransport::new();
        transport.enqueue_delayed_json_response(200, "{}", Duration::from_millis(20));

        let started = std::time::Instant::now();
        transport.send(get_request("https://example.com")).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_factory_failures_then_success() {
        let factory = MockTransportFactory::new(Arc::new(MockHttpTransport::new()));
        let config = ServiceConfig::builder()
            .api_key(SecretString::new("k".into()))
            .build()
            .unwrap();

        factory.fail_next(1);
        assert!(factory.create(&config).is_err());
        assert!(factory.create(&config).is_ok());
        assert_eq!(factory.creation_count(), 1);
    }
}
