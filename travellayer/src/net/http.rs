//! Async HTTP client trait and reqwest implementation.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur during HTTP operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum HttpError {
    /// Transport-level failure (DNS, connect, timeout, TLS).
    #[error("network failure: {0}")]
    Network(String),

    /// Server answered with a non-success status.
    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },
}

/// Trait for asynchronous HTTP GET operations.
///
/// This abstraction allows for dependency injection and easier testing by
/// enabling mock HTTP clients in tests.
pub trait AsyncHttpClient: Send + Sync {
    /// Performs an async HTTP GET request.
    ///
    /// Returns the response body as bytes, or an error for transport
    /// failures and non-2xx statuses.
    fn get(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, HttpError>> + Send;
}

/// Default timeout for data provider requests.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Real HTTP client implementation using reqwest.
#[derive(Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Creates a new client with default configuration.
    pub fn new() -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("travellayer/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HttpError::Network(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

impl AsyncHttpClient for ReqwestClient {
    async fn get(&self, url: &str) -> Result<Vec<u8>, HttpError> {
        debug!(url, "HTTP GET");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| HttpError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(url, status = status.as_u16(), "HTTP GET failed");
            return Err(HttpError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| HttpError::Network(e.to_string()))?;
        Ok(body.to_vec())
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Mock HTTP client serving canned responses by URL.
    #[derive(Default)]
    pub struct MockHttpClient {
        responses: Mutex<HashMap<String, Result<Vec<u8>, HttpError>>>,
        request_count: AtomicUsize,
    }

    impl MockHttpClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_response(self, url: &str, body: &str) -> Self {
            self.responses
                .lock()
                .unwrap()
                .insert(url.to_string(), Ok(body.as_bytes().to_vec()));
            self
        }

        pub fn with_error(self, url: &str, error: HttpError) -> Self {
            self.responses
                .lock()
                .unwrap()
                .insert(url.to_string(), Err(error));
            self
        }

        pub fn request_count(&self) -> usize {
            self.request_count.load(Ordering::SeqCst)
        }
    }

    impl AsyncHttpClient for MockHttpClient {
        async fn get(&self, url: &str) -> Result<Vec<u8>, HttpError> {
            self.request_count.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .get(url)
                .cloned()
                .unwrap_or_else(|| {
                    Err(HttpError::Status {
                        status: 404,
                        url: url.to_string(),
                    })
                })
        }
    }

    #[tokio::test]
    async fn mock_returns_canned_body() {
        let client = MockHttpClient::new().with_response("http://x/a.json", "{}");
        assert_eq!(client.get("http://x/a.json").await.unwrap(), b"{}");
        assert_eq!(client.request_count(), 1);
    }

    #[tokio::test]
    async fn mock_unknown_url_is_404() {
        let client = MockHttpClient::new();
        match client.get("http://x/missing").await {
            Err(HttpError::Status { status, .. }) => assert_eq!(status, 404),
            other => panic!("expected 404, got {:?}", other),
        }
    }
}
