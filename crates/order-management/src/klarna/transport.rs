//! HTTP transport seam.
//!
//! [`KlarnaClient`](super::KlarnaClient) hands each [`RequestSpec`] to a
//! [`Transport`] exactly once. [`ReqwestTransport`] is the production
//! implementation; tests script responses through their own transport.

use std::future::Future;
use std::time::Duration;

use reqwest::header::HeaderMap;
use thiserror::Error;
use tracing::instrument;

use super::request::RequestSpec;

/// Failure below the HTTP status level.
#[derive(Debug, Error)]
pub enum TransportError {
    /// `reqwest` failed (connect, TLS, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Any other transport failure.
    #[error("Connection failed: {0}")]
    Connection(String),
}

/// A raw HTTP response.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

impl HttpResponse {
    /// Response with a status and body and no headers.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// A header value as a string, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Sends a prepared request and returns the raw response.
pub trait Transport: Send + Sync {
    /// Send `request` once. Non-2xx statuses are responses, not errors.
    fn send(
        &self,
        request: &RequestSpec,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

/// [`Transport`] backed by a `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with a request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    #[instrument(
        skip(self, request),
        fields(operation = %request.operation, method = %request.method, url = %request.url)
    )]
    async fn send(&self, request: &RequestSpec) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.text().await?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use reqwest::header::HeaderValue;

    use super::*;

    #[test]
    fn test_success_range() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(199, "").is_success());
        assert!(!HttpResponse::new(300, "").is_success());
        assert!(!HttpResponse::new(404, "").is_success());
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let mut response = HttpResponse::new(201, "");
        response
            .headers
            .insert("capture-id", HeaderValue::from_static("cap-9"));
        assert_eq!(response.header("Capture-Id"), Some("cap-9"));
        assert_eq!(response.header("Refund-Id"), None);
    }
}
