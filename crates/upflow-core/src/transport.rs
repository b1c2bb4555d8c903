//! The transport collaborator: one HTTP-like exchange per call.
//!
//! The driver treats the transport as a narrow external interface: it
//! performs a single request and reports the response or a network error.
//! Retry logic, 404 semantics, and ordering guarantees all live above it.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use http::{Method, StatusCode};

/// A single request handed to the transport.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute request URL.
    pub url: String,
    /// Request headers, already merged by the caller.
    pub headers: HashMap<String, String>,
    /// Optional request body.
    pub body: Option<Bytes>,
}

impl TransportRequest {
    /// Create a body-less request.
    #[must_use]
    pub fn new(method: Method, url: String, headers: HashMap<String, String>) -> Self {
        Self {
            method,
            url,
            headers,
            body: None,
        }
    }

    /// Attach a request body.
    #[must_use]
    pub fn with_body(mut self, body: Bytes) -> Self {
        self.body = Some(body);
        self
    }
}

/// The response side of one exchange.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Collected response body.
    pub body: Bytes,
}

impl TransportResponse {
    /// Whether the status is 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Whether the status is `404 Not Found`: the resource being acted on
    /// is already gone, which cancellation treats as the desired end state.
    #[must_use]
    pub fn is_gone(&self) -> bool {
        self.status == StatusCode::NOT_FOUND
    }

    /// Case-insensitive header lookup.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Transport-level failure: no response was received.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    /// The request could not be delivered or the response not read.
    #[error("network error: {0}")]
    Network(String),

    /// The request could not be constructed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Performs a single HTTP-like request. No retry logic of its own.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute one exchange.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        (**self).send(request).await
    }
}
