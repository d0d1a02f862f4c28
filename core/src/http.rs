//! HTTP transport seam for the host-does-IO pattern.
//!
//! # Design
//! Requests and responses are plain data. The core builds `HttpRequest`
//! values and parses `HttpResponse` values without touching the network;
//! the actual round-trip runs through whatever [`HttpTransport`] the caller
//! injects at client construction. Connection pooling, TLS, and proxying
//! all live behind that trait. The per-request `timeout` is the caller's
//! cancellation signal: a transport must honor it and report
//! [`TransportError::DeadlineExceeded`](crate::error::TransportError) when
//! it expires rather than hang.

use std::time::Duration;

use crate::error::TransportError;

/// HTTP method for a request. The API only uses these two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// An HTTP request described as plain data.
///
/// Built by `Client::build_*` methods and handed to an [`HttpTransport`]
/// for execution.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Absolute URL, query string included.
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    /// Deadline for the whole exchange; `None` means the transport's own
    /// default applies.
    pub timeout: Option<Duration>,
}

/// An HTTP response described as plain data.
///
/// Produced by an [`HttpTransport`] and consumed by `Client::parse_*`
/// methods. Non-2xx statuses are returned as data, not transport errors —
/// status interpretation belongs to the client.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// The injected collaborator that executes one HTTP exchange.
///
/// Implementations must be usable through `&self` so a single client can
/// serve concurrent callers; the client itself holds no mutable state.
pub trait HttpTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}
