//! Error types for the bitcoin.tax API client.
//!
//! # Design
//! One flat `ApiError` covers every way an operation can fail, so callers
//! match a single enum. Cancellation and deadline expiry get their own
//! top-level variants — a transport reports them through `TransportError`
//! and the `From` impl lifts them out of the transport wrapper, because
//! callers that supplied the deadline should not have to dig for it.
//! Nothing is logged or retried here; every failure is returned as a value.

use thiserror::Error;

/// The non-success statuses a well-formed response envelope can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiStatus {
    /// The service rejected the request (bad credentials, bad input).
    Fail,
    /// The service itself failed.
    Error,
}

impl std::fmt::Display for ApiStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiStatus::Fail => f.write_str("fail"),
            ApiStatus::Error => f.write_str("error"),
        }
    }
}

/// Failure reported by the injected [`HttpTransport`](crate::http::HttpTransport).
#[derive(Debug, Error)]
pub enum TransportError {
    /// The connection could not be established.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The exchange started but did not complete.
    #[error("i/o failure: {0}")]
    Io(String),

    /// The per-request deadline expired before a response arrived.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// The caller's cancellation signal fired mid-request.
    #[error("cancelled")]
    Cancelled,
}

/// Errors returned by [`Client`](crate::client::Client) operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The caller supplied an invalid input, detected before any network
    /// activity.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The request never produced an HTTP response.
    #[error("transport: {0}")]
    Transport(#[source] TransportError),

    /// The caller's cancellation signal fired mid-request.
    #[error("request cancelled")]
    Cancelled,

    /// The per-request deadline expired before a response arrived.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// The server answered with an HTTP status other than 200, before any
    /// envelope could be read.
    #[error("unexpected HTTP status {status}")]
    UnexpectedStatus { status: u16, body: String },

    /// The envelope or a transaction body could not be decoded.
    #[error("decode: {0}")]
    Decode(String),

    /// A well-formed envelope reporting `fail` or `error`, with the
    /// server's message verbatim.
    #[error("api {status}: {message}")]
    Api { status: ApiStatus, message: String },
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Cancelled => ApiError::Cancelled,
            TransportError::DeadlineExceeded => ApiError::DeadlineExceeded,
            other => ApiError::Transport(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadline_is_lifted_out_of_transport() {
        let err = ApiError::from(TransportError::DeadlineExceeded);
        assert!(matches!(err, ApiError::DeadlineExceeded));
    }

    #[test]
    fn cancellation_is_lifted_out_of_transport() {
        let err = ApiError::from(TransportError::Cancelled);
        assert!(matches!(err, ApiError::Cancelled));
    }

    #[test]
    fn connect_failure_stays_wrapped() {
        let err = ApiError::from(TransportError::Connect("refused".to_string()));
        assert!(matches!(err, ApiError::Transport(TransportError::Connect(_))));
    }

    #[test]
    fn api_error_display_carries_server_message() {
        let err = ApiError::Api {
            status: ApiStatus::Fail,
            message: "invalid key".to_string(),
        };
        assert_eq!(err.to_string(), "api fail: invalid key");
    }
}
