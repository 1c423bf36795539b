//! Transport error types

use std::time::Duration;
use thiserror::Error;

/// Result type for transport operations
pub type Result<T> = std::result::Result<T, TransportError>;

/// Errors that can occur while executing a request.
///
/// These are network-level failures. HTTP responses with error status codes
/// are not transport errors; they complete normally as a [`RawResponse`] and
/// are classified by the caller.
///
/// [`RawResponse`]: crate::RawResponse
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection-level failure (DNS, TLS, refused connection, ...)
    #[error("connection error: {0}")]
    Connection(String),

    /// The request did not complete within the configured timeout
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// HTTP protocol failure reported by the underlying client
    #[error("HTTP error: {0}")]
    Http(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The background task driving the request was aborted or panicked
    #[error("request task canceled: {0}")]
    Canceled(String),

    /// Generic transport error
    #[error("{0}")]
    Other(String),
}
