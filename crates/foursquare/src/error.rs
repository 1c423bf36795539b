//! Error types for the foursquare client
//!
//! Resolution-time errors (`UnsupportedVerb`, `MalformedEndpoint`,
//! `InvalidRequest`, `InvalidUrl`, `MissingConfig`) fail fast before any
//! network I/O. `Api`, `Decode`, and `Transport` are deferred: they surface
//! on first access to a [`LazyResponse`](crate::LazyResponse) field, not at
//! dispatch time.

use foursquare_transport::TransportError;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type alias for operations that can fail with a client error.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the foursquare client.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The verb prefix of a symbolic call name is not a supported HTTP method.
    #[error("unsupported verb `{0}` in call name")]
    UnsupportedVerb(String),

    /// The symbolic call name does not yield an endpoint path.
    #[error("call name `{0}` does not map to an endpoint")]
    MalformedEndpoint(String),

    /// The response body was not valid JSON.
    #[error("failed to decode response body: {0}")]
    Decode(Arc<serde_json::Error>),

    /// The API answered with an error status code.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Network-level failure, surfaced as-is from the transport.
    #[error("transport error: {0}")]
    Transport(Arc<TransportError>),

    /// A request URL could not be constructed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The request parameters cannot be encoded for this verb.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Missing required configuration.
    #[error("missing required configuration: {0}")]
    MissingConfig(String),
}

impl From<TransportError> for Error {
    fn from(err: TransportError) -> Self {
        Error::Transport(Arc::new(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Decode(Arc::new(err))
    }
}

/// A classified HTTP failure from the API.
///
/// Created only during lazy response resolution, when the status code falls
/// outside the `[200, 400)` success window. The raw body text is carried as
/// the message so callers keep the API's own error detail.
#[derive(Debug, Clone, Error)]
#[error("{kind} (status {status}): {message}")]
pub struct ApiError {
    /// Classified error category
    pub kind: ApiErrorKind,
    /// Original HTTP status code
    pub status: u16,
    /// Raw response body text
    pub message: String,
}

/// Error categories derived from the HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// 400
    BadRequest,
    /// 401
    NotAuthorized,
    /// 403
    Forbidden,
    /// 404
    NotFound,
    /// Any other status outside `[200, 400)`
    Generic,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BadRequest => "bad request",
            Self::NotAuthorized => "not authorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not found",
            Self::Generic => "API error",
        };
        f.write_str(name)
    }
}

impl ApiError {
    /// Classify a failed status code and raw body into an `ApiError`.
    ///
    /// The mapping is total: every status outside `[200, 400)` produces a
    /// kind, with `Generic` as the catch-all. Callers must not invoke this
    /// for successful status codes.
    pub fn classify(status: u16, body: &str) -> Self {
        let kind = match status {
            400 => ApiErrorKind::BadRequest,
            401 => ApiErrorKind::NotAuthorized,
            403 => ApiErrorKind::Forbidden,
            404 => ApiErrorKind::NotFound,
            _ => ApiErrorKind::Generic,
        };
        Self {
            kind,
            status,
            message: body.to_string(),
        }
    }
}
