//! Transport layer for the foursquare client.
//!
//! A [`Transport`] accepts a fully-prepared [`TransportRequest`], starts the
//! network I/O immediately, and hands back a [`PendingHandle`] that the caller
//! can await later. The default implementation, [`HttpTransport`], is backed
//! by `reqwest` and spawns each request onto the tokio runtime so several
//! handles can be in flight at once.

pub use error::{Result, TransportError};
pub use handle::PendingHandle;
pub use request::{
    BasicCredentials, MultipartField, RawResponse, RequestBody, TransportRequest,
};
pub use transport::{DEFAULT_TIMEOUT, HttpTransport, HttpTransportBuilder, Transport};

mod error;
mod handle;
mod request;
mod transport;
