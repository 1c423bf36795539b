//! # foursquare
//!
//! Async client for the classic Foursquare REST API:
//! - Symbolic calls: `getUserCheckins` resolves to `GET /user/checkins.json`
//! - Lazy responses: network completion and JSON decoding happen on first
//!   field access, so many requests can be in flight and reconciled later
//! - OAuth-signed or HTTP Basic authentication
//! - Typed error taxonomy classified from HTTP status codes
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use foursquare::{Client, Params, SymbolicCall};
//!
//! #[tokio::main]
//! async fn main() -> foursquare::Result<()> {
//!     let client = Client::builder().concurrent().build()?;
//!
//!     // Fire both requests, then resolve in any order
//!     let user = client.call(SymbolicCall::new("getUser")).await?;
//!     let checkins = client
//!         .call(SymbolicCall::new("getCheckins").params(Params::new().text("l", "10")))
//!         .await?;
//!
//!     println!("checkins: {}", checkins.len().await?);
//!     if let Some(name) = user.get("firstname").await? {
//!         println!("hello, {name}");
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// Re-export commonly used types
pub use auth::{Consumer, OAuthSigner, SignedRequest, Token};
pub use client::{Client, ClientBuilder};
pub use config::{ClientConfig, DispatchMode};
pub use endpoint::{CallArg, ResolvedRequest, SymbolicCall};
pub use error::{ApiError, ApiErrorKind, Error, Result};
pub use params::{FilePart, ParamValue, Params};
pub use response::LazyResponse;

// Module declarations
pub mod auth;
pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod params;
pub mod response;

// Re-export the transport layer for custom transports
pub use foursquare_transport as transport;
pub use foursquare_transport::{BasicCredentials, RawResponse, Transport, TransportError};

/// Client version, taken from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.foursquare.com";

/// Default API version path segment
pub const DEFAULT_API_VERSION: &str = "v1";

/// Default user-agent header value
pub const USER_AGENT: &str = concat!("foursquare-rs/", env!("CARGO_PKG_VERSION"));

/// Prelude module for common imports
pub mod prelude {
    pub use crate::{
        ApiError, ApiErrorKind, Client, ClientConfig, DispatchMode, Error, LazyResponse, Params,
        Result, SymbolicCall,
    };
}
