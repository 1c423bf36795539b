//! OAuth credential types and the signer seam
//!
//! Signing itself is a collaborator concern: the client hands the signer a
//! verb, URL, and parameter bag and gets back a signed request descriptor.
//! How the signature is computed (HMAC-SHA1 for the classic API) lives
//! entirely behind the [`OAuthSigner`] trait.

use crate::error::Result;
use crate::params::Params;
use http::{HeaderMap, Method};
use secrecy::SecretString;
use std::fmt;
use url::Url;

/// OAuth consumer identity (application credentials).
#[derive(Debug, Clone)]
pub struct Consumer {
    /// Consumer key
    pub key: String,
    /// Consumer secret
    pub secret: SecretString,
}

impl Consumer {
    /// Create a consumer identity.
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: SecretString::new(secret.into().into_boxed_str()),
        }
    }
}

/// OAuth token for a user (access token pair).
#[derive(Debug, Clone)]
pub struct Token {
    /// Token key
    pub key: String,
    /// Token secret
    pub secret: SecretString,
}

impl Token {
    /// Create a token.
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: SecretString::new(secret.into().into_boxed_str()),
        }
    }
}

/// A signed request descriptor produced by an [`OAuthSigner`].
///
/// For GET requests the signer embeds the (signed) parameters in the URL
/// query string; for requests with a body the parameters stay in the body
/// and only the signature material travels in `url`/`headers`.
#[derive(Debug, Clone)]
pub struct SignedRequest {
    /// Target URL, including any signed query string
    pub url: Url,
    /// Headers to attach (e.g. an `Authorization` header)
    pub headers: HeaderMap,
}

/// Produces signed request descriptors from credentials and a target URL.
///
/// Implementations are free to sign via query parameters or an
/// `Authorization` header; the dispatcher treats the result as opaque.
pub trait OAuthSigner: Send + Sync + fmt::Debug {
    /// Sign a request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be signed (e.g. the signer
    /// cannot represent the parameter bag).
    fn sign(
        &self,
        method: &Method,
        url: &Url,
        params: &Params,
        consumer: &Consumer,
        token: Option<&Token>,
    ) -> Result<SignedRequest>;
}
