//! Configuration for the foursquare client

use crate::auth::{Consumer, Token};
use http::HeaderMap;
use std::time::Duration;

/// How dispatched requests relate to the caller.
///
/// `Blocking` mirrors the classic single-request mode: the dispatcher waits
/// for the transport before handing back the response. `Concurrent` leaves
/// the request in flight so several responses can be reconciled later, in
/// any order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchMode {
    /// Wait for completion at dispatch time
    #[default]
    Blocking,
    /// Leave the request in flight; resolution happens on first access
    Concurrent,
}

/// Configuration for the client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// OAuth consumer identity; absent means unauthenticated/basic mode
    pub consumer: Option<Consumer>,

    /// OAuth access token for a user
    pub token: Option<Token>,

    /// Base URL for the API; defaults to [`crate::DEFAULT_BASE_URL`]
    pub base_url: Option<String>,

    /// API version path segment; defaults to
    /// [`crate::DEFAULT_API_VERSION`], `None` omits the segment entirely
    pub api_version: Option<String>,

    /// Per-request timeout; `None` uses the transport default
    pub timeout: Option<Duration>,

    /// Dispatch mode for new requests
    pub mode: DispatchMode,

    /// User agent header value; defaults to [`crate::USER_AGENT`]
    pub user_agent: Option<String>,

    /// Custom headers to include with every request
    pub default_headers: HeaderMap,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            consumer: None,
            token: None,
            base_url: None,
            api_version: Some(crate::DEFAULT_API_VERSION.to_string()),
            timeout: None,
            mode: DispatchMode::Blocking,
            user_agent: None,
            default_headers: HeaderMap::new(),
        }
    }
}

impl ClientConfig {
    /// Create a configuration with a consumer identity.
    pub fn with_consumer(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            consumer: Some(Consumer::new(key, secret)),
            ..Default::default()
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Looks for:
    /// - `FOURSQUARE_CONSUMER_KEY` / `FOURSQUARE_CONSUMER_SECRET`
    /// - `FOURSQUARE_TOKEN` / `FOURSQUARE_TOKEN_SECRET`
    /// - `FOURSQUARE_BASE_URL`
    /// - `FOURSQUARE_API_VERSION`
    /// - `FOURSQUARE_TIMEOUT` (seconds)
    #[cfg(feature = "env")]
    pub fn from_env() -> Self {
        use std::env;

        // Best-effort .env loading; absence is not an error
        let _ = dotenvy::dotenv();

        let mut config = Self::default();

        if let (Ok(key), Ok(secret)) = (
            env::var("FOURSQUARE_CONSUMER_KEY"),
            env::var("FOURSQUARE_CONSUMER_SECRET"),
        ) {
            config.consumer = Some(Consumer::new(key, secret));
        }

        if let (Ok(key), Ok(secret)) = (
            env::var("FOURSQUARE_TOKEN"),
            env::var("FOURSQUARE_TOKEN_SECRET"),
        ) {
            config.token = Some(Token::new(key, secret));
        }

        if let Ok(base_url) = env::var("FOURSQUARE_BASE_URL") {
            config.base_url = Some(base_url);
        }

        if let Ok(api_version) = env::var("FOURSQUARE_API_VERSION") {
            config.api_version = Some(api_version);
        }

        if let Ok(timeout_str) = env::var("FOURSQUARE_TIMEOUT")
            && let Ok(timeout_secs) = timeout_str.parse::<u64>()
        {
            config.timeout = Some(Duration::from_secs(timeout_secs));
        }

        config
    }

    /// Merge this configuration with another, with the other taking
    /// precedence where it sets a value.
    pub fn merge(mut self, other: ClientConfig) -> Self {
        if other.consumer.is_some() {
            self.consumer = other.consumer;
        }
        if other.token.is_some() {
            self.token = other.token;
        }
        if other.base_url.is_some() {
            self.base_url = other.base_url;
        }
        if other.api_version.is_some() {
            self.api_version = other.api_version;
        }
        if other.timeout.is_some() {
            self.timeout = other.timeout;
        }
        if other.mode != DispatchMode::default() {
            self.mode = other.mode;
        }
        if other.user_agent.is_some() {
            self.user_agent = other.user_agent;
        }
        if !other.default_headers.is_empty() {
            for (key, value) in other.default_headers.iter() {
                self.default_headers.insert(key.clone(), value.clone());
            }
        }
        self
    }
}
