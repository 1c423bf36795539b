//! Main client implementation: dispatching resolved requests

use std::sync::Arc;
use std::time::Duration;

use crate::auth::{OAuthSigner, Token};
use crate::config::{ClientConfig, DispatchMode};
use crate::endpoint::{ResolvedRequest, SymbolicCall};
use crate::error::{Error, Result};
use crate::params::Params;
use crate::response::LazyResponse;
use crate::{DEFAULT_BASE_URL, USER_AGENT};
use foursquare_transport::{
    BasicCredentials, HttpTransport, RequestBody, Transport, TransportRequest,
};
use http::{HeaderMap, HeaderValue, Method, header};
use tracing::debug;
use url::Url;

/// Client for the Foursquare REST API.
///
/// Cheap to clone; all clones share the same transport and configuration.
///
/// Two calling surfaces exist. Symbolic calls derive the verb and path from
/// a method-like name:
///
/// ```rust,no_run
/// use foursquare::{Client, Params, SymbolicCall};
///
/// # async fn example() -> foursquare::Result<()> {
/// let client = Client::builder().build()?;
/// let checkins = client
///     .call(SymbolicCall::new("getUserCheckins").params(Params::new().text("l", "10")))
///     .await?;
/// println!("{}", checkins.len().await?);
/// # Ok(())
/// # }
/// ```
///
/// The fixed shorthands `get`/`post`/`delete` take an explicit endpoint path
/// instead.
#[derive(Debug, Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    signer: Option<Arc<dyn OAuthSigner>>,
}

impl Client {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Invoke a symbolic call.
    ///
    /// The call name is resolved into a verb and endpoint path, then
    /// dispatched. Resolution errors (`UnsupportedVerb`,
    /// `MalformedEndpoint`) fail here, before any network I/O; HTTP-level
    /// failures are deferred to the returned [`LazyResponse`].
    pub async fn call(&self, call: SymbolicCall) -> Result<LazyResponse> {
        let resolved = call.resolve(self.inner.config.consumer.is_some())?;
        self.dispatch(resolved).await
    }

    /// GET an explicit endpoint path, e.g. `/user.json`.
    pub async fn get(&self, endpoint: &str, params: Option<Params>) -> Result<LazyResponse> {
        self.dispatch(self.shorthand(Method::GET, endpoint, params, None))
            .await
    }

    /// POST to an explicit endpoint path.
    pub async fn post(&self, endpoint: &str, params: Option<Params>) -> Result<LazyResponse> {
        self.dispatch(self.shorthand(Method::POST, endpoint, params, None))
            .await
    }

    /// DELETE an explicit endpoint path.
    pub async fn delete(&self, endpoint: &str, params: Option<Params>) -> Result<LazyResponse> {
        self.dispatch(self.shorthand(Method::DELETE, endpoint, params, None))
            .await
    }

    /// GET with HTTP Basic credentials, bypassing OAuth.
    pub async fn get_basic(
        &self,
        endpoint: &str,
        params: Option<Params>,
        username: &str,
        password: &str,
    ) -> Result<LazyResponse> {
        let basic = credentials(username, password);
        self.dispatch_basic(self.shorthand(Method::GET, endpoint, params, basic))
            .await
    }

    /// POST with HTTP Basic credentials, bypassing OAuth.
    pub async fn post_basic(
        &self,
        endpoint: &str,
        params: Option<Params>,
        username: &str,
        password: &str,
    ) -> Result<LazyResponse> {
        let basic = credentials(username, password);
        self.dispatch_basic(self.shorthand(Method::POST, endpoint, params, basic))
            .await
    }

    /// DELETE with HTTP Basic credentials, bypassing OAuth.
    pub async fn delete_basic(
        &self,
        endpoint: &str,
        params: Option<Params>,
        username: &str,
        password: &str,
    ) -> Result<LazyResponse> {
        let basic = credentials(username, password);
        self.dispatch_basic(self.shorthand(Method::DELETE, endpoint, params, basic))
            .await
    }

    fn shorthand(
        &self,
        method: Method,
        endpoint: &str,
        params: Option<Params>,
        basic: Option<BasicCredentials>,
    ) -> ResolvedRequest {
        ResolvedRequest {
            method,
            path: endpoint.to_string(),
            params,
            basic,
        }
    }

    /// Route a resolved request to the OAuth or basic branch.
    async fn dispatch(&self, resolved: ResolvedRequest) -> Result<LazyResponse> {
        if self.inner.config.consumer.is_some() {
            self.dispatch_oauth(resolved).await
        } else {
            self.dispatch_basic(resolved).await
        }
    }

    /// OAuth-signed dispatch: the signer produces the final URL and headers.
    async fn dispatch_oauth(&self, resolved: ResolvedRequest) -> Result<LazyResponse> {
        let url = self.api_url(&resolved.path)?;
        let consumer = self
            .inner
            .config
            .consumer
            .as_ref()
            .ok_or_else(|| Error::MissingConfig("consumer key".to_string()))?;
        let signer = self
            .inner
            .signer
            .as_ref()
            .ok_or_else(|| Error::MissingConfig("OAuth signer".to_string()))?;

        let empty = Params::new();
        let params = resolved.params.as_ref().unwrap_or(&empty);
        let signed = signer.sign(
            &resolved.method,
            &url,
            params,
            consumer,
            self.inner.config.token.as_ref(),
        )?;

        let mut headers = self.base_headers();
        headers.extend(signed.headers);

        let mut request =
            TransportRequest::new(resolved.method.clone(), signed.url).with_headers(headers);
        // GET parameters travel in the signed URL; anything else keeps them
        // in the body
        if resolved.method != Method::GET
            && let Some(params) = &resolved.params
            && !params.is_empty()
        {
            request = request.with_body(body_for(params));
        }

        debug!(method = %request.method, url = %request.url, auth = "oauth", "dispatching");
        self.submit(request).await
    }

    /// Basic/unauthenticated dispatch: GET parameters become the query
    /// string, POST parameters the body.
    async fn dispatch_basic(&self, resolved: ResolvedRequest) -> Result<LazyResponse> {
        let mut url = self.api_url(&resolved.path)?;

        let mut request_body = None;
        if let Some(params) = &resolved.params
            && !params.is_empty()
        {
            if resolved.method == Method::GET {
                if params.is_multipart() {
                    return Err(Error::InvalidRequest(
                        "file parameters cannot be encoded in a query string".to_string(),
                    ));
                }
                url.set_query(Some(&params.to_query_string()));
            } else if resolved.method == Method::POST {
                request_body = Some(body_for(params));
            }
        }

        let mut request = TransportRequest::new(resolved.method.clone(), url)
            .with_headers(self.base_headers());
        if let Some(body) = request_body {
            request = request.with_body(body);
        }
        if let Some(basic) = resolved.basic {
            request = request.with_basic(basic);
        }

        debug!(method = %request.method, url = %request.url, auth = "basic", "dispatching");
        self.submit(request).await
    }

    /// Hand the request to the transport; in blocking mode, wait for it.
    async fn submit(&self, mut request: TransportRequest) -> Result<LazyResponse> {
        if let Some(timeout) = self.inner.config.timeout {
            request = request.with_timeout(timeout);
        }
        let handle = self.inner.transport.submit(request).await;
        match self.inner.config.mode {
            DispatchMode::Concurrent => Ok(LazyResponse::pending(handle)),
            DispatchMode::Blocking => Ok(LazyResponse::from_outcome(handle.wait().await)),
        }
    }

    /// Build the full API URL: base, optional version segment, endpoint.
    fn api_url(&self, endpoint: &str) -> Result<Url> {
        let base = self
            .inner
            .config
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/');

        let full = match self.inner.config.api_version.as_deref() {
            Some(version) if !version.is_empty() => format!("{base}/{version}{endpoint}"),
            _ => format!("{base}{endpoint}"),
        };

        Url::parse(&full).map_err(|e| Error::InvalidUrl(format!("{full}: {e}")))
    }

    fn base_headers(&self) -> HeaderMap {
        let mut headers = self.inner.config.default_headers.clone();
        if !headers.contains_key(header::USER_AGENT) {
            let agent = self
                .inner
                .config
                .user_agent
                .as_deref()
                .unwrap_or(USER_AGENT);
            if let Ok(value) = HeaderValue::from_str(agent) {
                headers.insert(header::USER_AGENT, value);
            }
        }
        headers
    }
}

fn credentials(username: &str, password: &str) -> Option<BasicCredentials> {
    if username.is_empty() || password.is_empty() {
        None
    } else {
        Some(BasicCredentials::new(username, password))
    }
}

fn body_for(params: &Params) -> RequestBody {
    if params.is_multipart() {
        RequestBody::Multipart(params.to_multipart_fields())
    } else {
        RequestBody::Form(params.to_form_pairs())
    }
}

/// Builder for a configured [`Client`].
#[derive(Default)]
pub struct ClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    signer: Option<Arc<dyn OAuthSigner>>,
}

impl ClientBuilder {
    /// Set the OAuth consumer identity.
    pub fn consumer(mut self, key: impl Into<String>, secret: impl Into<String>) -> Self {
        self.config.consumer = Some(crate::auth::Consumer::new(key, secret));
        self
    }

    /// Set the OAuth access token.
    pub fn token(mut self, key: impl Into<String>, secret: impl Into<String>) -> Self {
        self.config.token = Some(Token::new(key, secret));
        self
    }

    /// Set the base URL for the API.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = Some(base_url.into());
        self
    }

    /// Set the API version path segment.
    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.config.api_version = Some(api_version.into());
        self
    }

    /// Omit the API version segment from request URLs.
    pub fn no_api_version(mut self) -> Self {
        self.config.api_version = None;
        self
    }

    /// Set the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Dispatch requests concurrently: responses stay in flight until first
    /// access instead of completing at dispatch time.
    pub fn concurrent(mut self) -> Self {
        self.config.mode = DispatchMode::Concurrent;
        self
    }

    /// Set the dispatch mode explicitly.
    pub fn mode(mut self, mode: DispatchMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Set the user-agent header value.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(user_agent.into());
        self
    }

    /// Add a header sent with every request.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self> {
        let key_str = key.into();
        let value_str = value.into();

        let key: http::HeaderName = key_str
            .parse()
            .map_err(|_| Error::InvalidRequest(format!("invalid header name `{key_str}`")))?;
        let value: HeaderValue = value_str
            .parse()
            .map_err(|_| Error::InvalidRequest(format!("invalid header value `{value_str}`")))?;

        self.config.default_headers.insert(key, value);
        Ok(self)
    }

    /// Use a prepared configuration, replacing any builder settings made so
    /// far.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a custom transport instead of the default HTTP transport.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Set the OAuth signer. Required when a consumer key is configured.
    pub fn signer(mut self, signer: Arc<dyn OAuthSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid, if a consumer key is
    /// configured without an OAuth signer, or if the default transport
    /// cannot be constructed.
    pub fn build(self) -> Result<Client> {
        let base = self
            .config
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL);
        let parsed = Url::parse(base).map_err(|e| Error::InvalidUrl(format!("{base}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::InvalidUrl(format!(
                "{base}: scheme must be http or https"
            )));
        }

        if self.config.consumer.is_some() && self.signer.is_none() {
            return Err(Error::MissingConfig(
                "an OAuth signer is required when a consumer key is configured".to_string(),
            ));
        }

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new()?),
        };

        Ok(Client {
            inner: Arc::new(ClientInner {
                config: self.config,
                transport,
                signer: self.signer,
            }),
        })
    }
}
