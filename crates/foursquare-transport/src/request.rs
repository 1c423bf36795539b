//! Request and response value types exchanged with a [`Transport`]
//!
//! [`Transport`]: crate::Transport

use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use secrecy::SecretString;
use std::time::Duration;
use url::Url;

/// A fully-prepared request, ready to be submitted to a transport.
///
/// The URL already carries any query string; the caller is responsible for
/// signing and parameter encoding decisions. The transport only executes.
#[derive(Debug)]
pub struct TransportRequest {
    /// HTTP method
    pub method: Method,

    /// Complete request URL, query string included
    pub url: Url,

    /// Request headers
    pub headers: HeaderMap,

    /// Request body, if any
    pub body: Option<RequestBody>,

    /// HTTP Basic credentials to attach, if any
    pub basic: Option<BasicCredentials>,

    /// Per-request timeout; `None` falls back to the transport default
    pub timeout: Option<Duration>,
}

impl TransportRequest {
    /// Create a new request with no headers, body, or credentials.
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
            basic: None,
            timeout: None,
        }
    }

    /// Replace the request headers.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Set the request body.
    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Attach HTTP Basic credentials.
    pub fn with_basic(mut self, basic: BasicCredentials) -> Self {
        self.basic = Some(basic);
        self
    }

    /// Set a per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Request body encodings supported by the transport.
#[derive(Debug)]
pub enum RequestBody {
    /// `application/x-www-form-urlencoded` key/value pairs
    Form(Vec<(String, String)>),

    /// `multipart/form-data` fields, used when any parameter carries file
    /// content
    Multipart(Vec<MultipartField>),
}

/// One field of a multipart body.
#[derive(Debug, Clone)]
pub enum MultipartField {
    /// A scalar text field
    Text {
        /// Field name
        name: String,
        /// Field value
        value: String,
    },

    /// A file-content field
    File {
        /// Field name
        name: String,
        /// File name reported to the server
        file_name: String,
        /// MIME type of the content
        content_type: String,
        /// File content
        bytes: Bytes,
    },
}

/// Username/password pair for HTTP Basic authentication.
#[derive(Debug, Clone)]
pub struct BasicCredentials {
    /// Basic auth username
    pub username: String,
    /// Basic auth password
    pub password: SecretString,
}

impl BasicCredentials {
    /// Create a new credential pair.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::new(password.into().into_boxed_str()),
        }
    }
}

/// A completed response: status, headers, and the body as text.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code
    pub status: StatusCode,

    /// Response headers
    pub headers: HeaderMap,

    /// Response body text
    pub body: String,
}

impl RawResponse {
    /// Create a response from its parts.
    pub fn new(status: StatusCode, headers: HeaderMap, body: String) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Whether the status code is in the `[200, 400)` success window.
    pub fn is_success(&self) -> bool {
        let code = self.status.as_u16();
        (200..400).contains(&code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn request_builder_chain() {
        let url = Url::parse("https://api.example.com/user.json").unwrap();
        let request = TransportRequest::new(Method::POST, url)
            .with_body(RequestBody::Form(vec![("shout".into(), "hi".into())]))
            .with_basic(BasicCredentials::new("jmathai", "hunter2"))
            .with_timeout(Duration::from_secs(5));

        assert_eq!(request.method, Method::POST);
        assert!(matches!(request.body, Some(RequestBody::Form(_))));
        let basic = request.basic.unwrap();
        assert_eq!(basic.username, "jmathai");
        assert_eq!(basic.password.expose_secret(), "hunter2");
        assert_eq!(request.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn success_window_is_200_to_399() {
        let ok = |code: u16| {
            RawResponse::new(
                StatusCode::from_u16(code).unwrap(),
                HeaderMap::new(),
                String::new(),
            )
            .is_success()
        };

        assert!(ok(200));
        assert!(ok(302));
        assert!(ok(399));
        assert!(!ok(199));
        assert!(!ok(400));
        assert!(!ok(500));
    }
}
