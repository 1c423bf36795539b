//! Lazy response resolution
//!
//! A [`LazyResponse`] wraps a [`PendingHandle`] and defers everything about
//! the response until a field is actually read. The first access waits for
//! the transport, classifies the status code, and decodes the body; the
//! outcome is latched, so every later access returns cached values and the
//! transport is awaited at most once per response even under concurrent
//! readers.
//!
//! Three accessors are whitelisted and never classify: [`status`],
//! [`headers`], and [`text`]. They stay readable on an errored response so a
//! caller can inspect failure detail; any other accessor on such a response
//! returns the classified [`ApiError`].
//!
//! The underlying request is drained even if the response is dropped
//! unobserved: transport work is spawned onto the runtime at dispatch time
//! and runs to completion regardless of this handle.
//!
//! [`status`]: LazyResponse::status
//! [`headers`]: LazyResponse::headers
//! [`text`]: LazyResponse::text

use crate::error::{ApiError, Error, Result};
use foursquare_transport::{PendingHandle, RawResponse, TransportError};
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;
use tracing::trace;

/// A response whose network completion and decoding happen on first access.
#[derive(Debug)]
pub struct LazyResponse {
    handle: Mutex<Option<PendingHandle>>,
    state: OnceCell<Resolved>,
}

#[derive(Debug)]
enum Resolved {
    Completed {
        status: StatusCode,
        headers: HeaderMap,
        body: String,
        /// `None` when the status fell outside the success window and the
        /// body was never decoded
        decoded: Option<std::result::Result<Value, Arc<serde_json::Error>>>,
    },
    Failed(Arc<TransportError>),
}

impl Resolved {
    fn from_raw(raw: RawResponse) -> Self {
        let decoded = raw
            .is_success()
            .then(|| serde_json::from_str(&raw.body).map_err(Arc::new));
        Self::Completed {
            status: raw.status,
            headers: raw.headers,
            body: raw.body,
            decoded,
        }
    }
}

impl LazyResponse {
    /// Wrap an in-flight handle.
    pub(crate) fn pending(handle: PendingHandle) -> Self {
        Self {
            handle: Mutex::new(Some(handle)),
            state: OnceCell::new(),
        }
    }

    /// Wrap a transport outcome that is already available (blocking
    /// dispatch mode).
    pub(crate) fn from_outcome(
        outcome: std::result::Result<RawResponse, TransportError>,
    ) -> Self {
        let resolved = match outcome {
            Ok(raw) => Resolved::from_raw(raw),
            Err(e) => Resolved::Failed(Arc::new(e)),
        };
        Self {
            handle: Mutex::new(None),
            state: OnceCell::new_with(Some(resolved)),
        }
    }

    /// Resolve once; all later calls return the latched state.
    async fn resolved(&self) -> &Resolved {
        self.state
            .get_or_init(|| async {
                let handle = {
                    let mut slot = self.handle.lock().unwrap_or_else(|e| e.into_inner());
                    slot.take()
                };
                let outcome = match handle {
                    Some(handle) => handle.wait().await,
                    // The latch guarantees the initializer runs once, so the
                    // handle is always present here.
                    None => Err(TransportError::Other(
                        "response handle already claimed".to_string(),
                    )),
                };
                match outcome {
                    Ok(raw) => {
                        trace!(status = raw.status.as_u16(), "response resolved");
                        Resolved::from_raw(raw)
                    }
                    Err(e) => Resolved::Failed(Arc::new(e)),
                }
            })
            .await
    }

    /// Success-window classification applied to the latched state.
    async fn classified(&self) -> Result<&Value> {
        match self.resolved().await {
            Resolved::Failed(e) => Err(Error::Transport(e.clone())),
            Resolved::Completed {
                status,
                body,
                decoded,
                ..
            } => match decoded {
                None => Err(ApiError::classify(status.as_u16(), body).into()),
                Some(Ok(value)) => Ok(value),
                Some(Err(e)) => Err(Error::Decode(e.clone())),
            },
        }
    }

    /// The HTTP status code. Whitelisted: never raises a classified error.
    pub async fn status(&self) -> Result<StatusCode> {
        match self.resolved().await {
            Resolved::Completed { status, .. } => Ok(*status),
            Resolved::Failed(e) => Err(Error::Transport(e.clone())),
        }
    }

    /// The response headers. Whitelisted: never raises a classified error.
    pub async fn headers(&self) -> Result<&HeaderMap> {
        match self.resolved().await {
            Resolved::Completed { headers, .. } => Ok(headers),
            Resolved::Failed(e) => Err(Error::Transport(e.clone())),
        }
    }

    /// The raw body text. Whitelisted: never raises a classified error.
    pub async fn text(&self) -> Result<&str> {
        match self.resolved().await {
            Resolved::Completed { body, .. } => Ok(body),
            Resolved::Failed(e) => Err(Error::Transport(e.clone())),
        }
    }

    /// The decoded JSON document.
    pub async fn value(&self) -> Result<&Value> {
        self.classified().await
    }

    /// Look up a top-level key in the decoded document.
    pub async fn get(&self, key: &str) -> Result<Option<&Value>> {
        Ok(self.classified().await?.get(key))
    }

    /// Whether a top-level key exists in the decoded document.
    pub async fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.classified().await?.get(key).is_some())
    }

    /// Number of top-level entries: object keys, array elements, zero for
    /// `null`, one for any other scalar.
    pub async fn len(&self) -> Result<usize> {
        Ok(match self.classified().await? {
            Value::Object(map) => map.len(),
            Value::Array(items) => items.len(),
            Value::Null => 0,
            _ => 1,
        })
    }

    /// Whether the decoded document has no top-level entries.
    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    /// Iterate over the top-level entries of a decoded object in document
    /// order. Non-object documents yield nothing.
    pub async fn entries(&self) -> Result<impl Iterator<Item = (&str, &Value)>> {
        let value = self.classified().await?;
        let iter: Box<dyn Iterator<Item = (&str, &Value)> + Send + '_> = match value {
            Value::Object(map) => Box::new(map.iter().map(|(k, v)| (k.as_str(), v))),
            _ => Box::new(std::iter::empty()),
        };
        Ok(iter)
    }

    /// Decode the body into a typed value.
    ///
    /// This is the property-style view of the response: deserialize the
    /// retained raw body into any `Deserialize` type instead of walking the
    /// generic document.
    pub async fn parse<T: DeserializeOwned>(&self) -> Result<T> {
        self.classified().await?;
        match self.resolved().await {
            Resolved::Completed { body, .. } => Ok(serde_json::from_str(body)?),
            Resolved::Failed(e) => Err(Error::Transport(e.clone())),
        }
    }

    /// Mutable access to the decoded document.
    ///
    /// The response surface is read-only through shared references; edits
    /// (inserting or removing keys) require exclusive ownership of the
    /// response.
    pub async fn value_mut(&mut self) -> Result<&mut Value> {
        let _ = self.resolved().await;
        match self.state.get_mut() {
            Some(Resolved::Completed {
                status,
                body,
                decoded,
                ..
            }) => match decoded {
                None => Err(ApiError::classify(status.as_u16(), body).into()),
                Some(Ok(value)) => Ok(value),
                Some(Err(e)) => Err(Error::Decode(e.clone())),
            },
            Some(Resolved::Failed(e)) => Err(Error::Transport(e.clone())),
            None => Err(Error::Transport(Arc::new(TransportError::Other(
                "response state missing after resolution".to_string(),
            )))),
        }
    }

    /// Consume the response and take ownership of the decoded document.
    pub async fn into_value(self) -> Result<Value> {
        let _ = self.resolved().await;
        match self.state.into_inner() {
            Some(Resolved::Completed {
                status,
                body,
                decoded,
                ..
            }) => match decoded {
                None => Err(ApiError::classify(status.as_u16(), &body).into()),
                Some(Ok(value)) => Ok(value),
                Some(Err(e)) => Err(Error::Decode(e)),
            },
            Some(Resolved::Failed(e)) => Err(Error::Transport(e)),
            None => Err(Error::Transport(Arc::new(TransportError::Other(
                "response state missing after resolution".to_string(),
            )))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiErrorKind;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn raw(status: u16, body: &str) -> RawResponse {
        RawResponse::new(
            StatusCode::from_u16(status).unwrap(),
            HeaderMap::new(),
            body.to_string(),
        )
    }

    fn response(status: u16, body: &str) -> LazyResponse {
        LazyResponse::pending(PendingHandle::ready(Ok(raw(status, body))))
    }

    #[tokio::test]
    async fn success_body_is_decoded_once_accessed() {
        let response = response(200, r#"{"id":"42","name":"jmathai"}"#);
        assert_eq!(response.status().await.unwrap(), StatusCode::OK);
        assert_eq!(
            response.get("id").await.unwrap(),
            Some(&Value::String("42".into()))
        );
        assert!(response.contains("name").await.unwrap());
        assert!(!response.contains("missing").await.unwrap());
    }

    #[tokio::test]
    async fn resolution_waits_for_transport_exactly_once() {
        let waits = Arc::new(AtomicUsize::new(0));
        let counter = waits.clone();
        let task = tokio::spawn(async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(raw(200, r#"{"a":1}"#))
        });
        let response = LazyResponse::pending(PendingHandle::spawned(task));

        let first = response.value().await.unwrap().clone();
        let second = response.value().await.unwrap().clone();
        let _ = response.status().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(waits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_readers_share_one_resolution() {
        let waits = Arc::new(AtomicUsize::new(0));
        let counter = waits.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(raw(200, r#"{"a":1}"#))
        });
        let response = Arc::new(LazyResponse::pending(PendingHandle::spawned(task)));

        let mut readers = Vec::new();
        for _ in 0..8 {
            let response = response.clone();
            readers.push(tokio::spawn(async move {
                response.value().await.unwrap().clone()
            }));
        }
        for reader in readers {
            assert_eq!(reader.await.unwrap(), serde_json::json!({"a": 1}));
        }
        assert_eq!(waits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn whitelisted_fields_survive_an_error_status() {
        let response = response(404, r#"{"error":"no such venue"}"#);

        // Raw fields never classify
        assert_eq!(response.status().await.unwrap(), StatusCode::NOT_FOUND);
        assert!(response.headers().await.is_ok());
        assert_eq!(response.text().await.unwrap(), r#"{"error":"no such venue"}"#);

        // Anything else raises the classified error with status preserved
        let err = response.value().await.unwrap_err();
        match err {
            Error::Api(api) => {
                assert_eq!(api.kind, ApiErrorKind::NotFound);
                assert_eq!(api.status, 404);
                assert!(api.message.contains("no such venue"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }

        // And the whitelist still works afterwards
        assert_eq!(response.status().await.unwrap(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn each_error_status_maps_to_its_kind() {
        for (status, kind) in [
            (400, ApiErrorKind::BadRequest),
            (401, ApiErrorKind::NotAuthorized),
            (403, ApiErrorKind::Forbidden),
            (404, ApiErrorKind::NotFound),
            (500, ApiErrorKind::Generic),
        ] {
            let response = response(status, "{}");
            match response.value().await.unwrap_err() {
                Error::Api(api) => assert_eq!(api.kind, kind, "status {status}"),
                other => panic!("expected Api error, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn malformed_body_on_success_is_a_decode_error() {
        let response = response(200, "<html>not json</html>");
        assert!(matches!(
            response.value().await.unwrap_err(),
            Error::Decode(_)
        ));
        // The raw text stays accessible regardless
        assert_eq!(response.text().await.unwrap(), "<html>not json</html>");
    }

    #[tokio::test]
    async fn count_iterate_index_are_consistent() {
        let response = response(200, r#"{"a":1,"b":2}"#);

        assert_eq!(response.len().await.unwrap(), 2);
        assert!(!response.is_empty().await.unwrap());

        let entries: Vec<(String, Value)> = response
            .entries()
            .await
            .unwrap()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        assert_eq!(
            entries,
            vec![
                ("a".to_string(), Value::from(1)),
                ("b".to_string(), Value::from(2)),
            ]
        );

        assert_eq!(response.get("a").await.unwrap(), Some(&Value::from(1)));
    }

    #[tokio::test]
    async fn array_and_scalar_counts_follow_document_shape() {
        assert_eq!(response(200, "[1,2,3]").len().await.unwrap(), 3);
        assert_eq!(response(200, "null").len().await.unwrap(), 0);
        assert_eq!(response(200, "\"ok\"").len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn parse_gives_a_typed_view() {
        #[derive(serde::Deserialize)]
        struct User {
            id: String,
            name: String,
        }

        let response = response(200, r#"{"id":"42","name":"jmathai"}"#);
        let user: User = response.parse().await.unwrap();
        assert_eq!(user.id, "42");
        assert_eq!(user.name, "jmathai");
    }

    #[tokio::test]
    async fn transport_failure_surfaces_on_every_access() {
        let response = LazyResponse::pending(PendingHandle::ready(Err(
            TransportError::Connection("refused".into()),
        )));

        assert!(matches!(
            response.status().await.unwrap_err(),
            Error::Transport(_)
        ));
        // Memoized: the same failure again, no second wait
        assert!(matches!(
            response.value().await.unwrap_err(),
            Error::Transport(_)
        ));
    }

    #[tokio::test]
    async fn value_mut_allows_insert_and_remove() {
        let mut response = response(200, r#"{"a":1}"#);
        {
            let value = response.value_mut().await.unwrap();
            let map = value.as_object_mut().unwrap();
            map.insert("b".to_string(), Value::from(2));
            map.remove("a");
        }
        assert_eq!(response.get("b").await.unwrap(), Some(&Value::from(2)));
        assert!(!response.contains("a").await.unwrap());
    }

    #[tokio::test]
    async fn into_value_takes_ownership() {
        let response = response(200, r#"{"a":1}"#);
        let value = response.into_value().await.unwrap();
        assert_eq!(value, serde_json::json!({"a": 1}));
    }

    #[tokio::test]
    async fn from_outcome_is_already_resolved() {
        let response = LazyResponse::from_outcome(Ok(raw(200, r#"{"a":1}"#)));
        assert_eq!(response.status().await.unwrap(), StatusCode::OK);
        assert_eq!(response.get("a").await.unwrap(), Some(&Value::from(1)));
    }
}
