//! Pending request handles

use crate::error::{Result, TransportError};
use crate::request::RawResponse;
use tokio::task::JoinHandle;

/// Handle to a request that has already been submitted.
///
/// The I/O runs on the runtime independently of this handle: dropping a
/// `PendingHandle` never cancels the request, it just means nobody observes
/// the result. [`wait`](Self::wait) consumes the handle, so a completed
/// result can only be claimed once.
#[derive(Debug)]
pub struct PendingHandle {
    inner: HandleInner,
}

#[derive(Debug)]
enum HandleInner {
    Spawned(JoinHandle<Result<RawResponse>>),
    Ready(Result<RawResponse>),
}

impl PendingHandle {
    /// Wrap a spawned transport task.
    pub fn spawned(task: JoinHandle<Result<RawResponse>>) -> Self {
        Self {
            inner: HandleInner::Spawned(task),
        }
    }

    /// Create a handle whose result is already available.
    ///
    /// Used for transports that complete eagerly and in tests.
    pub fn ready(result: Result<RawResponse>) -> Self {
        Self {
            inner: HandleInner::Ready(result),
        }
    }

    /// Block until the request completes and return its outcome.
    pub async fn wait(self) -> Result<RawResponse> {
        match self.inner {
            HandleInner::Spawned(task) => task
                .await
                .map_err(|e| TransportError::Canceled(e.to_string()))?,
            HandleInner::Ready(result) => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderMap, StatusCode};

    fn ok_response(body: &str) -> RawResponse {
        RawResponse::new(StatusCode::OK, HeaderMap::new(), body.to_string())
    }

    #[tokio::test]
    async fn ready_handle_yields_stored_result() {
        let handle = PendingHandle::ready(Ok(ok_response("{}")));
        let response = handle.wait().await.unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, "{}");
    }

    #[tokio::test]
    async fn spawned_handle_resolves_task_output() {
        let task = tokio::spawn(async { Ok(ok_response(r#"{"ok":true}"#)) });
        let response = PendingHandle::spawned(task).wait().await.unwrap();
        assert_eq!(response.body, r#"{"ok":true}"#);
    }

    #[tokio::test]
    async fn aborted_task_surfaces_as_canceled() {
        let task: JoinHandle<Result<RawResponse>> = tokio::spawn(async {
            tokio::time::sleep(std::time::Duration::from_secs(30)).await;
            Ok(ok_response("{}"))
        });
        task.abort();

        let err = PendingHandle::spawned(task).wait().await.unwrap_err();
        assert!(matches!(err, TransportError::Canceled(_)));
    }
}
