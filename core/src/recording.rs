//! In-memory transport that replays canned responses.
//!
//! Useful in unit tests: queue the responses a vendor would send, run the
//! connect operation, then inspect the requests it built.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{Transport, TransportError};

enum Reply {
    Response(HttpResponse),
    Fail(fn() -> TransportError),
}

#[derive(Default)]
pub struct RecordingTransport {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport that answers the first request with `status` and `body`.
    pub fn replying(status: u16, body: Value) -> Self {
        let transport = Self::new();
        transport.push(HttpResponse::new(status, body));
        transport
    }

    pub fn push(&self, response: HttpResponse) {
        self.lock_replies().push_back(Reply::Response(response));
    }

    pub fn push_json(&self, status: u16, body: Value) {
        self.push(HttpResponse::new(status, body));
    }

    /// Queue a transport-level failure built by `make`.
    pub fn push_failure(&self, make: fn() -> TransportError) {
        self.lock_replies().push_back(Reply::Fail(make));
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests().pop()
    }

    fn lock_replies(&self) -> std::sync::MutexGuard<'_, VecDeque<Reply>> {
        self.replies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request);
        match self.lock_replies().pop_front() {
            Some(Reply::Response(response)) => Ok(response),
            Some(Reply::Fail(make)) => Err(make()),
            None => Err(TransportError::Connection(
                "recording transport has no queued response".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RequestBuilder;
    use serde_json::json;

    #[tokio::test]
    async fn replays_in_order_and_records_requests() {
        let transport = RecordingTransport::new();
        transport.push_json(200, json!({"n": 1}));
        transport.push_json(500, json!({"n": 2}));

        let req = RequestBuilder::get("http://vendor.test", "/a").build();
        let first = transport.execute(req.clone()).await.unwrap();
        let second = transport.execute(req).await.unwrap();

        assert_eq!(first.body, json!({"n": 1}));
        assert_eq!(second.status, 500);
        assert_eq!(transport.requests().len(), 2);
        assert_eq!(transport.last_request().unwrap().endpoint(), "/a");
    }

    #[tokio::test]
    async fn empty_queue_is_a_connection_failure() {
        let transport = RecordingTransport::new();
        let req = RequestBuilder::get("http://vendor.test", "/a").build();
        let err = transport.execute(req).await.unwrap_err();
        assert!(matches!(err, TransportError::Connection(_)));
    }

    #[tokio::test]
    async fn queued_failure_is_returned() {
        let transport = RecordingTransport::new();
        transport.push_failure(|| TransportError::Timeout);
        let req = RequestBuilder::get("http://vendor.test", "/a").build();
        assert!(matches!(
            transport.execute(req).await,
            Err(TransportError::Timeout)
        ));
    }
}
