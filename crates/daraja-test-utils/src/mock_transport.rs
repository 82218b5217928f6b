//! Mock implementation of the `Transport` trait for testing.
//!
//! Records every request and answers from a queue. When the queue is empty,
//! token requests get a valid token and everything else gets the gateway's
//! generic "accepted" response.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use daraja::{DarajaError, DarajaResult, HttpMethod, HttpRequest, HttpResponse, Transport};

use crate::fixtures::{accepted_response, token_response};

#[derive(Default)]
struct MockTransportInner {
    /// Every request sent, in order.
    requests: Vec<HttpRequest>,
    /// Responses returned before falling back to defaults.
    responses: VecDeque<HttpResponse>,
    /// When true, every send fails with a transport error.
    should_fail: bool,
}

/// A recording mock transport.
///
/// Cheap to clone; all clones share the same state.
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

impl MockTransport {
    /// Create a mock with no queued responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response.
    pub fn with_response(self, response: HttpResponse) -> Self {
        self.push_response(response);
        self
    }

    /// Configure the mock to fail every request.
    pub fn with_failure(self) -> Self {
        self.set_should_fail(true);
        self
    }

    /// Queue a response at runtime.
    pub fn push_response(&self, response: HttpResponse) {
        self.inner.lock().unwrap().responses.push_back(response);
    }

    /// Set the failure mode at runtime.
    pub fn set_should_fail(&self, should_fail: bool) {
        self.inner.lock().unwrap().should_fail = should_fail;
    }

    // =========================================================================
    // Assertion Helpers
    // =========================================================================

    /// Every request sent so far.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.inner.lock().unwrap().requests.clone()
    }

    /// Token GETs sent so far.
    pub fn token_requests(&self) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == HttpMethod::Get)
            .collect()
    }

    /// API POSTs sent so far.
    pub fn api_requests(&self) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == HttpMethod::Post)
            .collect()
    }

    /// The most recent request.
    pub fn last_request(&self) -> Option<HttpRequest> {
        self.inner.lock().unwrap().requests.last().cloned()
    }

    /// The body of the most recent API POST.
    pub fn last_body(&self) -> Option<serde_json::Value> {
        self.api_requests().pop().and_then(|r| r.body)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> DarajaResult<HttpResponse> {
        let mut inner = self.inner.lock().unwrap();
        let method = request.method;
        inner.requests.push(request);

        if inner.should_fail {
            return Err(DarajaError::transport("mock transport failure"));
        }

        Ok(inner.responses.pop_front().unwrap_or_else(|| match method {
            HttpMethod::Get => token_response(),
            HttpMethod::Post => accepted_response(),
        }))
    }
}
