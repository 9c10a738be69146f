//! Scripted transport for unit tests.

use crate::transport::{HttpRequest, HttpResponse, HttpTransport};
use async_trait::async_trait;
use htap_common::{HtapError, Result};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Replays one canned outcome and records every request it sees.
pub struct MockTransport {
    outcome: Result<HttpResponse>,
    calls: AtomicUsize,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn responding(status: u16, body: impl Into<String>) -> Self {
        Self::with_outcome(Ok(HttpResponse::new(status, body)))
    }

    pub fn failing(message: &str) -> Self {
        Self::with_outcome(Err(HtapError::Transport(message.to_string())))
    }

    fn with_outcome(outcome: Result<HttpResponse>) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock().last().cloned()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn post_json(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request);
        self.outcome.clone()
    }
}
