//! Recording fakes for the transport and navigation ports.
//!
//! Available to this crate's tests and, with the `test-utils` feature, to
//! downstream test suites.

use std::collections::VecDeque;

use async_trait::async_trait;
use http::StatusCode;
use opsassist_domain::{ApiError, OutgoingRequest, ResponseEnvelope, Result};
use parking_lot::Mutex;
use serde_json::Value;

use crate::navigation_ports::Navigator;
use crate::transport_ports::Transport;

/// Transport that records every request and replays queued outcomes.
///
/// When the queue is empty it answers `200` with a `null` body.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    requests: Mutex<Vec<OutgoingRequest>>,
    outcomes: Mutex<VecDeque<Result<ResponseEnvelope>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response with `status` and JSON `data`.
    #[must_use]
    pub fn respond_with(self, status: u16, data: Value) -> Self {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        self.push_response(ResponseEnvelope::new(status, data));
        self
    }

    /// Queue a transport failure.
    #[must_use]
    pub fn fail_with(self, error: ApiError) -> Self {
        self.outcomes.lock().push_back(Err(error));
        self
    }

    pub fn push_response(&self, response: ResponseEnvelope) {
        self.outcomes.lock().push_back(Ok(response));
    }

    pub fn requests(&self) -> Vec<OutgoingRequest> {
        self.requests.lock().clone()
    }

    pub fn last_request(&self) -> Option<OutgoingRequest> {
        self.requests.lock().last().cloned()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: OutgoingRequest) -> Result<ResponseEnvelope> {
        self.requests.lock().push(request);
        self.outcomes
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(ResponseEnvelope::new(StatusCode::OK, Value::Null)))
    }
}

/// Navigator that records requested paths.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visits: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visits(&self) -> Vec<String> {
        self.visits.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.visits.lock().len()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.visits.lock().push(path.to_string());
    }
}
