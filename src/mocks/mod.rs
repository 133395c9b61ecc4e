//! Mock implementations for testing.
//!
//! A scripted transport and a pinned clock, so pipeline behavior can be
//! exercised without a network or real time.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use reqwest::StatusCode;
use serde::Serialize;

use crate::errors::TransportError;
use crate::time::Clock;
use crate::transport::{FormRequest, HttpResponse, HttpTransport};

/// Scripted response configuration
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub body: String,
}

impl MockResponse {
    /// A 200 response with a raw body.
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    /// A response with the given status and raw body.
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// A 200 response with a JSON body.
    pub fn json<T: Serialize>(data: &T) -> Self {
        Self {
            status: 200,
            body: serde_json::to_string(data).unwrap(),
        }
    }
}

/// Scripted outcome of one transport send
#[derive(Debug, Clone)]
pub enum MockOutcome {
    /// Deliver a response
    Response(MockResponse),
    /// Fail with a timeout before any response arrives
    Timeout,
    /// Fail with a connection-level error
    Unreachable(String),
}

/// Mock transport: scripted outcomes consumed in order, requests recorded
/// for verification.
pub struct MockTransport {
    outcomes: Arc<Mutex<VecDeque<MockOutcome>>>,
    requests: Arc<Mutex<Vec<FormRequest>>>,
    default_response: Option<MockResponse>,
}

impl MockTransport {
    /// Create a transport with an empty script.
    pub fn new() -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            default_response: None,
        }
    }

    /// Queue a response.
    pub fn add_response(self, response: MockResponse) -> Self {
        self.outcomes.lock().push_back(MockOutcome::Response(response));
        self
    }

    /// Queue several responses.
    pub fn add_responses(self, responses: impl IntoIterator<Item = MockResponse>) -> Self {
        {
            let mut queue = self.outcomes.lock();
            for response in responses {
                queue.push_back(MockOutcome::Response(response));
            }
        }
        self
    }

    /// Queue a transport-level timeout.
    pub fn add_timeout(self) -> Self {
        self.outcomes.lock().push_back(MockOutcome::Timeout);
        self
    }

    /// Queue a connection-level failure.
    pub fn add_unreachable(self, reason: impl Into<String>) -> Self {
        self.outcomes
            .lock()
            .push_back(MockOutcome::Unreachable(reason.into()));
        self
    }

    /// Respond with this whenever the script runs out.
    pub fn with_default_response(mut self, response: MockResponse) -> Self {
        self.default_response = Some(response);
        self
    }

    /// Every request sent so far, in order.
    pub fn requests(&self) -> Vec<FormRequest> {
        self.requests.lock().clone()
    }

    /// Number of requests sent so far.
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Requests whose URL path ends with `path`.
    pub fn requests_to(&self, path: &str) -> Vec<FormRequest> {
        self.requests
            .lock()
            .iter()
            .filter(|request| request.url.path().ends_with(path))
            .cloned()
            .collect()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send_form(&self, request: &FormRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().push(request.clone());

        let outcome = self
            .outcomes
            .lock()
            .pop_front()
            .or_else(|| self.default_response.clone().map(MockOutcome::Response))
            .unwrap_or_else(|| MockOutcome::Unreachable("mock script exhausted".to_string()));

        match outcome {
            MockOutcome::Response(response) => Ok(HttpResponse {
                status: StatusCode::from_u16(response.status)
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                url: request.url.to_string(),
                body: Bytes::from(response.body),
                elapsed: Duration::from_millis(1),
            }),
            MockOutcome::Timeout => Err(TransportError::Timeout),
            MockOutcome::Unreachable(reason) => Err(TransportError::Unreachable(reason)),
        }
    }
}

/// Clock pinned to a settable instant
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    /// Pin the clock to the given instant.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Pin the clock to an epoch-seconds instant.
    pub fn at_epoch(secs: i64) -> Self {
        Self::new(DateTime::from_timestamp(secs, 0).unwrap_or_default())
    }

    /// Move the clock forward.
    pub fn advance(&self, delta: chrono::Duration) {
        let mut now = self.now.lock();
        *now += delta;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}
