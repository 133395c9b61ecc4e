//! Error types for the Netatmo client.
//!
//! Every failure a logical call can produce is classified into exactly one
//! [`NetatmoError`] variant, and retryability is a pure function of that
//! variant. HTTP-derived variants carry redacted snapshots of the exchange
//! so callers can diagnose failures without credentials leaking into logs.

use std::time::Duration;

use thiserror::Error;

/// Result type for Netatmo operations
pub type NetatmoResult<T> = Result<T, NetatmoError>;

/// Marker substituted for sensitive form values in snapshots.
pub const REDACTION_MARKER: &str = "<FILTERED>";

/// Form fields whose values are never captured verbatim.
const REDACTED_FIELDS: [&str; 2] = ["password", "access_token"];

/// Application-level success marker in response bodies.
const RESPONSE_STATUS_OK: &str = "ok";

/// Replace the values of sensitive `key=value` pairs with the redaction
/// marker, leaving every other pair readable.
///
/// Operates on `&`-separated form-encoded text; applied to request bodies,
/// URL query strings, and response bodies before they enter a snapshot.
pub fn redact(text: &str) -> String {
    text.split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if REDACTED_FIELDS.contains(&key) => {
                format!("{key}={REDACTION_MARKER}")
            }
            _ => pair.to_string(),
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Redacted view of an outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSnapshot {
    /// HTTP method
    pub method: String,
    /// Request URL with a redacted query string
    pub url: String,
    /// Redacted form-encoded body
    pub body: String,
}

impl RequestSnapshot {
    /// Capture a request, redacting the body and any query string.
    pub(crate) fn capture(method: &str, url: &str, body: &str) -> Self {
        let url = match url.split_once('?') {
            Some((base, query)) => format!("{base}?{}", redact(query)),
            None => url.to_string(),
        };

        Self {
            method: method.to_string(),
            url,
            body: redact(body),
        }
    }
}

/// Redacted view of a received response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSnapshot {
    /// HTTP status code
    pub status: u16,
    /// Final URL of the response
    pub url: String,
    /// Redacted response body
    pub body: String,
    /// Time from send to response
    pub elapsed: Duration,
}

impl ResponseSnapshot {
    /// Capture a response, redacting the body.
    pub(crate) fn capture(status: u16, url: &str, body: &str, elapsed: Duration) -> Self {
        Self {
            status,
            url: url.to_string(),
            body: redact(body),
            elapsed,
        }
    }
}

/// Failure raised by the transport before any response arrived.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The per-request timeout elapsed
    #[error("request timed out")]
    Timeout,

    /// Connection-level failure (DNS, TCP, TLS, interrupted transfer)
    #[error("network unreachable: {0}")]
    Unreachable(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::Unreachable(err.to_string())
        }
    }
}

/// Root error type for the Netatmo client.
///
/// One variant per failure classification; see [`NetatmoError::is_retryable`]
/// for which classifications the retry engine may re-attempt.
#[derive(Debug, Error)]
pub enum NetatmoError {
    /// The request timed out at the transport level
    #[error("request timed out: {} {}", request.method, request.url)]
    NetworkTimeout {
        /// The request that timed out
        request: RequestSnapshot,
    },

    /// The transport failed before a response arrived
    #[error("network unreachable: {reason} ({} {})", request.method, request.url)]
    NetworkUnreachable {
        /// The request that could not be sent
        request: RequestSnapshot,
        /// Transport-level failure description
        reason: String,
    },

    /// HTTP 401 or 403
    #[error("unauthorized ({}): {} {}", response.status, request.method, request.url)]
    Unauthorized {
        /// The rejected request
        request: RequestSnapshot,
        /// The rejecting response
        response: ResponseSnapshot,
    },

    /// HTTP 429
    #[error("rate limited: {} {}", request.method, request.url)]
    RateLimited {
        /// The throttled request
        request: RequestSnapshot,
        /// The throttling response
        response: ResponseSnapshot,
    },

    /// Any other HTTP 4xx
    #[error("client error ({}): {} {}", response.status, request.method, request.url)]
    ClientError {
        /// The rejected request
        request: RequestSnapshot,
        /// The rejecting response
        response: ResponseSnapshot,
    },

    /// HTTP 5xx
    #[error("server error ({}): {} {}", response.status, request.method, request.url)]
    ServerError {
        /// The failed request
        request: RequestSnapshot,
        /// The error response
        response: ResponseSnapshot,
    },

    /// A response outside every recognized status band, or a body that
    /// could not be decoded
    #[error("unexpected response ({}): {reason}", response.status)]
    UnknownResponse {
        /// The request
        request: RequestSnapshot,
        /// The unrecognized response
        response: ResponseSnapshot,
        /// What made the response unrecognizable
        reason: String,
    },

    /// HTTP success whose body `status` field is absent or not `"ok"`
    #[error("application error: status field {status:?} ({} {})", request.method, request.url)]
    NonOkResponse {
        /// The request
        request: RequestSnapshot,
        /// The response carrying the failure marker
        response: ResponseSnapshot,
        /// The body `status` value, if present
        status: Option<String>,
    },

    /// Caller-side precondition violation; never sent over the wire
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// What was wrong with the arguments
        message: String,
    },
}

impl NetatmoError {
    /// Whether re-attempting the same request may succeed without caller
    /// intervention.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkTimeout { .. }
                | Self::NetworkUnreachable { .. }
                | Self::ServerError { .. }
                | Self::UnknownResponse { .. }
        )
    }

    /// HTTP status code of the classified response, if one was received.
    pub fn status_code(&self) -> Option<u16> {
        self.response().map(|r| r.status)
    }

    /// Redacted snapshot of the failing request, if the failure reached the
    /// wire.
    pub fn request(&self) -> Option<&RequestSnapshot> {
        match self {
            Self::NetworkTimeout { request }
            | Self::NetworkUnreachable { request, .. }
            | Self::Unauthorized { request, .. }
            | Self::RateLimited { request, .. }
            | Self::ClientError { request, .. }
            | Self::ServerError { request, .. }
            | Self::UnknownResponse { request, .. }
            | Self::NonOkResponse { request, .. } => Some(request),
            Self::InvalidArgument { .. } => None,
        }
    }

    /// Redacted snapshot of the classified response, if one was received.
    pub fn response(&self) -> Option<&ResponseSnapshot> {
        match self {
            Self::Unauthorized { response, .. }
            | Self::RateLimited { response, .. }
            | Self::ClientError { response, .. }
            | Self::ServerError { response, .. }
            | Self::UnknownResponse { response, .. }
            | Self::NonOkResponse { response, .. } => Some(response),
            Self::NetworkTimeout { .. }
            | Self::NetworkUnreachable { .. }
            | Self::InvalidArgument { .. } => None,
        }
    }

    /// Shorthand for an [`NetatmoError::InvalidArgument`].
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Classify a transport failure.
    pub(crate) fn from_transport(request: RequestSnapshot, error: TransportError) -> Self {
        match error {
            TransportError::Timeout => Self::NetworkTimeout { request },
            TransportError::Unreachable(reason) => Self::NetworkUnreachable { request, reason },
        }
    }

    /// Classify a received response by status band. Returns `None` for 2xx.
    pub(crate) fn from_status(
        request: &RequestSnapshot,
        response: &ResponseSnapshot,
    ) -> Option<Self> {
        let request = request.clone();
        let response = response.clone();

        match response.status {
            200..=299 => None,
            401 | 403 => Some(Self::Unauthorized { request, response }),
            429 => Some(Self::RateLimited { request, response }),
            400..=499 => Some(Self::ClientError { request, response }),
            500..=599 => Some(Self::ServerError { request, response }),
            status => Some(Self::UnknownResponse {
                request,
                response,
                reason: format!("unrecognized status code {status}"),
            }),
        }
    }
}

/// Validate the vendor's application-level envelope on a successful
/// response: the JSON body must carry `status: "ok"`.
///
/// Returns the parsed body for payload decoding. An undecodable body is an
/// [`NetatmoError::UnknownResponse`]; a decodable body without the success
/// marker is an [`NetatmoError::NonOkResponse`].
pub(crate) fn check_envelope(
    request: &RequestSnapshot,
    response: &ResponseSnapshot,
    raw_body: &[u8],
) -> NetatmoResult<serde_json::Value> {
    let value: serde_json::Value =
        serde_json::from_slice(raw_body).map_err(|e| NetatmoError::UnknownResponse {
            request: request.clone(),
            response: response.clone(),
            reason: format!("undecodable body: {e}"),
        })?;

    let status = value.get("status").and_then(serde_json::Value::as_str);
    if status == Some(RESPONSE_STATUS_OK) {
        Ok(value)
    } else {
        Err(NetatmoError::NonOkResponse {
            request: request.clone(),
            response: response.clone(),
            status: status.map(str::to_owned),
        })
    }
}
