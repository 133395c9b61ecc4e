//! HTTP transport layer.
//!
//! The Netatmo API is POST-only: every operation, including the OAuth token
//! endpoint, takes a form-encoded body. [`HttpTransport`] abstracts the wire
//! so tests can inject scripted responses; [`ReqwestTransport`] is the
//! production implementation.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::StatusCode;
use tracing::instrument;
use url::Url;

use crate::errors::{NetatmoError, NetatmoResult, RequestSnapshot, ResponseSnapshot, TransportError};

/// Idle connections kept per host.
const POOL_MAX_IDLE_PER_HOST: usize = 10;

/// A form-encoded POST request.
#[derive(Debug, Clone)]
pub struct FormRequest {
    /// Target URL, including any query parameters
    pub url: Url,
    /// Form fields, encoded in insertion order
    pub fields: Vec<(String, String)>,
    /// Extra headers
    pub headers: HeaderMap,
    /// Per-request timeout override
    pub timeout: Option<Duration>,
}

impl FormRequest {
    /// Create a request with no fields.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            fields: Vec::new(),
            headers: HeaderMap::new(),
            timeout: None,
        }
    }

    /// Append a form field. Field order is preserved on the wire.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Append every field from an iterator.
    pub fn fields(mut self, fields: impl IntoIterator<Item = (String, String)>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Set a header.
    pub fn header(mut self, name: header::HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Override the transport's default timeout for this request.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Encode the fields as an `application/x-www-form-urlencoded` body.
    ///
    /// This exact text goes on the wire, so snapshots taken from it match
    /// what the server received.
    pub fn encoded_body(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (name, value) in &self.fields {
            serializer.append_pair(name, value);
        }
        serializer.finish()
    }

    /// Redacted snapshot of this request.
    pub fn snapshot(&self) -> RequestSnapshot {
        RequestSnapshot::capture("POST", self.url.as_str(), &self.encoded_body())
    }
}

/// A received response, body fully read.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Final URL after any redirects
    pub url: String,
    /// Raw response body
    pub body: Bytes,
    /// Time from send to body fully read
    pub elapsed: Duration,
}

impl HttpResponse {
    /// Response body as text, lossily decoded.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Redacted snapshot of this response.
    pub fn snapshot(&self) -> ResponseSnapshot {
        ResponseSnapshot::capture(self.status.as_u16(), &self.url, &self.body_text(), self.elapsed)
    }
}

/// Abstraction over the HTTP wire.
///
/// Implementations report [`TransportError`] only for failures where no
/// response arrived; any received status, success or not, is an
/// [`HttpResponse`] for the layers above to classify.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send a form-encoded POST and read the full response body.
    async fn send_form(&self, request: &FormRequest) -> Result<HttpResponse, TransportError>;
}

/// Production transport backed by [`reqwest`].
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with the given default request timeout.
    pub fn new(timeout: Duration) -> NetatmoResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
            .build()
            .map_err(|e| NetatmoError::invalid_argument(format!("failed to build http client: {e}")))?;

        Ok(Self { client })
    }

    /// Wrap an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReqwestTransport").finish_non_exhaustive()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    #[instrument(skip(self, request), fields(url = %request.url))]
    async fn send_form(&self, request: &FormRequest) -> Result<HttpResponse, TransportError> {
        let body = request.encoded_body();

        let mut builder = self
            .client
            .post(request.url.clone())
            .headers(request.headers.clone())
            .header(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/x-www-form-urlencoded"),
            )
            .body(body);

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let started = std::time::Instant::now();
        let response = builder.send().await?;

        let status = response.status();
        let url = response.url().to_string();
        let body = response.bytes().await?;

        Ok(HttpResponse {
            status,
            url,
            body,
            elapsed: started.elapsed(),
        })
    }
}
