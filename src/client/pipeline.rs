//! Request pipeline shared by every service.
//!
//! One logical call flows through here: a fresh request per attempt with a
//! fresh `ts` stamp, credential attachment and refresh in the interceptor,
//! retry with backoff around the whole exchange, then status classification
//! and the vendor's `status: "ok"` envelope on the way out.

use std::sync::Arc;

use reqwest::header::{self, HeaderValue};
use serde::de::DeserializeOwned;
use url::Url;

use crate::auth::{Authenticator, Token, TokenResponse, TOKEN_ENDPOINT};
use crate::config::NetatmoConfig;
use crate::errors::{check_envelope, NetatmoError, NetatmoResult};
use crate::resilience::with_retry;
use crate::time::Clock;
use crate::transport::{FormRequest, HttpTransport};

/// Execution engine behind the service methods.
pub struct RequestPipeline {
    config: Arc<NetatmoConfig>,
    transport: Arc<dyn HttpTransport>,
    authenticator: Authenticator,
    clock: Arc<dyn Clock>,
}

impl RequestPipeline {
    pub(crate) fn new(
        config: Arc<NetatmoConfig>,
        transport: Arc<dyn HttpTransport>,
        authenticator: Authenticator,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            transport,
            authenticator,
            clock,
        }
    }

    /// Run an authenticated call against an API endpoint and decode the
    /// envelope-checked body into `T`.
    pub(crate) async fn execute<T>(
        &self,
        path: &str,
        fields: Vec<(String, String)>,
    ) -> NetatmoResult<T>
    where
        T: DeserializeOwned,
    {
        let url = self.config.endpoint_url(path)?;
        with_retry(&self.config.retry, || {
            self.attempt(url.clone(), fields.clone())
        })
        .await
    }

    /// One authenticated attempt, rebuilt from scratch so the timestamp and
    /// attached token are current.
    async fn attempt<T>(&self, mut url: Url, fields: Vec<(String, String)>) -> NetatmoResult<T>
    where
        T: DeserializeOwned,
    {
        url.query_pairs_mut()
            .append_pair("ts", &self.clock.now().timestamp().to_string());

        let request = FormRequest::new(url)
            .fields(fields)
            .header(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"))
            .with_timeout(self.config.request_timeout);

        let exchange = self.authenticator.send(&request).await?;
        let response = exchange.response.snapshot();

        if let Some(error) = NetatmoError::from_status(&exchange.request, &response) {
            return Err(error);
        }

        let value = check_envelope(&exchange.request, &response, &exchange.response.body)?;
        serde_json::from_value(value).map_err(|e| NetatmoError::UnknownResponse {
            request: exchange.request,
            response,
            reason: format!("unexpected payload shape: {e}"),
        })
    }

    /// Run a token-endpoint call and normalize the issued credential.
    ///
    /// Token exchanges are unauthenticated, carry no `ts` stamp, and their
    /// responses have no `status` envelope.
    pub(crate) async fn execute_token(
        &self,
        fields: Vec<(String, String)>,
    ) -> NetatmoResult<Token> {
        let url = self.config.endpoint_url(TOKEN_ENDPOINT)?;
        with_retry(&self.config.retry, || {
            self.token_attempt(url.clone(), fields.clone())
        })
        .await
    }

    async fn token_attempt(
        &self,
        url: Url,
        fields: Vec<(String, String)>,
    ) -> NetatmoResult<Token> {
        let request = FormRequest::new(url)
            .fields(fields)
            .with_timeout(self.config.request_timeout);
        let snapshot = request.snapshot();

        let response = self
            .transport
            .send_form(&request)
            .await
            .map_err(|e| NetatmoError::from_transport(snapshot.clone(), e))?;

        if let Some(error) = NetatmoError::from_status(&snapshot, &response.snapshot()) {
            return Err(error);
        }

        let parsed = TokenResponse::from_body(&snapshot, &response)?;
        Ok(parsed.into_token(self.clock.now(), None))
    }
}
