//! Authorization interceptor for authenticated requests.
//!
//! Wraps the transport with the credential lifecycle: attach the current
//! access token, send, and on an authorization rejection refresh the token
//! once and retry once. The second response is returned as-is, so a repeat
//! rejection classifies upstream instead of looping.

use std::sync::Arc;

use reqwest::header::{self, HeaderValue};
use reqwest::StatusCode;
use tracing::{debug, info, warn};

use crate::auth::{Token, TokenResponse, TokenStore, TOKEN_ENDPOINT};
use crate::config::{NetatmoConfig, TokenPlacement};
use crate::errors::{NetatmoError, NetatmoResult, RequestSnapshot};
use crate::time::Clock;
use crate::transport::{FormRequest, HttpResponse, HttpTransport};

/// A sent request paired with its response, before classification.
///
/// The snapshot reflects the request that actually went on the wire, token
/// attached (and redacted), so diagnostics match what the server saw.
pub(crate) struct RawExchange {
    pub(crate) request: RequestSnapshot,
    pub(crate) response: HttpResponse,
}

/// Attaches credentials to outgoing requests and recovers from authorization
/// rejections with a single refresh-and-retry.
pub(crate) struct Authenticator {
    transport: Arc<dyn HttpTransport>,
    store: Arc<TokenStore>,
    config: Arc<NetatmoConfig>,
    clock: Arc<dyn Clock>,
}

impl Authenticator {
    pub(crate) fn new(
        transport: Arc<dyn HttpTransport>,
        store: Arc<TokenStore>,
        config: Arc<NetatmoConfig>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            transport,
            store,
            config,
            clock,
        }
    }

    /// Send an authenticated request.
    ///
    /// Responses other than 401/403 come back unclassified, success or not.
    /// On a rejection the token is refreshed and the request re-sent exactly
    /// once; a failed refresh surfaces with the refresh exchange's own
    /// classification.
    pub(crate) async fn send(&self, request: &FormRequest) -> NetatmoResult<RawExchange> {
        let token = self.store.current().ok_or_else(|| {
            NetatmoError::invalid_argument(
                "no credential in the token store; fetch or bootstrap a token first",
            )
        })?;

        let exchange = self.send_with_token(request, &token).await?;
        if !is_auth_rejection(exchange.response.status) {
            return Ok(exchange);
        }

        debug!(
            status = exchange.response.status.as_u16(),
            "Authorization rejected, refreshing token"
        );
        let fresh = self.refresh(&token).await?;
        self.send_with_token(request, &fresh).await
    }

    async fn send_with_token(
        &self,
        request: &FormRequest,
        token: &Token,
    ) -> NetatmoResult<RawExchange> {
        let attached = self.attach(request.clone(), &token.access_token)?;
        let snapshot = attached.snapshot();

        let response = self
            .transport
            .send_form(&attached)
            .await
            .map_err(|e| NetatmoError::from_transport(snapshot.clone(), e))?;

        Ok(RawExchange {
            request: snapshot,
            response,
        })
    }

    /// Attach the access token where the configuration says it belongs.
    fn attach(&self, mut request: FormRequest, access_token: &str) -> NetatmoResult<FormRequest> {
        match self.config.token_placement {
            TokenPlacement::Body => {
                request.fields.push(("access_token".to_string(), access_token.to_string()));
            }
            TokenPlacement::Query => {
                request
                    .url
                    .query_pairs_mut()
                    .append_pair("access_token", access_token);
            }
            TokenPlacement::Header => {
                let value = HeaderValue::from_str(&format!("Bearer {access_token}"))
                    .map_err(|_| {
                        NetatmoError::invalid_argument(
                            "access token contains characters invalid in a header",
                        )
                    })?;
                request.headers.insert(header::AUTHORIZATION, value);
            }
        }
        Ok(request)
    }

    /// Exchange the refresh token for a new credential, replacing `stale`.
    ///
    /// Serialized through the store's refresh gate; a concurrent caller that
    /// already replaced `stale` wins, and its token is reused without another
    /// exchange.
    async fn refresh(&self, stale: &Token) -> NetatmoResult<Token> {
        let _gate = self.store.refresh_gate().await;

        if let Some(current) = self.store.current() {
            if current.access_token != stale.access_token {
                debug!("Token already refreshed by a concurrent call");
                return Ok(current);
            }
        }

        let fields = self.store.refresh_grant_body()?;
        let url = self.config.endpoint_url(TOKEN_ENDPOINT)?;
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
            warn!(
                status = response.status.as_u16(),
                "Token refresh rejected"
            );
            return Err(error);
        }

        let parsed = TokenResponse::from_body(&snapshot, &response)?;
        let token = parsed.into_token(self.clock.now(), Some(stale.refresh_token.clone()));
        self.store.replace(token.clone());
        info!("Access token refreshed");

        Ok(token)
    }
}

fn is_auth_rejection(status: StatusCode) -> bool {
    matches!(status.as_u16(), 401 | 403)
}
