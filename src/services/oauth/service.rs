//! OAuth service implementation.

use std::sync::Arc;

use tracing::instrument;

use super::PasswordGrantRequest;
use crate::auth::{Token, TokenStore};
use crate::client::RequestPipeline;
use crate::errors::NetatmoResult;

/// Token acquisition against the vendor's OAuth endpoint.
#[derive(Clone)]
pub struct OAuthService {
    pipeline: Arc<RequestPipeline>,
    store: Arc<TokenStore>,
}

impl OAuthService {
    pub(crate) fn new(pipeline: Arc<RequestPipeline>, store: Arc<TokenStore>) -> Self {
        Self { pipeline, store }
    }

    /// Exchange account credentials for a token via the password grant.
    ///
    /// The issued token is placed in the token store, notifying its observer,
    /// and returned. Transient failures retry under the configured budgets;
    /// invalid inputs fail before anything goes on the wire.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn fetch_token(&self, request: PasswordGrantRequest) -> NetatmoResult<Token> {
        let fields = self.store.password_grant_body(
            &request.username,
            request.password(),
            &request.user_prefix,
            &request.app_version,
        )?;

        let token = self.pipeline.execute_token(fields).await?;
        self.store.replace(token.clone());

        Ok(token)
    }
}
