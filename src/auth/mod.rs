//! Credentials and the token store.
//!
//! The vendor issues an access/refresh token pair through the resource-owner
//! password grant. [`TokenStore`] is the single shared holder of that pair:
//! it builds grant bodies from the OAuth client identity it owns, hands out
//! clones of the current credential, and notifies an optional observer on
//! every replacement so callers can persist tokens across restarts.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};

use crate::config::NetatmoConfig;
use crate::errors::{NetatmoError, NetatmoResult, RequestSnapshot, REDACTION_MARKER};
use crate::transport::HttpResponse;

mod interceptor;

pub(crate) use interceptor::{Authenticator, RawExchange};

/// Path of the OAuth token endpoint, relative to the API base URL.
pub(crate) const TOKEN_ENDPOINT: &str = "oauth2/token";

/// OAuth client identity issued by the vendor.
#[derive(Clone)]
pub struct ClientCredentials {
    client_id: String,
    client_secret: SecretString,
}

impl ClientCredentials {
    /// Create credentials from the vendor-issued id and secret.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::new(client_secret.into()),
        }
    }

    /// OAuth client identifier.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &REDACTION_MARKER)
            .finish()
    }
}

/// An OAuth credential: the access/refresh token pair plus expiry metadata.
///
/// The pair is only ever replaced as a unit. A token without expiry metadata
/// is treated as already expired rather than trusted indefinitely.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Bearer token attached to authenticated requests
    pub access_token: String,
    /// Token presented to the refresh grant
    pub refresh_token: String,
    /// Absolute expiry, if the vendor reported one
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Token {
    /// Create a token with no known expiry.
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            expires_at: None,
        }
    }

    /// Set the absolute expiry.
    pub fn with_expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Whether the token is unusable at `now`. Absent expiry metadata counts
    /// as expired.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at <= now,
            None => true,
        }
    }

    /// Serialize for persistence: exactly the three credential fields.
    pub fn to_json(&self) -> NetatmoResult<String> {
        serde_json::to_string(self)
            .map_err(|e| NetatmoError::invalid_argument(format!("unserializable token: {e}")))
    }

    /// Restore a token persisted by [`Token::to_json`].
    pub fn from_json(json: &str) -> NetatmoResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| NetatmoError::invalid_argument(format!("malformed persisted token: {e}")))
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &REDACTION_MARKER)
            .field("refresh_token", &REDACTION_MARKER)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Wire payload of the `oauth2/token` endpoint.
#[derive(Clone, Deserialize)]
pub struct TokenResponse {
    /// Newly issued access token
    pub access_token: String,
    /// Newly issued refresh token; some exchanges omit it and keep the
    /// previous one valid
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Absolute expiry as epoch seconds
    #[serde(default, deserialize_with = "lenient_epoch")]
    pub expires_at: Option<i64>,
    /// Expiry as seconds from now
    #[serde(default, deserialize_with = "lenient_epoch")]
    pub expires_in: Option<i64>,
}

impl TokenResponse {
    /// Decode a token-endpoint response body.
    pub(crate) fn from_body(
        request: &RequestSnapshot,
        response: &HttpResponse,
    ) -> NetatmoResult<Self> {
        serde_json::from_slice(&response.body).map_err(|e| NetatmoError::UnknownResponse {
            request: request.clone(),
            response: response.snapshot(),
            reason: format!("undecodable token response: {e}"),
        })
    }

    /// Normalize into a [`Token`], resolving relative expiry against `now`.
    ///
    /// `fallback_refresh` covers exchanges whose response omits
    /// `refresh_token`; the previous refresh token stays valid then.
    pub fn into_token(self, now: DateTime<Utc>, fallback_refresh: Option<String>) -> Token {
        let expires_at = self
            .expires_at
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .or_else(|| self.expires_in.map(|secs| now + Duration::seconds(secs)));

        Token {
            access_token: self.access_token,
            refresh_token: self.refresh_token.or(fallback_refresh).unwrap_or_default(),
            expires_at,
        }
    }
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &REDACTION_MARKER)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| REDACTION_MARKER))
            .field("expires_at", &self.expires_at)
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Accept an epoch field as a number, a numeric string, an empty string, or
/// null. The vendor's token endpoint is not consistent about these.
fn lenient_epoch<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_i64(),
        Some(serde_json::Value::String(s)) => s.parse().ok(),
        _ => None,
    })
}

/// Callback invoked after the stored credential is replaced.
pub type TokenObserver = dyn Fn(&Token) + Send + Sync;

/// Shared, thread-safe holder of the current credential.
///
/// The store owns the OAuth client identity and builds grant bodies from it,
/// so the client secret never leaves this module. Token refreshes serialize
/// through [`TokenStore::refresh_gate`]; plain reads and replacements take a
/// short internal lock and never block on an in-flight refresh.
pub struct TokenStore {
    credentials: ClientCredentials,
    config: Arc<NetatmoConfig>,
    current: Mutex<Option<Token>>,
    observer: Mutex<Option<Arc<TokenObserver>>>,
    refresh_gate: tokio::sync::Mutex<()>,
}

impl TokenStore {
    /// Create an empty store for the given client identity.
    pub fn new(credentials: ClientCredentials, config: Arc<NetatmoConfig>) -> Self {
        Self {
            credentials,
            config,
            current: Mutex::new(None),
            observer: Mutex::new(None),
            refresh_gate: tokio::sync::Mutex::new(()),
        }
    }

    /// Clone of the current credential, if any.
    pub fn current(&self) -> Option<Token> {
        self.current.lock().clone()
    }

    /// Replace the stored credential and notify the observer.
    ///
    /// The observer runs after the internal lock is dropped, so it may call
    /// back into the store without deadlocking.
    pub fn replace(&self, token: Token) {
        *self.current.lock() = Some(token.clone());

        let observer = self.observer.lock().clone();
        if let Some(observer) = observer {
            observer(&token);
        }
    }

    /// Register a callback for credential replacements, dropping any
    /// previously registered one. Typical use is persisting tokens so a
    /// restart can resume without a fresh password grant.
    pub fn set_observer(&self, observer: impl Fn(&Token) + Send + Sync + 'static) {
        *self.observer.lock() = Some(Arc::new(observer));
    }

    /// OAuth client identifier.
    pub fn client_id(&self) -> &str {
        &self.credentials.client_id
    }

    /// Serialize the refresh critical section.
    ///
    /// Holders must re-check [`TokenStore::current`] after acquiring: another
    /// task may have refreshed while they waited.
    pub(crate) async fn refresh_gate(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.refresh_gate.lock().await
    }

    /// Form body for the resource-owner password grant.
    pub fn password_grant_body(
        &self,
        username: &str,
        password: &str,
        user_prefix: &str,
        app_version: &str,
    ) -> NetatmoResult<Vec<(String, String)>> {
        self.validate_identity()?;
        if username.is_empty() {
            return Err(NetatmoError::invalid_argument("username must not be empty"));
        }
        if password.is_empty() {
            return Err(NetatmoError::invalid_argument("password must not be empty"));
        }

        Ok(vec![
            ("grant_type".to_string(), "password".to_string()),
            ("client_id".to_string(), self.credentials.client_id.clone()),
            (
                "client_secret".to_string(),
                self.credentials.client_secret.expose_secret().clone(),
            ),
            ("username".to_string(), username.to_string()),
            ("password".to_string(), password.to_string()),
            ("scope".to_string(), self.config.scope.clone()),
            (self.config.user_prefix_field.clone(), user_prefix.to_string()),
            (self.config.app_version_field.clone(), app_version.to_string()),
        ])
    }

    /// Form body for the refresh grant, built from the stored credential.
    pub fn refresh_grant_body(&self) -> NetatmoResult<Vec<(String, String)>> {
        self.validate_identity()?;
        let token = self
            .current()
            .filter(|token| !token.refresh_token.is_empty())
            .ok_or_else(|| {
                NetatmoError::invalid_argument("cannot refresh without a stored refresh token")
            })?;

        Ok(vec![
            ("grant_type".to_string(), "refresh_token".to_string()),
            ("client_id".to_string(), self.credentials.client_id.clone()),
            (
                "client_secret".to_string(),
                self.credentials.client_secret.expose_secret().clone(),
            ),
            ("refresh_token".to_string(), token.refresh_token),
        ])
    }

    fn validate_identity(&self) -> NetatmoResult<()> {
        if self.credentials.client_id.is_empty() {
            return Err(NetatmoError::invalid_argument("client_id must not be empty"));
        }
        if self.credentials.client_secret.expose_secret().is_empty() {
            return Err(NetatmoError::invalid_argument(
                "client_secret must not be empty",
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStore")
            .field("client_id", &self.credentials.client_id)
            .field("has_token", &self.current.lock().is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn store() -> TokenStore {
        TokenStore::new(
            ClientCredentials::new("client-id", "client-secret"),
            Arc::new(NetatmoConfig::default()),
        )
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn token_without_expiry_counts_as_expired() {
        let token = Token::new("12345", "abcde");
        assert!(token.is_expired(now()));
    }

    #[test]
    fn token_expiry_is_compared_against_the_given_instant() {
        let token = Token::new("12345", "abcde").with_expires_at(now() + Duration::hours(1));
        assert!(!token.is_expired(now()));
        assert!(token.is_expired(now() + Duration::hours(2)));
    }

    #[test]
    fn token_json_round_trip_preserves_all_three_fields() {
        let token = Token::new("12345", "abcde").with_expires_at(now());
        let json = token.to_json().unwrap();

        assert!(json.contains("\"access_token\":\"12345\""));
        assert!(json.contains("\"refresh_token\":\"abcde\""));
        assert!(json.contains("\"expires_at\""));
        assert_eq!(Token::from_json(&json).unwrap(), token);
    }

    #[test]
    fn token_json_tolerates_missing_expiry() {
        let restored = Token::from_json(r#"{"access_token":"12345","refresh_token":"abcde"}"#);
        assert_eq!(restored.unwrap(), Token::new("12345", "abcde"));
    }

    #[test]
    fn malformed_persisted_token_is_an_invalid_argument() {
        let error = Token::from_json("not json").unwrap_err();
        assert!(matches!(error, NetatmoError::InvalidArgument { .. }));
    }

    #[test]
    fn token_debug_never_prints_the_tokens() {
        let token = Token::new("12345", "abcde");
        let debug = format!("{token:?}");
        assert!(debug.contains(REDACTION_MARKER));
        assert!(!debug.contains("12345"));
        assert!(!debug.contains("abcde"));
    }

    #[test]
    fn credentials_debug_never_prints_the_secret() {
        let credentials = ClientCredentials::new("client-id", "client-secret");
        let debug = format!("{credentials:?}");
        assert!(debug.contains("client-id"));
        assert!(!debug.contains("client-secret"));
    }

    #[test]
    fn token_response_resolves_absolute_expiry() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token":"67890","refresh_token":"fghij","expires_at":1622548800}"#)
                .unwrap();

        let token = response.into_token(now(), None);
        assert_eq!(token.access_token, "67890");
        assert_eq!(token.refresh_token, "fghij");
        assert_eq!(token.expires_at, DateTime::from_timestamp(1622548800, 0));
    }

    #[test]
    fn token_response_resolves_relative_expiry_against_now() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token":"67890","refresh_token":"fghij","expires_in":300}"#)
                .unwrap();

        let token = response.into_token(now(), None);
        assert_eq!(token.expires_at, Some(now() + Duration::seconds(300)));
    }

    #[test]
    fn token_response_tolerates_empty_expiry_strings() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token":"67890","refresh_token":"fghij","expires_at":""}"#)
                .unwrap();

        let token = response.into_token(now(), None);
        assert_eq!(token.expires_at, None);
    }

    #[test]
    fn token_response_keeps_the_previous_refresh_token_when_omitted() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token":"67890"}"#).unwrap();

        let token = response.into_token(now(), Some("abcde".to_string()));
        assert_eq!(token.refresh_token, "abcde");
    }

    #[test]
    fn password_grant_body_carries_every_required_field() {
        let body = store()
            .password_grant_body("user@example.com", "pa55word", "ne", "1.0")
            .unwrap();

        assert_eq!(
            body,
            vec![
                ("grant_type".to_string(), "password".to_string()),
                ("client_id".to_string(), "client-id".to_string()),
                ("client_secret".to_string(), "client-secret".to_string()),
                ("username".to_string(), "user@example.com".to_string()),
                ("password".to_string(), "pa55word".to_string()),
                (
                    "scope".to_string(),
                    "read_thermostat write_thermostat".to_string()
                ),
                ("user_prefix".to_string(), "ne".to_string()),
                ("app_version".to_string(), "1.0".to_string()),
            ]
        );
    }

    #[test]
    fn password_grant_body_rejects_empty_inputs() {
        let store = store();
        assert!(matches!(
            store.password_grant_body("", "pw", "ne", "1.0").unwrap_err(),
            NetatmoError::InvalidArgument { .. }
        ));
        assert!(matches!(
            store.password_grant_body("user", "", "ne", "1.0").unwrap_err(),
            NetatmoError::InvalidArgument { .. }
        ));
    }

    #[test]
    fn grant_bodies_reject_an_empty_client_identity() {
        let store = TokenStore::new(
            ClientCredentials::new("", "client-secret"),
            Arc::new(NetatmoConfig::default()),
        );
        assert!(matches!(
            store.password_grant_body("user", "pw", "ne", "1.0").unwrap_err(),
            NetatmoError::InvalidArgument { .. }
        ));
    }

    #[test]
    fn refresh_grant_body_requires_a_stored_refresh_token() {
        let store = store();
        assert!(matches!(
            store.refresh_grant_body().unwrap_err(),
            NetatmoError::InvalidArgument { .. }
        ));

        store.replace(Token::new("12345", "abcde"));
        let body = store.refresh_grant_body().unwrap();
        assert_eq!(
            body,
            vec![
                ("grant_type".to_string(), "refresh_token".to_string()),
                ("client_id".to_string(), "client-id".to_string()),
                ("client_secret".to_string(), "client-secret".to_string()),
                ("refresh_token".to_string(), "abcde".to_string()),
            ]
        );
    }

    #[test]
    fn replace_notifies_the_observer_with_the_lock_released() {
        let store = Arc::new(store());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let observer_store = store.clone();
        let observer_seen = seen.clone();
        store.set_observer(move |token| {
            // Reading back through the store proves the lock is not held.
            let current = observer_store.current();
            assert_eq!(current.as_ref(), Some(token));
            observer_seen.lock().push(token.access_token.clone());
        });

        store.replace(Token::new("12345", "abcde"));
        store.replace(Token::new("67890", "fghij"));

        assert_eq!(*seen.lock(), vec!["12345".to_string(), "67890".to_string()]);
    }

    #[test]
    fn current_returns_a_clone_of_the_latest_replacement() {
        let store = store();
        assert!(store.current().is_none());

        store.replace(Token::new("12345", "abcde"));
        store.replace(Token::new("67890", "fghij"));
        assert_eq!(store.current(), Some(Token::new("67890", "fghij")));
    }
}
