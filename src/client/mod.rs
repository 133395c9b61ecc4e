//! Netatmo client implementation.
//!
//! Provides the main entry point for interacting with the thermostat API.

use std::sync::Arc;

use crate::auth::{Authenticator, ClientCredentials, TokenStore};
use crate::config::NetatmoConfig;
use crate::errors::NetatmoResult;
use crate::services::{OAuthService, ThermostatService};
use crate::time::{Clock, SystemClock};
use crate::transport::{HttpTransport, ReqwestTransport};

mod pipeline;

pub(crate) use pipeline::RequestPipeline;

/// Main client for the Vaillant/Netatmo thermostat API.
///
/// Cheap to clone; clones share the token store, so a refresh performed
/// through one clone is visible to all of them.
#[derive(Clone)]
pub struct NetatmoClient {
    config: Arc<NetatmoConfig>,
    store: Arc<TokenStore>,
    oauth_service: OAuthService,
    thermostat_service: ThermostatService,
}

impl NetatmoClient {
    /// Create a client with the production transport and system clock.
    pub fn new(config: NetatmoConfig, credentials: ClientCredentials) -> NetatmoResult<Self> {
        let transport = Arc::new(ReqwestTransport::new(config.request_timeout)?);
        Self::with_transport(config, credentials, transport)
    }

    /// Create a client over a custom transport.
    pub fn with_transport(
        config: NetatmoConfig,
        credentials: ClientCredentials,
        transport: Arc<dyn HttpTransport>,
    ) -> NetatmoResult<Self> {
        Self::with_transport_and_clock(config, credentials, transport, Arc::new(SystemClock))
    }

    /// Create a client over a custom transport and clock.
    pub fn with_transport_and_clock(
        config: NetatmoConfig,
        credentials: ClientCredentials,
        transport: Arc<dyn HttpTransport>,
        clock: Arc<dyn Clock>,
    ) -> NetatmoResult<Self> {
        config.validate()?;

        let config = Arc::new(config);
        let store = Arc::new(TokenStore::new(credentials, config.clone()));
        let authenticator = Authenticator::new(
            transport.clone(),
            store.clone(),
            config.clone(),
            clock.clone(),
        );
        let pipeline = Arc::new(RequestPipeline::new(
            config.clone(),
            transport,
            authenticator,
            clock.clone(),
        ));

        let oauth_service = OAuthService::new(pipeline.clone(), store.clone());
        let thermostat_service = ThermostatService::new(pipeline, clock);

        Ok(Self {
            config,
            store,
            oauth_service,
            thermostat_service,
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &NetatmoConfig {
        &self.config
    }

    /// The shared token store.
    ///
    /// Bootstrap it with a persisted credential via [`TokenStore::replace`],
    /// or register an observer before making calls so refreshed tokens get
    /// persisted.
    pub fn token_store(&self) -> &Arc<TokenStore> {
        &self.store
    }

    /// Get the OAuth service
    pub fn oauth(&self) -> &OAuthService {
        &self.oauth_service
    }

    /// Get the thermostat service
    pub fn thermostat(&self) -> &ThermostatService {
        &self.thermostat_service
    }
}

impl std::fmt::Debug for NetatmoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetatmoClient")
            .field("config", &self.config)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}
