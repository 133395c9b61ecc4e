//! Retry behavior through the full client stack.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;

use crate::auth::{ClientCredentials, Token};
use crate::config::NetatmoConfig;
use crate::errors::NetatmoError;
use crate::fixtures;
use crate::mocks::{FixedClock, MockResponse, MockTransport};
use crate::resilience::RetryConfig;
use crate::services::thermostat::GetThermostatsDataRequest;
use crate::NetatmoClient;

fn fast_retry(max_attempts: u32) -> RetryConfig {
    RetryConfig::default()
        .max_attempts(max_attempts)
        .base_delay(Duration::from_millis(1))
        .max_delay(Duration::from_millis(2))
}

fn client_with(retry: RetryConfig, transport: Arc<MockTransport>) -> NetatmoClient {
    let config = NetatmoConfig::builder().retry(retry).build().unwrap();
    let client = NetatmoClient::with_transport_and_clock(
        config,
        ClientCredentials::new("client-id", "client-secret"),
        transport,
        Arc::new(FixedClock::at_epoch(1622548800)),
    )
    .unwrap();
    client.token_store().replace(Token::new("12345", "abcde"));
    client
}

#[tokio::test]
async fn transient_server_errors_are_retried() {
    let transport = Arc::new(
        MockTransport::new()
            .add_response(MockResponse::status(500, "boom"))
            .add_response(MockResponse::status(503, "still booting"))
            .add_response(MockResponse::json(&fixtures::thermostats_data_body())),
    );
    let client = client_with(fast_retry(5), transport.clone());

    let devices = client
        .thermostat()
        .get_thermostats_data(GetThermostatsDataRequest::default())
        .await
        .unwrap();

    assert_eq!(devices.len(), 1);
    assert_eq!(transport.request_count(), 3);
}

#[tokio::test]
async fn timeouts_are_retried() {
    let transport = Arc::new(
        MockTransport::new()
            .add_timeout()
            .add_response(MockResponse::json(&fixtures::thermostats_data_body())),
    );
    let client = client_with(fast_retry(5), transport.clone());

    client
        .thermostat()
        .get_thermostats_data(GetThermostatsDataRequest::default())
        .await
        .unwrap();

    assert_eq!(transport.request_count(), 2);
}

#[tokio::test]
async fn connection_failures_are_retried() {
    let transport = Arc::new(
        MockTransport::new()
            .add_unreachable("dns lookup failed")
            .add_response(MockResponse::json(&fixtures::thermostats_data_body())),
    );
    let client = client_with(fast_retry(5), transport.clone());

    client
        .thermostat()
        .get_thermostats_data(GetThermostatsDataRequest::default())
        .await
        .unwrap();

    assert_eq!(transport.request_count(), 2);
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let transport =
        Arc::new(MockTransport::new().with_default_response(MockResponse::status(404, "missing")));
    let client = client_with(fast_retry(5), transport.clone());

    let error = client
        .thermostat()
        .get_thermostats_data(GetThermostatsDataRequest::default())
        .await
        .unwrap_err();

    assert!(matches!(error, NetatmoError::ClientError { .. }));
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test]
async fn rate_limiting_is_not_retried() {
    let transport = Arc::new(
        MockTransport::new().with_default_response(MockResponse::status(429, "slow down")),
    );
    let client = client_with(fast_retry(5), transport.clone());

    let error = client
        .thermostat()
        .get_thermostats_data(GetThermostatsDataRequest::default())
        .await
        .unwrap_err();

    assert!(matches!(error, NetatmoError::RateLimited { .. }));
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test]
async fn out_of_range_statuses_are_retried_as_unknown() {
    let transport = Arc::new(
        MockTransport::new()
            .add_response(MockResponse::status(650, "?"))
            .add_response(MockResponse::json(&fixtures::thermostats_data_body())),
    );
    let client = client_with(fast_retry(5), transport.clone());

    client
        .thermostat()
        .get_thermostats_data(GetThermostatsDataRequest::default())
        .await
        .unwrap();

    assert_eq!(transport.request_count(), 2);
}

#[tokio::test]
async fn exhaustion_returns_the_last_failure() {
    let transport = Arc::new(
        MockTransport::new().with_default_response(MockResponse::status(503, "overloaded")),
    );
    let client = client_with(fast_retry(3), transport.clone());

    let error = client
        .thermostat()
        .get_thermostats_data(GetThermostatsDataRequest::default())
        .await
        .unwrap_err();

    match error {
        NetatmoError::ServerError { response, .. } => assert_eq!(response.status, 503),
        other => panic!("expected ServerError, got {other:?}"),
    }
    assert_eq!(transport.request_count(), 3);
}
