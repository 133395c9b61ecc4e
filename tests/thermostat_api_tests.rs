//! Integration tests for the thermostat endpoints.

use chrono::{Duration as TimeDelta, Utc};
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path, query_param_contains};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vaillant_netatmo_client::services::thermostat::{
    GetThermostatsDataRequest, SetMinorModeRequest, SetSystemModeRequest,
};
use vaillant_netatmo_client::types::{SetpointMode, SystemMode};
use vaillant_netatmo_client::{
    fixtures, ClientCredentials, NetatmoClient, NetatmoConfig, NetatmoError, Token,
};

fn client_for(server: &MockServer) -> NetatmoClient {
    let config = NetatmoConfig::builder()
        .base_url(&server.uri())
        .unwrap()
        .build()
        .unwrap();
    let client =
        NetatmoClient::new(config, ClientCredentials::new("client-id", "client-secret")).unwrap();
    client.token_store().replace(Token::new("access-1", "refresh-1"));
    client
}

#[tokio::test]
async fn stations_decode_from_the_wire() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/getthermostatsdata"))
        .and(body_string_contains("device_type=NAVaillant"))
        .and(body_string_contains("access_token=access-1"))
        .and(query_param_contains("ts", ""))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::thermostats_data_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let devices = client
        .thermostat()
        .get_thermostats_data(GetThermostatsDataRequest::default())
        .await
        .unwrap();

    assert_eq!(devices, vec![fixtures::station()]);
}

#[tokio::test]
async fn set_system_mode_posts_the_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/setsystemmode"))
        .and(body_string_contains("device_id=device-1"))
        .and(body_string_contains("module_id=module-1"))
        .and(body_string_contains("system_mode=winter"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::status_ok_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .thermostat()
        .set_system_mode(SetSystemModeRequest::new(
            "device-1",
            "module-1",
            SystemMode::Winter,
        ))
        .await
        .unwrap();
}

#[tokio::test]
async fn set_minor_mode_posts_the_setpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/setminormode"))
        .and(body_string_contains("setpoint_mode=manual"))
        .and(body_string_contains("activate=true"))
        .and(body_string_contains("setpoint_temp=21.5"))
        .and(body_string_contains("setpoint_endtime="))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::status_ok_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .thermostat()
        .set_minor_mode(
            SetMinorModeRequest::new("device-1", "module-1", SetpointMode::Manual, true)
                .setpoint_temp(21.5)
                .setpoint_endtime(Utc::now() + TimeDelta::minutes(30)),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn a_vendor_error_envelope_is_terminal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/setsystemmode"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "error" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let error = client
        .thermostat()
        .set_system_mode(SetSystemModeRequest::new(
            "device-1",
            "module-1",
            SystemMode::Winter,
        ))
        .await
        .unwrap_err();

    match error {
        NetatmoError::NonOkResponse { status, .. } => assert_eq!(status.as_deref(), Some("error")),
        other => panic!("expected NonOkResponse, got {other:?}"),
    }
}
