//! The runner wired to the real HTTP client and a mock delivery service
//!
//! `run` owns its worker runtime, so these tests stay synchronous and drive
//! the mock server from a separate runtime.

use delivery_client::{ClientOptions, DeliveryError};
use delivery_config::{ConfigLayer, ExampleConfig, Preset, Transport};
use delivery_example::{RunError, exit_code, run};
use tokio::runtime::Runtime;
use wiremock::MockServer;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{complete_layer, mount_delivery, mount_metrics};

fn server_config(server: &MockServer, preset: Preset) -> ExampleConfig {
    ExampleConfig::resolve(ConfigLayer {
        preset: Some(preset),
        ..complete_layer(
            &format!("{}/deliver", server.uri()),
            &format!("{}/log", server.uri()),
        )
    })
}

#[test]
fn api_delivery_prints_service_response() {
    let rt = Runtime::new().unwrap();
    let server = rt.block_on(MockServer::start());
    rt.block_on(async {
        Mock::given(method("POST"))
            .and(path("/deliver"))
            .and(header("x-api-key", "delivery-key"))
            .and(body_partial_json(serde_json::json!({
                "useCase": "SEARCH",
                "searchQuery": "query",
                "paging": {"offset": 0, "size": 3},
                "userInfo": {"anonUserId": "anonUserId1"},
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "requestId": "server-req",
                "insertion": [
                    {"contentId": "content3", "insertionId": "i-3", "position": 0},
                    {"contentId": "content1", "insertionId": "i-1", "position": 1},
                    {"contentId": "content2", "insertionId": "i-2", "position": 2},
                ],
            })))
            .expect(1)
            .mount(&server)
            .await;
        mount_metrics(&server, 0).await;
    });

    let mut out = Vec::new();
    run(
        &server_config(&server, Preset::Proto),
        ClientOptions::build,
        &mut out,
    )
    .unwrap();

    let printed = String::from_utf8(out).unwrap();
    assert!(printed.starts_with("response="));
    assert!(printed.contains("\"executionServer\": \"API\""));
    assert!(printed.contains("\"requestId\": \"server-req\""));

    let received = rt.block_on(server.received_requests()).unwrap();
    let sent: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    let client_request_id = sent["clientRequestId"].as_str().unwrap();
    assert!(printed.contains(&format!("\"clientRequestId\": \"{client_request_id}\"")));
}

#[test]
fn only_log_answers_locally_and_logs() {
    let rt = Runtime::new().unwrap();
    let server = rt.block_on(MockServer::start());
    rt.block_on(async {
        mount_delivery(&server, serde_json::json!({}), 0).await;
        Mock::given(method("POST"))
            .and(path("/log"))
            .and(header("x-api-key", "metrics-key"))
            .and(body_partial_json(serde_json::json!({
                "deliveryLog": [{"execution": {"executionServer": "SDK"}}],
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
    });

    let mut out = Vec::new();
    run(
        &server_config(&server, Preset::Json),
        ClientOptions::build,
        &mut out,
    )
    .unwrap();

    let printed = String::from_utf8(out).unwrap();
    let json: serde_json::Value =
        serde_json::from_str(printed.trim_end().trim_start_matches("response=")).unwrap();
    assert_eq!(json["executionServer"], "SDK");
    let insertion = json["response"]["insertion"].as_array().unwrap();
    assert_eq!(insertion.len(), 2);
    assert_eq!(insertion[0]["contentId"], "content0");
    assert_eq!(insertion[0]["position"], 0);
    assert_eq!(insertion[1]["contentId"], "content1");
    assert_eq!(insertion[1]["position"], 1);
    assert!(insertion[0]["insertionId"].is_string());
}

#[test]
fn service_error_fails_without_output() {
    let rt = Runtime::new().unwrap();
    let server = rt.block_on(MockServer::start());
    rt.block_on(async {
        Mock::given(method("POST"))
            .and(path("/deliver"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;
    });

    let mut out = Vec::new();
    let err = run(
        &server_config(&server, Preset::Proto),
        ClientOptions::build,
        &mut out,
    )
    .unwrap_err();

    assert!(matches!(
        err,
        RunError::Delivery(DeliveryError::Http { .. })
    ));
    assert_eq!(err.exit_code(), exit_code::GENERAL_ERROR);
    assert!(err.to_string().contains("boom"));
    assert!(out.is_empty());
}

#[test]
fn grpc_preset_is_rejected_before_any_call() {
    let rt = Runtime::new().unwrap();
    let server = rt.block_on(MockServer::start());
    rt.block_on(async {
        mount_delivery(&server, serde_json::json!({}), 0).await;
        mount_metrics(&server, 0).await;
    });

    let mut out = Vec::new();
    let err = run(
        &server_config(&server, Preset::Grpc),
        ClientOptions::build,
        &mut out,
    )
    .unwrap_err();

    assert!(matches!(
        err,
        RunError::Delivery(DeliveryError::UnsupportedTransport(Transport::Grpc))
    ));
    assert!(out.is_empty());
}
