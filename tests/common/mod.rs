//! Shared test utilities and fixtures
//!
//! A recording stub client for driving the runner without a network, plus
//! configuration builders and mock server helpers.

#![allow(dead_code)]

use std::future::{Future, ready};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use delivery_client::{DeliveryClient, DeliveryError};
use delivery_config::{ConfigLayer, ExampleConfig, Preset};
use delivery_types::{
    DeliveryRequest, DeliveryResponse, ExecutionServer, Insertion, PagingInfo, Response,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Stub client
// ============================================================================

#[derive(Debug)]
enum Reply {
    Respond(DeliveryResponse),
    TimeOut,
}

#[derive(Debug)]
struct StubState {
    reply: Reply,
    requests: Mutex<Vec<DeliveryRequest>>,
    warm_ups: AtomicUsize,
}

/// Records every request it sees and answers with a canned reply.
#[derive(Debug, Clone)]
pub struct StubClient {
    state: Arc<StubState>,
}

impl StubClient {
    pub fn responding(response: DeliveryResponse) -> Self {
        Self::with_reply(Reply::Respond(response))
    }

    /// A client whose every call fails with a delivery timeout.
    pub fn timing_out() -> Self {
        Self::with_reply(Reply::TimeOut)
    }

    fn with_reply(reply: Reply) -> Self {
        Self {
            state: Arc::new(StubState {
                reply,
                requests: Mutex::new(Vec::new()),
                warm_ups: AtomicUsize::new(0),
            }),
        }
    }

    pub fn requests(&self) -> Vec<DeliveryRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn warm_ups(&self) -> usize {
        self.state.warm_ups.load(Ordering::SeqCst)
    }
}

impl DeliveryClient for StubClient {
    fn deliver(
        &self,
        request: DeliveryRequest,
    ) -> impl Future<Output = Result<DeliveryResponse, DeliveryError>> + Send {
        self.state.requests.lock().unwrap().push(request);
        let result = match &self.state.reply {
            Reply::Respond(response) => Ok(response.clone()),
            Reply::TimeOut => Err(DeliveryError::Timeout {
                url: "http://stub.invalid/deliver".to_string(),
                timeout: Duration::from_millis(250),
            }),
        };
        ready(result)
    }

    fn warm_up(&self) -> impl Future<Output = ()> + Send {
        self.state.warm_ups.fetch_add(1, Ordering::SeqCst);
        ready(())
    }
}

/// A response as the delivery service would return it.
pub fn api_response(client_request_id: &str) -> DeliveryResponse {
    let mut first = Insertion::new("content2", 2);
    first.insertion_id = Some("ins-a".to_string());
    first.position = Some(0);
    let mut second = Insertion::new("content0", 0);
    second.insertion_id = Some("ins-b".to_string());
    second.position = Some(1);

    DeliveryResponse {
        response: Response {
            request_id: Some("req-123".to_string()),
            insertion: vec![first, second],
            paging_info: Some(PagingInfo {
                paging_id: Some("page-1".to_string()),
                cursor: None,
            }),
        },
        client_request_id: client_request_id.to_string(),
        execution_server: ExecutionServer::Api,
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// A layer with every required field set.
pub fn complete_layer(delivery_url: &str, metrics_url: &str) -> ConfigLayer {
    ConfigLayer {
        delivery_api_endpoint_url: Some(delivery_url.to_string()),
        delivery_api_key: Some("delivery-key".to_string()),
        metrics_api_endpoint_url: Some(metrics_url.to_string()),
        metrics_api_key: Some("metrics-key".to_string()),
        ..ConfigLayer::default()
    }
}

pub fn config_for(preset: Preset) -> ExampleConfig {
    ExampleConfig::resolve(ConfigLayer {
        preset: Some(preset),
        ..complete_layer(
            "https://delivery.example.com/deliver",
            "https://metrics.example.com/log",
        )
    })
}

// ============================================================================
// Mock server
// ============================================================================

/// Mount a delivery endpoint that answers with `body`.
pub async fn mount_delivery(server: &MockServer, body: serde_json::Value, expected: u64) {
    Mock::given(method("POST"))
        .and(path("/deliver"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(expected)
        .mount(server)
        .await;
}

/// Mount a metrics endpoint that accepts log requests.
pub async fn mount_metrics(server: &MockServer, expected: u64) {
    Mock::given(method("POST"))
        .and(path("/log"))
        .respond_with(ResponseTemplate::new(200))
        .expect(expected)
        .mount(server)
        .await;
}
