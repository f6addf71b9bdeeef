use std::io::Write;

use delivery_client::{
    ClientOptions, DEFAULT_DELIVERY_TIMEOUT, DEFAULT_METRICS_TIMEOUT, DEFAULT_WORKER_THREADS,
    DeliveryClient, DeliveryError,
};
use delivery_config::{ConfigError, ExampleConfig, Preset};
use delivery_types::{
    DeliveryRequest, DeliveryResponse, Insertion, Paging, Request, UseCase, UserInfo,
};
use thiserror::Error;

const SAMPLE_ANON_USER_ID: &str = "anonUserId1";
const SAMPLE_QUERY: &str = "query";
const SAMPLE_INSERTIONS: u32 = 3;

pub mod exit_code {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_CONFIG: u8 = 2;
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("delivery call failed: {0}")]
    Delivery(#[from] DeliveryError),
    #[error("failed to start worker pool: {0}")]
    Runtime(#[source] std::io::Error),
    #[error("failed to format response: {0}")]
    Format(#[from] serde_json::Error),
    #[error("failed to write response: {0}")]
    Output(#[source] std::io::Error),
}

impl RunError {
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            RunError::Config(_) => exit_code::INVALID_CONFIG,
            _ => exit_code::GENERAL_ERROR,
        }
    }
}

/// Map the configuration onto the client's builder options.
///
/// Pool size and timeouts are fixed by the example; everything else comes
/// from the configuration.
#[must_use]
pub fn client_options(config: &ExampleConfig) -> ClientOptions {
    ClientOptions::default()
        .with_worker_threads(DEFAULT_WORKER_THREADS)
        .with_delivery_endpoint(config.delivery_api_endpoint_url.trim())
        .with_delivery_api_key(config.delivery_api_key.clone())
        .with_delivery_timeout(DEFAULT_DELIVERY_TIMEOUT)
        .with_metrics_endpoint(config.metrics_api_endpoint_url.trim())
        .with_metrics_api_key(config.metrics_api_key.clone())
        .with_metrics_timeout(DEFAULT_METRICS_TIMEOUT)
        .with_warmup(config.warmup)
        .with_shadow_traffic_delivery_rate(config.shadow_traffic_delivery_rate)
        .with_blocking_shadow_traffic(config.blocking_shadow_traffic)
        .with_transport(config.transport)
}

/// The fixed sample search request for a preset. Same values every run.
#[must_use]
pub fn sample_request(preset: Preset) -> Request {
    let mut request = Request::new(
        UserInfo::anonymous(SAMPLE_ANON_USER_ID),
        UseCase::Search,
        Paging::new(0, preset.page_size()),
    )
    .with_search_query(SAMPLE_QUERY);

    let first = preset.first_content_index();
    for rank in 0..SAMPLE_INSERTIONS {
        request.add_insertion(Insertion::new(format!("content{}", first + rank), rank));
    }
    request
}

#[must_use]
pub fn sample_delivery_request(config: &ExampleConfig) -> DeliveryRequest {
    DeliveryRequest::new(sample_request(config.preset), config.only_log)
}

pub fn render_response(response: &DeliveryResponse) -> Result<String, serde_json::Error> {
    Ok(format!("response={}", serde_json::to_string_pretty(response)?))
}

/// Validate, build the client, issue exactly one delivery call, and print it.
///
/// `connect` is never called when validation fails. Nothing is written to
/// `out` unless the call succeeds.
pub fn run<C, F, W>(config: &ExampleConfig, connect: F, out: &mut W) -> Result<(), RunError>
where
    C: DeliveryClient,
    F: FnOnce(ClientOptions) -> Result<C, DeliveryError>,
    W: Write,
{
    config.validate()?;

    let options = client_options(config);
    let worker_threads = options.worker_threads;
    let client = connect(options)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .thread_name("delivery-worker")
        .enable_all()
        .build()
        .map_err(RunError::Runtime)?;

    let request = sample_delivery_request(config);
    tracing::info!(
        preset = %config.preset,
        only_log = request.only_log,
        transport = %config.transport,
        insertions = request.request.insertion.len(),
        "Issuing delivery request"
    );

    let response = runtime.block_on(async {
        client.warm_up().await;
        client.deliver(request).await
    })?;

    tracing::info!(
        execution_server = %response.execution_server,
        client_request_id = %response.client_request_id,
        "Delivery complete"
    );

    let rendered = render_response(&response)?;
    writeln!(out, "{rendered}").map_err(RunError::Output)?;
    out.flush().map_err(RunError::Output)?;
    Ok(())
}
