//! JSON-over-HTTP delivery binding.

use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use delivery_types::{DeliveryRequest, DeliveryResponse, ExecutionServer, Request, Response, Timing};
use uuid::Uuid;

use crate::sdk::{LogRequest, deliver_locally};
use crate::{ClientOptions, DeliveryClient, DeliveryError};

const API_KEY_HEADER: &str = "x-api-key";

const CONNECT_TIMEOUT_SECS: u64 = 10;
const WARMUP_TIMEOUT: Duration = Duration::from_secs(1);

// Note: reqwest only exposes tcp_keepalive (idle time); interval/retries use platform defaults.
const TCP_KEEPALIVE_SECS: u64 = 60;

const POOL_MAX_IDLE_PER_HOST: usize = 16;
const POOL_IDLE_TIMEOUT_SECS: u64 = 90;

const MAX_ERROR_BODY_BYTES: usize = 32 * 1024;

fn base_client_builder() -> reqwest::ClientBuilder {
    use reqwest::header::{HeaderMap, HeaderValue};

    let mut default_headers = HeaderMap::new();
    default_headers.insert("X-Client-Lang", HeaderValue::from_static("rust"));
    default_headers.insert(
        "X-Client-OS",
        HeaderValue::from_static(std::env::consts::OS),
    );

    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .redirect(reqwest::redirect::Policy::none())
        .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))
        .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
        .pool_idle_timeout(Some(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS)))
        .default_headers(default_headers)
}

/// Health URL next to the delivery endpoint (`.../deliver` -> `.../healthz`).
fn healthz_url(delivery_endpoint: &str) -> String {
    let trimmed = delivery_endpoint.trim().trim_end_matches('/');
    match trimmed.strip_suffix("/deliver") {
        Some(base) => format!("{base}/healthz"),
        None => format!("{trimmed}/healthz"),
    }
}

fn send_error(url: &str, timeout: Duration, err: reqwest::Error) -> DeliveryError {
    if err.is_timeout() {
        DeliveryError::Timeout {
            url: url.to_string(),
            timeout,
        }
    } else {
        DeliveryError::Connection {
            url: url.to_string(),
            source: err,
        }
    }
}

pub(crate) async fn read_capped_error_body(response: reqwest::Response) -> String {
    use futures_util::StreamExt;
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let Ok(chunk) = chunk else { break };
        body.extend_from_slice(&chunk);
        if body.len() > MAX_ERROR_BODY_BYTES {
            body.truncate(MAX_ERROR_BODY_BYTES);
            let text = String::from_utf8_lossy(&body);
            return format!("{text}...(truncated)");
        }
    }
    String::from_utf8_lossy(&body).into_owned()
}

/// Delivery client speaking JSON over HTTP.
#[derive(Debug, Clone)]
pub struct HttpDeliveryClient {
    http: reqwest::Client,
    options: ClientOptions,
}

impl HttpDeliveryClient {
    pub fn new(options: ClientOptions) -> Result<Self, DeliveryError> {
        options.check()?;

        if options.shadow_traffic_delivery_rate > 0.0 {
            tracing::warn!(
                rate = options.shadow_traffic_delivery_rate,
                blocking = options.blocking_shadow_traffic,
                "Shadow traffic is not mirrored by the HTTP binding; ignoring"
            );
        }

        let http = base_client_builder()
            .build()
            .map_err(DeliveryError::Build)?;

        tracing::debug!(
            delivery_endpoint = %options.delivery_endpoint,
            metrics_endpoint = %options.metrics_endpoint,
            delivery_timeout_ms = options.delivery_timeout.as_millis(),
            metrics_timeout_ms = options.metrics_timeout.as_millis(),
            "Delivery client ready"
        );

        Ok(Self { http, options })
    }

    #[must_use]
    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    async fn deliver_once(
        &self,
        request: DeliveryRequest,
    ) -> Result<DeliveryResponse, DeliveryError> {
        let DeliveryRequest {
            mut request,
            only_log,
            retrieval_insertion_offset,
        } = request;
        request.validate()?;

        let client_request_id = request
            .client_request_id
            .get_or_insert_with(|| Uuid::new_v4().to_string())
            .clone();
        request.timing.get_or_insert_with(|| Timing {
            client_log_timestamp: Utc::now().timestamp_millis(),
        });

        if only_log {
            let response = deliver_locally(&request, retrieval_insertion_offset);
            self.log_to_metrics(&LogRequest::for_local_delivery(&request, &response))
                .await;
            return Ok(DeliveryResponse {
                response,
                client_request_id,
                execution_server: ExecutionServer::Sdk,
            });
        }

        let response = self.call_delivery(&request).await?;
        Ok(DeliveryResponse {
            response,
            client_request_id,
            execution_server: ExecutionServer::Api,
        })
    }

    async fn call_delivery(&self, request: &Request) -> Result<Response, DeliveryError> {
        let url = self.options.delivery_endpoint.as_str();
        let timeout = self.options.delivery_timeout;

        tracing::debug!(
            url,
            insertions = request.insertion.len(),
            client_request_id = request.client_request_id.as_deref().unwrap_or_default(),
            "Sending delivery request"
        );

        let response = self
            .http
            .post(url)
            .header(API_KEY_HEADER, self.options.delivery_api_key.as_str())
            .timeout(timeout)
            .json(request)
            .send()
            .await
            .map_err(|err| send_error(url, timeout, err))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = read_capped_error_body(response).await;
            return Err(DeliveryError::Http { status, body });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|err| send_error(url, timeout, err))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Best-effort; failures are logged, never returned.
    async fn log_to_metrics(&self, log: &LogRequest<'_>) {
        let url = self.options.metrics_endpoint.as_str();
        let timeout = self.options.metrics_timeout;

        let result = self
            .http
            .post(url)
            .header(API_KEY_HEADER, self.options.metrics_api_key.as_str())
            .timeout(timeout)
            .json(log)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                tracing::debug!(url, "Logged delivery to metrics");
            }
            Ok(response) => {
                let status = response.status();
                let body = read_capped_error_body(response).await;
                tracing::warn!(url, %status, body = %body, "Metrics service rejected log request");
            }
            Err(err) => {
                let error = send_error(url, timeout, err);
                tracing::warn!(%error, "Failed to log delivery to metrics");
            }
        }
    }

    async fn warm_up_connections(&self) {
        if !self.options.warmup {
            return;
        }

        let url = healthz_url(&self.options.delivery_endpoint);
        let attempts = (0..self.options.worker_threads).map(|_| {
            self.http
                .get(&url)
                .header(API_KEY_HEADER, self.options.delivery_api_key.as_str())
                .timeout(WARMUP_TIMEOUT)
                .send()
        });
        let results = futures_util::future::join_all(attempts).await;

        let mut opened = 0usize;
        for result in results {
            match result {
                Ok(_) => opened += 1,
                Err(err) => tracing::debug!(%err, url = %url, "Warmup request failed"),
            }
        }
        tracing::info!(opened, url = %url, "Delivery client warmed up");
    }
}

impl DeliveryClient for HttpDeliveryClient {
    fn deliver(
        &self,
        request: DeliveryRequest,
    ) -> impl Future<Output = Result<DeliveryResponse, DeliveryError>> + Send {
        self.deliver_once(request)
    }

    fn warm_up(&self) -> impl Future<Output = ()> + Send {
        self.warm_up_connections()
    }
}
