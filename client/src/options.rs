use std::time::Duration;

use delivery_types::{ApiKey, Transport};

use crate::{DeliveryError, HttpDeliveryClient};

/// Size of the worker pool handed to the async runtime driving the client.
pub const DEFAULT_WORKER_THREADS: usize = 2;
/// Per-call budget for the delivery service.
pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_millis(250);
/// Per-call budget for the metrics service.
pub const DEFAULT_METRICS_TIMEOUT: Duration = Duration::from_millis(1000);

/// Every option a delivery client is built from.
///
/// Options are enumerated and defaulted explicitly; set them with the
/// `with_*` methods and finish with [`build`](ClientOptions::build).
///
/// ```ignore
/// let client = ClientOptions::default()
///     .with_delivery_endpoint("https://delivery.example.com/deliver")
///     .with_delivery_api_key(ApiKey::new("..."))
///     .with_metrics_endpoint("https://metrics.example.com/log")
///     .with_metrics_api_key(ApiKey::new("..."))
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClientOptions {
    pub worker_threads: usize,
    pub delivery_endpoint: String,
    pub delivery_api_key: ApiKey,
    pub delivery_timeout: Duration,
    pub metrics_endpoint: String,
    pub metrics_api_key: ApiKey,
    pub metrics_timeout: Duration,
    pub warmup: bool,
    pub shadow_traffic_delivery_rate: f32,
    pub blocking_shadow_traffic: bool,
    pub transport: Transport,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            worker_threads: DEFAULT_WORKER_THREADS,
            delivery_endpoint: String::new(),
            delivery_api_key: ApiKey::default(),
            delivery_timeout: DEFAULT_DELIVERY_TIMEOUT,
            metrics_endpoint: String::new(),
            metrics_api_key: ApiKey::default(),
            metrics_timeout: DEFAULT_METRICS_TIMEOUT,
            warmup: false,
            shadow_traffic_delivery_rate: 0.0,
            blocking_shadow_traffic: false,
            transport: Transport::Json,
        }
    }
}

impl ClientOptions {
    pub fn with_worker_threads(mut self, worker_threads: usize) -> Self {
        self.worker_threads = worker_threads;
        self
    }

    pub fn with_delivery_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.delivery_endpoint = endpoint.into();
        self
    }

    pub fn with_delivery_api_key(mut self, key: ApiKey) -> Self {
        self.delivery_api_key = key;
        self
    }

    pub fn with_delivery_timeout(mut self, timeout: Duration) -> Self {
        self.delivery_timeout = timeout;
        self
    }

    pub fn with_metrics_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.metrics_endpoint = endpoint.into();
        self
    }

    pub fn with_metrics_api_key(mut self, key: ApiKey) -> Self {
        self.metrics_api_key = key;
        self
    }

    pub fn with_metrics_timeout(mut self, timeout: Duration) -> Self {
        self.metrics_timeout = timeout;
        self
    }

    pub fn with_warmup(mut self, warmup: bool) -> Self {
        self.warmup = warmup;
        self
    }

    pub fn with_shadow_traffic_delivery_rate(mut self, rate: f32) -> Self {
        self.shadow_traffic_delivery_rate = rate;
        self
    }

    pub fn with_blocking_shadow_traffic(mut self, blocking: bool) -> Self {
        self.blocking_shadow_traffic = blocking;
        self
    }

    pub fn with_transport(mut self, transport: Transport) -> Self {
        self.transport = transport;
        self
    }

    pub(crate) fn check(&self) -> Result<(), DeliveryError> {
        if self.worker_threads == 0 {
            return Err(DeliveryError::InvalidOptions(
                "worker_threads must be at least 1".to_string(),
            ));
        }
        if self.delivery_endpoint.trim().is_empty() {
            return Err(DeliveryError::InvalidOptions(
                "delivery endpoint is empty".to_string(),
            ));
        }
        if self.metrics_endpoint.trim().is_empty() {
            return Err(DeliveryError::InvalidOptions(
                "metrics endpoint is empty".to_string(),
            ));
        }
        if self.delivery_timeout.is_zero() || self.metrics_timeout.is_zero() {
            return Err(DeliveryError::InvalidOptions(
                "timeouts must be non-zero".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.shadow_traffic_delivery_rate) {
            return Err(DeliveryError::InvalidOptions(format!(
                "shadow traffic delivery rate must be between 0.0 and 1.0 (got {})",
                self.shadow_traffic_delivery_rate
            )));
        }
        if self.transport != Transport::Json {
            return Err(DeliveryError::UnsupportedTransport(self.transport));
        }
        Ok(())
    }

    /// Build the HTTP/JSON client. gRPC has no binding here and is rejected.
    pub fn build(self) -> Result<HttpDeliveryClient, DeliveryError> {
        HttpDeliveryClient::new(self)
    }
}
