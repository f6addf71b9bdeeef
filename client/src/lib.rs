//! Delivery client seam.
//!
//! # Architecture
//!
//! - [`DeliveryClient`] - the trait the example runner calls through
//! - [`ClientOptions`] - flat builder configuration for constructing a client
//! - [`HttpDeliveryClient`] - JSON-over-HTTP binding built from [`ClientOptions`]
//!
//! The HTTP binding performs a single attempt per call. There is no retry, no
//! fallback to client-side delivery after a failure, and no shadow-traffic
//! fan-out; those options are carried so callers can configure them, but this
//! binding only logs them.
//!
//! # Only-log mode
//!
//! When [`DeliveryRequest::only_log`] is set, the delivery service is not
//! called. The client answers locally with the requested page in retrieval
//! order and records the request with the metrics service.
//!
//! # Error Handling
//!
//! Every failure surfaces as a [`DeliveryError`]. Metrics logging in only-log
//! mode is the one exception: it is best-effort and only logged at `warn`.

mod http;
mod options;
mod sdk;

use std::future::Future;
use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

pub use delivery_types;
pub use delivery_types::{DeliveryRequest, DeliveryResponse, ExecutionServer, Transport};
pub use http::HttpDeliveryClient;
pub use options::{
    ClientOptions, DEFAULT_DELIVERY_TIMEOUT, DEFAULT_METRICS_TIMEOUT, DEFAULT_WORKER_THREADS,
};

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("invalid delivery request: {0}")]
    InvalidRequest(#[from] delivery_types::RequestError),
    #[error("invalid client options: {0}")]
    InvalidOptions(String),
    #[error("{0} transport is not available in this build")]
    UnsupportedTransport(Transport),
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
    #[error("request to {url} timed out after {}ms", timeout.as_millis())]
    Timeout { url: String, timeout: Duration },
    #[error("request to {url} failed: {source}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("API error {status}: {body}")]
    Http { status: StatusCode, body: String },
    #[error("failed to decode delivery response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A client that can answer delivery requests.
///
/// Implementations own their connection handling. Callers issue one
/// [`deliver`](DeliveryClient::deliver) per request and await the result.
pub trait DeliveryClient {
    fn deliver(
        &self,
        request: DeliveryRequest,
    ) -> impl Future<Output = Result<DeliveryResponse, DeliveryError>> + Send;

    /// Open connections ahead of the first call. No-op unless the client was
    /// configured for warmup.
    fn warm_up(&self) -> impl Future<Output = ()> + Send {
        async {}
    }
}
