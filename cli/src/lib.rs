//! Delivery example runner.
//!
//! # Architecture
//!
//! ```text
//! Cli (flags) + defaults file -> ExampleConfig -> validate()
//!        -> client_options() -> connect() -> DeliveryClient
//!        -> sample_delivery_request() -> deliver() -> "response=<json>"
//! ```
//!
//! [`run`] is generic over the client constructor and the output sink so it
//! can be driven by the real HTTP client or a stub.

pub mod args;
pub mod runner;

pub use args::Cli;
pub use delivery_client::{
    DEFAULT_DELIVERY_TIMEOUT, DEFAULT_METRICS_TIMEOUT, DEFAULT_WORKER_THREADS,
};
pub use runner::{
    RunError, client_options, exit_code, render_response, run, sample_delivery_request,
    sample_request,
};
