//! Domain types for delivery requests.
//!
//! This crate contains the request/response model with no IO, no async, and
//! minimal dependencies. It serialises to the camelCase JSON shape the
//! delivery and metrics services accept.

mod request;
mod response;

pub use request::{
    Insertion, Paging, Properties, Request, RequestError, Timing, UseCase, UserInfo,
};
pub use response::{PagingInfo, Response};

use serde::{Deserialize, Serialize};

// ============================================================================
// API Key
// ============================================================================

/// Credential for one of the remote services.
///
/// `Debug` prints a redacted placeholder, never the key.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct ApiKey(String);

impl ApiKey {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            write!(f, "ApiKey(<empty>)")
        } else {
            write!(f, "ApiKey(<redacted>)")
        }
    }
}

// ============================================================================
// Transport
// ============================================================================

/// Wire binding used to reach the delivery service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Transport {
    /// JSON over HTTP.
    #[default]
    Json,
    /// Protocol buffers over gRPC.
    Grpc,
}

impl Transport {
    #[must_use]
    pub const fn from_use_grpc(use_grpc: bool) -> Self {
        if use_grpc { Self::Grpc } else { Self::Json }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Grpc => "grpc",
        }
    }
}

impl std::fmt::Display for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Delivery envelope
// ============================================================================

/// Which tier produced a [`DeliveryResponse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExecutionServer {
    /// The remote delivery service ranked the insertions.
    Api,
    /// The client answered locally (only-log mode).
    Sdk,
}

impl ExecutionServer {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Api => "API",
            Self::Sdk => "SDK",
        }
    }
}

impl std::fmt::Display for ExecutionServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A [`Request`] plus the per-call knobs the client needs.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryRequest {
    pub request: Request,
    /// Record the request without letting the delivery service reorder it.
    pub only_log: bool,
    /// Position of the first insertion within the caller's full result list.
    pub retrieval_insertion_offset: u32,
}

impl DeliveryRequest {
    #[must_use]
    pub fn new(request: Request, only_log: bool) -> Self {
        Self {
            request,
            only_log,
            retrieval_insertion_offset: 0,
        }
    }
}

/// Result of a delivery call. Read-only once returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryResponse {
    pub response: Response,
    pub client_request_id: String,
    pub execution_server: ExecutionServer,
}
