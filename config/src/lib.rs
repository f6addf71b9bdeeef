//! Configuration for the delivery example.
//!
//! A value is resolved from three layers, lowest priority first:
//!
//! 1. the [`Preset`] default,
//! 2. the defaults file (`~/.delivery-example.toml` or `--defaults <path>`),
//! 3. command-line flags.
//!
//! Each layer is a [`ConfigLayer`] with all-optional fields. The defaults file
//! is a flat list of `key = value` pairs keyed by flag name:
//!
//! ```toml
//! deliveryApiEndpointUrl = "https://delivery.example.com/deliver"
//! deliveryApiKey = "..."
//! metricsApiEndpointUrl = "https://metrics.example.com/log"
//! metricsApiKey = "..."
//! onlyLog = false
//! preset = "proto"
//! ```

mod preset;

pub use delivery_types::Transport;
pub use preset::Preset;

use delivery_types::ApiKey;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULTS_FILE_NAME: &str = ".delivery-example.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{} needs to be specified", .0.join(", "))]
    Missing(Vec<&'static str>),
    #[error("{field} is not a valid URL ({value}): {source}")]
    InvalidEndpoint {
        field: &'static str,
        value: String,
        source: url::ParseError,
    },
    #[error("{field} must use http or https (got {scheme})")]
    UnsupportedScheme { field: &'static str, scheme: String },
    #[error("shadowTrafficDeliveryRate must be between 0.0 and 1.0 (got {0})")]
    InvalidShadowRate(f32),
    #[error("failed to read defaults file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse defaults file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// One source of configuration values. Unset fields defer to lower layers.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigLayer {
    pub metrics_api_endpoint_url: Option<String>,
    pub metrics_api_key: Option<String>,
    pub delivery_api_endpoint_url: Option<String>,
    pub delivery_api_key: Option<String>,
    pub only_log: Option<bool>,
    pub warmup: Option<bool>,
    pub shadow_traffic_delivery_rate: Option<f32>,
    pub blocking_shadow_traffic: Option<bool>,
    pub use_grpc: Option<bool>,
    pub preset: Option<Preset>,
}

impl ConfigLayer {
    /// Overlay `other` on top of `self`; values set in `other` win.
    #[must_use]
    pub fn merge(self, other: ConfigLayer) -> ConfigLayer {
        ConfigLayer {
            metrics_api_endpoint_url: other
                .metrics_api_endpoint_url
                .or(self.metrics_api_endpoint_url),
            metrics_api_key: other.metrics_api_key.or(self.metrics_api_key),
            delivery_api_endpoint_url: other
                .delivery_api_endpoint_url
                .or(self.delivery_api_endpoint_url),
            delivery_api_key: other.delivery_api_key.or(self.delivery_api_key),
            only_log: other.only_log.or(self.only_log),
            warmup: other.warmup.or(self.warmup),
            shadow_traffic_delivery_rate: other
                .shadow_traffic_delivery_rate
                .or(self.shadow_traffic_delivery_rate),
            blocking_shadow_traffic: other
                .blocking_shadow_traffic
                .or(self.blocking_shadow_traffic),
            use_grpc: other.use_grpc.or(self.use_grpc),
            preset: other.preset.or(self.preset),
        }
    }

    pub fn parse(path: &Path, content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load an explicitly named defaults file. A missing file is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read defaults file at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        Self::parse(path, &content).inspect_err(|err| {
            tracing::warn!("Failed to parse defaults file at {:?}: {}", path, err);
        })
    }

    /// Load the implicit defaults file from the home directory, if present.
    pub fn load_default() -> Result<Option<Self>, ConfigError> {
        let path = match defaults_path() {
            Some(path) => path,
            None => return Ok(None),
        };
        if !path.exists() {
            return Ok(None);
        }
        Self::load(&path).map(Some)
    }
}

#[must_use]
pub fn defaults_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(DEFAULTS_FILE_NAME))
}

/// Fully resolved configuration. Immutable for the process lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct ExampleConfig {
    pub preset: Preset,
    pub metrics_api_endpoint_url: String,
    pub metrics_api_key: ApiKey,
    pub delivery_api_endpoint_url: String,
    pub delivery_api_key: ApiKey,
    pub only_log: bool,
    pub warmup: bool,
    pub shadow_traffic_delivery_rate: f32,
    pub blocking_shadow_traffic: bool,
    pub transport: Transport,
}

impl ExampleConfig {
    /// Resolve the preset defaults under the merged layers.
    #[must_use]
    pub fn resolve(layer: ConfigLayer) -> Self {
        let preset = layer.preset.unwrap_or_default();
        Self {
            preset,
            metrics_api_endpoint_url: layer.metrics_api_endpoint_url.unwrap_or_default(),
            metrics_api_key: ApiKey::new(layer.metrics_api_key.unwrap_or_default()),
            delivery_api_endpoint_url: layer.delivery_api_endpoint_url.unwrap_or_default(),
            delivery_api_key: ApiKey::new(layer.delivery_api_key.unwrap_or_default()),
            only_log: layer.only_log.unwrap_or(preset.only_log_default()),
            warmup: layer.warmup.unwrap_or(false),
            shadow_traffic_delivery_rate: layer.shadow_traffic_delivery_rate.unwrap_or(0.0),
            blocking_shadow_traffic: layer.blocking_shadow_traffic.unwrap_or(false),
            transport: Transport::from_use_grpc(
                layer.use_grpc.unwrap_or(preset.use_grpc_default()),
            ),
        }
    }

    /// Check the configuration before anything touches the network.
    ///
    /// All missing required fields are reported together.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut missing = Vec::new();
        if self.delivery_api_endpoint_url.trim().is_empty() {
            missing.push("deliveryApiEndpointUrl");
        }
        if self.delivery_api_key.is_empty() {
            missing.push("deliveryApiKey");
        }
        if self.metrics_api_endpoint_url.trim().is_empty() {
            missing.push("metricsApiEndpointUrl");
        }
        if self.metrics_api_key.is_empty() {
            missing.push("metricsApiKey");
        }
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        check_endpoint("deliveryApiEndpointUrl", &self.delivery_api_endpoint_url)?;
        check_endpoint("metricsApiEndpointUrl", &self.metrics_api_endpoint_url)?;

        if !(0.0..=1.0).contains(&self.shadow_traffic_delivery_rate) {
            return Err(ConfigError::InvalidShadowRate(
                self.shadow_traffic_delivery_rate,
            ));
        }

        Ok(())
    }
}

fn check_endpoint(field: &'static str, value: &str) -> Result<(), ConfigError> {
    let url = url::Url::parse(value.trim()).map_err(|source| ConfigError::InvalidEndpoint {
        field,
        value: value.to_string(),
        source,
    })?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::UnsupportedScheme {
            field,
            scheme: other.to_string(),
        }),
    }
}
