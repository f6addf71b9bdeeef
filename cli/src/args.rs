use clap::Parser;
use delivery_config::{ConfigError, ConfigLayer, ExampleConfig, Preset};
use std::path::PathBuf;

/// Command-line flags. Unset flags fall back to the defaults file, then to
/// the preset.
#[derive(Parser, Debug, Default)]
#[command(name = "delivery-example")]
#[command(about = "Build a sample search request and print the delivery response")]
#[command(version)]
pub struct Cli {
    /// Metrics API endpoint URL, e.g. https://.../log
    #[arg(long = "metricsApiEndpointUrl", value_name = "URL")]
    pub metrics_api_endpoint_url: Option<String>,

    /// Metrics API key
    #[arg(long = "metricsApiKey", value_name = "KEY")]
    pub metrics_api_key: Option<String>,

    /// Delivery API endpoint URL, e.g. https://.../deliver
    #[arg(long = "deliveryApiEndpointUrl", value_name = "URL")]
    pub delivery_api_endpoint_url: Option<String>,

    /// Delivery API key
    #[arg(long = "deliveryApiKey", value_name = "KEY")]
    pub delivery_api_key: Option<String>,

    /// Only log the call; do not let the delivery service reorder insertions
    #[arg(long = "onlyLog", value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub only_log: Option<bool>,

    /// Warm up client connections before the call
    #[arg(long = "warmup", value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub warmup: Option<bool>,

    /// Fraction of traffic mirrored as shadow calls (0.0 - 1.0)
    #[arg(long = "shadowTrafficDeliveryRate", value_name = "RATE")]
    pub shadow_traffic_delivery_rate: Option<f32>,

    /// Whether shadow calls block the main call
    #[arg(long = "blockingShadowTraffic", value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub blocking_shadow_traffic: Option<bool>,

    /// Use the gRPC transport instead of HTTP/JSON
    #[arg(long = "useGrpc", value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub use_grpc: Option<bool>,

    /// Example variant: json, proto, or grpc
    #[arg(long, value_name = "PRESET", value_parser = parse_preset)]
    pub preset: Option<Preset>,

    /// Defaults file (default: ~/.delivery-example.toml when present)
    #[arg(long, value_name = "PATH")]
    pub defaults: Option<PathBuf>,
}

impl Cli {
    /// The flag layer; only flags given on the command line are set.
    #[must_use]
    pub fn layer(&self) -> ConfigLayer {
        ConfigLayer {
            metrics_api_endpoint_url: self.metrics_api_endpoint_url.clone(),
            metrics_api_key: self.metrics_api_key.clone(),
            delivery_api_endpoint_url: self.delivery_api_endpoint_url.clone(),
            delivery_api_key: self.delivery_api_key.clone(),
            only_log: self.only_log,
            warmup: self.warmup,
            shadow_traffic_delivery_rate: self.shadow_traffic_delivery_rate,
            blocking_shadow_traffic: self.blocking_shadow_traffic,
            use_grpc: self.use_grpc,
            preset: self.preset,
        }
    }

    /// Load the defaults file and resolve the final configuration.
    ///
    /// An explicit `--defaults` path must exist; the implicit home-directory
    /// file is optional.
    pub fn resolve_config(&self) -> Result<ExampleConfig, ConfigError> {
        let defaults = match &self.defaults {
            Some(path) => Some(ConfigLayer::load(path)?),
            None => ConfigLayer::load_default()?,
        };
        Ok(ExampleConfig::resolve(
            defaults.unwrap_or_default().merge(self.layer()),
        ))
    }
}

fn parse_preset(s: &str) -> Result<Preset, String> {
    Preset::try_from(s.to_string())
}
