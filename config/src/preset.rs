use serde::Deserialize;

/// One of the documented example variants.
///
/// The variants disagree on a few defaults and on the shape of the sample
/// request. Each is kept as-is rather than reconciled:
///
/// | Preset  | `onlyLog` | `useGrpc` | page size | first content id |
/// |---------|-----------|-----------|-----------|------------------|
/// | `json`  | true      | false     | 2         | `content0`       |
/// | `proto` | false     | false     | 3         | `content1`       |
/// | `grpc`  | false     | true      | 2         | `content0`       |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum Preset {
    #[default]
    Json,
    Proto,
    Grpc,
}

impl Preset {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "proto" | "protobuf" => Some(Self::Proto),
            "grpc" => Some(Self::Grpc),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Proto => "proto",
            Self::Grpc => "grpc",
        }
    }

    #[must_use]
    pub const fn only_log_default(self) -> bool {
        matches!(self, Self::Json)
    }

    #[must_use]
    pub const fn use_grpc_default(self) -> bool {
        matches!(self, Self::Grpc)
    }

    #[must_use]
    pub const fn page_size(self) -> u32 {
        match self {
            Self::Proto => 3,
            Self::Json | Self::Grpc => 2,
        }
    }

    /// Suffix of the first sample content id (`content0` or `content1`).
    #[must_use]
    pub const fn first_content_index(self) -> u32 {
        match self {
            Self::Proto => 1,
            Self::Json | Self::Grpc => 0,
        }
    }

    #[must_use]
    pub fn all() -> &'static [Preset] {
        &[Preset::Json, Preset::Proto, Preset::Grpc]
    }
}

impl TryFrom<String> for Preset {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
            .ok_or_else(|| format!("unknown preset '{value}' (expected json, proto, or grpc)"))
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
