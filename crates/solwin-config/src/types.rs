//! Configuration types.
//!
//! Nothing here depends on the other solwin crates. Conversion into
//! `EngineConfig`, `EmbedOptions` and the server options happens in the
//! binary. Every struct implements [`Default`] with the same values as the
//! embedded `defaults.toml`, so a bare `[section]` header still works.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Engine endpoint settings.
    pub engine: EngineSection,
    /// Defaults for embedding the engine in a host page.
    pub embed: EmbedSection,
    /// Upstream rate and geocoding services.
    pub regional: RegionalSection,
    /// HTTP delivery server.
    pub server: ServerSection,
    /// Log output.
    pub logging: LoggingSection,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// `[engine]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    /// Milliseconds between start-up and the readiness announcement.
    pub ready_delay_ms: u64,
    /// Version string announced when ready.
    pub version: String,
    /// Capabilities announced when ready.
    pub capabilities: Vec<String>,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            ready_delay_ms: 1000,
            version: "1.0.0".to_owned(),
            capabilities: vec!["solar-analysis".to_owned(), "map-interaction".to_owned()],
        }
    }
}

// ---------------------------------------------------------------------------
// Embed
// ---------------------------------------------------------------------------

/// `[embed]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedSection {
    /// Mount point id used when the caller names none.
    pub container_id: String,
    /// CSS height of the frame.
    pub height: String,
    /// CSS width of the frame.
    pub width: String,
    /// Address the engine starts at.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_location: Option<String>,
}

impl Default for EmbedSection {
    fn default() -> Self {
        Self {
            container_id: "solar-window".to_owned(),
            height: "600px".to_owned(),
            width: "100%".to_owned(),
            default_location: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Regional data
// ---------------------------------------------------------------------------

/// `[regional]` section.
///
/// API keys never appear in `Debug` output or serialized config.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RegionalSection {
    /// EIA API v2 base URL.
    pub eia_base_url: String,
    /// EIA API key.
    pub eia_api_key: Option<String>,
    /// Geocoding API base URL.
    pub geocode_base_url: String,
    /// Maps API key, used for geocoding and forwarded to embeds.
    pub maps_api_key: Option<String>,
    /// Number of monthly records fetched per region.
    pub history_length: u32,
    /// Upstream request timeout.
    pub timeout_secs: u64,
}

impl Default for RegionalSection {
    fn default() -> Self {
        Self {
            eia_base_url: "https://api.eia.gov/v2".to_owned(),
            eia_api_key: None,
            geocode_base_url: "https://maps.googleapis.com/maps/api".to_owned(),
            maps_api_key: None,
            history_length: 5,
            timeout_secs: 30,
        }
    }
}

impl std::fmt::Debug for RegionalSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegionalSection")
            .field("eia_base_url", &self.eia_base_url)
            .field("has_eia_api_key", &self.eia_api_key.is_some())
            .field("geocode_base_url", &self.geocode_base_url)
            .field("has_maps_api_key", &self.maps_api_key.is_some())
            .field("history_length", &self.history_length)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Serialize for RegionalSection {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("RegionalSection", 4)?;
        state.serialize_field("eia_base_url", &self.eia_base_url)?;
        state.serialize_field("geocode_base_url", &self.geocode_base_url)?;
        // Keys are omitted.
        state.serialize_field("history_length", &self.history_length)?;
        state.serialize_field("timeout_secs", &self.timeout_secs)?;
        state.end()
    }
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

/// `[server]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Socket address to listen on.
    pub bind: String,
    /// Serve the helper script with `no-cache`.
    pub dev_mode: bool,
    /// `max-age` of the helper script outside dev mode.
    pub cache_max_age_secs: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_owned(),
            dev_mode: false,
            cache_max_age_secs: 3600,
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// One of `trace`, `debug`, `info`, `warn`, `error`.
    pub level: String,
    /// One of `pretty`, `compact`, `json`, `full`.
    pub format: String,
    /// Extra filter directives such as `solwin_engine=debug`.
    pub directives: Vec<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "compact".to_owned(),
            directives: Vec::new(),
        }
    }
}
