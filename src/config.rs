use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::core::gesture::GestureThresholds;
use crate::core::view_state::FetchDefaults;
use crate::models::{Coordinates, SortOrder};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub directory: DirectorySettings,
    #[serde(default)]
    pub overpass: OverpassSettings,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub gesture: GestureThresholds,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

#[derive(Debug, Clone, Deserialize)]
pub struct DirectorySettings {
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OverpassSettings {
    #[serde(default = "default_overpass_enabled")]
    pub enabled: bool,
    #[serde(default = "default_overpass_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_tag_filters")]
    pub tag_filters: Vec<String>,
}

impl Default for OverpassSettings {
    fn default() -> Self {
        Self {
            enabled: default_overpass_enabled(),
            endpoint: default_overpass_endpoint(),
            timeout_secs: default_timeout_secs(),
            tag_filters: default_tag_filters(),
        }
    }
}

fn default_timeout_secs() -> u64 { 10 }
fn default_overpass_enabled() -> bool { true }
fn default_overpass_endpoint() -> String { "https://overpass-api.de/api/interpreter".to_string() }
fn default_tag_filters() -> Vec<String> {
    vec![
        "shop=hairdresser".to_string(),
        "shop=beauty".to_string(),
        "amenity=barber".to_string(),
    ]
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_radius_m")]
    pub default_radius_m: u32,
    #[serde(default = "default_center_lat")]
    pub default_lat: f64,
    #[serde(default = "default_center_lng")]
    pub default_lng: f64,
    #[serde(default)]
    pub default_sort: SortOrder,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            default_radius_m: default_radius_m(),
            default_lat: default_center_lat(),
            default_lng: default_center_lng(),
            default_sort: SortOrder::default(),
        }
    }
}

impl SearchSettings {
    pub fn fetch_defaults(&self) -> FetchDefaults {
        FetchDefaults {
            default_center: Coordinates::new(self.default_lat, self.default_lng),
            radius_m: self.default_radius_m,
        }
    }
}

fn default_radius_m() -> u32 { 5000 }
// Mexico City
fn default_center_lat() -> f64 { 19.432608 }
fn default_center_lng() -> f64 { -99.133209 }

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,
    #[serde(default = "default_cache_capacity")]
    pub capacity: u64,
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            capacity: default_cache_capacity(),
            ttl_secs: default_cache_ttl(),
        }
    }
}

fn default_cache_enabled() -> bool { true }
fn default_cache_capacity() -> u64 { 1000 }
fn default_cache_ttl() -> u64 { 300 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with PLACEFINDER)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., PLACEFINDER__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("PLACEFINDER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings = apply_env_overrides(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("PLACEFINDER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Honor the short env var names used by deployment scripts
fn apply_env_overrides(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(endpoint) = env::var("DIRECTORY_API_URL") {
        builder = builder.set_override("directory.endpoint", endpoint)?;
    }
    if let Ok(endpoint) = env::var("OVERPASS_API_URL") {
        builder = builder.set_override("overpass.endpoint", endpoint)?;
    }
    if let Ok(level) = env::var("LOG_LEVEL") {
        builder = builder.set_override("logging.level", level)?;
    }
    if let Ok(format) = env::var("LOG_FORMAT") {
        builder = builder.set_override("logging.format", format)?;
    }

    builder.build()
}
