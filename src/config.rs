use crate::errors::ConfigError;
use crate::map::geometry::LngLat;

pub const BIND_ADDR: &str = "127.0.0.1:3000";
pub const DB_PATH: &str = "listings.sqlite3";
pub const MAP_STYLE_URL: &str = "mapbox://styles/mapbox/streets-v12";
pub const DEFAULT_MAX_WORKERS: usize = 8;

/// Initial camera before any auto-framing happens.
pub const DEFAULT_CENTER: LngLat = LngLat { lng: 19.0402, lat: 47.4979 };
pub const DEFAULT_ZOOM: f64 = 11.0;

/// Auto-framing never zooms in further than this.
pub const FIT_MAX_ZOOM: f64 = 15.0;
pub const FIT_PADDING_PX: u32 = 50;
pub const FIT_DURATION_MS: u32 = 1000;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub db_path: String,
    pub log_level: String,
    pub max_workers: usize,
    /// Map engine access token (MAP_TOKEN). The map page refuses to load without it.
    pub map_token: Option<String>,
    pub map_style_url: String,
    /// Shared secret expected in `x-webhook-secret` (WEBHOOK_SECRET). Unset means open.
    pub webhook_secret: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let max_workers = match non_empty("MAX_WORKERS") {
            None => DEFAULT_MAX_WORKERS,
            Some(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::InvalidNumber {
                    key: "MAX_WORKERS",
                    value: raw,
                })?,
        };

        Ok(Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| BIND_ADDR.to_string()),
            db_path: lookup("DB_PATH").unwrap_or_else(|| DB_PATH.to_string()),
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            max_workers,
            map_token: non_empty("MAP_TOKEN"),
            map_style_url: lookup("MAP_STYLE_URL").unwrap_or_else(|| MAP_STYLE_URL.to_string()),
            webhook_secret: non_empty("WEBHOOK_SECRET"),
        })
    }

    pub fn map_config(&self) -> MapConfig {
        MapConfig {
            token: self.map_token.clone(),
            style_url: self.map_style_url.clone(),
            ..MapConfig::default()
        }
    }
}

/// Everything the map view needs to construct its engine and frame the first load.
#[derive(Debug, Clone, PartialEq)]
pub struct MapConfig {
    pub token: Option<String>,
    pub style_url: String,
    pub center: LngLat,
    pub zoom: f64,
    pub fit_padding_px: u32,
    pub fit_max_zoom: f64,
    pub fit_duration_ms: u32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            token: None,
            style_url: MAP_STYLE_URL.to_string(),
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            fit_padding_px: FIT_PADDING_PX,
            fit_max_zoom: FIT_MAX_ZOOM,
            fit_duration_ms: FIT_DURATION_MS,
        }
    }
}
