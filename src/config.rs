use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub flights: FlightsConfig,
    pub weather: WeatherConfig,
    pub server: ServerConfig,
    pub cache: CacheConfig,
    pub ui: UiConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FlightsConfig {
    pub api_url: String,
    /// Prefix prepended to the percent-encoded API url, e.g. `https://corsproxy.io/?`.
    pub cors_proxy: Option<String>,
    pub row_limit: Option<usize>,
    pub show_status: bool,
    pub request_timeout_seconds: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct WeatherConfig {
    pub api_url: String,
    pub geocoding_url: String,
    pub default_city: String,
    pub refresh_minutes: u64,
    pub timezone: String,
    pub auto_locate: bool, // Add a "here" entry from IP geolocation
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub interface: String,
    pub port: u16,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    /// When false `/api/flights` only proxies and never touches disk.
    pub enabled: bool,
    pub path: PathBuf,
    pub snapshot_size: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct UiConfig {
    pub tick_rate_ms: u64,
}

impl Default for FlightsConfig {
    fn default() -> Self {
        Self {
            api_url: "https://opensky-network.org/api/states/all".to_string(),
            cors_proxy: None,
            row_limit: Some(10),
            show_status: true,
            request_timeout_seconds: 20,
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            geocoding_url: "https://geocoding-api.open-meteo.com/v1/search".to_string(),
            default_city: crate::weather::DEFAULT_CITY.to_string(),
            refresh_minutes: 30,
            timezone: "America/Los_Angeles".to_string(),
            auto_locate: false,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            interface: "0.0.0.0".to_string(),
            port: 3001,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: PathBuf::from("flights_temp.json"),
            snapshot_size: 10,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { tick_rate_ms: 150 }
    }
}

impl Config {
    /// Loads the config file at `path`.
    /// If it doesn't exist, writes the defaults there for the user to edit.
    /// A file that fails to parse is left alone and the defaults are used.
    pub fn load(path: &Path) -> Self {
        if let Ok(content) = fs::read_to_string(path) {
            match toml::from_str(&content) {
                Ok(config) => {
                    info!("Loaded configuration from {}", path.display());
                    return config;
                }
                Err(e) => {
                    warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    return Config::default();
                }
            }
        }

        let default_config = Config::default();
        match toml::to_string_pretty(&default_config) {
            Ok(toml_string) => {
                if fs::write(path, toml_string).is_err() {
                    warn!("Could not write default {} to disk.", path.display());
                }
            }
            Err(e) => warn!("Could not serialize default config: {}", e),
        }

        info!("Loaded default configuration.");
        default_config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config::load(&path);
        assert_eq!(config, Config::default());
        assert!(path.exists());

        let reloaded = Config::load(&path);
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[server]\nport = 8080\n\n[weather]\ndefault_city = \"paris\"\n",
        )
        .unwrap();

        let config = Config::load(&path);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.interface, "0.0.0.0");
        assert_eq!(config.weather.default_city, "paris");
        assert_eq!(config.weather.refresh_minutes, 30);
        assert_eq!(config.cache.path, PathBuf::from("flights_temp.json"));
    }

    #[test]
    fn test_invalid_file_falls_back_without_overwriting() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "this is = = not toml").unwrap();

        let config = Config::load(&path);
        assert_eq!(config, Config::default());
        assert_eq!(fs::read_to_string(&path).unwrap(), "this is = = not toml");
    }
}
