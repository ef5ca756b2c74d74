use crate::config::{FlightsConfig, WeatherConfig};
use crate::error::{Error, Result};
use crate::models::{OpenSkyResponse, StateVector, WeatherResponse};
use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Characters `encodeURIComponent` leaves alone; CORS proxies expect that form.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Anything that can produce a snapshot of live state vectors.
#[async_trait]
pub trait FlightSource: Send + Sync {
    async fn fetch_states(&self) -> Result<Vec<StateVector>>;
}

/// Anything that can produce current conditions for a coordinate.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn fetch_weather(&self, lat: f64, lon: f64) -> Result<WeatherResponse>;
}

/// Fetches a snapshot, degrading to an empty list on failure. The flag is `false`
/// when the fetch failed.
pub async fn states_or_empty(source: &dyn FlightSource) -> (Vec<StateVector>, bool) {
    match source.fetch_states().await {
        Ok(states) => (states, true),
        Err(e) => {
            warn!("Flight fetch failed: {}", e);
            (Vec::new(), false)
        }
    }
}

fn build_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| Error::from_reqwest("client builder", e))
}

pub struct FlightProvider {
    client: Client,
    url: String,
}

impl FlightProvider {
    pub fn new(config: &FlightsConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config.request_timeout_seconds)?,
            url: request_url(&config.api_url, config.cors_proxy.as_deref()),
        })
    }
}

/// The OpenSky url, optionally routed through a CORS proxy prefix.
pub fn request_url(api_url: &str, cors_proxy: Option<&str>) -> String {
    match cors_proxy.filter(|p| !p.is_empty()) {
        Some(prefix) => format!("{}{}", prefix, utf8_percent_encode(api_url, URI_COMPONENT)),
        None => api_url.to_string(),
    }
}

#[async_trait]
impl FlightSource for FlightProvider {
    async fn fetch_states(&self) -> Result<Vec<StateVector>> {
        let res = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::from_reqwest(&self.url, e))?
            .json::<OpenSkyResponse>()
            .await
            .map_err(|e| Error::from_reqwest(&self.url, e))?;

        let states = res.into_state_vectors();
        debug!("Fetched {} state vectors", states.len());
        Ok(states)
    }
}

pub struct WeatherProvider {
    client: Client,
    api_url: String,
    timezone: String,
}

impl WeatherProvider {
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(20)?,
            api_url: config.api_url.clone(),
            timezone: config.timezone.clone(),
        })
    }

    /// Fixed Open-Meteo parameter set for one coordinate.
    pub fn query(&self, lat: f64, lon: f64) -> Vec<(&'static str, String)> {
        vec![
            ("latitude", lat.to_string()),
            ("longitude", lon.to_string()),
            (
                "current",
                "temperature_2m,relative_humidity_2m,apparent_temperature,weather_code,wind_speed_10m,wind_direction_10m"
                    .to_string(),
            ),
            ("hourly", "temperature_2m,weather_code".to_string()),
            (
                "daily",
                "temperature_2m_max,temperature_2m_min,weather_code".to_string(),
            ),
            ("temperature_unit", "celsius".to_string()),
            ("wind_speed_unit", "mph".to_string()),
            ("precipitation_unit", "inch".to_string()),
            ("timezone", self.timezone.clone()),
        ]
    }
}

#[async_trait]
impl WeatherSource for WeatherProvider {
    async fn fetch_weather(&self, lat: f64, lon: f64) -> Result<WeatherResponse> {
        let res = self
            .client
            .get(&self.api_url)
            .query(&self.query(lat, lon))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::from_reqwest(&self.api_url, e))?
            .json::<WeatherResponse>()
            .await
            .map_err(|e| Error::from_reqwest(&self.api_url, e))?;
        Ok(res)
    }
}

#[derive(Deserialize)]
pub struct GeocodingResponse {
    pub results: Option<Vec<GeocodingResult>>,
}

#[derive(Deserialize)]
pub struct GeocodingResult {
    pub name: String,
    pub admin1: Option<String>,
    pub country: Option<String>,
}

pub const UNKNOWN_LOCATION: &str = "Unknown Location";

impl GeocodingResponse {
    /// `"name, region"` for the first hit, falling back to the country.
    pub fn label(&self) -> Option<String> {
        let first = self.results.as_ref()?.first()?;
        let region = first
            .admin1
            .as_deref()
            .or(first.country.as_deref())
            .unwrap_or_default();
        Some(format!("{}, {}", first.name, region))
    }
}

/// Open-Meteo geocoding lookup for a display label.
pub struct Geocoder {
    client: Client,
    api_url: String,
}

impl Geocoder {
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(10)?,
            api_url: config.geocoding_url.clone(),
        })
    }

    /// Best-effort place label for a coordinate; `"Unknown Location"` on any failure.
    pub async fn city_label(&self, lat: f64, lon: f64) -> String {
        let name = format!("{},{}", lat, lon);
        let res = self
            .client
            .get(&self.api_url)
            .query(&[
                ("name", name.as_str()),
                ("count", "1"),
                ("language", "en"),
                ("format", "json"),
            ])
            .send()
            .await;

        let parsed = match res {
            Ok(r) => r.json::<GeocodingResponse>().await,
            Err(e) => Err(e),
        };

        match parsed {
            Ok(body) => body.label().unwrap_or_else(|| UNKNOWN_LOCATION.to_string()),
            Err(e) => {
                warn!("Geocoding error: {}", e);
                UNKNOWN_LOCATION.to_string()
            }
        }
    }
}
