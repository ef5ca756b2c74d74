//! Proxy/cache server and the server-rendered dashboard.
//!
//! `GET /api/flights` fetches a fresh snapshot, keeps the first few records,
//! stores them in a single JSON file and returns them. `GET /api/flights/temp`
//! serves that file back untouched. `GET /` renders the HTML dashboard.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::api::{self, FlightProvider, FlightSource, Geocoder, WeatherProvider, WeatherSource};
use crate::config::Config;
use crate::error::Result;
use crate::filter;
use crate::location;
use crate::models::{City, StateVector};
use crate::render::{self, DashboardView, TableOptions};
use crate::weather;

pub const FETCH_FAILED: &str = "Failed to fetch flight data.";
pub const NO_TEMP_FILE: &str = "No temp file found.";
pub const TEMP_READ_FAILED: &str = "Failed to read temp file.";

/// Single-file store for the last proxied snapshot.
#[derive(Debug, Clone)]
pub struct FlightCache {
    path: PathBuf,
}

impl FlightCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the cache file atomically: write `<path>.tmp`, then rename.
    /// Concurrent writers still race; the last rename wins.
    pub async fn write(&self, states: &[StateVector]) -> Result<()> {
        let contents = serde_json::to_vec_pretty(states)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp_path = PathBuf::from(tmp);

        tokio::fs::write(&tmp_path, &contents).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }

    /// Raw file contents, or `None` if nothing has been written yet.
    pub async fn read(&self) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub flights: Arc<dyn FlightSource>,
    pub weather: Arc<dyn WeatherSource>,
    /// `None` disables the file write on `/api/flights`.
    pub cache: Option<FlightCache>,
    pub snapshot_size: usize,
    pub cities: Arc<Vec<City>>,
    pub default_city: String,
    pub table: TableOptions,
}

pub fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

pub async fn get_flights(State(state): State<AppState>) -> Response {
    let states = match state.flights.fetch_states().await {
        Ok(states) => states,
        Err(e) => {
            error!("Flight fetch failed: {}", e);
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, FETCH_FAILED);
        }
    };

    let snapshot: Vec<StateVector> = states.into_iter().take(state.snapshot_size).collect();

    if let Some(cache) = &state.cache {
        if let Err(e) = cache.write(&snapshot).await {
            error!("Failed to write {}: {}", cache.path().display(), e);
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, FETCH_FAILED);
        }
        info!("Cached {} flights to {}", snapshot.len(), cache.path().display());
    }

    Json(snapshot).into_response()
}

pub async fn get_cached_flights(State(state): State<AppState>) -> Response {
    let Some(cache) = &state.cache else {
        return json_error(StatusCode::NOT_FOUND, NO_TEMP_FILE);
    };

    match cache.read().await {
        Ok(Some(bytes)) => ([(header::CONTENT_TYPE, "application/json")], bytes).into_response(),
        Ok(None) => json_error(StatusCode::NOT_FOUND, NO_TEMP_FILE),
        Err(e) => {
            error!("Failed to read {}: {}", cache.path().display(), e);
            json_error(StatusCode::INTERNAL_SERVER_ERROR, TEMP_READ_FAILED)
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DashboardParams {
    pub city: Option<String>,
    pub date: Option<String>,
    pub destination: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

pub async fn dashboard(
    State(state): State<AppState>,
    Query(params): Query<DashboardParams>,
) -> Html<String> {
    let city = non_empty(&params.city)
        .and_then(|key| state.cities.iter().find(|c| c.key == key))
        .or_else(|| state.cities.iter().find(|c| c.key == state.default_city))
        .or_else(|| state.cities.first())
        .cloned();

    let weather_fut = async {
        match &city {
            Some(c) => match state.weather.fetch_weather(c.latitude, c.longitude).await {
                Ok(data) => render::weather_block(&data, &c.name, Utc::now().date_naive()),
                Err(e) => {
                    warn!("Weather loading error: {}", e);
                    render::weather_error_block()
                }
            },
            None => render::weather_error_block(),
        }
    };
    let (weather_html, (states, fetched)) =
        tokio::join!(weather_fut, api::states_or_empty(state.flights.as_ref()));

    let destination = non_empty(&params.destination);
    let date = non_empty(&params.date);
    let mut status = (!fetched).then(|| render::FLIGHT_LOAD_FAILED.to_string());

    let shown = if let Some(dest) = destination {
        filter::by_destination(&states, dest, Utc::now())
    } else if let Some(day) = date {
        filter::by_date(&states, day).unwrap_or_else(|e| {
            status = Some(e.to_string());
            Vec::new()
        })
    } else {
        states.clone()
    };

    let destinations = filter::destinations(&states);
    let selected_city = city.as_ref().map(|c| c.key.as_str()).unwrap_or_default();
    let view = DashboardView {
        cities: &state.cities,
        selected_city,
        weather_html,
        destinations: &destinations,
        selected_destination: destination,
        date,
        status: status.as_deref(),
        flights_html: render::flights_table(&shown, state.table),
    };

    Html(render::dashboard_page(&view))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/api/flights", get(get_flights))
        .route("/api/flights/temp", get(get_cached_flights))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn start_server(config: &Config) -> color_eyre::Result<()> {
    let mut cities = weather::cities();
    if config.weather.auto_locate {
        let geocoder = Geocoder::new(&config.weather)?;
        cities.insert(0, location::current_location(&geocoder).await);
    }

    let state = AppState {
        flights: Arc::new(FlightProvider::new(&config.flights)?),
        weather: Arc::new(WeatherProvider::new(&config.weather)?),
        cache: config.cache.enabled.then(|| FlightCache::new(&config.cache.path)),
        snapshot_size: config.cache.snapshot_size,
        cities: Arc::new(cities),
        default_city: config.weather.default_city.clone(),
        table: TableOptions {
            row_limit: config.flights.row_limit,
            show_status: config.flights.show_status,
        },
    };

    let addr = format!("{}:{}", config.server.interface, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Backend server running on http://{}", addr);

    axum::serve(listener, router(state)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::models::{CurrentWeather, WeatherResponse};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    struct StubFlights(Option<Vec<StateVector>>);

    #[async_trait]
    impl FlightSource for StubFlights {
        async fn fetch_states(&self) -> Result<Vec<StateVector>> {
            self.0.clone().ok_or(Error::HttpStatus {
                status: 503,
                url: "stub".to_string(),
            })
        }
    }

    struct StubWeather(bool);

    #[async_trait]
    impl WeatherSource for StubWeather {
        async fn fetch_weather(&self, lat: f64, lon: f64) -> Result<WeatherResponse> {
            if !self.0 {
                return Err(Error::HttpStatus {
                    status: 500,
                    url: "stub".to_string(),
                });
            }
            Ok(WeatherResponse {
                latitude: Some(lat),
                longitude: Some(lon),
                timezone: None,
                current: CurrentWeather {
                    time: None,
                    temperature: 18.2,
                    apparent_temperature: 17.6,
                    humidity: 55.0,
                    wind_speed: 4.4,
                    wind_direction: 90.0,
                    weather_code: Some(0),
                },
                hourly: None,
                daily: None,
            })
        }
    }

    fn sample_states(n: usize) -> Vec<StateVector> {
        let now = Utc::now().timestamp();
        (0..n)
            .map(|i| StateVector {
                icao24: format!("{:06x}", i),
                callsign: Some(format!("DLH{}", i)),
                origin_country: Some("Germany".to_string()),
                last_contact: Some(now),
                on_ground: Some(i % 2 == 0),
                destination: Some(if i % 3 == 0 { "EDDF" } else { "EGLL" }.to_string()),
                ..Default::default()
            })
            .collect()
    }

    fn state_with(flights: Option<Vec<StateVector>>, weather_ok: bool, cache: Option<FlightCache>) -> AppState {
        AppState {
            flights: Arc::new(StubFlights(flights)),
            weather: Arc::new(StubWeather(weather_ok)),
            cache,
            snapshot_size: 10,
            cities: Arc::new(weather::cities()),
            default_city: weather::DEFAULT_CITY.to_string(),
            table: TableOptions::default(),
        }
    }

    async fn get(app: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn test_write_then_read_returns_same_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FlightCache::new(dir.path().join("flights_temp.json"));
        let app = router(state_with(Some(sample_states(25)), true, Some(cache.clone())));

        let (status, body) = get(&app, "/api/flights").await;
        assert_eq!(status, StatusCode::OK);
        let written: Vec<StateVector> = serde_json::from_slice(&body).unwrap();
        assert_eq!(written.len(), 10);
        assert_eq!(written[0].callsign.as_deref(), Some("DLH0"));
        assert_eq!(written[9].callsign.as_deref(), Some("DLH9"));

        let (status, body) = get(&app, "/api/flights/temp").await;
        assert_eq!(status, StatusCode::OK);
        let read: Vec<StateVector> = serde_json::from_slice(&body).unwrap();
        assert_eq!(read, written);

        assert!(!dir.path().join("flights_temp.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_read_before_write_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FlightCache::new(dir.path().join("flights_temp.json"));
        let app = router(state_with(Some(sample_states(3)), true, Some(cache)));

        let (status, body) = get(&app, "/api/flights/temp").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let err: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(err, json!({ "error": "No temp file found." }));
    }

    #[tokio::test]
    async fn test_unreadable_cache_is_500() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flights_temp.json");
        std::fs::create_dir(&path).unwrap();
        let app = router(state_with(Some(sample_states(3)), true, Some(FlightCache::new(&path))));

        let (status, body) = get(&app, "/api/flights/temp").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let err: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(err, json!({ "error": "Failed to read temp file." }));
    }

    #[tokio::test]
    async fn test_upstream_failure_is_500_and_leaves_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flights_temp.json");
        let app = router(state_with(None, true, Some(FlightCache::new(&path))));

        let (status, body) = get(&app, "/api/flights").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let err: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(err, json!({ "error": "Failed to fetch flight data." }));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_proxy_without_cache_skips_file() {
        let app = router(state_with(Some(sample_states(4)), true, None));

        let (status, body) = get(&app, "/api/flights").await;
        assert_eq!(status, StatusCode::OK);
        let states: Vec<StateVector> = serde_json::from_slice(&body).unwrap();
        assert_eq!(states.len(), 4);

        let (status, _) = get(&app, "/api/flights/temp").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_dashboard_renders_weather_and_filtered_flights() {
        let app = router(state_with(Some(sample_states(6)), true, None));

        let (status, body) = get(&app, "/?city=paris&destination=EDDF").await;
        assert_eq!(status, StatusCode::OK);
        let page = String::from_utf8(body).unwrap();

        assert!(page.contains("Paris, France</div>"));
        assert!(page.contains("Clear sky"));
        assert!(page.contains(">E<"));
        // DLH0 and DLH3 are the EDDF-bound records.
        assert!(page.contains("<td>DLH0</td>"));
        assert!(page.contains("<td>DLH3</td>"));
        assert!(!page.contains("<td>DLH1</td>"));
        assert!(page.contains(r#"<option value="EDDF" selected>EDDF</option>"#));
    }

    #[tokio::test]
    async fn test_dashboard_degrades_on_failures() {
        let app = router(state_with(None, false, None));

        let (status, body) = get(&app, "/?city=atlantis").await;
        assert_eq!(status, StatusCode::OK);
        let page = String::from_utf8(body).unwrap();

        assert!(page.contains(render::WEATHER_FAILED));
        assert!(page.contains(render::FLIGHT_LOAD_FAILED));
        assert!(page.contains(render::NO_FLIGHTS));
        assert!(page.contains(r#"<option value="london" selected>"#));
    }

    #[tokio::test]
    async fn test_dashboard_reports_bad_date() {
        let app = router(state_with(Some(sample_states(2)), true, None));

        let (_, body) = get(&app, "/?date=yesterday").await;
        let page = String::from_utf8(body).unwrap();
        assert!(page.contains("invalid date"));
        assert!(page.contains(render::NO_FLIGHTS));
    }
}
