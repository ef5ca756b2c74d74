use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One aircraft record from the OpenSky `/states/all` endpoint.
///
/// OpenSky ships each state as a positional JSON array; this is the named
/// form built once at the network boundary so nothing downstream indexes
/// into raw arrays. Every field the upstream may omit or null is optional.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StateVector {
    pub icao24: String,
    pub callsign: Option<String>,
    pub origin_country: Option<String>,
    pub time_position: Option<i64>,
    pub last_contact: Option<i64>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub baro_altitude: Option<f64>,
    pub on_ground: Option<bool>,
    pub velocity: Option<f64>,
    pub true_track: Option<f64>,
    pub vertical_rate: Option<f64>,
    pub destination: Option<String>,
}

#[derive(Deserialize)]
pub struct OpenSkyResponse {
    pub time: Option<i64>,
    pub states: Option<Vec<Vec<Value>>>,
}

impl OpenSkyResponse {
    pub fn into_state_vectors(self) -> Vec<StateVector> {
        self.states
            .unwrap_or_default()
            .into_iter()
            .map(StateVector::from)
            .collect()
    }
}

fn text_at(data: &[Value], idx: usize) -> Option<String> {
    data.get(idx)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn float_at(data: &[Value], idx: usize) -> Option<f64> {
    data.get(idx).and_then(Value::as_f64)
}

// Timestamps come through as integers but some mirrors emit floats.
fn timestamp_at(data: &[Value], idx: usize) -> Option<i64> {
    let v = data.get(idx)?;
    v.as_i64().or_else(|| v.as_f64().map(|f| f as i64))
}

// Unmarshal the positional JSON array from OpenSky into a StateVector.
impl From<Vec<Value>> for StateVector {
    fn from(data: Vec<Value>) -> Self {
        Self {
            icao24: text_at(&data, 0).unwrap_or_else(|| "N/A".to_string()),
            callsign: text_at(&data, 1),
            origin_country: text_at(&data, 2),
            time_position: timestamp_at(&data, 3),
            last_contact: timestamp_at(&data, 4),
            longitude: float_at(&data, 5),
            latitude: float_at(&data, 6),
            baro_altitude: float_at(&data, 7),
            on_ground: data.get(8).and_then(Value::as_bool),
            velocity: float_at(&data, 9),
            true_track: float_at(&data, 10),
            vertical_rate: float_at(&data, 11),
            // Plain feeds carry sensor ids here; only a string means a destination.
            destination: text_at(&data, 12),
        }
    }
}

/// Ground/air status as shown in the Status column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightStatus {
    OnGround,
    InAir,
    Unknown,
}

impl FlightStatus {
    pub fn label(self) -> &'static str {
        match self {
            FlightStatus::OnGround => "On Ground",
            FlightStatus::InAir => "In Air",
            FlightStatus::Unknown => "Unknown",
        }
    }
}

impl StateVector {
    pub fn status(&self) -> FlightStatus {
        match self.on_ground {
            Some(true) => FlightStatus::OnGround,
            Some(false) => FlightStatus::InAir,
            None => FlightStatus::Unknown,
        }
    }
}

/// A selectable weather location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct City {
    pub key: String,
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
}

/// Open-Meteo forecast response. Only `current` is displayed; the hourly and
/// daily blocks are requested with the same parameter set and kept opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResponse {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone: Option<String>,
    pub current: CurrentWeather,
    #[serde(default)]
    pub hourly: Option<Value>,
    #[serde(default)]
    pub daily: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub time: Option<String>,
    #[serde(rename = "temperature_2m")]
    pub temperature: f64,
    pub apparent_temperature: f64,
    #[serde(rename = "relative_humidity_2m")]
    pub humidity: f64,
    #[serde(rename = "wind_speed_10m")]
    pub wind_speed: f64,
    #[serde(rename = "wind_direction_10m")]
    pub wind_direction: f64,
    #[serde(default)]
    pub weather_code: Option<i64>,
}
