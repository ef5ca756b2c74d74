//! Weather display metadata: WMO weather codes, compass points and the
//! selectable city list.

use crate::models::City;

/// Icon and description for one WMO weather code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeatherCode {
    pub icon: &'static str,
    pub description: &'static str,
}

pub const UNKNOWN_CODE: WeatherCode = WeatherCode {
    icon: "❓",
    description: "Unknown",
};

const fn wc(icon: &'static str, description: &'static str) -> WeatherCode {
    WeatherCode { icon, description }
}

pub const WEATHER_CODES: &[(i64, WeatherCode)] = &[
    (0, wc("☀️", "Clear sky")),
    (1, wc("🌤️", "Mainly clear")),
    (2, wc("⛅", "Partly cloudy")),
    (3, wc("☁️", "Overcast")),
    (45, wc("🌫️", "Foggy")),
    (48, wc("🌫️", "Depositing rime fog")),
    (51, wc("🌦️", "Light drizzle")),
    (53, wc("🌦️", "Moderate drizzle")),
    (55, wc("🌦️", "Dense drizzle")),
    (61, wc("🌧️", "Slight rain")),
    (63, wc("🌧️", "Moderate rain")),
    (65, wc("🌧️", "Heavy rain")),
    (71, wc("🌨️", "Slight snow")),
    (73, wc("🌨️", "Moderate snow")),
    (75, wc("🌨️", "Heavy snow")),
    (77, wc("🌨️", "Snow grains")),
    (80, wc("🌦️", "Slight rain showers")),
    (81, wc("🌦️", "Moderate rain showers")),
    (82, wc("🌧️", "Violent rain showers")),
    (85, wc("🌨️", "Slight snow showers")),
    (86, wc("🌨️", "Heavy snow showers")),
    (95, wc("⛈️", "Thunderstorm")),
    (96, wc("⛈️", "Thunderstorm with slight hail")),
    (99, wc("⛈️", "Thunderstorm with heavy hail")),
];

/// Looks up a weather code. Never fails; unlisted or absent codes map to [`UNKNOWN_CODE`].
pub fn describe(code: impl Into<Option<i64>>) -> WeatherCode {
    let Some(code) = code.into() else {
        return UNKNOWN_CODE;
    };
    WEATHER_CODES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, w)| *w)
        .unwrap_or(UNKNOWN_CODE)
}

const COMPASS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

/// Maps degrees to the nearest of eight compass points.
///
/// Halfway values round up (22.5° is NE) and anything outside 0..360 wraps.
pub fn wind_direction(degrees: f64) -> &'static str {
    let bucket = (degrees / 45.0 + 0.5).floor() as i64;
    COMPASS[bucket.rem_euclid(8) as usize]
}

pub const DEFAULT_CITY: &str = "london";

const CITIES: &[(&str, f64, f64, &str)] = &[
    ("london", 51.5074, -0.1278, "London, UK"),
    ("paris", 48.8566, 2.3522, "Paris, France"),
    ("berlin", 52.5200, 13.4050, "Berlin, Germany"),
    ("madrid", 40.4168, -3.7038, "Madrid, Spain"),
    ("rome", 41.9028, 12.4964, "Rome, Italy"),
    ("amsterdam", 52.3676, 4.9041, "Amsterdam, Netherlands"),
    ("vienna", 48.2082, 16.3738, "Vienna, Austria"),
    ("stockholm", 59.3293, 18.0686, "Stockholm, Sweden"),
    ("copenhagen", 55.6761, 12.5683, "Copenhagen, Denmark"),
    ("zurich", 47.3769, 8.5417, "Zurich, Switzerland"),
];

/// The European cities offered in the city selector, in display order.
pub fn cities() -> Vec<City> {
    CITIES
        .iter()
        .map(|(key, lat, lon, name)| City {
            key: key.to_string(),
            latitude: *lat,
            longitude: *lon,
            name: name.to_string(),
        })
        .collect()
}

pub fn city(key: &str) -> Option<City> {
    cities().into_iter().find(|c| c.key == key)
}
