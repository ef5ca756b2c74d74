//! HTML fragments for the browser dashboard.
//!
//! Every renderer is a pure function of its inputs and returns a fresh
//! string; nothing here touches the fetched snapshot.

use std::fmt::Write;

use chrono::NaiveDate;

use crate::airlines::airline_name;
use crate::models::{City, StateVector, WeatherResponse};
use crate::weather::{describe, wind_direction};

pub const NO_FLIGHTS: &str = "<p>No flights found.</p>";
pub const FLIGHT_LOAD_FAILED: &str = "Failed to load flight data.";
pub const WEATHER_FAILED: &str = "Unable to load weather data. Please try again later.";

/// Which columns and how many rows the flight table shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableOptions {
    /// Caps the number of rendered rows; `None` renders everything.
    pub row_limit: Option<usize>,
    pub show_status: bool,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            row_limit: Some(10),
            show_status: true,
        }
    }
}

pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Renders the flight table, or the fixed empty message for no flights.
pub fn flights_table(states: &[StateVector], opts: TableOptions) -> String {
    if states.is_empty() {
        return NO_FLIGHTS.to_string();
    }

    let mut html = String::from("<table><thead><tr><th>Airline</th><th>Callsign</th><th>From</th>");
    if opts.show_status {
        html.push_str("<th>Status</th>");
    }
    html.push_str("</tr></thead><tbody>");

    let limit = opts.row_limit.unwrap_or(usize::MAX);
    for s in states.iter().take(limit) {
        let _ = write!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td>",
            escape(&airline_name(s.callsign.as_deref())),
            escape(s.callsign.as_deref().unwrap_or("N/A")),
            escape(s.origin_country.as_deref().unwrap_or("N/A")),
        );
        if opts.show_status {
            let _ = write!(html, "<td>{}</td>", s.status().label());
        }
        html.push_str("</tr>");
    }

    html.push_str("</tbody></table>");
    html
}

/// Long-form date as shown in the weather header, e.g. `Sunday, October 18, 2026`.
pub fn display_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

// Half values round toward positive infinity, so -2.5 shows as -2 and -0.4 as 0.
pub fn whole(value: f64) -> i64 {
    let floor = value.floor();
    if value - floor >= 0.5 {
        floor as i64 + 1
    } else {
        floor as i64
    }
}

pub fn weather_block(data: &WeatherResponse, city_name: &str, date: NaiveDate) -> String {
    let current = &data.current;
    let code = describe(current.weather_code);

    format!(
        r#"<div class="weather-header">
    <div class="weather-location">{city}</div>
    <div class="weather-date">{date}</div>
</div>
<div class="weather-current">
    <div class="weather-temp">{temp}°</div>
    <div class="weather-condition">
        <div class="weather-icon">{icon}</div>
        <div>{description}</div>
    </div>
</div>
<div class="weather-details">
    <div class="weather-detail">
        <div class="detail-label">Feels Like</div>
        <div class="detail-value">{feels}°</div>
    </div>
    <div class="weather-detail">
        <div class="detail-label">Humidity</div>
        <div class="detail-value">{humidity}%</div>
    </div>
    <div class="weather-detail">
        <div class="detail-label">Wind Speed</div>
        <div class="detail-value">{wind} mph</div>
    </div>
    <div class="weather-detail">
        <div class="detail-label">Wind Direction</div>
        <div class="detail-value">{compass}</div>
    </div>
</div>"#,
        city = escape(city_name),
        date = display_date(date),
        temp = whole(current.temperature),
        icon = code.icon,
        description = code.description,
        feels = whole(current.apparent_temperature),
        humidity = current.humidity,
        wind = whole(current.wind_speed),
        compass = wind_direction(current.wind_direction),
    )
}

pub fn weather_error_block() -> String {
    format!(r#"<div class="weather-error">{}</div>"#, WEATHER_FAILED)
}

/// Everything the server-rendered dashboard page needs.
#[derive(Debug, Default)]
pub struct DashboardView<'a> {
    pub cities: &'a [City],
    pub selected_city: &'a str,
    pub weather_html: String,
    pub destinations: &'a [String],
    pub selected_destination: Option<&'a str>,
    pub date: Option<&'a str>,
    pub status: Option<&'a str>,
    pub flights_html: String,
}

fn option_tag(value: &str, label: &str, selected: bool) -> String {
    format!(
        r#"<option value="{}"{}>{}</option>"#,
        escape(value),
        if selected { " selected" } else { "" },
        escape(label)
    )
}

/// Full dashboard document: city selector, weather widget, flight search.
pub fn dashboard_page(view: &DashboardView<'_>) -> String {
    let city_options: String = view
        .cities
        .iter()
        .map(|c| option_tag(&c.key, &c.name, c.key == view.selected_city))
        .collect();

    let mut destination_options = option_tag("", "Any destination", view.selected_destination.is_none());
    for d in view.destinations {
        destination_options.push_str(&option_tag(d, d, view.selected_destination == Some(d.as_str())));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Skyboard</title>
</head>
<body>
<section id="weather-widget">
<form method="get" action="/" class="city-selector">
<select id="city-dropdown" name="city" onchange="this.form.submit()">{city_options}</select>
</form>
<div class="weather-content">
{weather}
</div>
</section>
<section id="flights">
<form method="get" action="/">
<input type="hidden" name="city" value="{city}">
<input type="date" id="date-picker" name="date" value="{date}">
<select id="destination" name="destination">{destination_options}</select>
<button id="search-btn" type="submit">Search</button>
</form>
<div id="status">{status}</div>
<div id="results">{flights}</div>
</section>
</body>
</html>
"#,
        city_options = city_options,
        weather = view.weather_html,
        city = escape(view.selected_city),
        date = escape(view.date.unwrap_or("")),
        destination_options = destination_options,
        status = escape(view.status.unwrap_or("")),
        flights = view.flights_html,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CurrentWeather;

    fn flight(callsign: Option<&str>, country: Option<&str>, on_ground: Option<bool>) -> StateVector {
        StateVector {
            icao24: "abc123".to_string(),
            callsign: callsign.map(str::to_string),
            origin_country: country.map(str::to_string),
            on_ground,
            ..Default::default()
        }
    }

    fn weather(code: i64, direction: f64) -> WeatherResponse {
        WeatherResponse {
            latitude: Some(51.5),
            longitude: Some(-0.12),
            timezone: None,
            current: CurrentWeather {
                time: None,
                temperature: 12.6,
                apparent_temperature: 10.4,
                humidity: 81.0,
                wind_speed: 9.5,
                wind_direction: direction,
                weather_code: Some(code),
            },
            hourly: None,
            daily: None,
        }
    }

    #[test]
    fn test_empty_list_renders_message() {
        assert_eq!(flights_table(&[], TableOptions::default()), NO_FLIGHTS);
    }

    #[test]
    fn test_rows_keep_order_and_columns() {
        let states = vec![
            flight(Some("DLH9LF"), Some("Germany"), Some(false)),
            flight(Some("xyz1"), None, Some(true)),
            flight(None, Some("France"), None),
        ];
        let html = flights_table(&states, TableOptions::default());

        assert!(html.contains("<th>Status</th>"));
        assert_eq!(html.matches("<tr><td>").count(), 3);
        let lufthansa = html.find("<td>Lufthansa</td><td>DLH9LF</td><td>Germany</td><td>In Air</td>").unwrap();
        let xyz = html.find("<td>XYZ</td><td>xyz1</td><td>N/A</td><td>On Ground</td>").unwrap();
        let unknown = html.find("<td>Unknown</td><td>N/A</td><td>France</td><td>Unknown</td>").unwrap();
        assert!(lufthansa < xyz && xyz < unknown);
    }

    #[test]
    fn test_row_limit_caps_at_ten() {
        let states: Vec<_> = (0..25)
            .map(|i| flight(Some(&format!("BAW{}", i)), Some("United Kingdom"), Some(false)))
            .collect();

        let capped = flights_table(&states, TableOptions::default());
        assert_eq!(capped.matches("<tr><td>").count(), 10);
        assert!(capped.contains("BAW9<"));
        assert!(!capped.contains("BAW10<"));

        let all = flights_table(&states, TableOptions { row_limit: None, show_status: false });
        assert_eq!(all.matches("<tr><td>").count(), 25);
        assert!(!all.contains("Status"));
    }

    #[test]
    fn test_values_are_escaped() {
        let states = vec![flight(Some("<b>"), Some("A&B"), None)];
        let html = flights_table(&states, TableOptions::default());
        assert!(html.contains("&lt;b&gt;"));
        assert!(html.contains("A&amp;B"));
    }

    #[test]
    fn test_weather_block_formats_current_conditions() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let html = weather_block(&weather(3, 225.0), "London, UK", date);

        assert!(html.contains(r#"<div class="weather-location">London, UK</div>"#));
        assert!(html.contains("Sunday, October 18, 2026"));
        assert!(html.contains(r#"<div class="weather-temp">13°</div>"#));
        assert!(html.contains("☁️"));
        assert!(html.contains("Overcast"));
        assert!(html.contains(">10°<"));
        assert!(html.contains(">81%<"));
        assert!(html.contains(">10 mph<"));
        assert!(html.contains(">SW<"));
    }

    #[test]
    fn test_whole_rounds_half_up() {
        assert_eq!(whole(9.5), 10);
        assert_eq!(whole(-2.5), -2);
        assert_eq!(whole(-0.4), 0);
        assert_eq!(whole(0.49999999999999994), 0);
        assert_eq!(whole(-0.5), 0);
        assert_eq!(whole(2.4), 2);
    }

    #[test]
    fn test_weather_block_unknown_code() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let html = weather_block(&weather(7, 0.0), "Paris, France", date);
        assert!(html.contains("❓"));
        assert!(html.contains("<div>Unknown</div>"));
        assert!(html.contains("Monday, January 5, 2026"));
    }

    #[test]
    fn test_weather_block_null_code() {
        let data: WeatherResponse = serde_json::from_str(
            r#"{"current":{"temperature_2m":4.5,"relative_humidity_2m":70,
                "apparent_temperature":2.0,"weather_code":null,
                "wind_speed_10m":3.0,"wind_direction_10m":90}}"#,
        )
        .unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let html = weather_block(&data, "Oslo, Norway", date);
        assert!(html.contains("❓"));
        assert!(html.contains("<div>Unknown</div>"));
        assert!(html.contains(r#"<div class="weather-temp">5°</div>"#));
        assert!(html.contains(r#"<div class="detail-value">E</div>"#));
    }

    #[test]
    fn test_dashboard_page_marks_selection() {
        let cities = crate::weather::cities();
        let destinations = vec!["EDDF".to_string(), "EGLL".to_string()];
        let view = DashboardView {
            cities: &cities,
            selected_city: "paris",
            weather_html: weather_error_block(),
            destinations: &destinations,
            selected_destination: Some("EGLL"),
            date: Some("2026-10-18"),
            status: Some(FLIGHT_LOAD_FAILED),
            flights_html: NO_FLIGHTS.to_string(),
        };
        let page = dashboard_page(&view);

        assert!(page.contains(r#"<option value="paris" selected>Paris, France</option>"#));
        assert!(page.contains(r#"<option value="london">London, UK</option>"#));
        assert!(page.contains(r#"<option value="EGLL" selected>EGLL</option>"#));
        assert!(page.contains(WEATHER_FAILED));
        assert!(page.contains(FLIGHT_LOAD_FAILED));
        assert!(page.contains(r#"value="2026-10-18""#));
    }
}
