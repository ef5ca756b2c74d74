//! "Here" entry for the city selector.
//!
//! [`current_location`] geolocates the host by IP and turns the result into a
//! [`City`] so it can sit next to the fixed European list. Any failure falls
//! back to London so the weather widget always has something to show.

use ipgeolocate::{Locator, Service};
use tracing::{error, info};

use crate::api::{Geocoder, UNKNOWN_LOCATION};
use crate::models::City;
use crate::weather;

pub const HERE_KEY: &str = "here";

// ip-api answers for the requesting host when the query is empty.
const OWN_ADDRESS: &str = "";

fn fallback() -> City {
    weather::city(weather::DEFAULT_CITY).unwrap_or(City {
        key: weather::DEFAULT_CITY.to_string(),
        latitude: 51.5074,
        longitude: -0.1278,
        name: "London, UK".to_string(),
    })
}

/// Parsed IP lookup: coordinates plus the service's own label, if it had a city.
#[derive(Debug, PartialEq)]
struct Fix {
    latitude: f64,
    longitude: f64,
    label: Option<String>,
}

impl Fix {
    fn from_locator(loc: &Locator) -> Option<Self> {
        let latitude = loc.latitude.trim().parse::<f64>().ok()?;
        let longitude = loc.longitude.trim().parse::<f64>().ok()?;
        let label = (!loc.city.is_empty()).then(|| {
            let region = if loc.region.is_empty() { &loc.country } else { &loc.region };
            format!("{}, {}", loc.city, region)
        });
        Some(Self {
            latitude,
            longitude,
            label,
        })
    }
}

fn here_city(latitude: f64, longitude: f64, name: String) -> City {
    City {
        key: HERE_KEY.to_string(),
        latitude,
        longitude,
        name: if name == UNKNOWN_LOCATION {
            format!("Here ({:.2}, {:.2})", latitude, longitude)
        } else {
            name
        },
    }
}

/// Resolves the host's approximate location via IP geolocation.
///
/// Uses the [IpApi](https://ip-api.com/) service. The label comes from the
/// service's city/region when present, otherwise from `geocoder`.
pub async fn current_location(geocoder: &Geocoder) -> City {
    match Locator::get(OWN_ADDRESS, Service::IpApi).await {
        Ok(loc) => {
            let Some(fix) = Fix::from_locator(&loc) else {
                error!("Geolocation returned unparsable coordinates. Using London.");
                return fallback();
            };

            let name = match fix.label {
                Some(label) => label,
                None => geocoder.city_label(fix.latitude, fix.longitude).await,
            };
            info!("Geolocation successful - {} ({}, {})", name, fix.latitude, fix.longitude);
            here_city(fix.latitude, fix.longitude, name)
        }
        Err(e) => {
            error!("Error using geolocation service: {}. Using London as default area.", e);
            fallback()
        }
    }
}
