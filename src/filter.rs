//! Flight selection by contact date or destination.
//!
//! Both filters borrow the fetched snapshot and return clones of the matching
//! records in upstream order. Records without the field a filter needs are
//! dropped.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{Error, Result};
use crate::models::StateVector;

pub const SECONDS_PER_DAY: i64 = 86_400;

/// Unix timestamp of 00:00:00 UTC on `date` (`YYYY-MM-DD`).
pub fn utc_midnight(date: &str) -> Result<i64> {
    let day = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| Error::InvalidDate(date.to_string()))?;
    Ok(midnight_of(day))
}

pub fn midnight_of(day: NaiveDate) -> i64 {
    day.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

/// Unix timestamp of the most recent UTC midnight before `now`.
pub fn today_midnight(now: DateTime<Utc>) -> i64 {
    midnight_of(now.date_naive())
}

/// Keeps records whose last contact falls in `[midnight, midnight + 1 day)`.
pub fn by_date(states: &[StateVector], date: &str) -> Result<Vec<StateVector>> {
    let start = utc_midnight(date)?;
    let end = start + SECONDS_PER_DAY;

    Ok(states
        .iter()
        .filter(|s| matches!(s.last_contact, Some(t) if t >= start && t < end))
        .cloned()
        .collect())
}

/// Keeps today's records (UTC) that are bound for `destination`.
pub fn by_destination(
    states: &[StateVector],
    destination: &str,
    now: DateTime<Utc>,
) -> Vec<StateVector> {
    let start = today_midnight(now);

    states
        .iter()
        .filter(|s| matches!(s.last_contact, Some(t) if t >= start))
        .filter(|s| {
            s.destination
                .as_deref()
                .is_some_and(|d| !d.is_empty() && d == destination)
        })
        .cloned()
        .collect()
}

/// Distinct non-empty destinations in the snapshot, sorted for a selector.
pub fn destinations(states: &[StateVector]) -> Vec<String> {
    let mut out: Vec<String> = states
        .iter()
        .filter_map(|s| s.destination.clone())
        .filter(|d| !d.is_empty())
        .collect();
    out.sort();
    out.dedup();
    out
}
