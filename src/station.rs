//! Reporting station liveness
//!
//! A station's color is driven purely by how long ago it last reported.
//! Missing or garbled timestamps count as infinitely old, so the safe
//! default is "offline".

use crate::airport::AirportDirectory;
use crate::colors::status_color;
use crate::geo::LatLon;
use chrono::{DateTime, NaiveDateTime, Utc};
use crossterm::style::Color;
use std::fmt;

pub const ONLINE_MAX_SECS: f64 = 90.0;
pub const IDLE_MAX_SECS: f64 = 300.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StationStatus {
    Online,
    Idle,
    Offline,
}

impl StationStatus {
    pub fn from_age(age_secs: f64) -> Self {
        if age_secs <= ONLINE_MAX_SECS {
            StationStatus::Online
        } else if age_secs <= IDLE_MAX_SECS {
            StationStatus::Idle
        } else {
            // also NaN and +inf
            StationStatus::Offline
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StationStatus::Online => "online",
            StationStatus::Idle => "idle",
            StationStatus::Offline => "offline",
        }
    }
}

impl fmt::Display for StationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// One row of the station query.
#[derive(Clone, Debug, PartialEq)]
pub struct Station {
    pub name: String,
    pub last_seen_at: Option<String>,
    pub last_origin_lat: Option<f64>,
    pub last_origin_lon: Option<f64>,
    pub last_default_origin: Option<String>,
}

/// A station placed and colored for the current refresh.
#[derive(Clone, Debug, PartialEq)]
pub struct StationMarker {
    pub name: String,
    pub position: Option<LatLon>,
    pub status: StationStatus,
    pub age_secs: f64,
    pub color: Color,
}

/// Parse a server timestamp. Strings without an offset are UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Seconds since `last_seen`, `+inf` when absent or unparseable.
pub fn age_secs(last_seen: Option<&str>, now: DateTime<Utc>) -> f64 {
    match last_seen.and_then(parse_timestamp) {
        Some(ts) => {
            let d = now - ts;
            d.num_microseconds().map_or(d.num_seconds() as f64, |us| us as f64 / 1e6)
        }
        None => f64::INFINITY,
    }
}

impl Station {
    /// Where to draw the station: its reported coordinates, else its default
    /// origin airport.
    pub fn position(&self, airports: &AirportDirectory) -> Option<LatLon> {
        if let (Some(lat), Some(lon)) = (self.last_origin_lat, self.last_origin_lon) {
            let p = LatLon::new(lat, lon);
            if p.is_finite() {
                return Some(p);
            }
        }
        self.last_default_origin
            .as_deref()
            .and_then(|code| airports.lookup(code))
    }

    pub fn marker(&self, airports: &AirportDirectory, now: DateTime<Utc>) -> StationMarker {
        let age = age_secs(self.last_seen_at.as_deref(), now);
        let status = StationStatus::from_age(age);
        StationMarker {
            name: self.name.clone(),
            position: self.position(airports),
            status,
            age_secs: age,
            color: status_color(status),
        }
    }
}

/// Colorize every station; nameless rows are skipped.
pub fn markers(stations: &[Station], airports: &AirportDirectory, now: DateTime<Utc>) -> Vec<StationMarker> {
    stations
        .iter()
        .filter(|s| !s.name.trim().is_empty())
        .map(|s| s.marker(airports, now))
        .collect()
}

/// Compact age for labels: "45s", "12m", "3h", "2d", "never".
pub fn format_age(age_secs: f64) -> String {
    if !age_secs.is_finite() {
        return "never".to_string();
    }
    let secs = age_secs.max(0.0) as u64;
    match secs {
        0..=99 => format!("{}s", secs),
        100..=5999 => format!("{}m", secs / 60),
        6000..=172_799 => format!("{}h", secs / 3600),
        _ => format!("{}d", secs / 86_400),
    }
}
