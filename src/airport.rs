//! Airport codes and the session airport directory

use crate::error::{MapError, Result};
use crate::geo::LatLon;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

const MAX_CODE_LEN: usize = 8;

/// Upper-cased, trimmed airport identifier (IATA/ICAO style).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AirportCode(String);

impl AirportCode {
    /// Normalize and validate a raw code. Accepts 1-8 ASCII alphanumerics.
    pub fn parse(raw: &str) -> Result<Self> {
        let code = raw.trim().to_ascii_uppercase();
        let valid = !code.is_empty()
            && code.len() <= MAX_CODE_LEN
            && code.chars().all(|c| c.is_ascii_alphanumeric());
        if valid {
            Ok(Self(code))
        } else {
            Err(MapError::InvalidAirportCode(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for AirportCode {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for AirportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Unordered airport pair; `low` sorts before `high`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PairKey {
    pub low: AirportCode,
    pub high: AirportCode,
}

impl PairKey {
    pub fn new(a: &AirportCode, b: &AirportCode) -> Self {
        if a <= b {
            Self { low: a.clone(), high: b.clone() }
        } else {
            Self { low: b.clone(), high: a.clone() }
        }
    }
}

/// Code -> coordinates lookup, loaded once per session.
#[derive(Clone, Debug, Default)]
pub struct AirportDirectory {
    airports: HashMap<AirportCode, LatLon>,
}

impl AirportDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw rows, skipping invalid codes and non-finite coordinates.
    pub fn from_rows<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, f64, f64)>,
    {
        let mut dir = Self::new();
        for (code, lat, lon) in rows {
            let pos = LatLon::new(lat, lon);
            match AirportCode::parse(code) {
                Ok(code) if pos.is_finite() => {
                    dir.airports.insert(code, pos);
                }
                _ => log::debug!("skipping airport row {:?} ({}, {})", code, lat, lon),
            }
        }
        dir
    }

    pub fn insert(&mut self, code: AirportCode, pos: LatLon) {
        self.airports.insert(code, pos);
    }

    pub fn get(&self, code: &AirportCode) -> Option<LatLon> {
        self.airports.get(code).copied()
    }

    /// Lookup from an unvalidated string.
    pub fn lookup(&self, raw: &str) -> Option<LatLon> {
        AirportCode::parse(raw).ok().and_then(|c| self.get(&c))
    }

    pub fn len(&self) -> usize {
        self.airports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.airports.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AirportCode, &LatLon)> {
        self.airports.iter()
    }
}
