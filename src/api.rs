//! NetOps data service client
//!
//! Three read-only JSON endpoints: airports, flows, stations. Calls are
//! blocking; the map view runs them on background threads (see `fetcher`).
//! Failures are returned to the caller as-is, never retried here.

use crate::airport::AirportDirectory;
use crate::config::FlowDirection;
use crate::error::Result;
use crate::flow::FlowRecord;
use crate::station::Station;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Deserializer};
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct AirportRow {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub lon: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct FlowRow {
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub dest: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub legs: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub weight_lbs: f64,
    #[serde(default)]
    pub direction: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StationRow {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub last_seen_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub last_origin_lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub last_origin_lon: Option<f64>,
    #[serde(default)]
    pub last_default_origin: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
    Other(IgnoredAny),
}

/// Numbers may arrive as null, as decimal strings or as junk; only real
/// finite numbers come back as `Some`.
fn lenient_opt_f64<'de, D>(de: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let n = match Option::<NumberOrText>::deserialize(de)? {
        Some(NumberOrText::Number(n)) => Some(n),
        Some(NumberOrText::Text(s)) => s.trim().parse().ok(),
        Some(NumberOrText::Other(_)) | None => None,
    };
    Ok(n.filter(|n: &f64| n.is_finite()))
}

/// Like `lenient_opt_f64`, with unreadable values as zero.
fn lenient_f64<'de, D>(de: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_opt_f64(de)?.unwrap_or(0.0))
}

/// Decode a JSON array one element at a time, skipping rows that do not fit.
fn decode_rows<T: DeserializeOwned>(json: &str, what: &str) -> Result<Vec<T>> {
    let values: Vec<serde_json::Value> = serde_json::from_str(json)?;
    Ok(values
        .into_iter()
        .enumerate()
        .filter_map(|(i, value)| match serde_json::from_value(value) {
            Ok(row) => Some(row),
            Err(e) => {
                log::debug!("skipping malformed {} row {}: {}", what, i, e);
                None
            }
        })
        .collect())
}

impl From<FlowRow> for FlowRecord {
    fn from(row: FlowRow) -> Self {
        let legs = if row.legs.is_finite() && row.legs > 0.0 { row.legs.round() as u64 } else { 0 };
        FlowRecord {
            origin: row.origin,
            dest: row.dest,
            legs,
            weight: row.weight_lbs,
            direction: row.direction,
        }
    }
}

impl StationRow {
    fn into_station(self) -> Option<Station> {
        let name = self.name?.trim().to_string();
        if name.is_empty() {
            return None;
        }
        Some(Station {
            name,
            last_seen_at: self.last_seen_at,
            last_origin_lat: self.last_origin_lat,
            last_origin_lon: self.last_origin_lon,
            last_default_origin: self.last_default_origin,
        })
    }
}

/// Rows without a code or either coordinate are dropped.
pub fn airports_from_rows(rows: &[AirportRow]) -> AirportDirectory {
    AirportDirectory::from_rows(rows.iter().filter_map(|r| match (&r.code, r.lat, r.lon) {
        (Some(code), Some(lat), Some(lon)) => Some((code.as_str(), lat, lon)),
        _ => {
            log::debug!("skipping incomplete airport row {:?}", r);
            None
        }
    }))
}

pub fn stations_from_rows(rows: Vec<StationRow>) -> Vec<Station> {
    rows.into_iter().filter_map(StationRow::into_station).collect()
}

/// Decode a flows payload from a JSON string.
pub fn parse_flows(json: &str) -> Result<Vec<FlowRecord>> {
    let rows: Vec<FlowRow> = decode_rows(json, "flow")?;
    Ok(rows.into_iter().map(FlowRecord::from).collect())
}

/// Decode a stations payload from a JSON string.
pub fn parse_stations(json: &str) -> Result<Vec<Station>> {
    let rows: Vec<StationRow> = decode_rows(json, "station")?;
    Ok(stations_from_rows(rows))
}

/// Decode an airport directory payload from a JSON string.
pub fn parse_airports(json: &str) -> Result<AirportDirectory> {
    let rows: Vec<AirportRow> = decode_rows(json, "airport")?;
    Ok(airports_from_rows(&rows))
}

#[derive(Clone)]
pub struct ApiClient {
    base: String,
    agent: ureq::Agent,
}

impl ApiClient {
    pub fn new(base: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            base: base.trim_end_matches('/').to_string(),
            agent,
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn get_text(&self, path: &str, query: &[(&str, &str)]) -> Result<String> {
        let url = format!("{}{}", self.base, path);
        let mut req = self.agent.get(&url);
        for (k, v) in query {
            req = req.query(k, v);
        }
        log::debug!("GET {} {:?}", url, query);
        let body = req.call()?.into_string()?;
        Ok(body)
    }

    pub fn airports(&self) -> Result<AirportDirectory> {
        let dir = parse_airports(&self.get_text("/api/airports", &[])?)?;
        log::info!("loaded {} airports", dir.len());
        Ok(dir)
    }

    pub fn flows(&self, hours: u32, direction: FlowDirection) -> Result<Vec<FlowRecord>> {
        let hours = hours.to_string();
        let body = self.get_text(
            "/api/flows",
            &[("hours", hours.as_str()), ("direction", direction.as_query())],
        )?;
        let flows = parse_flows(&body)?;
        log::info!("fetched {} flow rows ({}h, {})", flows.len(), hours, direction);
        Ok(flows)
    }

    pub fn stations(&self) -> Result<Vec<Station>> {
        let stations = parse_stations(&self.get_text("/api/stations", &[])?)?;
        log::info!("fetched {} stations", stations.len());
        Ok(stations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flow_rows_tolerate_missing_fields() {
        let json = r#"[
            {"origin":"SEA","dest":"PDX","legs":3,"weight_lbs":5000.0,"direction":"outbound"},
            {"origin":null,"dest":"PDX","legs":1,"weight_lbs":10},
            {"origin":"GEG","dest":"BOI","legs":null,"weight_lbs":null}
        ]"#;
        let flows = parse_flows(json).unwrap();
        assert_eq!(flows.len(), 3);
        assert_eq!(flows[0].legs, 3);
        assert_eq!(flows[0].weight, 5000.0);
        assert_eq!(flows[0].direction.as_deref(), Some("outbound"));
        assert_eq!(flows[1].origin, None);
        assert_eq!(flows[2].legs, 0);
        assert_eq!(flows[2].weight, 0.0);
    }

    #[test]
    fn decimal_strings_are_numbers() {
        let json = r#"[{"origin":"SEA","dest":"PDX","legs":"2","weight_lbs":"1234.5"},
                       {"origin":"SEA","dest":"PDX","legs":"n/a","weight_lbs":"-"}]"#;
        let flows = parse_flows(json).unwrap();
        assert_eq!(flows[0].legs, 2);
        assert_eq!(flows[0].weight, 1234.5);
        assert_eq!(flows[1].legs, 0);
        assert_eq!(flows[1].weight, 0.0);
    }

    #[test]
    fn bad_airport_rows_do_not_sink_the_payload() {
        let json = r#"[
            {"code":"SEA","lat":47.45,"lon":-122.31},
            {"code":"BAD","lat":null,"lon":-120.0},
            {"code":"NOL","lon":-121.0},
            {"code":"PDX","lat":"45.59","lon":"-122.60"},
            {"code":7,"lat":1.0,"lon":1.0},
            {"code":"GEG","lat":true,"lon":-117.53},
            "not an object"
        ]"#;
        let dir = parse_airports(json).unwrap();
        assert_eq!(dir.len(), 2);
        assert!(dir.lookup("SEA").is_some());
        assert_eq!(dir.lookup("PDX").map(|p| p.lat), Some(45.59));
        assert!(dir.lookup("BAD").is_none());
        assert!(dir.lookup("GEG").is_none());
    }

    #[test]
    fn bad_station_rows_are_skipped_or_softened() {
        let json = r#"[
            {"name":"A","last_seen_at":"2025-08-24T12:00:00Z"},
            {"name":"B","last_origin_lat":"47.1","last_origin_lon":"-122.2"},
            {"name":"C","last_origin_lat":"north","last_origin_lon":{"x":1}},
            {"name":["D"]}
        ]"#;
        let stations = parse_stations(json).unwrap();
        let names: Vec<&str> = stations.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(stations[1].last_origin_lat, Some(47.1));
        assert_eq!(stations[1].last_origin_lon, Some(-122.2));
        assert_eq!(stations[2].last_origin_lat, None);
        assert_eq!(stations[2].last_origin_lon, None);
    }

    #[test]
    fn station_rows_without_name_are_dropped() {
        let json = r#"[
            {"name":"SEA1","last_seen_at":"2025-08-24T12:00:00+00:00","last_default_origin":"SEA"},
            {"name":null,"last_seen_at":null},
            {"name":"  "}
        ]"#;
        let stations = parse_stations(json).unwrap();
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].name, "SEA1");
        assert_eq!(stations[0].last_origin_lat, None);
    }

    #[test]
    fn airport_payload_builds_directory() {
        let json = r#"[{"code":"sea","lat":47.45,"lon":-122.31},{"code":"","lat":0,"lon":0}]"#;
        let dir = parse_airports(json).unwrap();
        assert_eq!(dir.len(), 1);
        assert!(dir.lookup("SEA").is_some());
    }

    #[test]
    fn malformed_payload_is_an_error() {
        assert!(parse_flows("{not json").is_err());
        assert!(parse_stations(r#"{"name":"x"}"#).is_err());
    }

    #[test]
    fn client_trims_base_url() {
        let client = ApiClient::new("http://localhost:8000/", Duration::from_secs(1));
        assert_eq!(client.base(), "http://localhost:8000");
    }
}
