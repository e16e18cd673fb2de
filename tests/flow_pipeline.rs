//! End-to-end checks from API payloads to drawable geometry.

use chrono::{TimeZone, Utc};
use netops_map::api::{parse_airports, parse_flows, parse_stations};
use netops_map::beads::{beads_for, bead_count};
use netops_map::config::{AxisFilter, BeadConfig, ColorMode};
use netops_map::flow::{build_geometry, width_for, Cardinal, GeometryOptions};
use netops_map::geo::{LatLon, Viewport};
use netops_map::station::{markers, StationStatus};

const AIRPORTS: &str = r#"[
    {"code": "SEA", "lat": 47.4502, "lon": -122.3088},
    {"code": "PDX", "lat": 45.5898, "lon": -122.5951},
    {"code": "GEG", "lat": 47.6199, "lon": -117.5338}
]"#;

fn view() -> Viewport {
    Viewport::new(LatLon::new(46.5, -121.0), 7.0, 1200.0, 800.0)
}

fn all() -> GeometryOptions {
    GeometryOptions { axis: AxisFilter::All, color_mode: ColorMode::Cardinal }
}

#[test]
fn opposite_flows_land_on_opposite_sides() {
    let airports = parse_airports(AIRPORTS).unwrap();
    let records = parse_flows(
        r#"[
            {"origin": "sea", "dest": "PDX", "legs": 3, "weight_lbs": 5000},
            {"origin": "PDX", "dest": "SEA", "legs": 1, "weight_lbs": "100"}
        ]"#,
    )
    .unwrap();

    let lines = build_geometry(&records, &airports, &view(), all());
    assert_eq!(lines.len(), 2);
    let south = lines.iter().find(|l| l.origin.as_str() == "SEA").unwrap();
    let north = lines.iter().find(|l| l.origin.as_str() == "PDX").unwrap();

    assert_eq!(south.cardinal, Cardinal::South);
    assert_eq!(north.cardinal, Cardinal::North);
    assert!(south.separated && north.separated);
    assert!(south.offset_px < 0.0);
    assert!(north.offset_px > 0.0);
    assert!(south.width_px > north.width_px);
    assert_eq!(south.width_px, width_for(5000.0));

    // the offset lines sit on different sides of the airport-to-airport axis
    assert!((south.a.lon - (-122.3088)) * (north.b.lon - (-122.3088)) < 0.0);

    let cfg = BeadConfig::default();
    assert!(bead_count(south.weight, &cfg) >= bead_count(north.weight, &cfg));
    assert!(!beads_for(north, &cfg, &view()).is_empty());
}

#[test]
fn duplicate_rows_are_summed_before_drawing() {
    let airports = parse_airports(AIRPORTS).unwrap();
    let records = parse_flows(
        r#"[
            {"origin": "SEA", "dest": "GEG", "legs": 1, "weight_lbs": 200},
            {"origin": "SEA", "dest": "GEG", "legs": 2, "weight_lbs": 300},
            {"origin": "", "dest": "GEG", "legs": 9, "weight_lbs": 900}
        ]"#,
    )
    .unwrap();
    let lines = build_geometry(&records, &airports, &view(), all());
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].legs, 3);
    assert_eq!(lines[0].weight, 500.0);
    assert_eq!(lines[0].cardinal, Cardinal::East);
    assert!(!lines[0].separated);
}

#[test]
fn station_status_follows_last_report() {
    let airports = parse_airports(AIRPORTS).unwrap();
    let stations = parse_stations(
        r#"[
            {"name": "A", "last_seen_at": "2025-08-24T11:59:00Z", "last_default_origin": "SEA"},
            {"name": "B", "last_seen_at": "2025-08-24T11:57:00", "last_origin_lat": 45.6, "last_origin_lon": -122.6},
            {"name": "C", "last_seen_at": "2025-08-24T11:00:00+00:00"},
            {"name": "D", "last_seen_at": "not a time", "last_default_origin": "GEG"}
        ]"#,
    )
    .unwrap();
    let now = Utc.with_ymd_and_hms(2025, 8, 24, 12, 0, 0).unwrap();
    let marks = markers(&stations, &airports, now);

    let status: Vec<StationStatus> = marks.iter().map(|m| m.status).collect();
    assert_eq!(
        status,
        vec![StationStatus::Online, StationStatus::Idle, StationStatus::Offline, StationStatus::Offline]
    );
    assert!(marks[0].position.is_some());
    assert_eq!(marks[1].position, Some(LatLon::new(45.6, -122.6)));
    assert!(marks[2].position.is_none());
    assert!(marks[3].age_secs.is_infinite());
}
