//! Map session context
//!
//! Owns everything the map needs between frames: the airport directory, the
//! latest flow and station snapshots, the derived line geometry, station
//! markers, the viewport and the bead animator. Every geometry change goes
//! through `redraw`, which always runs stop -> clear -> compute -> start.

use crate::airport::AirportDirectory;
use crate::beads::{beads_for, Bead, BeadAnimator};
use crate::config::{AxisFilter, BeadConfig, ColorMode, MapConfig, MAX_BALLS};
use crate::flow::{build_geometry, FlowRecord, GeometryOptions, RenderedFlow};
use crate::geo::{LatLon, Projector, Viewport};
use crate::station::{markers, Station, StationMarker};
use chrono::{DateTime, Utc};
use std::time::Instant;

pub struct MapSession {
    airports: AirportDirectory,
    flow_records: Vec<FlowRecord>,
    stations: Vec<Station>,
    lines: Vec<RenderedFlow>,
    markers: Vec<StationMarker>,
    animator: BeadAnimator,
    options: GeometryOptions,
    beads: BeadConfig,
    viewport: Viewport,
    home: (LatLon, f64),
    flows_updated: Option<DateTime<Utc>>,
    stations_updated: Option<DateTime<Utc>>,
}

impl MapSession {
    pub fn new(config: &MapConfig, width_px: f64, height_px: f64) -> Self {
        Self {
            airports: AirportDirectory::new(),
            flow_records: Vec::new(),
            stations: Vec::new(),
            lines: Vec::new(),
            markers: Vec::new(),
            animator: BeadAnimator::new(),
            options: GeometryOptions {
                axis: config.axis,
                color_mode: config.color_mode,
            },
            beads: config.beads.validated(),
            viewport: Viewport::new(config.center, config.zoom, width_px, height_px),
            home: (config.center, config.zoom),
            flows_updated: None,
            stations_updated: None,
        }
    }

    // --- snapshot intake -------------------------------------------------

    pub fn set_airports(&mut self, airports: AirportDirectory, now: Instant, wall: DateTime<Utc>) {
        self.airports = airports;
        self.redraw(now);
        self.restation(wall);
    }

    pub fn apply_flows(&mut self, records: Vec<FlowRecord>, now: Instant, wall: DateTime<Utc>) {
        self.flow_records = records;
        self.flows_updated = Some(wall);
        self.redraw(now);
    }

    pub fn apply_stations(&mut self, stations: Vec<Station>, wall: DateTime<Utc>) {
        self.stations = stations;
        self.stations_updated = Some(wall);
        self.restation(wall);
    }

    /// Recolor station markers for the current time without refetching.
    pub fn restation(&mut self, now: DateTime<Utc>) {
        self.markers = markers(&self.stations, &self.airports, now);
    }

    // --- geometry --------------------------------------------------------

    /// Rebuild lines and beads from the current snapshot and view.
    pub fn redraw(&mut self, now: Instant) {
        self.animator.stop();
        self.lines.clear();
        self.lines = build_geometry(&self.flow_records, &self.airports, &self.viewport, self.options);
        log::debug!(
            "redraw: {} lines ({} separated) at zoom {:.1}",
            self.lines.len(),
            self.lines.iter().filter(|l| l.separated).count(),
            self.viewport.zoom()
        );
        if self.beads.enabled && !self.lines.is_empty() {
            let beads: Vec<Bead> = self
                .lines
                .iter()
                .flat_map(|line| beads_for(line, &self.beads, &self.viewport))
                .collect();
            self.animator.start(beads, now);
        }
    }

    /// Advance beads for one presented frame.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.animator.tick(now, &self.viewport)
    }

    // --- controls --------------------------------------------------------

    pub fn set_axis(&mut self, axis: AxisFilter, now: Instant) {
        self.options.axis = axis;
        self.redraw(now);
    }

    pub fn set_color_mode(&mut self, mode: ColorMode, now: Instant) {
        self.options.color_mode = mode;
        self.redraw(now);
    }

    pub fn set_beads_enabled(&mut self, enabled: bool, now: Instant) {
        self.beads.enabled = enabled;
        self.redraw(now);
    }

    pub fn set_max_beads(&mut self, max_beads: u32, now: Instant) {
        self.beads.max_beads = max_beads.clamp(1, MAX_BALLS);
        self.redraw(now);
    }

    pub fn set_paused(&mut self, paused: bool, now: Instant) {
        self.animator.set_paused(paused, now);
    }

    pub fn zoom_by(&mut self, delta: f64, now: Instant) {
        let z = self.viewport.zoom();
        self.viewport.set_zoom(z + delta);
        self.redraw(now);
    }

    pub fn pan(&mut self, dx_px: f64, dy_px: f64, now: Instant) {
        self.viewport.pan_pixels(dx_px, dy_px);
        self.redraw(now);
    }

    pub fn resize(&mut self, width_px: f64, height_px: f64, now: Instant) {
        self.viewport.resize(width_px, height_px);
        self.redraw(now);
    }

    pub fn reset_view(&mut self, now: Instant) {
        let (center, zoom) = self.home;
        self.viewport.set_center(center);
        self.viewport.set_zoom(zoom);
        self.redraw(now);
    }

    // --- accessors -------------------------------------------------------

    pub fn airports(&self) -> &AirportDirectory {
        &self.airports
    }

    pub fn lines(&self) -> &[RenderedFlow] {
        &self.lines
    }

    pub fn beads(&self) -> &[Bead] {
        self.animator.beads()
    }

    pub fn markers(&self) -> &[StationMarker] {
        &self.markers
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn options(&self) -> GeometryOptions {
        self.options
    }

    pub fn bead_config(&self) -> BeadConfig {
        self.beads
    }

    pub fn is_animating(&self) -> bool {
        self.animator.is_running()
    }

    pub fn is_paused(&self) -> bool {
        self.animator.is_paused()
    }

    pub fn flow_count(&self) -> usize {
        self.flow_records.len()
    }

    pub fn flows_updated(&self) -> Option<DateTime<Utc>> {
        self.flows_updated
    }

    pub fn stations_updated(&self) -> Option<DateTime<Utc>> {
        self.stations_updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::station::StationStatus;
    use chrono::TimeZone;

    fn rec(o: &str, d: &str, weight: f64) -> FlowRecord {
        FlowRecord {
            origin: Some(o.into()),
            dest: Some(d.into()),
            legs: 1,
            weight,
            direction: None,
        }
    }

    fn session() -> MapSession {
        let cfg = MapConfig {
            center: LatLon::new(46.5, -122.4),
            ..MapConfig::default()
        };
        let mut s = MapSession::new(&cfg, 400.0, 400.0);
        s.set_airports(
            AirportDirectory::from_rows([
                ("SEA", 47.4502, -122.3088),
                ("PDX", 45.5898, -122.5951),
            ]),
            Instant::now(),
            Utc::now(),
        );
        s
    }

    #[test]
    fn snapshot_change_drops_stale_separation() {
        let mut s = session();
        let now = Instant::now();
        s.apply_flows(vec![rec("SEA", "PDX", 100.0), rec("PDX", "SEA", 100.0)], now, Utc::now());
        assert!(s.lines().iter().all(|l| l.separated));

        s.apply_flows(vec![rec("SEA", "PDX", 100.0)], now, Utc::now());
        assert_eq!(s.lines().len(), 1);
        assert!(!s.lines()[0].separated);
        assert_eq!(s.lines()[0].offset_px, 0.0);
    }

    #[test]
    fn redraw_rebuilds_beads_instead_of_accumulating() {
        let mut s = session();
        let now = Instant::now();
        s.apply_flows(vec![rec("SEA", "PDX", 20_000.0)], now, Utc::now());
        let n = s.beads().len();
        assert!(n >= 1);
        for _ in 0..5 {
            s.zoom_by(0.0, now);
        }
        assert_eq!(s.beads().len(), n);
    }

    #[test]
    fn disabling_animation_stops_beads() {
        let mut s = session();
        let now = Instant::now();
        s.apply_flows(vec![rec("SEA", "PDX", 500.0)], now, Utc::now());
        assert!(s.is_animating());
        s.set_beads_enabled(false, now);
        assert!(!s.is_animating());
        assert!(s.beads().is_empty());
        assert_eq!(s.lines().len(), 1);
    }

    #[test]
    fn zoom_changes_offset_without_refetch() {
        let mut s = session();
        let now = Instant::now();
        s.apply_flows(vec![rec("SEA", "PDX", 5000.0), rec("PDX", "SEA", 5000.0)], now, Utc::now());
        let before = s.lines()[0].offset_px.abs();
        s.zoom_by(5.0, now);
        let after = s.lines()[0].offset_px.abs();
        assert!(after < before);
        assert_eq!(s.flow_count(), 2);
    }

    #[test]
    fn stations_are_recolored_over_time() {
        let mut s = session();
        let seen = Utc::now();
        s.apply_stations(
            vec![Station {
                name: "SEA1".into(),
                last_seen_at: Some(seen.to_rfc3339()),
                last_origin_lat: None,
                last_origin_lon: None,
                last_default_origin: Some("SEA".into()),
            }],
            seen,
        );
        assert_eq!(s.markers()[0].status, StationStatus::Online);
        assert!(s.markers()[0].position.is_some());
        s.restation(seen + chrono::Duration::seconds(400));
        assert_eq!(s.markers()[0].status, StationStatus::Offline);
    }

    #[test]
    fn late_airports_place_stations_at_the_given_time() {
        let cfg = MapConfig::default();
        let mut s = MapSession::new(&cfg, 400.0, 400.0);
        let seen = Utc.with_ymd_and_hms(2025, 8, 24, 12, 0, 0).unwrap();
        s.apply_stations(
            vec![Station {
                name: "SEA1".into(),
                last_seen_at: Some(seen.to_rfc3339()),
                last_origin_lat: None,
                last_origin_lon: None,
                last_default_origin: Some("SEA".into()),
            }],
            seen,
        );
        assert!(s.markers()[0].position.is_none());

        let later = seen + chrono::Duration::seconds(120);
        s.set_airports(AirportDirectory::from_rows([("SEA", 47.4502, -122.3088)]), Instant::now(), later);
        let m = &s.markers()[0];
        assert!(m.position.is_some());
        assert_eq!(m.age_secs, 120.0);
        assert_eq!(m.status, StationStatus::Idle);
    }

    #[test]
    fn max_beads_is_clamped() {
        let mut s = session();
        s.set_max_beads(99, Instant::now());
        assert_eq!(s.bead_config().max_beads, MAX_BALLS);
        s.set_max_beads(0, Instant::now());
        assert_eq!(s.bead_config().max_beads, 1);
    }
}
