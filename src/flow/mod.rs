//! Flow geometry
//!
//! Turns one snapshot of raw flow records into screen-ready line geometry:
//! aggregate per ordered pair, resolve airport endpoints, classify the
//! on-screen direction, apply the axis filter, separate opposite-direction
//! pairs and size each line by weight.

pub mod aggregate;
pub mod cardinal;
pub mod separate;
pub mod width;

use crate::airport::{AirportCode, AirportDirectory, PairKey};
use crate::colors::flow_color;
use crate::config::{AxisFilter, ColorMode};
use crate::geo::{LatLon, Projector};
use crossterm::style::Color;

pub use aggregate::aggregate;
pub use cardinal::{classify, classify_pixels, Cardinal};
pub use separate::{bidirectional_pairs, separation_px, zoom_factor};
pub use width::{bead_radius, width_for};

/// One raw row from the flow query. Endpoints may be missing.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowRecord {
    pub origin: Option<String>,
    pub dest: Option<String>,
    pub legs: u64,
    pub weight: f64,
    pub direction: Option<String>,
}

/// Sum of all records for one ordered `(origin, dest)` pair.
#[derive(Clone, Debug, PartialEq)]
pub struct AggregatedFlow {
    pub origin: AirportCode,
    pub dest: AirportCode,
    pub legs: u64,
    pub weight: f64,
    /// Server-side inbound/outbound label, `"mixed"` when rows disagree.
    pub direction: Option<String>,
}

/// A flow ready to draw in the current view.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedFlow {
    pub origin: AirportCode,
    pub dest: AirportCode,
    pub legs: u64,
    pub weight: f64,
    pub cardinal: Cardinal,
    pub width_px: f64,
    pub bead_radius: f64,
    pub separated: bool,
    /// Signed sideways shift in pixels, 0 when not separated.
    pub offset_px: f64,
    pub a: LatLon,
    pub b: LatLon,
    pub color: Color,
}

impl AxisFilter {
    pub fn accepts(self, cardinal: Cardinal) -> bool {
        match self {
            AxisFilter::All => true,
            AxisFilter::East => cardinal == Cardinal::East,
            AxisFilter::West => cardinal == Cardinal::West,
            AxisFilter::North => cardinal == Cardinal::North,
            AxisFilter::South => cardinal == Cardinal::South,
        }
    }
}

/// Display options that shape geometry.
#[derive(Clone, Copy, Debug)]
pub struct GeometryOptions {
    pub axis: AxisFilter,
    pub color_mode: ColorMode,
}

/// Compute every drawable line for a snapshot in the given view.
///
/// Flows whose airports are unknown are skipped. Separation is decided from
/// the full aggregated snapshot, before the axis filter.
pub fn build_geometry<P: Projector + ?Sized>(
    records: &[FlowRecord],
    airports: &AirportDirectory,
    projector: &P,
    opts: GeometryOptions,
) -> Vec<RenderedFlow> {
    let flows = aggregate(records);
    let pairs = bidirectional_pairs(&flows);
    let zoom = projector.zoom();

    let mut out = Vec::with_capacity(flows.len());
    for f in flows {
        let (Some(a), Some(b)) = (airports.get(&f.origin), airports.get(&f.dest)) else {
            log::debug!("no coordinates for {} -> {}", f.origin, f.dest);
            continue;
        };

        let cardinal = classify(a, b, projector);
        if !opts.axis.accepts(cardinal) {
            continue;
        }

        let width_px = width_for(f.weight);
        let key = PairKey::new(&f.origin, &f.dest);
        let separated = pairs.contains(&key);

        let (offset_px, a_draw, b_draw) = if separated {
            let offset = separate::signed_separation_px(width_px, zoom, cardinal);
            let (from, to) = if f.origin == key.low { (a, b) } else { (b, a) };
            let (oa, ob) = separate::offset_segment(a, b, from, to, offset, projector);
            (offset, oa, ob)
        } else {
            (0.0, a, b)
        };

        out.push(RenderedFlow {
            color: flow_color(opts.color_mode, cardinal),
            origin: f.origin,
            dest: f.dest,
            legs: f.legs,
            weight: f.weight,
            cardinal,
            width_px,
            bead_radius: bead_radius(width_px),
            separated,
            offset_px,
            a: a_draw,
            b: b_draw,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Viewport;

    fn rec(o: &str, d: &str, legs: u64, weight: f64) -> FlowRecord {
        FlowRecord {
            origin: Some(o.into()),
            dest: Some(d.into()),
            legs,
            weight,
            direction: None,
        }
    }

    fn airports() -> AirportDirectory {
        AirportDirectory::from_rows([
            ("SEA", 47.4502, -122.3088),
            ("PDX", 45.5898, -122.5951),
            ("GEG", 47.6199, -117.5338),
        ])
    }

    fn view() -> Viewport {
        Viewport::new(LatLon::new(46.8, -120.0), 7.0, 800.0, 600.0)
    }

    fn opts(axis: AxisFilter) -> GeometryOptions {
        GeometryOptions { axis, color_mode: ColorMode::Cardinal }
    }

    #[test]
    fn unknown_airports_are_skipped() {
        let records = vec![rec("SEA", "XXX", 1, 10.0), rec("SEA", "GEG", 1, 10.0)];
        let lines = build_geometry(&records, &airports(), &view(), opts(AxisFilter::All));
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].dest.as_str(), "GEG");
        assert!(!lines[0].separated);
        assert_eq!(lines[0].offset_px, 0.0);
    }

    #[test]
    fn axis_filter_keeps_matching_direction() {
        let records = vec![rec("SEA", "GEG", 1, 10.0), rec("GEG", "SEA", 1, 10.0)];
        let lines = build_geometry(&records, &airports(), &view(), opts(AxisFilter::East));
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].cardinal, Cardinal::East);
        // the hidden reverse flow still makes this a separated pair
        assert!(lines[0].separated);
    }

    #[test]
    fn mono_mode_uses_one_color() {
        let records = vec![rec("SEA", "GEG", 1, 10.0), rec("SEA", "PDX", 1, 10.0)];
        let o = GeometryOptions { axis: AxisFilter::All, color_mode: ColorMode::Mono };
        let lines = build_geometry(&records, &airports(), &view(), o);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].color, lines[1].color);
    }

    #[test]
    fn equal_weights_separate_symmetrically() {
        let records = vec![rec("SEA", "GEG", 1, 400.0), rec("GEG", "SEA", 1, 400.0)];
        let lines = build_geometry(&records, &airports(), &view(), opts(AxisFilter::All));
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.separated));
        assert_eq!(lines[0].offset_px.abs(), lines[1].offset_px.abs());
        assert_eq!(lines[0].offset_px.signum(), -lines[1].offset_px.signum());
    }
}
