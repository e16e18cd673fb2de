//! Side-by-side placement of opposite-direction flows
//!
//! When both A->B and B->A are present the two lines would be drawn on top
//! of each other. Each is pushed sideways by a zoom-dependent pixel distance.
//! The normal comes from the pair's canonical direction (low code -> high
//! code), so it is the same vector for both flows; the cardinal sign then
//! puts East/North bound lines on one side and West/South bound lines on the
//! other.

use super::cardinal::Cardinal;
use super::AggregatedFlow;
use crate::airport::PairKey;
use crate::geo::{LatLon, Pixel, Projector};
use std::collections::HashSet;

const REFERENCE_ZOOM: f64 = 7.0;

/// Scale applied to separation as the map zooms away from the reference level.
pub fn zoom_factor(zoom: f64) -> f64 {
    (1.0 - (zoom - REFERENCE_ZOOM) * 0.07).clamp(0.65, 1.2)
}

/// Unsigned sideways distance in pixels for a line of width `width_px`.
pub fn separation_px(width_px: f64, zoom: f64) -> f64 {
    let lower = (width_px * 0.75).max(3.0);
    let upper = (width_px * 2.0).max(lower);
    (width_px * 1.2 * zoom_factor(zoom)).clamp(lower, upper)
}

/// Signed offset: positive for East/North bound, negative for West/South.
pub fn signed_separation_px(width_px: f64, zoom: f64, cardinal: Cardinal) -> f64 {
    separation_px(width_px, zoom) * cardinal.offset_sign()
}

/// Pairs that have flows in both directions in this snapshot.
pub fn bidirectional_pairs(flows: &[AggregatedFlow]) -> HashSet<PairKey> {
    let present: HashSet<(&str, &str)> = flows
        .iter()
        .map(|f| (f.origin.as_str(), f.dest.as_str()))
        .collect();

    flows
        .iter()
        .filter(|f| f.origin != f.dest)
        .filter(|f| present.contains(&(f.dest.as_str(), f.origin.as_str())))
        .map(|f| PairKey::new(&f.origin, &f.dest))
        .collect()
}

/// Unit normal of the pixel direction `from -> to`; `(0, 1)` for a zero vector.
pub fn unit_normal(from: Pixel, to: Pixel) -> (f64, f64) {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let len = dx.hypot(dy);
    if len < f64::EPSILON {
        return (0.0, 1.0);
    }
    (-dy / len, dx / len)
}

/// Shift segment `a -> b` by `offset_px` along the normal of
/// `canonical_from -> canonical_to`, returning geographic endpoints.
pub fn offset_segment<P: Projector + ?Sized>(
    a: LatLon,
    b: LatLon,
    canonical_from: LatLon,
    canonical_to: LatLon,
    offset_px: f64,
    projector: &P,
) -> (LatLon, LatLon) {
    let (nx, ny) = unit_normal(projector.project(canonical_from), projector.project(canonical_to));
    let (ox, oy) = (nx * offset_px, ny * offset_px);
    let pa = projector.project(a).offset(ox, oy);
    let pb = projector.project(b).offset(ox, oy);
    (projector.unproject(pa), projector.unproject(pb))
}
