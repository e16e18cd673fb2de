//! Weight -> line thickness

pub const MIN_WIDTH: f64 = 1.0;
pub const MAX_WIDTH: f64 = 8.0;
const MIN_BEAD_RADIUS: f64 = 2.0;

/// Line width in pixels for an aggregate weight, always within `[1, 8]`.
pub fn width_for(weight: f64) -> f64 {
    if !weight.is_finite() || weight <= 0.0 {
        return MIN_WIDTH;
    }
    let w = (1.0 + weight / 50.0).log10() * 10.0 * 0.5;
    w.clamp(MIN_WIDTH, MAX_WIDTH)
}

pub fn bead_radius(width: f64) -> f64 {
    width.max(MIN_BEAD_RADIUS)
}
