//! Dominant on-screen compass direction of a segment

use crate::geo::{LatLon, Pixel, Projector};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cardinal {
    East,
    West,
    North,
    South,
}

impl Cardinal {
    /// East and North bound lines sit on the positive side of a separated pair.
    pub fn offset_sign(self) -> f64 {
        match self {
            Cardinal::East | Cardinal::North => 1.0,
            Cardinal::West | Cardinal::South => -1.0,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Cardinal::East => 'E',
            Cardinal::West => 'W',
            Cardinal::North => 'N',
            Cardinal::South => 'S',
        }
    }
}

impl fmt::Display for Cardinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Cardinal::East => "east",
            Cardinal::West => "west",
            Cardinal::North => "north",
            Cardinal::South => "south",
        };
        f.pad(name)
    }
}

/// Classify two screen points. Ties on |dx| == |dy| go horizontal; a zero
/// vector is East.
pub fn classify_pixels(a: Pixel, b: Pixel) -> Cardinal {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    if dx.abs() >= dy.abs() {
        if dx >= 0.0 { Cardinal::East } else { Cardinal::West }
    } else if dy >= 0.0 {
        Cardinal::South
    } else {
        Cardinal::North
    }
}

/// Classify a geographic segment as it appears in the current view.
pub fn classify<P: Projector + ?Sized>(a: LatLon, b: LatLon, projector: &P) -> Cardinal {
    classify_pixels(projector.project(a), projector.project(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Viewport;

    #[test]
    fn four_quadrants() {
        let o = Pixel::new(0.0, 0.0);
        assert_eq!(classify_pixels(o, Pixel::new(10.0, 3.0)), Cardinal::East);
        assert_eq!(classify_pixels(o, Pixel::new(-10.0, 3.0)), Cardinal::West);
        assert_eq!(classify_pixels(o, Pixel::new(2.0, 10.0)), Cardinal::South);
        assert_eq!(classify_pixels(o, Pixel::new(2.0, -10.0)), Cardinal::North);
    }

    #[test]
    fn diagonal_tie_goes_horizontal() {
        let o = Pixel::new(0.0, 0.0);
        assert_eq!(classify_pixels(o, Pixel::new(5.0, 5.0)), Cardinal::East);
        assert_eq!(classify_pixels(o, Pixel::new(-5.0, -5.0)), Cardinal::West);
    }

    #[test]
    fn equal_points_resolve_east() {
        let p = Pixel::new(3.0, 4.0);
        assert_eq!(classify_pixels(p, p), Cardinal::East);
    }

    #[test]
    fn reversed_segment_flips_sign() {
        let a = Pixel::new(1.0, 1.0);
        for b in [Pixel::new(9.0, 2.0), Pixel::new(0.0, 8.0), Pixel::new(-4.0, -4.0)] {
            let fwd = classify_pixels(a, b);
            let rev = classify_pixels(b, a);
            assert_eq!(fwd.offset_sign(), -rev.offset_sign());
        }
    }

    #[test]
    fn sea_to_pdx_is_south_on_screen() {
        let vp = Viewport::new(LatLon::new(46.5, -122.4), 7.0, 400.0, 400.0);
        let sea = LatLon::new(47.4502, -122.3088);
        let pdx = LatLon::new(45.5898, -122.5951);
        assert_eq!(classify(sea, pdx, &vp), Cardinal::South);
        assert_eq!(classify(pdx, sea, &vp), Cardinal::North);
    }

    #[test]
    fn zoom_keeps_classification() {
        let a = LatLon::new(40.0, -100.0);
        let b = LatLon::new(41.0, -95.0);
        for z in [3.0, 6.0, 9.0, 12.0] {
            let vp = Viewport::new(LatLon::new(40.5, -97.5), z, 300.0, 300.0);
            assert_eq!(classify(a, b, &vp), Cardinal::East);
        }
    }
}
