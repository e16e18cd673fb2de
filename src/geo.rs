//! Web Mercator viewport
//!
//! Converts geographic coordinates to screen pixels and back for the current
//! zoom and pan. A "pixel" is one braille dot on the terminal canvas, so a
//! character cell is 2 pixels wide and 4 pixels tall.

use std::f64::consts::PI;

const TILE_SIZE: f64 = 256.0;
const MAX_LATITUDE: f64 = 85.051_128_78;

pub const MIN_ZOOM: f64 = 2.0;
pub const MAX_ZOOM: f64 = 12.0;

/// A geographic coordinate in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

/// A screen-space point; y grows downward.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Pixel {
    pub x: f64,
    pub y: f64,
}

impl Pixel {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn lerp(self, other: Pixel, t: f64) -> Self {
        Self::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    pub fn distance(self, other: Pixel) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Anything that can place geographic points on the screen.
pub trait Projector {
    fn project(&self, point: LatLon) -> Pixel;
    fn unproject(&self, pixel: Pixel) -> LatLon;
    fn zoom(&self) -> f64;
}

/// Current map view: center, zoom and canvas size in pixels.
#[derive(Clone, Debug)]
pub struct Viewport {
    center: LatLon,
    zoom: f64,
    width: f64,
    height: f64,
}

impl Viewport {
    pub fn new(center: LatLon, zoom: f64, width: f64, height: f64) -> Self {
        Self {
            center: clamp_latlon(center),
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    pub fn center(&self) -> LatLon {
        self.center
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width.max(1.0);
        self.height = height.max(1.0);
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn set_center(&mut self, center: LatLon) {
        self.center = clamp_latlon(center);
    }

    /// Shift the view by a screen distance, keeping zoom.
    pub fn pan_pixels(&mut self, dx: f64, dy: f64) {
        let c = self.world_pixel(self.center);
        self.center = clamp_latlon(self.world_latlon(c.offset(dx, dy)));
    }

    /// True when the pixel lies on the canvas (with a margin).
    pub fn contains(&self, p: Pixel, margin: f64) -> bool {
        p.x >= -margin && p.y >= -margin && p.x <= self.width + margin && p.y <= self.height + margin
    }

    fn world_size(&self) -> f64 {
        TILE_SIZE * 2f64.powf(self.zoom)
    }

    fn world_pixel(&self, point: LatLon) -> Pixel {
        let size = self.world_size();
        let lat = point.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
        let x = (point.lon + 180.0) / 360.0 * size;
        let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * size;
        Pixel::new(x, y)
    }

    fn world_latlon(&self, p: Pixel) -> LatLon {
        let size = self.world_size();
        let lon = p.x / size * 360.0 - 180.0;
        let n = PI - 2.0 * PI * p.y / size;
        let lat = n.sinh().atan().to_degrees();
        LatLon::new(lat, lon)
    }
}

impl Projector for Viewport {
    fn project(&self, point: LatLon) -> Pixel {
        let origin = self.world_pixel(self.center);
        let p = self.world_pixel(point);
        Pixel::new(
            p.x - origin.x + self.width / 2.0,
            p.y - origin.y + self.height / 2.0,
        )
    }

    fn unproject(&self, pixel: Pixel) -> LatLon {
        let origin = self.world_pixel(self.center);
        self.world_latlon(Pixel::new(
            pixel.x + origin.x - self.width / 2.0,
            pixel.y + origin.y - self.height / 2.0,
        ))
    }

    fn zoom(&self) -> f64 {
        self.zoom
    }
}

fn clamp_latlon(p: LatLon) -> LatLon {
    let lon = (p.lon + 180.0).rem_euclid(360.0) - 180.0;
    LatLon::new(p.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE), lon)
}
