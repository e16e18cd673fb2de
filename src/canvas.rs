//! Braille dot canvas
//!
//! Each terminal cell holds a 2x4 grid of dots, giving square-ish pixels at
//! twice the horizontal and four times the vertical cell resolution. Every
//! dot keeps the color of the last thing drawn over it; a cell takes the
//! color of its highest-priority dot.

use crate::geo::Pixel;
use crate::terminal::Terminal;
use crossterm::style::Color;

pub const DOTS_X: usize = 2;
pub const DOTS_Y: usize = 4;

// Dot bit for (row, col) inside a cell
const DOT_BITS: [[u8; 2]; 4] = [[0x01, 0x08], [0x02, 0x10], [0x04, 0x20], [0x40, 0x80]];

#[derive(Clone, Copy)]
struct Dot {
    color: Color,
    layer: u8,
}

pub struct BrailleCanvas {
    width: usize,
    height: usize,
    dots: Vec<Option<Dot>>,
}

impl BrailleCanvas {
    /// Canvas covering `cols` x `rows` terminal cells.
    pub fn new(cols: u16, rows: u16) -> Self {
        let width = cols as usize * DOTS_X;
        let height = rows as usize * DOTS_Y;
        Self {
            width,
            height,
            dots: vec![None; width * height],
        }
    }

    /// Size in dots.
    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn clear(&mut self) {
        self.dots.fill(None);
    }

    /// Set one dot; higher `layer` wins when a cell is colored.
    pub fn plot(&mut self, x: i64, y: i64, color: Color, layer: u8) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        match self.dots[idx] {
            Some(d) if d.layer > layer => {}
            _ => self.dots[idx] = Some(Dot { color, layer }),
        }
    }

    /// Filled disc of radius `r` dots.
    pub fn disc(&mut self, center: Pixel, r: f64, color: Color, layer: u8) {
        let r = r.max(0.5);
        let (cx, cy) = (center.x, center.y);
        let x0 = (cx - r).floor() as i64;
        let x1 = (cx + r).ceil() as i64;
        let y0 = (cy - r).floor() as i64;
        let y1 = (cy + r).ceil() as i64;
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f64 + 0.5 - cx;
                let dy = y as f64 + 0.5 - cy;
                if dx * dx + dy * dy <= r * r {
                    self.plot(x, y, color, layer);
                }
            }
        }
    }

    /// Straight line `width` dots thick. Sampled every half dot so thick
    /// strokes have no gaps.
    pub fn line(&mut self, a: Pixel, b: Pixel, width: f64, color: Color, layer: u8) {
        let margin = width + 1.0;
        let Some((a, b)) = clip(a, b, -margin, -margin, self.width as f64 + margin, self.height as f64 + margin) else {
            return;
        };
        let len = a.distance(b);
        if !len.is_finite() {
            return;
        }
        let steps = (len * 2.0).ceil().max(1.0) as usize;
        let half = width / 2.0;
        for i in 0..=steps {
            let p = a.lerp(b, i as f64 / steps as f64);
            if half <= 0.75 {
                self.plot(p.x.floor() as i64, p.y.floor() as i64, color, layer);
            } else {
                self.disc(p, half, color, layer);
            }
        }
    }

    /// Copy dots into the terminal buffer as braille glyphs.
    pub fn blit(&self, term: &mut Terminal) {
        let cols = self.width / DOTS_X;
        let rows = self.height / DOTS_Y;
        for cy in 0..rows {
            for cx in 0..cols {
                let mut bits = 0u8;
                let mut top: Option<Dot> = None;
                for (row, row_bits) in DOT_BITS.iter().enumerate() {
                    for (col, bit) in row_bits.iter().enumerate() {
                        let idx = (cy * DOTS_Y + row) * self.width + cx * DOTS_X + col;
                        if let Some(dot) = self.dots[idx] {
                            bits |= bit;
                            if top.map_or(true, |t| dot.layer >= t.layer) {
                                top = Some(dot);
                            }
                        }
                    }
                }
                if let Some(dot) = top {
                    let ch = char::from_u32(0x2800 + bits as u32).unwrap_or(' ');
                    term.set(cx as i32, cy as i32, ch, Some(dot.color), dot.layer >= LAYER_BEAD);
                }
            }
        }
    }

    /// Number of lit dots (used by tests).
    pub fn lit(&self) -> usize {
        self.dots.iter().filter(|d| d.is_some()).count()
    }

    pub fn color_at(&self, x: usize, y: usize) -> Option<Color> {
        self.dots.get(y * self.width + x).and_then(|d| d.map(|d| d.color))
    }
}

/// Liang-Barsky clip of segment `a -> b` to a rectangle.
fn clip(a: Pixel, b: Pixel, xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Option<(Pixel, Pixel)> {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let mut t0: f64 = 0.0;
    let mut t1: f64 = 1.0;
    for (p, q) in [(-dx, a.x - xmin), (dx, xmax - a.x), (-dy, a.y - ymin), (dy, ymax - a.y)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }
        }
    }
    if t0 > t1 {
        return None;
    }
    Some((a.lerp(b, t0), a.lerp(b, t1)))
}

pub const LAYER_GRID: u8 = 0;
pub const LAYER_AIRPORT: u8 = 1;
pub const LAYER_LINE: u8 = 2;
pub const LAYER_BEAD: u8 = 3;
pub const LAYER_STATION: u8 = 4;
