//! Directional bead animation
//!
//! Each rendered flow carries a handful of beads that travel from origin to
//! destination at a constant on-screen speed. The number of beads, not their
//! speed, encodes volume. The animator is a cancellable task driven by the
//! host frame loop: `start` hands out a handle, `stop` is idempotent and
//! always runs first, and `tick` does nothing while stopped.

use crate::config::BeadConfig;
use crate::flow::RenderedFlow;
use crate::geo::{LatLon, Projector};
use crossterm::style::Color;
use std::time::Instant;

pub const SPEED_PX_PER_SEC: f64 = 90.0;
/// Longest step a single tick may take, so a stalled loop doesn't teleport beads.
pub const MAX_TICK_SECS: f64 = 0.05;
const MIN_SEGMENT_PX: f64 = 1.0;

#[derive(Clone, Debug, PartialEq)]
pub struct Bead {
    pub a: LatLon,
    pub b: LatLon,
    pub color: Color,
    pub radius: f64,
    /// Progress along the segment, always in `[0, 1)`.
    pub t: f64,
    pub position: LatLon,
}

impl Bead {
    /// Recompute `position` from `t` using the current view.
    pub fn place<P: Projector + ?Sized>(&mut self, projector: &P) {
        let pa = projector.project(self.a);
        let pb = projector.project(self.b);
        self.position = projector.unproject(pa.lerp(pb, self.t));
    }

    /// Move forward by `dt` seconds along the segment as it is now on screen.
    pub fn advance<P: Projector + ?Sized>(&mut self, dt: f64, projector: &P) {
        let pa = projector.project(self.a);
        let pb = projector.project(self.b);
        let len = pa.distance(pb).max(MIN_SEGMENT_PX);
        self.t = wrap_unit(self.t + SPEED_PX_PER_SEC * dt / len);
        self.position = projector.unproject(pa.lerp(pb, self.t));
    }
}

/// Wrap into `[0, 1)`.
pub fn wrap_unit(t: f64) -> f64 {
    if !t.is_finite() {
        return 0.0;
    }
    let w = t.rem_euclid(1.0);
    if w >= 1.0 { 0.0 } else { w }
}

/// How many beads a flow of `weight` gets, in `[1, max_beads]`.
pub fn bead_count(weight: f64, cfg: &BeadConfig) -> u32 {
    let max = cfg.max_beads.max(1);
    let weight = if weight.is_finite() { weight.max(0.0) } else { 0.0 };
    let weight_at_max = if cfg.weight_at_max > 0.0 { cfg.weight_at_max } else { 1.0 };
    let raw = (weight / weight_at_max * max as f64).ceil();
    (raw.min(max as f64) as u32).clamp(1, max)
}

/// Evenly phased beads for one flow.
pub fn beads_for<P: Projector + ?Sized>(flow: &RenderedFlow, cfg: &BeadConfig, projector: &P) -> Vec<Bead> {
    let count = bead_count(flow.weight, cfg);
    (0..count)
        .map(|i| {
            let mut bead = Bead {
                a: flow.a,
                b: flow.b,
                color: flow.color,
                radius: flow.bead_radius,
                t: i as f64 / count as f64,
                position: flow.a,
            };
            bead.place(projector);
            bead
        })
        .collect()
}

/// Identifies one run of the animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnimationHandle(u64);

#[derive(Debug, Default)]
pub struct BeadAnimator {
    beads: Vec<Bead>,
    active: Option<AnimationHandle>,
    next_id: u64,
    last_tick: Option<Instant>,
    paused: bool,
}

impl BeadAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any running animation with `beads`.
    pub fn start(&mut self, beads: Vec<Bead>, now: Instant) -> AnimationHandle {
        self.stop();
        self.next_id += 1;
        let handle = AnimationHandle(self.next_id);
        log::debug!("bead animation {:?} started with {} beads", handle, beads.len());
        self.beads = beads;
        self.active = Some(handle);
        self.last_tick = Some(now);
        handle
    }

    /// Cancel the pending tick and drop all beads. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if let Some(handle) = self.active.take() {
            log::debug!("bead animation {:?} stopped", handle);
        }
        self.beads.clear();
        self.last_tick = None;
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn is_current(&self, handle: AnimationHandle) -> bool {
        self.active == Some(handle)
    }

    pub fn set_paused(&mut self, paused: bool, now: Instant) {
        if self.paused && !paused && self.active.is_some() {
            self.last_tick = Some(now);
        }
        self.paused = paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn beads(&self) -> &[Bead] {
        &self.beads
    }

    /// Advance every bead by the wall-clock time since the previous tick.
    /// Returns false when nothing is scheduled.
    pub fn tick<P: Projector + ?Sized>(&mut self, now: Instant, projector: &P) -> bool {
        if self.active.is_none() || self.paused {
            return false;
        }
        let dt = self
            .last_tick
            .map(|prev| now.saturating_duration_since(prev).as_secs_f64())
            .unwrap_or(0.0);
        self.last_tick = Some(now);
        self.advance(dt, projector);
        true
    }

    /// Advance by an explicit delta, clamped to `MAX_TICK_SECS`.
    pub fn advance<P: Projector + ?Sized>(&mut self, dt: f64, projector: &P) {
        let dt = dt.clamp(0.0, MAX_TICK_SECS);
        for bead in &mut self.beads {
            bead.advance(dt, projector);
        }
    }
}
