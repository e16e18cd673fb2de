//! Frame composition for the map view
//!
//! Geometry is drawn into a `BrailleCanvas` in layer order (graticule,
//! airports, lines, beads, stations), blitted, then text goes on top:
//! airport codes, station names, the legend and the status bar.

use crate::canvas::{BrailleCanvas, DOTS_X, DOTS_Y, LAYER_AIRPORT, LAYER_BEAD, LAYER_GRID, LAYER_LINE, LAYER_STATION};
use crate::colors;
use crate::config::{ColorMode, FlowDirection};
use crate::flow::Cardinal;
use crate::geo::{LatLon, Pixel, Projector};
use crate::help::{render_help_overlay, MAP_HELP};
use crate::session::MapSession;
use crate::station::{format_age, StationStatus};
use crate::terminal::Terminal;
use chrono::{DateTime, Local, Utc};
use std::collections::HashSet;

const STATION_RADIUS: f64 = 2.5;
const AIRPORT_RADIUS: f64 = 1.0;
// Labels for every airport on screen only once zoomed in this far
const LABEL_ALL_ZOOM: f64 = 8.0;

/// View state that lives outside the session.
#[derive(Clone, Debug, Default)]
pub struct StatusInfo {
    pub hours: u32,
    pub direction: FlowDirection,
    pub loading: bool,
    pub error: Option<String>,
}

/// Degrees between graticule lines at a zoom level.
pub fn graticule_step(zoom: f64) -> f64 {
    if zoom < 4.0 {
        10.0
    } else if zoom < 6.0 {
        5.0
    } else if zoom < 9.0 {
        1.0
    } else {
        0.5
    }
}

fn draw_graticule(canvas: &mut BrailleCanvas, session: &MapSession) {
    let vp = session.viewport();
    let (w, h) = vp.size();
    let top_left = vp.unproject(Pixel::new(0.0, 0.0));
    let bottom_right = vp.unproject(Pixel::new(w, h));
    let step = graticule_step(vp.zoom());

    let lon0 = (top_left.lon / step).floor() as i64;
    let lon1 = (bottom_right.lon / step).ceil() as i64;
    let lat0 = (bottom_right.lat / step).floor() as i64;
    let lat1 = (top_left.lat / step).ceil() as i64;
    if lon1 - lon0 > 400 || lat1 - lat0 > 400 {
        return;
    }

    let mid = vp.center();
    for i in lon0..=lon1 {
        let x = vp.project(LatLon::new(mid.lat, i as f64 * step)).x.floor() as i64;
        for y in (0..h as i64).step_by(3) {
            canvas.plot(x, y, colors::GRATICULE, LAYER_GRID);
        }
    }
    for i in lat0..=lat1 {
        let y = vp.project(LatLon::new(i as f64 * step, mid.lon)).y.floor() as i64;
        for x in (0..w as i64).step_by(3) {
            canvas.plot(x, y, colors::GRATICULE, LAYER_GRID);
        }
    }
}

/// Draw all map geometry for the current frame.
pub fn draw_map(canvas: &mut BrailleCanvas, session: &MapSession) {
    let vp = session.viewport();
    draw_graticule(canvas, session);

    for (_, pos) in session.airports().iter() {
        let p = vp.project(*pos);
        if vp.contains(p, AIRPORT_RADIUS) {
            canvas.disc(p, AIRPORT_RADIUS, colors::AIRPORT, LAYER_AIRPORT);
        }
    }

    for line in session.lines() {
        canvas.line(vp.project(line.a), vp.project(line.b), line.width_px, line.color, LAYER_LINE);
    }

    for bead in session.beads() {
        let p = vp.project(bead.position);
        if vp.contains(p, bead.radius) {
            canvas.disc(p, bead.radius, bead.color, LAYER_BEAD);
        }
    }

    for marker in session.markers() {
        let Some(pos) = marker.position else { continue };
        canvas.disc(vp.project(pos), STATION_RADIUS, marker.color, LAYER_STATION);
    }
}

/// Cell for a canvas pixel, if it falls inside `rows` map rows.
fn cell_of(p: Pixel, cols: u16, rows: u16) -> Option<(i32, i32)> {
    if !p.x.is_finite() || !p.y.is_finite() {
        return None;
    }
    let cx = (p.x / DOTS_X as f64).floor();
    let cy = (p.y / DOTS_Y as f64).floor();
    if cx < 0.0 || cy < 0.0 || cx >= cols as f64 || cy >= rows as f64 {
        return None;
    }
    Some((cx as i32, cy as i32))
}

fn draw_labels(term: &mut Terminal, session: &MapSession, cols: u16, rows: u16) {
    let vp = session.viewport();
    let label_all = vp.zoom() >= LABEL_ALL_ZOOM;
    let endpoints: HashSet<&str> = session
        .lines()
        .iter()
        .flat_map(|l| [l.origin.as_str(), l.dest.as_str()])
        .collect();

    for (code, pos) in session.airports().iter() {
        if !label_all && !endpoints.contains(code.as_str()) {
            continue;
        }
        if let Some((cx, cy)) = cell_of(vp.project(*pos), cols, rows) {
            term.set_str(cx + 1, cy, code.as_str(), Some(colors::AIRPORT), false);
        }
    }

    for marker in session.markers() {
        let Some(pos) = marker.position else { continue };
        if let Some((cx, cy)) = cell_of(vp.project(pos), cols, rows) {
            let text = format!("{} {}", marker.name, format_age(marker.age_secs));
            let y = if cy + 1 < rows as i32 { cy + 1 } else { cy - 1 };
            term.set_str(cx + 1, y, &text, Some(marker.color), true);
        }
    }
}

fn draw_legend(term: &mut Terminal, mode: ColorMode, cols: u16) {
    let mut entries: Vec<(String, crossterm::style::Color)> = Vec::new();
    match mode {
        ColorMode::Cardinal => {
            for c in [Cardinal::East, Cardinal::West, Cardinal::North, Cardinal::South] {
                entries.push((format!("━ {}", c.letter()), colors::flow_color(mode, c)));
            }
        }
        ColorMode::Mono => entries.push(("━ flow".to_string(), colors::MONO)),
    }
    for s in [StationStatus::Online, StationStatus::Idle, StationStatus::Offline] {
        entries.push((format!("● {}", s.label()), colors::status_color(s)));
    }

    let width: usize = entries.iter().map(|(t, _)| t.chars().count() + 1).sum();
    let mut x = (cols as usize).saturating_sub(width + 1) as i32;
    for (text, color) in entries {
        term.set_str(x, 0, &text, Some(color), false);
        x += text.chars().count() as i32 + 1;
    }
}

/// Status bar text (without the error suffix).
pub fn status_text(session: &MapSession, info: &StatusInfo) -> String {
    let opts = session.options();
    let beads = session.bead_config();
    let beads_label = if !beads.enabled {
        "off".to_string()
    } else if session.is_paused() {
        format!("{} paused", beads.max_beads)
    } else {
        format!("{}", beads.max_beads)
    };
    let updated = session
        .flows_updated()
        .map(|t: DateTime<Utc>| t.with_timezone(&Local).format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string());
    format!(
        " {} flows  {}h {}  axis {}  {}  z{:.1}  beads {}  updated {}{}  ?=help",
        session.lines().len(),
        info.hours,
        info.direction,
        opts.axis,
        opts.color_mode,
        session.viewport().zoom(),
        beads_label,
        updated,
        if info.loading { " …" } else { "" },
    )
}

/// Compose one full frame into the terminal buffer.
pub fn render(term: &mut Terminal, canvas: &mut BrailleCanvas, session: &MapSession, info: &StatusInfo, show_help: bool) {
    let (cols, rows) = term.size();
    let map_rows = rows.saturating_sub(1);

    term.clear();
    canvas.clear();
    draw_map(canvas, session);
    canvas.blit(term);
    draw_labels(term, session, cols, map_rows);
    draw_legend(term, session.options().color_mode, cols);

    let status = status_text(session, info);
    let status_y = map_rows as i32;
    term.set_str(0, status_y, &status, Some(colors::STATUS_BAR), false);
    if let Some(err) = &info.error {
        let x = status.chars().count() as i32 + 2;
        term.set_str(x, status_y, err, Some(colors::ERROR), true);
    }

    if show_help {
        render_help_overlay(term, cols, rows, MAP_HELP);
    }
}
