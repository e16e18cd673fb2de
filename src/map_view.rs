//! Full-screen live map loop.

use crate::api::ApiClient;
use crate::canvas::BrailleCanvas;
use crate::config::MapConfig;
use crate::error::Result;
use crate::fetcher::{FetchKind, FetchResult, Fetcher, FlowQuery};
use crate::render::{render, StatusInfo};
use crate::session::MapSession;
use crate::terminal::Terminal;
use chrono::Utc;
use crossterm::event::{KeyCode, KeyModifiers};
use crossterm::terminal::size;
use std::time::{Duration, Instant};

const ZOOM_STEP: f64 = 0.5;
// Fraction of the view width/height moved per pan key
const PAN_FRACTION: f64 = 0.125;
const RESTATION_EVERY: Duration = Duration::from_secs(1);
const HOUR_STEPS: [u32; 8] = [1, 3, 6, 12, 24, 48, 72, 168];

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Action {
    Quit,
    ToggleHelp,
    Refresh,
    Zoom(f64),
    Pan(f64, f64),
    ResetView,
    CycleAxis,
    ToggleColorMode,
    ToggleBeads,
    TogglePause,
    BeadsDelta(i32),
    HoursStep(i32),
    CycleDirection,
}

/// Map a key press to a view action.
pub fn action_for(code: KeyCode, mods: KeyModifiers) -> Option<Action> {
    if mods.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') => Some(Action::Quit),
            _ => None,
        };
    }
    let action = match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('?') => Action::ToggleHelp,
        KeyCode::Char('r') => Action::Refresh,
        KeyCode::Char('+') | KeyCode::Char('=') => Action::Zoom(ZOOM_STEP),
        KeyCode::Char('-') | KeyCode::Char('_') => Action::Zoom(-ZOOM_STEP),
        KeyCode::Left | KeyCode::Char('h') => Action::Pan(-1.0, 0.0),
        KeyCode::Right | KeyCode::Char('l') => Action::Pan(1.0, 0.0),
        KeyCode::Up | KeyCode::Char('k') => Action::Pan(0.0, -1.0),
        KeyCode::Down | KeyCode::Char('j') => Action::Pan(0.0, 1.0),
        KeyCode::Char('0') => Action::ResetView,
        KeyCode::Char('a') => Action::CycleAxis,
        KeyCode::Char('c') => Action::ToggleColorMode,
        KeyCode::Char('b') => Action::ToggleBeads,
        KeyCode::Char(' ') => Action::TogglePause,
        KeyCode::Char('[') => Action::BeadsDelta(-1),
        KeyCode::Char(']') => Action::BeadsDelta(1),
        KeyCode::Char('<') | KeyCode::Char(',') => Action::HoursStep(-1),
        KeyCode::Char('>') | KeyCode::Char('.') => Action::HoursStep(1),
        KeyCode::Char('d') => Action::CycleDirection,
        _ => return None,
    };
    Some(action)
}

/// Next lookback window from the fixed ladder; clamps at either end.
pub fn step_hours(hours: u32, step: i32) -> u32 {
    if step < 0 {
        HOUR_STEPS.iter().rev().copied().find(|&h| h < hours).unwrap_or(HOUR_STEPS[0])
    } else {
        HOUR_STEPS.iter().copied().find(|&h| h > hours).unwrap_or(HOUR_STEPS[HOUR_STEPS.len() - 1])
    }
}

struct MapView {
    session: MapSession,
    fetcher: Fetcher,
    info: StatusInfo,
    show_help: bool,
    have_airports: bool,
    last_flows: Instant,
    last_stations: Instant,
    last_restation: Instant,
    refresh_interval: Duration,
    station_refresh_interval: Duration,
}

impl MapView {
    fn query(&self) -> FlowQuery {
        FlowQuery { hours: self.info.hours, direction: self.info.direction }
    }

    fn refresh_all(&mut self) {
        if !self.have_airports {
            self.fetcher.request_airports();
        }
        self.fetcher.request_flows(self.query());
        self.fetcher.request_stations();
        let now = Instant::now();
        self.last_flows = now;
        self.last_stations = now;
    }

    fn apply(&mut self, result: FetchResult) {
        let now = Instant::now();
        match result {
            FetchResult::Airports(Ok(dir)) => {
                self.have_airports = true;
                self.session.set_airports(dir, now, Utc::now());
            }
            FetchResult::Flows(query, Ok(records)) => {
                if query != self.query() {
                    log::debug!("dropping stale flow result for {:?}", query);
                    return;
                }
                self.info.error = None;
                self.session.apply_flows(records, now, Utc::now());
            }
            FetchResult::Stations(Ok(stations)) => {
                self.session.apply_stations(stations, Utc::now());
            }
            FetchResult::Airports(Err(e)) | FetchResult::Flows(_, Err(e)) | FetchResult::Stations(Err(e)) => {
                // keep whatever was last drawn
                log::warn!("fetch failed: {}", e);
                self.info.error = Some(e.to_string());
            }
        }
    }

    /// Returns false when the view should close.
    fn handle(&mut self, action: Action) -> bool {
        let now = Instant::now();
        match action {
            Action::Quit => return false,
            Action::ToggleHelp => self.show_help = !self.show_help,
            Action::Refresh => self.refresh_all(),
            Action::Zoom(dz) => self.session.zoom_by(dz, now),
            Action::Pan(fx, fy) => {
                let (w, h) = self.session.viewport().size();
                self.session.pan(fx * w * PAN_FRACTION, fy * h * PAN_FRACTION, now);
            }
            Action::ResetView => self.session.reset_view(now),
            Action::CycleAxis => {
                let axis = self.session.options().axis.next();
                self.session.set_axis(axis, now);
            }
            Action::ToggleColorMode => {
                let mode = self.session.options().color_mode.toggle();
                self.session.set_color_mode(mode, now);
            }
            Action::ToggleBeads => {
                let enabled = !self.session.bead_config().enabled;
                self.session.set_beads_enabled(enabled, now);
            }
            Action::TogglePause => {
                let paused = !self.session.is_paused();
                self.session.set_paused(paused, now);
            }
            Action::BeadsDelta(d) => {
                let max = self.session.bead_config().max_beads as i64 + d as i64;
                self.session.set_max_beads(max.max(1) as u32, now);
            }
            Action::HoursStep(step) => {
                self.info.hours = step_hours(self.info.hours, step);
                self.fetcher.request_flows(self.query());
                self.last_flows = now;
            }
            Action::CycleDirection => {
                self.info.direction = self.info.direction.next();
                self.fetcher.request_flows(self.query());
                self.last_flows = now;
            }
        }
        true
    }

    fn tick_refresh(&mut self) {
        if self.last_flows.elapsed() >= self.refresh_interval {
            if !self.have_airports {
                self.fetcher.request_airports();
            }
            self.fetcher.request_flows(self.query());
            self.last_flows = Instant::now();
        }
        if self.last_stations.elapsed() >= self.station_refresh_interval {
            self.fetcher.request_stations();
            self.last_stations = Instant::now();
        }
        if self.last_restation.elapsed() >= RESTATION_EVERY {
            self.session.restation(Utc::now());
            self.last_restation = Instant::now();
        }
        self.info.loading =
            self.fetcher.is_in_flight(FetchKind::Flows) || self.fetcher.is_in_flight(FetchKind::Airports);
    }
}

pub fn run(config: MapConfig) -> Result<()> {
    let mut term = Terminal::new()?;
    let (cols, rows) = term.size();
    let mut canvas = BrailleCanvas::new(cols, rows.saturating_sub(1));
    let (px_w, px_h) = canvas.size();

    log::info!("map view {}x{} cells against {}", cols, rows, config.server);
    let now = Instant::now();
    let mut view = MapView {
        session: MapSession::new(&config, px_w as f64, px_h as f64),
        fetcher: Fetcher::new(ApiClient::new(&config.server, config.timeout)),
        info: StatusInfo { hours: config.hours, direction: config.direction, loading: true, error: None },
        show_help: false,
        have_airports: false,
        last_flows: now,
        last_stations: now,
        last_restation: now,
        refresh_interval: config.refresh_interval,
        station_refresh_interval: config.station_refresh_interval,
    };
    view.refresh_all();

    let mut prev = (cols, rows);
    loop {
        for result in view.fetcher.poll() {
            view.apply(result);
        }

        if let Some((code, mods)) = term.check_key()? {
            if let Some(action) = action_for(code, mods) {
                if !view.handle(action) {
                    break;
                }
            }
        }

        view.tick_refresh();

        let (width, height) = size().unwrap_or(term.size());
        if (width, height) != prev {
            term.resize(width, height);
            term.clear_screen()?;
            canvas = BrailleCanvas::new(width, height.saturating_sub(1));
            let (w, h) = canvas.size();
            view.session.resize(w as f64, h as f64, Instant::now());
            prev = (width, height);
        }

        view.session.tick(Instant::now());

        render(&mut term, &mut canvas, &view.session, &view.info, view.show_help);
        term.present()?;

        term.sleep(config.time_step);
    }

    log::info!("map view closed");
    Ok(())
}
