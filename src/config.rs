use crate::error::MapError;
use crate::geo::{LatLon, MAX_ZOOM, MIN_ZOOM};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_SERVER: &str = "http://localhost:8000";
pub const DEFAULT_HOURS: u32 = 24;
pub const DEFAULT_BALLS_MAX: u32 = 6;
pub const MAX_BALLS: u32 = 12;
pub const DEFAULT_WEIGHT_AT_MAX: f64 = 10_000.0;
pub const DEFAULT_ZOOM: f64 = 7.0;
pub const DEFAULT_CENTER: LatLon = LatLon::new(47.6062, -122.3321); // Seattle

/// Which cardinal directions are drawn
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AxisFilter {
    #[default]
    All,
    East,
    West,
    North,
    South,
}

impl AxisFilter {
    pub fn next(self) -> Self {
        match self {
            AxisFilter::All => AxisFilter::East,
            AxisFilter::East => AxisFilter::West,
            AxisFilter::West => AxisFilter::North,
            AxisFilter::North => AxisFilter::South,
            AxisFilter::South => AxisFilter::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AxisFilter::All => "all",
            AxisFilter::East => "east",
            AxisFilter::West => "west",
            AxisFilter::North => "north",
            AxisFilter::South => "south",
        }
    }
}

impl FromStr for AxisFilter {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" | "*" => Ok(AxisFilter::All),
            "east" | "e" => Ok(AxisFilter::East),
            "west" | "w" => Ok(AxisFilter::West),
            "north" | "n" => Ok(AxisFilter::North),
            "south" | "s" => Ok(AxisFilter::South),
            _ => Err(MapError::InvalidConfig { field: "axis", value: s.to_string() }),
        }
    }
}

impl fmt::Display for AxisFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Line coloring
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ColorMode {
    #[default]
    Cardinal, // one color per compass direction
    Mono,     // single color for every flow
}

impl ColorMode {
    pub fn toggle(self) -> Self {
        match self {
            ColorMode::Cardinal => ColorMode::Mono,
            ColorMode::Mono => ColorMode::Cardinal,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ColorMode::Cardinal => "cardinal",
            ColorMode::Mono => "mono",
        }
    }
}

impl FromStr for ColorMode {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cardinal" | "compass" => Ok(ColorMode::Cardinal),
            "mono" | "single" => Ok(ColorMode::Mono),
            _ => Err(MapError::InvalidConfig { field: "color_mode", value: s.to_string() }),
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Server-side direction filter for the flow query
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FlowDirection {
    #[default]
    All,
    Inbound,
    Outbound,
}

impl FlowDirection {
    pub fn next(self) -> Self {
        match self {
            FlowDirection::All => FlowDirection::Inbound,
            FlowDirection::Inbound => FlowDirection::Outbound,
            FlowDirection::Outbound => FlowDirection::All,
        }
    }

    pub fn as_query(self) -> &'static str {
        match self {
            FlowDirection::All => "all",
            FlowDirection::Inbound => "inbound",
            FlowDirection::Outbound => "outbound",
        }
    }
}

impl FromStr for FlowDirection {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(FlowDirection::All),
            "inbound" | "in" => Ok(FlowDirection::Inbound),
            "outbound" | "out" => Ok(FlowDirection::Outbound),
            _ => Err(MapError::InvalidConfig { field: "direction", value: s.to_string() }),
        }
    }
}

impl fmt::Display for FlowDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_query())
    }
}

/// Bead animation parameters
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BeadConfig {
    pub enabled: bool,
    pub max_beads: u32,
    pub weight_at_max: f64,
}

impl BeadConfig {
    /// Clamp into the recognized ranges.
    pub fn validated(self) -> Self {
        let weight_at_max = if self.weight_at_max.is_finite() && self.weight_at_max > 0.0 {
            self.weight_at_max
        } else {
            log::warn!("weight_at_max {} is not positive, using {}", self.weight_at_max, DEFAULT_WEIGHT_AT_MAX);
            DEFAULT_WEIGHT_AT_MAX
        };
        Self {
            enabled: self.enabled,
            max_beads: self.max_beads.clamp(1, MAX_BALLS),
            weight_at_max,
        }
    }
}

impl Default for BeadConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_beads: DEFAULT_BALLS_MAX,
            weight_at_max: DEFAULT_WEIGHT_AT_MAX,
        }
    }
}

/// Everything the map view and reports need, after CLI/settings merge
#[derive(Clone, Debug)]
pub struct MapConfig {
    pub server: String,
    pub timeout: Duration,
    pub hours: u32,
    pub direction: FlowDirection,
    pub axis: AxisFilter,
    pub color_mode: ColorMode,
    pub beads: BeadConfig,
    pub center: LatLon,
    pub zoom: f64,
    pub refresh_interval: Duration,
    pub station_refresh_interval: Duration,
    pub time_step: f32,
}

impl MapConfig {
    pub fn validated(mut self) -> Self {
        self.server = self.server.trim_end_matches('/').to_string();
        self.hours = self.hours.max(1);
        self.beads = self.beads.validated();
        self.zoom = self.zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        if !self.center.is_finite() {
            self.center = DEFAULT_CENTER;
        }
        self.time_step = self.time_step.clamp(0.005, 1.0);
        self
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            timeout: Duration::from_secs(10),
            hours: DEFAULT_HOURS,
            direction: FlowDirection::All,
            axis: AxisFilter::All,
            color_mode: ColorMode::Cardinal,
            beads: BeadConfig::default(),
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            refresh_interval: Duration::from_secs(60),
            station_refresh_interval: Duration::from_secs(30),
            time_step: 1.0 / 30.0,
        }
    }
}

/// Parse "LAT,LON" for the --center flag.
pub fn parse_center(s: &str) -> Result<LatLon, MapError> {
    let bad = || MapError::InvalidConfig { field: "center", value: s.to_string() };
    let (lat, lon) = s.split_once(',').ok_or_else(bad)?;
    let lat: f64 = lat.trim().parse().map_err(|_| bad())?;
    let lon: f64 = lon.trim().parse().map_err(|_| bad())?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(bad());
    }
    Ok(LatLon::new(lat, lon))
}
