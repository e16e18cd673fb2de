use crate::config::ColorMode;
use crate::flow::Cardinal;
use crate::station::StationStatus;
use crossterm::style::Color;

// Flow lines
pub const EAST: Color = Color::Rgb { r: 96, g: 165, b: 250 };   // blue
pub const WEST: Color = Color::Rgb { r: 52, g: 211, b: 153 };   // green
pub const NORTH: Color = Color::Rgb { r: 251, g: 191, b: 36 };  // amber
pub const SOUTH: Color = Color::Rgb { r: 244, g: 114, b: 182 }; // pink
pub const MONO: Color = Color::Rgb { r: 96, g: 165, b: 250 };

// Station status
pub const ONLINE: Color = Color::Rgb { r: 34, g: 197, b: 94 };
pub const IDLE: Color = Color::Rgb { r: 245, g: 158, b: 11 };
pub const OFFLINE: Color = Color::Rgb { r: 239, g: 68, b: 68 };

// Basemap and chrome
pub const GRATICULE: Color = Color::DarkGrey;
pub const AIRPORT: Color = Color::Grey;
pub const STATUS_BAR: Color = Color::Grey;
pub const ERROR: Color = Color::Red;

/// Line and bead color for a flow.
pub fn flow_color(mode: ColorMode, cardinal: Cardinal) -> Color {
    match mode {
        ColorMode::Mono => MONO,
        ColorMode::Cardinal => match cardinal {
            Cardinal::East => EAST,
            Cardinal::West => WEST,
            Cardinal::North => NORTH,
            Cardinal::South => SOUTH,
        },
    }
}

pub fn status_color(status: StationStatus) -> Color {
    match status {
        StationStatus::Online => ONLINE,
        StationStatus::Idle => IDLE,
        StationStatus::Offline => OFFLINE,
    }
}

/// ANSI foreground escape for a color (for report/print mode).
pub fn ansi_fg(color: Color) -> String {
    match color {
        Color::Rgb { r, g, b } => format!("\x1b[38;2;{};{};{}m", r, g, b),
        Color::AnsiValue(v) => format!("\x1b[38;5;{}m", v),
        Color::DarkGrey => "\x1b[90m".to_string(),
        Color::Grey => "\x1b[37m".to_string(),
        Color::Red => "\x1b[91m".to_string(),
        Color::Green => "\x1b[92m".to_string(),
        Color::Yellow => "\x1b[93m".to_string(),
        Color::White => "\x1b[97m".to_string(),
        _ => String::new(),
    }
}
