use crate::config::MapConfig;
use crate::error::Result;
use crate::geo::LatLon;
use serde::Deserialize;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub map: MapSettings,
    #[serde(default)]
    pub log: LogSettings,
}

#[derive(Debug, Default, Deserialize)]
pub struct ServerSettings {
    pub url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MapSettings {
    pub hours: Option<u32>,
    pub direction: Option<String>,   // all | inbound | outbound
    pub axis: Option<String>,        // all | east | west | north | south
    pub color_mode: Option<String>,  // cardinal | mono
    pub animate: Option<bool>,
    pub balls_max: Option<u32>,
    pub weight_at_max: Option<f64>,
    pub zoom: Option<f64>,
    pub center_lat: Option<f64>,
    pub center_lon: Option<f64>,
    pub refresh_secs: Option<u64>,
    pub station_refresh_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LogSettings {
    pub file: Option<PathBuf>,
    pub level: Option<String>,
}

impl Settings {
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => Self::parse(&content),
            Err(e) => {
                log::warn!("cannot read {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse settings text; a malformed file falls back to defaults.
    pub fn parse(content: &str) -> Self {
        toml::from_str(content).unwrap_or_else(|e| {
            log::warn!("ignoring malformed settings: {}", e);
            Self::default()
        })
    }

    /// Defaults overlaid with whatever the file sets. Unknown enum values
    /// are errors rather than silently ignored.
    pub fn map_config(&self) -> Result<MapConfig> {
        let mut cfg = MapConfig::default();
        if let Some(url) = &self.server.url {
            cfg.server = url.clone();
        }
        if let Some(secs) = self.server.timeout_secs {
            cfg.timeout = Duration::from_secs(secs.max(1));
        }

        let m = &self.map;
        if let Some(hours) = m.hours {
            cfg.hours = hours;
        }
        if let Some(direction) = &m.direction {
            cfg.direction = direction.parse()?;
        }
        if let Some(axis) = &m.axis {
            cfg.axis = axis.parse()?;
        }
        if let Some(mode) = &m.color_mode {
            cfg.color_mode = mode.parse()?;
        }
        if let Some(animate) = m.animate {
            cfg.beads.enabled = animate;
        }
        if let Some(n) = m.balls_max {
            cfg.beads.max_beads = n;
        }
        if let Some(w) = m.weight_at_max {
            cfg.beads.weight_at_max = w;
        }
        if let Some(zoom) = m.zoom {
            cfg.zoom = zoom;
        }
        if let (Some(lat), Some(lon)) = (m.center_lat, m.center_lon) {
            cfg.center = LatLon::new(lat, lon);
        }
        if let Some(secs) = m.refresh_secs {
            cfg.refresh_interval = Duration::from_secs(secs.max(5));
        }
        if let Some(secs) = m.station_refresh_secs {
            cfg.station_refresh_interval = Duration::from_secs(secs.max(5));
        }
        Ok(cfg)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("netops-map")
            .join("config.toml")
    }

    /// Log file for the full-screen map; stderr is taken by the display.
    pub fn log_path(&self) -> PathBuf {
        self.log.file.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("netops-map")
                .join("netops-map.log")
        })
    }

    /// Create the log directory if needed and open the log for appending.
    pub fn open_log(&self) -> io::Result<(PathBuf, File)> {
        let path = self.log_path();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok((path, file))
    }
}
