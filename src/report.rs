//! One-shot text reports for the `flows` and `stations` subcommands.

use crate::airport::AirportDirectory;
use crate::beads::bead_count;
use crate::colors::ansi_fg;
use crate::config::MapConfig;
use crate::flow::{aggregate, build_geometry, AggregatedFlow, FlowRecord, GeometryOptions, RenderedFlow};
use crate::geo::Viewport;
use crate::station::{format_age, markers, Station};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::io::{self, Write};

const RESET: &str = "\x1b[0m";
// Nominal canvas for reports; only zoom and direction matter for the numbers
const REPORT_CANVAS_PX: f64 = 1000.0;

/// One line of the flows table. `line` is `None` when an endpoint has no
/// known coordinates, so the flow cannot be placed on the map.
#[derive(Clone, Debug)]
pub struct FlowReportRow {
    pub flow: AggregatedFlow,
    pub line: Option<RenderedFlow>,
}

/// Report rows, heaviest first. Placed flows outside the axis filter are
/// left out; unplaced flows are always listed.
pub fn flow_rows(records: &[FlowRecord], airports: &AirportDirectory, config: &MapConfig) -> Vec<FlowReportRow> {
    let view = Viewport::new(config.center, config.zoom, REPORT_CANVAS_PX, REPORT_CANVAS_PX);
    let opts = GeometryOptions { axis: config.axis, color_mode: config.color_mode };
    let mut lines: HashMap<(String, String), RenderedFlow> = build_geometry(records, airports, &view, opts)
        .into_iter()
        .map(|l| ((l.origin.as_str().to_string(), l.dest.as_str().to_string()), l))
        .collect();

    let mut rows: Vec<FlowReportRow> = aggregate(records)
        .into_iter()
        .filter_map(|flow| {
            let key = (flow.origin.as_str().to_string(), flow.dest.as_str().to_string());
            match lines.remove(&key) {
                Some(line) => Some(FlowReportRow { flow, line: Some(line) }),
                None if airports.get(&flow.origin).is_none() || airports.get(&flow.dest).is_none() => {
                    Some(FlowReportRow { flow, line: None })
                }
                None => None,
            }
        })
        .collect();
    rows.sort_by(|a, b| b.flow.weight.total_cmp(&a.flow.weight));
    rows
}

pub fn write_flows<W: Write>(
    out: &mut W,
    rows: &[FlowReportRow],
    config: &MapConfig,
    color: bool,
) -> io::Result<()> {
    writeln!(
        out,
        "{:<8} {:<8} {:<8} {:>6} {:>12} {:>4} {:>5} {:>5} {:>7}",
        "ORIGIN", "DEST", "DIR", "LEGS", "WEIGHT_LBS", "HEAD", "WIDTH", "BEADS", "OFFSET"
    )?;
    let mut unplaced = 0;
    for row in rows {
        let f = &row.flow;
        let direction = f.direction.as_deref().unwrap_or("-");
        let Some(line) = &row.line else {
            unplaced += 1;
            writeln!(
                out,
                "{:<8} {:<8} {:<8} {:>6} {:>12.0} {:>4} {:>5} {:>5} {:>7}",
                f.origin, f.dest, direction, f.legs, f.weight, "-", "-", "-", "-"
            )?;
            continue;
        };
        let (pre, post) = if color { (ansi_fg(line.color), RESET) } else { (String::new(), "") };
        let offset = if line.separated { format!("{:+.1}", line.offset_px) } else { "-".to_string() };
        writeln!(
            out,
            "{}{:<8} {:<8} {:<8} {:>6} {:>12.0} {:>4} {:>5.1} {:>5} {:>7}{}",
            pre,
            f.origin,
            f.dest,
            direction,
            f.legs,
            f.weight,
            line.cardinal.letter(),
            line.width_px,
            bead_count(f.weight, &config.beads),
            offset,
            post
        )?;
    }
    let total: f64 = rows.iter().map(|r| r.flow.weight).sum();
    write!(out, "{} flows, {:.0} lbs over {}h ({})", rows.len(), total, config.hours, config.direction)?;
    if unplaced > 0 {
        write!(out, "; {} without airport coordinates", unplaced)?;
    }
    writeln!(out)?;
    Ok(())
}

pub fn write_stations<W: Write>(
    out: &mut W,
    stations: &[Station],
    airports: &AirportDirectory,
    now: DateTime<Utc>,
    color: bool,
) -> io::Result<()> {
    writeln!(out, "{:<16} {:<8} {:>6}  {}", "STATION", "STATUS", "AGE", "POSITION")?;
    let mut rows = markers(stations, airports, now);
    rows.sort_by(|a, b| a.age_secs.total_cmp(&b.age_secs).then_with(|| a.name.cmp(&b.name)));
    for m in &rows {
        let (pre, post) = if color { (ansi_fg(m.color), RESET) } else { (String::new(), "") };
        let pos = match m.position {
            Some(p) => format!("{:.4},{:.4}", p.lat, p.lon),
            None => "unknown".to_string(),
        };
        writeln!(
            out,
            "{:<16} {}{:<8}{} {:>6}  {}",
            m.name,
            pre,
            m.status.label(),
            post,
            format_age(m.age_secs),
            pos
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn airports() -> AirportDirectory {
        AirportDirectory::from_rows([("SEA", 47.4502, -122.3088), ("PDX", 45.5898, -122.5951)])
    }

    fn rec(o: &str, d: &str, weight: f64) -> FlowRecord {
        FlowRecord { origin: Some(o.into()), dest: Some(d.into()), legs: 2, weight, direction: None }
    }

    fn with_direction(mut r: FlowRecord, d: &str) -> FlowRecord {
        r.direction = Some(d.into());
        r
    }

    #[test]
    fn flows_are_listed_heaviest_first() {
        let cfg = MapConfig::default();
        let records = [
            with_direction(rec("SEA", "PDX", 100.0), "outbound"),
            with_direction(rec("PDX", "SEA", 5000.0), "inbound"),
        ];
        let rows = flow_rows(&records, &airports(), &cfg);
        let mut buf = Vec::new();
        write_flows(&mut buf, &rows, &cfg, false).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("ORIGIN"));
        assert!(lines[1].starts_with("PDX"));
        assert!(lines[1].contains("inbound"));
        assert!(lines[2].starts_with("SEA"));
        assert!(lines[2].contains("outbound"));
        assert_eq!(lines[3], "2 flows, 5100 lbs over 24h (all)");
        assert!(!text.contains('\x1b'));
    }

    #[test]
    fn unplaced_flows_are_still_listed() {
        let cfg = MapConfig::default();
        let records = [rec("SEA", "PDX", 100.0), rec("SEA", "ZZZ", 700.0)];
        let rows = flow_rows(&records, &airports(), &cfg);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].flow.dest.as_str(), "ZZZ");
        assert!(rows[0].line.is_none());
        assert!(rows[1].line.is_some());

        let mut buf = Vec::new();
        write_flows(&mut buf, &rows, &cfg, true).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let zzz = text.lines().find(|l| l.starts_with("SEA      ZZZ")).unwrap();
        assert!(zzz.trim_end().ends_with('-'));
        assert!(text.contains("1 without airport coordinates"));
    }

    #[test]
    fn axis_filter_hides_placed_flows_only() {
        let cfg = MapConfig { axis: crate::config::AxisFilter::North, ..MapConfig::default() };
        let records = [rec("SEA", "PDX", 100.0), rec("PDX", "SEA", 100.0), rec("XXX", "SEA", 5.0)];
        let rows = flow_rows(&records, &airports(), &cfg);
        let pairs: Vec<(&str, &str)> = rows.iter().map(|r| (r.flow.origin.as_str(), r.flow.dest.as_str())).collect();
        assert_eq!(pairs, vec![("PDX", "SEA"), ("XXX", "SEA")]);
    }

    #[test]
    fn stations_show_status_and_unknown_positions() {
        let now = Utc.with_ymd_and_hms(2025, 8, 24, 12, 0, 0).unwrap();
        let stations = vec![
            Station {
                name: "SEA1".into(),
                last_seen_at: Some("2025-08-24T11:59:30Z".into()),
                last_origin_lat: None,
                last_origin_lon: None,
                last_default_origin: Some("SEA".into()),
            },
            Station {
                name: "LOST".into(),
                last_seen_at: None,
                last_origin_lat: None,
                last_origin_lon: None,
                last_default_origin: None,
            },
        ];
        let mut buf = Vec::new();
        write_stations(&mut buf, &stations, &airports(), now, true).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let rows: Vec<&str> = text.lines().collect();
        assert!(rows[1].starts_with("SEA1"));
        assert!(rows[1].contains("online"));
        assert!(rows[1].contains("30s"));
        assert!(rows[2].contains("offline"));
        assert!(rows[2].contains("never"));
        assert!(rows[2].ends_with("unknown"));
        assert!(text.contains("\x1b[38;2;"));
    }
}
