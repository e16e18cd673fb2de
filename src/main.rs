use clap::{Args, Parser, Subcommand};
use netops_map::api::ApiClient;
use netops_map::config::{parse_center, MapConfig};
use netops_map::error::MapError;
use netops_map::settings::Settings;
use netops_map::{map_view, report};
use std::io::{self, IsTerminal};

#[derive(Parser)]
#[command(name = "netops-map")]
#[command(author = "NetOps Map Developers")]
#[command(version = "0.1.0")]
#[command(about = "Live terminal map of airport cargo flows and station status", long_about = None)]
struct Cli {
    /// Base URL of the flow API server
    #[arg(short, long, global = true)]
    server: Option<String>,

    /// HTTP timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct QueryArgs {
    /// Lookback window in hours
    #[arg(short = 'H', long)]
    hours: Option<u32>,

    /// Server-side filter: all, inbound, outbound
    #[arg(short, long)]
    direction: Option<String>,

    /// Only draw flows heading: all, east, west, north, south
    #[arg(short, long)]
    axis: Option<String>,

    /// Initial zoom level (2-12)
    #[arg(short, long)]
    zoom: Option<f64>,

    /// Initial map center as LAT,LON
    #[arg(long, allow_hyphen_values = true)]
    center: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Full-screen live map with animated flows
    Map {
        #[command(flatten)]
        query: QueryArgs,

        /// Line coloring: cardinal, mono
        #[arg(short, long)]
        color_mode: Option<String>,

        /// Draw static lines without beads
        #[arg(long)]
        no_animate: bool,

        /// Beads on the heaviest flows (1-12)
        #[arg(long)]
        balls_max: Option<u32>,

        /// Weight in lbs that earns the full bead count
        #[arg(long)]
        weight_at_max: Option<f64>,

        /// Frames per second
        #[arg(long)]
        fps: Option<f32>,
    },

    /// Print the current flow table
    Flows {
        #[command(flatten)]
        query: QueryArgs,

        /// Disable ANSI colors
        #[arg(long)]
        no_color: bool,
    },

    /// Print station status
    Stations {
        /// Disable ANSI colors
        #[arg(long)]
        no_color: bool,
    },
}

/// Route logs to a file while the map owns the screen, stderr otherwise.
/// Problems are reported on stderr before the map takes over.
fn init_logging(settings: &Settings, to_file: bool) {
    let mut builder = env_logger::Builder::new();
    let filter = std::env::var("RUST_LOG")
        .ok()
        .or_else(|| settings.log.level.clone())
        .unwrap_or_else(|| "warn".to_string());
    builder.parse_filters(&filter);

    if to_file {
        match settings.open_log() {
            Ok((_, file)) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(e) => {
                eprintln!(
                    "netops-map: cannot open log file {}: {}; logging is off while the map is shown",
                    settings.log_path().display(),
                    e
                );
                return;
            }
        }
    }
    if let Err(e) = builder.try_init() {
        eprintln!("netops-map: logging not initialised: {}", e);
    }
}

fn apply_query(config: &mut MapConfig, query: QueryArgs) -> Result<(), MapError> {
    if let Some(hours) = query.hours {
        config.hours = hours;
    }
    if let Some(direction) = query.direction {
        config.direction = direction.parse()?;
    }
    if let Some(axis) = query.axis {
        config.axis = axis.parse()?;
    }
    if let Some(zoom) = query.zoom {
        config.zoom = zoom;
    }
    if let Some(center) = query.center {
        config.center = parse_center(&center)?;
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), MapError> {
    let settings = Settings::load();
    init_logging(&settings, matches!(cli.command, Commands::Map { .. }));

    let mut config = settings.map_config()?;
    if let Some(server) = cli.server {
        config.server = server;
    }
    if let Some(secs) = cli.timeout {
        config.timeout = std::time::Duration::from_secs(secs.max(1));
    }

    match cli.command {
        Commands::Map {
            query,
            color_mode,
            no_animate,
            balls_max,
            weight_at_max,
            fps,
        } => {
            apply_query(&mut config, query)?;
            if let Some(mode) = color_mode {
                config.color_mode = mode.parse()?;
            }
            if no_animate {
                config.beads.enabled = false;
            }
            if let Some(n) = balls_max {
                config.beads.max_beads = n;
            }
            if let Some(w) = weight_at_max {
                config.beads.weight_at_max = w;
            }
            if let Some(fps) = fps.filter(|f| *f > 0.0) {
                config.time_step = 1.0 / fps;
            }
            map_view::run(config.validated())?;
        }
        Commands::Flows { query, no_color } => {
            apply_query(&mut config, query)?;
            let config = config.validated();
            let client = ApiClient::new(&config.server, config.timeout);
            let airports = client.airports()?;
            let records = client.flows(config.hours, config.direction)?;
            let rows = report::flow_rows(&records, &airports, &config);
            let color = !no_color && io::stdout().is_terminal();
            report::write_flows(&mut io::stdout().lock(), &rows, &config, color)?;
        }
        Commands::Stations { no_color } => {
            let config = config.validated();
            let client = ApiClient::new(&config.server, config.timeout);
            let airports = client.airports()?;
            let stations = client.stations()?;
            let color = !no_color && io::stdout().is_terminal();
            report::write_stations(&mut io::stdout().lock(), &stations, &airports, chrono::Utc::now(), color)?;
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("netops-map: {}", e);
        std::process::exit(1);
    }
}
