//! Juror kiosk: runs one voting session on a terminal.

mod commands;
mod hosts;
mod screen;

use std::io::BufRead;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context};
use clap::Parser;
use juror_gateway::HttpGateway;
use juror_runtime::{RuntimeConfig, SessionDriver};
use juror_session::Event;
use juror_types::{GeoPoint, PlateId};
use tokio::sync::mpsc::UnboundedSender;

use crate::commands::Input;
use crate::hosts::{FixedPosition, StillCamera};

#[derive(Parser)]
#[command(name = "juror-kiosk", about = "Gastronomic circuit juror kiosk")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "JUROR_CONFIG")]
    config: Option<PathBuf>,

    /// Base URL of the circuit backend.
    #[arg(long, env = "JUROR_GATEWAY_URL")]
    gateway_url: Option<String>,

    /// Edition votes are cast in.
    #[arg(long, env = "JUROR_EDITION")]
    edition: Option<u32>,

    /// Geofence radius around the restaurant, in meters.
    #[arg(long, env = "JUROR_GEOFENCE_RADIUS_M")]
    geofence_radius_m: Option<f64>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "JUROR_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "JUROR_LOG_FORMAT")]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run a voting session for one plate.
    Vote {
        /// Plate being voted on.
        #[arg(long)]
        plate: u64,

        /// Binary PPM image served as the camera stream.
        #[arg(long)]
        still: PathBuf,

        /// Kiosk latitude, in degrees.
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Kiosk longitude, in degrees.
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },
    /// Validate a value the way the session would.
    Check {
        #[command(subcommand)]
        target: CheckTarget,
    },
    /// Print the effective configuration as TOML.
    Config,
}

#[derive(clap::Subcommand)]
enum CheckTarget {
    /// National ID (check digits included).
    Id { value: String },
    /// Phone number, national format.
    Phone { value: String },
    /// One-time code.
    Code { value: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    juror_runtime::init_logging(config.log_format()?, &config.log_level)?;

    match cli.command {
        Command::Vote {
            plate,
            still,
            lat,
            lon,
        } => vote(&config, PlateId(plate), still, GeoPoint::new(lat, lon)).await,
        Command::Check { target } => check(target),
        Command::Config => {
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<RuntimeConfig> {
    let mut config = match &cli.config {
        Some(path) => RuntimeConfig::from_toml_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => RuntimeConfig::default(),
    };
    if let Some(url) = &cli.gateway_url {
        config.gateway_url = url.clone();
    }
    if let Some(edition) = cli.edition {
        config.edition_id = edition;
    }
    if let Some(radius) = cli.geofence_radius_m {
        config.geofence_radius_m = radius;
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.log_format = format.clone();
    }
    config.validate()?;
    Ok(config)
}

async fn vote(
    config: &RuntimeConfig,
    plate: PlateId,
    still: PathBuf,
    position: GeoPoint,
) -> anyhow::Result<()> {
    let backend = HttpGateway::new(config.gateway_url.clone())?;
    tracing::info!(
        %plate,
        edition = config.edition_id,
        gateway = backend.base_url(),
        "starting voting session"
    );

    let mut driver = SessionDriver::new(
        plate,
        config,
        backend,
        StillCamera::new(still),
        FixedPosition::new(position),
    );
    spawn_prompt(driver.sender());

    let started = Instant::now();
    let mut last = String::new();
    driver.begin();
    driver
        .run(|session| {
            let current = screen::render(session);
            if current != last {
                println!("\n{current}");
                last = current;
            }
        })
        .await;

    let phase = driver.session().phase().name();
    tracing::info!(
        phase,
        elapsed = %juror_utils::format_duration(started.elapsed().as_secs()),
        "session finished"
    );
    Ok(())
}

/// Read juror commands from stdin on a plain thread so a pending read never
/// holds up shutdown. End of input abandons the session.
fn spawn_prompt(events: UnboundedSender<Event>) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            match commands::parse(&line) {
                Ok(Input::Event(event)) => {
                    if events.send(event).is_err() {
                        return;
                    }
                }
                Ok(Input::Help) => println!("{}", commands::HELP),
                Ok(Input::Nothing) => {}
                Err(e) => println!("? {e}"),
            }
        }
        let _ = events.send(Event::Abandon);
    });
}

fn check(target: CheckTarget) -> anyhow::Result<()> {
    let (what, value, valid) = match &target {
        CheckTarget::Id { value } => (
            "national ID",
            value,
            juror_validation::validate_national_id(value),
        ),
        CheckTarget::Phone { value } => (
            "phone number",
            value,
            juror_validation::validate_phone(value),
        ),
        CheckTarget::Code { value } => ("code", value, juror_validation::validate_otp(value)),
    };
    if !valid {
        bail!("{value:?} is not a valid {what}");
    }
    println!("{value:?} is a valid {what}");
    Ok(())
}
