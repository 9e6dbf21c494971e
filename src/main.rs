//! Rideport - Portal Ride Downloader & Track Exporter
//!
//! Command-line entry point: fetch rides from the portal, or convert
//! previously downloaded record files to GPX/KML.

use anyhow::Context;
use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use clap::{Args, Parser, Subcommand, ValueHint};
use rideport::export::{export_path, TrackFormat};
use rideport::portal::PortalClient;
use rideport::records;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Time format accepted on the command line.
const USER_DATE_FORMAT: &str = "%Y/%m/%d %H:%M";

#[derive(Parser)]
#[command(author, version, about = "Download rides from an e-bike portal and export GPX/KML tracks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download ride activities from the portal
    Fetch(FetchArgs),
    /// Export record file(s) to GPX
    ToGpx(ConvertArgs),
    /// Export record file(s) to KML
    ToKml(ConvertArgs),
}

#[derive(Args)]
struct FetchArgs {
    /// Login email on the portal
    #[arg(long, env = "LOGIN")]
    login: String,

    /// Password on the portal
    #[arg(long, env = "PASSWORD")]
    password: String,

    /// Output directory for the downloaded files
    #[arg(long, env = "OUT_DIR", value_hint = ValueHint::DirPath)]
    out_dir: PathBuf,

    /// Start of the download window (%Y/%m/%d %H:%M), default: seven days ago
    #[arg(long, env = "SINCE", value_parser = parse_user_time)]
    since: Option<DateTime<Utc>>,

    /// End of the download window (%Y/%m/%d %H:%M), default: now
    #[arg(long, value_parser = parse_user_time)]
    to: Option<DateTime<Utc>>,
}

#[derive(Args)]
struct ConvertArgs {
    /// Record file downloaded from the portal; for a directory, every
    /// *.json file in it is converted
    #[arg(value_hint = ValueHint::AnyPath)]
    path: PathBuf,
}

fn parse_user_time(raw: &str) -> Result<DateTime<Utc>, String> {
    NaiveDateTime::parse_from_str(raw, USER_DATE_FORMAT)
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|_| format!("expected a time like 2023/01/31 18:05 ({USER_DATE_FORMAT})"))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::debug!("Starting rideport v{}", env!("CARGO_PKG_VERSION"));

    match Cli::parse().command {
        Command::Fetch(args) => run_fetch(args),
        Command::ToGpx(args) => run_convert(args, TrackFormat::Gpx),
        Command::ToKml(args) => run_convert(args, TrackFormat::Kml),
    }
}

fn run_fetch(args: FetchArgs) -> anyhow::Result<()> {
    // The output directory is the one fatal precondition; it is checked
    // before anything is downloaded.
    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("unable to create output dir {}", args.out_dir.display()))?;

    let since = args.since.unwrap_or_else(|| Utc::now() - Duration::days(7));
    let to = args.to.unwrap_or_else(Utc::now);

    tracing::info!(
        "Downloading ride list from {} to {}",
        since.format(USER_DATE_FORMAT),
        to.format(USER_DATE_FORMAT)
    );

    let client = PortalClient::login(&args.login, &args.password)?;

    let activities = client.list_activities(to)?;
    let ride_ids: Vec<String> = activities
        .iter()
        .flat_map(|activity| activity.ride_ids_between(since, to))
        .collect();

    for (index, id) in ride_ids.iter().enumerate() {
        tracing::info!("Ride {} of {}", index + 1, ride_ids.len());

        let ride = client.fetch_ride(id)?;
        let path = records::save_ride(&args.out_dir, &ride)?;
        tracing::info!("Wrote {}", path.display());
    }

    Ok(())
}

fn run_convert(args: ConvertArgs, format: TrackFormat) -> anyhow::Result<()> {
    let report = export_path(&args.path, format)
        .with_context(|| format!("cannot export {}", args.path.display()))?;

    // Per-file failures were already logged as they happened; they do
    // not fail the run.
    tracing::info!(
        "{} export finished: {} file(s) written, {} failure(s)",
        format,
        report.written.len(),
        report.failures.len()
    );

    Ok(())
}
