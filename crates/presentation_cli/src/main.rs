//! Stop finder CLI
//!
//! Finds the nearest MBTA stop to a place name and reports whether it is
//! wheelchair accessible.

#![allow(clippy::print_stdout)]

mod config;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use domain::GeoLocation;
use integration_transit::{
    GeocodedPlace, GeocodingClient, MapboxGeocodingClient, MbtaTransitClient, Stop, StopFinder,
    StopSearchResult, TransitClient,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;

/// Stop finder CLI
#[derive(Parser)]
#[command(name = "stopfinder-cli")]
#[command(author, version, about = "Find the nearest transit stop to a place", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file (defaults to ./config.toml if present)
    #[arg(short, long, env = "STOPFINDER_CONFIG")]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

// `Option<Option<u8>>` is clap's shape for a flag with an optional value
#[allow(clippy::option_option)]
#[derive(Subcommand)]
enum Commands {
    /// Find the stop nearest to a place name
    ///
    /// Example: stopfinder-cli find "Babson College"
    Find {
        /// Place name or address
        place: String,

        /// List nearby stops instead of only the nearest (`mbta.max_results` when no count is given)
        #[arg(short = 'n', long, num_args = 0..=1)]
        limit: Option<Option<u8>>,
    },

    /// Resolve a place name to coordinates
    Geocode {
        /// Place name or address
        place: String,
    },

    /// Find the stop nearest to a coordinate
    ///
    /// Example: stopfinder-cli nearest --lat 42.2809 --lon -71.2376
    Nearest {
        /// Latitude in degrees
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        /// Longitude in degrees
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        /// List nearby stops instead of only the nearest (`mbta.max_results` when no count is given)
        #[arg(short = 'n', long, num_args = 0..=1)]
        limit: Option<Option<u8>>,
    },
}

/// Determine log filter level from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Resolve `-n`: absent means nearest only, a bare flag means the configured default
#[allow(clippy::option_option)]
fn resolve_limit(limit: Option<Option<u8>>, default: u8) -> Option<u8> {
    limit.map(|count| count.unwrap_or(default))
}

/// Format a distance for display, in meters below one kilometer
fn format_distance(km: f64) -> String {
    if km < 1.0 {
        format!("{:.0} m", km * 1000.0)
    } else {
        format!("{km:.1} km")
    }
}

/// Format the pipeline result for the terminal
fn format_search_result(result: &StopSearchResult) -> String {
    let mut out = String::new();
    if let Some(name) = &result.place.place_name {
        out.push_str(&format!("📍 {name}\n"));
    }
    out.push_str(&format!("🚏 Nearest stop: {}\n", result.stop.name));
    let boarding = result.stop.wheelchair_boarding;
    let icon = if boarding.is_accessible() { "♿" } else { "⚠️" };
    out.push_str(&format!(
        "{icon} {} (code {})",
        boarding.label(),
        boarding.code()
    ));
    out
}

/// Format a geocoded place for the terminal
fn format_place(place: &GeocodedPlace) -> String {
    let mut out = format!(
        "📍 {:.6}, {:.6}",
        place.location.latitude(),
        place.location.longitude()
    );
    if let Some(name) = &place.place_name {
        out.push_str(&format!("\n   {name}"));
    }
    if let Some(address) = &place.address {
        out.push_str(&format!("\n   Address: {address}"));
    }
    out
}

/// Format a list of stops, closest first, with distances from `origin`
fn format_stop_list(origin: &GeoLocation, stops: &[Stop]) -> String {
    if stops.is_empty() {
        return "No stops found nearby".to_string();
    }

    stops
        .iter()
        .enumerate()
        .map(|(i, stop)| {
            let distance = stop
                .distance_km_from(origin)
                .map(|km| format!(" ({})", format_distance(km)))
                .unwrap_or_default();
            format!("{}. {}{distance}", i + 1, stop.format_summary())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over -v when set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_filter_from_verbosity(cli.verbose)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("invalid configuration")?;

    let default_limit = config.mbta.max_results;

    match cli.command {
        Commands::Find { place, limit } => {
            let finder = StopFinder::from_configs(&config.mapbox, &config.mbta)?;

            match resolve_limit(limit, default_limit) {
                None => {
                    let result = finder.search(&place).await?;
                    info!(stop = %result.stop.name, "Nearest stop resolved");

                    if cli.json {
                        println!("{}", serde_json::to_string_pretty(&result)?);
                    } else {
                        println!("{}", format_search_result(&result));
                    }
                },
                Some(limit) => {
                    let (place, stops) = finder.stops_near(&place, limit).await?;

                    if cli.json {
                        println!(
                            "{}",
                            serde_json::to_string_pretty(&serde_json::json!({
                                "place": place,
                                "stops": stops,
                            }))?
                        );
                    } else {
                        println!("{}", format_place(&place));
                        println!("{}", format_stop_list(&place.location, &stops));
                    }
                },
            }
        },

        Commands::Geocode { place } => {
            let geocoder = MapboxGeocodingClient::new(&config.mapbox)?;
            let place = geocoder.geocode(&place).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&place)?);
            } else {
                println!("{}", format_place(&place));
            }
        },

        Commands::Nearest { lat, lon, limit } => {
            let origin = GeoLocation::new(lat, lon)?;
            let transit = MbtaTransitClient::new(&config.mbta)?;

            match resolve_limit(limit, default_limit) {
                None => {
                    let stop = transit.nearest_stop(origin).await?;
                    if cli.json {
                        println!("{}", serde_json::to_string_pretty(&stop)?);
                    } else {
                        println!("🚏 {stop}");
                    }
                },
                Some(limit) => {
                    let stops = transit.nearby_stops(origin, limit).await?;
                    if cli.json {
                        println!("{}", serde_json::to_string_pretty(&stops)?);
                    } else {
                        println!("{}", format_stop_list(&origin, &stops));
                    }
                },
            }
        },
    }

    Ok(())
}
