//! TravelLayer CLI - Command-line interface
//!
//! This binary drives the TravelLayer engine headlessly: credential setup,
//! one-shot layer fetches, and inspection of persisted session state.

mod commands;
mod error;

use clap::{Parser, Subcommand, ValueEnum};
use error::CliError;
use travellayer::layer::Domain;
use travellayer::logging::{default_log_dir, default_log_file, init_logging};

/// Data domain selector for the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum DomainArg {
    /// Road conditions (incidents, chain controls, cameras, signs)
    Road,
    /// Current weather observations
    Current,
    /// Forecast weather
    Forecast,
    /// Fire incidents and detectors
    Fire,
    /// Other traveler information (rest areas, truck scales, summits)
    Other,
}

impl From<DomainArg> for Domain {
    fn from(arg: DomainArg) -> Self {
        match arg {
            DomainArg::Road => Domain::RoadConditions,
            DomainArg::Current => Domain::WeatherCurrent,
            DomainArg::Forecast => Domain::WeatherForecast,
            DomainArg::Fire => Domain::Fire,
            DomainArg::Other => Domain::OtherInfo,
        }
    }
}

#[derive(Parser)]
#[command(name = "travellayer")]
#[command(about = "Road conditions and traveler information, headless", long_about = None)]
struct Args {
    /// Path of the on-disk state store
    #[arg(long, default_value = "travellayer_state.json", global = true)]
    store: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive Google Maps API key setup
    Setup {
        /// Provider endpoint used to verify the key
        #[arg(long, default_value = "https://maps.googleapis.com")]
        verify_url: String,
    },
    /// Fetch a layer's data and print a summary
    Layers {
        /// Data domain
        #[arg(long, value_enum)]
        domain: DomainArg,

        /// Layer name; omit to list the domain's layers
        #[arg(long)]
        layer: Option<String>,

        /// Data provider base URL
        #[arg(long, default_value = "https://quickmap.dot.ca.gov")]
        base_url: String,
    },
    /// Show persisted map view state and preferences
    State,
    /// Clear persisted map view state and preferences
    ClearState,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let _logging_guard = match init_logging(default_log_dir(), default_log_file()) {
        Ok(guard) => guard,
        Err(e) => CliError::LoggingInit(e.to_string()).exit(),
    };
    tracing::info!("TravelLayer v{}", travellayer::VERSION);

    let result = match args.command {
        Command::Setup { verify_url } => commands::setup::run(&args.store, &verify_url).await,
        Command::Layers {
            domain,
            layer,
            base_url,
        } => commands::layers::run(domain.into(), layer.as_deref(), &base_url).await,
        Command::State => commands::state::show(&args.store),
        Command::ClearState => commands::state::clear(&args.store),
    };

    if let Err(e) = result {
        e.exit();
    }
}
