//! Command implementations for the Ali je vroče CLI.
//!
//! Provides subcommands for today's percentile verdict, the station list,
//! calendar windows and the seasonal chart data, with a response cache and
//! retried requests.

use clap::Subcommand;

mod cached;
pub mod config;
pub mod pipeline;
pub mod retry;
pub mod seasonal;
pub mod stations;
pub mod today;
pub mod window;

pub use config::Config;

#[derive(Subcommand)]
pub enum Command {
    /// List the stations offered for selection
    Stations {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Is it hot today? Classify the last 24 hours against history
    Today {
        /// Station ID (ARSO)
        #[arg(short, long, default_value_t = ajv_core::station::DEFAULT_STATION_ID)]
        station: i64,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show the MM-DD days of a calendar window
    Window {
        /// Window center as MM-DD
        #[arg(short, long)]
        center: String,

        /// Window size in days
        #[arg(short, long, default_value_t = ajv_core::calendar_window::DEFAULT_WINDOW_DAYS)]
        days: usize,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Compute histogram and scatter data for a seasonal window
    Seasonal(seasonal::SeasonalArgs),
}

pub async fn run(config: Config, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Stations { json } => stations::run_stations(&config, json).await,
        Command::Today { station, json } => today::run_today(&config, station, json).await,
        Command::Window { center, days, json } => window::run_window(&center, days, json),
        Command::Seasonal(args) => seasonal::run_seasonal(&config, &args).await,
    }
}
