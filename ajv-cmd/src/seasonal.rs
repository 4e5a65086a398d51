//! Seasonal histogram and scatter data for one station and calendar window.

use crate::cached::{read_cached, write_cached};
use crate::config::Config;
use crate::pipeline::{LatestOnly, RequestKey};
use crate::retry::{retry_with_backoff, RetryPolicy};
use ajv_core::api::VremenarClient;
use ajv_core::calendar_window::{build_window, MonthDay};
use ajv_core::sample::TemperatureSample;
use ajv_core::VroceError;
use ajv_db::{CacheStore, QueryCache};
use ajv_stats::SeasonalReport;
use anyhow::Context;
use chrono::Local;
use clap::Args;
use log::info;
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct SeasonalArgs {
    /// Station ID (ARSO)
    #[arg(short, long, default_value_t = ajv_core::station::DEFAULT_STATION_ID)]
    pub station: i64,

    /// Window center as MM-DD (today when omitted)
    #[arg(short, long)]
    pub center: Option<String>,

    /// Window size in days
    #[arg(short, long, default_value_t = ajv_core::calendar_window::DEFAULT_WINDOW_DAYS)]
    pub days: usize,

    /// Today's average temperature to mark on both charts
    #[arg(long, allow_hyphen_values = true)]
    pub today_temp: Option<f64>,

    /// Read samples from a `station_id,date,tavg` CSV instead of the service
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Write the JSON report here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl SeasonalArgs {
    /// The requested center, or today's month-day.
    pub fn center(&self) -> anyhow::Result<MonthDay> {
        match &self.center {
            Some(mmdd) => Ok(mmdd.parse()?),
            None => Ok(MonthDay::from_date(&Local::now().date_naive())),
        }
    }
}

/// Historical window samples from the cache, or from the service through the
/// latest-only pipeline with retries. Fresh results are cached.
pub async fn fetch_window_samples<S: CacheStore>(
    client: &VremenarClient,
    cache: &QueryCache<S>,
    policy: RetryPolicy,
    key: RequestKey,
) -> anyhow::Result<Vec<TemperatureSample>> {
    let query_key = key.query_key();
    if let Some(samples) = read_cached::<_, Vec<TemperatureSample>>(cache, &query_key) {
        info!("historical window {}: {} cached samples", key, samples.len());
        return Ok(samples);
    }

    let mut pipeline = LatestOnly::new();
    let client = client.clone();
    pipeline.submit(key, async move {
        retry_with_backoff(&policy, VroceError::is_retryable, || {
            client.fetch_historical_window(key.station_id, &key.center, key.window_days)
        })
        .await
    });
    let samples = pipeline
        .into_latest()
        .await
        .ok_or_else(|| anyhow::anyhow!("request {} did not complete", key))??;

    if samples.is_empty() {
        return Err(VroceError::InsufficientData {
            needed: 1,
            found: 0,
        }
        .into());
    }
    write_cached(cache, &query_key, &samples);
    Ok(samples)
}

pub async fn run_seasonal(config: &Config, args: &SeasonalArgs) -> anyhow::Result<()> {
    let center = args.center()?;
    let window = build_window(&center.to_string(), args.days)?;
    let key = RequestKey {
        station_id: args.station,
        center,
        window_days: args.days,
    };
    info!(
        "seasonal {}: {} days from {} to {}",
        key,
        window.len(),
        window.days.first().map(ToString::to_string).unwrap_or_default(),
        window.days.last().map(ToString::to_string).unwrap_or_default()
    );

    let samples = match &args.csv {
        Some(path) => {
            let csv_data = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            TemperatureSample::parse_daily_csv(&csv_data, args.station, &window)?
        }
        None => {
            let client = config.client()?;
            let cache = config.cache()?;
            fetch_window_samples(&client, &cache, config.retry_policy(), key).await?
        }
    };

    let report = SeasonalReport::compute(key.to_request(), &samples, args.today_temp)?;
    let json = serde_json::to_string_pretty(&report)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("writing {}", path.display()))?;
            info!("Seasonal report written to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
