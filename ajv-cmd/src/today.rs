//! "Is it hot today?" for one station.

use crate::config::Config;
use crate::retry::retry_with_backoff;
use ajv_core::percentile_bucket::{BucketLabel, PercentileBreakpoints};
use ajv_core::station::StationReading;
use ajv_core::VroceError;
use ajv_stats::bucket::classify_breakpoints;
use ajv_utils::dates::{format_date, format_long, format_time, local_from_millis};
use ajv_utils::numbers::round;
use log::info;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TodayReport {
    pub station_id: i64,
    pub bucket: BucketLabel,
    /// Breakpoint that opened the bucket
    pub threshold: f64,
    pub verdict: String,
    pub description: String,
    pub percentile: String,
    pub temperature_average: f64,
    pub temperature_min: f64,
    pub time_min: String,
    pub temperature_max: f64,
    pub time_max: String,
    pub updated: String,
}

impl TodayReport {
    pub fn build(
        station_id: i64,
        reading: &StationReading,
        breakpoints: &PercentileBreakpoints,
    ) -> anyhow::Result<TodayReport> {
        let classification = classify_breakpoints(reading.temperature_average, breakpoints)?;
        let updated = local_from_millis(reading.timestamp)?;
        let time_min = local_from_millis(reading.timestamp_min)?;
        let time_max = local_from_millis(reading.timestamp_max)?;
        let bucket = classification.bucket;

        Ok(TodayReport {
            station_id,
            bucket,
            threshold: classification.threshold,
            verdict: bucket.verdict().to_string(),
            description: bucket.description().to_string(),
            percentile: bucket.percentile_label().to_string(),
            temperature_average: round(reading.temperature_average, 1),
            temperature_min: round(reading.temperature_min, 1),
            time_min: format_time(&time_min, &updated),
            temperature_max: round(reading.temperature_max, 1),
            time_max: format_time(&time_max, &updated),
            updated: format_long(&updated),
        })
    }

    fn print(&self) {
        println!("{} {}", self.verdict, self.description);
        println!(
            "Povprečna temperatura zadnjih 24 ur je {:.1} °C ({}, prag {:.1} °C).",
            self.temperature_average, self.percentile, self.threshold
        );
        println!("Najnižja: {:.1} °C {}", self.temperature_min, self.time_min);
        println!("Najvišja: {:.1} °C {}", self.temperature_max, self.time_max);
        println!("Posodobljeno {}", self.updated);
    }
}

pub async fn run_today(config: &Config, station_id: i64, json: bool) -> anyhow::Result<()> {
    let client = &config.client()?;
    let policy = config.retry_policy();

    let reading = retry_with_backoff(&policy, VroceError::is_retryable, move || {
        client.fetch_station_reading(station_id)
    })
    .await?;
    // percentiles are keyed by the calendar day of the reading
    let date = &local_from_millis(reading.timestamp)?.date();
    info!("station {}: breakpoints for {}", station_id, format_date(date));
    let breakpoints = retry_with_backoff(&policy, VroceError::is_retryable, move || {
        client.fetch_breakpoints(station_id, date)
    })
    .await?;

    let report = TodayReport::build(station_id, &reading, &breakpoints)?;
    info!(
        "station {}: {:.1} °C is in bucket {}",
        station_id, report.temperature_average, report.bucket
    );
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        report.print();
    }
    Ok(())
}
