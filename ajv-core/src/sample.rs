use crate::calendar_window::{CalendarWindow, MonthDay};
use crate::error::{Result, VroceError};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Field names that may carry the daily average temperature, in priority order.
const AVERAGE_FIELDS: [&str; 5] = ["tavg", "temperature_average", "avg", "tempAvg", "temp_mean"];

/// One historical daily observation inside a calendar window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureSample {
    pub year: i32,
    /// Daily average temperature in °C
    pub average_temperature: f64,
    /// Day offset relative to the window center, when the source reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_offset: Option<i32>,
}

/// Read a JSON number, or a string holding one.
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn field(row: &Value, name: &str) -> Option<f64> {
    row.get(name).filter(|v| !v.is_null()).and_then(number)
}

impl TemperatureSample {
    /// Normalize one historical-window row.
    ///
    /// The average is taken from the first present average field, falling
    /// back to the midpoint of `tmin`/`tmax`. Rows without a finite year and
    /// average yield `None`.
    pub fn from_window_row(row: &Value) -> Option<TemperatureSample> {
        let year = field(row, "year")?;
        let average = AVERAGE_FIELDS
            .iter()
            .find_map(|name| row.get(*name).filter(|v| !v.is_null()))
            .map(number)
            .unwrap_or_else(|| match (field(row, "tmin"), field(row, "tmax")) {
                (Some(tmin), Some(tmax)) => Some((tmin + tmax) / 2.0),
                _ => None,
            })?;
        if !year.is_finite() || !average.is_finite() {
            return None;
        }
        Some(TemperatureSample {
            year: year as i32,
            average_temperature: average,
            day_offset: field(row, "day_offset").map(|d| d as i32),
        })
    }

    /// Parse the historical-window service response (a JSON array of rows).
    pub fn parse_historical_window(body: &str) -> Result<Vec<TemperatureSample>> {
        let json: Value = serde_json::from_str(body)?;
        let rows = json.as_array().ok_or_else(|| {
            VroceError::InvalidFormat("historical_window response is not an array".to_string())
        })?;
        let samples: Vec<TemperatureSample> =
            rows.iter().filter_map(TemperatureSample::from_window_row).collect();
        if samples.len() < rows.len() {
            log::warn!(
                "historical_window: dropped {} rows without a finite year/average",
                rows.len() - samples.len()
            );
        }
        log::info!("historical_window: parsed {} samples", samples.len());
        Ok(samples)
    }

    /// Extract the samples of one station inside `window` from a daily CSV.
    ///
    /// Expected CSV columns (with headers): `station_id,date,tavg`, dates as
    /// "YYYY-MM-DD". Rows with a non-numeric average are skipped.
    pub fn parse_daily_csv(
        csv_data: &str,
        station_id: i64,
        window: &CalendarWindow,
    ) -> Result<Vec<TemperatureSample>> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(csv_data.as_bytes());

        let station = station_id.to_string();
        let mut samples = Vec::new();
        let mut skipped = 0u32;
        for result in rdr.records() {
            let record = result?;
            if record.get(0).map(str::trim) != Some(station.as_str()) {
                continue;
            }
            let date = record.get(1).unwrap_or("").trim();
            if !window.contains_date(date) {
                continue;
            }
            let parsed = date
                .get(0..4)
                .and_then(|y| y.parse::<i32>().ok())
                .zip(date.get(5..).and_then(|md| md.parse::<MonthDay>().ok()));
            let average = record
                .get(2)
                .and_then(|v| v.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite());
            match (parsed, average) {
                (Some((year, month_day)), Some(average_temperature)) => {
                    samples.push(TemperatureSample {
                        year,
                        average_temperature,
                        day_offset: window.offset_of(&month_day),
                    })
                }
                _ => skipped += 1,
            }
        }
        log::info!(
            "daily csv: {} samples for station {} around {}, skipped {}",
            samples.len(),
            station_id,
            window.center,
            skipped
        );
        Ok(samples)
    }
}
