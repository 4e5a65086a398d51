use crate::error::{Result, VroceError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Station shown when nothing else is selected: Ljubljana.
pub const DEFAULT_STATION_ID: i64 = 1495;

/// Represents an ARSO weather station offered for selection.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Station {
    pub station_id: i64,
    /// Locative name without its preposition (e.g. "Ljubljani")
    pub name_locative: String,
    /// Preposition preceding the locative name (e.g. "v")
    pub prefix: String,
}

impl Station {
    /// Parse the Datasette stations table.
    ///
    /// Rows are `[rowid, station_id, name, name_locative]`; the first word of
    /// `name_locative` is the preposition.
    pub fn parse_datasette_json(body: &str) -> Result<Vec<Station>> {
        let json: Value = serde_json::from_str(body)?;
        let rows = json
            .get("rows")
            .and_then(|r| r.as_array())
            .ok_or_else(|| VroceError::InvalidFormat("stations response has no rows".to_string()))?;

        let mut station_list = Vec::with_capacity(rows.len());
        for row in rows {
            let station_id = row
                .get(1)
                .and_then(|v| v.as_i64().or_else(|| v.as_str().and_then(|s| s.parse().ok())))
                .ok_or_else(|| VroceError::InvalidFormat(format!("bad station row {}", row)))?;
            let locative = row.get(3).and_then(|v| v.as_str()).unwrap_or("");
            let mut words = locative.split(' ');
            let prefix = words.next().unwrap_or("").to_string();
            let name_locative = words.collect::<Vec<_>>().join(" ");
            station_list.push(Station {
                station_id,
                name_locative,
                prefix,
            });
        }
        log::info!("stations: parsed {} stations", station_list.len());
        Ok(station_list)
    }

    /// "v Ljubljani"
    pub fn display_name(&self) -> String {
        if self.prefix.is_empty() {
            self.name_locative.clone()
        } else {
            format!("{} {}", self.prefix, self.name_locative)
        }
    }
}

/// Latest 24-hour statistics for one station.
///
/// Timestamps are Unix milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationReading {
    pub temperature_average: f64,
    pub temperature_min: f64,
    pub temperature_max: f64,
    pub timestamp: i64,
    pub timestamp_min: i64,
    pub timestamp_max: i64,
}

fn stat_f64(stats: &Value, name: &str) -> Result<f64> {
    stats
        .get(name)
        .and_then(|v| v.as_f64().or_else(|| v.as_str().and_then(|s| s.parse().ok())))
        .ok_or_else(|| VroceError::DataUnavailable(format!("station statistics lack {}", name)))
}

fn stat_millis(stats: &Value, name: &str) -> Result<i64> {
    stats
        .get(name)
        .and_then(|v| v.as_i64().or_else(|| v.as_str().and_then(|s| s.parse().ok())))
        .ok_or_else(|| VroceError::DataUnavailable(format!("station statistics lack {}", name)))
}

impl StationReading {
    /// Parse the Vremenar station-details response.
    pub fn from_details_json(body: &str) -> Result<Self> {
        let json: Value = serde_json::from_str(body)?;
        let stats = json
            .get("statistics")
            .ok_or_else(|| VroceError::DataUnavailable("station has no statistics".to_string()))?;
        Ok(StationReading {
            temperature_average: stat_f64(stats, "temperature_average_24h")?,
            temperature_min: stat_f64(stats, "temperature_min_24h")?,
            temperature_max: stat_f64(stats, "temperature_max_24h")?,
            timestamp: stat_millis(stats, "timestamp")?,
            timestamp_min: stat_millis(stats, "timestamp_temperature_min_24h")?,
            timestamp_max: stat_millis(stats, "timestamp_temperature_max_24h")?,
        })
    }
}
