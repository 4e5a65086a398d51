//! HTTP client for the station, percentile and historical-window services.

use crate::calendar_window::{MonthDay, MAX_WINDOW_DAYS};
use crate::error::{Result, VroceError};
use crate::percentile_bucket::PercentileBreakpoints;
use crate::sample::TemperatureSample;
use crate::station::{Station, StationReading};
use chrono::NaiveDate;
use log::{debug, warn};
use reqwest::Client;
use std::time::Duration;

/// Datasette instance serving the station and percentile tables.
pub const DATA_BASE_URL: &str = "https://stage-data.podnebnik.org";

/// Vremenar API for live station details.
pub const VREMENAR_API_URL: &str = "https://podnebnik.vremenar.app/staging";

/// Origin of the historical-window endpoint.
pub const WINDOW_BASE_URL: &str = "https://podnebnik.vremenar.app";

/// Thin wrapper around `reqwest::Client` with the service base URLs.
#[derive(Debug, Clone)]
pub struct VremenarClient {
    client: Client,
    data_url: String,
    vremenar_url: String,
    window_url: String,
}

impl VremenarClient {
    /// Client against the production services with the given request timeout.
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::with_urls(timeout, DATA_BASE_URL, VREMENAR_API_URL, WINDOW_BASE_URL)
    }

    pub fn with_urls(
        timeout: Duration,
        data_url: &str,
        vremenar_url: &str,
        window_url: &str,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(VremenarClient {
            client,
            data_url: data_url.trim_end_matches('/').to_string(),
            vremenar_url: vremenar_url.trim_end_matches('/').to_string(),
            window_url: window_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!("Bad response status for {}: {}", url, status);
            return Err(VroceError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.text().await?)
    }

    /// All stations, sorted by name.
    pub async fn fetch_stations(&self) -> Result<Vec<Station>> {
        let url = format!(
            "{}/temperature/temperature~2Eslovenia_stations.json?&_col=station_id&_col=name&_col=name_locative&_sort=name",
            self.data_url
        );
        let body = self.get_text(&url).await?;
        Station::parse_datasette_json(&body)
    }

    /// Latest 24-hour statistics for a station.
    pub async fn fetch_station_reading(&self, station_id: i64) -> Result<StationReading> {
        let url = format!(
            "{}/stations/details/METEO-{}?country=si",
            self.vremenar_url, station_id
        );
        let body = self.get_text(&url).await?;
        StationReading::from_details_json(&body)
    }

    /// Historical percentile breakpoints for a station on a calendar date.
    pub async fn fetch_breakpoints(
        &self,
        station_id: i64,
        date: &NaiveDate,
    ) -> Result<PercentileBreakpoints> {
        let url = format!(
            "{}/temperature/temperature~2Eslovenia_historical~2Edaily~2Eaverage_percentiles.json?date__exact={}&station_id__exact={}&_col=p05&_col=p20&_col=p40&_col=p60&_col=p80&_col=p95",
            self.data_url,
            date.format("%Y-%m-%d"),
            station_id
        );
        let body = self.get_text(&url).await?;
        PercentileBreakpoints::from_datasette_json(&body)
    }

    /// Daily averages of every year for the days around `center`.
    pub async fn fetch_historical_window(
        &self,
        station_id: i64,
        center: &MonthDay,
        window_days: usize,
    ) -> Result<Vec<TemperatureSample>> {
        if window_days == 0 || window_days > MAX_WINDOW_DAYS {
            return Err(VroceError::InvalidWindow(window_days));
        }
        let url = format!(
            "{}/staging/ali-je-vroce/historical_window?station_id={}&center_mmdd={}&window_days={}",
            self.window_url, station_id, center, window_days
        );
        let body = self.get_text(&url).await?;
        TemperatureSample::parse_historical_window(&body)
    }
}
