//! Chart-ready data for one station's seasonal window.
//!
//! [`SeasonalWindow`] validates raw samples once; [`HistogramData`] and
//! [`ScatterData`] derive the two chart payloads from it. Nothing here knows
//! about a chart library: the output is plain points and scalars.

use crate::color::color_for;
use crate::kde::{estimate_density, BandedCurve, Bandwidth};
use crate::percentile::{percentile, Quantiles};
use crate::trend::{linear_regression, TrendLine};
use ajv_core::calendar_window::MonthDay;
use ajv_core::sample::TemperatureSample;
use ajv_core::{Result, VroceError};
use serde::Serialize;
use std::ops::RangeInclusive;

/// Years accepted as plausible observation years.
pub const VALID_YEARS: RangeInclusive<i32> = 1800..=2100;

/// Headroom above the tallest histogram point.
pub const HISTOGRAM_HEADROOM: f64 = 1.12;

/// Today's point sits this many years right of the last observed year.
pub const TODAY_YEAR_OFFSET: i32 = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct SeasonalWindow {
    pub samples: Vec<TemperatureSample>,
    pub temperatures: Vec<f64>,
    pub sorted: Vec<f64>,
    pub years: Vec<i32>,
    pub year_range: (i32, i32),
}

impl SeasonalWindow {
    pub fn from_samples(samples: &[TemperatureSample]) -> Result<SeasonalWindow> {
        let mut valid = Vec::with_capacity(samples.len());
        for sample in samples {
            if !sample.average_temperature.is_finite() {
                log::warn!(
                    "Invalid temperature value {} for year {}",
                    sample.average_temperature,
                    sample.year
                );
                continue;
            }
            if !VALID_YEARS.contains(&sample.year) {
                log::warn!("Invalid year value: {}", sample.year);
                continue;
            }
            valid.push(*sample);
        }

        if valid.is_empty() {
            return Err(VroceError::InsufficientData {
                needed: 1,
                found: 0,
            });
        }
        if valid.len() < crate::kde::LOW_SAMPLE_COUNT {
            log::warn!("Low data count: only {} valid temperatures", valid.len());
        }

        let temperatures: Vec<f64> = valid.iter().map(|s| s.average_temperature).collect();
        let sorted = crate::percentile::sorted(&temperatures);
        let years: Vec<i32> = valid.iter().map(|s| s.year).collect();
        let min_year = years.iter().copied().min().unwrap_or_default();
        let max_year = years.iter().copied().max().unwrap_or_default();

        Ok(SeasonalWindow {
            samples: valid,
            temperatures,
            sorted,
            years,
            year_range: (min_year, max_year),
        })
    }

    pub fn len(&self) -> usize {
        self.temperatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.temperatures.is_empty()
    }

    pub fn quantiles(&self) -> Quantiles {
        Quantiles::from_sorted(&self.sorted)
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramData {
    pub p05: f64,
    pub p50: f64,
    pub p95: f64,
    pub bandwidth: Bandwidth,
    pub curve: BandedCurve,
    pub y_max: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub today: Option<f64>,
}

impl HistogramData {
    pub fn compute(window: &SeasonalWindow, today: Option<f64>) -> Result<HistogramData> {
        let q = window.quantiles();
        let density = estimate_density(&window.temperatures)?;
        Ok(HistogramData {
            p05: q.p05,
            p50: q.p50,
            p95: q.p95,
            bandwidth: density.bandwidth,
            curve: density.partition(q.p05, q.p95),
            y_max: density.y_max() * HISTOGRAM_HEADROOM,
            today: finite(today),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    /// Year
    pub x: i32,
    /// Daily average temperature in °C
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_offset: Option<i32>,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterData {
    pub points: Vec<ScatterPoint>,
    pub median: f64,
    pub trend: TrendLine,
    pub trend_segment: [(f64, f64); 2],
    pub trend_per_century: f64,
    pub p05: f64,
    pub p95: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub today: Option<(i32, f64)>,
    pub y_min: f64,
    pub y_max: f64,
}

impl ScatterData {
    /// Points are colored by their anomaly against the window median.
    pub fn compute(window: &SeasonalWindow, today: Option<f64>) -> ScatterData {
        let median = percentile(&window.sorted, 50.0);
        let anomalies: Vec<f64> = window.temperatures.iter().map(|t| t - median).collect();
        let a_min = anomalies.iter().copied().fold(f64::INFINITY, f64::min);
        let a_max = anomalies.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let points = window
            .samples
            .iter()
            .zip(&anomalies)
            .map(|(s, &anomaly)| ScatterPoint {
                x: s.year,
                y: s.average_temperature,
                day_offset: s.day_offset,
                color: color_for(anomaly, a_min, a_max),
            })
            .collect();

        let xs: Vec<f64> = window.years.iter().map(|&y| f64::from(y)).collect();
        let trend = linear_regression(&xs, &window.temperatures);
        let (min_year, max_year) = window.year_range;

        let today = finite(today);
        let mut lo = window.sorted.first().copied().unwrap_or(f64::NAN);
        let mut hi = window.sorted.last().copied().unwrap_or(f64::NAN);
        if let Some(t) = today {
            lo = lo.min(t);
            hi = hi.max(t);
        }

        ScatterData {
            points,
            median,
            trend,
            trend_segment: trend.segment(f64::from(min_year), f64::from(max_year)),
            trend_per_century: trend.per_century(),
            p05: percentile(&window.sorted, 5.0),
            p95: percentile(&window.sorted, 95.0),
            today: today.map(|t| (max_year + TODAY_YEAR_OFFSET, t)),
            y_min: (lo - 1.0).floor(),
            y_max: (hi + 1.0).ceil(),
        }
    }
}

/// What a seasonal report was computed for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonalRequest {
    pub station_id: i64,
    pub center: MonthDay,
    pub window_days: usize,
}

/// JSON payload of the `seasonal` command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonalReport {
    pub request: SeasonalRequest,
    pub sample_count: usize,
    pub year_range: (i32, i32),
    pub histogram: HistogramData,
    pub scatter: ScatterData,
}

impl SeasonalReport {
    pub fn compute(
        request: SeasonalRequest,
        samples: &[TemperatureSample],
        today: Option<f64>,
    ) -> Result<SeasonalReport> {
        let window = SeasonalWindow::from_samples(samples)?;
        let histogram = HistogramData::compute(&window, today)?;
        let scatter = ScatterData::compute(&window, today);
        log::info!(
            "seasonal report for station {} around {}: {} samples, {}-{}",
            request.station_id,
            request.center,
            window.len(),
            window.year_range.0,
            window.year_range.1
        );
        Ok(SeasonalReport {
            request,
            sample_count: window.len(),
            year_range: window.year_range,
            histogram,
            scatter,
        })
    }
}
