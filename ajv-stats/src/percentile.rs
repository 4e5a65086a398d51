//! Percentiles and moments of temperature samples.

use serde::Serialize;

/// Percentile of an ascending slice by linear interpolation between ranks.
///
/// The rank index is `(n - 1) * p / 100`; a fractional index blends the two
/// neighbouring values. Empty input (or `p` outside 0..=100) gives `NaN`.
/// The caller is responsible for sorting.
pub fn percentile(sorted_asc: &[f64], p: f64) -> f64 {
    if sorted_asc.is_empty() || !(0.0..=100.0).contains(&p) {
        return f64::NAN;
    }
    let idx = (sorted_asc.len() - 1) as f64 * (p / 100.0);
    let lo = idx.floor();
    let hi = idx.ceil();
    let (Some(&low), Some(&high)) = (sorted_asc.get(lo as usize), sorted_asc.get(hi as usize))
    else {
        return f64::NAN;
    };
    if lo == hi {
        return low;
    }
    let w = idx - lo;
    low * (1.0 - w) + high * w
}

/// Arithmetic mean; `NaN` for empty input.
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by `n`); 0 for empty input.
pub fn stddev(values: &[f64]) -> f64 {
    let m = mean(values);
    let variance = values
        .iter()
        .map(|v| {
            let diff = v - m;
            diff * diff
        })
        .sum::<f64>()
        / values.len().max(1) as f64;
    variance.sqrt()
}

/// Ascending copy of `values`.
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(f64::total_cmp);
    out
}

/// The percentiles the seasonal charts use, computed together.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quantiles {
    pub p05: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p95: f64,
}

impl Quantiles {
    pub fn from_sorted(sorted_asc: &[f64]) -> Self {
        Quantiles {
            p05: percentile(sorted_asc, 5.0),
            p25: percentile(sorted_asc, 25.0),
            p50: percentile(sorted_asc, 50.0),
            p75: percentile(sorted_asc, 75.0),
            p95: percentile(sorted_asc, 95.0),
        }
    }

    pub fn iqr(&self) -> f64 {
        self.p75 - self.p25
    }
}
