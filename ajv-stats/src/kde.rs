//! Epanechnikov kernel density estimate of a temperature window.
//!
//! The curve is sampled every 0.1 °C over the sample range padded by half a
//! degree (outward to whole degrees) and rescaled so that it integrates to
//! the sample count, reading as "estimated number of days" on a chart.

use crate::percentile::{sorted, stddev, Quantiles};
use ajv_core::{Result, VroceError};
use serde::Serialize;

/// Grid resolution in °C.
pub const GRID_STEP: f64 = 0.1;

/// Padding added on both sides of the sample range before rounding outward.
pub const RANGE_PADDING: f64 = 0.5;

/// Bandwidth clamp bounds in °C.
pub const MIN_BANDWIDTH: f64 = 0.2;
pub const MAX_BANDWIDTH: f64 = 2.5;

/// Sample count under which the curve is not very meaningful.
pub const LOW_SAMPLE_COUNT: usize = 5;

/// Epanechnikov kernel: `0.75 * (1 - u²)` on `|u| < 1`, zero elsewhere.
pub fn epanechnikov(u: f64) -> f64 {
    if u.abs() >= 1.0 {
        0.0
    } else {
        0.75 * (1.0 - u * u)
    }
}

/// Which rule produced a bandwidth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BandwidthMethod {
    /// `2 * IQR / cbrt(n)`
    Iqr,
    /// `1.06 * stddev / cbrt(n)`, used when the IQR is zero
    StdDev,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bandwidth {
    /// Clamped bandwidth used by the estimator
    pub value: f64,
    pub method: BandwidthMethod,
}

/// Robust bandwidth: IQR-based, falling back to the standard deviation when
/// the IQR is zero, clamped to `[MIN_BANDWIDTH, MAX_BANDWIDTH]`.
pub fn robust_bandwidth(samples: &[f64]) -> Bandwidth {
    let n_cbrt = (samples.len() as f64).cbrt();
    let iqr = Quantiles::from_sorted(&sorted(samples)).iqr();
    let (raw, method) = if iqr > 0.0 {
        ((2.0 * iqr) / n_cbrt, BandwidthMethod::Iqr)
    } else {
        ((stddev(samples) * 1.06) / n_cbrt, BandwidthMethod::StdDev)
    };
    Bandwidth {
        value: raw.clamp(MIN_BANDWIDTH, MAX_BANDWIDTH),
        method,
    }
}

/// Normal-reference bandwidth `1.06 * s * n^(-1/5)` with the sample standard
/// deviation, unclamped. Sensitive to outliers; kept for comparison with
/// [`robust_bandwidth`]. `NaN` for fewer than two samples.
pub fn normal_reference_bandwidth(samples: &[f64]) -> f64 {
    let n = samples.len();
    if n < 2 {
        return f64::NAN;
    }
    let mean = samples.iter().sum::<f64>() / n as f64;
    let variance = samples
        .iter()
        .map(|t| {
            let diff = t - mean;
            diff * diff
        })
        .sum::<f64>()
        / (n - 1) as f64;
    (n as f64).powf(-0.2) * variance.sqrt() * 1.06
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvePoint {
    /// Temperature in °C
    pub x: f64,
    /// Estimated day count density
    pub y: f64,
}

/// Three aligned series splitting a curve at p05 and p95.
///
/// Each series has one entry per grid point; points outside the band carry
/// `None` so a chart leaves a gap there. Boundary points belong to both
/// neighbouring bands.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandedCurve {
    pub left: Vec<(f64, Option<f64>)>,
    pub mid: Vec<(f64, Option<f64>)>,
    pub right: Vec<(f64, Option<f64>)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensityCurve {
    pub points: Vec<CurvePoint>,
    pub bandwidth: Bandwidth,
    pub step: f64,
}

impl DensityCurve {
    /// Riemann area of the curve; the sample count after rescaling.
    pub fn area(&self) -> f64 {
        self.points.iter().map(|p| p.y).sum::<f64>() * self.step
    }

    pub fn y_max(&self) -> f64 {
        self.points.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn partition(&self, p05: f64, p95: f64) -> BandedCurve {
        let band = |keep: &dyn Fn(f64) -> bool| {
            self.points
                .iter()
                .map(|p| (p.x, keep(p.x).then_some(p.y)))
                .collect::<Vec<_>>()
        };
        BandedCurve {
            left: band(&|x: f64| x <= p05),
            mid: band(&|x: f64| x >= p05 && x <= p95),
            right: band(&|x: f64| x >= p95),
        }
    }
}

/// Grid from `floor(min - 0.5)` to `ceil(max + 0.5)`, stepping by accumulation.
fn grid(min: f64, max: f64) -> Vec<f64> {
    let x_min = (min - RANGE_PADDING).floor();
    let x_max = (max + RANGE_PADDING).ceil();
    let mut xs = Vec::with_capacity(((x_max - x_min) / GRID_STEP) as usize + 2);
    let mut x = x_min;
    while x <= x_max + 1e-9 {
        xs.push(x);
        x += GRID_STEP;
    }
    xs
}

/// Estimate the density curve of `samples`. Non-finite values are ignored.
pub fn estimate_density(samples: &[f64]) -> Result<DensityCurve> {
    let finite: Vec<f64> = samples.iter().copied().filter(|t| t.is_finite()).collect();
    if finite.len() < samples.len() {
        log::warn!(
            "ignoring {} non-finite temperatures",
            samples.len() - finite.len()
        );
    }
    let samples = &finite[..];
    let n = samples.len();
    if n == 0 {
        return Err(VroceError::InsufficientData {
            needed: 1,
            found: 0,
        });
    }
    if n < LOW_SAMPLE_COUNT {
        log::warn!("Low data count: only {} valid temperatures", n);
    }

    let bandwidth = robust_bandwidth(samples);
    let h = bandwidth.value;
    let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
    let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let xs = grid(min, max);
    let density: Vec<f64> = xs
        .iter()
        .map(|&x| {
            let s: f64 = samples.iter().map(|t| epanechnikov((x - t) / h)).sum();
            s / (n as f64 * h)
        })
        .collect();

    let area = density.iter().sum::<f64>() * GRID_STEP;
    let scale = if area > 0.0 { n as f64 / area } else { 1.0 };
    let points = xs
        .into_iter()
        .zip(density)
        .map(|(x, d)| CurvePoint { x, y: d * scale })
        .collect();

    Ok(DensityCurve {
        points,
        bandwidth,
        step: GRID_STEP,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const WITH_OUTLIER: [f64; 6] = [18.0, 19.0, 20.0, 21.0, 22.0, 30.0];

    #[test]
    fn test_kernel_support() {
        assert_eq!(epanechnikov(0.0), 0.75);
        assert_eq!(epanechnikov(1.0), 0.0);
        assert_eq!(epanechnikov(-1.5), 0.0);
        assert!((epanechnikov(0.5) - 0.5625).abs() < 1e-12);
    }

    #[test]
    fn test_mass_preserved() {
        for samples in [
            &WITH_OUTLIER[..],
            &[12.3][..],
            &[5.0, 5.0, 5.0, 5.0][..],
            &[-4.2, -1.0, 0.3, 2.2, 2.9, 3.1, 6.4, 8.8, 9.0, 11.5][..],
        ] {
            let curve = estimate_density(samples).unwrap();
            assert!(
                (curve.area() - samples.len() as f64).abs() < 1e-9,
                "area {} for {} samples",
                curve.area(),
                samples.len()
            );
        }
    }

    #[test]
    fn test_grid_bounds() {
        let curve = estimate_density(&WITH_OUTLIER).unwrap();
        let first = curve.points.first().unwrap().x;
        let last = curve.points.last().unwrap().x;
        assert_eq!(first, 17.0);
        assert!((last - 31.0).abs() < 1e-6);
        // 17.0 ..= 31.0 by 0.1
        assert_eq!(curve.points.len(), 141);
    }

    #[test]
    fn test_robust_bandwidth_ignores_outlier() {
        let robust = robust_bandwidth(&WITH_OUTLIER);
        assert_eq!(robust.method, BandwidthMethod::Iqr);
        // 2 * 2.5 / cbrt(6) = 2.75, clamped
        assert_eq!(robust.value, MAX_BANDWIDTH);

        let normal = normal_reference_bandwidth(&WITH_OUTLIER);
        assert!(robust.value < normal, "{} vs {}", robust.value, normal);
        assert!((robust.value - normal).abs() > 0.1);
    }

    #[test]
    fn test_constant_samples_fall_back_to_stddev() {
        let bw = robust_bandwidth(&[5.0, 5.0, 5.0, 5.0]);
        assert_eq!(bw.method, BandwidthMethod::StdDev);
        // stddev is zero, so the lower clamp applies
        assert_eq!(bw.value, MIN_BANDWIDTH);
    }

    #[test]
    fn test_empty_samples() {
        assert!(matches!(
            estimate_density(&[]),
            Err(VroceError::InsufficientData { needed: 1, found: 0 })
        ));
    }

    #[test]
    fn test_non_finite_samples_ignored() {
        for samples in [&[f64::NAN][..], &[f64::INFINITY, f64::NEG_INFINITY][..]] {
            assert!(matches!(
                estimate_density(samples),
                Err(VroceError::InsufficientData { needed: 1, found: 0 })
            ));
        }

        let curve = estimate_density(&[20.0, f64::INFINITY, 21.0, f64::NAN]).unwrap();
        let clean = estimate_density(&[20.0, 21.0]).unwrap();
        assert_eq!(curve, clean);
        assert!((curve.area() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_partition_shares_boundaries() {
        let curve = estimate_density(&[0.0, 1.0, 2.0, 3.0, 4.0]).unwrap();
        let banded = curve.partition(1.0, 3.0);
        assert_eq!(banded.left.len(), curve.points.len());
        assert_eq!(banded.mid.len(), curve.points.len());
        assert_eq!(banded.right.len(), curve.points.len());
        for ((l, m), r) in banded.left.iter().zip(&banded.mid).zip(&banded.right) {
            let x = l.0;
            assert_eq!(l.1.is_some(), x <= 1.0);
            assert_eq!(m.1.is_some(), (1.0..=3.0).contains(&x));
            assert_eq!(r.1.is_some(), x >= 3.0);
            // every grid point is drawn by at least one band
            assert!(l.1.is_some() || m.1.is_some() || r.1.is_some());
        }
    }

    #[test]
    fn test_curve_peaks_near_bulk() {
        let curve = estimate_density(&WITH_OUTLIER).unwrap();
        let peak = curve
            .points
            .iter()
            .max_by(|a, b| a.y.total_cmp(&b.y))
            .unwrap();
        assert!(peak.x > 18.0 && peak.x < 22.5, "peak at {}", peak.x);
        assert!(curve.y_max() > 0.0);
    }
}
