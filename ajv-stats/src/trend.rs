//! Least-squares trend of yearly averages.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendLine {
    pub intercept: f64,
    /// °C per year
    pub slope: f64,
}

impl TrendLine {
    pub fn at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// Slope in °C per hundred years.
    pub fn per_century(&self) -> f64 {
        self.slope * 100.0
    }

    /// Two chart points spanning `x0..x1`.
    pub fn segment(&self, x0: f64, x1: f64) -> [(f64, f64); 2] {
        [(x0, self.at(x0)), (x1, self.at(x1))]
    }
}

/// Ordinary least squares fit of `ys` against `xs`.
///
/// Pairs are taken positionally; extra values in the longer slice are
/// ignored. Empty input gives a zero line. When every `x` is the same the
/// denominator vanishes and the best constant fit (mean of `ys`) is returned.
pub fn linear_regression(xs: &[f64], ys: &[f64]) -> TrendLine {
    let n = xs.len().min(ys.len());
    if n == 0 {
        return TrendLine {
            intercept: 0.0,
            slope: 0.0,
        };
    }

    let (mut sx, mut sy, mut sxy, mut sxx) = (0.0, 0.0, 0.0, 0.0);
    for (&x, &y) in xs.iter().zip(ys) {
        sx += x;
        sy += y;
        sxy += x * y;
        sxx += x * x;
    }
    let nf = n as f64;
    let den = nf * sxx - sx * sx;
    if den == 0.0 {
        return TrendLine {
            intercept: sy / nf,
            slope: 0.0,
        };
    }
    let slope = (nf * sxy - sx * sy) / den;
    TrendLine {
        intercept: (sy - slope * sx) / nf,
        slope,
    }
}
