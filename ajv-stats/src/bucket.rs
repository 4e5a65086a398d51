//! Classify today's average against a station's historical breakpoints.

use ajv_core::percentile_bucket::{BucketLabel, PercentileBreakpoints, BREAKPOINT_COUNT};
use ajv_core::{Result, VroceError};
use serde::Serialize;

/// The bucket today falls in and the breakpoint that opened it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Classification {
    pub bucket: BucketLabel,
    pub threshold: f64,
}

/// Place `average` among six increasing breakpoints (p05..p95).
///
/// Buckets are half-open `[breakpoint, next)`: a value equal to a breakpoint
/// belongs to the bucket starting there. Below the first breakpoint is `p00`
/// (threshold = first breakpoint); at or above the last is `p95`.
pub fn classify(average: f64, breakpoints: &[f64]) -> Result<Classification> {
    if breakpoints.len() != BREAKPOINT_COUNT {
        return Err(VroceError::DataUnavailable(format!(
            "expected {} percentile breakpoints, found {}",
            BREAKPOINT_COUNT,
            breakpoints.len()
        )));
    }
    if !average.is_finite() {
        return Err(VroceError::DataUnavailable(
            "no current average temperature".to_string(),
        ));
    }

    if average < breakpoints[0] {
        return Ok(Classification {
            bucket: BucketLabel::P00,
            threshold: breakpoints[0],
        });
    }
    for (i, pair) in breakpoints.windows(2).enumerate() {
        if average >= pair[0] && average < pair[1] {
            if let Some(bucket) = BucketLabel::from_breakpoint_index(i) {
                return Ok(Classification {
                    bucket,
                    threshold: pair[0],
                });
            }
        }
    }
    Ok(Classification {
        bucket: BucketLabel::P95,
        threshold: breakpoints[BREAKPOINT_COUNT - 1],
    })
}

/// [`classify`] against a parsed breakpoint table.
pub fn classify_breakpoints(
    average: f64,
    breakpoints: &PercentileBreakpoints,
) -> Result<Classification> {
    classify(average, &breakpoints.as_array())
}
