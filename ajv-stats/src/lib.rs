//! Seasonal temperature statistics.
//!
//! Pure numeric code: no I/O and no retries. Degenerate input falls back to a
//! documented value (`NaN` percentile, zero trend line) where one exists and
//! is reported as a [`ajv_core::VroceError`] otherwise.

pub mod bucket;
pub mod color;
pub mod kde;
pub mod percentile;
pub mod seasonal;
pub mod trend;

pub use bucket::{classify, Classification};
pub use seasonal::{SeasonalReport, SeasonalRequest};
