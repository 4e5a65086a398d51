//! Core types and data-service client for the "Ali je vroče?" toolkit.
//!
//! - `calendar_window`: "MM-DD" windows around a target date
//! - `percentile_bucket`: bucket labels and historical breakpoint tables
//! - `sample`: historical daily samples and their payload formats
//! - `station`: station list and live 24-hour readings
//! - `api` (feature `api`): HTTP client for the upstream services

pub mod calendar_window;
pub mod error;
pub mod percentile_bucket;
pub mod sample;
pub mod station;

#[cfg(feature = "api")]
pub mod api;

pub use error::{Result, VroceError};
