//! Calendar windows of "MM-DD" days centered on a target date.
//!
//! Windows are laid out against a fixed non-leap reference year, so the shape
//! of a window never depends on whether the query year has a Feb 29. Matching
//! against real multi-year records happens later on the "MM-DD" tail of each
//! record's date.

use crate::error::{Result, VroceError};
use chrono::{Datelike, NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::mem::replace;
use std::str::FromStr;

/// Non-leap year used to lay out windows.
pub const REFERENCE_YEAR: i32 = 2001;

/// Largest accepted window size in days.
pub const MAX_WINDOW_DAYS: usize = 365;

/// Window size the seasonal charts request.
///
/// Even on purpose: with the floored half-width this yields 15 days (±7).
pub const DEFAULT_WINDOW_DAYS: usize = 14;

/// A date range iterator that yields each date from the start date
/// through the end date (inclusive).
#[derive(Clone, Eq, PartialEq, Copy, Debug)]
pub struct DateRange(pub NaiveDate, pub NaiveDate);

impl Iterator for DateRange {
    type Item = NaiveDate;
    fn next(&mut self) -> Option<Self::Item> {
        if self.0 <= self.1 {
            let next = self.0 + TimeDelta::days(1);
            Some(replace(&mut self.0, next))
        } else {
            None
        }
    }
}

/// A month and day without a year, written "MM-DD".
///
/// Always a day of the non-leap reference year; build one with
/// [`MonthDay::new`], [`MonthDay::from_date`] or by parsing.
#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Copy, Clone, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct MonthDay {
    month: u32,
    day: u32,
}

impl MonthDay {
    /// Build from month and day, requiring the day to exist in the reference year.
    pub fn new(month: u32, day: u32) -> Result<Self> {
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return Err(VroceError::InvalidDateFormat(format!("{:02}-{:02}", month, day)));
        }
        let candidate = MonthDay { month, day };
        if NaiveDate::from_ymd_opt(REFERENCE_YEAR, month, day).is_none() {
            return Err(VroceError::InvalidDateFormat(candidate.to_string()));
        }
        Ok(candidate)
    }

    /// Month and day of a calendar date. Feb 29 maps onto Feb 28.
    pub fn from_date(date: &NaiveDate) -> Self {
        match (date.month(), date.day()) {
            (2, 29) => MonthDay { month: 2, day: 28 },
            (month, day) => MonthDay { month, day },
        }
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    /// This month-day in the reference year.
    pub fn reference_date(&self) -> NaiveDate {
        // every constructor checks the day exists in the reference year
        NaiveDate::from_ymd_opt(REFERENCE_YEAR, self.month, self.day)
            .unwrap_or(NaiveDate::MIN)
    }
}

impl fmt::Display for MonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

impl FromStr for MonthDay {
    type Err = VroceError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || VroceError::InvalidDateFormat(s.to_string());
        let (month, day) = s.split_once('-').ok_or_else(invalid)?;
        let two_digits = |part: &str| part.len() == 2 && part.bytes().all(|b| b.is_ascii_digit());
        if !two_digits(month) || !two_digits(day) {
            return Err(invalid());
        }
        let month: u32 = month.parse().map_err(|_| invalid())?;
        let day: u32 = day.parse().map_err(|_| invalid())?;
        MonthDay::new(month, day).map_err(|_| invalid())
    }
}

impl From<MonthDay> for String {
    fn from(value: MonthDay) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for MonthDay {
    type Error = VroceError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// An ordered run of month-days centered on `center`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarWindow {
    pub center: MonthDay,
    pub days: Vec<MonthDay>,
}

impl CalendarWindow {
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Days formatted as "MM-DD".
    pub fn labels(&self) -> Vec<String> {
        self.days.iter().map(MonthDay::to_string).collect()
    }

    /// Whether a "YYYY-MM-DD" (or any "...MM-DD") date falls inside the window.
    pub fn contains_date(&self, date: &str) -> bool {
        let Some(tail) = date.trim().get(date.trim().len().saturating_sub(5)..) else {
            return false;
        };
        self.days.iter().any(|d| d.to_string() == tail)
    }

    /// Offset in days of `day` relative to the center, if it is in the window.
    pub fn offset_of(&self, day: &MonthDay) -> Option<i32> {
        let half = (self.days.len() / 2) as i32;
        self.days
            .iter()
            .position(|d| d == day)
            .map(|idx| idx as i32 - half)
    }
}

/// Build the window of "MM-DD" days around `center_mmdd`.
///
/// The half-width is `window_days / 2` (floored) on both sides, so an odd
/// size yields exactly `window_days` days and an even size yields one more.
pub fn build_window(center_mmdd: &str, window_days: usize) -> Result<CalendarWindow> {
    if window_days == 0 || window_days > MAX_WINDOW_DAYS {
        return Err(VroceError::InvalidWindow(window_days));
    }
    let center: MonthDay = center_mmdd.parse()?;
    let reference = center.reference_date();
    let half = TimeDelta::days((window_days / 2) as i64);
    let days = DateRange(reference - half, reference + half)
        .map(|date| MonthDay::from_date(&date))
        .collect();
    Ok(CalendarWindow { center, days })
}
