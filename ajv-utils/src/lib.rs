//! Shared utility functions for Ali je vroče crates.

/// Date utility functions
pub mod dates {
    use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, Timelike};

    const MONTHS_SL: [&str; 12] = [
        "januar", "februar", "marec", "april", "maj", "junij", "julij", "avgust", "september",
        "oktober", "november", "december",
    ];

    /// Format a NaiveDate as "YYYY-MM-DD"
    pub fn format_date(date: &NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

    /// Convert Unix milliseconds to local wall-clock time.
    pub fn local_from_millis(millis: i64) -> anyhow::Result<NaiveDateTime> {
        let utc = DateTime::from_timestamp_millis(millis)
            .ok_or_else(|| anyhow::anyhow!("timestamp out of range: {}", millis))?;
        Ok(utc.with_timezone(&Local).naive_local())
    }

    /// "danes ob HH:MM" when `time` is on the same day of month as `updated`,
    /// otherwise "včeraj ob HH:MM".
    ///
    /// Readings cover the last 24 hours, so anything not from today is from
    /// yesterday.
    pub fn format_time(time: &NaiveDateTime, updated: &NaiveDateTime) -> String {
        let day = if time.day() == updated.day() {
            "danes"
        } else {
            "včeraj"
        };
        format!("{} ob {:02}:{:02}", day, time.hour(), time.minute())
    }

    /// Long Slovenian date and time, e.g. "15. julij 2024 ob 16:00".
    pub fn format_long(time: &NaiveDateTime) -> String {
        format!(
            "{}. {} {} ob {:02}:{:02}",
            time.day(),
            MONTHS_SL[time.month0() as usize],
            time.year(),
            time.hour(),
            time.minute()
        )
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use chrono::NaiveDate;

        fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
            NaiveDate::from_ymd_opt(2024, 6, day)
                .unwrap()
                .and_hms_opt(hour, minute, 0)
                .unwrap()
        }

        #[test]
        fn test_format_time() {
            let updated = at(15, 16, 0);
            assert_eq!(format_time(&at(15, 14, 30), &updated), "danes ob 14:30");
            assert_eq!(format_time(&at(14, 4, 5), &updated), "včeraj ob 04:05");
        }

        #[test]
        fn test_format_long() {
            assert_eq!(format_long(&at(15, 16, 0)), "15. junij 2024 ob 16:00");
        }

        #[test]
        fn test_format_date() {
            let date = NaiveDate::from_ymd_opt(2023, 6, 5).unwrap();
            assert_eq!(format_date(&date), "2023-06-05");
        }

        #[test]
        fn test_local_from_millis_out_of_range() {
            assert!(local_from_millis(i64::MAX).is_err());
            assert!(local_from_millis(1_721_052_000_000).is_ok());
        }
    }
}

/// Numeric helpers
pub mod numbers {
    /// Round to a number of decimal places, halves away from zero.
    pub fn round(value: f64, decimals: u32) -> f64 {
        let factor = 10f64.powi(decimals as i32);
        (value * factor).round() / factor
    }

}
