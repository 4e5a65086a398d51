//! Percentile buckets and the historical breakpoint table.
//!
//! A station's breakpoint table holds six temperatures (p05, p20, p40, p60,
//! p80, p95) for one calendar date. Today's average falls into one of seven
//! buckets, `p00` ("colder than p05") through `p95` ("at or above p95").

use crate::error::{Result, VroceError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of breakpoints in a percentile table.
pub const BREAKPOINT_COUNT: usize = 6;

/// Column names of the breakpoint table, in increasing order.
pub const BREAKPOINT_COLUMNS: [&str; BREAKPOINT_COUNT] = ["p05", "p20", "p40", "p60", "p80", "p95"];

/// One of the seven ordered percentile buckets.
#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Copy, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketLabel {
    P00,
    P05,
    P20,
    P40,
    P60,
    P80,
    P95,
}

impl BucketLabel {
    /// Buckets in increasing temperature order.
    pub const ALL: [BucketLabel; 7] = [
        BucketLabel::P00,
        BucketLabel::P05,
        BucketLabel::P20,
        BucketLabel::P40,
        BucketLabel::P60,
        BucketLabel::P80,
        BucketLabel::P95,
    ];

    /// The bucket starting at breakpoint `index` (0 = p05 ... 5 = p95).
    pub fn from_breakpoint_index(index: usize) -> Option<BucketLabel> {
        Self::ALL.get(index + 1).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BucketLabel::P00 => "p00",
            BucketLabel::P05 => "p05",
            BucketLabel::P20 => "p20",
            BucketLabel::P40 => "p40",
            BucketLabel::P60 => "p60",
            BucketLabel::P80 => "p80",
            BucketLabel::P95 => "p95",
        }
    }

    /// Percentile label shown next to the verdict.
    pub fn percentile_label(&self) -> &'static str {
        match self {
            BucketLabel::P00 => "manj kot 5 %",
            BucketLabel::P05 => "5 %",
            BucketLabel::P20 => "20 %",
            BucketLabel::P40 => "40 %",
            BucketLabel::P60 => "60 %",
            BucketLabel::P80 => "80 %",
            BucketLabel::P95 => "95 %",
        }
    }

    /// Short answer to "is it hot today?".
    pub fn verdict(&self) -> &'static str {
        match self {
            BucketLabel::P00 => "Niti pod razno",
            BucketLabel::P05 => "Ne!",
            BucketLabel::P20 => "Ne.",
            BucketLabel::P40 => "Niti ne.",
            BucketLabel::P60 => "Ja.",
            BucketLabel::P80 => "Ja!",
            BucketLabel::P95 => "Ja, absolutno!",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            BucketLabel::P00 => "Se hecaš?! Ful je mraz!",
            BucketLabel::P05 => "Pravzaprav je res mrzlo.",
            BucketLabel::P20 => "Dejansko je kar hladno.",
            BucketLabel::P40 => "Precej povprečno.",
            BucketLabel::P60 => "Je topleje kot običajno.",
            BucketLabel::P80 => "Res je vroče!",
            BucketLabel::P95 => "Peklensko vroče je!",
        }
    }
}

impl fmt::Display for BucketLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BucketLabel {
    type Err = VroceError;

    fn from_str(s: &str) -> Result<Self> {
        BucketLabel::ALL
            .into_iter()
            .find(|label| label.as_str() == s)
            .ok_or_else(|| VroceError::InvalidFormat(format!("unknown percentile bucket {:?}", s)))
    }
}

/// Historical percentile breakpoints for one station and calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentileBreakpoints {
    pub p05: f64,
    pub p20: f64,
    pub p40: f64,
    pub p60: f64,
    pub p80: f64,
    pub p95: f64,
}

impl PercentileBreakpoints {
    /// Build from six values ordered p05..p95.
    pub fn from_slice(values: &[f64]) -> Result<Self> {
        match values {
            [p05, p20, p40, p60, p80, p95] => Ok(PercentileBreakpoints {
                p05: *p05,
                p20: *p20,
                p40: *p40,
                p60: *p60,
                p80: *p80,
                p95: *p95,
            }),
            [] => Err(VroceError::DataUnavailable("Percentiles not found".to_string())),
            other => Err(VroceError::DataUnavailable(format!(
                "expected {} percentile breakpoints, found {}",
                BREAKPOINT_COUNT,
                other.len()
            ))),
        }
    }

    pub fn as_array(&self) -> [f64; BREAKPOINT_COUNT] {
        [self.p05, self.p20, self.p40, self.p60, self.p80, self.p95]
    }

    /// Parse a Datasette table response restricted to the p05..p95 columns.
    ///
    /// Datasette prepends the `rowid` column to every row; it is dropped.
    /// Columns are matched by name, so their order in the payload does not matter.
    pub fn from_datasette_json(body: &str) -> Result<Self> {
        let json: serde_json::Value = serde_json::from_str(body)?;
        let columns = json
            .get("columns")
            .and_then(|c| c.as_array())
            .ok_or_else(|| VroceError::InvalidFormat("missing columns".to_string()))?;
        let row = json
            .get("rows")
            .and_then(|r| r.as_array())
            .and_then(|rows| rows.first())
            .and_then(|row| row.as_array())
            .ok_or_else(|| VroceError::DataUnavailable("Percentiles not found".to_string()))?;

        let mut values = Vec::with_capacity(BREAKPOINT_COUNT);
        for name in BREAKPOINT_COLUMNS {
            let idx = columns
                .iter()
                .position(|c| c.as_str() == Some(name))
                .ok_or_else(|| VroceError::InvalidFormat(format!("missing column {}", name)))?;
            let value = row
                .get(idx)
                .and_then(|v| v.as_f64())
                .ok_or_else(|| VroceError::DataUnavailable(format!("no value for {}", name)))?;
            values.push(value);
        }
        Self::from_slice(&values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // https://stage-data.podnebnik.org/temperature/temperature~2Eslovenia_historical~2Edaily~2Eaverage_percentiles.json?date__exact=2024-07-15&station_id__exact=1495&_col=p05&_col=p20&_col=p40&_col=p60&_col=p80&_col=p95
    const PERCENTILES_JSON: &str = r#"{
        "database": "temperature",
        "table": "temperature.slovenia_historical.daily.average_percentiles",
        "columns": ["rowid", "p05", "p20", "p40", "p60", "p80", "p95"],
        "rows": [[182, 17.9, 19.6, 20.8, 21.9, 23.1, 24.7]]
    }"#;

    #[test]
    fn test_parse_datasette_percentiles() {
        let bp = PercentileBreakpoints::from_datasette_json(PERCENTILES_JSON).unwrap();
        assert_eq!(bp.as_array(), [17.9, 19.6, 20.8, 21.9, 23.1, 24.7]);
    }

    #[test]
    fn test_parse_datasette_no_rows() {
        let body = r#"{"columns": ["rowid", "p05", "p20", "p40", "p60", "p80", "p95"], "rows": []}"#;
        assert!(matches!(
            PercentileBreakpoints::from_datasette_json(body),
            Err(VroceError::DataUnavailable(_))
        ));
    }

    #[test]
    fn test_from_slice_wrong_length() {
        assert!(matches!(
            PercentileBreakpoints::from_slice(&[]),
            Err(VroceError::DataUnavailable(_))
        ));
        assert!(PercentileBreakpoints::from_slice(&[1.0, 2.0, 3.0]).is_err());
    }

    #[test]
    fn test_bucket_order_and_names() {
        assert!(BucketLabel::P00 < BucketLabel::P05);
        assert!(BucketLabel::P80 < BucketLabel::P95);
        assert_eq!(BucketLabel::from_breakpoint_index(0), Some(BucketLabel::P05));
        assert_eq!(BucketLabel::from_breakpoint_index(5), Some(BucketLabel::P95));
        assert_eq!(BucketLabel::from_breakpoint_index(6), None);
        assert_eq!("p60".parse::<BucketLabel>().unwrap(), BucketLabel::P60);
        assert_eq!(serde_json::to_string(&BucketLabel::P95).unwrap(), "\"p95\"");
        assert_eq!(BucketLabel::P95.verdict(), "Ja, absolutno!");
    }
}
