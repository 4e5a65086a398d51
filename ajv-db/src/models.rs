//! Cache keys and the stored record shape.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered key parts identifying one cached query, e.g.
/// `["historical", "1495", "07-15", "14"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryKey(pub Vec<String>);

impl QueryKey {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        QueryKey(parts.into_iter().map(Into::into).collect())
    }

    /// Parts joined with `-`.
    pub fn joined(&self) -> String {
        self.0.join("-")
    }

    /// Storage key under `prefix`: `"{prefix}-{joined}"`.
    pub fn storage_key(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, self.joined())
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined())
    }
}

/// A cached query result as written to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedQuery<T> {
    pub data: T,
    /// Unix milliseconds at write time
    pub timestamp: i64,
    pub query_key: QueryKey,
}

/// Only the timestamp, for expiry sweeps that do not know the data type.
#[derive(Debug, Deserialize)]
pub(crate) struct PersistedStamp {
    pub timestamp: i64,
}
