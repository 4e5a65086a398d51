//! SQL schema for the SQLite-backed cache store.
//!
//! Applied as a single batch whenever a store is opened; safe to re-apply
//! to an existing file.

/// Returns the full SQL schema as a single batch string.
///
/// - `cache_entries` - one serialized query per storage key, with the time
///   (Unix milliseconds) it was written
pub fn create_schema() -> &'static str {
    r#"
    CREATE TABLE IF NOT EXISTS cache_entries (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        stored_at INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_cache_stored_at ON cache_entries(stored_at);
    "#
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn schema_is_valid_sql() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(create_schema())
            .expect("Schema SQL should be valid");
    }

    #[test]
    fn schema_can_be_reapplied() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(create_schema()).unwrap();
        conn.execute_batch(create_schema()).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='cache_entries'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1, "Table 'cache_entries' should exist once");
    }

    #[test]
    fn schema_creates_index() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(create_schema()).unwrap();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='index' AND name='idx_cache_stored_at'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }
}
