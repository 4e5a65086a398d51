//! Persisted query results with a wall-clock TTL.

use crate::models::{PersistedQuery, PersistedStamp, QueryKey};
use crate::store::CacheStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::rc::Rc;
use std::time::Duration;

/// Prefix every cache key is stored under.
pub const CACHE_KEY_PREFIX: &str = "ali-je-vroce-cache";

/// Default lifetime of a cached query.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// Source of "now" in Unix milliseconds.
pub type Clock = Rc<dyn Fn() -> i64>;

fn system_clock() -> Clock {
    Rc::new(|| chrono::Utc::now().timestamp_millis())
}

/// Query results stored as JSON under prefixed keys.
///
/// Expired entries are treated as missing and removed on read. Keys outside
/// the prefix are never touched.
pub struct QueryCache<S: CacheStore> {
    store: S,
    prefix: String,
    ttl_ms: i64,
    clock: Clock,
}

impl<S: CacheStore> QueryCache<S> {
    pub fn new(store: S, ttl: Duration) -> Self {
        Self::with_clock(store, ttl, system_clock())
    }

    pub fn with_clock(store: S, ttl: Duration, clock: Clock) -> Self {
        QueryCache {
            store,
            prefix: CACHE_KEY_PREFIX.to_string(),
            ttl_ms: i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX),
            clock,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn is_expired(&self, timestamp: i64) -> bool {
        (self.clock)().saturating_sub(timestamp) > self.ttl_ms
    }

    fn owns(&self, storage_key: &str) -> bool {
        storage_key
            .strip_prefix(&self.prefix)
            .is_some_and(|rest| rest.starts_with('-'))
    }

    pub fn persist_query<T: Serialize>(&self, key: &QueryKey, data: &T) -> anyhow::Result<()> {
        let record = PersistedQuery {
            data,
            timestamp: (self.clock)(),
            query_key: key.clone(),
        };
        let json = serde_json::to_string(&record)?;
        self.store.set_item(&key.storage_key(&self.prefix), &json)?;
        log::debug!("cache: persisted {}", key);
        Ok(())
    }

    /// The cached value for `key`, or `None` when missing, unparsable or
    /// expired.
    pub fn get_persisted_query<T: DeserializeOwned>(
        &self,
        key: &QueryKey,
    ) -> anyhow::Result<Option<T>> {
        let storage_key = key.storage_key(&self.prefix);
        let Some(raw) = self.store.get_item(&storage_key)? else {
            return Ok(None);
        };
        let record: PersistedQuery<T> = match serde_json::from_str(&raw) {
            Ok(record) => record,
            Err(e) => {
                log::warn!("cache: unreadable entry {}: {}", storage_key, e);
                return Ok(None);
            }
        };
        if self.is_expired(record.timestamp) {
            log::debug!("cache: {} expired", key);
            self.store.remove_item(&storage_key)?;
            return Ok(None);
        }
        Ok(Some(record.data))
    }

    pub fn remove_persisted_query(&self, key: &QueryKey) -> anyhow::Result<()> {
        self.store.remove_item(&key.storage_key(&self.prefix))
    }

    /// Remove every entry under the prefix. Returns how many were removed.
    pub fn clear_all_persisted_queries(&self) -> anyhow::Result<usize> {
        let mut removed = 0;
        for key in self.store.keys()? {
            if self.owns(&key) {
                self.store.remove_item(&key)?;
                removed += 1;
            }
        }
        log::info!("cache: cleared {} entries", removed);
        Ok(removed)
    }

    /// Remove expired and unreadable entries under the prefix.
    pub fn cleanup_expired_queries(&self) -> anyhow::Result<usize> {
        let mut removed = 0;
        for key in self.store.keys()? {
            if !self.owns(&key) {
                continue;
            }
            let stale = match self.store.get_item(&key)? {
                Some(raw) => serde_json::from_str::<PersistedStamp>(&raw)
                    .map(|stamp| self.is_expired(stamp.timestamp))
                    .unwrap_or(true),
                None => false,
            };
            if stale {
                self.store.remove_item(&key)?;
                removed += 1;
            }
        }
        if removed > 0 {
            log::info!("cache: cleaned up {} expired entries", removed);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, SqliteStore};
    use std::cell::Cell;

    struct FakeClock(Rc<Cell<i64>>);

    impl FakeClock {
        fn new(start: i64) -> (Self, Clock) {
            let now = Rc::new(Cell::new(start));
            let reader = now.clone();
            (FakeClock(now), Rc::new(move || reader.get()))
        }

        fn advance(&self, ms: i64) {
            self.0.set(self.0.get() + ms);
        }
    }

    fn stations_key() -> QueryKey {
        QueryKey::new(["stations"])
    }

    #[test]
    fn returns_fresh_entries() {
        let (_time, clock) = FakeClock::new(1_000);
        let cache = QueryCache::with_clock(MemoryStore::new(), DEFAULT_TTL, clock);
        cache.persist_query(&stations_key(), &vec!["Ljubljana"]).unwrap();
        let cached: Option<Vec<String>> = cache.get_persisted_query(&stations_key()).unwrap();
        assert_eq!(cached, Some(vec!["Ljubljana".to_string()]));
    }

    #[test]
    fn expired_entries_are_removed_on_read() {
        let (time, clock) = FakeClock::new(1_000);
        let store = MemoryStore::new();
        let cache = QueryCache::with_clock(store.clone(), DEFAULT_TTL, clock);
        cache.persist_query(&stations_key(), &42).unwrap();

        time.advance(60 * 60 * 1000);
        assert_eq!(cache.get_persisted_query::<i32>(&stations_key()).unwrap(), Some(42));

        time.advance(1);
        assert_eq!(cache.get_persisted_query::<i32>(&stations_key()).unwrap(), None);
        assert!(store.keys().unwrap().is_empty());
    }

    #[test]
    fn unparsable_entries_read_as_missing() {
        let store = MemoryStore::new();
        store
            .set_item("ali-je-vroce-cache-stations", "{not json")
            .unwrap();
        let cache = QueryCache::new(store, DEFAULT_TTL);
        assert_eq!(cache.get_persisted_query::<i32>(&stations_key()).unwrap(), None);
    }

    #[test]
    fn clear_only_touches_prefixed_keys() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.set_item("theme", "dark").unwrap();
        store.set_item("ali-je-vroce-cacheless", "x").unwrap();
        let cache = QueryCache::new(store.clone(), DEFAULT_TTL);
        cache.persist_query(&stations_key(), &1).unwrap();
        cache
            .persist_query(&QueryKey::new(["historical", "1495", "07-15", "14"]), &2)
            .unwrap();

        assert_eq!(cache.clear_all_persisted_queries().unwrap(), 2);
        assert_eq!(store.keys().unwrap(), vec!["ali-je-vroce-cacheless", "theme"]);
    }

    #[test]
    fn cleanup_removes_expired_and_garbage() {
        let (time, clock) = FakeClock::new(0);
        let store = MemoryStore::new();
        let cache = QueryCache::with_clock(store.clone(), Duration::from_secs(10), clock);

        cache.persist_query(&QueryKey::new(["old"]), &1).unwrap();
        time.advance(8_000);
        cache.persist_query(&QueryKey::new(["new"]), &2).unwrap();
        store.set_item("ali-je-vroce-cache-broken", "[]").unwrap();
        store.set_item("unrelated", "[]").unwrap();
        time.advance(5_000);

        assert_eq!(cache.cleanup_expired_queries().unwrap(), 2);
        assert_eq!(
            store.keys().unwrap(),
            vec!["ali-je-vroce-cache-new", "unrelated"]
        );
    }

    #[test]
    fn remove_single_query() {
        let cache = QueryCache::new(MemoryStore::new(), DEFAULT_TTL);
        cache.persist_query(&stations_key(), &1).unwrap();
        cache.remove_persisted_query(&stations_key()).unwrap();
        assert_eq!(cache.get_persisted_query::<i32>(&stations_key()).unwrap(), None);
    }
}
