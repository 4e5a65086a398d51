//! Best-effort cache access for the commands.
//!
//! A broken cache never fails a command: read errors count as misses and
//! write errors only lose the cached copy.

use ajv_db::{CacheStore, QueryCache, QueryKey};
use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub(crate) fn read_cached<S, T>(cache: &QueryCache<S>, key: &QueryKey) -> Option<T>
where
    S: CacheStore,
    T: DeserializeOwned,
{
    match cache.get_persisted_query(key) {
        Ok(value) => value,
        Err(e) => {
            warn!("cache read for {} failed: {:#}", key, e);
            None
        }
    }
}

pub(crate) fn write_cached<S, T>(cache: &QueryCache<S>, key: &QueryKey, data: &T)
where
    S: CacheStore,
    T: Serialize,
{
    if let Err(e) = cache.persist_query(key, data) {
        warn!("cache write for {} failed: {:#}", key, e);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use ajv_db::{MemoryStore, DEFAULT_TTL};

    /// A store whose every operation fails.
    pub(crate) struct BrokenStore;

    impl CacheStore for BrokenStore {
        fn get_item(&self, _key: &str) -> anyhow::Result<Option<String>> {
            anyhow::bail!("disk I/O error")
        }
        fn set_item(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
            anyhow::bail!("disk I/O error")
        }
        fn remove_item(&self, _key: &str) -> anyhow::Result<()> {
            anyhow::bail!("disk I/O error")
        }
        fn keys(&self) -> anyhow::Result<Vec<String>> {
            anyhow::bail!("disk I/O error")
        }
    }

    #[test]
    fn test_broken_store_reads_as_miss() {
        let cache = QueryCache::new(BrokenStore, DEFAULT_TTL);
        let key = QueryKey::new(["stations"]);
        write_cached(&cache, &key, &vec![1495]);
        assert_eq!(read_cached::<_, Vec<i64>>(&cache, &key), None);
    }

    #[test]
    fn test_working_store_round_trips() {
        let cache = QueryCache::new(MemoryStore::new(), DEFAULT_TTL);
        let key = QueryKey::new(["stations"]);
        write_cached(&cache, &key, &vec![1495, 1828]);
        assert_eq!(read_cached(&cache, &key), Some(vec![1495i64, 1828]));
    }
}
