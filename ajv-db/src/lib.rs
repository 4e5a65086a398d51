//! Query cache for the "Ali je vroče?" command-line tools.
//!
//! Fetched payloads (station lists, historical windows) are stored as JSON
//! records under keys of the form `ali-je-vroce-cache-{part}-{part}...`
//! together with the time they were written, and read back only while
//! younger than a TTL (one hour by default).
//!
//! # Architecture
//!
//! - [`CacheStore`]: string key-value storage with `get/set/remove/keys`
//! - [`MemoryStore`]: in-process map
//! - [`SqliteStore`]: `Rc<RefCell<Connection>>` over `rusqlite`, in memory or
//!   in a file so the cache survives between runs
//! - [`QueryCache`]: the typed, expiring layer on top of a store
//!
//! # Usage
//!
//! ```rust
//! use ajv_db::{MemoryStore, QueryCache, QueryKey, DEFAULT_TTL};
//!
//! let cache = QueryCache::new(MemoryStore::new(), DEFAULT_TTL);
//! let key = QueryKey::new(["stations"]);
//! cache.persist_query(&key, &vec![1495]).unwrap();
//! let stations: Option<Vec<i64>> = cache.get_persisted_query(&key).unwrap();
//! assert_eq!(stations, Some(vec![1495]));
//! ```
//!
//! # Tables
//!
//! See [`schema::create_schema`] for the SQL schema.

pub mod cache;
pub mod models;
pub mod schema;
pub mod store;

pub use cache::{Clock, QueryCache, CACHE_KEY_PREFIX, DEFAULT_TTL};
pub use models::{PersistedQuery, QueryKey};
pub use store::{CacheStore, MemoryStore, SqliteStore};
