//! Global command-line options shared by every subcommand.

use crate::retry::RetryPolicy;
use ajv_core::api::{VremenarClient, DATA_BASE_URL, VREMENAR_API_URL, WINDOW_BASE_URL};
use ajv_db::{QueryCache, SqliteStore};
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Args, Debug, Clone)]
pub struct Config {
    /// Datasette instance with the station and percentile tables
    #[arg(long, global = true, default_value = DATA_BASE_URL)]
    pub data_url: String,

    /// Vremenar API for live station readings
    #[arg(long, global = true, default_value = VREMENAR_API_URL)]
    pub vremenar_url: String,

    /// Origin of the historical-window endpoint
    #[arg(long, global = true, default_value = WINDOW_BASE_URL)]
    pub window_url: String,

    /// SQLite file for cached responses (in memory when omitted)
    #[arg(long, global = true)]
    pub cache_db: Option<PathBuf>,

    /// How long cached responses stay valid
    #[arg(long, global = true, default_value_t = 3600)]
    pub cache_ttl_secs: u64,

    /// Per-request timeout
    #[arg(long, global = true, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Retries after the first failed request
    #[arg(long, global = true, default_value_t = 3)]
    pub max_retries: u32,

    #[arg(long, global = true, default_value_t = 1000)]
    pub initial_delay_ms: u64,

    #[arg(long, global = true, default_value_t = 10_000)]
    pub max_delay_ms: u64,
}

impl Config {
    pub fn client(&self) -> anyhow::Result<VremenarClient> {
        Ok(VremenarClient::with_urls(
            Duration::from_secs(self.timeout_secs),
            &self.data_url,
            &self.vremenar_url,
            &self.window_url,
        )?)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
        }
    }

    /// Open the response cache and drop whatever has expired in it.
    pub fn cache(&self) -> anyhow::Result<QueryCache<SqliteStore>> {
        let store = match &self.cache_db {
            Some(path) => SqliteStore::open(path)?,
            None => SqliteStore::open_in_memory()?,
        };
        let cache = QueryCache::new(store, Duration::from_secs(self.cache_ttl_secs));
        if let Err(e) = cache.cleanup_expired_queries() {
            log::warn!("cache cleanup failed: {:#}", e);
        }
        Ok(cache)
    }
}
