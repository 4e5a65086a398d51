//! Station list, fetched from the network first with the cache as fallback.

use crate::cached::{read_cached, write_cached};
use crate::config::Config;
use crate::retry::{retry_with_backoff, RetryPolicy};
use ajv_core::api::VremenarClient;
use ajv_core::station::Station;
use ajv_core::VroceError;
use ajv_db::{CacheStore, QueryCache, QueryKey};
use log::{info, warn};

fn stations_key() -> QueryKey {
    QueryKey::new(["stations"])
}

/// Fetch the station list; on failure fall back to the last cached copy.
pub async fn load_stations<S: CacheStore>(
    client: &VremenarClient,
    cache: &QueryCache<S>,
    policy: &RetryPolicy,
) -> anyhow::Result<Vec<Station>> {
    let key = stations_key();
    let fetched = retry_with_backoff(policy, VroceError::is_retryable, move || {
        client.fetch_stations()
    })
    .await;

    match fetched {
        Ok(stations) => {
            write_cached(cache, &key, &stations);
            Ok(stations)
        }
        Err(e) => match read_cached::<_, Vec<Station>>(cache, &key) {
            Some(cached) => {
                warn!("station list unavailable ({}), using cached copy", e);
                Ok(cached)
            }
            None => Err(e.into()),
        },
    }
}

pub async fn run_stations(config: &Config, json: bool) -> anyhow::Result<()> {
    let client = config.client()?;
    let cache = config.cache()?;
    let stations = load_stations(&client, &cache, &config.retry_policy()).await?;
    info!("{} stations", stations.len());

    if json {
        println!("{}", serde_json::to_string_pretty(&stations)?);
    } else {
        for station in &stations {
            println!("{:>6}  {}", station.station_id, station.display_name());
        }
    }
    Ok(())
}
