//! Latest-request-wins fetch pipeline.
//!
//! Each request is identified by a key. Submitting a new key aborts the task
//! still working on the previous one, and a result is only committed while
//! its key is still the one most recently requested, so a slow stale
//! response can never overwrite a newer one.

use ajv_core::calendar_window::MonthDay;
use ajv_db::QueryKey;
use ajv_stats::SeasonalRequest;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// What the seasonal charts are currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestKey {
    pub station_id: i64,
    pub center: MonthDay,
    pub window_days: usize,
}

impl RequestKey {
    /// Cache key of the historical window for this request.
    pub fn query_key(&self) -> QueryKey {
        QueryKey::new([
            "historical".to_string(),
            self.station_id.to_string(),
            self.center.to_string(),
            self.window_days.to_string(),
        ])
    }

    pub fn to_request(&self) -> SeasonalRequest {
        SeasonalRequest {
            station_id: self.station_id,
            center: self.center,
            window_days: self.window_days,
        }
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|{}", self.station_id, self.center, self.window_days)
    }
}

/// Key of the last finished request, with its output. `None` output marks a
/// fetch that panicked or was cancelled before producing anything.
type Committed<K, O> = Option<(K, Option<Arc<O>>)>;

/// Commits the outcome of one fetch when dropped, so a task that unwinds
/// still releases anyone waiting on its key.
struct CommitOnDrop<K: Clone + PartialEq + fmt::Display, O> {
    key: K,
    wanted: Arc<Mutex<Option<K>>>,
    committed: Arc<watch::Sender<Committed<K, O>>>,
    output: Option<O>,
}

impl<K: Clone + PartialEq + fmt::Display, O> Drop for CommitOnDrop<K, O> {
    fn drop(&mut self) {
        let is_current = self
            .wanted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            == Some(&self.key);
        if !is_current {
            log::debug!("dropping stale result for {}", self.key);
            return;
        }
        let output = self.output.take().map(Arc::new);
        if output.is_some() {
            log::debug!("committing result for {}", self.key);
        } else {
            log::warn!("request {} finished without a result", self.key);
        }
        self.committed.send_replace(Some((self.key.clone(), output)));
    }
}

/// Runs at most one fetch at a time and keeps the result of the latest key.
pub struct LatestOnly<K, O> {
    wanted: Arc<Mutex<Option<K>>>,
    committed: Arc<watch::Sender<Committed<K, O>>>,
    in_flight: Option<JoinHandle<()>>,
}

impl<K, O> Default for LatestOnly<K, O>
where
    K: Clone + PartialEq + fmt::Display + Send + Sync + 'static,
    O: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, O> LatestOnly<K, O>
where
    K: Clone + PartialEq + fmt::Display + Send + Sync + 'static,
    O: Send + Sync + 'static,
{
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        LatestOnly {
            wanted: Arc::new(Mutex::new(None)),
            committed: Arc::new(tx),
            in_flight: None,
        }
    }

    /// The most recently submitted key.
    pub fn current_key(&self) -> Option<K> {
        self.wanted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Start fetching `key`, abandoning whatever was in flight.
    pub fn submit<F>(&mut self, key: K, fetch: F)
    where
        F: Future<Output = O> + Send + 'static,
    {
        // the new key goes in first so the aborted task sees itself as stale
        *self.wanted.lock().unwrap_or_else(PoisonError::into_inner) = Some(key.clone());
        if let Some(previous) = self.in_flight.take() {
            if !previous.is_finished() {
                log::debug!("aborting in-flight request before {}", key);
                previous.abort();
            }
        }

        let mut guard = CommitOnDrop {
            key,
            wanted: Arc::clone(&self.wanted),
            committed: Arc::clone(&self.committed),
            output: None,
        };
        self.in_flight = Some(tokio::spawn(async move {
            guard.output = Some(fetch.await);
        }));
    }

    /// Wait for the result of the current key. `None` if nothing was
    /// submitted or the fetch panicked.
    pub async fn latest(&self) -> Option<Arc<O>> {
        let wanted = self.current_key()?;
        let mut rx = self.committed.subscribe();
        let value = rx
            .wait_for(|c| matches!(c, Some((k, _)) if *k == wanted))
            .await
            .ok()?;
        value.as_ref().and_then(|(_, output)| output.clone())
    }

    /// Wait for the current key's task and take its result out of the
    /// pipeline. `None` if nothing was submitted or the task did not finish.
    pub async fn into_latest(mut self) -> Option<O> {
        let wanted = self.current_key()?;
        if let Some(task) = self.in_flight.take() {
            if let Err(e) = task.await {
                log::warn!("request {} did not complete: {}", wanted, e);
            }
        }
        match self.committed.send_replace(None) {
            Some((key, Some(output))) if key == wanted => Arc::try_unwrap(output).ok(),
            _ => None,
        }
    }

    /// The committed result, if it belongs to the current key.
    pub fn peek(&self) -> Option<Arc<O>> {
        let wanted = self.current_key()?;
        let committed = self.committed.borrow();
        match committed.as_ref() {
            Some((key, output)) if *key == wanted => output.clone(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::sleep;

    fn key(station_id: i64) -> RequestKey {
        RequestKey {
            station_id,
            center: MonthDay::new(7, 15).unwrap(),
            window_days: 14,
        }
    }

    #[test]
    fn test_request_key_display_and_cache_key() {
        assert_eq!(key(1495).to_string(), "1495|07-15|14");
        assert_eq!(key(1495).query_key().joined(), "historical-1495-07-15-14");
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_stale_request_is_discarded() {
        let mut pipeline: LatestOnly<RequestKey, &'static str> = LatestOnly::new();
        pipeline.submit(key(1495), async {
            sleep(Duration::from_secs(5)).await;
            "ljubljana"
        });
        pipeline.submit(key(1828), async {
            sleep(Duration::from_millis(10)).await;
            "novo mesto"
        });

        let latest = pipeline.latest().await.unwrap();
        assert_eq!(*latest, "novo mesto");

        // long after the stale one would have finished
        sleep(Duration::from_secs(10)).await;
        assert_eq!(pipeline.peek().as_deref(), Some(&"novo mesto"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_completion_is_not_committed() {
        let mut pipeline: LatestOnly<RequestKey, u32> = LatestOnly::new();
        pipeline.submit(key(1), async { 1 });
        assert_eq!(*pipeline.latest().await.unwrap(), 1);

        pipeline.submit(key(2), async {
            sleep(Duration::from_secs(1)).await;
            2
        });
        // the old result belongs to another key
        assert_eq!(pipeline.peek(), None);
        assert_eq!(*pipeline.latest().await.unwrap(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_into_latest_takes_owned_result() {
        let mut pipeline: LatestOnly<RequestKey, Result<Vec<u32>, String>> = LatestOnly::new();
        pipeline.submit(key(1), async {
            sleep(Duration::from_secs(3)).await;
            Err("stale".to_string())
        });
        pipeline.submit(key(2), async { Ok(vec![20, 21]) });
        assert_eq!(pipeline.into_latest().await, Some(Ok(vec![20, 21])));
    }

    #[tokio::test]
    async fn test_panicking_fetch_does_not_hang() {
        let mut pipeline: LatestOnly<RequestKey, u32> = LatestOnly::new();
        pipeline.submit(key(1), async { None::<u32>.expect("fetch blew up") });
        assert_eq!(pipeline.into_latest().await, None);
    }

    #[tokio::test]
    async fn test_waiting_on_panicking_fetch_returns() {
        let mut pipeline: LatestOnly<RequestKey, u32> = LatestOnly::new();
        pipeline.submit(key(1), async { None::<u32>.expect("fetch blew up") });
        let latest = tokio::time::timeout(Duration::from_secs(2), pipeline.latest())
            .await
            .expect("latest() should not wait forever");
        assert_eq!(latest, None);
        assert_eq!(pipeline.peek(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_aborted_fetch_leaves_newer_result() {
        let mut pipeline: LatestOnly<RequestKey, u32> = LatestOnly::new();
        pipeline.submit(key(1), async {
            sleep(Duration::from_secs(60)).await;
            1
        });
        pipeline.submit(key(2), async { 2 });
        assert_eq!(*pipeline.latest().await.unwrap(), 2);
        // the aborted task must not clobber the newer commit
        tokio::task::yield_now().await;
        assert_eq!(pipeline.peek().as_deref(), Some(&2));
    }

    #[tokio::test]
    async fn test_nothing_submitted() {
        let pipeline: LatestOnly<RequestKey, u32> = LatestOnly::default();
        assert!(pipeline.latest().await.is_none());
        assert!(pipeline.current_key().is_none());
    }
}
