//! # Snapshot Cache
//!
//! A single-slot, time-boxed cache owned by a front-end (REST API, dashboard).
//! The fetch/build core never touches it and stays stateless.
//!
//! The slot lock is held for the whole refresh, so concurrent callers that
//! arrive while a snapshot is being rebuilt wait for that one upstream call
//! instead of firing their own. Time comes from `tokio::time::Instant`, which
//! lets tests freeze and advance the clock.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

/// The entry kept in the slot: the shared value and when it was stored.
struct CachedEntry<T> {
    stored_at: Instant,
    value: Arc<T>,
}

impl<T> CachedEntry<T> {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() <= ttl
    }
}

/// # Snapshot Cache
///
/// Holds at most one value of type `T` for up to `ttl`.
pub struct SnapshotCache<T> {
    ttl: Duration,
    slot: Mutex<Option<CachedEntry<T>>>,
}

impl<T> SnapshotCache<T> {
    /// Creates an empty cache whose entries stay fresh for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// The configured time-to-live.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// # Get or Refresh
    ///
    /// Returns the cached value while it is at most `ttl` old. Otherwise awaits
    /// `refresh` exactly once, stores its output and returns it.
    ///
    /// A failed refresh returns the error and leaves the slot as it was, so a
    /// stale entry is neither served nor discarded.
    pub async fn get_or_try_refresh<F, Fut, E>(&self, refresh: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut slot = self.slot.lock().await;

        if let Some(entry) = slot.as_ref() {
            if entry.is_fresh(self.ttl) {
                return Ok(Arc::clone(&entry.value));
            }
        }

        let value = Arc::new(refresh().await?);
        *slot = Some(CachedEntry {
            stored_at: Instant::now(),
            value: Arc::clone(&value),
        });
        Ok(value)
    }

    /// Returns the cached value only if it is still fresh.
    pub async fn peek(&self) -> Option<Arc<T>> {
        let slot = self.slot.lock().await;
        slot.as_ref()
            .filter(|entry| entry.is_fresh(self.ttl))
            .map(|entry| Arc::clone(&entry.value))
    }

    /// Age of the stored entry, fresh or not.
    pub async fn age(&self) -> Option<Duration> {
        let slot = self.slot.lock().await;
        slot.as_ref().map(|entry| entry.stored_at.elapsed())
    }

    /// Drops the stored entry; the next `get_or_try_refresh` goes upstream.
    pub async fn invalidate(&self) {
        let mut slot = self.slot.lock().await;
        *slot = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn counted(counter: &AtomicUsize) -> Result<usize, String> {
        Ok(counter.fetch_add(1, Ordering::SeqCst) + 1)
    }

    #[tokio::test(start_paused = true)]
    async fn test_reuses_value_within_ttl() {
        let cache = SnapshotCache::new(Duration::from_secs(300));
        let calls = AtomicUsize::new(0);

        let first = cache.get_or_try_refresh(|| counted(&calls)).await.unwrap();
        tokio::time::advance(Duration::from_secs(299)).await;
        let second = cache.get_or_try_refresh(|| counted(&calls)).await.unwrap();

        assert_eq!(*first, 1);
        assert_eq!(*second, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refreshes_after_ttl() {
        let cache = SnapshotCache::new(Duration::from_secs(300));
        let calls = AtomicUsize::new(0);

        cache.get_or_try_refresh(|| counted(&calls)).await.unwrap();
        tokio::time::advance(Duration::from_secs(301)).await;
        assert!(cache.peek().await.is_none());

        let refreshed = cache.get_or_try_refresh(|| counted(&calls)).await.unwrap();
        assert_eq!(*refreshed, 2);
        assert!(cache.peek().await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_refresh_keeps_previous_entry() {
        let cache = SnapshotCache::new(Duration::from_secs(10));
        cache
            .get_or_try_refresh(|| async { Ok::<_, String>(7) })
            .await
            .unwrap();
        tokio::time::advance(Duration::from_secs(11)).await;

        let err = cache
            .get_or_try_refresh(|| async { Err::<i32, _>("upstream down".to_string()) })
            .await
            .unwrap_err();
        assert_eq!(err, "upstream down");
        assert!(cache.age().await.unwrap() >= Duration::from_secs(11));
    }

    #[tokio::test]
    async fn test_invalidate_forces_refresh() {
        let cache = SnapshotCache::new(Duration::from_secs(300));
        let calls = AtomicUsize::new(0);

        cache.get_or_try_refresh(|| counted(&calls)).await.unwrap();
        cache.invalidate().await;
        assert!(cache.age().await.is_none());

        let value = cache.get_or_try_refresh(|| counted(&calls)).await.unwrap();
        assert_eq!(*value, 2);
        assert_eq!(cache.ttl(), Duration::from_secs(300));
    }
}
