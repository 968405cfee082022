use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::rate::errors::UpstreamError;
use crate::rate::fetcher::RateFetcher;
use crate::rate::types::{RateSample, RateTerm};
use crate::time;

/// Default freshness window for manual reads.
pub const FRESHNESS_WINDOW: Duration = Duration::from_secs(2 * 60);

#[derive(Clone, Copy, Debug)]
struct CacheEntry {
    sample: RateSample,
    fetched_at_ms: u64,
}

/// Read-through cache over the upstream fetcher.
///
/// Guarantees:
/// - A hit never touches the upstream; a miss issues exactly one fetch
///   from this call (concurrent misses may each fetch — accepted, no
///   single-flight coalescing).
/// - `fetched_at_ms` is monotonically non-decreasing across replacements.
/// - A failed fetch leaves the cached entry untouched.
///
/// The cell lock is only held for the check and the store, never across
/// the awaited upstream call.
pub struct SampleCache {
    entry: Mutex<Option<CacheEntry>>,
    freshness: Duration,
}

impl SampleCache {
    pub fn new(freshness: Duration) -> Self {
        Self {
            entry: Mutex::new(None),
            freshness,
        }
    }

    /// Drops the cached sample unconditionally.
    pub fn invalidate(&self) {
        let had = self.entry.lock().take().is_some();
        info!(had_entry = had, "sample cache invalidated");
    }

    /// Returns the cached sample while fresh, otherwise fetches,
    /// stores and returns a new one. The boolean reports whether the
    /// sample came from cache.
    pub async fn get(
        &self,
        fetcher: &dyn RateFetcher,
        term: RateTerm,
    ) -> Result<(RateSample, bool), UpstreamError> {
        let now = time::now_ms();

        if let Some(entry) = *self.entry.lock()
            && now.saturating_sub(entry.fetched_at_ms) < self.freshness.as_millis() as u64
        {
            debug!(age_ms = now - entry.fetched_at_ms, "serving cached sample");
            return Ok((entry.sample, true));
        }

        let sample = fetcher.fetch_sample(term).await?;

        let mut guard = self.entry.lock();
        let fetched_at_ms = match *guard {
            // A concurrent miss may have stored a later fetch already.
            Some(prev) => prev.fetched_at_ms.max(time::now_ms()),
            None => time::now_ms(),
        };
        *guard = Some(CacheEntry {
            sample,
            fetched_at_ms,
        });

        Ok((sample, false))
    }
}

impl Default for SampleCache {
    fn default() -> Self {
        Self::new(FRESHNESS_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingFetcher {
        calls: AtomicUsize,
        value: f64,
        fail: bool,
    }

    impl CountingFetcher {
        fn returning(value: f64) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                value,
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                value: 0.0,
                fail: true,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RateFetcher for CountingFetcher {
        async fn fetch_sample(&self, _term: RateTerm) -> Result<RateSample, UpstreamError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(UpstreamError::MissingTerm("T0"));
            }
            Ok(RateSample {
                value: self.value,
                observed_at_ms: time::now_ms(),
            })
        }
    }

    #[tokio::test]
    async fn second_read_within_window_hits_cache() {
        let fetcher = CountingFetcher::returning(41.5);
        let cache = SampleCache::new(Duration::from_secs(120));

        let (first, cached) = cache.get(&fetcher, RateTerm::Overnight).await.unwrap();
        assert!(!cached);
        assert_eq!(first.value, 41.5);

        let (second, cached) = cache.get(&fetcher, RateTerm::Overnight).await.unwrap();
        assert!(cached);
        assert_eq!(second.value, 41.5);

        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn elapsed_window_goes_back_upstream() {
        let fetcher = CountingFetcher::returning(41.5);
        // Zero freshness: every read is a miss.
        let cache = SampleCache::new(Duration::ZERO);

        cache.get(&fetcher, RateTerm::Overnight).await.unwrap();
        cache.get(&fetcher, RateTerm::Overnight).await.unwrap();

        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let fetcher = CountingFetcher::returning(41.5);
        let cache = SampleCache::new(Duration::from_secs(120));

        cache.get(&fetcher, RateTerm::Overnight).await.unwrap();
        cache.invalidate();
        cache.get(&fetcher, RateTerm::Overnight).await.unwrap();

        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn failed_fetch_keeps_prior_entry() {
        let good = CountingFetcher::returning(41.5);
        let bad = CountingFetcher::failing();
        let cache = SampleCache::new(Duration::ZERO);

        cache.get(&good, RateTerm::Overnight).await.unwrap();
        assert!(cache.get(&bad, RateTerm::Overnight).await.is_err());

        // The stale entry is still there for the next freshness check.
        let entry = (*cache.entry.lock()).unwrap();
        assert_eq!(entry.sample.value, 41.5);
    }
}
