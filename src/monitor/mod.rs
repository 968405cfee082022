//! Rate monitoring engine.
//!
//! Owns the sampling cadence: market-window gating, upstream fetch,
//! ledger append, threshold transition and alert dispatch. Also exposes
//! the manual surface (cached read, history query, bounds mutation)
//! that an HTTP layer wires to clients.

pub mod window;

use std::sync::Arc;
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use tokio::sync::Mutex;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{error, info, warn};

use crate::alert::band::{BandTracker, CrossingState};
use crate::alert::bounds::{BoundsStore, ConfigError, ThresholdBounds};
use crate::alert::notifier::AlertNotifier;
use crate::ledger::{LedgerError, LedgerRecord, RateLedger};
use crate::logger::warn_if_slow;
use crate::monitor::window::MarketWindow;
use crate::rate::cache::SampleCache;
use crate::rate::errors::UpstreamError;
use crate::rate::fetcher::RateFetcher;
use crate::rate::types::{RateSample, RateTerm};
use crate::time;

/// Rate returned by the manual read path.
#[derive(Clone, Copy, Debug)]
pub struct CurrentRate {
    pub sample: RateSample,
    pub term: RateTerm,
    pub from_cache: bool,
}

/// Single-writer state: ledger appends and crossing transitions always
/// happen together under one lock, so a scheduler tick and a manual
/// append can never interleave their read-modify-write.
struct EngineCore {
    ledger: RateLedger,
    band: BandTracker,
}

pub struct MonitorEngine {
    fetcher: Arc<dyn RateFetcher>,
    notifier: Arc<dyn AlertNotifier>,
    bounds: Arc<BoundsStore>,
    cache: SampleCache,
    window: MarketWindow,
    core: Mutex<EngineCore>,
}

impl MonitorEngine {
    pub fn new(
        fetcher: Arc<dyn RateFetcher>,
        notifier: Arc<dyn AlertNotifier>,
        bounds: Arc<BoundsStore>,
        ledger: RateLedger,
        window: MarketWindow,
        cache_freshness: Duration,
    ) -> Self {
        Self {
            fetcher,
            notifier,
            bounds,
            cache: SampleCache::new(cache_freshness),
            window,
            core: Mutex::new(EngineCore {
                ledger,
                band: BandTracker::new(),
            }),
        }
    }

    /// One evaluation of the autonomous sampling path.
    ///
    /// Gate check, fetch, append, transition, dispatch. Ledger and
    /// delivery failures are logged and swallowed here; only the fetch
    /// failure surfaces, for the loop to report.
    pub async fn tick(&self, now_ms: u64) -> Result<(), UpstreamError> {
        let local = time::market_local(now_ms);

        if !self.window.is_open(local) {
            let mut core = self.core.lock().await;
            if core.band.state() != CrossingState::Inside {
                info!("market closed; crossing state reset");
                core.band.reset();
            }
            return Ok(());
        }

        let term = RateTerm::for_weekday(local.weekday());

        // The fetch completes before the core lock is taken; a slow
        // upstream must not block history reads or manual appends.
        let sample = warn_if_slow(
            "rate_fetch",
            Duration::from_secs(5),
            self.fetcher.fetch_sample(term),
        )
        .await?;

        let mut core = self.core.lock().await;

        if let Err(e) = core.ledger.append(sample.value, sample.observed_at_ms) {
            warn!(error = %e, "ledger persist failed; in-memory history stays authoritative");
        }

        let bounds = self.bounds.bounds();

        // Transition and dispatch are one step under the core lock. The
        // state has committed by dispatch time: a delivery failure is
        // logged, never rolled back, never retried here.
        if let Some(kind) = core.band.observe(sample.value, bounds) {
            info!(
                value = sample.value,
                kind = kind.as_str(),
                min = bounds.min,
                max = bounds.max,
                "band crossed; dispatching alert"
            );

            if let Err(e) = self.notifier.send_alert(sample.value, kind, bounds).await {
                warn!(error = %e, "alert delivery failed");
            }
        }

        Ok(())
    }

    /// Manual read path, served through the read-through cache.
    /// Upstream failure propagates to the caller.
    pub async fn current(&self) -> Result<CurrentRate, UpstreamError> {
        let term = RateTerm::for_weekday(time::market_local(time::now_ms()).weekday());
        let (sample, from_cache) = self.cache.get(self.fetcher.as_ref(), term).await?;

        Ok(CurrentRate {
            sample,
            term,
            from_cache,
        })
    }

    pub fn invalidate_cache(&self) {
        self.cache.invalidate();
    }

    /// Full history, or one market-local calendar day of it.
    pub async fn history(&self, day: Option<NaiveDate>) -> Vec<LedgerRecord> {
        let core = self.core.lock().await;
        match day {
            Some(d) => core.ledger.records_for_day(d),
            None => core.ledger.records().to_vec(),
        }
    }

    /// Direct external append, sharing the core lock with the
    /// scheduler path. Does not touch the crossing state.
    pub async fn record_observation(
        &self,
        value: f64,
        observed_at_ms: u64,
    ) -> Result<(), LedgerError> {
        let mut core = self.core.lock().await;
        core.ledger.append(value, observed_at_ms)
    }

    pub fn bounds(&self) -> ThresholdBounds {
        self.bounds.bounds()
    }

    pub fn set_min(&self, min: f64) -> Result<(), ConfigError> {
        self.bounds.set_min(min)
    }

    pub fn set_max(&self, max: f64) -> Result<(), ConfigError> {
        self.bounds.set_max(max)
    }

    pub fn set_bounds(&self, next: ThresholdBounds) -> Result<(), ConfigError> {
        self.bounds.set_bounds(next)
    }

    pub async fn crossing_state(&self) -> CrossingState {
        self.core.lock().await.band.state()
    }
}

/// Runs the sampling loop on a fixed cadence.
///
/// The first tick completes immediately, so sampling starts at boot. A
/// failed tick is reported and the cadence continues.
pub async fn run_rate_monitor(engine: Arc<MonitorEngine>, period: Duration) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(every_ms = period.as_millis() as u64, "rate monitor started");

    loop {
        ticker.tick().await;

        if let Err(e) = engine.tick(time::now_ms()).await {
            error!(error = %e, "monitor tick failed");
        }
    }
}
