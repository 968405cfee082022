use async_trait::async_trait;
use chrono::Timelike;

use crate::rate::errors::UpstreamError;
use crate::rate::fetcher::RateFetcher;
use crate::rate::types::{RateSample, RateTerm};
use crate::time;

/// Credential-free stand-in for the quote provider.
///
/// Produces a slow intraday wobble around a base rate so the whole
/// pipeline (ledger, thresholds, notifications) can run locally.
pub struct SimulatedFetcher {
    base: f64,
    amplitude: f64,
}

impl SimulatedFetcher {
    pub fn new(base: f64, amplitude: f64) -> Self {
        Self { base, amplitude }
    }

    fn value_at(&self, ts_ms: u64, term: RateTerm) -> f64 {
        let local = time::market_local(ts_ms);
        let minute_of_day = (local.hour() * 60 + local.minute()) as f64;

        // Lenders charge a premium for parking money over the weekend.
        let term_premium = match term {
            RateTerm::Overnight => 0.0,
            RateTerm::ThreeDay => 0.75,
        };

        self.base + term_premium + self.amplitude * (minute_of_day / 90.0).sin()
    }
}

impl Default for SimulatedFetcher {
    fn default() -> Self {
        Self::new(42.0, 4.0)
    }
}

#[async_trait]
impl RateFetcher for SimulatedFetcher {
    async fn fetch_sample(&self, term: RateTerm) -> Result<RateSample, UpstreamError> {
        let now = time::now_ms();
        Ok(RateSample {
            value: self.value_at(now, term),
            observed_at_ms: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wobble_stays_within_amplitude() {
        let sim = SimulatedFetcher::new(40.0, 3.0);
        for hour in 0..24u64 {
            let v = sim.value_at(hour * 3_600_000, RateTerm::Overnight);
            assert!((37.0..=43.0).contains(&v), "out of band at hour {hour}: {v}");
        }
    }

    #[test]
    fn three_day_term_carries_a_premium() {
        let sim = SimulatedFetcher::default();
        let ts = 1_700_000_000_000;
        assert!(sim.value_at(ts, RateTerm::ThreeDay) > sim.value_at(ts, RateTerm::Overnight));
    }
}
