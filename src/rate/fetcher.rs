use async_trait::async_trait;

use crate::rate::errors::UpstreamError;
use crate::rate::types::{RateSample, RateTerm};

/// Source of fresh rate observations.
///
/// Implementations must not retry internally; retry policy belongs to
/// the caller. The engine never depends on which implementation is
/// wired in (authenticated API, scrape, simulation).
#[async_trait]
pub trait RateFetcher: Send + Sync {
    async fn fetch_sample(&self, term: RateTerm) -> Result<RateSample, UpstreamError>;
}
