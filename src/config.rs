use std::path::PathBuf;
use std::time::Duration;

use crate::monitor::window::MarketWindow;

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Cadence of the autonomous sampling loop.
    ///
    /// Each tick re-evaluates the market window, fetches a fresh rate,
    /// appends it to the ledger and runs the threshold transition. The
    /// first tick fires immediately at startup.
    pub monitor_period: Duration,

    /// Maximum age of a cached sample before a manual read goes back
    /// to the upstream source.
    pub cache_freshness: Duration,

    /// Upper bound on a single upstream request.
    ///
    /// The quote provider authenticates per request and can be slow;
    /// without this bound a hung fetch would stall the tick it belongs
    /// to for good.
    pub fetch_timeout: Duration,

    /// Backing file for the observed-rate ledger.
    pub ledger_path: PathBuf,

    /// Backing file for the alert threshold bounds.
    pub bounds_path: PathBuf,

    /// Trading window during which autonomous sampling runs.
    ///
    /// Outside this window the crossing state is reset so the next
    /// session opens clean. Boundary minutes are inclusive.
    pub market_window: MarketWindow,

    /// Base URL of the InvertirOnline quotations API.
    pub iol_base_url: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let monitor_period = env_secs("MONITOR_PERIOD_SECS", 300);
        let cache_freshness = env_secs("CACHE_FRESHNESS_SECS", 120);
        let fetch_timeout = env_secs("FETCH_TIMEOUT_SECS", 10);

        let ledger_path = std::env::var("LEDGER_PATH")
            .unwrap_or_else(|_| "data/rate_history.json".to_string())
            .into();
        let bounds_path = std::env::var("BOUNDS_PATH")
            .unwrap_or_else(|_| "data/alert_bounds.json".to_string())
            .into();

        let iol_base_url = std::env::var("IOL_BASE_URL")
            .unwrap_or_else(|_| "https://api.invertironline.com".to_string());

        Self {
            monitor_period,
            cache_freshness,
            fetch_timeout,
            ledger_path,
            bounds_path,
            market_window: market_window_from_env(),
            iol_base_url,
        }
    }
}

fn env_secs(key: &str, default: u64) -> Duration {
    let secs = std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default);
    Duration::from_secs(secs)
}

/// Window policy is a deployment choice; the default is the business-day
/// schedule of the Buenos Aires caucion market.
fn market_window_from_env() -> MarketWindow {
    let open = std::env::var("MARKET_OPEN")
        .ok()
        .and_then(|v| parse_hhmm(&v))
        .unwrap_or((10, 30));
    let close = std::env::var("MARKET_CLOSE")
        .ok()
        .and_then(|v| parse_hhmm(&v))
        .unwrap_or((17, 0));
    let weekdays_only = std::env::var("MARKET_WEEKDAYS_ONLY")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(true);

    MarketWindow::new(open.0, open.1, close.0, close.1, weekdays_only)
}

fn parse_hhmm(v: &str) -> Option<(u32, u32)> {
    let (h, m) = v.split_once(':')?;
    let h: u32 = h.parse().ok()?;
    let m: u32 = m.parse().ok()?;
    (h < 24 && m < 60).then_some((h, m))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hhmm_parsing_rejects_garbage() {
        assert_eq!(parse_hhmm("10:30"), Some((10, 30)));
        assert_eq!(parse_hhmm("17:00"), Some((17, 0)));
        assert_eq!(parse_hhmm("25:00"), None);
        assert_eq!(parse_hhmm("10:61"), None);
        assert_eq!(parse_hhmm("1030"), None);
        assert_eq!(parse_hhmm("ten:30"), None);
    }
}
