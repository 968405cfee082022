use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use caucion_monitor::{
    alert::bounds::BoundsStore,
    alert::notifier::{AlertNotifier, LogNotifier, TelegramNotifier},
    config::AppConfig,
    ledger::RateLedger,
    logger::init_tracing,
    monitor::{MonitorEngine, run_rate_monitor},
    rate::fetcher::RateFetcher,
    rate::iol::IolClient,
    rate::simulated::SimulatedFetcher,
};

/// Picks the quote source: the authenticated IOL client when
/// credentials are present, the simulator otherwise.
fn build_fetcher(cfg: &AppConfig) -> anyhow::Result<Arc<dyn RateFetcher>> {
    let username = std::env::var("IOL_USERNAME").ok();
    let password = std::env::var("IOL_PASSWORD").ok();

    match (username, password) {
        (Some(username), Some(password)) => {
            let client = IolClient::new(
                cfg.iol_base_url.clone(),
                username,
                password,
                cfg.fetch_timeout,
            )
            .context("failed to build IOL client")?;

            info!(base_url = %cfg.iol_base_url, "using IOL quote source");
            Ok(Arc::new(client))
        }
        _ => {
            warn!("IOL credentials not set; using simulated quote source");
            Ok(Arc::new(SimulatedFetcher::default()))
        }
    }
}

fn build_notifier() -> anyhow::Result<Arc<dyn AlertNotifier>> {
    match TelegramNotifier::from_env() {
        Some(notifier) => {
            let notifier = notifier.context("failed to build telegram notifier")?;
            info!("telegram notifications active");
            Ok(Arc::new(notifier))
        }
        None => {
            warn!("telegram not configured; alerts will only be logged");
            Ok(Arc::new(LogNotifier))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let is_production = std::env::var("APP_ENV").unwrap_or_default() == "production";
    init_tracing(is_production);

    info!("starting caucion monitor...");

    let cfg = AppConfig::from_env();

    let fetcher = build_fetcher(&cfg)?;
    let notifier = build_notifier()?;
    let bounds = Arc::new(BoundsStore::load(&cfg.bounds_path));
    let ledger = RateLedger::load(&cfg.ledger_path);

    let engine = Arc::new(MonitorEngine::new(
        fetcher,
        notifier,
        bounds,
        ledger,
        cfg.market_window,
        cfg.cache_freshness,
    ));

    tokio::spawn(run_rate_monitor(Arc::clone(&engine), cfg.monitor_period));

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");

    Ok(())
}
