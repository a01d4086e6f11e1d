//! # community-sync
//!
//! Cache maintenance for the community listings client.
//!
//! Opens the same database the client uses, refreshes every listing domain
//! from the REST API and evicts rows older than the configured maximum age.
//! Runs once by default; set `COMMUNITY_SWEEP_INTERVAL_SECS` to keep running
//! on a fixed period until Ctrl+C.

mod sweep;

use community_data::{AppData, ClientConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::sweep::{interval_from_env, run_sweep};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new("info,community_sync=debug,community_data=debug")
            }),
        )
        .init();

    info!("Starting community cache sweep v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration and open the data layer
    // -----------------------------------------------------------------------
    let config = ClientConfig::from_env();
    info!(?config, "Loaded configuration");

    let max_age = config.cache_max_age;
    let data = AppData::open(config)?;
    let domains = data.maintenance();

    // -----------------------------------------------------------------------
    // 3. Sweep once, or on a fixed period
    // -----------------------------------------------------------------------
    let Some(period) = interval_from_env() else {
        let report = run_sweep(&domains, max_age).await;
        log_report(&report);
        if !report.is_clean() {
            anyhow::bail!("{} domain(s) failed to sync", report.failed.len());
        }
        return Ok(());
    };

    info!(period_secs = period.as_secs(), "Running periodic sweeps");
    let mut interval = tokio::time::interval(period);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                let report = run_sweep(&domains, max_age).await;
                log_report(&report);
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down");
                break;
            }
        }
    }

    Ok(())
}

fn log_report(report: &sweep::SweepReport) {
    for (item_type, count) in &report.refreshed {
        info!(%item_type, count, "refreshed");
    }
    for (item_type, error) in &report.failed {
        tracing::error!(%item_type, %error, "sync failed");
    }
    info!(evicted = report.evicted, failed = report.failed.len(), "Sweep complete");
}
