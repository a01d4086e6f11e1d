//! One maintenance pass over every listing domain.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use community_data::CacheMaintenance;
use community_shared::ItemType;
use futures::future::join_all;

/// Outcome of a sweep, per domain.
#[derive(Debug, Default)]
pub struct SweepReport {
    pub refreshed: Vec<(ItemType, usize)>,
    pub failed: Vec<(ItemType, String)>,
    pub evicted: usize,
}

impl SweepReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Refresh every domain concurrently, then evict whatever is still older
/// than `max_age`.  A domain whose refresh fails keeps its rows until they
/// age out.
pub async fn run_sweep(
    domains: &[Arc<dyn CacheMaintenance>],
    max_age: chrono::Duration,
) -> SweepReport {
    let refreshes = domains.iter().map(|domain| async move {
        let result = domain.refresh().await;
        (domain.item_type(), result)
    });

    let mut report = SweepReport::default();
    for (item_type, result) in join_all(refreshes).await {
        match result {
            Ok(count) => report.refreshed.push((item_type, count)),
            Err(e) => {
                tracing::warn!(%item_type, error = %e, "refresh failed");
                report.failed.push((item_type, e.to_string()));
            }
        }
    }

    let cutoff = Utc::now() - max_age;
    for domain in domains {
        match domain.evict_older_than(cutoff) {
            Ok(removed) => report.evicted += removed,
            Err(e) => {
                let item_type = domain.item_type();
                tracing::warn!(%item_type, error = %e, "eviction failed");
                report.failed.push((item_type, e.to_string()));
            }
        }
    }

    report
}

/// Period between sweeps, from `COMMUNITY_SWEEP_INTERVAL_SECS`.  `None`
/// means run once and exit.
pub fn interval_from_env() -> Option<Duration> {
    let raw = std::env::var("COMMUNITY_SWEEP_INTERVAL_SECS").ok()?;
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
        _ => {
            tracing::warn!(value = %raw, "Invalid COMMUNITY_SWEEP_INTERVAL_SECS, running once");
            None
        }
    }
}
