use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "community_data=debug,community_store=info,warn";

/// Install the global `tracing` subscriber.
///
/// Honors `RUST_LOG`; falls back to debug output for this crate and info for
/// the store.  Safe to call more than once: later calls are no-ops.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let installed = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();

    if installed.is_ok() {
        tracing::debug!("tracing initialised");
    }
}
