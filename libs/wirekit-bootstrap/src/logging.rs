//! Console logging setup.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Initializes a console `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_filter` from the settings
/// applies. Repeated initialization (tests, embedded use) is an error from
/// the subscriber and is reported as such.
pub fn init_logging(default_filter: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter.to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))
}
