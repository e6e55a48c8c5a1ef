//! Log output setup.
//!
//! The library only emits `tracing` events. Hosts that want them on stderr
//! call [`init`] once at startup; a second call keeps the first subscriber.

use crate::config::HbnbConfig;
use crate::error::{HbnbError, Result};
use tracing_subscriber::EnvFilter;

/// Installs a fmt subscriber filtered by `config.log_filter`.
pub fn init(config: &HbnbConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.log_filter)
        .map_err(|e| HbnbError::Config(format!("invalid log filter '{}': {e}", config.log_filter)))?;
    // Err here only means a global subscriber is already set.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    Ok(())
}
