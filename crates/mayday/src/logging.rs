//! Tracing subscriber setup

use mayday_core::config::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Installs a formatted tracing subscriber for the process
///
/// `RUST_LOG` takes precedence over the configured level. Returns `false`
/// when a global subscriber was already installed, in which case nothing
/// changes.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init()
        .is_ok()
}
