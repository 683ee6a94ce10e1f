//! Subscriber setup for the binaries.
//!
//! The filter comes from `CPM_LOG` (any `EnvFilter` directive, e.g. `debug` or
//! `cpm_engine=trace`), falling back to the level passed by the caller.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV_VAR: &str = "CPM_LOG";

/// Installs a global fmt subscriber writing to stderr.
///
/// Returns `false` when a subscriber was already installed.
pub fn init_logging(default_level: &str) -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .is_ok()
}
