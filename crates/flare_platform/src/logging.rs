//! Log output for host builds
//!
//! Android builds route `tracing` through logcat instead; see the
//! `flare_platform_android` crate.

use crate::config::DriverConfig;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directives
pub const LOG_ENV: &str = "FLARE_LOG";

/// Install a `tracing` fmt subscriber filtered by `FLARE_LOG`
///
/// Without the variable, the config's directive applies. Returns `false` if a
/// global subscriber was already installed.
pub fn init_logging(config: &DriverConfig) -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&config.log_directive))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
