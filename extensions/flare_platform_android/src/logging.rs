//! Logcat output
//!
//! `tracing` is built with its `log` feature here, so events reach the `log`
//! facade and android_logger forwards them to logcat under the configured tag.

use flare_platform::DriverConfig;

/// Log level for a `tracing`-style filter directive
///
/// Only the level of the last directive is used (`"info,flare=debug"` gives
/// debug); unparseable directives give info.
pub fn level_for(directive: &str) -> log::LevelFilter {
    directive
        .rsplit(',')
        .next()
        .map(|last| last.rsplit('=').next().unwrap_or(last))
        .and_then(|level| level.trim().parse().ok())
        .unwrap_or(log::LevelFilter::Info)
}

/// Route log output to logcat
#[cfg(target_os = "android")]
pub fn init_logging(config: &DriverConfig) {
    android_logger::init_once(
        android_logger::Config::default()
            .with_max_level(level_for(&config.log_directive))
            .with_tag(config.log_tag.as_str()),
    );
}

/// Off Android, fall back to the host subscriber
#[cfg(not(target_os = "android"))]
pub fn init_logging(config: &DriverConfig) {
    flare_platform::logging::init_logging(config);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_directives() {
        assert_eq!(level_for("debug"), log::LevelFilter::Debug);
        assert_eq!(level_for("info,flare_platform=trace"), log::LevelFilter::Trace);
        assert_eq!(level_for("WARN"), log::LevelFilter::Warn);
        assert_eq!(level_for("not a level"), log::LevelFilter::Info);
    }
}
