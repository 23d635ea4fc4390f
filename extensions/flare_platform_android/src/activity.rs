//! Android Activity integration
//!
//! Entry point helper for applications: sets up logcat, builds the screen
//! driver over the activity, and pumps until the activity is destroyed.

use flare_platform::{DriverConfig, Result, WindowManager};

#[cfg(target_os = "android")]
use android_activity::AndroidApp;

#[cfg(target_os = "android")]
use tracing::info;

#[cfg(not(target_os = "android"))]
use flare_platform::PlatformError;

/// Run the event pump for `app` until the activity is destroyed
///
/// Call this from the application's `android_main`.
#[cfg(target_os = "android")]
pub fn run_app<W: WindowManager>(app: AndroidApp, windows: W, config: DriverConfig) -> Result<()> {
    crate::logging::init_logging(&config);
    info!("android_main called");

    let platform = crate::AndroidPlatform::with_app(app)?.with_config(config);
    let mut driver = platform.create_driver(windows);
    driver.run();

    info!("Flare Android app shutting down");
    Ok(())
}

/// Placeholder for non-Android builds (allows cross-compilation checks)
#[cfg(not(target_os = "android"))]
pub fn run_app<W: WindowManager>(_windows: W, _config: DriverConfig) -> Result<()> {
    Err(PlatformError::Unsupported(
        "Android platform only available on Android".to_string(),
    ))
}
