//! Flare Android Platform
//!
//! Android backend for the Flare platform event bridge.
//!
//! This crate implements `flare_platform::NativeEventSource` over
//! android-activity's native activity: lifecycle commands from the main
//! looper, key and touch input from the input queue, the soft keyboard and
//! display metrics through JNI, and logcat logging.
//!
//! # Example
//!
//! ```ignore
//! use android_activity::AndroidApp;
//! use flare_platform::DriverConfig;
//!
//! #[no_mangle]
//! fn android_main(app: AndroidApp) {
//!     let windows = MyWindowSystem::new();
//!     let config = DriverConfig::new().log_tag("MyApp");
//!     if let Err(err) = flare_platform_android::activity::run_app(app, windows, config) {
//!         log::error!("{err}");
//!     }
//! }
//! ```

pub mod activity;
pub mod input;
pub mod jni_utils;
pub mod logging;
pub mod wake;

#[cfg(target_os = "android")]
pub mod event_source;

#[cfg(target_os = "android")]
pub use event_source::AndroidEventSource;
pub use wake::AndroidWakeProxy;

use flare_platform::{DriverConfig, Result};

#[cfg(not(target_os = "android"))]
use flare_platform::PlatformError;

#[cfg(target_os = "android")]
use flare_platform::{ScreenDriver, WindowManager};

/// Android platform
///
/// Creates screen drivers over the activity the application was started
/// with.
pub struct AndroidPlatform {
    #[cfg(target_os = "android")]
    app: android_activity::AndroidApp,
    config: DriverConfig,
}

#[cfg(target_os = "android")]
impl AndroidPlatform {
    /// Create a new Android platform with the given AndroidApp
    pub fn with_app(app: android_activity::AndroidApp) -> Result<Self> {
        Ok(Self {
            app,
            config: DriverConfig::default(),
        })
    }

    pub fn app(&self) -> &android_activity::AndroidApp {
        &self.app
    }

    /// Event source for the activity; create it on the UI thread
    pub fn event_source(&self) -> AndroidEventSource {
        AndroidEventSource::new(self.app.clone())
    }

    /// Screen driver over the activity and the given window system
    pub fn create_driver<W: WindowManager>(
        &self,
        windows: W,
    ) -> ScreenDriver<AndroidEventSource, W> {
        ScreenDriver::with_config(self.event_source(), windows, self.config.clone())
    }
}

// Placeholder implementation for non-Android builds
#[cfg(not(target_os = "android"))]
impl AndroidPlatform {
    /// Create a placeholder platform (for cross-compilation checks)
    pub fn with_app() -> Result<Self> {
        Err(PlatformError::Unsupported(
            "Android platform only available on Android".to_string(),
        ))
    }
}

impl AndroidPlatform {
    /// Replace the driver configuration
    pub fn with_config(mut self, config: DriverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn name(&self) -> &'static str {
        "android"
    }
}

#[cfg(all(test, not(target_os = "android")))]
mod tests {
    use super::*;

    #[test]
    fn test_platform_unsupported_on_host() {
        assert!(matches!(
            AndroidPlatform::with_app(),
            Err(PlatformError::Unsupported(_))
        ));
    }
}
