//! Flare Platform Event Bridge
//!
//! This crate turns a native operating-system event source into the
//! toolkit's portable event and timeout model.
//!
//! # Architecture
//!
//! - [`ScreenDriver`] - The event pump: waits on the native source or the
//!   nearest timeout, drains lifecycle commands and input, fires timeouts
//! - [`NativeEventSource`] - Host primitives, one implementation per platform
//! - [`WindowManager`] - The window system the pump routes input to
//! - [`timeout::TimeoutRegistry`] - Toolkit-scheduled callbacks
//! - [`KeyboardController`] - Soft keyboard requests and text composition
//!
//! # Platform Implementations
//!
//! - [`headless::HeadlessEventSource`] - Virtual clock and in-memory queue for
//!   host builds and tests
//! - `flare_platform_android` - Android using `android-activity` and JNI
//!
//! # Example
//!
//! ```ignore
//! use flare_platform::prelude::*;
//! use std::time::Duration;
//!
//! let mut driver = ScreenDriver::new(HeadlessEventSource::new(), my_windows);
//! let blink = TimeoutHandler::new(|timeouts, arg| {
//!     // toggle the cursor, then come back in half a second
//! });
//! driver.add_timeout(Duration::from_millis(500), &blink, 0);
//!
//! while driver.is_running() {
//!     driver.wait(Duration::from_secs(1));
//!     driver.flush();
//! }
//! ```

mod config;
mod dispatch;
mod error;
mod event;
mod input;
mod keyboard;
mod lifecycle;
mod platform;
mod pump;
mod window;

pub mod headless;
pub mod lock;
pub mod logging;
pub mod native;
pub mod timeout;
pub mod translate;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export all public types
pub use config::{DriverConfig, DEFAULT_SCREEN};
pub use dispatch::Dispatcher;
pub use error::{PlatformError, Result};
pub use event::{AppCommand, ContentChangeFlags};
pub use input::{
    InputEvent, Key, KeyState, KeyboardEvent, Modifiers, MouseButton, MouseButtons, MouseEvent,
    TextInput,
};
pub use keyboard::{ComposeStatus, CompositionState, KeyboardController, KeyboardVisibility};
pub use platform::{BeepKind, NativeEventSource, WaitOutcome, Wake, WakeHandle};
pub use pump::ScreenDriver;
pub use window::{Rect, WindowId, WindowManager};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::DriverConfig;
    pub use crate::error::{PlatformError, Result};
    pub use crate::event::{AppCommand, ContentChangeFlags};
    pub use crate::headless::HeadlessEventSource;
    pub use crate::input::{
        InputEvent, Key, KeyState, KeyboardEvent, Modifiers, MouseButton, MouseButtons,
        MouseEvent, TextInput,
    };
    pub use crate::keyboard::ComposeStatus;
    pub use crate::platform::{BeepKind, NativeEventSource, WaitOutcome, WakeHandle};
    pub use crate::pump::ScreenDriver;
    pub use crate::timeout::{TimeoutArg, TimeoutHandler};
    pub use crate::window::{Rect, WindowId, WindowManager};
}
