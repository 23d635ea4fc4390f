//! Driver configuration

use crate::window::Rect;

/// Screen reported when the host has no display metrics yet
pub const DEFAULT_SCREEN: Rect = Rect::new(0, 0, 600, 800);

/// Screen driver configuration
#[derive(Clone, Debug)]
pub struct DriverConfig {
    /// Screen bounds used until the host reports real metrics
    pub fallback_screen: Rect,
    /// Ask for the soft keyboard implicitly (the IME may decline)
    pub show_keyboard_implicit: bool,
    /// Tag for platform log output (logcat on Android)
    pub log_tag: String,
    /// Default `tracing` filter directive when no environment filter is set
    pub log_directive: String,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            fallback_screen: DEFAULT_SCREEN,
            show_keyboard_implicit: false,
            log_tag: "Flare".to_string(),
            log_directive: "info".to_string(),
        }
    }
}

impl DriverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fallback screen bounds
    pub fn fallback_screen(mut self, screen: Rect) -> Self {
        self.fallback_screen = screen;
        self
    }

    /// Set whether the soft keyboard is requested implicitly
    pub fn show_keyboard_implicit(mut self, implicit: bool) -> Self {
        self.show_keyboard_implicit = implicit;
        self
    }

    /// Set the log tag
    pub fn log_tag(mut self, tag: impl Into<String>) -> Self {
        self.log_tag = tag.into();
        self
    }

    /// Set the default log filter directive
    pub fn log_directive(mut self, directive: impl Into<String>) -> Self {
        self.log_directive = directive.into();
        self
    }
}
