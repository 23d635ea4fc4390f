//! Application lifecycle commands and deferred redraw flags

/// Lifecycle command delivered asynchronously by the host
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppCommand {
    /// The native drawing surface is ready
    SurfaceCreated,
    /// The native drawing surface is about to go away
    SurfaceDestroyed,
    /// The native drawing surface changed size
    SurfaceResized,
    /// The visible content area changed (e.g. soft keyboard shown)
    ContentRectChanged,
    /// The application gained input focus
    GainedFocus,
    /// The application lost input focus
    LostFocus,
    /// The activity became visible
    Start,
    /// The activity came to the foreground
    Resume,
    /// The activity went to the background
    Pause,
    /// The activity is no longer visible
    Stop,
    /// The host asks the application to save its state
    SaveState,
    /// Device configuration changed (orientation, density, locale)
    ConfigChanged,
    /// The system is low on memory
    LowMemory,
    /// The activity is being destroyed
    Destroy,
}

/// Deferred redraw/relayout requests raised during dispatch
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ContentChangeFlags {
    /// Window content must be redrawn
    pub content_changed: bool,
    /// The whole desktop must be cleared before redrawing
    pub clear_desktop: bool,
}

impl ContentChangeFlags {
    /// Whether any request is raised
    pub fn any(&self) -> bool {
        self.content_changed || self.clear_desktop
    }

    /// Take the flags, leaving them cleared
    pub fn take(&mut self) -> ContentChangeFlags {
        std::mem::take(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_clears_flags() {
        let mut flags = ContentChangeFlags {
            content_changed: true,
            clear_desktop: false,
        };
        assert!(flags.any());
        let taken = flags.take();
        assert!(taken.content_changed);
        assert!(!flags.any());
    }
}
