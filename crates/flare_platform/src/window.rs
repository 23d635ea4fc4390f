//! Window-management collaborator
//!
//! The bridge does not own windows. It asks the window system where input
//! goes and tells it when surfaces need redrawing.

use crate::input::InputEvent;

/// Opaque window identifier assigned by the window system
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub u64);

/// Axis-aligned rectangle in device pixels
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Whether a point lies inside (right and bottom edges excluded)
    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x
            && py >= self.y
            && px < self.x.saturating_add(self.w)
            && py < self.y.saturating_add(self.h)
    }

    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }
}

/// Window system interface consumed by the event pump
///
/// All methods are called on the UI thread during dispatch.
pub trait WindowManager {
    /// Topmost window under a screen point
    fn window_at(&self, x: i32, y: i32) -> Option<WindowId>;

    /// Window that currently has keyboard focus
    fn focus_window(&self) -> Option<WindowId>;

    /// Deliver an event; returns whether the window used it
    fn deliver(&mut self, window: WindowId, event: &InputEvent) -> bool;

    /// Mark one window as needing a redraw
    fn redraw(&mut self, window: WindowId);

    /// Mark every window as needing a redraw
    fn redraw_all(&mut self);

    /// Push pending damage to the display surface
    fn flush(&mut self);

    /// The drawing surface appeared (`true`) or went away (`false`)
    fn surface_changed(&mut self, _available: bool) {}

    /// The application gained or lost input focus
    fn focus_changed(&mut self, _focused: bool) {}

    /// The system is low on memory; drop caches if possible
    fn low_memory(&mut self) {}
}
