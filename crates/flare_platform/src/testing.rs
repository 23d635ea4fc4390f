//! Test doubles for the window system and lock hooks

use crate::input::InputEvent;
use crate::lock::set_lock_hooks;
use crate::window::{Rect, WindowId, WindowManager};
use std::cell::Cell;

/// Window manager that records every call
#[derive(Debug, Default)]
pub struct RecordingWindows {
    windows: Vec<(WindowId, Rect)>,
    focus: Option<WindowId>,
    rejecting: bool,
    delivered: Vec<(WindowId, InputEvent)>,
    redraws: Vec<WindowId>,
    redraw_all_count: usize,
    flush_count: usize,
    surface_events: Vec<bool>,
    focus_events: Vec<bool>,
    low_memory_count: usize,
}

impl RecordingWindows {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a window on top of the existing ones
    pub fn add_window(&mut self, id: WindowId, bounds: Rect) {
        self.windows.push((id, bounds));
    }

    pub fn set_focus(&mut self, window: Option<WindowId>) {
        self.focus = window;
    }

    /// Make every window decline delivered events
    pub fn set_rejecting(&mut self, rejecting: bool) {
        self.rejecting = rejecting;
    }

    pub fn delivered(&self) -> &[(WindowId, InputEvent)] {
        &self.delivered
    }

    pub fn redraws(&self) -> &[WindowId] {
        &self.redraws
    }

    pub fn redraw_all_count(&self) -> usize {
        self.redraw_all_count
    }

    pub fn flush_count(&self) -> usize {
        self.flush_count
    }

    pub fn surface_events(&self) -> &[bool] {
        &self.surface_events
    }

    pub fn focus_events(&self) -> &[bool] {
        &self.focus_events
    }

    pub fn low_memory_count(&self) -> usize {
        self.low_memory_count
    }
}

impl WindowManager for RecordingWindows {
    fn window_at(&self, x: i32, y: i32) -> Option<WindowId> {
        self.windows
            .iter()
            .rev()
            .find(|(_, bounds)| bounds.contains(x, y))
            .map(|(id, _)| *id)
    }

    fn focus_window(&self) -> Option<WindowId> {
        self.focus
    }

    fn deliver(&mut self, window: WindowId, event: &InputEvent) -> bool {
        self.delivered.push((window, event.clone()));
        !self.rejecting
    }

    fn redraw(&mut self, window: WindowId) {
        self.redraws.push(window);
    }

    fn redraw_all(&mut self) {
        self.redraw_all_count += 1;
    }

    fn flush(&mut self) {
        self.flush_count += 1;
    }

    fn surface_changed(&mut self, available: bool) {
        self.surface_events.push(available);
    }

    fn focus_changed(&mut self, focused: bool) {
        self.focus_events.push(focused);
    }

    fn low_memory(&mut self) {
        self.low_memory_count += 1;
    }
}

thread_local! {
    static LOCKS: Cell<usize> = const { Cell::new(0) };
    static UNLOCKS: Cell<usize> = const { Cell::new(0) };
}

/// Install lock hooks that count calls per thread
///
/// Counting per thread keeps concurrently running tests from seeing each
/// other's calls.
pub fn install_counting_lock_hooks() {
    set_lock_hooks(
        || LOCKS.with(|count| count.set(count.get() + 1)),
        || UNLOCKS.with(|count| count.set(count.get() + 1)),
    );
}

/// `(locks, unlocks)` seen on this thread
pub fn lock_counts() -> (usize, usize) {
    (LOCKS.with(Cell::get), UNLOCKS.with(Cell::get))
}

pub fn reset_lock_counts() {
    LOCKS.with(|count| count.set(0));
    UNLOCKS.with(|count| count.set(0));
}
