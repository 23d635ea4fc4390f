//! Event pump
//!
//! [`ScreenDriver`] reconciles the native event source, lifecycle commands
//! and toolkit timeouts into one wait/dispatch loop:
//!
//! 1. compute a deadline from `time_to_wait` and the nearest timeout (zero if
//!    something is already due or pending),
//! 2. block in the source with the toolkit lock released,
//! 3. drain every pending lifecycle command and input event,
//! 4. fire the timeouts that are due.
//!
//! Queued native events therefore always dispatch before due timeouts fire
//! within one [`ScreenDriver::wait`].

use crate::config::DriverConfig;
use crate::dispatch::Dispatcher;
use crate::event::ContentChangeFlags;
use crate::keyboard::{ComposeStatus, KeyboardVisibility};
use crate::lock::Unlocked;
use crate::platform::{BeepKind, NativeEventSource, WaitOutcome, WakeHandle};
use crate::timeout::{TimeoutArg, TimeoutHandler, TimeoutRegistry};
use crate::window::{Rect, WindowId, WindowManager};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Platform screen driver
///
/// Owns the native source, window manager, timeout registry and all
/// dispatch state. Lives on the UI thread; other threads reach it only
/// through [`WakeHandle`] and the toolkit lock.
pub struct ScreenDriver<S, W> {
    source: S,
    timeouts: TimeoutRegistry,
    dispatch: Dispatcher<W>,
    config: DriverConfig,
}

impl<S: NativeEventSource, W: WindowManager> ScreenDriver<S, W> {
    pub fn new(source: S, windows: W) -> Self {
        Self::with_config(source, windows, DriverConfig::default())
    }

    pub fn with_config(source: S, windows: W, config: DriverConfig) -> Self {
        debug!(platform = source.name(), "screen driver created");
        let timeouts = TimeoutRegistry::new(source.now());
        Self {
            source,
            timeouts,
            dispatch: Dispatcher::new(windows),
            config,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn windows(&self) -> &W {
        &self.dispatch.windows
    }

    pub fn windows_mut(&mut self) -> &mut W {
        &mut self.dispatch.windows
    }

    pub fn timeouts(&self) -> &TimeoutRegistry {
        &self.timeouts
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    // ========================================================================
    // Timeouts
    // ========================================================================

    fn sync_clock(&mut self) {
        self.timeouts.set_now(self.source.now());
    }

    /// Run `handler(arg)` once, `delay` from now
    pub fn add_timeout(&mut self, delay: Duration, handler: &TimeoutHandler, arg: TimeoutArg) {
        self.sync_clock();
        self.timeouts.add_timeout(delay, handler, arg);
    }

    /// Re-arm relative to the previous due time of the same timeout
    pub fn repeat_timeout(&mut self, delay: Duration, handler: &TimeoutHandler, arg: TimeoutArg) {
        self.sync_clock();
        self.timeouts.repeat_timeout(delay, handler, arg);
    }

    pub fn has_timeout(&self, handler: &TimeoutHandler, arg: TimeoutArg) -> bool {
        self.timeouts.has_timeout(handler, arg)
    }

    pub fn remove_timeout(&mut self, handler: &TimeoutHandler, arg: TimeoutArg) {
        self.timeouts.remove_timeout(handler, arg);
    }

    // ========================================================================
    // Pump
    // ========================================================================

    /// Wait for events or timeouts, dispatch them, and return the time spent
    ///
    /// Never waits longer than `time_to_wait`; `Duration::ZERO` polls.
    /// `Duration::MAX` with no pending timeouts waits until an event or a
    /// wake arrives.
    pub fn wait(&mut self, time_to_wait: Duration) -> Duration {
        self.pump(time_to_wait).0
    }

    fn pump(&mut self, time_to_wait: Duration) -> (Duration, WaitOutcome) {
        if !self.dispatch.running {
            return (Duration::ZERO, WaitOutcome::Unavailable);
        }

        let start = self.source.now();
        self.timeouts.set_now(start);

        let timeout = if self.source.has_pending() || self.timeouts.has_due() {
            Some(Duration::ZERO)
        } else {
            let limit = start.checked_add(time_to_wait);
            let deadline = match (limit, self.timeouts.next_due()) {
                (Some(limit), Some(due)) => Some(limit.min(due)),
                (limit, None) => limit,
                (None, due) => due,
            };
            deadline.map(|deadline| deadline.saturating_duration_since(start))
        };

        let outcome = {
            let _unlocked = Unlocked::new();
            self.source.wait(timeout)
        };
        trace!(?timeout, ?outcome, "native wait");
        if outcome == WaitOutcome::Unavailable {
            debug!(platform = self.source.name(), "event source unavailable");
            return (Duration::ZERO, outcome);
        }

        let handled = self.drain();
        self.sync_clock();
        let fired = self.timeouts.fire_due();
        if handled > 0 || fired > 0 {
            trace!(handled, fired, "pump cycle");
        }

        let elapsed = self.elapsed_since(start).min(time_to_wait);
        (elapsed, outcome)
    }

    fn elapsed_since(&self, start: Instant) -> Duration {
        self.source.now().saturating_duration_since(start)
    }

    /// Dispatch lifecycle commands and input events until both are empty
    fn drain(&mut self) -> usize {
        let mut handled = 0;
        loop {
            if self.handle_app_command() == 1 {
                handled += 1;
                continue;
            }
            let dispatch = &mut self.dispatch;
            if self
                .source
                .next_input(&mut |event| dispatch.handle_input_event(event))
            {
                handled += 1;
                continue;
            }
            return handled;
        }
    }

    /// Process one pending lifecycle command; 1 if one was handled, else 0
    pub fn handle_app_command(&mut self) -> i32 {
        match self.source.next_command() {
            Some(command) => {
                self.dispatch.handle_command(command);
                1
            }
            None => 0,
        }
    }

    /// Pump until the application is destroyed or the source goes away,
    /// flushing after every cycle
    pub fn run(&mut self) {
        while self.dispatch.running {
            let (_, outcome) = self.pump(Duration::MAX);
            if outcome == WaitOutcome::Unavailable {
                break;
            }
            self.flush();
        }
        debug!("screen driver stopped");
    }

    /// Whether events are pending or a timeout is due, without blocking
    pub fn ready(&self) -> bool {
        if self.source.has_pending() {
            return true;
        }
        let now = self.source.now();
        self.timeouts.next_due().is_some_and(|due| due <= now)
    }

    /// Push buffered damage to the display
    pub fn flush(&mut self) {
        self.dispatch.windows.flush();
    }

    /// Handle that ends a blocked [`wait`](Self::wait) from another thread
    pub fn wake_handle(&self) -> Option<WakeHandle> {
        self.source.wake_handle()
    }

    /// False once the host destroyed the application
    pub fn is_running(&self) -> bool {
        self.dispatch.running
    }

    /// Whether a drawing surface exists
    pub fn has_surface(&self) -> bool {
        self.dispatch.surface_ready
    }

    /// Whether the application has input focus
    pub fn has_focus(&self) -> bool {
        self.dispatch.focused
    }

    /// Take the redraw requests raised since the last call
    pub fn take_content_flags(&mut self) -> ContentChangeFlags {
        self.dispatch.flags.take()
    }

    // ========================================================================
    // Routing
    // ========================================================================

    /// Send all pointer and keyboard input to `window`; `None` releases
    pub fn grab(&mut self, window: Option<WindowId>) {
        self.dispatch.grab(window);
    }

    pub fn grabbed(&self) -> Option<WindowId> {
        self.dispatch.grabbed()
    }

    /// Set the keyboard focus target, resetting any composition
    pub fn set_focus(&mut self, window: Option<WindowId>) {
        self.dispatch.set_focus(window);
    }

    /// Mark one window for redraw
    pub fn redraw(&mut self, window: WindowId) {
        self.dispatch.windows.redraw(window);
    }

    // ========================================================================
    // Keyboard
    // ========================================================================

    /// Ask for the on-screen keyboard
    pub fn request_keyboard(&mut self) {
        if let Some(KeyboardVisibility::Show) = self.dispatch.keyboard.request() {
            self.source
                .show_soft_keyboard(self.config.show_keyboard_implicit);
        }
    }

    /// Drop one keyboard request; the keyboard hides when none remain
    pub fn release_keyboard(&mut self) {
        if let Some(KeyboardVisibility::Hide) = self.dispatch.keyboard.release() {
            self.source.hide_soft_keyboard();
        }
    }

    pub fn keyboard_visible(&self) -> bool {
        self.dispatch.keyboard.is_visible()
    }

    /// Deletion count and status of the last text event
    pub fn compose(&self, deletion: &mut usize) -> ComposeStatus {
        self.dispatch.keyboard.composition().compose(deletion)
    }

    /// Abandon the current composition
    pub fn compose_reset(&mut self) {
        self.dispatch.keyboard.composition_mut().reset();
    }

    // ========================================================================
    // Screen
    // ========================================================================

    fn screen(&self) -> Rect {
        self.source
            .screen_bounds()
            .filter(|bounds| !bounds.is_empty())
            .unwrap_or(self.config.fallback_screen)
    }

    pub fn x(&self) -> i32 {
        self.screen().x
    }

    pub fn y(&self) -> i32 {
        self.screen().y
    }

    pub fn w(&self) -> i32 {
        self.screen().w
    }

    pub fn h(&self) -> i32 {
        self.screen().h
    }

    /// There is a single virtual screen
    pub fn screen_count(&self) -> usize {
        1
    }

    /// Bounds of screen `n`; every index resolves to the one screen
    pub fn screen_xywh(&self, n: usize) -> Rect {
        if n != 0 {
            trace!(n, "screen index out of range");
        }
        self.screen()
    }

    /// Usable area of screen `n`
    pub fn screen_work_area(&self, n: usize) -> Rect {
        self.screen_xywh(n)
    }

    /// Last pointer position and the screen it is on
    pub fn get_mouse(&self) -> (i32, i32, usize) {
        let (x, y) = self.dispatch.translator.last_pointer();
        (x, y, 0)
    }

    pub fn beep(&mut self, kind: BeepKind) {
        self.source.beep(kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_SCREEN;
    use crate::event::AppCommand;
    use crate::headless::{HeadlessEventSource, ScriptedInput};
    use crate::input::{InputEvent, KeyState, MouseEvent};
    use crate::native::{
        keycode, KeyChar, MotionAction, MotionSource, NativeKeyEvent, NativeMotionEvent,
    };
    use crate::testing::{
        install_counting_lock_hooks, lock_counts, reset_lock_counts, RecordingWindows,
    };
    use std::cell::RefCell;
    use std::rc::Rc;

    type Driver = ScreenDriver<HeadlessEventSource, RecordingWindows>;

    fn driver() -> Driver {
        let mut windows = RecordingWindows::new();
        windows.add_window(WindowId(1), Rect::new(0, 0, 100, 100));
        windows.add_window(WindowId(2), Rect::new(200, 200, 100, 100));
        windows.set_focus(Some(WindowId(1)));
        ScreenDriver::new(HeadlessEventSource::new(), windows)
    }

    fn touch(action: MotionAction, x: f32, y: f32) -> NativeMotionEvent {
        NativeMotionEvent::new(action, MotionSource::Touchscreen, x, y)
    }

    #[test]
    fn test_wait_never_exceeds_time_to_wait() {
        let mut driver = driver();
        let limit = Duration::from_millis(40);

        assert_eq!(driver.wait(limit), limit);
        assert_eq!(driver.source().waits(), &[Some(limit)]);
        assert_eq!(driver.wait(Duration::ZERO), Duration::ZERO);
    }

    #[test]
    fn test_wait_is_bounded_by_next_timeout() {
        let mut driver = driver();
        let fired = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&fired);
        let handler = TimeoutHandler::new(move |_, _| *counter.borrow_mut() += 1);

        driver.add_timeout(Duration::from_millis(5), &handler, 0);
        assert_eq!(driver.wait(Duration::from_secs(1)), Duration::from_millis(5));
        assert_eq!(*fired.borrow(), 1);
        assert!(!driver.has_timeout(&handler, 0));
    }

    #[test]
    fn test_due_timeout_skips_blocking() {
        let mut driver = driver();
        let handler = TimeoutHandler::new(|_, _| {});
        driver.add_timeout(Duration::ZERO, &handler, 0);

        assert!(driver.ready());
        assert_eq!(driver.wait(Duration::from_secs(1)), Duration::ZERO);
        assert_eq!(driver.source().waits(), &[Some(Duration::ZERO)]);
        assert!(!driver.ready());
    }

    struct OrderedWindows {
        log: Rc<RefCell<Vec<&'static str>>>,
    }

    impl WindowManager for OrderedWindows {
        fn window_at(&self, _x: i32, _y: i32) -> Option<WindowId> {
            Some(WindowId(1))
        }
        fn focus_window(&self) -> Option<WindowId> {
            Some(WindowId(1))
        }
        fn deliver(&mut self, _window: WindowId, _event: &InputEvent) -> bool {
            self.log.borrow_mut().push("event");
            true
        }
        fn redraw(&mut self, _window: WindowId) {}
        fn redraw_all(&mut self) {}
        fn flush(&mut self) {}
    }

    #[test]
    fn test_events_dispatch_before_due_timeouts() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let windows = OrderedWindows {
            log: Rc::clone(&log),
        };
        let mut driver = ScreenDriver::new(HeadlessEventSource::new(), windows);

        let timeout_log = Rc::clone(&log);
        let handler = TimeoutHandler::new(move |_, _| timeout_log.borrow_mut().push("timeout"));
        driver.add_timeout(Duration::ZERO, &handler, 0);
        driver.source_mut().push_motion(touch(MotionAction::Down, 1.0, 1.0));
        driver.source_mut().push_motion(touch(MotionAction::Up, 1.0, 1.0));

        driver.wait(Duration::from_millis(10));
        assert_eq!(*log.borrow(), vec!["event", "event", "timeout"]);
    }

    #[test]
    fn test_only_due_timeouts_fire_after_drain() {
        let mut driver = driver();
        let handler = TimeoutHandler::new(|_, _| {});
        driver.source_mut().push_command(AppCommand::Resume);
        driver.add_timeout(Duration::ZERO, &handler, 1);
        driver.add_timeout(Duration::from_millis(50), &handler, 2);

        driver.wait(Duration::from_millis(10));
        assert!(!driver.has_timeout(&handler, 1));
        assert!(driver.has_timeout(&handler, 2));
    }

    #[test]
    fn test_repeat_timeout_uses_previous_due_time() {
        let mut driver = driver();
        let start = driver.source().now();
        let handler = TimeoutHandler::new(|_, _| {});

        driver.add_timeout(Duration::from_millis(10), &handler, 0);
        driver.source_mut().advance(Duration::from_millis(15));
        driver.repeat_timeout(Duration::from_millis(10), &handler, 0);

        assert_eq!(
            driver.timeouts().due_time(&handler, 0),
            Some(start + Duration::from_millis(20))
        );
    }

    #[test]
    fn test_keyboard_requests_are_counted() {
        let mut driver = driver();

        driver.request_keyboard();
        driver.request_keyboard();
        driver.release_keyboard();
        assert!(driver.keyboard_visible());
        assert_eq!(driver.source().keyboard_shows(), 1);
        assert_eq!(driver.source().keyboard_hides(), 0);

        driver.release_keyboard();
        assert!(!driver.keyboard_visible());
        assert_eq!(driver.source().keyboard_hides(), 1);

        driver.release_keyboard();
        assert_eq!(driver.source().keyboard_hides(), 1);
    }

    #[test]
    fn test_grab_overrides_hit_testing() {
        let mut driver = driver();
        driver.grab(Some(WindowId(2)));
        driver.source_mut().push_motion(touch(MotionAction::Down, 10.0, 10.0));
        driver.wait(Duration::ZERO);

        assert_eq!(driver.windows().delivered()[0].0, WindowId(2));

        driver.grab(None);
        driver.source_mut().push_motion(touch(MotionAction::Up, 10.0, 10.0));
        driver.source_mut().push_motion(touch(MotionAction::Down, 500.0, 500.0));
        driver.wait(Duration::ZERO);

        let delivered = driver.windows().delivered();
        assert_eq!(delivered.len(), 2);
        assert_eq!(delivered[1].0, WindowId(1));
        assert_eq!(driver.source().acknowledgements(), &[true, true, false]);
        assert_eq!(driver.get_mouse(), (500, 500, 0));
    }

    #[test]
    fn test_grab_routes_keys_past_focus() {
        let mut driver = driver();
        driver.grab(Some(WindowId(2)));
        driver
            .source_mut()
            .push_key(NativeKeyEvent::down(keycode::A).with_char(KeyChar::Unicode('a')));
        driver.wait(Duration::ZERO);

        let (window, event) = &driver.windows().delivered()[0];
        assert_eq!(*window, WindowId(2));
        assert!(matches!(
            event,
            InputEvent::Keyboard(key) if key.state == KeyState::Pressed
        ));
    }

    #[test]
    fn test_secondary_pointer_is_unconsumed() {
        let mut driver = driver();
        driver
            .source_mut()
            .push_motion(touch(MotionAction::Move, 5.0, 5.0).with_pointer_index(1));
        driver.source_mut().push_input(ScriptedInput::Unknown(7));
        driver.wait(Duration::ZERO);

        assert_eq!(driver.source().acknowledgements(), &[false, false]);
        assert!(driver.windows().delivered().is_empty());
    }

    #[test]
    fn test_dead_key_composition_through_driver() {
        let mut driver = driver();
        driver.source_mut().push_key(
            NativeKeyEvent::down(keycode::GRAVE).with_char(KeyChar::CombiningAccent('\u{300}')),
        );
        driver.wait(Duration::ZERO);

        let mut deletion = 9;
        assert_eq!(driver.compose(&mut deletion), ComposeStatus::Update);
        assert_eq!(deletion, 0);

        driver
            .source_mut()
            .push_key(NativeKeyEvent::down(keycode::A).with_char(KeyChar::Unicode('a')));
        driver.wait(Duration::ZERO);
        assert_eq!(driver.compose(&mut deletion), ComposeStatus::Commit);
        assert_eq!(deletion, 1);

        match &driver.windows().delivered()[1].1 {
            InputEvent::Text(text) => assert_eq!(text.text, "à"),
            other => panic!("unexpected {other:?}"),
        }

        // A plain key afterwards reports no composition
        driver
            .source_mut()
            .push_key(NativeKeyEvent::down(keycode::B).with_char(KeyChar::Unicode('b')));
        driver.wait(Duration::ZERO);
        assert_eq!(driver.compose(&mut deletion), ComposeStatus::None);
    }

    #[test]
    fn test_ime_text_records_and_focus_reset() {
        let mut driver = driver();
        driver.source_mut().push_text("ni", true);
        driver.wait(Duration::ZERO);

        let mut deletion = 0;
        assert_eq!(driver.compose(&mut deletion), ComposeStatus::Update);

        driver.set_focus(Some(WindowId(2)));
        assert_eq!(driver.compose(&mut deletion), ComposeStatus::None);

        driver.source_mut().push_text("你", false);
        driver.wait(Duration::ZERO);
        let (window, _) = driver.windows().delivered()[1].clone();
        assert_eq!(window, WindowId(2));
        assert_eq!(driver.compose(&mut deletion), ComposeStatus::Commit);
        assert_eq!(deletion, 0);
    }

    #[test]
    fn test_unavailable_source_returns_zero() {
        let mut driver = driver();
        driver.source_mut().close();
        assert_eq!(driver.wait(Duration::from_secs(5)), Duration::ZERO);
    }

    #[test]
    fn test_unbounded_wait_with_nothing_scheduled() {
        let mut driver = driver();
        assert_eq!(driver.wait(Duration::MAX), Duration::ZERO);
        assert_eq!(driver.source().waits(), &[None]);
    }

    #[test]
    fn test_scripted_event_ends_unbounded_wait() {
        let mut driver = driver();
        driver.source_mut().schedule_command(Duration::from_millis(7), AppCommand::GainedFocus);

        assert_eq!(driver.wait(Duration::MAX), Duration::from_millis(7));
        assert!(driver.has_focus());
    }

    #[test]
    fn test_wake_handle_ends_wait() {
        let mut driver = driver();
        let handle = driver.wake_handle().expect("headless source has a waker");
        handle.wake();
        assert_eq!(driver.wait(Duration::MAX), Duration::ZERO);
        assert_eq!(driver.source().waits(), &[None]);
        assert!(driver.is_running());
    }

    #[test]
    fn test_lock_released_around_block() {
        install_counting_lock_hooks();
        reset_lock_counts();

        let mut driver = driver();
        driver.wait(Duration::from_millis(3));
        assert_eq!(lock_counts(), (1, 1));
    }

    #[test]
    fn test_destroy_stops_driver() {
        let mut driver = driver();
        driver.source_mut().push_command(AppCommand::SurfaceCreated);
        driver
            .source_mut()
            .schedule_command(Duration::from_millis(20), AppCommand::Destroy);

        driver.run();
        assert!(!driver.is_running());
        assert!(driver.windows().flush_count() >= 1);
        assert_eq!(driver.wait(Duration::from_millis(10)), Duration::ZERO);
    }

    #[test]
    fn test_surface_loss_releases_grab() {
        let mut driver = driver();
        driver.grab(Some(WindowId(1)));
        driver.source_mut().push_command(AppCommand::SurfaceCreated);
        driver.wait(Duration::ZERO);
        assert!(driver.has_surface());
        assert!(driver.take_content_flags().clear_desktop);
        assert!(!driver.take_content_flags().any());

        driver.source_mut().push_command(AppCommand::SurfaceDestroyed);
        assert_eq!(driver.handle_app_command(), 1);
        assert_eq!(driver.handle_app_command(), 0);
        assert_eq!(driver.grabbed(), None);
        assert!(!driver.has_surface());
    }

    #[test]
    fn test_geometry_falls_back_to_configured_screen() {
        let driver = driver();
        assert_eq!(driver.screen_xywh(0), DEFAULT_SCREEN);
        assert_eq!((driver.w(), driver.h()), (600, 800));
        assert_eq!(driver.screen_count(), 1);

        let custom = Rect::new(0, 0, 320, 480);
        let driver = ScreenDriver::with_config(
            HeadlessEventSource::new(),
            RecordingWindows::new(),
            DriverConfig::new().fallback_screen(custom),
        );
        assert_eq!(driver.screen_work_area(3), custom);

        let reported = Rect::new(0, 0, 1080, 2340);
        let driver = ScreenDriver::new(
            HeadlessEventSource::new().with_screen(reported),
            RecordingWindows::new(),
        );
        assert_eq!(driver.screen_xywh(0), reported);
        assert_eq!((driver.x(), driver.y()), (0, 0));
    }

    #[test]
    fn test_beep_and_flush_reach_collaborators() {
        let mut driver = driver();
        driver.beep(BeepKind::Error);
        driver.flush();
        driver.redraw(WindowId(2));

        assert_eq!(driver.source().beeps(), &[BeepKind::Error]);
        assert_eq!(driver.windows().flush_count(), 1);
        assert_eq!(driver.windows().redraws(), &[WindowId(2)]);
    }

    #[test]
    fn test_mouse_event_positions_are_delivered() {
        let mut driver = driver();
        driver.source_mut().push_motion(touch(MotionAction::Down, 250.0, 260.0));
        driver.wait(Duration::ZERO);

        let (window, event) = &driver.windows().delivered()[0];
        assert_eq!(*window, WindowId(2));
        assert!(matches!(
            event,
            InputEvent::Mouse(MouseEvent::ButtonPressed { x: 250, y: 260, .. })
        ));
        assert!(driver.take_content_flags().content_changed);
    }
}
