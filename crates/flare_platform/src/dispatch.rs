//! Input routing
//!
//! [`Dispatcher`] owns everything dispatch mutates except the native source:
//! the window manager, translator, keyboard controller, grab, and deferred
//! redraw flags. Keeping it separate from the source lets the pump lend it to
//! the source's dispatch closure while the source is mutably borrowed.

use crate::event::ContentChangeFlags;
use crate::input::{InputEvent, TextInput};
use crate::keyboard::KeyboardController;
use crate::native::{NativeInputEvent, NativeKeyEvent, NativeMotionEvent, NativeTextEvent};
use crate::translate::{InputTranslator, KeyOutcome};
use crate::window::{WindowId, WindowManager};
use tracing::trace;

/// Dispatch state shared by input and lifecycle handling
#[derive(Debug)]
pub struct Dispatcher<W> {
    pub(crate) windows: W,
    pub(crate) translator: InputTranslator,
    pub(crate) keyboard: KeyboardController,
    pub(crate) grab: Option<WindowId>,
    pub(crate) focus: Option<WindowId>,
    pub(crate) flags: ContentChangeFlags,
    pub(crate) running: bool,
    pub(crate) surface_ready: bool,
    pub(crate) focused: bool,
}

impl<W: WindowManager> Dispatcher<W> {
    pub fn new(windows: W) -> Self {
        Self {
            windows,
            translator: InputTranslator::new(),
            keyboard: KeyboardController::new(),
            grab: None,
            focus: None,
            flags: ContentChangeFlags::default(),
            running: true,
            surface_ready: false,
            focused: false,
        }
    }

    /// Dispatch one native input record; returns whether it was consumed
    pub fn handle_input_event(&mut self, event: &NativeInputEvent<'_>) -> bool {
        match event {
            NativeInputEvent::Key(key) => self.handle_keyboard_event(key),
            NativeInputEvent::Motion(motion) => self.handle_mouse_event(motion),
            NativeInputEvent::Text(text) => self.handle_text_event(text),
            NativeInputEvent::Unknown(kind) => {
                trace!(kind, "ignoring unknown input event kind");
                false
            }
        }
    }

    /// Translate and route a key record
    ///
    /// Keys go to the grab window, else the focus target. Keys used by an
    /// active composition are consumed even when no window takes the text.
    pub fn handle_keyboard_event(&mut self, event: &NativeKeyEvent) -> bool {
        let outcome = self
            .translator
            .translate_key(event, self.keyboard.composition_mut());
        match outcome {
            KeyOutcome::Key(key) => {
                self.keyboard.composition_mut().clear_status();
                self.deliver_to_focus(&InputEvent::Keyboard(key))
            }
            KeyOutcome::Text(text) => {
                self.deliver_text(text);
                true
            }
            KeyOutcome::Swallowed => true,
            KeyOutcome::Ignored => false,
        }
    }

    /// Translate and route a motion record
    ///
    /// Pointer events go to the grab window regardless of position, else to
    /// the window under the pointer.
    pub fn handle_mouse_event(&mut self, event: &NativeMotionEvent) -> bool {
        let Some(mouse) = self.translator.translate_motion(event) else {
            return false;
        };
        let (x, y) = mouse.position();
        let target = self.grab.or_else(|| self.windows.window_at(x, y));
        let Some(window) = target else {
            trace!(x, y, "no window under pointer");
            return false;
        };
        self.deliver(window, &InputEvent::Mouse(mouse))
    }

    /// Apply an input-method text record to the composition and route the
    /// resulting text like a key
    pub fn handle_text_event(&mut self, event: &NativeTextEvent<'_>) -> bool {
        let text = self
            .translator
            .translate_text(event, self.keyboard.composition_mut());
        self.deliver_text(text);
        true
    }

    fn deliver_text(&mut self, text: TextInput) {
        self.deliver_to_focus(&InputEvent::Text(text));
    }

    fn deliver_to_focus(&mut self, event: &InputEvent) -> bool {
        let target = self
            .grab
            .or(self.focus)
            .or_else(|| self.windows.focus_window());
        match target {
            Some(window) => self.deliver(window, event),
            None => {
                trace!("no focus window for keyboard input");
                false
            }
        }
    }

    fn deliver(&mut self, window: WindowId, event: &InputEvent) -> bool {
        let consumed = self.windows.deliver(window, event);
        if consumed {
            self.flags.content_changed = true;
        }
        trace!(window = window.0, consumed, "delivered {event:?}");
        consumed
    }

    /// Route pointer and keyboard input exclusively to `window`
    pub fn grab(&mut self, window: Option<WindowId>) {
        if self.grab != window {
            trace!(?window, "grab changed");
        }
        self.grab = window;
    }

    pub fn grabbed(&self) -> Option<WindowId> {
        self.grab
    }

    /// Establish a new keyboard focus target; any composition is abandoned
    pub fn set_focus(&mut self, window: Option<WindowId>) {
        trace!(?window, "focus target");
        self.focus = window;
        self.keyboard.composition_mut().reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::{keycode, KeyChar, MotionAction, MotionSource};
    use crate::testing::RecordingWindows;
    use crate::window::Rect;

    fn dispatcher() -> Dispatcher<RecordingWindows> {
        let mut windows = RecordingWindows::new();
        windows.add_window(WindowId(1), Rect::new(0, 0, 50, 50));
        windows.add_window(WindowId(2), Rect::new(25, 25, 50, 50));
        Dispatcher::new(windows)
    }

    #[test]
    fn test_hit_test_picks_topmost_window() {
        let mut dispatch = dispatcher();
        let down = NativeMotionEvent::new(MotionAction::Down, MotionSource::Touchscreen, 30.0, 30.0);

        assert!(dispatch.handle_mouse_event(&down));
        assert_eq!(dispatch.windows.delivered()[0].0, WindowId(2));
    }

    #[test]
    fn test_keys_without_focus_are_unconsumed() {
        let mut dispatch = dispatcher();
        let back = NativeKeyEvent::down(keycode::BACK);
        assert!(!dispatch.handle_keyboard_event(&back));

        dispatch.set_focus(Some(WindowId(1)));
        assert!(dispatch.handle_keyboard_event(&back));
    }

    #[test]
    fn test_declined_event_is_unconsumed() {
        let mut dispatch = dispatcher();
        dispatch.set_focus(Some(WindowId(1)));
        dispatch.windows.set_rejecting(true);

        let key = NativeKeyEvent::down(keycode::A).with_char(KeyChar::Unicode('a'));
        assert!(!dispatch.handle_keyboard_event(&key));
        assert!(!dispatch.flags.content_changed);
    }

    #[test]
    fn test_composition_keys_consumed_without_target() {
        let mut dispatch = dispatcher();
        let accent = NativeKeyEvent::down(keycode::GRAVE).with_char(KeyChar::CombiningAccent('`'));
        assert!(dispatch.handle_keyboard_event(&accent));
        assert!(dispatch.keyboard.composition().is_active());
        assert!(dispatch.windows.delivered().is_empty());
    }

    #[test]
    fn test_unknown_event_kind_is_unconsumed() {
        let mut dispatch = dispatcher();
        assert!(!dispatch.handle_input_event(&NativeInputEvent::Unknown(6)));
    }
}
