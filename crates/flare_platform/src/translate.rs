//! Native input translation
//!
//! Converts native key, motion and text records into toolkit events. The
//! translator only remembers what a single pointer needs (last position and
//! held buttons); composition state is owned by the keyboard controller and
//! passed in.

use crate::input::{
    Key, KeyState, KeyboardEvent, Modifiers, MouseButton, MouseButtons, MouseEvent, TextInput,
};
use crate::keyboard::CompositionState;
use crate::native::{
    button, keycode, meta, KeyAction, KeyChar, MotionAction, MotionSource, NativeKeyEvent,
    NativeMotionEvent, NativeTextEvent,
};
use tracing::trace;

/// What a key record turned into
#[derive(Clone, Debug, PartialEq)]
pub enum KeyOutcome {
    /// Normal key event for the focused window
    Key(KeyboardEvent),
    /// Composition produced text for the focused window
    Text(TextInput),
    /// Used by composition; nothing to deliver
    Swallowed,
    /// Not understood; leave it to the host
    Ignored,
}

/// Single-pointer input translator
#[derive(Debug, Default)]
pub struct InputTranslator {
    last_pointer: (i32, i32),
    buttons: MouseButtons,
}

impl InputTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last pointer position seen, in device pixels
    pub fn last_pointer(&self) -> (i32, i32) {
        self.last_pointer
    }

    /// Buttons currently held
    pub fn buttons(&self) -> MouseButtons {
        self.buttons
    }

    /// Forget held buttons (e.g. when the surface goes away)
    pub fn reset_buttons(&mut self) {
        self.buttons = MouseButtons::empty();
    }

    /// Translate a key record
    ///
    /// While a composition is active every key goes to the composition
    /// instead of normal dispatch.
    pub fn translate_key(
        &mut self,
        event: &NativeKeyEvent,
        composition: &mut CompositionState,
    ) -> KeyOutcome {
        let state = match event.action {
            KeyAction::Down if event.repeat_count == 0 => KeyState::Pressed,
            KeyAction::Down => KeyState::Repeated,
            KeyAction::Up => KeyState::Released,
            KeyAction::Multiple => {
                return match event.character {
                    KeyChar::Unicode(ch) if composition.is_active() => {
                        KeyOutcome::Text(composition.push_char(ch))
                    }
                    KeyChar::Unicode(ch) => KeyOutcome::Text(composition.commit(&ch.to_string())),
                    _ => KeyOutcome::Ignored,
                };
            }
            KeyAction::Unknown(raw) => {
                trace!(raw, "ignoring unknown key action");
                return KeyOutcome::Ignored;
            }
        };

        if composition.is_active() {
            return compose_key(event, state, composition);
        }

        if let (KeyState::Pressed | KeyState::Repeated, KeyChar::CombiningAccent(accent)) =
            (state, event.character)
        {
            return KeyOutcome::Text(composition.start_accent(accent));
        }

        let text = match event.character {
            KeyChar::Unicode(ch) => Some(ch),
            _ => None,
        };
        let key = key_from_code(event.key_code, text);
        if key == Key::Unknown {
            trace!(key_code = event.key_code, "ignoring unmapped key");
            return KeyOutcome::Ignored;
        }

        KeyOutcome::Key(KeyboardEvent {
            key,
            state,
            modifiers: modifiers_from_meta(event.meta_state),
            text: if state == KeyState::Released {
                None
            } else {
                text
            },
        })
    }

    /// Translate a motion record for the primary pointer
    ///
    /// Secondary pointers and actions without a pointer meaning give `None`.
    pub fn translate_motion(&mut self, event: &NativeMotionEvent) -> Option<MouseEvent> {
        if event.pointer_index != 0 {
            trace!(index = event.pointer_index, "ignoring secondary pointer");
            return None;
        }
        let x = event.x.round() as i32;
        let y = event.y.round() as i32;
        let contact = is_contact(event.source);
        let held = buttons_from_state(event.button_state);

        let translated = match event.action {
            MotionAction::Down => {
                let button = if contact {
                    MouseButton::Left
                } else {
                    lowest_button(held).unwrap_or(MouseButton::Left)
                };
                self.buttons = held | button.mask();
                Some(MouseEvent::ButtonPressed {
                    button,
                    x,
                    y,
                    buttons: self.buttons,
                })
            }
            MotionAction::Up => {
                let released = if contact {
                    self.buttons
                } else {
                    self.buttons.difference(held)
                };
                if released.is_empty() && !contact {
                    // Already reported through ButtonRelease
                    None
                } else {
                    let button = lowest_button(released).unwrap_or(MouseButton::Left);
                    self.buttons = if contact {
                        MouseButtons::empty()
                    } else {
                        held
                    };
                    Some(MouseEvent::ButtonReleased {
                        button,
                        x,
                        y,
                        buttons: self.buttons,
                    })
                }
            }
            MotionAction::ButtonPress => {
                let button = lowest_button(buttons_from_state(event.action_button))?;
                if self.buttons.contains(button.mask()) {
                    None
                } else {
                    self.buttons |= button.mask();
                    Some(MouseEvent::ButtonPressed {
                        button,
                        x,
                        y,
                        buttons: self.buttons,
                    })
                }
            }
            MotionAction::ButtonRelease => {
                let button = lowest_button(buttons_from_state(event.action_button))?;
                if self.buttons.contains(button.mask()) {
                    self.buttons.remove(button.mask());
                    Some(MouseEvent::ButtonReleased {
                        button,
                        x,
                        y,
                        buttons: self.buttons,
                    })
                } else {
                    None
                }
            }
            MotionAction::Move => Some(MouseEvent::Moved {
                x,
                y,
                buttons: self.buttons,
            }),
            MotionAction::HoverMove => Some(MouseEvent::Moved {
                x,
                y,
                buttons: MouseButtons::empty(),
            }),
            MotionAction::HoverEnter => Some(MouseEvent::Entered { x, y }),
            MotionAction::HoverExit => Some(MouseEvent::Left { x, y }),
            MotionAction::Scroll => Some(MouseEvent::Scroll {
                x,
                y,
                delta_x: event.scroll_x,
                delta_y: event.scroll_y,
            }),
            MotionAction::Cancel => {
                if self.buttons.is_empty() {
                    None
                } else {
                    let button = lowest_button(self.buttons).unwrap_or(MouseButton::Left);
                    self.buttons = MouseButtons::empty();
                    Some(MouseEvent::ButtonReleased {
                        button,
                        x,
                        y,
                        buttons: self.buttons,
                    })
                }
            }
            MotionAction::Outside
            | MotionAction::PointerDown
            | MotionAction::PointerUp
            | MotionAction::Unknown(_) => {
                trace!(action = ?event.action, "ignoring motion action");
                None
            }
        };

        if translated.is_some() {
            self.last_pointer = (x, y);
        }
        translated
    }

    /// Translate an input-method text record into a composition step
    pub fn translate_text(
        &mut self,
        event: &NativeTextEvent<'_>,
        composition: &mut CompositionState,
    ) -> TextInput {
        if event.composing {
            composition.update(event.text)
        } else {
            composition.commit(event.text)
        }
    }
}

/// Route a key to the active composition
fn compose_key(
    event: &NativeKeyEvent,
    state: KeyState,
    composition: &mut CompositionState,
) -> KeyOutcome {
    if state == KeyState::Released {
        return KeyOutcome::Swallowed;
    }
    match (event.key_code, event.character) {
        (keycode::ENTER | keycode::NUMPAD_ENTER, _) => {
            let text = composition.composed().to_string();
            KeyOutcome::Text(composition.commit(&text))
        }
        (keycode::ESCAPE, _) => KeyOutcome::Text(composition.cancel()),
        (keycode::DEL, _) => KeyOutcome::Text(composition.backspace()),
        (_, KeyChar::Unicode(ch)) => KeyOutcome::Text(composition.push_char(ch)),
        (_, KeyChar::CombiningAccent(accent)) => KeyOutcome::Text(composition.start_accent(accent)),
        _ => KeyOutcome::Swallowed,
    }
}

/// Fingers and styluses report no buttons while in contact
fn is_contact(source: MotionSource) -> bool {
    matches!(source, MotionSource::Touchscreen | MotionSource::Stylus)
}

fn buttons_from_state(state: u32) -> MouseButtons {
    let mut buttons = MouseButtons::empty();
    if state & button::PRIMARY != 0 {
        buttons |= MouseButtons::PRIMARY;
    }
    if state & (button::SECONDARY | button::STYLUS_PRIMARY) != 0 {
        buttons |= MouseButtons::SECONDARY;
    }
    if state & (button::TERTIARY | button::STYLUS_SECONDARY) != 0 {
        buttons |= MouseButtons::TERTIARY;
    }
    if state & button::BACK != 0 {
        buttons |= MouseButtons::BACK;
    }
    if state & button::FORWARD != 0 {
        buttons |= MouseButtons::FORWARD;
    }
    buttons
}

fn lowest_button(buttons: MouseButtons) -> Option<MouseButton> {
    [
        MouseButton::Left,
        MouseButton::Right,
        MouseButton::Middle,
        MouseButton::Back,
        MouseButton::Forward,
    ]
    .into_iter()
    .find(|button| buttons.contains(button.mask()))
}

/// Convert `AMETA_*` bits to toolkit modifiers
pub fn modifiers_from_meta(meta_state: u32) -> Modifiers {
    Modifiers {
        shift: meta_state & meta::SHIFT_ON != 0,
        ctrl: meta_state & meta::CTRL_ON != 0,
        alt: meta_state & meta::ALT_ON != 0,
        meta: meta_state & meta::META_ON != 0,
        caps_lock: meta_state & meta::CAPS_LOCK_ON != 0,
        num_lock: meta_state & meta::NUM_LOCK_ON != 0,
    }
}

const LETTERS: [Key; 26] = [
    Key::A,
    Key::B,
    Key::C,
    Key::D,
    Key::E,
    Key::F,
    Key::G,
    Key::H,
    Key::I,
    Key::J,
    Key::K,
    Key::L,
    Key::M,
    Key::N,
    Key::O,
    Key::P,
    Key::Q,
    Key::R,
    Key::S,
    Key::T,
    Key::U,
    Key::V,
    Key::W,
    Key::X,
    Key::Y,
    Key::Z,
];

const DIGITS: [Key; 10] = [
    Key::Num0,
    Key::Num1,
    Key::Num2,
    Key::Num3,
    Key::Num4,
    Key::Num5,
    Key::Num6,
    Key::Num7,
    Key::Num8,
    Key::Num9,
];

const KEYPAD: [Key; 10] = [
    Key::Keypad0,
    Key::Keypad1,
    Key::Keypad2,
    Key::Keypad3,
    Key::Keypad4,
    Key::Keypad5,
    Key::Keypad6,
    Key::Keypad7,
    Key::Keypad8,
    Key::Keypad9,
];

const FUNCTION: [Key; 12] = [
    Key::F1,
    Key::F2,
    Key::F3,
    Key::F4,
    Key::F5,
    Key::F6,
    Key::F7,
    Key::F8,
    Key::F9,
    Key::F10,
    Key::F11,
    Key::F12,
];

/// Map an `AKEYCODE_*` value to a key symbol
///
/// Codes without a named symbol become [`Key::Char`] when they produced a
/// character, and [`Key::Unknown`] otherwise.
pub fn key_from_code(code: u32, text: Option<char>) -> Key {
    match code {
        keycode::A..=keycode::Z => LETTERS[(code - keycode::A) as usize],
        keycode::NUM_0..=keycode::NUM_9 => DIGITS[(code - keycode::NUM_0) as usize],
        keycode::NUMPAD_0..=keycode::NUMPAD_9 => KEYPAD[(code - keycode::NUMPAD_0) as usize],
        keycode::F1..=keycode::F12 => FUNCTION[(code - keycode::F1) as usize],
        keycode::BACK => Key::Back,
        keycode::DPAD_UP => Key::Up,
        keycode::DPAD_DOWN => Key::Down,
        keycode::DPAD_LEFT => Key::Left,
        keycode::DPAD_RIGHT => Key::Right,
        keycode::VOLUME_UP => Key::VolumeUp,
        keycode::VOLUME_DOWN => Key::VolumeDown,
        keycode::VOLUME_MUTE => Key::VolumeMute,
        keycode::COMMA => Key::Comma,
        keycode::PERIOD => Key::Period,
        keycode::ALT_LEFT | keycode::ALT_RIGHT => Key::Alt,
        keycode::SHIFT_LEFT | keycode::SHIFT_RIGHT => Key::Shift,
        keycode::CTRL_LEFT | keycode::CTRL_RIGHT => Key::Ctrl,
        keycode::META_LEFT | keycode::META_RIGHT => Key::Meta,
        keycode::TAB => Key::Tab,
        keycode::SPACE => Key::Space,
        keycode::ENTER => Key::Enter,
        keycode::NUMPAD_ENTER => Key::KeypadEnter,
        keycode::DEL => Key::Backspace,
        keycode::FORWARD_DEL => Key::Delete,
        keycode::GRAVE => Key::Grave,
        keycode::MINUS => Key::Minus,
        keycode::EQUALS => Key::Equals,
        keycode::LEFT_BRACKET => Key::LeftBracket,
        keycode::RIGHT_BRACKET => Key::RightBracket,
        keycode::BACKSLASH => Key::Backslash,
        keycode::SEMICOLON => Key::Semicolon,
        keycode::APOSTROPHE => Key::Quote,
        keycode::SLASH => Key::Slash,
        keycode::MENU => Key::Menu,
        keycode::SEARCH => Key::Search,
        keycode::PAGE_UP => Key::PageUp,
        keycode::PAGE_DOWN => Key::PageDown,
        keycode::ESCAPE => Key::Escape,
        keycode::CAPS_LOCK => Key::CapsLock,
        keycode::SCROLL_LOCK => Key::ScrollLock,
        keycode::NUM_LOCK => Key::NumLock,
        keycode::SYSRQ => Key::Print,
        keycode::BREAK => Key::Pause,
        keycode::MOVE_HOME => Key::Home,
        keycode::MOVE_END => Key::End,
        keycode::INSERT => Key::Insert,
        _ => match text {
            Some(ch) => Key::Char(ch),
            None => Key::Unknown,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::ComposeStatus;

    fn press(code: u32, ch: char) -> NativeKeyEvent {
        NativeKeyEvent::down(code).with_char(KeyChar::Unicode(ch))
    }

    #[test]
    fn test_key_press_repeat_release() {
        let mut translator = InputTranslator::new();
        let mut composition = CompositionState::default();

        let down = press(keycode::A, 'A').with_meta(meta::SHIFT_ON);
        match translator.translate_key(&down, &mut composition) {
            KeyOutcome::Key(event) => {
                assert_eq!(event.key, Key::A);
                assert_eq!(event.state, KeyState::Pressed);
                assert_eq!(event.text, Some('A'));
                assert!(event.modifiers.shift_only());
            }
            other => panic!("unexpected {other:?}"),
        }

        let repeat = press(keycode::A, 'a').with_repeat(3);
        assert!(matches!(
            translator.translate_key(&repeat, &mut composition),
            KeyOutcome::Key(KeyboardEvent { state: KeyState::Repeated, .. })
        ));

        let up = NativeKeyEvent::up(keycode::A).with_char(KeyChar::Unicode('a'));
        match translator.translate_key(&up, &mut composition) {
            KeyOutcome::Key(event) => {
                assert_eq!(event.state, KeyState::Released);
                assert_eq!(event.text, None);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_unmapped_key_is_ignored_unless_it_has_text() {
        let mut translator = InputTranslator::new();
        let mut composition = CompositionState::default();

        let silent = NativeKeyEvent::down(250);
        assert_eq!(
            translator.translate_key(&silent, &mut composition),
            KeyOutcome::Ignored
        );

        let at_sign = press(77, '@');
        assert!(matches!(
            translator.translate_key(&at_sign, &mut composition),
            KeyOutcome::Key(KeyboardEvent { key: Key::Char('@'), .. })
        ));

        let unknown_action = NativeKeyEvent {
            action: KeyAction::Unknown(9),
            ..NativeKeyEvent::down(keycode::A)
        };
        assert_eq!(
            translator.translate_key(&unknown_action, &mut composition),
            KeyOutcome::Ignored
        );
    }

    #[test]
    fn test_dead_key_routes_following_keys_to_composition() {
        let mut translator = InputTranslator::new();
        let mut composition = CompositionState::default();

        let accent = NativeKeyEvent::down(keycode::GRAVE).with_char(KeyChar::CombiningAccent('\u{300}'));
        assert!(matches!(
            translator.translate_key(&accent, &mut composition),
            KeyOutcome::Text(TextInput { status: ComposeStatus::Update, .. })
        ));
        assert!(composition.is_active());

        // The release of the dead key is swallowed, not dispatched
        let accent_up = NativeKeyEvent::up(keycode::GRAVE);
        assert_eq!(
            translator.translate_key(&accent_up, &mut composition),
            KeyOutcome::Swallowed
        );

        match translator.translate_key(&press(keycode::A + 4, 'e'), &mut composition) {
            KeyOutcome::Text(text) => {
                assert_eq!(text.text, "è");
                assert_eq!(text.deletion, 1);
                assert_eq!(text.status, ComposeStatus::Commit);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(!composition.is_active());
    }

    #[test]
    fn test_multiple_record_extends_active_composition() {
        let mut translator = InputTranslator::new();
        let mut composition = CompositionState::default();
        composition.update("ka");

        let multiple = NativeKeyEvent {
            action: KeyAction::Multiple,
            ..NativeKeyEvent::down(keycode::UNKNOWN).with_char(KeyChar::Unicode('x'))
        };
        match translator.translate_key(&multiple, &mut composition) {
            KeyOutcome::Text(text) => {
                assert_eq!(text.text, "kax");
                assert_eq!(text.deletion, 2);
                assert_eq!(text.status, ComposeStatus::Update);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(composition.composed(), "kax");

        composition.reset();
        match translator.translate_key(&multiple, &mut composition) {
            KeyOutcome::Text(text) => {
                assert_eq!(text.text, "x");
                assert_eq!(text.status, ComposeStatus::Commit);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_composition_swallows_navigation_keys() {
        let mut translator = InputTranslator::new();
        let mut composition = CompositionState::default();
        composition.update("ka");

        let left = NativeKeyEvent::down(keycode::DPAD_LEFT);
        assert_eq!(
            translator.translate_key(&left, &mut composition),
            KeyOutcome::Swallowed
        );

        let enter = NativeKeyEvent::down(keycode::ENTER);
        match translator.translate_key(&enter, &mut composition) {
            KeyOutcome::Text(text) => {
                assert_eq!((text.text.as_str(), text.deletion), ("ka", 2));
                assert_eq!(text.status, ComposeStatus::Commit);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_touch_sequence() {
        let mut translator = InputTranslator::new();
        let touch = MotionSource::Touchscreen;

        let down = NativeMotionEvent::new(MotionAction::Down, touch, 10.4, 20.6);
        assert_eq!(
            translator.translate_motion(&down),
            Some(MouseEvent::ButtonPressed {
                button: MouseButton::Left,
                x: 10,
                y: 21,
                buttons: MouseButtons::PRIMARY,
            })
        );

        let drag = NativeMotionEvent::new(MotionAction::Move, touch, 15.0, 25.0);
        assert_eq!(
            translator.translate_motion(&drag),
            Some(MouseEvent::Moved {
                x: 15,
                y: 25,
                buttons: MouseButtons::PRIMARY,
            })
        );

        let up = NativeMotionEvent::new(MotionAction::Up, touch, 15.0, 25.0);
        assert_eq!(
            translator.translate_motion(&up),
            Some(MouseEvent::ButtonReleased {
                button: MouseButton::Left,
                x: 15,
                y: 25,
                buttons: MouseButtons::empty(),
            })
        );
        assert_eq!(translator.last_pointer(), (15, 25));
    }

    #[test]
    fn test_mouse_button_press_is_not_reported_twice() {
        let mut translator = InputTranslator::new();
        let mouse = MotionSource::Mouse;

        let down = NativeMotionEvent::new(MotionAction::Down, mouse, 1.0, 1.0)
            .with_buttons(button::SECONDARY);
        assert!(matches!(
            translator.translate_motion(&down),
            Some(MouseEvent::ButtonPressed { button: MouseButton::Right, .. })
        ));

        let press = NativeMotionEvent::new(MotionAction::ButtonPress, mouse, 1.0, 1.0)
            .with_buttons(button::SECONDARY)
            .with_action_button(button::SECONDARY);
        assert_eq!(translator.translate_motion(&press), None);

        let release = NativeMotionEvent::new(MotionAction::ButtonRelease, mouse, 2.0, 2.0)
            .with_action_button(button::SECONDARY);
        assert!(matches!(
            translator.translate_motion(&release),
            Some(MouseEvent::ButtonReleased { button: MouseButton::Right, .. })
        ));

        let up = NativeMotionEvent::new(MotionAction::Up, mouse, 2.0, 2.0);
        assert_eq!(translator.translate_motion(&up), None);
        assert!(translator.buttons().is_empty());
    }

    #[test]
    fn test_secondary_pointer_and_unknown_actions_are_ignored() {
        let mut translator = InputTranslator::new();
        let second = NativeMotionEvent::new(MotionAction::Move, MotionSource::Touchscreen, 5.0, 5.0)
            .with_pointer_index(1);
        assert_eq!(translator.translate_motion(&second), None);

        let odd = NativeMotionEvent::new(
            MotionAction::Unknown(99),
            MotionSource::Touchscreen,
            5.0,
            5.0,
        );
        assert_eq!(translator.translate_motion(&odd), None);
        assert_eq!(translator.last_pointer(), (0, 0));
    }

    #[test]
    fn test_scroll_and_hover() {
        let mut translator = InputTranslator::new();
        let scroll = NativeMotionEvent::new(MotionAction::Scroll, MotionSource::Mouse, 3.0, 4.0)
            .with_scroll(0.0, -1.0);
        assert_eq!(
            translator.translate_motion(&scroll),
            Some(MouseEvent::Scroll {
                x: 3,
                y: 4,
                delta_x: 0.0,
                delta_y: -1.0,
            })
        );

        let hover = NativeMotionEvent::new(MotionAction::HoverMove, MotionSource::Mouse, 8.0, 9.0);
        assert_eq!(
            translator.translate_motion(&hover),
            Some(MouseEvent::Moved {
                x: 8,
                y: 9,
                buttons: MouseButtons::empty(),
            })
        );
    }

    #[test]
    fn test_key_table() {
        assert_eq!(key_from_code(keycode::NUM_0 + 7, None), Key::Num7);
        assert_eq!(key_from_code(keycode::NUMPAD_0 + 2, None), Key::Keypad2);
        assert_eq!(key_from_code(keycode::F1 + 11, None), Key::F12);
        assert_eq!(key_from_code(keycode::Z, None), Key::Z);
        assert_eq!(key_from_code(keycode::DEL, None), Key::Backspace);
        assert_eq!(key_from_code(keycode::FORWARD_DEL, None), Key::Delete);
    }

    #[test]
    fn test_text_records_update_then_commit() {
        let mut translator = InputTranslator::new();
        let mut composition = CompositionState::default();

        let composing = NativeTextEvent {
            text: "sh",
            composing: true,
        };
        let first = translator.translate_text(&composing, &mut composition);
        assert_eq!(first.status, ComposeStatus::Update);

        let done = NativeTextEvent {
            text: "she",
            composing: false,
        };
        let committed = translator.translate_text(&done, &mut composition);
        assert_eq!(committed.deletion, 2);
        assert_eq!(committed.status, ComposeStatus::Commit);
        assert!(!composition.is_active());
    }
}
