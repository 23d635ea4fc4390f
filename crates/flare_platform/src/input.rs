//! Toolkit-level input events for keyboard, pointer, and text entry

use crate::keyboard::ComposeStatus;
use bitflags::bitflags;

/// Input events delivered to windows
#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    /// Pointer event
    Mouse(MouseEvent),
    /// Keyboard event
    Keyboard(KeyboardEvent),
    /// Text produced by an input method or a composed dead key
    Text(TextInput),
}

impl InputEvent {
    /// Pointer position for events that have one
    pub fn position(&self) -> Option<(i32, i32)> {
        match self {
            InputEvent::Mouse(event) => Some(event.position()),
            _ => None,
        }
    }
}

// ============================================================================
// Mouse Events
// ============================================================================

bitflags! {
    /// Buttons held while a pointer event happened
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct MouseButtons: u8 {
        /// Left button, or a finger/stylus in contact
        const PRIMARY = 0x01;
        /// Right button
        const SECONDARY = 0x02;
        /// Middle button
        const TERTIARY = 0x04;
        /// Back side button
        const BACK = 0x08;
        /// Forward side button
        const FORWARD = 0x10;
    }
}

/// Pointer events
///
/// Coordinates are device pixels with the origin at the top left of the
/// screen.
#[derive(Clone, Debug, PartialEq)]
pub enum MouseEvent {
    /// Pointer moved; `buttons` is empty for hover and non-empty for drags
    Moved { x: i32, y: i32, buttons: MouseButtons },
    /// Button pressed
    ButtonPressed {
        button: MouseButton,
        x: i32,
        y: i32,
        /// Buttons held after the press
        buttons: MouseButtons,
    },
    /// Button released
    ButtonReleased {
        button: MouseButton,
        x: i32,
        y: i32,
        /// Buttons still held after the release
        buttons: MouseButtons,
    },
    /// Wheel or trackball scroll
    Scroll {
        x: i32,
        y: i32,
        delta_x: f32,
        delta_y: f32,
    },
    /// Hovering pointer entered the screen
    Entered { x: i32, y: i32 },
    /// Hovering pointer left the screen
    Left { x: i32, y: i32 },
}

impl MouseEvent {
    /// Position of the pointer for this event
    pub fn position(&self) -> (i32, i32) {
        match *self {
            MouseEvent::Moved { x, y, .. }
            | MouseEvent::ButtonPressed { x, y, .. }
            | MouseEvent::ButtonReleased { x, y, .. }
            | MouseEvent::Scroll { x, y, .. }
            | MouseEvent::Entered { x, y }
            | MouseEvent::Left { x, y } => (x, y),
        }
    }
}

/// Mouse buttons
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button (also a touch contact)
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button (scroll wheel click)
    Middle,
    /// Back button (side button)
    Back,
    /// Forward button (side button)
    Forward,
}

impl MouseButton {
    /// Mask bit for this button
    pub fn mask(self) -> MouseButtons {
        match self {
            MouseButton::Left => MouseButtons::PRIMARY,
            MouseButton::Right => MouseButtons::SECONDARY,
            MouseButton::Middle => MouseButtons::TERTIARY,
            MouseButton::Back => MouseButtons::BACK,
            MouseButton::Forward => MouseButtons::FORWARD,
        }
    }
}

// ============================================================================
// Keyboard Events
// ============================================================================

/// Keyboard event
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyboardEvent {
    /// The key that changed state
    pub key: Key,
    /// Press, release or auto-repeat
    pub state: KeyState,
    /// Modifier keys held during this event
    pub modifiers: Modifiers,
    /// Character produced by the key, if any
    pub text: Option<char>,
}

/// Key press/release state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyState {
    /// Key was pressed
    Pressed,
    /// Key is held and auto-repeating
    Repeated,
    /// Key was released
    Released,
}

/// Modifier key state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    /// Shift key is held
    pub shift: bool,
    /// Control key is held
    pub ctrl: bool,
    /// Alt key is held
    pub alt: bool,
    /// Meta key is held
    pub meta: bool,
    /// Caps lock is on
    pub caps_lock: bool,
    /// Num lock is on
    pub num_lock: bool,
}

impl Modifiers {
    /// Check if no modifier keys are held (lock states are ignored)
    pub fn is_empty(&self) -> bool {
        !self.shift && !self.ctrl && !self.alt && !self.meta
    }

    /// Check if only shift is held
    pub fn shift_only(&self) -> bool {
        self.shift && !self.ctrl && !self.alt && !self.meta
    }

    /// Check if only ctrl is held
    pub fn ctrl_only(&self) -> bool {
        !self.shift && self.ctrl && !self.alt && !self.meta
    }
}

/// Key symbols
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    // Letters
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,

    // Numbers
    Num0,
    Num1,
    Num2,
    Num3,
    Num4,
    Num5,
    Num6,
    Num7,
    Num8,
    Num9,

    // Keypad
    Keypad0,
    Keypad1,
    Keypad2,
    Keypad3,
    Keypad4,
    Keypad5,
    Keypad6,
    Keypad7,
    Keypad8,
    Keypad9,
    KeypadEnter,

    // Function keys
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,

    // Special keys
    Space,
    Enter,
    Escape,
    Backspace,
    Tab,
    Delete,
    Insert,
    Home,
    End,
    PageUp,
    PageDown,
    Print,
    Pause,
    CapsLock,
    NumLock,
    ScrollLock,
    Menu,

    // Arrow keys
    Left,
    Right,
    Up,
    Down,

    // Modifier keys (for tracking state)
    Shift,
    Ctrl,
    Alt,
    Meta,

    // Punctuation and symbols
    Minus,
    Equals,
    LeftBracket,
    RightBracket,
    Backslash,
    Semicolon,
    Quote,
    Comma,
    Period,
    Slash,
    Grave,

    // Device keys
    Back,
    Search,
    VolumeUp,
    VolumeDown,
    VolumeMute,

    // Key without a named symbol that still produced a character
    Char(char),

    // Unknown key
    Unknown,
}

// ============================================================================
// Text Input
// ============================================================================

/// Text produced by an input method
///
/// Before inserting `text`, the receiver deletes `deletion` characters
/// preceding the cursor. While `status` is [`ComposeStatus::Update`] the text is
/// provisional and will be replaced by the next text event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextInput {
    /// Text to insert
    pub text: String,
    /// Characters to delete before inserting
    pub deletion: usize,
    /// Whether this is an in-progress composition or a commit
    pub status: ComposeStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_masks_are_distinct() {
        let all = [
            MouseButton::Left,
            MouseButton::Right,
            MouseButton::Middle,
            MouseButton::Back,
            MouseButton::Forward,
        ];
        let combined = all
            .iter()
            .fold(MouseButtons::empty(), |acc, button| acc | button.mask());
        assert_eq!(combined, MouseButtons::all());
    }

    #[test]
    fn test_modifiers_ignore_lock_state() {
        let mods = Modifiers {
            caps_lock: true,
            ..Default::default()
        };
        assert!(mods.is_empty());
        let shifted = Modifiers {
            shift: true,
            num_lock: true,
            ..Default::default()
        };
        assert!(shifted.shift_only());
    }
}
