//! Native input records
//!
//! Host input events as the event source hands them to the translator. The
//! numeric conventions (key codes, meta-state bits, button bits, action codes)
//! follow the Android NDK input API, which the Android backend passes through
//! unchanged; other backends produce the same codes.
//!
//! A record is borrowed for the duration of one dispatch call and never
//! stored. The dispatch closure acknowledges it by returning whether it was
//! consumed.

/// One host input event
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NativeInputEvent<'a> {
    /// Hardware or soft keyboard key
    Key(NativeKeyEvent),
    /// Pointer motion, button, or scroll
    Motion(NativeMotionEvent),
    /// Input-method text state
    Text(NativeTextEvent<'a>),
    /// An event kind the bridge does not know about
    Unknown(u32),
}

// ============================================================================
// Keys
// ============================================================================

/// Key action (`AKEY_EVENT_ACTION_*`)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    Down,
    Up,
    Multiple,
    Unknown(u32),
}

impl KeyAction {
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            0 => KeyAction::Down,
            1 => KeyAction::Up,
            2 => KeyAction::Multiple,
            other => KeyAction::Unknown(other),
        }
    }
}

/// Character a key maps to under the current meta state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyChar {
    /// Key produces no character
    #[default]
    None,
    /// Key produces a character
    Unicode(char),
    /// Dead key: the accent combines with the next character
    CombiningAccent(char),
}

/// Key event record
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NativeKeyEvent {
    pub action: KeyAction,
    /// `AKEYCODE_*` value
    pub key_code: u32,
    /// `AMETA_*` bits
    pub meta_state: u32,
    /// Number of auto-repeats so far; 0 for the initial press
    pub repeat_count: u32,
    pub character: KeyChar,
}

impl NativeKeyEvent {
    /// Initial key press without a character
    pub fn down(key_code: u32) -> Self {
        Self {
            action: KeyAction::Down,
            key_code,
            meta_state: 0,
            repeat_count: 0,
            character: KeyChar::None,
        }
    }

    /// Key release without a character
    pub fn up(key_code: u32) -> Self {
        Self {
            action: KeyAction::Up,
            ..Self::down(key_code)
        }
    }

    /// Attach the produced character
    pub fn with_char(mut self, character: KeyChar) -> Self {
        self.character = character;
        self
    }

    /// Attach meta-state bits
    pub fn with_meta(mut self, meta_state: u32) -> Self {
        self.meta_state = meta_state;
        self
    }

    /// Mark as an auto-repeat
    pub fn with_repeat(mut self, repeat_count: u32) -> Self {
        self.repeat_count = repeat_count;
        self
    }
}

/// `AKEYCODE_*` values the translator understands
pub mod keycode {
    pub const UNKNOWN: u32 = 0;
    pub const BACK: u32 = 4;
    pub const NUM_0: u32 = 7;
    pub const NUM_9: u32 = 16;
    pub const DPAD_UP: u32 = 19;
    pub const DPAD_DOWN: u32 = 20;
    pub const DPAD_LEFT: u32 = 21;
    pub const DPAD_RIGHT: u32 = 22;
    pub const VOLUME_UP: u32 = 24;
    pub const VOLUME_DOWN: u32 = 25;
    pub const A: u32 = 29;
    pub const B: u32 = 30;
    pub const Z: u32 = 54;
    pub const COMMA: u32 = 55;
    pub const PERIOD: u32 = 56;
    pub const ALT_LEFT: u32 = 57;
    pub const ALT_RIGHT: u32 = 58;
    pub const SHIFT_LEFT: u32 = 59;
    pub const SHIFT_RIGHT: u32 = 60;
    pub const TAB: u32 = 61;
    pub const SPACE: u32 = 62;
    pub const ENTER: u32 = 66;
    pub const DEL: u32 = 67;
    pub const GRAVE: u32 = 68;
    pub const MINUS: u32 = 69;
    pub const EQUALS: u32 = 70;
    pub const LEFT_BRACKET: u32 = 71;
    pub const RIGHT_BRACKET: u32 = 72;
    pub const BACKSLASH: u32 = 73;
    pub const SEMICOLON: u32 = 74;
    pub const APOSTROPHE: u32 = 75;
    pub const SLASH: u32 = 76;
    pub const MENU: u32 = 82;
    pub const SEARCH: u32 = 84;
    pub const PAGE_UP: u32 = 92;
    pub const PAGE_DOWN: u32 = 93;
    pub const ESCAPE: u32 = 111;
    pub const FORWARD_DEL: u32 = 112;
    pub const CTRL_LEFT: u32 = 113;
    pub const CTRL_RIGHT: u32 = 114;
    pub const CAPS_LOCK: u32 = 115;
    pub const SCROLL_LOCK: u32 = 116;
    pub const META_LEFT: u32 = 117;
    pub const META_RIGHT: u32 = 118;
    pub const SYSRQ: u32 = 120;
    pub const BREAK: u32 = 121;
    pub const MOVE_HOME: u32 = 122;
    pub const MOVE_END: u32 = 123;
    pub const INSERT: u32 = 124;
    pub const F1: u32 = 131;
    pub const F12: u32 = 142;
    pub const NUM_LOCK: u32 = 143;
    pub const NUMPAD_0: u32 = 144;
    pub const NUMPAD_9: u32 = 153;
    pub const NUMPAD_ENTER: u32 = 160;
    pub const VOLUME_MUTE: u32 = 164;
}

/// `AMETA_*` bits
pub mod meta {
    pub const SHIFT_ON: u32 = 0x01;
    pub const ALT_ON: u32 = 0x02;
    pub const FUNCTION_ON: u32 = 0x08;
    pub const CTRL_ON: u32 = 0x1000;
    pub const META_ON: u32 = 0x10000;
    pub const CAPS_LOCK_ON: u32 = 0x100000;
    pub const NUM_LOCK_ON: u32 = 0x200000;
}

// ============================================================================
// Motion
// ============================================================================

/// Motion action (`AMOTION_EVENT_ACTION_*`, masked)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MotionAction {
    Down,
    Up,
    Move,
    Cancel,
    Outside,
    PointerDown,
    PointerUp,
    HoverMove,
    Scroll,
    HoverEnter,
    HoverExit,
    ButtonPress,
    ButtonRelease,
    Unknown(u32),
}

impl MotionAction {
    pub fn from_raw(raw: u32) -> Self {
        match raw & 0xff {
            0 => MotionAction::Down,
            1 => MotionAction::Up,
            2 => MotionAction::Move,
            3 => MotionAction::Cancel,
            4 => MotionAction::Outside,
            5 => MotionAction::PointerDown,
            6 => MotionAction::PointerUp,
            7 => MotionAction::HoverMove,
            8 => MotionAction::Scroll,
            9 => MotionAction::HoverEnter,
            10 => MotionAction::HoverExit,
            11 => MotionAction::ButtonPress,
            12 => MotionAction::ButtonRelease,
            other => MotionAction::Unknown(other),
        }
    }
}

/// Device class that produced a motion event
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MotionSource {
    #[default]
    Touchscreen,
    Mouse,
    Stylus,
    Trackball,
    Touchpad,
    Other,
}

impl MotionSource {
    /// Classify an `AINPUT_SOURCE_*` value
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            source::TOUCHSCREEN => MotionSource::Touchscreen,
            source::MOUSE | source::MOUSE_RELATIVE => MotionSource::Mouse,
            source::STYLUS | source::BLUETOOTH_STYLUS => MotionSource::Stylus,
            source::TRACKBALL => MotionSource::Trackball,
            source::TOUCHPAD => MotionSource::Touchpad,
            _ => MotionSource::Other,
        }
    }
}

/// `AINPUT_SOURCE_*` values
pub mod source {
    pub const TOUCHSCREEN: u32 = 0x1002;
    pub const MOUSE: u32 = 0x2002;
    pub const STYLUS: u32 = 0x4002;
    pub const BLUETOOTH_STYLUS: u32 = 0xc002;
    pub const TRACKBALL: u32 = 0x10004;
    pub const MOUSE_RELATIVE: u32 = 0x20004;
    pub const TOUCHPAD: u32 = 0x100008;
}

/// `AMOTION_EVENT_BUTTON_*` bits
pub mod button {
    pub const PRIMARY: u32 = 0x01;
    pub const SECONDARY: u32 = 0x02;
    pub const TERTIARY: u32 = 0x04;
    pub const BACK: u32 = 0x08;
    pub const FORWARD: u32 = 0x10;
    pub const STYLUS_PRIMARY: u32 = 0x20;
    pub const STYLUS_SECONDARY: u32 = 0x40;
}

/// Motion event record for the pointer the action refers to
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NativeMotionEvent {
    pub action: MotionAction,
    pub source: MotionSource,
    /// Index of the pointer the action refers to; 0 is the primary pointer
    pub pointer_index: usize,
    /// Device-pixel position, origin top left
    pub x: f32,
    pub y: f32,
    /// `AMOTION_EVENT_BUTTON_*` bits held
    pub button_state: u32,
    /// Button that changed for `ButtonPress`/`ButtonRelease`
    pub action_button: u32,
    /// Scroll axes, set for `Scroll`
    pub scroll_x: f32,
    pub scroll_y: f32,
    /// `AMETA_*` bits
    pub meta_state: u32,
}

impl NativeMotionEvent {
    /// Primary-pointer event at a position, with no buttons
    pub fn new(action: MotionAction, source: MotionSource, x: f32, y: f32) -> Self {
        Self {
            action,
            source,
            pointer_index: 0,
            x,
            y,
            button_state: 0,
            action_button: 0,
            scroll_x: 0.0,
            scroll_y: 0.0,
            meta_state: 0,
        }
    }

    /// Attach held buttons
    pub fn with_buttons(mut self, button_state: u32) -> Self {
        self.button_state = button_state;
        self
    }

    /// Attach the button that changed
    pub fn with_action_button(mut self, action_button: u32) -> Self {
        self.action_button = action_button;
        self
    }

    /// Attach scroll deltas
    pub fn with_scroll(mut self, scroll_x: f32, scroll_y: f32) -> Self {
        self.scroll_x = scroll_x;
        self.scroll_y = scroll_y;
        self
    }

    /// Refer to a secondary pointer
    pub fn with_pointer_index(mut self, pointer_index: usize) -> Self {
        self.pointer_index = pointer_index;
        self
    }
}

// ============================================================================
// Text
// ============================================================================

/// Input-method text record
///
/// `text` is the composing region while `composing` is true, and the
/// committed text otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NativeTextEvent<'a> {
    pub text: &'a str,
    pub composing: bool,
}
