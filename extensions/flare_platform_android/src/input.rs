//! Conversion of android-activity input events into native records
//!
//! The NDK numeric values pass through unchanged; `flare_platform::native`
//! interprets them.

use flare_platform::native::MotionAction;

#[cfg(target_os = "android")]
use android_activity::input::{Axis, KeyCharacterMap, KeyEvent, KeyMapChar, MotionEvent};
#[cfg(target_os = "android")]
use android_activity::AndroidApp;
#[cfg(target_os = "android")]
use flare_platform::native::{KeyAction, KeyChar, MotionSource, NativeKeyEvent, NativeMotionEvent};
#[cfg(target_os = "android")]
use std::collections::HashMap;
#[cfg(target_os = "android")]
use tracing::warn;

/// Button that changed between two `AMOTION_EVENT_BUTTON_*` states
///
/// The NDK reports only the buttons held; the changed one is the difference
/// from the previous motion event.
pub fn changed_button(action: MotionAction, previous: u32, current: u32) -> u32 {
    match action {
        MotionAction::ButtonPress => current & !previous,
        MotionAction::ButtonRelease => previous & !current,
        _ => 0,
    }
}

/// Text an input-method state update contributes
///
/// With a compose region the region's characters are provisional; without
/// one the whole buffer is committed.
pub fn composition_text(text: &str, compose_region: Option<(usize, usize)>) -> (String, bool) {
    match compose_region {
        Some((start, end)) => {
            let (start, end) = (start.min(end), start.max(end));
            let composing = text.chars().skip(start).take(end - start).collect();
            (composing, true)
        }
        None => (text.to_string(), false),
    }
}

/// Per-device key character maps, loaded on first use
#[cfg(target_os = "android")]
#[derive(Default)]
pub struct KeyCharacterMaps {
    maps: HashMap<i32, KeyCharacterMap>,
}

#[cfg(target_os = "android")]
impl KeyCharacterMaps {
    fn character(&mut self, app: &AndroidApp, event: &KeyEvent<'_>) -> KeyChar {
        let device_id = event.device_id();
        if !self.maps.contains_key(&device_id) {
            match app.device_key_character_map(device_id) {
                Ok(map) => {
                    self.maps.insert(device_id, map);
                }
                Err(err) => {
                    warn!(device_id, "no key character map: {err:?}");
                    return KeyChar::None;
                }
            }
        }
        let Some(map) = self.maps.get(&device_id) else {
            return KeyChar::None;
        };
        match map.get(event.key_code(), event.meta_state()) {
            Ok(KeyMapChar::Unicode(ch)) => KeyChar::Unicode(ch),
            Ok(KeyMapChar::CombiningAccent(accent)) => KeyChar::CombiningAccent(accent),
            Ok(KeyMapChar::None) => KeyChar::None,
            Err(err) => {
                warn!("key character lookup failed: {err:?}");
                KeyChar::None
            }
        }
    }
}

/// Build a key record, resolving the produced character
#[cfg(target_os = "android")]
pub fn key_record(
    app: &AndroidApp,
    maps: &mut KeyCharacterMaps,
    event: &KeyEvent<'_>,
) -> NativeKeyEvent {
    NativeKeyEvent {
        action: KeyAction::from_raw(u32::from(event.action())),
        key_code: u32::from(event.key_code()),
        meta_state: event.meta_state().0,
        repeat_count: event.repeat_count().max(0) as u32,
        character: maps.character(app, event),
    }
}

/// Build a motion record for the pointer the action refers to
///
/// `last_buttons` carries the button state across events so the changed
/// button can be derived.
#[cfg(target_os = "android")]
pub fn motion_record(event: &MotionEvent<'_>, last_buttons: &mut u32) -> NativeMotionEvent {
    let action = MotionAction::from_raw(u32::from(event.action()));
    let pointer_index = event.pointer_index();
    let pointer = event.pointer_at_index(pointer_index);
    let button_state = event.button_state().0;
    let action_button = changed_button(action, *last_buttons, button_state);
    *last_buttons = button_state;

    NativeMotionEvent {
        action,
        source: MotionSource::from_raw(u32::from(event.source())),
        pointer_index,
        x: pointer.x(),
        y: pointer.y(),
        button_state,
        action_button,
        scroll_x: pointer.axis_value(Axis::Hscroll),
        scroll_y: pointer.axis_value(Axis::Vscroll),
        meta_state: event.meta_state().0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flare_platform::native::button;

    #[test]
    fn test_changed_button_from_states() {
        assert_eq!(
            changed_button(MotionAction::ButtonPress, button::PRIMARY, button::PRIMARY | button::SECONDARY),
            button::SECONDARY
        );
        assert_eq!(
            changed_button(MotionAction::ButtonRelease, button::PRIMARY | button::SECONDARY, button::PRIMARY),
            button::SECONDARY
        );
        assert_eq!(changed_button(MotionAction::Move, 0, button::PRIMARY), 0);
    }

    #[test]
    fn test_composition_text_uses_region_in_chars() {
        assert_eq!(
            composition_text("héllo wor", Some((6, 9))),
            ("wor".to_string(), true)
        );
        assert_eq!(composition_text("ab", Some((2, 1))), ("b".to_string(), true));
        assert_eq!(composition_text("done", None), ("done".to_string(), false));
    }
}
