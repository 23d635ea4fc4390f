//! Android event source
//!
//! Wraps android-activity's polling to implement `NativeEventSource`. Main
//! events become lifecycle commands; input events are read one at a time and
//! acknowledged as handled or unhandled so the system can apply its default
//! behavior (e.g. Back finishing the activity) to the ones we decline.

use crate::input::{composition_text, key_record, motion_record, KeyCharacterMaps};
use crate::jni_utils;
use crate::wake::AndroidWakeProxy;
use android_activity::input::{InputEvent, InputStatus};
use android_activity::{AndroidApp, MainEvent, PollEvent};
use flare_platform::native::{NativeInputEvent, NativeTextEvent};
use flare_platform::{AppCommand, BeepKind, NativeEventSource, Rect, WaitOutcome, WakeHandle};
use std::collections::VecDeque;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// Lifecycle command for a main event, if it has one
fn command_for(event: &MainEvent<'_>) -> Option<AppCommand> {
    let command = match event {
        MainEvent::InitWindow { .. } => AppCommand::SurfaceCreated,
        MainEvent::TerminateWindow { .. } => AppCommand::SurfaceDestroyed,
        MainEvent::WindowResized { .. } | MainEvent::RedrawNeeded { .. } => {
            AppCommand::SurfaceResized
        }
        MainEvent::ContentRectChanged { .. } | MainEvent::InsetsChanged { .. } => {
            AppCommand::ContentRectChanged
        }
        MainEvent::GainedFocus => AppCommand::GainedFocus,
        MainEvent::LostFocus => AppCommand::LostFocus,
        MainEvent::Start => AppCommand::Start,
        MainEvent::Resume { .. } => AppCommand::Resume,
        MainEvent::Pause => AppCommand::Pause,
        MainEvent::Stop => AppCommand::Stop,
        MainEvent::SaveState { .. } => AppCommand::SaveState,
        MainEvent::ConfigChanged { .. } => AppCommand::ConfigChanged,
        MainEvent::LowMemory => AppCommand::LowMemory,
        MainEvent::Destroy => AppCommand::Destroy,
        _ => return None,
    };
    Some(command)
}

/// Event source backed by the native activity's looper and input queue
pub struct AndroidEventSource {
    app: AndroidApp,
    commands: VecDeque<AppCommand>,
    input_ready: bool,
    destroyed: bool,
    wake_proxy: Option<AndroidWakeProxy>,
    key_maps: KeyCharacterMaps,
    last_buttons: u32,
    display: Option<Rect>,
    tones: jni_utils::TonePlayer,
}

impl AndroidEventSource {
    /// Create the source on the UI thread
    ///
    /// Captures the current thread's looper for cross-thread wakes.
    pub fn new(app: AndroidApp) -> Self {
        let wake_proxy = AndroidWakeProxy::new();
        if wake_proxy.is_none() {
            warn!("Failed to create AndroidWakeProxy - other threads cannot wake the pump");
        }
        let display = jni_utils::display_bounds(&app)
            .map_err(|e| warn!("Failed to read display metrics: {e}"))
            .ok();
        Self {
            app,
            commands: VecDeque::new(),
            input_ready: false,
            destroyed: false,
            wake_proxy,
            key_maps: KeyCharacterMaps::default(),
            last_buttons: 0,
            display,
            tones: jni_utils::TonePlayer::new(),
        }
    }

    pub fn app(&self) -> &AndroidApp {
        &self.app
    }
}

impl Drop for AndroidEventSource {
    fn drop(&mut self) {
        if let Err(err) = self.tones.release(&self.app) {
            warn!("Failed to release tone generator: {err}");
        }
    }
}

impl NativeEventSource for AndroidEventSource {
    fn name(&self) -> &'static str {
        "android"
    }

    fn wait(&mut self, timeout: Option<Duration>) -> WaitOutcome {
        if self.destroyed && self.commands.is_empty() {
            return WaitOutcome::Unavailable;
        }

        let mut woken = false;
        let mut input_available = false;
        let commands = &mut self.commands;
        let destroyed = &mut self.destroyed;
        self.app.poll_events(timeout, |event| match event {
            PollEvent::Wake => woken = true,
            PollEvent::Timeout => {}
            PollEvent::Main(MainEvent::InputAvailable) => input_available = true,
            PollEvent::Main(main_event) => match command_for(&main_event) {
                Some(command) => {
                    if command == AppCommand::Destroy {
                        info!("Android: Destroyed");
                        *destroyed = true;
                    }
                    commands.push_back(command);
                }
                None => trace!("Android: ignoring main event"),
            },
            _ => {}
        });

        let wake_requested = self
            .wake_proxy
            .as_ref()
            .is_some_and(|proxy| proxy.take_wake_request());

        // The input queue cannot be peeked; try reading it after every poll
        self.input_ready = true;

        if !self.commands.is_empty() || input_available {
            WaitOutcome::Ready
        } else if woken || wake_requested {
            WaitOutcome::Woken
        } else {
            WaitOutcome::TimedOut
        }
    }

    fn has_pending(&self) -> bool {
        !self.commands.is_empty() || self.input_ready
    }

    fn next_command(&mut self) -> Option<AppCommand> {
        self.commands.pop_front()
    }

    fn next_input(&mut self, dispatch: &mut dyn FnMut(&NativeInputEvent<'_>) -> bool) -> bool {
        if !self.input_ready {
            return false;
        }
        let mut events = match self.app.input_events_iter() {
            Ok(events) => events,
            Err(err) => {
                warn!("Failed to get input events iterator: {err:?}");
                self.input_ready = false;
                return false;
            }
        };

        let app = &self.app;
        let key_maps = &mut self.key_maps;
        let last_buttons = &mut self.last_buttons;
        let read = events.next(|event| {
            let consumed = match event {
                InputEvent::KeyEvent(key) => {
                    dispatch(&NativeInputEvent::Key(key_record(app, key_maps, key)))
                }
                InputEvent::MotionEvent(motion) => {
                    dispatch(&NativeInputEvent::Motion(motion_record(motion, last_buttons)))
                }
                InputEvent::TextEvent(state) => {
                    let region = state.compose_region.map(|span| (span.start, span.end));
                    let (text, composing) = composition_text(&state.text, region);
                    dispatch(&NativeInputEvent::Text(NativeTextEvent {
                        text: &text,
                        composing,
                    }))
                }
                _ => dispatch(&NativeInputEvent::Unknown(0)),
            };
            if consumed {
                InputStatus::Handled
            } else {
                InputStatus::Unhandled
            }
        });

        if !read {
            self.input_ready = false;
        }
        read
    }

    fn show_soft_keyboard(&mut self, implicit: bool) {
        debug!(implicit, "Android: show soft keyboard");
        if let Err(err) = jni_utils::show_soft_input(&self.app, implicit) {
            warn!("Failed to show soft keyboard: {err}");
        }
    }

    fn hide_soft_keyboard(&mut self) {
        debug!("Android: hide soft keyboard");
        if let Err(err) = jni_utils::hide_soft_input(&self.app) {
            warn!("Failed to hide soft keyboard: {err}");
        }
    }

    fn screen_bounds(&self) -> Option<Rect> {
        self.app
            .native_window()
            .map(|window| Rect::new(0, 0, window.width(), window.height()))
            .or(self.display)
    }

    fn beep(&mut self, kind: BeepKind) {
        if let Err(err) = self.tones.play(&self.app, kind) {
            warn!("Failed to play tone: {err}");
        }
    }

    fn wake_handle(&self) -> Option<WakeHandle> {
        self.wake_proxy.clone().map(WakeHandle::new)
    }
}
