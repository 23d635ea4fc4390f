//! Headless event source
//!
//! An in-memory [`NativeEventSource`] with a virtual clock. Host builds and
//! test suites script commands and input (immediately or at a future virtual
//! time) and inspect what the pump asked of the host: acknowledgements, soft
//! keyboard calls, beeps and wait timeouts.
//!
//! Waiting never sleeps. A wait with a timeout advances the clock by the
//! timeout, or to the next scripted event if that comes first. A wait with no
//! timeout and nothing scripted reports [`WaitOutcome::Unavailable`] because
//! nothing could ever arrive.

use crate::event::AppCommand;
use crate::native::{NativeInputEvent, NativeKeyEvent, NativeMotionEvent, NativeTextEvent};
use crate::platform::{BeepKind, NativeEventSource, WaitOutcome, Wake, WakeHandle};
use crate::window::Rect;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Owned input record queued in the headless source
#[derive(Clone, Debug, PartialEq)]
pub enum ScriptedInput {
    Key(NativeKeyEvent),
    Motion(NativeMotionEvent),
    Text { text: String, composing: bool },
    Unknown(u32),
}

impl ScriptedInput {
    fn as_native(&self) -> NativeInputEvent<'_> {
        match self {
            ScriptedInput::Key(key) => NativeInputEvent::Key(*key),
            ScriptedInput::Motion(motion) => NativeInputEvent::Motion(*motion),
            ScriptedInput::Text { text, composing } => NativeInputEvent::Text(NativeTextEvent {
                text,
                composing: *composing,
            }),
            ScriptedInput::Unknown(kind) => NativeInputEvent::Unknown(*kind),
        }
    }
}

#[derive(Debug)]
enum Scripted {
    Command(AppCommand),
    Input(ScriptedInput),
}

#[derive(Debug)]
struct Pending {
    at: Instant,
    item: Scripted,
}

struct HeadlessWaker {
    flag: Arc<AtomicBool>,
}

impl Wake for HeadlessWaker {
    fn wake(&self) {
        self.flag.store(true, Ordering::Release);
    }
}

/// Virtual-clock event source
#[derive(Debug)]
pub struct HeadlessEventSource {
    now: Instant,
    commands: VecDeque<AppCommand>,
    inputs: VecDeque<ScriptedInput>,
    scheduled: Vec<Pending>,
    acknowledgements: Vec<bool>,
    waits: Vec<Option<Duration>>,
    keyboard_shows: usize,
    keyboard_hides: usize,
    keyboard_visible: bool,
    beeps: Vec<BeepKind>,
    screen: Option<Rect>,
    closed: bool,
    woken: Arc<AtomicBool>,
}

impl Default for HeadlessEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessEventSource {
    /// Empty source with the clock at the current instant
    pub fn new() -> Self {
        Self {
            now: Instant::now(),
            commands: VecDeque::new(),
            inputs: VecDeque::new(),
            scheduled: Vec::new(),
            acknowledgements: Vec::new(),
            waits: Vec::new(),
            keyboard_shows: 0,
            keyboard_hides: 0,
            keyboard_visible: false,
            beeps: Vec::new(),
            screen: None,
            closed: false,
            woken: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Report these display bounds
    pub fn with_screen(mut self, screen: Rect) -> Self {
        self.screen = Some(screen);
        self
    }

    /// Advance the virtual clock
    pub fn advance(&mut self, by: Duration) {
        self.now += by;
        self.release_scheduled();
    }

    /// Queue a lifecycle command now
    pub fn push_command(&mut self, command: AppCommand) {
        self.commands.push_back(command);
    }

    /// Queue an input record now
    pub fn push_input(&mut self, input: ScriptedInput) {
        self.inputs.push_back(input);
    }

    /// Queue a key record now
    pub fn push_key(&mut self, key: NativeKeyEvent) {
        self.push_input(ScriptedInput::Key(key));
    }

    /// Queue a motion record now
    pub fn push_motion(&mut self, motion: NativeMotionEvent) {
        self.push_input(ScriptedInput::Motion(motion));
    }

    /// Queue an input-method text record now
    pub fn push_text(&mut self, text: impl Into<String>, composing: bool) {
        self.push_input(ScriptedInput::Text {
            text: text.into(),
            composing,
        });
    }

    /// Deliver a command once the virtual clock reaches `now + after`
    pub fn schedule_command(&mut self, after: Duration, command: AppCommand) {
        self.schedule(after, Scripted::Command(command));
    }

    /// Deliver an input record once the virtual clock reaches `now + after`
    pub fn schedule_input(&mut self, after: Duration, input: ScriptedInput) {
        self.schedule(after, Scripted::Input(input));
    }

    fn schedule(&mut self, after: Duration, item: Scripted) {
        let at = self.now + after;
        // Stable insert keeps scripting order for equal times
        let index = self.scheduled.partition_point(|pending| pending.at <= at);
        self.scheduled.insert(index, Pending { at, item });
    }

    fn release_scheduled(&mut self) {
        let ready = self.scheduled.partition_point(|pending| pending.at <= self.now);
        for pending in self.scheduled.drain(..ready) {
            match pending.item {
                Scripted::Command(command) => self.commands.push_back(command),
                Scripted::Input(input) => self.inputs.push_back(input),
            }
        }
    }

    /// Make the queue unavailable, as during teardown
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Consumed flags of dispatched input records, in order
    pub fn acknowledgements(&self) -> &[bool] {
        &self.acknowledgements
    }

    /// Timeouts passed to [`NativeEventSource::wait`], in order
    pub fn waits(&self) -> &[Option<Duration>] {
        &self.waits
    }

    /// Calls to show the soft keyboard
    pub fn keyboard_shows(&self) -> usize {
        self.keyboard_shows
    }

    /// Calls to hide the soft keyboard
    pub fn keyboard_hides(&self) -> usize {
        self.keyboard_hides
    }

    /// Whether the soft keyboard is currently shown
    pub fn keyboard_visible(&self) -> bool {
        self.keyboard_visible
    }

    /// Beeps played, in order
    pub fn beeps(&self) -> &[BeepKind] {
        &self.beeps
    }
}

impl NativeEventSource for HeadlessEventSource {
    fn name(&self) -> &'static str {
        "headless"
    }

    fn now(&self) -> Instant {
        self.now
    }

    fn wait(&mut self, timeout: Option<Duration>) -> WaitOutcome {
        self.waits.push(timeout);

        if self.closed {
            return WaitOutcome::Unavailable;
        }
        if self.woken.swap(false, Ordering::AcqRel) {
            return WaitOutcome::Woken;
        }
        if self.has_pending() {
            return WaitOutcome::Ready;
        }

        let next_at = self.scheduled.first().map(|pending| pending.at);
        let deadline = timeout.map(|timeout| self.now + timeout);
        match (next_at, deadline) {
            (Some(at), Some(deadline)) if at > deadline => {
                self.now = deadline;
                WaitOutcome::TimedOut
            }
            (Some(at), _) => {
                self.now = self.now.max(at);
                self.release_scheduled();
                trace!("headless wait released scripted events");
                WaitOutcome::Ready
            }
            (None, Some(deadline)) => {
                self.now = deadline;
                WaitOutcome::TimedOut
            }
            (None, None) => {
                debug!("headless wait with nothing scripted and no timeout");
                WaitOutcome::Unavailable
            }
        }
    }

    fn has_pending(&self) -> bool {
        !self.commands.is_empty() || !self.inputs.is_empty()
    }

    fn next_command(&mut self) -> Option<AppCommand> {
        self.commands.pop_front()
    }

    fn next_input(&mut self, dispatch: &mut dyn FnMut(&NativeInputEvent<'_>) -> bool) -> bool {
        let Some(input) = self.inputs.pop_front() else {
            return false;
        };
        let consumed = dispatch(&input.as_native());
        self.acknowledgements.push(consumed);
        true
    }

    fn show_soft_keyboard(&mut self, implicit: bool) {
        trace!(implicit, "headless show keyboard");
        self.keyboard_shows += 1;
        self.keyboard_visible = true;
    }

    fn hide_soft_keyboard(&mut self) {
        self.keyboard_hides += 1;
        self.keyboard_visible = false;
    }

    fn screen_bounds(&self) -> Option<Rect> {
        self.screen
    }

    fn beep(&mut self, kind: BeepKind) {
        self.beeps.push(kind);
    }

    fn wake_handle(&self) -> Option<WakeHandle> {
        Some(WakeHandle::new(HeadlessWaker {
            flag: Arc::clone(&self.woken),
        }))
    }
}
