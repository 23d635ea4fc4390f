//! Native event source capability
//!
//! Each target platform provides one implementation of [`NativeEventSource`]
//! wrapping the host's input queue, lifecycle commands, soft keyboard and
//! display metrics. The event pump is generic over it, so the platform is
//! chosen at build time (or by the embedder at startup) and the pump itself
//! stays platform-neutral.

use crate::event::AppCommand;
use crate::native::NativeInputEvent;
use crate::window::Rect;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Why the native wait returned
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaitOutcome {
    /// Commands or input events are pending
    Ready,
    /// The timeout elapsed with nothing pending
    TimedOut,
    /// Another thread called [`WakeHandle::wake`]
    Woken,
    /// The queue is gone (e.g. during teardown)
    Unavailable,
}

/// Kind of audible feedback
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BeepKind {
    #[default]
    Default,
    Message,
    Error,
    Question,
    Password,
    Notification,
}

/// Host operating system primitives used by the event pump
pub trait NativeEventSource {
    /// Short platform name such as "android" or "headless"
    fn name(&self) -> &'static str;

    /// Current time on the source's clock
    fn now(&self) -> Instant {
        Instant::now()
    }

    /// Block until the queue is readable, a wake arrives, or `timeout`
    /// elapses; `None` waits indefinitely
    fn wait(&mut self, timeout: Option<Duration>) -> WaitOutcome;

    /// Whether commands or input events are pending, without blocking
    fn has_pending(&self) -> bool;

    /// Dequeue one lifecycle command
    fn next_command(&mut self) -> Option<AppCommand>;

    /// Hand the next pending input event to `dispatch`
    ///
    /// The event is acknowledged to the host as consumed or unconsumed
    /// according to the closure's return value. Returns `false` if no event
    /// was pending.
    fn next_input(&mut self, dispatch: &mut dyn FnMut(&NativeInputEvent<'_>) -> bool) -> bool;

    /// Show the on-screen keyboard
    fn show_soft_keyboard(&mut self, implicit: bool);

    /// Hide the on-screen keyboard
    fn hide_soft_keyboard(&mut self);

    /// Bounds of the display, if the host knows them yet
    fn screen_bounds(&self) -> Option<Rect>;

    /// Play audible feedback
    fn beep(&mut self, kind: BeepKind);

    /// Thread-safe handle that ends a blocked [`wait`](Self::wait) early
    fn wake_handle(&self) -> Option<WakeHandle>;
}

/// Something that can interrupt a blocked native wait
pub trait Wake: Send + Sync {
    fn wake(&self);
}

/// Cloneable cross-thread wake signal
#[derive(Clone)]
pub struct WakeHandle {
    inner: Arc<dyn Wake>,
}

impl WakeHandle {
    pub fn new<W: Wake + 'static>(waker: W) -> Self {
        Self {
            inner: Arc::new(waker),
        }
    }

    /// Make the source report [`WaitOutcome::Woken`]
    pub fn wake(&self) {
        self.inner.wake();
    }
}

impl fmt::Debug for WakeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WakeHandle").finish_non_exhaustive()
    }
}
