//! Cross-thread wake-up of the UI looper

use flare_platform::Wake;

#[cfg(target_os = "android")]
use ndk::looper::ForeignLooper;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Proxy for waking up the event pump from another thread
///
/// Wraps the UI thread's looper. `wake()` makes a blocked poll return with
/// `PollEvent::Wake`; the flag tells the source the wake was ours.
#[derive(Clone)]
pub struct AndroidWakeProxy {
    #[cfg(target_os = "android")]
    looper: ForeignLooper,
    wake_requested: Arc<AtomicBool>,
}

impl AndroidWakeProxy {
    /// Create a wake proxy for the current thread's looper
    #[cfg(target_os = "android")]
    pub fn new() -> Option<Self> {
        ForeignLooper::for_thread().map(|looper| Self {
            looper,
            wake_requested: Arc::new(AtomicBool::new(false)),
        })
    }

    /// There is no looper off Android
    #[cfg(not(target_os = "android"))]
    pub fn new() -> Option<Self> {
        None
    }

    /// Check if a wake was requested and clear the flag
    pub fn take_wake_request(&self) -> bool {
        self.wake_requested.swap(false, Ordering::SeqCst)
    }
}

impl Wake for AndroidWakeProxy {
    fn wake(&self) {
        self.wake_requested.store(true, Ordering::SeqCst);
        #[cfg(target_os = "android")]
        self.looper.wake();
    }
}

#[cfg(all(test, not(target_os = "android")))]
mod tests {
    use super::*;

    #[test]
    fn test_no_looper_on_host() {
        assert!(AndroidWakeProxy::new().is_none());
    }
}
