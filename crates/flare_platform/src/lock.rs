//! Toolkit lock hooks
//!
//! The UI thread holds the toolkit lock while it dispatches. Foreign threads
//! that touch toolkit state take it with [`toolkit_lock`]. The embedder
//! installs the actual lock and unlock primitives; with no hooks installed
//! locking is a no-op.

use std::marker::PhantomData;
use std::sync::{Arc, RwLock};

type Hook = Arc<dyn Fn() + Send + Sync>;

struct LockHooks {
    lock: Hook,
    unlock: Hook,
}

static HOOKS: RwLock<Option<LockHooks>> = RwLock::new(None);

/// Install the process-wide lock and unlock callbacks
pub fn set_lock_hooks<L, U>(lock: L, unlock: U)
where
    L: Fn() + Send + Sync + 'static,
    U: Fn() + Send + Sync + 'static,
{
    let mut hooks = HOOKS.write().unwrap_or_else(|poisoned| poisoned.into_inner());
    *hooks = Some(LockHooks {
        lock: Arc::new(lock),
        unlock: Arc::new(unlock),
    });
}

/// Remove the installed callbacks
pub fn clear_lock_hooks() {
    let mut hooks = HOOKS.write().unwrap_or_else(|poisoned| poisoned.into_inner());
    *hooks = None;
}

/// Whether lock callbacks are installed
pub fn has_lock_hooks() -> bool {
    HOOKS
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .is_some()
}

// Clone the hook out so it runs without the registry lock held
fn hook(select: fn(&LockHooks) -> &Hook) -> Option<Hook> {
    HOOKS
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .as_ref()
        .map(|hooks| Arc::clone(select(hooks)))
}

/// Call the lock hook, if any
pub fn lock() {
    if let Some(lock) = hook(|hooks| &hooks.lock) {
        lock();
    }
}

/// Call the unlock hook, if any
pub fn unlock() {
    if let Some(unlock) = hook(|hooks| &hooks.unlock) {
        unlock();
    }
}

/// Held toolkit lock; unlocks on drop
#[must_use = "the toolkit lock is released when the guard is dropped"]
pub struct ToolkitLock {
    // Lock and unlock must happen on the same thread
    _not_send: PhantomData<*const ()>,
}

/// Take the toolkit lock from a foreign thread
pub fn toolkit_lock() -> ToolkitLock {
    lock();
    ToolkitLock {
        _not_send: PhantomData,
    }
}

impl Drop for ToolkitLock {
    fn drop(&mut self) {
        unlock();
    }
}

/// Lock released for the lifetime of the guard (the UI thread around a
/// blocking wait)
pub(crate) struct Unlocked {
    _not_send: PhantomData<*const ()>,
}

impl Unlocked {
    pub(crate) fn new() -> Self {
        unlock();
        Self {
            _not_send: PhantomData,
        }
    }
}

impl Drop for Unlocked {
    fn drop(&mut self) {
        lock();
    }
}
