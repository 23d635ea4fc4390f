//! Timeout registry
//!
//! Holds toolkit-scheduled callbacks and fires them once their due time has
//! passed. A registration is identified by its `(handler, arg)` pair, the same
//! way the toolkit identifies a timeout by callback and user data.
//!
//! The registry does not read a clock itself. The event pump feeds it the
//! current time through [`TimeoutRegistry::set_now`], which keeps firing
//! deterministic and lets tests drive it with a virtual clock.
//!
//! # Example
//!
//! ```
//! use flare_platform::timeout::{TimeoutHandler, TimeoutRegistry};
//! use std::time::{Duration, Instant};
//!
//! let start = Instant::now();
//! let mut timeouts = TimeoutRegistry::new(start);
//!
//! // A periodic tick that re-arms itself relative to its previous due time
//! let tick = TimeoutHandler::new(|timeouts, arg| {
//!     timeouts.repeat_timeout(Duration::from_millis(500), &timeouts.current_handler().unwrap(), arg);
//! });
//! timeouts.add_timeout(Duration::from_millis(500), &tick, 0);
//!
//! timeouts.set_now(start + Duration::from_millis(600));
//! assert_eq!(timeouts.fire_due(), 1);
//! assert_eq!(timeouts.due_time(&tick, 0), Some(start + Duration::from_millis(1000)));
//! ```

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::trace;

/// Opaque user argument passed back to a timeout callback
pub type TimeoutArg = u64;

type TimeoutCallback = dyn Fn(&mut TimeoutRegistry, TimeoutArg);

/// Cloneable handle to a timeout callback
///
/// Two handlers are equal only if one is a clone of the other, so a handler
/// behaves like a function pointer when looking up registrations.
#[derive(Clone)]
pub struct TimeoutHandler {
    callback: Rc<TimeoutCallback>,
}

impl TimeoutHandler {
    /// Wrap a callback
    ///
    /// The callback receives the registry it was fired from so it can
    /// re-register itself or schedule follow-up work.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&mut TimeoutRegistry, TimeoutArg) + 'static,
    {
        Self {
            callback: Rc::new(callback),
        }
    }

    /// Check whether two handles refer to the same callback
    pub fn same(&self, other: &TimeoutHandler) -> bool {
        Rc::ptr_eq(&self.callback, &other.callback)
    }
}

impl PartialEq for TimeoutHandler {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl Eq for TimeoutHandler {}

impl fmt::Debug for TimeoutHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TimeoutHandler")
            .field(&Rc::as_ptr(&self.callback).cast::<()>())
            .finish()
    }
}

new_key_type! {
    /// Handle to a single scheduled entry
    pub struct TimeoutId;
}

struct TimeoutEntry {
    handler: TimeoutHandler,
    arg: TimeoutArg,
    due: Instant,
    seq: u64,
}

impl TimeoutEntry {
    fn matches(&self, handler: &TimeoutHandler, arg: TimeoutArg) -> bool {
        self.arg == arg && self.handler.same(handler)
    }
}

/// The entry whose callback is running right now
struct Firing {
    handler: TimeoutHandler,
    arg: TimeoutArg,
    due: Instant,
}

/// Scheduled callbacks ordered by due time
pub struct TimeoutRegistry {
    entries: SlotMap<TimeoutId, TimeoutEntry>,
    next_seq: u64,
    now: Instant,
    firing: Option<Firing>,
}

/// Used when `now + delay` does not fit in an `Instant`
const FAR_FUTURE: Duration = Duration::from_secs(60 * 60 * 24 * 365 * 30);

fn due_after(base: Instant, delay: Duration) -> Instant {
    base.checked_add(delay)
        .or_else(|| base.checked_add(FAR_FUTURE))
        .unwrap_or(base)
}

impl TimeoutRegistry {
    /// Create an empty registry whose clock reads `now`
    pub fn new(now: Instant) -> Self {
        Self {
            entries: SlotMap::with_key(),
            next_seq: 0,
            now,
            firing: None,
        }
    }

    /// Advance the registry clock
    ///
    /// The clock never moves backwards; an earlier reading is ignored.
    pub fn set_now(&mut self, now: Instant) {
        if now > self.now {
            self.now = now;
        }
    }

    /// Current registry clock
    pub fn now(&self) -> Instant {
        self.now
    }

    /// Schedule `handler(arg)` to run no earlier than `now + delay`
    ///
    /// Adding the same pair twice creates two independent entries.
    pub fn add_timeout(&mut self, delay: Duration, handler: &TimeoutHandler, arg: TimeoutArg) {
        let due = due_after(self.now, delay);
        self.insert(due, handler, arg);
    }

    /// Re-arm a timeout relative to its previous due time
    ///
    /// If a pending entry exists for the pair, the earliest one is pushed back
    /// by `delay` from its own due time. If the pair is the entry being fired
    /// right now, the new entry is due `delay` after the fired one was. In both
    /// cases a periodic timer keeps its cadence regardless of dispatch jitter.
    /// Otherwise this is the same as [`add_timeout`](Self::add_timeout).
    pub fn repeat_timeout(&mut self, delay: Duration, handler: &TimeoutHandler, arg: TimeoutArg) {
        let pending = self
            .entries
            .values_mut()
            .filter(|entry| entry.matches(handler, arg))
            .min_by_key(|entry| (entry.due, entry.seq));
        if let Some(entry) = pending {
            entry.due = due_after(entry.due, delay);
            trace!("timeout re-armed from pending entry");
            return;
        }

        let fired_due = self
            .firing
            .as_ref()
            .filter(|firing| firing.arg == arg && firing.handler.same(handler))
            .map(|firing| firing.due);
        match fired_due {
            Some(due) => self.insert(due_after(due, delay), handler, arg),
            None => self.add_timeout(delay, handler, arg),
        }
    }

    /// Check whether any entry for the pair is pending
    pub fn has_timeout(&self, handler: &TimeoutHandler, arg: TimeoutArg) -> bool {
        self.entries
            .values()
            .any(|entry| entry.matches(handler, arg))
    }

    /// Remove every entry for the pair; removing nothing is not an error
    pub fn remove_timeout(&mut self, handler: &TimeoutHandler, arg: TimeoutArg) {
        self.entries.retain(|_, entry| !entry.matches(handler, arg));
    }

    /// Earliest due time of the pair, if scheduled
    pub fn due_time(&self, handler: &TimeoutHandler, arg: TimeoutArg) -> Option<Instant> {
        self.entries
            .values()
            .filter(|entry| entry.matches(handler, arg))
            .map(|entry| entry.due)
            .min()
    }

    /// Nearest pending due time
    pub fn next_due(&self) -> Option<Instant> {
        self.entries.values().map(|entry| entry.due).min()
    }

    /// Whether some entry is due at the current clock
    pub fn has_due(&self) -> bool {
        self.next_due().is_some_and(|due| due <= self.now)
    }

    /// Handler of the entry currently being fired
    ///
    /// Lets a callback re-arm itself without holding a handle to its own
    /// closure.
    pub fn current_handler(&self) -> Option<TimeoutHandler> {
        self.firing.as_ref().map(|firing| firing.handler.clone())
    }

    /// Number of pending entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries are pending
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every pending entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Fire every entry due at the current clock, in due-time order
    ///
    /// The due set is captured before the first callback runs. Entries added
    /// by callbacks wait for the next call. Entries removed, or re-armed past
    /// the clock, by an earlier callback in this pass are skipped. Returns the
    /// number fired.
    pub fn fire_due(&mut self) -> usize {
        let now = self.now;
        let mut due: SmallVec<[(Instant, u64, TimeoutId); 8]> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.due <= now)
            .map(|(id, entry)| (entry.due, entry.seq, id))
            .collect();
        due.sort_unstable_by_key(|&(due, seq, _)| (due, seq));

        let mut fired = 0;
        for (_, _, id) in due {
            if !self.entries.get(id).is_some_and(|entry| entry.due <= now) {
                continue;
            }
            let Some(entry) = self.entries.remove(id) else {
                continue;
            };
            trace!(arg = entry.arg, "firing timeout");
            let handler = entry.handler.clone();
            self.firing = Some(Firing {
                handler: entry.handler,
                arg: entry.arg,
                due: entry.due,
            });
            (handler.callback)(self, entry.arg);
            fired += 1;
        }
        self.firing = None;
        fired
    }

    fn insert(&mut self, due: Instant, handler: &TimeoutHandler, arg: TimeoutArg) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(TimeoutEntry {
            handler: handler.clone(),
            arg,
            due,
            seq,
        });
    }
}

impl fmt::Debug for TimeoutRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeoutRegistry")
            .field("pending", &self.entries.len())
            .field("next_due", &self.next_due())
            .finish()
    }
}
