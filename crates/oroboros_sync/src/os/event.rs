//! # Event Gates
//!
//! An event is a boolean "signaled" flag plus a wait queue.
//!
//! ```text
//!   Auto-reset (ticket):   set() releases ONE waiter, flag clears on pass
//!   Manual-reset (sticky): set() releases ALL waiters, flag stays up until reset()
//! ```
//!
//! An auto-reset event that is set with nobody waiting keeps the signal for
//! the next waiter, but never more than one: it is a capacity-1 hand-off.

use parking_lot::{Condvar, Mutex};

use crate::context::SyncContext;
use crate::error::SyncResult;
use crate::os::{OsHandle, PrimitiveKind};

/// Reset policy of an [`Event`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EventReset {
    /// Clears as it releases a single waiter.
    Auto,
    /// Stays signaled until explicitly reset.
    Manual,
}

/// Signaling gate with auto-reset or manual-reset semantics.
#[derive(Debug)]
pub(crate) struct Event {
    signaled: Mutex<bool>,
    queue: Condvar,
    reset: EventReset,
    _handle: OsHandle,
}

impl Event {
    /// Creates an unsignaled event.
    pub(crate) fn new(ctx: &SyncContext, reset: EventReset) -> SyncResult<Self> {
        Ok(Self {
            signaled: Mutex::new(false),
            queue: Condvar::new(),
            reset,
            _handle: ctx.allocate(PrimitiveKind::Event)?,
        })
    }

    /// Signals the event.
    pub(crate) fn set(&self) {
        let mut signaled = self.signaled.lock();
        *signaled = true;
        match self.reset {
            EventReset::Auto => {
                self.queue.notify_one();
            }
            EventReset::Manual => {
                self.queue.notify_all();
            }
        }
    }

    /// Clears the signal. Waiters that already passed are unaffected.
    pub(crate) fn reset(&self) {
        *self.signaled.lock() = false;
    }

    /// Blocks until the event is signaled.
    pub(crate) fn wait(&self) {
        let mut signaled = self.signaled.lock();
        while !*signaled {
            self.queue.wait(&mut signaled);
        }
        if self.reset == EventReset::Auto {
            *signaled = false;
        }
    }

    #[cfg(test)]
    fn is_set(&self) -> bool {
        *self.signaled.lock()
    }
}
