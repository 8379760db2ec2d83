//! # Condition Variable
//!
//! Wait/notify with its own internal lock, optionally guarding a value.
//!
//! ## Protocol
//!
//! ```text
//!   waiter                                 notifier
//!   ──────                                 ────────
//!   let mut g = cv.lock();                 {
//!   while !predicate(&g) {                     let mut g = cv.lock();
//!       cv.wait(&mut g);  ◀──────────────      update(&mut g);
//!   }                                      }
//!   // predicate holds, lock held          cv.signal();  // or broadcast()
//! ```
//!
//! `wait` registers the caller as a waiter while the lock is still held, then
//! releases the lock and parks in one step. A notifier that takes the lock
//! after that point is guaranteed to see the registration, so a wait that
//! began before a signal or broadcast (in lock order) always observes it.
//!
//! Built on `parking_lot::Condvar`, which provides this directly.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::{Condvar, Mutex, MutexGuard};

use crate::context::SyncContext;
use crate::error::SyncResult;
use crate::os::{OsHandle, PrimitiveKind};

/// Condition variable carrying its own lock around a `T`.
///
/// ## Usage
///
/// ```rust,ignore
/// let ready = ConditionVariable::new(&ctx, false);
///
/// // Waiter
/// let mut lock = ready.lock();
/// ready.wait_while(&mut lock, |ready| !*ready);
///
/// // Notifier
/// *ready.lock() = true;
/// ready.signal();
/// ```
pub struct ConditionVariable<T = ()> {
    state: Mutex<T>,
    queue: Condvar,
    /// Only modified while `state` is locked.
    waiters: AtomicUsize,
    _handle: OsHandle,
}

impl<T> ConditionVariable<T> {
    /// Creates a condition variable guarding `value`, treating failure as
    /// fatal.
    #[must_use]
    pub fn new(ctx: &SyncContext, value: T) -> Self {
        ctx.unwrap_or_fatal(Self::try_new(ctx, value))
    }

    /// Creates a condition variable guarding `value`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::HandleBudgetExhausted`](crate::SyncError) when the
    /// context has no handles left.
    pub fn try_new(ctx: &SyncContext, value: T) -> SyncResult<Self> {
        Ok(Self {
            state: Mutex::new(value),
            queue: Condvar::new(),
            waiters: AtomicUsize::new(0),
            _handle: ctx.allocate(PrimitiveKind::ConditionVariable)?,
        })
    }

    /// Acquires the internal lock.
    #[inline]
    pub fn lock(&self) -> ConditionLock<'_, T> {
        ConditionLock {
            guard: self.state.lock(),
        }
    }

    /// Releases the lock, blocks until notified, then re-acquires the lock.
    ///
    /// A single wake-up does not prove the predicate; loop, or use
    /// [`wait_while`](Self::wait_while).
    ///
    /// # Panics
    ///
    /// In debug builds, panics if `lock` was taken from a different
    /// condition variable.
    pub fn wait(&self, lock: &mut ConditionLock<'_, T>) {
        debug_assert!(
            std::ptr::eq(MutexGuard::mutex(&lock.guard), &self.state),
            "ConditionVariable::wait called with a lock from another condition variable"
        );
        self.waiters.fetch_add(1, Ordering::SeqCst);
        self.queue.wait(&mut lock.guard);
        self.waiters.fetch_sub(1, Ordering::SeqCst);
    }

    /// Waits for as long as `condition` returns `true`.
    pub fn wait_while<F>(&self, lock: &mut ConditionLock<'_, T>, mut condition: F)
    where
        F: FnMut(&mut T) -> bool,
    {
        while condition(&mut *lock.guard) {
            self.wait(lock);
        }
    }

    /// Wakes one waiter. Does nothing if nobody is waiting; the signal is
    /// not kept for a later waiter.
    pub fn signal(&self) {
        if self.waiters.load(Ordering::SeqCst) > 0 {
            self.queue.notify_one();
        }
    }

    /// Wakes every waiter registered at this point.
    pub fn broadcast(&self) {
        if self.waiters.load(Ordering::SeqCst) > 0 {
            self.queue.notify_all();
        }
    }

    /// Number of threads currently inside [`wait`](Self::wait).
    #[must_use]
    pub fn waiter_count(&self) -> usize {
        self.waiters.load(Ordering::SeqCst)
    }
}

impl<T> fmt::Debug for ConditionVariable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionVariable")
            .field("waiters", &self.waiter_count())
            .finish_non_exhaustive()
    }
}

/// Holds the internal lock of a [`ConditionVariable`].
///
/// Dropping it (or calling [`unlock`](Self::unlock)) releases the lock.
#[must_use = "the condition lock is released as soon as it is dropped"]
pub struct ConditionLock<'a, T> {
    guard: MutexGuard<'a, T>,
}

impl<T> ConditionLock<'_, T> {
    /// Releases the lock.
    pub fn unlock(self) {
        drop(self);
    }
}

impl<T> Deref for ConditionLock<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &*self.guard
    }
}

impl<T> DerefMut for ConditionLock<'_, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        &mut *self.guard
    }
}

impl<T: fmt::Debug> fmt::Debug for ConditionLock<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionLock")
            .field("value", &*self.guard)
            .finish()
    }
}
