//! # Mutex
//!
//! Exclusive, non-reentrant critical section. No timeout, no recursion.
//!
//! Debug builds remember the owning thread and panic on a reentrant lock
//! instead of deadlocking silently.

use std::fmt;
#[cfg(debug_assertions)]
use std::thread::{self, ThreadId};

use parking_lot::MutexGuard;

use crate::context::SyncContext;
use crate::error::SyncResult;
use crate::os::{OsHandle, PrimitiveKind};

/// Exclusive lock.
///
/// ## Usage
///
/// ```rust,ignore
/// let mutex = Mutex::new(&ctx);
///
/// {
///     let _lock = mutex.lock();
///     // critical section
/// } // released here
/// ```
pub struct Mutex {
    raw: parking_lot::Mutex<()>,
    #[cfg(debug_assertions)]
    owner: parking_lot::Mutex<Option<ThreadId>>,
    _handle: OsHandle,
}

impl Mutex {
    /// Creates a mutex, treating failure as fatal.
    #[must_use]
    pub fn new(ctx: &SyncContext) -> Self {
        ctx.unwrap_or_fatal(Self::try_new(ctx))
    }

    /// Creates a mutex.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::HandleBudgetExhausted`](crate::SyncError) when the
    /// context has no handles left.
    pub fn try_new(ctx: &SyncContext) -> SyncResult<Self> {
        Ok(Self {
            raw: parking_lot::Mutex::new(()),
            #[cfg(debug_assertions)]
            owner: parking_lot::Mutex::new(None),
            _handle: ctx.allocate(PrimitiveKind::Mutex)?,
        })
    }

    /// Blocks until the lock is owned. Equivalent to [`MutexLock::new`].
    #[inline]
    pub fn lock(&self) -> MutexLock<'_> {
        MutexLock::new(self)
    }

    /// Returns whether some thread currently owns the lock.
    #[inline]
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.raw.is_locked()
    }
}

impl fmt::Debug for Mutex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mutex")
            .field("locked", &self.is_locked())
            .finish()
    }
}

/// Scoped ownership of a [`Mutex`].
///
/// Acquired on construction, released on drop.
#[must_use = "the mutex is released as soon as the lock is dropped"]
pub struct MutexLock<'a> {
    #[cfg(debug_assertions)]
    owner: &'a parking_lot::Mutex<Option<ThreadId>>,
    _guard: MutexGuard<'a, ()>,
}

impl<'a> MutexLock<'a> {
    /// Blocks until `mutex` is owned by the calling thread.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if the calling thread already owns `mutex`.
    pub fn new(mutex: &'a Mutex) -> Self {
        #[cfg(debug_assertions)]
        let current = thread::current().id();
        #[cfg(debug_assertions)]
        assert!(
            *mutex.owner.lock() != Some(current),
            "Mutex is not reentrant: the owning thread tried to lock it again"
        );

        let guard = mutex.raw.lock();

        #[cfg(debug_assertions)]
        {
            *mutex.owner.lock() = Some(current);
        }

        Self {
            #[cfg(debug_assertions)]
            owner: &mutex.owner,
            _guard: guard,
        }
    }
}

impl Drop for MutexLock<'_> {
    fn drop(&mut self) {
        // Clear ownership before the guard field releases the lock
        #[cfg(debug_assertions)]
        {
            *self.owner.lock() = None;
        }
    }
}

impl fmt::Debug for MutexLock<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutexLock").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_lock_and_release() {
        let ctx = SyncContext::default();
        let mutex = Mutex::new(&ctx);
        assert!(!mutex.is_locked());

        {
            let _lock = mutex.lock();
            assert!(mutex.is_locked());
        }

        assert!(!mutex.is_locked());
    }

    #[test]
    fn test_released_on_early_return() {
        fn bail(mutex: &Mutex) -> Result<(), &'static str> {
            let _lock = MutexLock::new(mutex);
            Err("early")
        }

        let mutex = Mutex::new(&SyncContext::default());
        assert!(bail(&mutex).is_err());
        assert!(!mutex.is_locked());
    }

    #[test]
    fn test_mutual_exclusion() {
        let mutex = Arc::new(Mutex::new(&SyncContext::default()));
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let mutex = Arc::clone(&mutex);
                let inside = Arc::clone(&inside);
                let max_inside = Arc::clone(&max_inside);
                thread::spawn(move || {
                    for _ in 0..1_000 {
                        let _lock = mutex.lock();
                        let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                        max_inside.fetch_max(now, Ordering::SeqCst);
                        inside.fetch_sub(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_handle_returned_on_drop() {
        let ctx = SyncContext::default();
        let mutex = Mutex::new(&ctx);
        assert_eq!(ctx.live_handles(), 1);
        drop(mutex);
        assert_eq!(ctx.live_handles(), 0);
    }

    #[test]
    fn test_try_new_on_exhausted_budget() {
        let ctx = SyncContext::from_config(crate::SyncConfig::default().with_max_handles(1));
        let _first = Mutex::try_new(&ctx).unwrap();
        assert!(Mutex::try_new(&ctx).is_err());
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "Mutex is not reentrant")]
    fn test_reentrant_lock_panics() {
        let mutex = Mutex::new(&SyncContext::default());
        let _outer = mutex.lock();
        let _inner = mutex.lock();
    }
}
