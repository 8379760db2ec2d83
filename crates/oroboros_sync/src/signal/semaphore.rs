//! # Counting Semaphore
//!
//! `signal(n)` adds `n` to the count and wakes up to `n` waiters.
//! `wait()` blocks until the count is positive, then takes one.
//! `try_wait()` is the only non-blocking probe in the crate.

use std::fmt;

use parking_lot::{Condvar, Mutex};

use crate::context::SyncContext;
use crate::error::{SyncError, SyncResult};
use crate::os::{OsHandle, PrimitiveKind};

/// Counting semaphore bounded by the context's `semaphore_max_count`.
pub struct Semaphore {
    count: Mutex<u32>,
    available: Condvar,
    max_count: u32,
    _handle: OsHandle,
}

impl Semaphore {
    /// Creates a semaphore holding `initial`, treating failure as fatal.
    #[must_use]
    pub fn new(ctx: &SyncContext, initial: u32) -> Self {
        ctx.unwrap_or_fatal(Self::try_new(ctx, initial))
    }

    /// Creates a semaphore holding `initial`.
    ///
    /// # Errors
    ///
    /// - [`SyncError::InvalidSemaphoreCount`] if `initial` exceeds the
    ///   configured maximum
    /// - [`SyncError::HandleBudgetExhausted`] if no handle is left
    pub fn try_new(ctx: &SyncContext, initial: u32) -> SyncResult<Self> {
        let max_count = ctx.config().semaphore_max_count;
        if initial > max_count {
            return Err(SyncError::InvalidSemaphoreCount {
                initial,
                max: max_count,
            });
        }

        Ok(Self {
            count: Mutex::new(initial),
            available: Condvar::new(),
            max_count,
            _handle: ctx.allocate(PrimitiveKind::Semaphore)?,
        })
    }

    /// Adds `n` to the count and wakes up to `n` blocked waiters.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if the count would exceed the maximum.
    /// Release builds saturate at the maximum.
    pub fn signal(&self, n: u32) {
        if n == 0 {
            return;
        }

        let mut count = self.count.lock();
        let raised = count.checked_add(n).filter(|&c| c <= self.max_count);
        debug_assert!(
            raised.is_some(),
            "Semaphore overflow: {} + {n} exceeds maximum {}",
            *count,
            self.max_count
        );
        *count = raised.unwrap_or(self.max_count);
        drop(count);

        // Stop as soon as the queue is empty
        for _ in 0..n {
            if !self.available.notify_one() {
                break;
            }
        }
    }

    /// Equivalent to `signal(1)`.
    #[inline]
    pub fn signal_one(&self) {
        self.signal(1);
    }

    /// Blocks until the count is positive, then decrements it.
    pub fn wait(&self) {
        let mut count = self.count.lock();
        while *count == 0 {
            self.available.wait(&mut count);
        }
        *count -= 1;
    }

    /// Decrements the count if it is positive. Never blocks.
    #[must_use]
    pub fn try_wait(&self) -> bool {
        let mut count = self.count.lock();
        if *count == 0 {
            return false;
        }
        *count -= 1;
        true
    }

    /// Current count. Stale as soon as it returns.
    #[must_use]
    pub fn count(&self) -> u32 {
        *self.count.lock()
    }

    /// Largest count this semaphore may hold.
    #[inline]
    #[must_use]
    pub const fn max_count(&self) -> u32 {
        self.max_count
    }
}

impl fmt::Debug for Semaphore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Semaphore")
            .field("count", &self.count())
            .field("max_count", &self.max_count)
            .finish()
    }
}
