//! # Signals
//!
//! Cross-thread signaling: a counting [`Semaphore`] and a
//! [`ConditionVariable`] with its own internal lock.

mod condvar;
mod semaphore;

pub use condvar::{ConditionLock, ConditionVariable};
pub use semaphore::Semaphore;
