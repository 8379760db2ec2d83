//! # Locks
//!
//! Exclusive and shared/exclusive locks with scoped guards.
//!
//! ```text
//!   Mutex           ──lock()──────────────▶ MutexLock          (exclusive)
//!   ReadWriteMutex  ──read() / write()────▶ ReadWriteMutexLock (Read | Write)
//!                                              │
//!                                              ├─ upgrade_to_write()  release R, acquire W
//!                                              └─ downgrade_to_read() release W, acquire R
//! ```
//!
//! Guards release on drop, on every exit path.

mod mutex;
mod rwlock;

pub use mutex::{Mutex, MutexLock};
pub use rwlock::{LockMode, LockState, ReadWriteMutex, ReadWriteMutexLock, RwLockStats};
