//! # OROBOROS Sync
//!
//! Blocking synchronization primitives for engine threads:
//! - [`Mutex`] / [`MutexLock`] - exclusive, non-reentrant critical section
//! - [`Semaphore`] - counting signal with a configured maximum
//! - [`ConditionVariable`] - wait/notify with its own internal lock
//! - [`ReadWriteMutex`] / [`ReadWriteMutexLock`] - N readers or 1 writer,
//!   writer priority, runtime upgrade/downgrade
//!
//! ## Architecture Rules
//!
//! 1. **No lock-free fast paths** - every counter and flag is mutated under
//!    the primitive's own internal lock
//! 2. **No timeouts, no cancellation** - blocking operations block until a
//!    matching release/signal arrives
//! 3. **Construction failure is fatal** - a primitive that could not be built
//!    is reported through the context's [`FatalReporter`]
//!
//! ## Layering
//!
//! ```text
//!   ┌──────────────┐ ┌───────────┐ ┌───────────────────┐ ┌────────────────┐
//!   │ Mutex(Lock)  │ │ Semaphore │ │ ConditionVariable │ │ ReadWriteMutex │
//!   └──────┬───────┘ └─────┬─────┘ └─────────┬─────────┘ └───────┬────────┘
//!          │               │                 │            ┌──────┴──────┐
//!          │               │                 │            │ Event gates │
//!          ▼               ▼                 ▼            └──────┬──────┘
//!   ┌─────────────────────────────────────────────────────────────┴──────┐
//!   │        parking_lot::Mutex + parking_lot::Condvar (OS layer)        │
//!   └─────────────────────────────────────────────────────────────────────┘
//!   Every box draws handles from the SyncContext's HandleBudget.
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use oroboros_sync::{ReadWriteMutex, SyncContext};
//!
//! let ctx = SyncContext::default();
//! let chunks = ReadWriteMutex::new(&ctx);
//!
//! let mut lock = chunks.read();
//! // ...inspect...
//! lock.upgrade_to_write(); // NOT atomic: another writer may get in first
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod context;
pub mod error;
pub mod fatal;
pub mod lock;
mod os;
pub mod signal;

pub use config::SyncConfig;
pub use context::SyncContext;
pub use error::{SyncError, SyncResult};
pub use fatal::{AbortReporter, FatalReporter, PanicReporter};
pub use lock::{
    LockMode, LockState, Mutex, MutexLock, ReadWriteMutex, ReadWriteMutexLock, RwLockStats,
};
pub use os::PrimitiveKind;
pub use signal::{ConditionLock, ConditionVariable, Semaphore};
