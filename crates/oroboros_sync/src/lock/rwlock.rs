//! # Read/Write Mutex
//!
//! N readers or 1 writer, with **writer priority**: once a writer is queued,
//! newly arriving readers wait behind it. Continuous read load can never
//! starve a writer.
//!
//! ## Architecture
//!
//! ```text
//!                  ┌──────────────────────────────────────────┐
//!                  │             ReadWriteMutex               │
//!                  │                                          │
//!                  │  state lock ─▶ LockState                 │
//!                  │                  Unlocked                │
//!                  │                  ReadLocked(n)           │
//!                  │                  WriteLocked             │
//!                  │                waiting_readers           │
//!                  │                waiting_writers           │
//!                  │                                          │
//!                  │  readers_gate  (manual reset, sticky)    │
//!                  │  writer_ticket (auto reset, capacity 1)  │
//!                  └──────────────────────────────────────────┘
//! ```
//!
//! ## Hand-off
//!
//! A releasing owner that finds a queued writer does not unlock. It moves the
//! state straight to `WriteLocked` and sets the writer ticket; the woken
//! writer already owns the lock. There is no window in which a third thread
//! can slip in between release and grant.
//!
//! Readers are released in bulk: the last writer out opens the sticky
//! readers gate (after dropping the state lock) and every queued reader
//! re-checks the state.

use std::fmt;

use parking_lot::MutexGuard;

use crate::context::SyncContext;
use crate::error::SyncResult;
use crate::os::{Event, EventReset, OsHandle, PrimitiveKind};

/// Held mode of a [`ReadWriteMutexLock`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LockMode {
    /// Shared access.
    Read,
    /// Exclusive access.
    Write,
}

/// Active ownership of a [`ReadWriteMutex`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LockState {
    /// Nobody holds the lock.
    Unlocked,
    /// Held by `n >= 1` readers.
    ReadLocked(usize),
    /// Held by exactly one writer.
    WriteLocked,
}

impl LockState {
    /// Number of active readers.
    #[inline]
    #[must_use]
    pub const fn readers(self) -> usize {
        match self {
            Self::ReadLocked(n) => n,
            Self::Unlocked | Self::WriteLocked => 0,
        }
    }

    /// Whether a writer holds the lock.
    #[inline]
    #[must_use]
    pub const fn is_write_locked(self) -> bool {
        matches!(self, Self::WriteLocked)
    }
}

/// Snapshot of a [`ReadWriteMutex`]'s bookkeeping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RwLockStats {
    /// Current owner(s).
    pub state: LockState,
    /// Readers blocked behind a writer.
    pub waiting_readers: usize,
    /// Writers blocked on the ticket.
    pub waiting_writers: usize,
}

impl RwLockStats {
    /// Nobody holds or waits for the lock.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self.state, LockState::Unlocked)
            && self.waiting_readers == 0
            && self.waiting_writers == 0
    }
}

/// Everything behind the state lock.
#[derive(Debug)]
struct RwState {
    lock: LockState,
    waiting_readers: usize,
    waiting_writers: usize,
}

impl RwState {
    /// Writer active or queued: new readers must wait.
    #[inline]
    fn readers_must_wait(&self) -> bool {
        self.lock.is_write_locked() || self.waiting_writers > 0
    }

    /// Admits one reader. Returns the new reader count.
    fn admit_reader(&mut self) -> usize {
        let readers = match self.lock {
            LockState::Unlocked => 1,
            LockState::ReadLocked(n) => n + 1,
            LockState::WriteLocked => unreachable!("reader admitted while a writer holds the lock"),
        };
        self.lock = LockState::ReadLocked(readers);
        readers
    }

    /// Passes ownership to one queued writer. The state never goes through
    /// `Unlocked`.
    fn hand_to_writer(&mut self) {
        debug_assert!(self.waiting_writers > 0);
        self.waiting_writers -= 1;
        self.lock = LockState::WriteLocked;
    }
}

/// Reader/writer lock with writer priority.
///
/// ## Usage
///
/// ```rust,ignore
/// let rw = ReadWriteMutex::new(&ctx);
///
/// {
///     let _read = rw.read();      // shared with other readers
/// }
/// {
///     let _write = rw.write();    // exclusive
/// }
/// ```
pub struct ReadWriteMutex {
    state: parking_lot::Mutex<RwState>,
    /// Sticky gate: readers may proceed.
    readers_gate: Event,
    /// Capacity-1 gate: ownership for one writer.
    writer_ticket: Event,
    _handle: OsHandle,
}

impl ReadWriteMutex {
    /// Creates an unlocked read/write mutex, treating failure as fatal.
    #[must_use]
    pub fn new(ctx: &SyncContext) -> Self {
        ctx.unwrap_or_fatal(Self::try_new(ctx))
    }

    /// Creates an unlocked read/write mutex.
    ///
    /// Consumes three handles: the state lock and the two gates.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::HandleBudgetExhausted`](crate::SyncError) when the
    /// context cannot supply all three handles. Handles taken before the
    /// failure are returned.
    pub fn try_new(ctx: &SyncContext) -> SyncResult<Self> {
        let handle = ctx.allocate(PrimitiveKind::ReadWriteMutex)?;
        let readers_gate = Event::new(ctx, EventReset::Manual)?;
        let writer_ticket = Event::new(ctx, EventReset::Auto)?;

        Ok(Self {
            state: parking_lot::Mutex::new(RwState {
                lock: LockState::Unlocked,
                waiting_readers: 0,
                waiting_writers: 0,
            }),
            readers_gate,
            writer_ticket,
            _handle: handle,
        })
    }

    /// Blocks until shared access is granted.
    ///
    /// Waits while a writer holds the lock or any writer is queued.
    pub fn acquire_read(&self) {
        let mut state = self.state.lock();

        if state.readers_must_wait() {
            state.waiting_readers += 1;
            while state.readers_must_wait() {
                // Closed under the state lock while the condition holds; the
                // writer that clears the condition opens it again afterwards.
                self.readers_gate.reset();
                MutexGuard::unlocked(&mut state, || self.readers_gate.wait());
            }
            state.waiting_readers -= 1;
        }

        let readers = state.admit_reader();
        let wake_queued = readers == 1 && state.waiting_readers > 0;
        drop(state);

        if wake_queued {
            self.readers_gate.set();
        }
    }

    /// Blocks until exclusive access is granted.
    ///
    /// If the lock is held, queues on the writer ticket; the thread that
    /// releases the lock hands ownership over directly.
    pub fn acquire_write(&self) {
        let mut state = self.state.lock();

        if state.lock == LockState::Unlocked {
            state.lock = LockState::WriteLocked;
            return;
        }

        state.waiting_writers += 1;
        drop(state);

        // Ownership arrives already exclusive
        self.writer_ticket.wait();
    }

    /// Releases one shared hold.
    ///
    /// The last reader out hands the lock to a queued writer, if any.
    pub fn release_read(&self) {
        let mut state = self.state.lock();

        let LockState::ReadLocked(readers) = state.lock else {
            debug_assert!(false, "release_read without a read hold: {:?}", state.lock);
            return;
        };

        if readers > 1 {
            state.lock = LockState::ReadLocked(readers - 1);
            return;
        }

        if state.waiting_writers > 0 {
            self.readers_gate.reset();
            state.hand_to_writer();
            tracing::trace!(
                waiting_writers = state.waiting_writers,
                "last reader handed lock to writer"
            );
            self.writer_ticket.set();
        } else {
            state.lock = LockState::Unlocked;
        }
    }

    /// Releases the exclusive hold.
    ///
    /// Hands off to the next queued writer if there is one; otherwise unlocks
    /// and opens the gate for queued readers.
    pub fn release_write(&self) {
        let mut state = self.state.lock();

        if state.lock != LockState::WriteLocked {
            debug_assert!(false, "release_write without a write hold: {:?}", state.lock);
            return;
        }

        if state.waiting_writers > 0 {
            state.hand_to_writer();
            tracing::trace!(
                waiting_writers = state.waiting_writers,
                "writer handed lock to writer"
            );
            self.writer_ticket.set();
            return;
        }

        state.lock = LockState::Unlocked;
        let open_gate = state.waiting_readers > 0;
        drop(state);

        if open_gate {
            self.readers_gate.set();
        }
    }

    /// Acquires in the given mode.
    pub fn acquire(&self, mode: LockMode) {
        match mode {
            LockMode::Read => self.acquire_read(),
            LockMode::Write => self.acquire_write(),
        }
    }

    /// Releases the given mode.
    pub fn release(&self, mode: LockMode) {
        match mode {
            LockMode::Read => self.release_read(),
            LockMode::Write => self.release_write(),
        }
    }

    /// Scoped shared access.
    #[inline]
    pub fn read(&self) -> ReadWriteMutexLock<'_> {
        ReadWriteMutexLock::new(self, LockMode::Read)
    }

    /// Scoped exclusive access.
    #[inline]
    pub fn write(&self) -> ReadWriteMutexLock<'_> {
        ReadWriteMutexLock::new(self, LockMode::Write)
    }

    /// Scoped access in the given mode.
    #[inline]
    pub fn lock(&self, mode: LockMode) -> ReadWriteMutexLock<'_> {
        ReadWriteMutexLock::new(self, mode)
    }

    /// Returns a snapshot of the bookkeeping.
    ///
    /// Stale as soon as it returns; meant for diagnostics and tests.
    #[must_use]
    pub fn stats(&self) -> RwLockStats {
        let state = self.state.lock();
        RwLockStats {
            state: state.lock,
            waiting_readers: state.waiting_readers,
            waiting_writers: state.waiting_writers,
        }
    }
}

impl fmt::Debug for ReadWriteMutex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadWriteMutex")
            .field("stats", &self.stats())
            .finish()
    }
}

/// Scoped hold on a [`ReadWriteMutex`].
///
/// Releases whatever mode it holds on drop.
///
/// ## Mode changes are NOT atomic
///
/// [`upgrade_to_write`](Self::upgrade_to_write) and
/// [`downgrade_to_read`](Self::downgrade_to_read) drop the current hold and
/// then reacquire in the new mode. Another thread can take the lock in
/// between, so anything observed under the old mode must be re-validated.
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct ReadWriteMutexLock<'a> {
    mutex: &'a ReadWriteMutex,
    mode: LockMode,
}

impl<'a> ReadWriteMutexLock<'a> {
    /// Blocks until `mutex` is held in `mode`.
    pub fn new(mutex: &'a ReadWriteMutex, mode: LockMode) -> Self {
        mutex.acquire(mode);
        Self { mutex, mode }
    }

    /// Currently held mode.
    #[inline]
    #[must_use]
    pub fn mode(&self) -> LockMode {
        self.mode
    }

    /// Drops the read hold, then blocks for a write hold.
    ///
    /// Not atomic: a writer queued elsewhere may run first.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if the guard does not hold `Read`.
    pub fn upgrade_to_write(&mut self) {
        debug_assert_eq!(self.mode, LockMode::Read, "upgrade_to_write requires a read hold");
        if self.mode != LockMode::Read {
            return;
        }

        self.mutex.release_read();
        self.mutex.acquire_write();
        self.mode = LockMode::Write;
    }

    /// Drops the write hold, then blocks for a read hold.
    ///
    /// Not atomic: a queued writer takes the lock first if there is one.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if the guard does not hold `Write`.
    pub fn downgrade_to_read(&mut self) {
        debug_assert_eq!(self.mode, LockMode::Write, "downgrade_to_read requires a write hold");
        if self.mode != LockMode::Write {
            return;
        }

        self.mutex.release_write();
        self.mutex.acquire_read();
        self.mode = LockMode::Read;
    }
}

impl Drop for ReadWriteMutexLock<'_> {
    fn drop(&mut self) {
        self.mutex.release(self.mode);
    }
}

impl fmt::Debug for ReadWriteMutexLock<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadWriteMutexLock")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}
