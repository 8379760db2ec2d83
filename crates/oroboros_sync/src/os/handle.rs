//! # Handle Budget
//!
//! Every primitive holds one [`OsHandle`] per underlying OS object. Handles
//! come out of a shared [`HandleBudget`] and go back to it on drop.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{SyncError, SyncResult};

/// The kind of OS object a handle stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// Exclusive lock backing a [`Mutex`](crate::Mutex).
    Mutex,
    /// Counting semaphore.
    Semaphore,
    /// Native condition variable.
    ConditionVariable,
    /// Auto-reset or manual-reset event gate.
    Event,
    /// Internal exclusive lock of a [`ReadWriteMutex`](crate::ReadWriteMutex).
    ReadWriteMutex,
}

impl PrimitiveKind {
    /// Human-readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Mutex => "mutex",
            Self::Semaphore => "semaphore",
            Self::ConditionVariable => "condition variable",
            Self::Event => "event",
            Self::ReadWriteMutex => "read/write mutex",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug)]
struct BudgetInner {
    /// Number of handles currently alive.
    live: Mutex<usize>,
    /// `None` = unlimited.
    limit: Option<usize>,
}

/// Shared pool of handle slots.
#[derive(Clone, Debug)]
pub(crate) struct HandleBudget {
    inner: Arc<BudgetInner>,
}

impl HandleBudget {
    pub(crate) fn new(limit: Option<usize>) -> Self {
        Self {
            inner: Arc::new(BudgetInner {
                live: Mutex::new(0),
                limit,
            }),
        }
    }

    /// Number of handles currently alive.
    pub(crate) fn live(&self) -> usize {
        *self.inner.live.lock()
    }

    /// Takes one slot out of the budget.
    pub(crate) fn acquire(&self, kind: PrimitiveKind) -> SyncResult<OsHandle> {
        let mut live = self.inner.live.lock();
        if let Some(limit) = self.inner.limit {
            if *live >= limit {
                return Err(SyncError::HandleBudgetExhausted { kind, limit });
            }
        }
        *live += 1;
        tracing::debug!(%kind, live = *live, "handle allocated");

        Ok(OsHandle {
            budget: Arc::clone(&self.inner),
            kind,
        })
    }
}

/// One live OS object. Returns its slot to the budget on drop.
#[derive(Debug)]
pub(crate) struct OsHandle {
    budget: Arc<BudgetInner>,
    kind: PrimitiveKind,
}

impl Drop for OsHandle {
    fn drop(&mut self) {
        let mut live = self.budget.live.lock();
        debug_assert!(*live > 0, "handle budget underflow");
        *live = live.saturating_sub(1);
        tracing::trace!(kind = %self.kind, live = *live, "handle released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlimited_budget() {
        let budget = HandleBudget::new(None);
        let handles: Vec<_> = (0..100)
            .map(|_| budget.acquire(PrimitiveKind::Event).unwrap())
            .collect();
        assert_eq!(budget.live(), 100);
        drop(handles);
        assert_eq!(budget.live(), 0);
    }

    #[test]
    fn test_budget_exhaustion() {
        let budget = HandleBudget::new(Some(2));
        let a = budget.acquire(PrimitiveKind::Mutex).unwrap();
        let _b = budget.acquire(PrimitiveKind::Semaphore).unwrap();

        let err = budget.acquire(PrimitiveKind::Event).unwrap_err();
        assert_eq!(
            err,
            SyncError::HandleBudgetExhausted {
                kind: PrimitiveKind::Event,
                limit: 2
            }
        );

        // Releasing a handle frees its slot
        drop(a);
        let c = budget.acquire(PrimitiveKind::Event).unwrap();
        assert_eq!(c.kind, PrimitiveKind::Event);
        assert_eq!(budget.live(), 2);
    }

    #[test]
    fn test_clones_share_budget() {
        let budget = HandleBudget::new(Some(1));
        let other = budget.clone();
        let _h = budget.acquire(PrimitiveKind::Mutex).unwrap();
        assert!(other.acquire(PrimitiveKind::Mutex).is_err());
        assert_eq!(other.live(), 1);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(PrimitiveKind::ReadWriteMutex.to_string(), "read/write mutex");
        assert_eq!(PrimitiveKind::ConditionVariable.name(), "condition variable");
    }
}
