//! # Sync Context
//!
//! Factory state shared by every primitive: configuration, the handle budget
//! and the fatal reporter. Construct one per engine (or per test) and pass it
//! to the primitive constructors.

use std::fmt;
use std::sync::Arc;

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::fatal::{AbortReporter, FatalReporter};
use crate::os::{HandleBudget, OsHandle, PrimitiveKind};

/// Shared construction context for synchronization primitives.
///
/// Cloning is cheap; clones share the same handle budget.
#[derive(Clone)]
pub struct SyncContext {
    config: SyncConfig,
    budget: HandleBudget,
    reporter: Arc<dyn FatalReporter>,
}

impl SyncContext {
    /// Creates a context with an explicit fatal reporter.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if `config` fails [`SyncConfig::validate`].
    #[must_use]
    pub fn new(config: SyncConfig, reporter: Arc<dyn FatalReporter>) -> Self {
        debug_assert!(
            config.validate().is_ok(),
            "invalid sync config: {:?}",
            config.validate()
        );
        tracing::debug!(
            max_handles = ?config.max_handles,
            semaphore_max_count = config.semaphore_max_count,
            "sync context created"
        );
        Self {
            budget: HandleBudget::new(config.max_handles),
            config,
            reporter,
        }
    }

    /// Creates a context that aborts the process on construction failure.
    #[must_use]
    pub fn from_config(config: SyncConfig) -> Self {
        Self::new(config, Arc::new(AbortReporter))
    }

    /// Returns the configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Returns the number of OS handles currently held by primitives built
    /// from this context (and its clones).
    #[must_use]
    pub fn live_handles(&self) -> usize {
        self.budget.live()
    }

    pub(crate) fn allocate(&self, kind: PrimitiveKind) -> SyncResult<OsHandle> {
        self.budget.acquire(kind)
    }

    /// Unwraps a construction result, reporting failure as fatal.
    pub(crate) fn unwrap_or_fatal<T>(&self, result: SyncResult<T>) -> T {
        match result {
            Ok(value) => value,
            Err(err) => self.fatal(&err),
        }
    }

    fn fatal(&self, err: &SyncError) -> ! {
        tracing::error!(error = %err, "synchronization primitive construction failed");
        self.reporter.report(&err.to_string())
    }
}

impl Default for SyncContext {
    fn default() -> Self {
        Self::from_config(SyncConfig::default())
    }
}

impl fmt::Debug for SyncContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncContext")
            .field("config", &self.config)
            .field("live_handles", &self.live_handles())
            .finish_non_exhaustive()
    }
}
