//! # Sync Error Types
//!
//! Steady-state operations never fail: they block until satisfied.
//! These errors only come out of construction and configuration.

use thiserror::Error;

use crate::os::PrimitiveKind;

/// Errors that can occur while building synchronization primitives.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// The context ran out of OS handles.
    #[error("handle budget exhausted: cannot create {kind}, limit is {limit} handles")]
    HandleBudgetExhausted {
        /// The primitive that was being created.
        kind: PrimitiveKind,
        /// The configured handle limit.
        limit: usize,
    },

    /// Semaphore initial count exceeds the maximum count.
    #[error("invalid semaphore count: initial {initial} exceeds maximum {max}")]
    InvalidSemaphoreCount {
        /// Requested initial count.
        initial: u32,
        /// Configured maximum count.
        max: u32,
    },

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for sync construction.
pub type SyncResult<T> = Result<T, SyncError>;
