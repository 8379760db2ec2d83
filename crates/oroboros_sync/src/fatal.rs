//! # Fatal Error Reporting
//!
//! A primitive that could not be constructed leaves the engine without its
//! concurrency guarantees. There is no recovery: the failure is handed to a
//! [`FatalReporter`], which never returns.
//!
//! The reporter is injected through [`SyncContext`](crate::SyncContext)
//! instead of living in a global, so tests and embedders choose how the
//! process dies.

/// Process-wide fatal error sink.
pub trait FatalReporter: Send + Sync {
    /// Reports an unrecoverable failure. Must not return.
    fn report(&self, message: &str) -> !;
}

/// Logs the failure and aborts the process.
///
/// This is the default reporter.
#[derive(Clone, Copy, Debug, Default)]
pub struct AbortReporter;

impl FatalReporter for AbortReporter {
    fn report(&self, message: &str) -> ! {
        tracing::error!(reason = message, "fatal synchronization failure, aborting");
        std::process::abort()
    }
}

/// Panics with the failure message.
///
/// Useful in tests, or in hosts that catch unwinds at a thread boundary.
#[derive(Clone, Copy, Debug, Default)]
pub struct PanicReporter;

impl FatalReporter for PanicReporter {
    fn report(&self, message: &str) -> ! {
        panic!("fatal synchronization failure: {message}")
    }
}
