//! # Sync Configuration
//!
//! Loaded once at startup from TOML:
//!
//! ```toml
//! # Upper bound on live OS handles. Omit for no limit.
//! max_handles = 4096
//! # Largest count a semaphore may hold.
//! semaphore_max_count = 65535
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SyncError, SyncResult};

/// Default semaphore ceiling (the largest signed 32-bit count).
pub const DEFAULT_SEMAPHORE_MAX_COUNT: u32 = 0x7FFF_FFFF;

/// Configuration for a [`SyncContext`](crate::SyncContext).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    /// Maximum number of live OS handles. `None` means unlimited.
    pub max_handles: Option<usize>,
    /// Maximum count any semaphore may reach.
    pub semaphore_max_count: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_handles: None,
            semaphore_max_count: DEFAULT_SEMAPHORE_MAX_COUNT,
        }
    }
}

impl SyncConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidConfig`] on malformed TOML, unknown keys,
    /// or values rejected by [`SyncConfig::validate`].
    pub fn from_toml_str(source: &str) -> SyncResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| SyncError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidConfig`] if the file cannot be read or
    /// does not parse.
    pub fn load(path: impl AsRef<Path>) -> SyncResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            SyncError::InvalidConfig(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&source)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidConfig`] if `max_handles` is zero or
    /// `semaphore_max_count` is zero.
    pub fn validate(&self) -> SyncResult<()> {
        if self.max_handles == Some(0) {
            return Err(SyncError::InvalidConfig(
                "max_handles must be greater than zero".to_string(),
            ));
        }
        if self.semaphore_max_count == 0 {
            return Err(SyncError::InvalidConfig(
                "semaphore_max_count must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Sets the handle limit.
    ///
    /// Builders do not validate; [`SyncContext::new`](crate::SyncContext::new)
    /// checks the result in debug builds.
    #[must_use]
    pub const fn with_max_handles(mut self, max_handles: usize) -> Self {
        self.max_handles = Some(max_handles);
        self
    }

    /// Sets the semaphore ceiling.
    #[must_use]
    pub const fn with_semaphore_max_count(mut self, max: u32) -> Self {
        self.semaphore_max_count = max;
        self
    }
}
