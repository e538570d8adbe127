//! Store configuration

use serde::{Deserialize, Serialize};

/// Default number of undo steps kept
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Default persistence key
pub const DEFAULT_STORAGE_KEY: &str = "formkit-storage";

/// Schema store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Maximum undo steps; the oldest snapshot is dropped beyond this.
    /// `0` disables history.
    pub history_capacity: usize,
    /// Key under which theme and schema are persisted
    pub storage_key: String,
    /// Write through to the blob store on every change
    pub persist: bool,
}

impl StoreConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With history capacity
    #[inline]
    #[must_use]
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// With storage key
    #[inline]
    #[must_use]
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// With persistence on or off
    #[inline]
    #[must_use]
    pub fn with_persist(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            persist: true,
        }
    }
}
