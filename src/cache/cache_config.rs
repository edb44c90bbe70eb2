//! Cache configuration

use serde::{Deserialize, Serialize};

/// Query cache configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Age after which an entry is refetched on next access even without invalidation
    pub stale_after_secs: u64,
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_after_secs: 60,
            max_entries: 500,
        }
    }
}
