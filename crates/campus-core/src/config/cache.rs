//! Merged-view cache configuration.

use serde::{Deserialize, Serialize};

/// Settings for the per-user merged-view cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewCacheConfig {
    /// How long a cached merged view stays fresh, in seconds.
    #[serde(default = "default_freshness")]
    pub freshness_seconds: u64,
    /// Maximum number of users whose views are cached at once.
    #[serde(default = "default_max_users")]
    pub max_users: u64,
}

impl Default for ViewCacheConfig {
    fn default() -> Self {
        Self {
            freshness_seconds: default_freshness(),
            max_users: default_max_users(),
        }
    }
}

fn default_freshness() -> u64 {
    120
}

fn default_max_users() -> u64 {
    10_000
}
