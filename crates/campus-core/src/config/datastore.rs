//! Data store backend configuration.

use serde::{Deserialize, Serialize};

/// Top-level data store configuration.
///
/// The backend is chosen once at startup: when [`DataStoreConfig::remote`]
/// is present the hosted row store is used, otherwise the local file-backed
/// fallback.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataStoreConfig {
    /// Remote row store settings. Presence of this section selects the
    /// remote backend.
    pub remote: Option<RemoteStoreConfig>,
    /// Local fallback store settings.
    #[serde(default)]
    pub local: LocalStoreConfig,
}

/// Remote row store backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteStoreConfig {
    /// Base URL of the hosted row store's REST endpoint.
    pub base_url: String,
    /// Service key sent with every request.
    pub service_key: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

/// Local fallback store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalStoreConfig {
    /// Directory holding one JSON file per table.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for LocalStoreConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_timeout() -> u64 {
    10
}

fn default_data_dir() -> String {
    "data/tables".to_string()
}
