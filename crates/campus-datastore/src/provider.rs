//! Data store manager that dispatches to the configured backend.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use campus_core::config::datastore::DataStoreConfig;
use campus_core::result::AppResult;
use campus_core::traits::changes::ChangePublisher;
use campus_core::traits::datastore::DataStore;
use campus_core::types::filter::Filter;
use campus_core::types::row::Row;
use campus_core::types::sorting::OrderBy;

use crate::local::LocalStore;
use crate::remote::RemoteStore;

/// Data store manager that wraps the configured backend.
///
/// The backend is selected at construction time: remote settings present in
/// configuration select the hosted row store, otherwise the local fallback.
#[derive(Debug, Clone)]
pub struct DataStoreManager {
    /// The inner store backend.
    inner: Arc<dyn DataStore>,
}

impl DataStoreManager {
    /// Create a new data store manager from configuration.
    pub fn new(config: &DataStoreConfig) -> AppResult<Self> {
        Self::with_local_publisher(config, None)
    }

    /// Create a manager, attaching a change publisher to the local backend.
    ///
    /// Only the local backend publishes its own changes; the remote store
    /// has a server-side change feed.
    pub fn with_local_publisher(
        config: &DataStoreConfig,
        publisher: Option<Arc<dyn ChangePublisher>>,
    ) -> AppResult<Self> {
        let inner: Arc<dyn DataStore> = match &config.remote {
            Some(remote) => {
                info!(base_url = %remote.base_url, "Initializing remote data store backend");
                Arc::new(RemoteStore::new(remote)?)
            }
            None => {
                info!(data_dir = %config.local.data_dir, "Initializing local data store backend");
                let mut store = LocalStore::new(&config.local);
                if let Some(publisher) = publisher {
                    store = store.with_publisher(publisher);
                }
                Arc::new(store)
            }
        };

        Ok(Self { inner })
    }

    /// Create a manager from an existing backend (for testing).
    pub fn from_store(store: Arc<dyn DataStore>) -> Self {
        Self { inner: store }
    }

    /// Get a reference to the inner backend.
    pub fn store(&self) -> &dyn DataStore {
        self.inner.as_ref()
    }
}

#[async_trait]
impl DataStore for DataStoreManager {
    async fn read(
        &self,
        table: &str,
        filters: &[Filter],
        order: Option<&OrderBy>,
    ) -> AppResult<Vec<Row>> {
        self.inner.read(table, filters, order).await
    }

    async fn upsert(
        &self,
        table: &str,
        rows: Vec<Row>,
        conflict_target: Option<&[&str]>,
    ) -> AppResult<()> {
        self.inner.upsert(table, rows, conflict_target).await
    }

    async fn update(&self, table: &str, patch: Row, filters: &[Filter]) -> AppResult<()> {
        self.inner.update(table, patch, filters).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_core::config::datastore::RemoteStoreConfig;

    #[test]
    fn test_absent_remote_settings_select_local_backend() {
        let manager = DataStoreManager::new(&DataStoreConfig::default()).expect("manager");
        assert!(format!("{:?}", manager.store()).contains("LocalStore"));
    }

    #[test]
    fn test_remote_settings_select_remote_backend() {
        let config = DataStoreConfig {
            remote: Some(RemoteStoreConfig {
                base_url: "https://portal.example.edu/rest/v1".to_string(),
                service_key: "service-key".to_string(),
                timeout_seconds: 10,
            }),
            local: Default::default(),
        };
        let manager = DataStoreManager::new(&config).expect("manager");
        assert!(format!("{:?}", manager.store()).contains("RemoteStore"));
    }
}
