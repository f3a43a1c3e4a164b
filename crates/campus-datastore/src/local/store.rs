//! Process-local persistent row store.
//!
//! One JSON file per table under a configured data directory. Filters and
//! ordering are applied in memory. Trades cross-device consistency for
//! zero-configuration availability; callers above the store contract cannot
//! tell the backends apart.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use campus_core::config::datastore::LocalStoreConfig;
use campus_core::error::AppError;
use campus_core::result::AppResult;
use campus_core::traits::changes::{ChangeEvent, ChangePublisher};
use campus_core::traits::datastore::DataStore;
use campus_core::types::filter::Filter;
use campus_core::types::row::Row;
use campus_core::types::sorting::{OrderBy, SortDirection};

/// File-backed local store.
#[derive(Debug)]
pub struct LocalStore {
    /// Directory holding one JSON file per table.
    data_dir: PathBuf,
    /// Table name → rows, loaded lazily from disk.
    tables: RwLock<HashMap<String, Vec<Row>>>,
    /// Optional sink for change events emitted after successful mutations.
    publisher: Option<Arc<dyn ChangePublisher>>,
}

impl LocalStore {
    /// Create a new local store from configuration.
    pub fn new(config: &LocalStoreConfig) -> Self {
        Self {
            data_dir: PathBuf::from(&config.data_dir),
            tables: RwLock::new(HashMap::new()),
            publisher: None,
        }
    }

    /// Attach a change publisher notified after every successful mutation.
    pub fn with_publisher(mut self, publisher: Arc<dyn ChangePublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    fn table_path(&self, table: &str) -> PathBuf {
        self.data_dir.join(format!("{table}.json"))
    }

    /// Load a table from disk into memory if not already present.
    async fn ensure_loaded(&self, table: &str) -> AppResult<()> {
        {
            let tables = self.tables.read().await;
            if tables.contains_key(table) {
                return Ok(());
            }
        }

        let path = self.table_path(table);
        let rows: Vec<Row> = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        let mut tables = self.tables.write().await;
        tables.entry(table.to_string()).or_insert(rows);
        Ok(())
    }

    /// Write a table's rows back to its file.
    async fn persist(&self, table: &str, rows: &[Row]) -> AppResult<()> {
        tokio::fs::create_dir_all(&self.data_dir).await?;
        let bytes = serde_json::to_vec_pretty(rows)?;
        tokio::fs::write(self.table_path(table), bytes).await?;
        Ok(())
    }

    fn emit(&self, table: &str, row: &Row) {
        if let Some(publisher) = &self.publisher {
            publisher.publish(ChangeEvent::with_row(table, row.clone()));
        }
    }
}

#[async_trait]
impl DataStore for LocalStore {
    async fn read(
        &self,
        table: &str,
        filters: &[Filter],
        order: Option<&OrderBy>,
    ) -> AppResult<Vec<Row>> {
        self.ensure_loaded(table).await?;

        let tables = self.tables.read().await;
        let mut rows: Vec<Row> = tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| filters.iter().all(|f| f.matches(row)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        drop(tables);

        if let Some(order) = order {
            rows.sort_by(|a, b| {
                let ordering = compare_fields(a.get(&order.field), b.get(&order.field));
                match order.direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            });
        }

        debug!(table, count = rows.len(), "Read rows from local store");
        Ok(rows)
    }

    async fn upsert(
        &self,
        table: &str,
        rows: Vec<Row>,
        conflict_target: Option<&[&str]>,
    ) -> AppResult<()> {
        if rows.is_empty() {
            return Ok(());
        }

        // Validate the whole batch before touching the table, so a bad row
        // fails the batch without partial application.
        if let Some(columns) = conflict_target {
            for row in &rows {
                for column in columns {
                    if !row.contains_key(*column) {
                        return Err(AppError::validation(format!(
                            "Upsert row for '{table}' is missing conflict column '{column}'"
                        )));
                    }
                }
            }
        }

        self.ensure_loaded(table).await?;

        let mut tables = self.tables.write().await;
        let entries = tables.entry(table.to_string()).or_default();
        for row in &rows {
            let existing = conflict_target.and_then(|columns| {
                entries
                    .iter()
                    .position(|candidate| columns.iter().all(|col| candidate.get(*col) == row.get(*col)))
            });
            match existing {
                Some(index) => {
                    let slot = &mut entries[index];
                    for (key, value) in row {
                        slot.insert(key.clone(), value.clone());
                    }
                }
                None => entries.push(row.clone()),
            }
        }
        self.persist(table, entries).await?;
        drop(tables);

        debug!(table, count = rows.len(), "Upserted rows into local store");
        for row in &rows {
            self.emit(table, row);
        }
        Ok(())
    }

    async fn update(&self, table: &str, patch: Row, filters: &[Filter]) -> AppResult<()> {
        self.ensure_loaded(table).await?;

        let mut changed: Vec<Row> = Vec::new();
        let mut tables = self.tables.write().await;
        let entries = tables.entry(table.to_string()).or_default();
        for row in entries.iter_mut() {
            if filters.iter().all(|f| f.matches(row)) {
                for (key, value) in &patch {
                    row.insert(key.clone(), value.clone());
                }
                changed.push(row.clone());
            }
        }
        if !changed.is_empty() {
            self.persist(table, entries).await?;
        }
        drop(tables);

        debug!(table, count = changed.len(), "Updated rows in local store");
        for row in &changed {
            self.emit(table, row);
        }
        Ok(())
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

/// Order two field values. Missing fields sort as null, before any value.
fn compare_fields(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.unwrap_or(&Value::Null);
    let b = b.unwrap_or(&Value::Null);
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_core::types::filter::Filter;
    use serde_json::json;
    use std::sync::Mutex;

    fn make_store() -> LocalStore {
        let dir = std::env::temp_dir().join(format!("campus-local-store-{}", uuid::Uuid::new_v4()));
        LocalStore::new(&LocalStoreConfig {
            data_dir: dir.to_string_lossy().into_owned(),
        })
    }

    fn row(value: serde_json::Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => panic!("test rows must be objects"),
        }
    }

    #[derive(Debug, Default)]
    struct RecordingPublisher {
        events: Mutex<Vec<ChangeEvent>>,
    }

    impl ChangePublisher for RecordingPublisher {
        fn publish(&self, event: ChangeEvent) {
            self.events.lock().expect("lock").push(event);
        }
    }

    #[tokio::test]
    async fn test_upsert_read_filter_order() {
        let store = make_store();
        store
            .upsert(
                "notices",
                vec![
                    row(json!({"id": "a", "is_active": true, "created_at": "2026-01-01T00:00:00Z"})),
                    row(json!({"id": "b", "is_active": false, "created_at": "2026-01-02T00:00:00Z"})),
                    row(json!({"id": "c", "is_active": true, "created_at": "2026-01-03T00:00:00Z"})),
                ],
                None,
            )
            .await
            .expect("upsert");

        let rows = store
            .read(
                "notices",
                &[Filter::eq("is_active", true)],
                Some(&OrderBy::desc("created_at")),
            )
            .await
            .expect("read");

        let ids: Vec<&str> = rows
            .iter()
            .filter_map(|r| r.get("id").and_then(Value::as_str))
            .collect();
        assert_eq!(ids, vec!["c", "a"]);
    }

    #[tokio::test]
    async fn test_upsert_with_conflict_target_is_idempotent() {
        let store = make_store();
        let entry = row(json!({"notice_id": "n-1", "user_id": "u-1", "marked_at": "t1"}));
        let target = ["notice_id", "user_id"];

        store
            .upsert("notice_reads", vec![entry.clone()], Some(&target))
            .await
            .expect("first upsert");
        store
            .upsert("notice_reads", vec![entry], Some(&target))
            .await
            .expect("second upsert");

        let rows = store.read("notice_reads", &[], None).await.expect("read");
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_batch_with_missing_conflict_column_is_rejected_whole() {
        let store = make_store();
        let target = ["notice_id", "user_id"];
        let result = store
            .upsert(
                "notice_reads",
                vec![
                    row(json!({"notice_id": "n-1", "user_id": "u-1"})),
                    row(json!({"notice_id": "n-2"})),
                ],
                Some(&target),
            )
            .await;

        assert!(result.is_err());
        let rows = store.read("notice_reads", &[], None).await.expect("read");
        assert!(rows.is_empty(), "no row of the bad batch may be applied");
    }

    #[tokio::test]
    async fn test_update_patches_matching_rows_only() {
        let store = make_store();
        store
            .upsert(
                "notices",
                vec![
                    row(json!({"id": "a", "is_active": true})),
                    row(json!({"id": "b", "is_active": true})),
                ],
                None,
            )
            .await
            .expect("upsert");

        store
            .update(
                "notices",
                row(json!({"is_active": false})),
                &[Filter::eq("id", "a")],
            )
            .await
            .expect("update");

        let active = store
            .read("notices", &[Filter::eq("is_active", true)], None)
            .await
            .expect("read");
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].get("id").and_then(Value::as_str), Some("b"));
    }

    #[tokio::test]
    async fn test_rows_survive_reload() {
        let dir = std::env::temp_dir().join(format!("campus-local-store-{}", uuid::Uuid::new_v4()));
        let config = LocalStoreConfig {
            data_dir: dir.to_string_lossy().into_owned(),
        };

        let store = LocalStore::new(&config);
        store
            .upsert("notices", vec![row(json!({"id": "a"}))], None)
            .await
            .expect("upsert");

        let reloaded = LocalStore::new(&config);
        let rows = reloaded.read("notices", &[], None).await.expect("read");
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_mutations_publish_change_events() {
        let publisher = Arc::new(RecordingPublisher::default());
        let dir = std::env::temp_dir().join(format!("campus-local-store-{}", uuid::Uuid::new_v4()));
        let store = LocalStore::new(&LocalStoreConfig {
            data_dir: dir.to_string_lossy().into_owned(),
        })
        .with_publisher(Arc::clone(&publisher) as Arc<dyn ChangePublisher>);

        store
            .upsert("notices", vec![row(json!({"id": "a"}))], None)
            .await
            .expect("upsert");

        let events = publisher.events.lock().expect("lock");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].table, "notices");
        assert!(events[0].row.is_some());
    }
}
