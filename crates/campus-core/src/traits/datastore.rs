//! The row-oriented data store contract.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::result::AppResult;
use crate::types::filter::Filter;
use crate::types::row::{Row, from_rows, to_row};
use crate::types::sorting::OrderBy;

/// Trait for row-store backends (hosted remote store or local fallback).
///
/// All operations are asynchronous and may fail with a transport or
/// policy-rejection error. Implementations provide per-row atomicity at
/// minimum; batch callers that need all-or-nothing behavior treat any row
/// failure as failure of the whole operation.
#[async_trait]
pub trait DataStore: Send + Sync + std::fmt::Debug + 'static {
    /// Read rows from a table, restricted by `filters` and optionally ordered.
    ///
    /// The returned sequence preserves the requested order.
    async fn read(
        &self,
        table: &str,
        filters: &[Filter],
        order: Option<&OrderBy>,
    ) -> AppResult<Vec<Row>>;

    /// Insert or update one or many rows.
    ///
    /// When `conflict_target` names a column set, a row whose target columns
    /// match an existing row replaces it instead of failing, which makes the
    /// operation idempotent. The whole batch either commits or fails as a
    /// unit as observed by the caller.
    async fn upsert(
        &self,
        table: &str,
        rows: Vec<Row>,
        conflict_target: Option<&[&str]>,
    ) -> AppResult<()>;

    /// Apply a partial row to every row matching the equality filters.
    async fn update(&self, table: &str, patch: Row, filters: &[Filter]) -> AppResult<()>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Read rows and deserialize them into typed entities.
    async fn read_as<T: DeserializeOwned + Send>(
        &self,
        table: &str,
        filters: &[Filter],
        order: Option<&OrderBy>,
    ) -> AppResult<Vec<T>>
    where
        Self: Sized,
    {
        let rows = self.read(table, filters, order).await?;
        from_rows(rows)
    }

    /// Upsert a single typed entity.
    async fn upsert_one<T: Serialize + Send + Sync>(
        &self,
        table: &str,
        entity: &T,
        conflict_target: Option<&[&str]>,
    ) -> AppResult<()>
    where
        Self: Sized,
    {
        let row = to_row(entity)?;
        self.upsert(table, vec![row], conflict_target).await
    }
}
