//! Remote row store operations.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use campus_core::result::AppResult;
use campus_core::traits::datastore::DataStore;
use campus_core::types::filter::Filter;
use campus_core::types::row::Row;
use campus_core::types::sorting::OrderBy;

use super::client::RemoteStore;

#[async_trait]
impl DataStore for RemoteStore {
    async fn read(
        &self,
        table: &str,
        filters: &[Filter],
        order: Option<&OrderBy>,
    ) -> AppResult<Vec<Row>> {
        let mut query: Vec<(String, String)> =
            filters.iter().map(Filter::as_query_pair).collect();
        if let Some(order) = order {
            query.push(("order".to_string(), order.as_query_value()));
        }

        let response = self
            .http()
            .get(self.endpoint(table))
            .query(&query)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::reject(response).await);
        }

        let rows: Vec<Row> = response.json().await?;
        debug!(table, count = rows.len(), "Read rows from remote store");
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

        let mut request = self
            .http()
            .post(self.endpoint(table))
            .header("Prefer", "resolution=merge-duplicates,return=minimal");
        if let Some(columns) = conflict_target {
            request = request.query(&[("on_conflict", columns.join(","))]);
        }

        // The store applies the posted array as one statement, so the batch
        // commits or fails as a unit.
        let count = rows.len();
        let response = request.json(&rows).send().await?;
        if !response.status().is_success() {
            return Err(Self::reject(response).await);
        }

        debug!(table, count, "Upserted rows into remote store");
        Ok(())
    }

    async fn update(&self, table: &str, patch: Row, filters: &[Filter]) -> AppResult<()> {
        let query: Vec<(String, String)> = filters.iter().map(Filter::as_query_pair).collect();

        let response = self
            .http()
            .patch(self.endpoint(table))
            .query(&query)
            .header("Prefer", "return=minimal")
            .json(&Value::Object(patch))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::reject(response).await);
        }

        debug!(table, "Updated rows in remote store");
        Ok(())
    }

    async fn health_check(&self) -> AppResult<bool> {
        match self.http().head(self.base_url()).send().await {
            Ok(response) => Ok(!response.status().is_server_error()),
            Err(_) => Ok(false),
        }
    }
}
