//! Merged-view computation, caching, and mark-read mutations.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::debug;

use campus_core::config::cache::ViewCacheConfig;
use campus_core::error::AppError;
use campus_core::result::AppResult;
use campus_core::traits::datastore::DataStore;
use campus_core::types::filter::Filter;
use campus_core::types::row::to_row;
use campus_core::types::sorting::OrderBy;
use campus_core::types::{NoticeId, UserId};
use campus_datastore::DataStoreManager;
use campus_entity::notice::{MergedNotice, Notice, ReadState};

/// Count of unread entries in a merged view.
///
/// A pure projection; never fetched or cached independently.
pub fn unread_count(view: &[MergedNotice]) -> usize {
    view.iter().filter(|merged| merged.is_unread()).count()
}

/// The notice store.
///
/// Owns the per-user merged-view cache exclusively. Mutations invalidate
/// the cache on success rather than editing it in place, so a failed write
/// can never surface a false "read" status.
#[derive(Debug)]
pub struct NoticeStore {
    /// The backing data store.
    store: DataStoreManager,
    /// Merged views keyed by user, fresh for the configured window.
    views: Cache<UserId, Arc<Vec<MergedNotice>>>,
}

impl NoticeStore {
    /// Create a notice store over a data store backend.
    pub fn new(store: DataStoreManager, config: &ViewCacheConfig) -> Self {
        let views = Cache::builder()
            .max_capacity(config.max_users)
            .time_to_live(Duration::from_secs(config.freshness_seconds))
            .build();
        Self { store, views }
    }

    /// Fetch the merged view for a user.
    ///
    /// Without a user there is nothing to merge: returns an empty view and
    /// never contacts the store. Otherwise returns the cached view when
    /// fresh; concurrent fetches for the same user collapse into a single
    /// underlying read pair.
    pub async fn fetch_merged(
        &self,
        user_id: Option<UserId>,
    ) -> AppResult<Arc<Vec<MergedNotice>>> {
        let Some(user_id) = user_id else {
            return Ok(Arc::new(Vec::new()));
        };

        self.views
            .try_get_with(user_id, async {
                self.load_merged(user_id).await.map(Arc::new)
            })
            .await
            .map_err(|e: Arc<AppError>| (*e).clone())
    }

    /// Drop the cached view and fetch a fresh one.
    pub async fn refresh(&self, user_id: UserId) -> AppResult<Arc<Vec<MergedNotice>>> {
        self.views.invalidate(&user_id).await;
        self.fetch_merged(Some(user_id)).await
    }

    /// Drop a user's cached view so the next fetch re-derives it.
    pub async fn invalidate(&self, user_id: UserId) {
        self.views.invalidate(&user_id).await;
        debug!(%user_id, "Invalidated cached merged view");
    }

    /// Mark one notice read for a user. Idempotent.
    pub async fn mark_read(&self, user_id: Option<UserId>, notice_id: NoticeId) -> AppResult<()> {
        self.mark_many_read(user_id, &[notice_id]).await
    }

    /// Mark many notices read for a user as one batch.
    ///
    /// The batch commits or fails as a unit; the cached view is invalidated
    /// only after the whole batch succeeds. An empty batch succeeds without
    /// contacting the store.
    pub async fn mark_many_read(
        &self,
        user_id: Option<UserId>,
        notice_ids: &[NoticeId],
    ) -> AppResult<()> {
        let user_id = user_id.ok_or_else(|| {
            AppError::unauthenticated("Marking notices read requires a signed-in user")
        })?;
        if notice_ids.is_empty() {
            return Ok(());
        }

        let rows = notice_ids
            .iter()
            .map(|notice_id| to_row(&ReadState::new(*notice_id, user_id)))
            .collect::<AppResult<Vec<_>>>()?;

        self.store
            .upsert(
                ReadState::TABLE,
                rows,
                Some(ReadState::CONFLICT_TARGET.as_slice()),
            )
            .await?;

        debug!(%user_id, count = notice_ids.len(), "Marked notices read");
        self.invalidate(user_id).await;
        Ok(())
    }

    /// Issue the two reads and merge them.
    ///
    /// Both halves must succeed; a view merged against missing read states
    /// would default `is_read` incorrectly, so either failure fails the
    /// whole fetch.
    async fn load_merged(&self, user_id: UserId) -> AppResult<Vec<MergedNotice>> {
        let active = Filter::eq("is_active", true);
        let newest_first = OrderBy::desc("created_at");
        let for_user = Filter::eq("user_id", user_id);

        let (notices, reads) = futures::try_join!(
            self.store
                .read_as::<Notice>(Notice::TABLE, std::slice::from_ref(&active), Some(&newest_first)),
            self.store
                .read_as::<ReadState>(ReadState::TABLE, std::slice::from_ref(&for_user), None),
        )?;

        let read_ids: HashSet<NoticeId> =
            reads.into_iter().map(|state| state.notice_id).collect();
        debug!(%user_id, notices = notices.len(), read = read_ids.len(), "Recomputed merged view");

        // Membership lookup only; the notices read already ordered the view.
        Ok(notices
            .into_iter()
            .map(|notice| {
                let is_read = read_ids.contains(&notice.id);
                MergedNotice::new(notice, is_read)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn notice(title: &str) -> Notice {
        Notice {
            id: NoticeId::new(),
            title: title.to_string(),
            content: "body".to_string(),
            is_active: true,
            created_by: None,
            department_id: None,
            batch_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_unread_count_counts_unread_only() {
        let view = vec![
            MergedNotice::new(notice("a"), false),
            MergedNotice::new(notice("b"), true),
            MergedNotice::new(notice("c"), false),
        ];
        assert_eq!(unread_count(&view), 2);
        assert_eq!(unread_count(&[]), 0);
    }
}
