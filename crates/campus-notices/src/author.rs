//! Notice authoring for faculty and admin flows.

use chrono::Utc;
use serde_json::Value;
use tracing::info;

use campus_core::error::AppError;
use campus_core::result::AppResult;
use campus_core::traits::datastore::DataStore;
use campus_core::types::filter::Filter;
use campus_core::types::row::{Row, to_row};
use campus_core::types::{NoticeId, UserId};
use campus_datastore::DataStoreManager;
use campus_entity::notice::{Notice, NoticeDraft};

/// Publishes and retires notices.
///
/// Performs no cache bookkeeping of its own; readers converge through the
/// change feed like for any other remote writer.
#[derive(Debug)]
pub struct NoticeAuthor {
    store: DataStoreManager,
}

impl NoticeAuthor {
    /// Create an authoring surface over a data store backend.
    pub fn new(store: DataStoreManager) -> Self {
        Self { store }
    }

    /// Publish a draft as an active notice and return the stored entity.
    pub async fn publish(&self, author_id: UserId, draft: NoticeDraft) -> AppResult<Notice> {
        if draft.title.trim().is_empty() {
            return Err(AppError::validation("Notice title must not be empty"));
        }
        if draft.content.trim().is_empty() {
            return Err(AppError::validation("Notice content must not be empty"));
        }

        let notice = Notice {
            id: NoticeId::new(),
            title: draft.title,
            content: draft.content,
            is_active: true,
            created_by: Some(author_id),
            department_id: draft.department_id,
            batch_id: draft.batch_id,
            created_at: Utc::now(),
        };

        let row = to_row(&notice)?;
        self.store.upsert(Notice::TABLE, vec![row], None).await?;

        info!(notice_id = %notice.id, "Published notice");
        Ok(notice)
    }

    /// Retire a notice so it disappears from every subsequent merged view,
    /// regardless of read state.
    pub async fn retire(&self, notice_id: NoticeId) -> AppResult<()> {
        let mut patch = Row::new();
        patch.insert("is_active".to_string(), Value::Bool(false));

        self.store
            .update(Notice::TABLE, patch, &[Filter::eq("id", notice_id)])
            .await?;

        info!(%notice_id, "Retired notice");
        Ok(())
    }
}
