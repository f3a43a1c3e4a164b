//! Read-state tracking entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use campus_core::types::{NoticeId, UserId};

/// A fact recording that a specific user has read a specific notice.
///
/// Keyed by (notice_id, user_id); created at most once per pair, and never
/// deleted by this layer. Existence alone drives read status — `marked_at`
/// is bookkeeping that nothing reads back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadState {
    /// The notice that was read.
    pub notice_id: NoticeId,
    /// The user who read it.
    pub user_id: UserId,
    /// When the notice was marked read.
    pub marked_at: DateTime<Utc>,
}

impl ReadState {
    /// Data store table holding read states.
    pub const TABLE: &'static str = "notice_reads";

    /// Upsert conflict target making mark-as-read idempotent.
    pub const CONFLICT_TARGET: [&'static str; 2] = ["notice_id", "user_id"];

    /// Create a read-state fact stamped with the current time.
    pub fn new(notice_id: NoticeId, user_id: UserId) -> Self {
        Self {
            notice_id,
            user_id,
            marked_at: Utc::now(),
        }
    }
}
