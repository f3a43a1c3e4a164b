//! Notice entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use campus_core::types::{BatchId, DepartmentId, NoticeId, UserId};

/// An announcement visible to some scope of portal users.
///
/// Notices are immutable from the reconciliation logic's point of view
/// except for the `is_active` flag, which the authoring flow controls.
/// Only active notices appear in merged views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notice {
    /// Unique notice identifier.
    pub id: NoticeId,
    /// Notice title.
    pub title: String,
    /// Notice body text.
    pub content: String,
    /// Whether the notice is currently visible.
    pub is_active: bool,
    /// The authoring user, when known.
    pub created_by: Option<UserId>,
    /// Department the notice is scoped to, when any.
    pub department_id: Option<DepartmentId>,
    /// Student batch the notice is scoped to, when any.
    pub batch_id: Option<BatchId>,
    /// When the notice was created.
    pub created_at: DateTime<Utc>,
}

impl Notice {
    /// Data store table holding notices.
    pub const TABLE: &'static str = "notices";
}
