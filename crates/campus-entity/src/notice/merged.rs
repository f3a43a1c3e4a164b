//! Merged notice view model.

use serde::{Deserialize, Serialize};

use super::model::Notice;

/// A notice combined with the current user's read status.
///
/// A derived, read-only view recomputed on every fetch; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergedNotice {
    /// The underlying notice.
    #[serde(flatten)]
    pub notice: Notice,
    /// Whether a read state exists for (this notice, current user).
    pub is_read: bool,
}

impl MergedNotice {
    /// Combine a notice with a read-status flag.
    pub fn new(notice: Notice, is_read: bool) -> Self {
        Self { notice, is_read }
    }

    /// Whether the current user has not read this notice yet.
    pub fn is_unread(&self) -> bool {
        !self.is_read
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_core::types::NoticeId;
    use chrono::Utc;

    #[test]
    fn test_serializes_flattened() {
        let merged = MergedNotice::new(
            Notice {
                id: NoticeId::new(),
                title: "Library hours".to_string(),
                content: "Extended during exams".to_string(),
                is_active: true,
                created_by: None,
                department_id: None,
                batch_id: None,
                created_at: Utc::now(),
            },
            true,
        );
        let json = serde_json::to_value(&merged).expect("serialize");
        assert_eq!(json.get("title").and_then(|v| v.as_str()), Some("Library hours"));
        assert_eq!(json.get("is_read").and_then(|v| v.as_bool()), Some(true));
        assert!(json.get("notice").is_none());
    }
}
