//! Notice draft value object for the authoring flow.

use serde::{Deserialize, Serialize};

use campus_core::types::{BatchId, DepartmentId};

/// Author-supplied fields of a notice about to be published.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoticeDraft {
    /// Notice title.
    pub title: String,
    /// Notice body text.
    pub content: String,
    /// Optional department scoping.
    pub department_id: Option<DepartmentId>,
    /// Optional batch scoping.
    pub batch_id: Option<BatchId>,
}

impl NoticeDraft {
    /// A draft with no department or batch scoping.
    pub fn unscoped(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            department_id: None,
            batch_id: None,
        }
    }
}
