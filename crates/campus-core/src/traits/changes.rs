//! The change feed contract and subscription lifecycle.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;
use crate::types::filter::Filter;
use crate::types::row::Row;

/// A change notification for one table.
///
/// Subscribers treat every event as "something changed, re-derive"; the row
/// snapshot exists only so feeds can apply subscription filters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// The table that changed.
    pub table: String,
    /// Snapshot of the changed row, when the source knows it.
    pub row: Option<Row>,
}

impl ChangeEvent {
    /// Create a change event carrying a row snapshot.
    pub fn with_row(table: impl Into<String>, row: Row) -> Self {
        Self {
            table: table.into(),
            row: Some(row),
        }
    }

    /// Create a change event without a row snapshot.
    pub fn bare(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            row: None,
        }
    }

    /// Whether this event passes a subscription filter.
    ///
    /// An event without a row snapshot always passes: the subscriber cannot
    /// tell, and a spurious re-derive is harmless.
    pub fn passes(&self, filter: Option<&Filter>) -> bool {
        match (filter, &self.row) {
            (Some(filter), Some(row)) => filter.matches(row),
            _ => true,
        }
    }
}

/// Callback invoked on every delivered change event.
pub type ChangeHandler = Arc<dyn Fn() + Send + Sync>;

/// An owned subscription that is released on [`close`](Self::close) or drop.
///
/// Every exit path of the owning context releases the subscription; there is
/// no ambient registry to leak into.
pub struct SubscriptionHandle {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl SubscriptionHandle {
    /// Wrap a release action into a handle.
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Release the subscription explicitly.
    pub fn close(mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("active", &self.release.is_some())
            .finish()
    }
}

/// Trait for subscribable change feeds.
#[async_trait]
pub trait ChangeFeed: Send + Sync + fmt::Debug + 'static {
    /// Subscribe to changes on a table.
    ///
    /// `filter`, when present, restricts delivery to events whose row
    /// snapshot matches. The handler receives no payload; it is a pure
    /// "something changed" signal.
    async fn subscribe(
        &self,
        table: &str,
        filter: Option<Filter>,
        handler: ChangeHandler,
    ) -> AppResult<SubscriptionHandle>;
}

/// Trait for components that emit change events into a feed.
pub trait ChangePublisher: Send + Sync + fmt::Debug + 'static {
    /// Publish a change event. Delivery is best-effort; publishing to a
    /// table nobody subscribes to is a no-op.
    fn publish(&self, event: ChangeEvent);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_handle_releases_once() {
        let count = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let handle = SubscriptionHandle::new(move || {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        });
        handle.close();
        assert_eq!(count.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn test_handle_releases_on_drop() {
        let count = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        {
            let _handle = SubscriptionHandle::new(move || {
                counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            });
        }
        assert_eq!(count.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn test_event_filtering() {
        let row = match json!({"user_id": "u-1"}) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        };
        let event = ChangeEvent::with_row("notice_reads", row);
        assert!(event.passes(Some(&Filter::eq("user_id", "u-1"))));
        assert!(!event.passes(Some(&Filter::eq("user_id", "u-2"))));
        assert!(ChangeEvent::bare("notices").passes(Some(&Filter::eq("user_id", "u-2"))));
    }
}
