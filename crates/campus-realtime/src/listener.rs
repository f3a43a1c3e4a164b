//! Notice change listener — bridges change feeds into cache invalidation.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use campus_core::result::AppResult;
use campus_core::traits::changes::{ChangeFeed, ChangeHandler, SubscriptionHandle};
use campus_core::types::UserId;
use campus_core::types::filter::Filter;
use campus_entity::notice::{Notice, ReadState};
use campus_notices::NoticeStore;

/// An active subscription pair for one user.
#[derive(Debug)]
struct Binding {
    user_id: UserId,
    _notices: SubscriptionHandle,
    _reads: SubscriptionHandle,
}

/// Subscribes to notice changes and the current user's read-state changes,
/// firing a caller-supplied callback on any event.
///
/// The listener never interprets event payloads; every event means
/// "something changed, re-derive". At most one subscription pair is active
/// per listener: rebinding for the same user is a no-op, rebinding for a
/// different user releases the old pair first, and dropping the listener
/// releases whatever is bound.
#[derive(Debug)]
pub struct NoticeChangeListener {
    feed: Arc<dyn ChangeFeed>,
    binding: Mutex<Option<Binding>>,
}

impl NoticeChangeListener {
    /// Create an unbound listener on a change feed.
    pub fn new(feed: Arc<dyn ChangeFeed>) -> Self {
        Self {
            feed,
            binding: Mutex::new(None),
        }
    }

    /// Bind the listener for a user, invoking `on_change` on every notice or
    /// read-state event.
    pub async fn bind(&self, user_id: UserId, on_change: ChangeHandler) -> AppResult<()> {
        let mut binding = self.binding.lock().await;
        if binding.as_ref().is_some_and(|b| b.user_id == user_id) {
            debug!(%user_id, "Listener already bound for user");
            return Ok(());
        }

        // Release the previous pair before subscribing for the new user.
        binding.take();

        let notices = self
            .feed
            .subscribe(Notice::TABLE, None, Arc::clone(&on_change))
            .await?;
        let reads = self
            .feed
            .subscribe(
                ReadState::TABLE,
                Some(Filter::eq("user_id", user_id)),
                on_change,
            )
            .await?;

        info!(%user_id, "Listener bound to notice change feeds");
        *binding = Some(Binding {
            user_id,
            _notices: notices,
            _reads: reads,
        });
        Ok(())
    }

    /// Bind the listener so that every event invalidates the user's cached
    /// merged view in the given store.
    pub async fn bind_store(&self, store: Arc<NoticeStore>, user_id: UserId) -> AppResult<()> {
        let handler: ChangeHandler = Arc::new(move || {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                store.invalidate(user_id).await;
            });
        });
        self.bind(user_id, handler).await
    }

    /// Release the active subscription pair, if any.
    pub async fn release(&self) {
        if self.binding.lock().await.take().is_some() {
            info!("Listener released notice change subscriptions");
        }
    }

    /// The user the listener is currently bound for.
    pub async fn bound_user(&self) -> Option<UserId> {
        self.binding.lock().await.as_ref().map(|b| b.user_id)
    }
}
