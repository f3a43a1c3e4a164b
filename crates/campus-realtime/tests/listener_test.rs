//! Listener lifecycle and cross-writer convergence tests.

use std::sync::Arc;
use std::time::Duration;

use campus_core::config::cache::ViewCacheConfig;
use campus_core::config::datastore::LocalStoreConfig;
use campus_core::traits::changes::{ChangeFeed, ChangeHandler, ChangePublisher};
use campus_core::traits::datastore::DataStore;
use campus_core::types::row::to_row;
use campus_core::types::{NoticeId, UserId};
use campus_datastore::{DataStoreManager, LocalStore};
use campus_entity::notice::{Notice, ReadState};
use campus_notices::NoticeStore;
use campus_realtime::{MemoryChangeHub, NoticeChangeListener};
use chrono::Utc;

fn hub_and_manager() -> (Arc<MemoryChangeHub>, DataStoreManager) {
    let hub = Arc::new(MemoryChangeHub::new(16));
    let dir = std::env::temp_dir().join(format!("campus-realtime-test-{}", uuid::Uuid::new_v4()));
    let store = LocalStore::new(&LocalStoreConfig {
        data_dir: dir.to_string_lossy().into_owned(),
    })
    .with_publisher(Arc::clone(&hub) as Arc<dyn ChangePublisher>);
    (hub, DataStoreManager::from_store(Arc::new(store)))
}

fn noop_handler() -> ChangeHandler {
    Arc::new(|| {})
}

async fn seed_notice(manager: &DataStoreManager) -> Notice {
    let notice = Notice {
        id: NoticeId::new(),
        title: "Semester results".to_string(),
        content: "Published on the portal".to_string(),
        is_active: true,
        created_by: None,
        department_id: None,
        batch_id: None,
        created_at: Utc::now(),
    };
    manager
        .upsert(Notice::TABLE, vec![to_row(&notice).expect("to_row")], None)
        .await
        .expect("seed notice");
    notice
}

#[tokio::test]
async fn test_rebinding_same_user_does_not_duplicate_subscriptions() {
    let (hub, _manager) = hub_and_manager();
    let feed: Arc<dyn ChangeFeed> = Arc::clone(&hub) as Arc<dyn ChangeFeed>;
    let listener = NoticeChangeListener::new(feed);
    let user = UserId::new();

    listener.bind(user, noop_handler()).await.expect("first bind");
    listener.bind(user, noop_handler()).await.expect("second bind");

    assert_eq!(hub.subscriber_count(Notice::TABLE), 1);
    assert_eq!(hub.subscriber_count(ReadState::TABLE), 1);
    assert_eq!(listener.bound_user().await, Some(user));
}

#[tokio::test]
async fn test_user_switch_releases_old_pair() {
    let (hub, _manager) = hub_and_manager();
    let listener = NoticeChangeListener::new(Arc::clone(&hub) as Arc<dyn ChangeFeed>);
    let first = UserId::new();
    let second = UserId::new();

    listener.bind(first, noop_handler()).await.expect("bind first");
    listener.bind(second, noop_handler()).await.expect("bind second");

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(hub.subscriber_count(Notice::TABLE), 1);
    assert_eq!(hub.subscriber_count(ReadState::TABLE), 1);
    assert_eq!(listener.bound_user().await, Some(second));
}

#[tokio::test]
async fn test_release_tears_down_both_subscriptions() {
    let (hub, _manager) = hub_and_manager();
    let listener = NoticeChangeListener::new(Arc::clone(&hub) as Arc<dyn ChangeFeed>);

    listener.bind(UserId::new(), noop_handler()).await.expect("bind");
    listener.release().await;

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(hub.subscriber_count(Notice::TABLE), 0);
    assert_eq!(hub.subscriber_count(ReadState::TABLE), 0);
    assert_eq!(listener.bound_user().await, None);
}

#[tokio::test]
async fn test_remote_read_state_write_converges_across_contexts() {
    let (hub, manager) = hub_and_manager();
    let user = UserId::new();
    let notice = seed_notice(&manager).await;

    let store = Arc::new(NoticeStore::new(manager.clone(), &ViewCacheConfig::default()));
    let view = store.fetch_merged(Some(user)).await.expect("initial fetch");
    assert!(!view[0].is_read);

    let listener = NoticeChangeListener::new(Arc::clone(&hub) as Arc<dyn ChangeFeed>);
    listener
        .bind_store(Arc::clone(&store), user)
        .await
        .expect("bind store");

    // Another device marks the notice read by writing straight to the store.
    manager
        .upsert(
            ReadState::TABLE,
            vec![to_row(&ReadState::new(notice.id, user)).expect("to_row")],
            Some(ReadState::CONFLICT_TARGET.as_slice()),
        )
        .await
        .expect("remote write");

    // The change event invalidates the cached view; poll until the fresh
    // merge is observed.
    let mut converged = false;
    for _ in 0..40 {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let view = store.fetch_merged(Some(user)).await.expect("fetch");
        if view.first().is_some_and(|m| m.is_read) {
            converged = true;
            break;
        }
    }
    assert!(converged, "listener should invalidate the cached view");
}

#[tokio::test]
async fn test_other_users_read_states_do_not_wake_listener() {
    let (hub, manager) = hub_and_manager();
    let user = UserId::new();
    let other = UserId::new();
    let notice = seed_notice(&manager).await;

    let fired = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let counter = Arc::clone(&fired);
    let handler: ChangeHandler = Arc::new(move || {
        counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    });

    let listener = NoticeChangeListener::new(Arc::clone(&hub) as Arc<dyn ChangeFeed>);
    listener.bind(user, handler).await.expect("bind");

    manager
        .upsert(
            ReadState::TABLE,
            vec![to_row(&ReadState::new(notice.id, other)).expect("to_row")],
            Some(ReadState::CONFLICT_TARGET.as_slice()),
        )
        .await
        .expect("other user write");

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(fired.load(std::sync::atomic::Ordering::SeqCst), 0);
}
