//! Notification cache tests: batch reconciliation, user actions, reset,
//! and the lazy channel lifecycle

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use graphnotify_core::cache::{CacheEvent, NotificationCache};
use graphnotify_core::domain::account::AccountType;
use graphnotify_core::domain::errors::Error;
use graphnotify_core::domain::notification::{
    NotificationRecord, ReadState, UserActionState,
};
use graphnotify_core::ports::platform::PlatformAccount;

use crate::common::{FakeChannel, FakeFeed, FakeSurface};

struct CacheEnv {
    channel: Arc<FakeChannel>,
    feed: Arc<FakeFeed>,
    surface: Arc<FakeSurface>,
    cache: Arc<NotificationCache>,
}

fn cache_env() -> CacheEnv {
    let channel = FakeChannel::new();
    let feed = FakeFeed::new(channel.clone());
    let surface = Arc::new(FakeSurface::default());
    let cache = NotificationCache::new(
        PlatformAccount::new("acct-1", AccountType::Msa),
        "graphnotify.test",
        feed.clone(),
        surface.clone(),
    );
    CacheEnv {
        channel,
        feed,
        surface,
        cache,
    }
}

fn unacted(id: &str, content: &str) -> NotificationRecord {
    NotificationRecord::active(id, content)
}

#[tokio::test]
async fn new_notification_lands_in_both_views_with_a_toast() {
    let env = cache_env();

    env.cache.apply_batch(vec![unacted("n1", "hi")]).await;

    assert_eq!(env.cache.new_notifications().await.len(), 1);
    assert_eq!(env.cache.historical_notifications().await.len(), 1);
    assert!(env.cache.has_new_notifications().await);
    assert!(env.surface.is_showing("n1"));
}

#[tokio::test]
async fn activated_record_leaves_the_new_view_and_drops_the_toast() {
    let env = cache_env();
    env.cache.apply_batch(vec![unacted("n1", "hi")]).await;

    let mut acted = unacted("n1", "hi");
    acted.user_action_state = UserActionState::Activated;
    env.cache.apply_batch(vec![acted]).await;

    assert!(env.cache.new_notifications().await.is_empty());
    assert_eq!(env.cache.historical_notifications().await.len(), 1);
    assert!(!env.surface.is_showing("n1"));
}

#[tokio::test]
async fn deleted_record_disappears_from_both_views() {
    let env = cache_env();
    env.cache.apply_batch(vec![unacted("n1", "hi")]).await;

    env.cache
        .apply_batch(vec![NotificationRecord::deleted("n1")])
        .await;

    assert!(env.cache.new_notifications().await.is_empty());
    assert!(env.cache.historical_notifications().await.is_empty());
    assert!(!env.surface.is_showing("n1"));
}

#[tokio::test]
async fn applying_the_same_batch_twice_is_idempotent() {
    let env = cache_env();
    let batch = vec![unacted("n1", "hi"), unacted("n2", "there")];

    env.cache.apply_batch(batch.clone()).await;
    let new_once = env.cache.new_notifications().await;
    let history_once = env.cache.historical_notifications().await;

    env.cache.apply_batch(batch).await;
    assert_eq!(env.cache.new_notifications().await, new_once);
    assert_eq!(env.cache.historical_notifications().await, history_once);
}

#[tokio::test]
async fn no_toast_for_empty_content_or_read_records() {
    let env = cache_env();

    let silent = unacted("n1", "");
    let mut already_read = unacted("n2", "seen");
    already_read.read_state = ReadState::Read;
    env.cache.apply_batch(vec![silent, already_read]).await;

    assert!(env.surface.show_log.lock().unwrap().is_empty());
    // both are still new (unacted), just not toasted
    assert_eq!(env.cache.new_notifications().await.len(), 2);
}

#[tokio::test]
async fn reapplied_unread_record_replaces_its_toast() {
    let env = cache_env();

    env.cache.apply_batch(vec![unacted("n1", "hi")]).await;
    env.cache.apply_batch(vec![unacted("n1", "hi again")]).await;

    // remove-then-show per application
    assert_eq!(env.surface.show_log.lock().unwrap().len(), 2);
    assert!(env.surface.remove_log.lock().unwrap().len() >= 1);
    assert_eq!(env.cache.new_notifications().await.len(), 1);
}

#[tokio::test]
async fn most_recent_batch_sits_first_in_history() {
    let env = cache_env();

    env.cache
        .apply_batch(vec![unacted("a", "1"), unacted("b", "2")])
        .await;
    env.cache.apply_batch(vec![unacted("c", "3")]).await;

    let ids: Vec<String> = env
        .cache
        .historical_notifications()
        .await
        .into_iter()
        .map(|n| n.id)
        .collect();
    assert_eq!(ids, ["c", "b", "a"]);
}

#[tokio::test]
async fn every_new_id_also_exists_in_history() {
    let env = cache_env();

    let mut dismissed = unacted("n3", "x");
    dismissed.user_action_state = UserActionState::Dismissed;
    env.cache
        .apply_batch(vec![
            unacted("n1", "a"),
            dismissed,
            NotificationRecord::deleted("n2"),
            unacted("n4", ""),
        ])
        .await;

    let history: Vec<String> = env
        .cache
        .historical_notifications()
        .await
        .into_iter()
        .map(|n| n.id)
        .collect();
    for n in env.cache.new_notifications().await {
        assert!(history.contains(&n.id));
    }
}

#[tokio::test]
async fn one_cache_event_per_batch() {
    let env = cache_env();
    let mut events = env.cache.subscribe();

    env.cache
        .apply_batch(vec![unacted("n1", "a"), unacted("n2", "b"), unacted("n3", "c")])
        .await;

    assert_eq!(events.try_recv().unwrap(), CacheEvent::Updated);
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn mark_read_persists_the_single_record() {
    let env = cache_env();
    env.cache.apply_batch(vec![unacted("n1", "hi")]).await;

    env.cache.mark_read("n1").await.unwrap();

    let saved = env.channel.saved.lock().unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].read_state, ReadState::Read);
    drop(saved);
    assert_eq!(
        env.cache.historical_notifications().await[0].read_state,
        ReadState::Read
    );
}

#[tokio::test]
async fn mark_read_unknown_id_is_a_no_op() {
    let env = cache_env();
    env.cache.mark_read("ghost").await.unwrap();
    assert!(env.channel.saved.lock().unwrap().is_empty());
    // the channel was never even opened
    assert_eq!(env.feed.open_count.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failed_save_leaves_the_record_unchanged() {
    let env = cache_env();
    env.cache.apply_batch(vec![unacted("n1", "hi")]).await;
    env.channel.fail_save.store(true, Ordering::SeqCst);

    let err = env.cache.mark_read("n1").await.unwrap_err();
    assert!(matches!(err, Error::Operation(_)));
    assert_eq!(
        env.cache.historical_notifications().await[0].read_state,
        ReadState::Unread
    );
}

#[tokio::test]
async fn dismissal_is_recorded_and_persisted() {
    let env = cache_env();
    env.cache.apply_batch(vec![unacted("n1", "hi")]).await;

    env.cache.activate("n1", true).await.unwrap();

    let saved = env.channel.saved.lock().unwrap();
    assert_eq!(saved[0].user_action_state, UserActionState::Dismissed);
    drop(saved);
    assert!(!env.surface.is_showing("n1"));
}

#[tokio::test]
async fn delete_removes_remotely_and_locally() {
    let env = cache_env();
    env.cache.apply_batch(vec![unacted("n1", "hi")]).await;

    env.cache.delete("n1").await.unwrap();

    assert_eq!(env.channel.deleted.lock().unwrap().as_slice(), ["n1"]);
    assert!(env.cache.historical_notifications().await.is_empty());
    assert!(env.cache.new_notifications().await.is_empty());
    assert!(!env.surface.is_showing("n1"));
}

#[tokio::test]
async fn actions_after_delete_are_no_ops() {
    let env = cache_env();
    env.cache.apply_batch(vec![unacted("n1", "hi")]).await;
    env.cache.delete("n1").await.unwrap();

    env.cache.mark_read("n1").await.unwrap();
    env.cache.activate("n1", false).await.unwrap();

    assert!(env.channel.saved.lock().unwrap().is_empty());
}

#[tokio::test]
async fn failed_remote_delete_keeps_local_state() {
    let env = cache_env();
    env.cache.apply_batch(vec![unacted("n1", "hi")]).await;
    env.channel.fail_delete.store(true, Ordering::SeqCst);

    let err = env.cache.delete("n1").await.unwrap_err();
    assert!(matches!(err, Error::Operation(_)));
    assert_eq!(env.cache.historical_notifications().await.len(), 1);
}

#[tokio::test]
async fn refresh_reads_applies_and_requests_a_sync() {
    let env = cache_env();
    env.channel.push_batch(vec![unacted("n1", "hi")]);

    env.cache.refresh().await.unwrap();

    assert_eq!(env.cache.historical_notifications().await.len(), 1);
    assert_eq!(env.channel.sync_requests.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn channel_failure_is_retried_on_next_access() {
    let env = cache_env();
    env.feed.fail_open.store(true, Ordering::SeqCst);

    let err = env.cache.refresh().await.unwrap_err();
    assert!(matches!(err, Error::Sync(_)));

    env.feed.fail_open.store(false, Ordering::SeqCst);
    env.cache.refresh().await.unwrap();
    assert_eq!(env.feed.open_count.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn channel_is_constructed_once() {
    let env = cache_env();

    env.cache.refresh().await.unwrap();
    env.cache.refresh().await.unwrap();
    env.cache.mark_read("ghost").await.unwrap();

    assert_eq!(env.feed.open_count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn data_changed_events_flow_into_the_views() {
    let env = cache_env();
    // open the channel so the event pump is running
    env.cache.refresh().await.unwrap();

    env.channel.push_batch(vec![unacted("n1", "pushed")]);
    env.channel.emit_data_changed();

    let mut applied = false;
    for _ in 0..50 {
        tokio::time::sleep(Duration::from_millis(10)).await;
        if !env.cache.historical_notifications().await.is_empty() {
            applied = true;
            break;
        }
    }
    assert!(applied, "pushed batch never reached the cache");
}

#[tokio::test]
async fn reset_clears_everything_and_kills_the_cache() {
    let env = cache_env();
    env.cache.apply_batch(vec![unacted("n1", "hi")]).await;
    let mut events = env.cache.subscribe();

    env.cache.reset().await;

    assert_eq!(events.try_recv().unwrap(), CacheEvent::Updated);
    assert!(env.cache.historical_notifications().await.is_empty());
    assert!(env.cache.new_notifications().await.is_empty());

    // later operations fail typed or no-op instead of panicking
    let err = env.cache.refresh().await.unwrap_err();
    assert!(matches!(err, Error::Sync(_)));
    env.cache.mark_read("n1").await.unwrap();
    env.cache.apply_batch(vec![unacted("n2", "late")]).await;
    assert!(env.cache.historical_notifications().await.is_empty());
}
