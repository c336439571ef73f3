//! Per-account notification cache
//!
//! The [`NotificationCache`] maintains two views of one account's
//! notifications: the "new" list (active, not yet interacted with) and the
//! full history (most recent first). Incoming sync batches are applied
//! deterministically; user actions mutate single records and persist them
//! through the channel.
//!
//! ## Event Flow
//!
//! 1. The channel signals [`FeedEvent::DataChanged`]; the cache's event pump
//!    reads a batch and applies it.
//! 2. One [`CacheEvent::Updated`] is broadcast per applied batch, never per
//!    record.
//!
//! ## Channel Lifecycle
//!
//! The sync channel is constructed lazily on first use because construction
//! may trigger an interactive token prompt; a single-flight lock ensures the
//! prompt is never issued twice in parallel for the same account. A failed
//! construction leaves the slot empty and is retried on the next access.
//! After [`reset`](NotificationCache::reset) every operation no-ops or
//! returns a typed error; the cache cannot be revived.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use anyhow::{anyhow, Context};
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::errors::Error;
use crate::domain::notification::{
    NotificationRecord, NotificationStatus, ReadState, UserActionState,
};
use crate::ports::feed::{FeedEvent, INotificationChannel, INotificationFeed};
use crate::ports::platform::PlatformAccount;
use crate::ports::surface::INotificationSurface;

/// Capacity of the cache's broadcast event channel
const EVENT_CAPACITY: usize = 32;

/// Events published by a [`NotificationCache`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheEvent {
    /// Either view changed; re-read the views to pick up the new state
    Updated,
}

/// The two notification views, guarded together by one lock
#[derive(Default)]
struct Views {
    new_notifications: Vec<NotificationRecord>,
    historical_notifications: Vec<NotificationRecord>,
}

/// "New" and "historical" notification views for one account
pub struct NotificationCache {
    account: PlatformAccount,
    host_name: String,
    feed: Arc<dyn INotificationFeed>,
    surface: Arc<dyn INotificationSurface>,
    channel: Mutex<Option<Arc<dyn INotificationChannel>>>,
    views: Mutex<Views>,
    pump: Mutex<Option<JoinHandle<()>>>,
    closed: AtomicBool,
    events: broadcast::Sender<CacheEvent>,
    weak_self: Weak<NotificationCache>,
}

impl NotificationCache {
    /// Creates a cache for one account; the sync channel is opened lazily
    pub fn new(
        account: PlatformAccount,
        host_name: impl Into<String>,
        feed: Arc<dyn INotificationFeed>,
        surface: Arc<dyn INotificationSurface>,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let host_name = host_name.into();
        Arc::new_cyclic(|weak_self| Self {
            account,
            host_name,
            feed,
            surface,
            channel: Mutex::new(None),
            views: Mutex::new(Views::default()),
            pump: Mutex::new(None),
            closed: AtomicBool::new(false),
            events,
            weak_self: weak_self.clone(),
        })
    }

    /// Subscribes to cache change events
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    /// Returns true if any notification is awaiting user interaction
    pub async fn has_new_notifications(&self) -> bool {
        !self.views.lock().await.new_notifications.is_empty()
    }

    /// Returns the "new" view (active, not interacted with)
    pub async fn new_notifications(&self) -> Vec<NotificationRecord> {
        self.views.lock().await.new_notifications.clone()
    }

    /// Returns the full history, most recent first
    pub async fn historical_notifications(&self) -> Vec<NotificationRecord> {
        self.views.lock().await.historical_notifications.clone()
    }

    /// Reads the channel's cached records, applies them, and requests a sync
    pub async fn refresh(&self) -> Result<(), Error> {
        let channel = self.ensure_channel().await.map_err(Error::Sync)?;

        debug!(account = %self.account.id, "reading cached notifications");
        let batch = channel
            .read_batch(u32::MAX)
            .await
            .map_err(Error::Sync)?;
        self.apply_batch(batch).await;

        debug!(account = %self.account.id, "requesting another sync");
        channel.start_sync();
        Ok(())
    }

    /// Applies one sync batch to both views
    ///
    /// Records are evaluated independently, in batch order. An incoming
    /// record always supersedes any stored copy with the same id. A single
    /// [`CacheEvent::Updated`] is broadcast after the whole batch.
    pub async fn apply_batch(&self, batch: Vec<NotificationRecord>) {
        if self.closed.load(Ordering::SeqCst) {
            return;
        }

        let mut views = self.views.lock().await;
        debug!(count = batch.len(), "applying notification batch");

        for record in batch {
            views.new_notifications.retain(|n| n.id != record.id);
            views.historical_notifications.retain(|n| n.id != record.id);

            match record.status {
                NotificationStatus::Deleted => {
                    self.remove_from_surface(&record.id).await;
                }
                NotificationStatus::Active => {
                    if record.user_action_state == UserActionState::NoInteraction {
                        debug!(notification = %record.id, "notification not interacted with");
                        if !record.content.is_empty() && record.read_state != ReadState::Read {
                            // replace any toast already keyed by this id
                            self.remove_from_surface(&record.id).await;
                            self.show_on_surface(&record.id, &record.content).await;
                        }
                        views.new_notifications.push(record.clone());
                    } else {
                        self.remove_from_surface(&record.id).await;
                    }
                    views.historical_notifications.insert(0, record);
                }
            }
        }

        drop(views);
        let _ = self.events.send(CacheEvent::Updated);
    }

    /// Marks a notification read and persists it; no-op if the id is unknown
    pub async fn mark_read(&self, id: &str) -> Result<(), Error> {
        let Some(mut record) = self.find_in_history(id).await else {
            return Ok(());
        };
        record.read_state = ReadState::Read;

        let channel = self.ensure_channel().await.map_err(Error::Sync)?;
        channel.save(&record).await.map_err(Error::Operation)?;

        self.store_in_history(record).await;
        info!(notification = id, "notification is now read");
        Ok(())
    }

    /// Records a user activation or dismissal and persists it
    ///
    /// No-op if the id is unknown. The surface entry for the id is removed
    /// either way the user acted on it.
    pub async fn activate(&self, id: &str, dismiss: bool) -> Result<(), Error> {
        let Some(mut record) = self.find_in_history(id).await else {
            return Ok(());
        };
        record.user_action_state = if dismiss {
            UserActionState::Dismissed
        } else {
            UserActionState::Activated
        };

        let channel = self.ensure_channel().await.map_err(Error::Sync)?;
        channel.save(&record).await.map_err(Error::Operation)?;

        self.store_in_history(record).await;
        self.remove_from_surface(id).await;
        info!(
            notification = id,
            dismissed = dismiss,
            "notification interaction recorded"
        );
        Ok(())
    }

    /// Deletes a notification from the service and from both views
    ///
    /// No-op if the id is unknown. A failure deleting from the service
    /// leaves the local views untouched.
    pub async fn delete(&self, id: &str) -> Result<(), Error> {
        if self.find_in_history(id).await.is_none() {
            return Ok(());
        }

        let channel = self.ensure_channel().await.map_err(Error::Sync)?;
        channel.delete(id).await.map_err(Error::Operation)?;

        {
            let mut views = self.views.lock().await;
            views.new_notifications.retain(|n| n.id != id);
            views.historical_notifications.retain(|n| n.id != id);
        }
        self.remove_from_surface(id).await;
        let _ = self.events.send(CacheEvent::Updated);
        info!(notification = id, "notification is now deleted");
        Ok(())
    }

    /// Clears both views and drops the channel; the cache is dead afterwards
    pub async fn reset(&self) {
        info!(account = %self.account.id, "resetting notification feed");
        self.closed.store(true, Ordering::SeqCst);

        let mut slot = self.channel.lock().await;
        if let Some(pump) = self.pump.lock().await.take() {
            pump.abort();
        }
        *slot = None;
        drop(slot);

        {
            let mut views = self.views.lock().await;
            views.new_notifications.clear();
            views.historical_notifications.clear();
        }

        let _ = self.events.send(CacheEvent::Updated);
    }

    /// Opens the channel and subscribes to the notification sync scope
    pub(crate) async fn register(&self) -> anyhow::Result<()> {
        let channel = self.ensure_channel().await?;
        let subscribed = channel
            .subscribe_sync_scopes()
            .await
            .context("sync scope subscription failed")?;
        if !subscribed {
            return Err(anyhow!("sync scope subscription was rejected"));
        }
        Ok(())
    }

    /// Returns the channel, constructing it at most once concurrently
    async fn ensure_channel(&self) -> anyhow::Result<Arc<dyn INotificationChannel>> {
        let mut slot = self.channel.lock().await;
        // checked under the lock so a concurrent reset cannot revive the slot
        if self.closed.load(Ordering::SeqCst) {
            return Err(anyhow!("notification cache has been reset"));
        }
        if let Some(channel) = slot.as_ref() {
            return Ok(channel.clone());
        }

        match self
            .feed
            .open_channel(&self.account, &self.host_name)
            .await
        {
            Ok(channel) => {
                info!(
                    account = %self.account.id,
                    account_type = %self.account.account_type,
                    "notification channel ready"
                );
                let pump = self.spawn_event_pump(channel.events());
                *self.pump.lock().await = Some(pump);
                *slot = Some(channel.clone());
                Ok(channel)
            }
            Err(err) => {
                warn!(
                    account = %self.account.id,
                    error = %err,
                    "failed to set up notification channel"
                );
                Err(err)
            }
        }
    }

    /// Forwards channel events into batch reads until the cache goes away
    fn spawn_event_pump(&self, mut events: broadcast::Receiver<FeedEvent>) -> JoinHandle<()> {
        let weak = self.weak_self.clone();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(FeedEvent::DataChanged) => {
                        let Some(cache) = weak.upgrade() else { break };
                        info!("new notification data available");
                        cache.handle_data_changed().await;
                    }
                    Ok(FeedEvent::SyncStatusChanged(status)) => {
                        info!(?status, "feed sync status changed");
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "feed event stream lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    /// Reads and applies a batch from the already-open channel
    async fn handle_data_changed(&self) {
        let channel = self.channel.lock().await.clone();
        let Some(channel) = channel else { return };

        match channel.read_batch(u32::MAX).await {
            Ok(batch) => self.apply_batch(batch).await,
            Err(err) => warn!(error = %err, "failed to read notification batch"),
        }
    }

    async fn find_in_history(&self, id: &str) -> Option<NotificationRecord> {
        self.views
            .lock()
            .await
            .historical_notifications
            .iter()
            .find(|n| n.id == id)
            .cloned()
    }

    /// Writes a persisted mutation back into the history view
    ///
    /// Last writer wins: a batch applied between the read and this write-back
    /// is overwritten, and the next batch overwrites this in turn.
    async fn store_in_history(&self, record: NotificationRecord) {
        let mut views = self.views.lock().await;
        if let Some(slot) = views
            .historical_notifications
            .iter_mut()
            .find(|n| n.id == record.id)
        {
            *slot = record;
        }
    }

    async fn show_on_surface(&self, id: &str, content: &str) {
        if let Err(err) = self.surface.show(id, content).await {
            warn!(notification = id, error = %err, "failed to show toast");
        }
    }

    async fn remove_from_surface(&self, id: &str) {
        if let Err(err) = self.surface.remove(id).await {
            warn!(notification = id, error = %err, "failed to remove toast");
        }
    }
}
