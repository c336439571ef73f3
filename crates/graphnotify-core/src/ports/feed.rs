//! Notification feed port (driven/secondary port)
//!
//! This module defines the interface to the remote notification feed: a
//! feed opens one sync channel per account, and the channel exposes batch
//! reads, per-record writes, and a broadcast stream of feed events.
//!
//! ## Design Notes
//!
//! - Feed events are delivered over a `tokio::sync::broadcast` channel
//!   instead of registered callbacks, so multiple observers (the cache's
//!   event pump, tests) can subscribe independently.
//! - `read_batch` returns domain [`NotificationRecord`]s directly; the wire
//!   format is the adapter's concern.
//! - Channel construction may trigger a token prompt; the cache guards it
//!   with a single-flight lock so it runs at most once concurrently per
//!   account.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::domain::notification::NotificationRecord;
use crate::ports::platform::PlatformAccount;

// ============================================================================
// Feed events
// ============================================================================

/// Overall state of the feed's background synchronization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// A sync pass is in flight
    Synchronizing,
    /// The local view matches the service
    UpToDate,
    /// The last sync pass failed
    Failed,
}

/// Events published by a notification channel
#[derive(Debug, Clone)]
pub enum FeedEvent {
    /// New records are available; read a batch to pick them up
    DataChanged,
    /// The feed's sync status changed
    SyncStatusChanged(SyncStatus),
}

// ============================================================================
// INotificationChannel trait
// ============================================================================

/// Port trait for one account's notification sync channel
#[async_trait::async_trait]
pub trait INotificationChannel: Send + Sync {
    /// Subscribes the account to the notification sync scope
    ///
    /// Returns `Ok(false)` if the service declined the subscription.
    async fn subscribe_sync_scopes(&self) -> anyhow::Result<bool>;

    /// Requests another sync pass; completion is reported via [`FeedEvent`]s
    fn start_sync(&self);

    /// Reads up to `max` locally cached records from the channel
    async fn read_batch(&self, max: u32) -> anyhow::Result<Vec<NotificationRecord>>;

    /// Persists a single mutated record back to the service
    async fn save(&self, record: &NotificationRecord) -> anyhow::Result<()>;

    /// Deletes a record from the service by id
    async fn delete(&self, id: &str) -> anyhow::Result<()>;

    /// Subscribes to this channel's event stream
    fn events(&self) -> broadcast::Receiver<FeedEvent>;
}

// ============================================================================
// INotificationFeed trait
// ============================================================================

/// Port trait for the notification feed service
#[async_trait::async_trait]
pub trait INotificationFeed: Send + Sync {
    /// Opens the sync channel for an account under the given app host name
    ///
    /// May prompt for a token; the caller serializes concurrent calls for
    /// the same account.
    async fn open_channel(
        &self,
        account: &PlatformAccount,
        host_name: &str,
    ) -> anyhow::Result<Arc<dyn INotificationChannel>>;
}
