//! Notification surface port (driven/secondary port)
//!
//! This module defines the interface to the OS-level toast/notification UI.
//! Surface entries are keyed by notification id so a newer record can
//! replace an earlier toast for the same id.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because display is adapter-specific.
//! - Display is best-effort: the cache logs surface failures and never
//!   fails a batch because a toast could not be shown or removed.
//! - Toast activation flows back into the core through
//!   [`AccountManager::activate_all`](crate::manager::AccountManager::activate_all)
//!   with the id the surface was keyed by.

// ============================================================================
// INotificationSurface trait
// ============================================================================

/// Port trait for toast display, keyed by notification id
#[async_trait::async_trait]
pub trait INotificationSurface: Send + Sync {
    /// Shows a toast for the given notification id and content
    async fn show(&self, id: &str, content: &str) -> anyhow::Result<()>;

    /// Removes any toast currently shown for the given notification id
    async fn remove(&self, id: &str) -> anyhow::Result<()>;
}
