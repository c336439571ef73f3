//! Notification domain entity
//!
//! A notification record as delivered by the remote feed in sync batches.
//! Field names serialize in camelCase to line up with the feed's JSON
//! payloads, which adapters pass through without reshaping.

use serde::{Deserialize, Serialize};

/// Feed-reported lifecycle of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationStatus {
    /// The notification is live and should be displayed
    Active,
    /// The feed has deleted the notification; remove it everywhere
    Deleted,
}

/// What the user has done with a notification, if anything
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UserActionState {
    /// Untouched; eligible for the "new" view and a toast
    #[default]
    NoInteraction,
    /// The user tapped/clicked it
    Activated,
    /// The user dismissed it
    Dismissed,
}

/// Whether the notification has been read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReadState {
    #[default]
    Unread,
    Read,
}

/// A single notification as held in the per-account cache
///
/// `id` is stable across sync cycles; later batches that carry the same id
/// supersede any stored copy. `content` is the display payload and may be
/// empty (silent data notifications).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    pub id: String,
    pub status: NotificationStatus,
    #[serde(default)]
    pub user_action_state: UserActionState,
    #[serde(default)]
    pub read_state: ReadState,
    #[serde(default)]
    pub content: String,
}

impl NotificationRecord {
    /// Creates an active, unread, unacted notification with the given content
    pub fn active(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: NotificationStatus::Active,
            user_action_state: UserActionState::NoInteraction,
            read_state: ReadState::Unread,
            content: content.into(),
        }
    }

    /// Creates a deletion marker for the given id
    pub fn deleted(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: NotificationStatus::Deleted,
            user_action_state: UserActionState::NoInteraction,
            read_state: ReadState::Unread,
            content: String::new(),
        }
    }
}
