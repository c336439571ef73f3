//! graphnotify core - account lifecycle and notification cache logic
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `AccountRecord`, `NotificationRecord` and their state enums
//! - **Account manager** - `AccountManager`, which reconciles the locally persisted
//!   account list against the device platform's account list and drives each
//!   account through its registration lifecycle
//! - **Notification cache** - `NotificationCache`, the per-account "new" /
//!   "historical" notification views fed by sync batches
//! - **Port definitions** - Traits for adapters: `ITokenProvider`,
//!   `IDevicePlatform`, `INotificationFeed`, `INotificationSurface`,
//!   `IAccountStore`, `ICredentialStore`
//!
//! # Architecture
//!
//! This crate follows the hexagonal (ports & adapters) architecture pattern.
//! The domain module contains pure business logic with no external dependencies.
//! Ports define trait interfaces that adapter crates implement.
//! The manager and cache orchestrate domain entities through port interfaces;
//! state changes are published through broadcast channels rather than hidden
//! global state.

pub mod cache;
pub mod config;
pub mod domain;
pub mod manager;
pub mod ports;
pub mod reconcile;

pub use cache::{CacheEvent, NotificationCache};
pub use domain::errors::{AuthError, Error};
pub use manager::{AccountEvent, AccountManager};
