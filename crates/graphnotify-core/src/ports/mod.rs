//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries of the
//! hexagonal architecture. Ports are interfaces that the core depends on,
//! but whose implementations live in adapter crates or in the host app.
//!
//! ## Ports Overview
//!
//! - [`ITokenProvider`] - OAuth credential acquisition (MSA and AAD)
//! - [`IDevicePlatform`] - The cross-device platform's account and push
//!   registration surface
//! - [`INotificationFeed`] / [`INotificationChannel`] - The remote
//!   notification feed and its per-account sync channel
//! - [`INotificationSurface`] - OS-level toast display, keyed by notification id
//! - [`IAccountStore`] - Key-value blob persistence for the account list
//! - [`ICredentialStore`] - The local token cache consulted for AAD accounts

pub mod feed;
pub mod platform;
pub mod store;
pub mod surface;
pub mod token_provider;

pub use feed::{FeedEvent, INotificationChannel, INotificationFeed, SyncStatus};
pub use platform::{IDevicePlatform, PlatformAccount, PushRegistrationState};
pub use store::{IAccountStore, ICredentialStore};
pub use surface::INotificationSurface;
pub use token_provider::{AadSignIn, ITokenProvider};
