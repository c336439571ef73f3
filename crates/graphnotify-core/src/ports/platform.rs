//! Device platform port (driven/secondary port)
//!
//! This module defines the interface to the cross-device platform SDK: its
//! account cache, push-notification registration, and raw push processing.
//! The platform also raises callbacks (access-token requests, registration
//! state changes); the host forwards those into the corresponding
//! `AccountManager::handle_*` methods.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because platform errors are adapter-specific and
//!   the core only needs success/failure plus context.
//! - `PlatformAccount` is a port-level DTO mirroring what the platform cache
//!   reports; the core's own entity is
//!   [`AccountRecord`](crate::domain::account::AccountRecord).

use serde::{Deserialize, Serialize};

use crate::domain::account::AccountType;

// ============================================================================
// PlatformAccount
// ============================================================================

/// An account as known to the device platform's own cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformAccount {
    /// Opaque identity shared with [`AccountRecord::id`](crate::domain::account::AccountRecord)
    pub id: String,
    /// Which identity system the account belongs to
    pub account_type: AccountType,
}

impl PlatformAccount {
    /// Creates a new platform account reference
    pub fn new(id: impl Into<String>, account_type: AccountType) -> Self {
        Self {
            id: id.into(),
            account_type,
        }
    }
}

// ============================================================================
// PushRegistrationState
// ============================================================================

/// Lifecycle of an account's push-notification registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushRegistrationState {
    /// Registration is live
    Registered,
    /// Registration is close to expiry and should be renewed
    Expiring,
    /// Registration has expired and must be renewed
    Expired,
}

impl PushRegistrationState {
    /// Returns true if the registration needs to be performed again
    pub fn needs_renewal(&self) -> bool {
        matches!(
            self,
            PushRegistrationState::Expiring | PushRegistrationState::Expired
        )
    }
}

// ============================================================================
// IDevicePlatform trait
// ============================================================================

/// Port trait for the cross-device platform SDK
///
/// ## Implementation Notes
///
/// - `add_account`/`remove_account` mutate the platform's own account cache;
///   the core keeps its app cache in sync through reconciliation.
/// - `register_for_push` obtains the host's push channel and registers it
///   with the platform for the given account.
/// - `process_push_payload` hands an incoming raw push body to the platform
///   for routing; the core never parses the payload itself.
#[async_trait::async_trait]
pub trait IDevicePlatform: Send + Sync {
    /// Adds an account to the platform's cache
    async fn add_account(&self, account: &PlatformAccount) -> anyhow::Result<()>;

    /// Removes an account from the platform's cache
    async fn remove_account(&self, account: &PlatformAccount) -> anyhow::Result<()>;

    /// Lists the accounts currently in the platform's cache
    async fn list_accounts(&self) -> anyhow::Result<Vec<PlatformAccount>>;

    /// Registers the host's push channel with the platform for this account
    async fn register_for_push(&self, account: &PlatformAccount) -> anyhow::Result<()>;

    /// Forwards a raw incoming push payload to the platform for processing
    async fn process_push_payload(&self, payload: &str) -> anyhow::Result<()>;
}
