//! Persistence ports (driven/secondary ports)
//!
//! Two small storage interfaces: a key-value blob store for the serialized
//! account list, and the local credential cache consulted for AAD accounts
//! during reconciliation and purged on logout.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because storage errors are adapter-specific
//!   (file, keyring, etc.) and don't need domain-level classification.
//! - `IAccountStore::save` receives the full list; the serialized format is
//!   the adapter's choice, but it must round-trip
//!   [`AccountRecord`](crate::domain::account::AccountRecord)'s serde form
//!   (registration state excluded).

use crate::domain::account::AccountRecord;

// ============================================================================
// IAccountStore trait
// ============================================================================

/// Port trait for persisting the account list
#[async_trait::async_trait]
pub trait IAccountStore: Send + Sync {
    /// Loads the persisted account list; empty if nothing was ever saved
    async fn load(&self) -> anyhow::Result<Vec<AccountRecord>>;

    /// Persists the full account list, replacing any previous snapshot
    async fn save(&self, accounts: &[AccountRecord]) -> anyhow::Result<()>;
}

// ============================================================================
// ICredentialStore trait
// ============================================================================

/// Port trait for the local credential cache
///
/// AAD accounts keep their real token state in the identity stack's own
/// cache; the core only asks whether an entry exists (an AAD account with
/// no entry is unusable and gets dropped during reconciliation) and removes
/// entries on logout.
#[async_trait::async_trait]
pub trait ICredentialStore: Send + Sync {
    /// Returns true if credential material exists for the account
    async fn has_credential(&self, account_id: &str) -> anyhow::Result<bool>;

    /// Stores credential material for the account
    async fn store_credential(&self, account_id: &str, secret: &str) -> anyhow::Result<()>;

    /// Removes any credential material for the account
    async fn remove_credential(&self, account_id: &str) -> anyhow::Result<()>;
}
