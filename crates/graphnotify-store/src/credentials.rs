//! Keyring-backed credential store
//!
//! Stores per-account credential material in the OS credential store via
//! the `keyring` crate, with the account id as the keyring username. The
//! reconciliation pass only asks for presence; sign-in writes entries and
//! logout removes them.

use anyhow::{Context, Result};
use tracing::{debug, info};

use graphnotify_core::ports::store::ICredentialStore;

/// Default keyring service name
const KEYRING_SERVICE: &str = "graphnotify";

/// Credential store backed by the system keyring
pub struct KeyringCredentialStore {
    service: String,
}

impl KeyringCredentialStore {
    /// Creates a store under the given keyring service name
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, account_id: &str) -> Result<keyring::Entry> {
        keyring::Entry::new(&self.service, account_id).context("Failed to create keyring entry")
    }
}

impl Default for KeyringCredentialStore {
    fn default() -> Self {
        Self::new(KEYRING_SERVICE)
    }
}

#[async_trait::async_trait]
impl ICredentialStore for KeyringCredentialStore {
    async fn has_credential(&self, account_id: &str) -> anyhow::Result<bool> {
        let entry = self.entry(account_id)?;
        match entry.get_password() {
            Ok(_) => Ok(true),
            Err(keyring::Error::NoEntry) => {
                debug!("no keyring entry for account: {}", account_id);
                Ok(false)
            }
            Err(e) => Err(anyhow::Error::new(e).context("Failed to read from keyring")),
        }
    }

    async fn store_credential(&self, account_id: &str, secret: &str) -> anyhow::Result<()> {
        let entry = self.entry(account_id)?;
        entry
            .set_password(secret)
            .context("Failed to store credential in keyring")?;
        debug!("stored credential for account: {}", account_id);
        Ok(())
    }

    async fn remove_credential(&self, account_id: &str) -> anyhow::Result<()> {
        let entry = self.entry(account_id)?;
        match entry.delete_credential() {
            Ok(()) => {
                info!("cleared credential for account: {}", account_id);
                Ok(())
            }
            Err(keyring::Error::NoEntry) => {
                debug!("no credential to clear for account: {}", account_id);
                Ok(())
            }
            Err(e) => Err(anyhow::Error::new(e).context("Failed to delete from keyring")),
        }
    }
}
