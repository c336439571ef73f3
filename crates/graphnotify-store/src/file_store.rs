//! JSON file-backed account store
//!
//! Persists the account list as a single JSON document. Writes go through a
//! temp file followed by a rename so a crash mid-write never leaves a torn
//! account cache; a missing file on load just means no accounts yet.

use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::Context;
use tracing::debug;

use graphnotify_core::domain::account::AccountRecord;
use graphnotify_core::ports::store::IAccountStore;

/// Stores the serialized account list at a fixed path
pub struct JsonAccountStore {
    path: PathBuf,
}

impl JsonAccountStore {
    /// Creates a store backed by the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl IAccountStore for JsonAccountStore {
    async fn load(&self) -> anyhow::Result<Vec<AccountRecord>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                let accounts: Vec<AccountRecord> =
                    serde_json::from_slice(&bytes).context("account cache file is corrupt")?;
                debug!(count = accounts.len(), path = %self.path.display(), "loaded account cache");
                Ok(accounts)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(err).context("failed to read account cache file"),
        }
    }

    async fn save(&self, accounts: &[AccountRecord]) -> anyhow::Result<()> {
        let json =
            serde_json::to_vec_pretty(accounts).context("failed to serialize account list")?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .context("failed to create account cache directory")?;
            }
        }

        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, &json)
            .await
            .context("failed to write account cache temp file")?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .context("failed to move account cache into place")?;

        debug!(count = accounts.len(), path = %self.path.display(), "saved account cache");
        Ok(())
    }
}
