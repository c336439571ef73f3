//! Account list reconciliation
//!
//! Merges the app's persisted account list with the device platform's
//! account list into a single list where every record carries exactly one
//! [`RegistrationState`]. The merge itself is pure; credential presence is
//! injected as a closure so callers can back it with any store.

use tracing::warn;

use crate::domain::account::{AccountRecord, AccountType, RegistrationState};
use crate::ports::platform::PlatformAccount;

/// Merges the persisted account list with the platform-reported list.
///
/// For each locally persisted record: a matching `(id, type)` entry in the
/// platform list marks the record `InAppCacheAndSdkCache` and consumes the
/// platform entry; no match marks it `InAppCacheOnly`. Platform entries left
/// over after that pass are stale and join the result as `InSdkCacheOnly`.
///
/// AAD records whose credential cache entry has gone missing are unusable
/// and are dropped before matching; each drop is logged because the account
/// silently disappears from the merged list.
pub fn reconcile_accounts<F>(
    local: Vec<AccountRecord>,
    platform: Vec<PlatformAccount>,
    mut has_credential: F,
) -> Vec<AccountRecord>
where
    F: FnMut(&AccountRecord) -> bool,
{
    let mut remaining = platform;
    let mut merged = Vec::with_capacity(local.len() + remaining.len());

    for mut record in local {
        if record.account_type == AccountType::Aad && !has_credential(&record) {
            warn!(
                account = %record.id,
                "dropping AAD account with no cached credential"
            );
            continue;
        }

        match remaining
            .iter()
            .position(|p| record.matches(&p.id, p.account_type))
        {
            Some(idx) => {
                remaining.remove(idx);
                record.registration_state = RegistrationState::InAppCacheAndSdkCache;
            }
            None => {
                record.registration_state = RegistrationState::InAppCacheOnly;
            }
        }

        merged.push(record);
    }

    for stale in remaining {
        merged.push(AccountRecord::new(
            stale.id,
            stale.account_type,
            String::new(),
            RegistrationState::InSdkCacheOnly,
        ));
    }

    merged
}
