//! Account domain entity
//!
//! This module defines the account record tracked by the app cache, its
//! principal type, and the tri-state registration lifecycle that results
//! from reconciling the app cache against the device platform's cache.

use serde::{Deserialize, Serialize};

/// The identity system an account belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    /// Consumer Microsoft account
    Msa,
    /// Azure Active Directory (work or school) account
    Aad,
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountType::Msa => write!(f, "msa"),
            AccountType::Aad => write!(f, "aad"),
        }
    }
}

/// Where an account is currently known to exist
///
/// Accounts can be in three different scenarios:
/// 1. present in both the app cache and the platform cache (good standing),
/// 2. present only in the app cache: must be added to the platform and registered,
/// 3. present only in the platform cache: stale, must be removed from the platform.
///
/// The state is never persisted; it is derived on every startup by
/// reconciling the two caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegistrationState {
    /// Known to the app cache only (scenario 2)
    #[default]
    InAppCacheOnly,
    /// Known to the platform cache only (scenario 3)
    InSdkCacheOnly,
    /// Known to both caches (scenario 1)
    InAppCacheAndSdkCache,
}

impl RegistrationState {
    /// Returns true if the account is in good standing on both sides
    pub fn is_registered(&self) -> bool {
        matches!(self, RegistrationState::InAppCacheAndSdkCache)
    }
}

impl std::fmt::Display for RegistrationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistrationState::InAppCacheOnly => write!(f, "in_app_cache_only"),
            RegistrationState::InSdkCacheOnly => write!(f, "in_sdk_cache_only"),
            RegistrationState::InAppCacheAndSdkCache => write!(f, "in_app_cache_and_sdk_cache"),
        }
    }
}

/// A user account tracked by the app cache
///
/// `token` holds whatever credential material the account type needs later:
/// a refresh token for MSA accounts, the most recent access token for AAD
/// accounts (whose real token logic lives in the credential store).
/// `registration_state` is excluded from serialization on purpose; the
/// persisted form carries identity and credential only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    /// Opaque external identity (directory object id for AAD, generated for MSA)
    pub id: String,
    /// Which identity system the account belongs to
    #[serde(rename = "type")]
    pub account_type: AccountType,
    /// Cached credential material; may be empty until acquired
    #[serde(default)]
    pub token: String,
    /// Derived registration lifecycle state, never persisted
    #[serde(skip)]
    pub registration_state: RegistrationState,
}

impl AccountRecord {
    /// Creates a new account record
    pub fn new(
        id: impl Into<String>,
        account_type: AccountType,
        token: impl Into<String>,
        registration_state: RegistrationState,
    ) -> Self {
        Self {
            id: id.into(),
            account_type,
            token: token.into(),
            registration_state,
        }
    }

    /// Returns true if this record refers to the same principal as `(id, account_type)`
    pub fn matches(&self, id: &str, account_type: AccountType) -> bool {
        self.id == id && self.account_type == account_type
    }
}
