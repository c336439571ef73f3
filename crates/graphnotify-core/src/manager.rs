//! Account manager
//!
//! The [`AccountManager`] owns the authoritative account list for the
//! process: it reconciles the persisted app cache against the device
//! platform's cache at startup, drives each account through registration,
//! and routes the platform's callbacks (token requests, registration-state
//! changes, raw pushes) to the right collaborator.
//!
//! There is no hidden global instance; the manager is constructed with its
//! collaborators and passed down. List changes are published on a broadcast
//! channel and persisted through the account store after every mutation.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};
use uuid::Uuid;

use crate::cache::NotificationCache;
use crate::config::Config;
use crate::domain::account::{AccountRecord, AccountType, RegistrationState};
use crate::domain::errors::{AuthError, Error};
use crate::ports::feed::INotificationFeed;
use crate::ports::platform::{IDevicePlatform, PlatformAccount, PushRegistrationState};
use crate::ports::store::{IAccountStore, ICredentialStore};
use crate::ports::surface::INotificationSurface;
use crate::ports::token_provider::ITokenProvider;
use crate::reconcile::reconcile_accounts;

/// Resource the AAD interactive sign-in requests a token for
const CCS_RESOURCE: &str = "https://cdpcs.access.microsoft.com";

/// Capacity of the manager's broadcast event channel
const EVENT_CAPACITY: usize = 16;

/// Events published by the [`AccountManager`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountEvent {
    /// The account list changed; call [`AccountManager::accounts`] for the new state
    AccountsChanged,
}

/// An account plus the subcomponents that exist only while it is registered
struct ManagedAccount {
    record: AccountRecord,
    notifications: Option<Arc<NotificationCache>>,
}

impl ManagedAccount {
    fn new(record: AccountRecord) -> Self {
        Self {
            record,
            notifications: None,
        }
    }

    fn platform_account(&self) -> PlatformAccount {
        PlatformAccount::new(self.record.id.clone(), self.record.account_type)
    }
}

/// Owns the account list and each registered account's notification cache
pub struct AccountManager {
    config: Config,
    platform: Arc<dyn IDevicePlatform>,
    tokens: Arc<dyn ITokenProvider>,
    credentials: Arc<dyn ICredentialStore>,
    store: Arc<dyn IAccountStore>,
    feed: Arc<dyn INotificationFeed>,
    surface: Arc<dyn INotificationSurface>,
    accounts: Mutex<Vec<ManagedAccount>>,
    events: broadcast::Sender<AccountEvent>,
}

impl AccountManager {
    /// Creates a manager with its collaborators; call
    /// [`initialize`](Self::initialize) before anything else
    pub fn new(
        config: Config,
        platform: Arc<dyn IDevicePlatform>,
        tokens: Arc<dyn ITokenProvider>,
        credentials: Arc<dyn ICredentialStore>,
        store: Arc<dyn IAccountStore>,
        feed: Arc<dyn INotificationFeed>,
        surface: Arc<dyn INotificationSurface>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            config,
            platform,
            tokens,
            credentials,
            store,
            feed,
            surface,
            accounts: Mutex::new(Vec::new()),
            events,
        }
    }

    /// Subscribes to account list change events
    pub fn subscribe(&self) -> broadcast::Receiver<AccountEvent> {
        self.events.subscribe()
    }

    /// Loads, reconciles, and registers the account list
    ///
    /// Intended to run once at startup before any other operation. Accounts
    /// that fail to reach the registered state are dropped from the list and
    /// retried only on the next full pass (typically the next app start).
    pub async fn initialize(&self) -> Result<(), Error> {
        let local = match self.store.load().await {
            Ok(list) => list,
            Err(err) => {
                warn!(error = %err, "failed to load persisted accounts; starting empty");
                Vec::new()
            }
        };
        let platform_accounts = self
            .platform
            .list_accounts()
            .await
            .context("failed to list platform accounts")
            .map_err(Error::Registration)?;

        let mut usable_aad = HashSet::new();
        for record in local.iter().filter(|r| r.account_type == AccountType::Aad) {
            match self.credentials.has_credential(&record.id).await {
                Ok(true) => {
                    usable_aad.insert(record.id.clone());
                }
                Ok(false) => {}
                Err(err) => warn!(
                    account = %record.id,
                    error = %err,
                    "credential lookup failed; treating credential as absent"
                ),
            }
        }

        let merged = reconcile_accounts(local, platform_accounts, |record| {
            usable_aad.contains(&record.id)
        });

        let mut managed: Vec<ManagedAccount> = merged.into_iter().map(ManagedAccount::new).collect();
        for entry in &mut managed {
            self.initialize_account(entry).await;
        }

        // all accounts which can be in a good state are by now; drop the rest
        managed.retain(|entry| {
            if entry.record.registration_state.is_registered() {
                true
            } else {
                warn!(
                    account = %entry.record.id,
                    state = %entry.record.registration_state,
                    "dropping account that never reached the registered state"
                );
                false
            }
        });

        let snapshot: Vec<AccountRecord> = managed.iter().map(|e| e.record.clone()).collect();
        *self.accounts.lock().await = managed;
        self.persist_and_notify(&snapshot).await;
        Ok(())
    }

    /// Signs in a consumer account through the interactive MSA flow
    pub async fn sign_in_msa(&self) -> Result<AccountRecord, Error> {
        let refresh_token = self.tokens.acquire_msa_refresh_token().await?;
        if refresh_token.is_empty() {
            return Err(Error::Auth(AuthError::EmptyCredential));
        }

        let record = AccountRecord::new(
            Uuid::new_v4().to_string(),
            AccountType::Msa,
            refresh_token,
            RegistrationState::InAppCacheOnly,
        );
        self.admit_account(record).await
    }

    /// Signs in a work/school account through the interactive AAD flow
    pub async fn sign_in_aad(&self) -> Result<AccountRecord, Error> {
        let sign_in = self.tokens.sign_in_aad(CCS_RESOURCE).await?;
        if sign_in.access_token.is_empty() {
            return Err(Error::Auth(AuthError::EmptyCredential));
        }

        if let Err(err) = self
            .credentials
            .store_credential(&sign_in.account_id, &sign_in.access_token)
            .await
        {
            warn!(
                account = %sign_in.account_id,
                error = %err,
                "failed to cache AAD credential; account will be dropped on next startup"
            );
        }

        let record = AccountRecord::new(
            sign_in.account_id,
            AccountType::Aad,
            sign_in.access_token,
            RegistrationState::InAppCacheOnly,
        );
        self.admit_account(record).await
    }

    /// Logs an account out: best-effort platform removal, unconditional local removal
    pub async fn log_out(&self, account_id: &str) -> Result<(), Error> {
        let removed = {
            let mut accounts = self.accounts.lock().await;
            match accounts.iter().position(|e| e.record.id == account_id) {
                Some(idx) => accounts.remove(idx),
                None => return Ok(()),
            }
        };
        info!(account = %removed.record.id, "logging out");

        if let Some(cache) = &removed.notifications {
            cache.reset().await;
        }

        let platform_account = removed.platform_account();
        if let Err(err) = self.platform.remove_account(&platform_account).await {
            warn!(
                account = %platform_account.id,
                error = %err,
                "platform unregistration failed during logout"
            );
        }

        if removed.record.account_type == AccountType::Aad {
            if let Err(err) = self.credentials.remove_credential(&removed.record.id).await {
                warn!(
                    account = %removed.record.id,
                    error = %err,
                    "failed to purge cached credential"
                );
            }
        }

        let snapshot = self.snapshot_records().await;
        self.persist_and_notify(&snapshot).await;
        Ok(())
    }

    /// Answers the platform's access-token-requested callback
    pub async fn handle_access_token_request(
        &self,
        account: &PlatformAccount,
        scopes: &[String],
    ) -> Result<String, AuthError> {
        info!(
            account = %account.id,
            scopes = ?scopes,
            "token requested by platform"
        );

        let record = {
            let accounts = self.accounts.lock().await;
            accounts
                .iter()
                .find(|e| e.record.matches(&account.id, account.account_type))
                .map(|e| e.record.clone())
        };
        let Some(record) = record else {
            return Err(AuthError::Rejected(format!(
                "no such account: {}",
                account.id
            )));
        };

        match record.account_type {
            AccountType::Msa => self.tokens.msa_access_token(&record.token, scopes).await,
            AccountType::Aad => self.tokens.aad_access_token(&record.id, scopes).await,
        }
    }

    /// Reacts to the platform's registration-state-changed callback
    ///
    /// Expiring or expired push registrations are renewed in place; other
    /// transitions are ignored.
    pub async fn handle_registration_state_change(
        &self,
        account: &PlatformAccount,
        state: PushRegistrationState,
    ) {
        if !state.needs_renewal() {
            return;
        }
        info!(account = %account.id, ?state, "push registration needs renewal");

        let found = {
            let accounts = self.accounts.lock().await;
            accounts
                .iter()
                .find(|e| e.record.matches(&account.id, account.account_type))
                .map(|e| (e.platform_account(), e.notifications.clone()))
        };
        let Some((platform_account, cache)) = found else {
            return;
        };

        if let Err(err) = self.platform.register_for_push(&platform_account).await {
            warn!(
                account = %platform_account.id,
                error = %err,
                "push re-registration failed"
            );
            return;
        }
        if let Some(cache) = cache {
            if let Err(err) = cache.register().await {
                warn!(
                    account = %platform_account.id,
                    error = %err,
                    "sync re-registration failed"
                );
            }
        }
    }

    /// Forwards a raw incoming push payload to the platform
    pub async fn receive_push(&self, payload: &str) -> Result<(), Error> {
        self.platform
            .process_push_payload(payload)
            .await
            .map_err(Error::Operation)
    }

    /// Refreshes every registered account's notification cache
    pub async fn refresh_all(&self) {
        for cache in self.caches().await {
            if let Err(err) = cache.refresh().await {
                warn!(error = %err, "notification refresh failed");
            }
        }
    }

    /// Records a toast activation against whichever account holds the id
    pub async fn activate_all(&self, id: &str, dismiss: bool) {
        for cache in self.caches().await {
            if let Err(err) = cache.activate(id, dismiss).await {
                warn!(notification = id, error = %err, "activation failed");
            }
        }
    }

    /// Returns the registered accounts (the public view of the list)
    pub async fn accounts(&self) -> Vec<AccountRecord> {
        self.accounts
            .lock()
            .await
            .iter()
            .filter(|e| e.record.registration_state.is_registered())
            .map(|e| e.record.clone())
            .collect()
    }

    /// Returns the notification cache for an account, if it is registered
    pub async fn notifications(&self, account_id: &str) -> Option<Arc<NotificationCache>> {
        self.accounts
            .lock()
            .await
            .iter()
            .find(|e| e.record.id == account_id)
            .and_then(|e| e.notifications.clone())
    }

    /// Drives one reconciled record toward a consistent state
    ///
    /// Registered accounts get their subcomponents attached (idempotent);
    /// app-cache-only accounts are registered with the platform; stale
    /// platform-only accounts are removed from the platform. Failures are
    /// absorbed here; the caller's sweep drops whatever did not end up
    /// registered.
    async fn initialize_account(&self, entry: &mut ManagedAccount) {
        match entry.record.registration_state {
            RegistrationState::InAppCacheAndSdkCache => {
                if entry.notifications.is_none() {
                    entry.notifications = Some(self.build_cache(&entry.platform_account()));
                }
            }
            RegistrationState::InAppCacheOnly => {
                if let Err(err) = self.register_account(entry).await {
                    warn!(
                        account = %entry.record.id,
                        error = %err,
                        "account registration failed; will retry on the next full pass"
                    );
                }
            }
            RegistrationState::InSdkCacheOnly => {
                let platform_account = entry.platform_account();
                if let Err(err) = self.platform.remove_account(&platform_account).await {
                    warn!(
                        account = %platform_account.id,
                        error = %err,
                        "failed to remove stale platform account"
                    );
                }
            }
        }
    }

    /// Adds the account to the platform and completes registration
    ///
    /// The registered state is committed only after platform add, push
    /// registration, and sync subscription have all succeeded; on failure
    /// the record keeps its previous state and no cache is attached.
    async fn register_account(&self, entry: &mut ManagedAccount) -> anyhow::Result<()> {
        let platform_account = entry.platform_account();
        self.platform
            .add_account(&platform_account)
            .await
            .context("failed to add account to the device platform")?;

        let cache = self.build_cache(&platform_account);
        let registration = async {
            self.platform
                .register_for_push(&platform_account)
                .await
                .context("push registration failed")?;
            cache
                .register()
                .await
                .context("notification sync registration failed")
        };

        match registration.await {
            Ok(()) => {
                entry.record.registration_state = RegistrationState::InAppCacheAndSdkCache;
                entry.notifications = Some(cache);
                info!(account = %platform_account.id, "account registered with the platform");
                Ok(())
            }
            Err(err) => {
                cache.reset().await;
                Err(err)
            }
        }
    }

    /// Registers a freshly signed-in account and adds it to the list
    async fn admit_account(&self, record: AccountRecord) -> Result<AccountRecord, Error> {
        let mut entry = ManagedAccount::new(record);
        if let Err(err) = self.register_account(&mut entry).await {
            warn!(
                account = %entry.record.id,
                error = %err,
                "registration failed for newly signed-in account"
            );
            return Err(Error::Registration(err));
        }

        let record = entry.record.clone();
        let snapshot = {
            let mut accounts = self.accounts.lock().await;
            accounts.push(entry);
            accounts.iter().map(|e| e.record.clone()).collect::<Vec<_>>()
        };
        self.persist_and_notify(&snapshot).await;
        Ok(record)
    }

    fn build_cache(&self, account: &PlatformAccount) -> Arc<NotificationCache> {
        NotificationCache::new(
            account.clone(),
            self.config.app_host_name.clone(),
            self.feed.clone(),
            self.surface.clone(),
        )
    }

    async fn caches(&self) -> Vec<Arc<NotificationCache>> {
        self.accounts
            .lock()
            .await
            .iter()
            .filter_map(|e| e.notifications.clone())
            .collect()
    }

    async fn snapshot_records(&self) -> Vec<AccountRecord> {
        self.accounts
            .lock()
            .await
            .iter()
            .map(|e| e.record.clone())
            .collect()
    }

    /// Persists the list and tells subscribers it changed
    async fn persist_and_notify(&self, records: &[AccountRecord]) {
        if let Err(err) = self.store.save(records).await {
            warn!(error = %err, "failed to persist account list");
        }
        let _ = self.events.send(AccountEvent::AccountsChanged);
    }
}
