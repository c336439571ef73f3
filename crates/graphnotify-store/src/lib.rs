//! Local persistence adapters for graphnotify
//!
//! Two adapters behind the core's storage ports:
//! - [`JsonAccountStore`] - the serialized account list as a JSON file,
//!   written atomically after every account-list mutation
//! - [`KeyringCredentialStore`] - credential material in the OS credential
//!   store (GNOME Keyring, KDE Wallet, macOS Keychain)

pub mod credentials;
pub mod file_store;

pub use credentials::KeyringCredentialStore;
pub use file_store::JsonAccountStore;
