//! Error taxonomy for the crate's public boundaries
//!
//! Adapter-level failures cross the port boundary as `anyhow::Error` and are
//! converted here into a small typed taxonomy at each public operation.
//! Errors never propagate as panics across the account-list or cache
//! boundaries.

use thiserror::Error;

/// Credential acquisition failures reported by the token provider
#[derive(Debug, Error)]
pub enum AuthError {
    /// The interactive flow completed but produced no usable credential
    #[error("interactive sign-in returned no usable credential")]
    EmptyCredential,

    /// The identity service rejected the request; retrying will not help
    #[error("credential request rejected: {0}")]
    Rejected(String),

    /// The request failed for a reason that may clear up (network, 5xx)
    #[error("transient credential failure: {0}")]
    Transient(String),
}

impl AuthError {
    /// Returns true if retrying the same request later could succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, AuthError::Transient(_))
    }
}

/// Failures surfaced by the account manager and notification cache
#[derive(Debug, Error)]
pub enum Error {
    /// Credential acquisition failed or returned empty; not retried automatically
    #[error("authentication failed")]
    Auth(#[from] AuthError),

    /// Platform registration rejected or failed; the account is swept on the
    /// next reconciliation pass rather than retried in place
    #[error("platform registration failed")]
    Registration(#[source] anyhow::Error),

    /// Feed/channel construction or sync read failed; the channel stays absent
    /// and is retried lazily on next access
    #[error("notification channel unavailable")]
    Sync(#[source] anyhow::Error),

    /// A single-record mutation failed; other records and the overall cache
    /// state are unaffected
    #[error("notification operation failed")]
    Operation(#[source] anyhow::Error),
}
