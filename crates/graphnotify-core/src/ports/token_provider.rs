//! Token provider port (driven/secondary port)
//!
//! This module defines the interface for acquiring OAuth credentials.
//! The interactive parts (browser broker, consent prompts) are entirely the
//! adapter's concern; the core only sees the resulting token strings.
//!
//! ## Design Notes
//!
//! - Returns the typed [`AuthError`](crate::domain::errors::AuthError) rather
//!   than `anyhow::Result` because callers route on the permanent/transient
//!   distinction.
//! - For AAD, implementations are expected to try a silent (cached) token
//!   acquisition first and fall back to an interactive prompt.

use crate::domain::errors::AuthError;

// ============================================================================
// AadSignIn
// ============================================================================

/// Result of an interactive AAD sign-in
#[derive(Debug, Clone)]
pub struct AadSignIn {
    /// The directory object id of the signed-in principal
    pub account_id: String,
    /// An access token for the requested resource
    pub access_token: String,
}

// ============================================================================
// ITokenProvider trait
// ============================================================================

/// Port trait for OAuth credential acquisition
///
/// Implementations wrap whatever identity stack the host platform provides.
/// All methods may suspend for a long time when an interactive prompt is
/// shown; the core never issues two interactive requests for the same
/// account concurrently.
#[async_trait::async_trait]
pub trait ITokenProvider: Send + Sync {
    /// Runs the interactive MSA consent flow and returns a refresh token
    ///
    /// # Errors
    /// [`AuthError::EmptyCredential`](crate::domain::errors::AuthError) if the
    /// flow completed without producing a token.
    async fn acquire_msa_refresh_token(&self) -> Result<String, AuthError>;

    /// Redeems an MSA refresh token for an access token with the given scopes
    async fn msa_access_token(
        &self,
        refresh_token: &str,
        scopes: &[String],
    ) -> Result<String, AuthError>;

    /// Runs the interactive AAD sign-in flow for the given resource
    async fn sign_in_aad(&self, resource: &str) -> Result<AadSignIn, AuthError>;

    /// Acquires an AAD access token for an already-known principal
    ///
    /// Implementations should attempt a silent acquisition from their token
    /// cache first, then fall back to an interactive prompt.
    async fn aad_access_token(
        &self,
        account_id: &str,
        scopes: &[String],
    ) -> Result<String, AuthError>;
}
