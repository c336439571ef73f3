//! MSA OAuth adapter for graphnotify
//!
//! Implements the consumer (MSA) side of credential acquisition: building
//! PKCE-secured authorization URLs for the interactive consent step, and the
//! two token exchanges the core needs afterwards (authorization code to
//! refresh token, refresh token to access token).
//!
//! The interactive step itself - driving a browser or web broker to the
//! authorization URL and capturing the redirect - belongs to the host app;
//! this crate only speaks to the token endpoint. A host's
//! [`ITokenProvider`](graphnotify_core::ports::token_provider::ITokenProvider)
//! implementation composes [`MsaTokenClient`] for the MSA methods and its
//! platform's identity broker for the AAD ones.

pub mod msa;

pub use msa::{MsaOAuthConfig, MsaTokenClient};
