//! OAuth2 PKCE flow against the consumer (MSA) login endpoints
//!
//! ## Components
//!
//! - [`MsaOAuthConfig`] - Endpoint and client configuration
//! - [`MsaTokenClient`] - Authorization-URL construction and token exchange
//!
//! Token-endpoint failures are classified into the core's
//! [`AuthError`] taxonomy: OAuth error responses are permanent rejections,
//! transport failures are transient.

use anyhow::{Context, Result};
use oauth2::{
    basic::BasicClient, AuthUrl, AuthorizationCode, ClientId, CsrfToken, EndpointNotSet,
    EndpointSet, PkceCodeChallenge, PkceCodeVerifier, RedirectUrl, RefreshToken,
    RequestTokenError, Scope, TokenResponse, TokenUrl,
};
use tracing::{debug, info};

use graphnotify_core::domain::errors::AuthError;

/// Consumer authorization endpoint
const AUTH_URL: &str = "https://login.live.com/oauth20_authorize.srf";

/// Consumer token endpoint
const TOKEN_URL: &str = "https://login.live.com/oauth20_token.srf";

/// Native-client redirect URI registered for the consumer flow
const REDIRECT_URL: &str = "https://login.microsoftonline.com/common/oauth2/nativeclient";

/// Scope keeping the refresh token alive across sessions
pub const OFFLINE_ACCESS_SCOPE: &str = "wl.offline_access";

/// Push channel scope
pub const WNS_SCOPE: &str = "wns.connect";

/// Device directory scopes
pub const DDS_SCOPE: &str = "dds.register dds.read";

/// Cloud connected services scope
pub const CCS_SCOPE: &str = "ccs.ReadWrite";

/// User activities scope
pub const USER_ACTIVITIES_SCOPE: &str =
    "https://activity.windows.com/UserActivity.ReadWrite.CreatedByApp";

/// User notifications scope
pub const USER_NOTIFICATIONS_SCOPE: &str =
    "https://activity.windows.com/Notifications.ReadWrite.CreatedByApp";

/// The scope set requested during the interactive sign-in
pub fn sign_in_scopes() -> Vec<String> {
    [
        OFFLINE_ACCESS_SCOPE,
        WNS_SCOPE,
        CCS_SCOPE,
        USER_NOTIFICATIONS_SCOPE,
        USER_ACTIVITIES_SCOPE,
        DDS_SCOPE,
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

// ============================================================================
// MsaOAuthConfig
// ============================================================================

/// Configuration for the MSA OAuth2 flow
#[derive(Debug, Clone)]
pub struct MsaOAuthConfig {
    /// Application (client) ID from the app registration
    pub client_id: String,
    /// Authorization endpoint
    pub auth_url: String,
    /// Token endpoint
    pub token_url: String,
    /// Redirect URI for receiving the authorization code
    pub redirect_uri: String,
}

impl MsaOAuthConfig {
    /// Creates a config for the production consumer endpoints
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            auth_url: AUTH_URL.to_string(),
            token_url: TOKEN_URL.to_string(),
            redirect_uri: REDIRECT_URL.to_string(),
        }
    }

    /// Overrides the token endpoint (tests point this at a mock server)
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }
}

// ============================================================================
// MsaTokenClient
// ============================================================================

/// OAuth2 client for the consumer login endpoints
///
/// Builds PKCE authorization URLs and performs the two token exchanges of
/// the consumer flow. The interactive navigation to the authorization URL is
/// the caller's job.
pub struct MsaTokenClient {
    client: BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>,
    http: reqwest::Client,
}

impl MsaTokenClient {
    /// Creates a client from the given configuration
    pub fn new(config: &MsaOAuthConfig) -> Result<Self> {
        let client = BasicClient::new(ClientId::new(config.client_id.clone()))
            .set_auth_uri(
                AuthUrl::new(config.auth_url.clone()).context("Invalid authorization URL")?,
            )
            .set_token_uri(TokenUrl::new(config.token_url.clone()).context("Invalid token URL")?)
            .set_redirect_uri(
                RedirectUrl::new(config.redirect_uri.clone()).context("Invalid redirect URI")?,
            );

        Ok(Self {
            client,
            http: reqwest::Client::new(),
        })
    }

    /// Generates an authorization URL with a PKCE challenge
    ///
    /// # Returns
    /// A tuple of `(authorization_url, csrf_token, pkce_verifier)`.
    /// The `pkce_verifier` must be kept until the code exchange step.
    pub fn authorize_url(&self, scopes: &[String]) -> (String, CsrfToken, PkceCodeVerifier) {
        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let mut auth_request = self.client.authorize_url(CsrfToken::new_random);
        for scope in scopes {
            auth_request = auth_request.add_scope(Scope::new(scope.clone()));
        }

        let (auth_url, csrf_token) = auth_request.set_pkce_challenge(pkce_challenge).url();

        debug!("generated MSA authorization URL");
        (auth_url.to_string(), csrf_token, pkce_verifier)
    }

    /// Exchanges an authorization code for a refresh token
    ///
    /// # Arguments
    /// * `code` - The authorization code captured from the redirect
    /// * `pkce_verifier` - The PKCE verifier generated alongside the auth URL
    ///
    /// # Errors
    /// [`AuthError::EmptyCredential`] if the endpoint answered without a
    /// refresh token (e.g. the offline-access scope was not granted).
    pub async fn redeem_authorization_code(
        &self,
        code: String,
        pkce_verifier: PkceCodeVerifier,
    ) -> Result<String, AuthError> {
        info!("exchanging authorization code for a refresh token");

        let token_result = self
            .client
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(pkce_verifier)
            .request_async(&self.http)
            .await
            .map_err(|err| map_token_error(&err))?;

        let refresh_token = token_result
            .refresh_token()
            .map(|t| t.secret().to_string())
            .ok_or(AuthError::EmptyCredential)?;

        info!("obtained MSA refresh token");
        Ok(refresh_token)
    }

    /// Redeems a refresh token for an access token with the given scopes
    pub async fn access_token_from_refresh_token(
        &self,
        refresh_token: &str,
        scopes: &[String],
    ) -> Result<String, AuthError> {
        debug!("redeeming refresh token for an access token");

        let refresh = RefreshToken::new(refresh_token.to_string());
        let mut request = self.client.exchange_refresh_token(&refresh);
        for scope in scopes {
            request = request.add_scope(Scope::new(scope.clone()));
        }

        let token_result = request
            .request_async(&self.http)
            .await
            .map_err(|err| map_token_error(&err))?;

        Ok(token_result.access_token().secret().to_string())
    }
}

/// Classifies a token-endpoint failure into the core taxonomy
///
/// An OAuth error response is a decision by the service and will not clear
/// up on retry; anything that failed before a response was parsed is treated
/// as transient transport trouble.
fn map_token_error<RE, T>(err: &RequestTokenError<RE, T>) -> AuthError
where
    RE: std::error::Error + 'static,
    T: oauth2::ErrorResponse + std::fmt::Display + 'static,
{
    match err {
        RequestTokenError::ServerResponse(response) => AuthError::Rejected(response.to_string()),
        RequestTokenError::Request(err) => AuthError::Transient(err.to_string()),
        RequestTokenError::Parse(err, _) => {
            AuthError::Transient(format!("malformed token response: {err}"))
        }
        RequestTokenError::Other(message) => AuthError::Rejected(message.clone()),
    }
}
