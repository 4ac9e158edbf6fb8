//! Google OAuth login flow: redirect construction and CSRF state.
//!
//! Login in backend mode is a browser redirect, not an HTTP exchange:
//! we mint a random `state` nonce, persist it so the callback handler
//! can verify it, build the provider's authorization URL, and hand the
//! URL to a navigation callback. The token exchange itself happens on
//! the backend after the provider redirects back.

use std::fmt;
use std::sync::Arc;

use lectern_auth::{AuthError, LoginFlow};
use lectern_store::{Store, keys};
use rand::Rng;
use reqwest::Url;

const DEFAULT_AUTHORIZE_ENDPOINT: &str =
    "https://accounts.google.com/o/oauth2/v2/auth";

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Provider settings for the authorization redirect.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    pub authorize_endpoint: String,
}

impl OAuthConfig {
    /// Config with Google's endpoint and the standard identity scopes.
    pub fn new(
        client_id: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
            scopes: vec![
                "openid".to_string(),
                "profile".to_string(),
                "email".to_string(),
            ],
            authorize_endpoint: DEFAULT_AUTHORIZE_ENDPOINT.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Redirect flow
// ---------------------------------------------------------------------------

/// [`LoginFlow`] that sends the user to the provider's consent screen.
///
/// `navigate` abstracts the actual redirect (opening a browser,
/// setting `window.location`, or capturing the URL in tests).
pub struct OAuthRedirect<S> {
    config: OAuthConfig,
    store: Arc<S>,
    navigate: Box<dyn Fn(&str) + Send + Sync>,
}

impl<S> fmt::Debug for OAuthRedirect<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthRedirect")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<S: Store> OAuthRedirect<S> {
    pub fn new(
        config: OAuthConfig,
        store: Arc<S>,
        navigate: impl Fn(&str) + Send + Sync + 'static,
    ) -> Self {
        Self {
            config,
            store,
            navigate: Box::new(navigate),
        }
    }

    fn authorize_url(&self, state: &str) -> Result<Url, AuthError> {
        let mut url = Url::parse(&self.config.authorize_endpoint)
            .map_err(|e| AuthError::Handshake(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.config.scopes.join(" "))
            .append_pair("access_type", "offline")
            .append_pair("include_granted_scopes", "true")
            .append_pair("state", state)
            .append_pair("prompt", "consent");
        Ok(url)
    }
}

impl<S: Store> LoginFlow for OAuthRedirect<S> {
    fn begin(&self) -> Result<(), AuthError> {
        let state = nonce();
        // Persisted so the callback handler can reject a mismatched
        // state parameter.
        self.store
            .set(keys::OAUTH_STATE, &state)
            .map_err(|e| AuthError::Handshake(e.to_string()))?;

        let url = self.authorize_url(&state)?;
        tracing::info!("redirecting to identity provider");
        (self.navigate)(url.as_str());
        Ok(())
    }
}

/// Random CSRF state: 16 bytes, hex-encoded.
fn nonce() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

// =========================================================================
// Tests
// =========================================================================
