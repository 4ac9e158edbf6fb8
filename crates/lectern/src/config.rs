//! Runtime configuration, sourced from the environment.
//!
//! | Variable                    | Meaning                                   |
//! |-----------------------------|-------------------------------------------|
//! | `LECTERN_API_URL`           | Backend base URL                          |
//! | `LECTERN_DEV_AUTH`          | `"0"`/`"false"` switch to backend auth    |
//! | `LECTERN_OAUTH_CLIENT_ID`   | OAuth client id (enables the login flow)  |
//! | `LECTERN_OAUTH_REDIRECT_URI`| OAuth callback URL                        |
//!
//! Dev bypass is the default: a fresh checkout runs with no environment
//! at all and signs in locally. Backend auth is opt-out, not opt-in, so
//! nobody ships dev bypass by accident — production deployments set
//! `LECTERN_DEV_AUTH=0` explicitly and the misconfiguration is loud
//! (login errors) rather than silent (fake users).

use lectern_api::OAuthConfig;
use lectern_auth::AuthMode;

const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Facade configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend base URL.
    pub api_base_url: String,

    /// Which credential source is authoritative.
    pub auth_mode: AuthMode,

    /// OAuth settings; `None` means backend mode has no external login
    /// flow and `login_with_provider` fails with a handshake error.
    pub oauth: Option<OAuthConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            auth_mode: AuthMode::DevBypass,
            oauth: None,
        }
    }
}

impl Config {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Reads configuration through a lookup function.
    ///
    /// The indirection exists so tests can feed variables without
    /// touching the real (process-global) environment.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_base_url = lookup("LECTERN_API_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let auth_mode = match lookup("LECTERN_DEV_AUTH").as_deref() {
            Some("0") | Some("false") => AuthMode::Backend,
            _ => AuthMode::DevBypass,
        };

        let oauth = match (
            lookup("LECTERN_OAUTH_CLIENT_ID"),
            lookup("LECTERN_OAUTH_REDIRECT_URI"),
        ) {
            (Some(client_id), Some(redirect_uri))
                if !client_id.is_empty() && !redirect_uri.is_empty() =>
            {
                Some(OAuthConfig::new(client_id, redirect_uri))
            }
            _ => None,
        };

        Self {
            api_base_url,
            auth_mode,
            oauth,
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
