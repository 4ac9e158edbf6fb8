//! Error types for the auth layer.

/// Errors that can occur while resolving or changing the session.
///
/// Note the asymmetry with most error enums: the controller itself
/// never surfaces `CredentialRejected` or `Unreachable` to callers —
/// both are handled internally by downgrading to anonymous (fail
/// closed). They exist so [`IdentityProvider`](crate::IdentityProvider)
/// implementations can say *why* a check failed, which ends up in debug
/// logs.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The identity endpoint rejected the stored credential (expired or
    /// invalid token, revoked session).
    #[error("credential rejected: {0}")]
    CredentialRejected(String),

    /// The identity endpoint could not be reached. Treated exactly like
    /// a rejection: when in doubt, anonymous.
    #[error("identity endpoint unreachable: {0}")]
    Unreachable(String),

    /// `login_as_dev` was called while the controller runs in backend
    /// mode. Dev logins must not be reachable in a production build.
    #[error("dev bypass is disabled in this configuration")]
    DevBypassDisabled,

    /// Starting the external login handshake failed (bad OAuth
    /// configuration, storage failure while parking the state nonce).
    #[error("login handshake failed: {0}")]
    Handshake(String),
}
