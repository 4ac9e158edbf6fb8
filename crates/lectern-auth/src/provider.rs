//! Strategy traits at the auth layer's seams.
//!
//! The controller doesn't implement HTTP or OAuth itself — that lives
//! in `lectern-api` (or in a mock, in tests). Two narrow traits keep
//! the boundary honest:
//!
//! - [`IdentityProvider`] — "validate whatever credential rides along
//!   and tell me who this is": one async call to the identity endpoint.
//! - [`LoginFlow`] — "begin the external login handshake": fire and
//!   forget; completion is observed later as a credential appearing in
//!   the store or a page navigation, never as a return value.

use std::future::Future;

use lectern_model::User;

use crate::AuthError;

/// Resolves the current credential to a user profile.
///
/// `Send + Sync + 'static` because the provider is owned by a
/// controller that may live inside long-running async tasks.
pub trait IdentityProvider: Send + Sync + 'static {
    /// Calls the identity endpoint and maps the payload to a [`User`].
    ///
    /// # Returns
    /// - `Ok(User)` — the credential is valid, here's who it belongs to
    /// - `Err(AuthError::CredentialRejected)` — the backend said no
    /// - `Err(AuthError::Unreachable)` — the backend couldn't be asked
    ///
    /// The controller treats both error cases identically (downgrade to
    /// anonymous); the distinction only matters for logs.
    fn fetch_identity(
        &self,
    ) -> impl Future<Output = Result<User, AuthError>> + Send;
}

/// Begins the external redirect-based login handshake.
///
/// Synchronous on purpose: starting the handshake means building an
/// authorize URL, parking a state nonce, and handing navigation off to
/// the host — nothing here awaits the backend.
pub trait LoginFlow: Send + Sync + 'static {
    /// Kicks off the handshake. Nothing is observed synchronously; a
    /// successful login later materializes as a credential in storage.
    fn begin(&self) -> Result<(), AuthError>;
}

/// A [`LoginFlow`] for configurations that have none (dev bypass, or a
/// backend embedding that handles login out of band).
///
/// In dev-bypass mode the controller warns and returns before ever
/// reaching the flow, so this error is only observable when a backend
/// configuration genuinely forgot its OAuth settings.
pub struct NoLoginFlow;

impl LoginFlow for NoLoginFlow {
    fn begin(&self) -> Result<(), AuthError> {
        Err(AuthError::Handshake("no login flow configured".into()))
    }
}

// Lets callers that choose the flow at runtime hold a boxed one where
// the controller expects `L: LoginFlow`.
impl LoginFlow for Box<dyn LoginFlow> {
    fn begin(&self) -> Result<(), AuthError> {
        (**self).begin()
    }
}
