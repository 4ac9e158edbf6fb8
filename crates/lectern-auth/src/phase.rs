//! The credential-source strategy and the session state machine.

use std::fmt;

use lectern_model::User;

// ---------------------------------------------------------------------------
// AuthMode
// ---------------------------------------------------------------------------

/// Which credential source is authoritative.
///
/// Selected once when the controller is built, from configuration —
/// never switched at runtime. Exactly one source is authoritative at a
/// time; in `DevBypass` mode real token validation is short-circuited
/// entirely, so the two strategies cannot mix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Local development: identities are synthesized per role and
    /// cached in the store. No network calls are ever made.
    DevBypass,

    /// Production: a stored bearer token (or the backend session
    /// cookie riding along with requests) is validated against the
    /// identity endpoint.
    Backend,
}

impl AuthMode {
    /// Returns `true` in local-development bypass mode.
    pub fn is_dev(&self) -> bool {
        matches!(self, Self::DevBypass)
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DevBypass => write!(f, "dev-bypass"),
            Self::Backend => write!(f, "backend"),
        }
    }
}

// ---------------------------------------------------------------------------
// AuthPhase
// ---------------------------------------------------------------------------

/// The lifecycle state of the session.
///
/// ```text
/// Uninitialized ──→ Initializing ──┬──→ Anonymous
///                                  └──→ Authenticated
///
/// Anonymous     ──(login)────────────→ Authenticated
/// Authenticated ──(logout/rejection)─→ Anonymous
/// Authenticated ──(refresh)──────────→ Authenticated
/// ```
///
/// There is deliberately no "errored" state: every failure path lands
/// in `Anonymous`. The user sees the logged-out UI, never a scary
/// authentication error.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthPhase {
    /// Controller constructed, `initialize()` not yet called.
    Uninitialized,

    /// `initialize()` is resolving the identity. UI gated on auth
    /// should render a placeholder while here.
    Initializing,

    /// No session. Either nobody logged in, or a credential was
    /// rejected and cleared.
    Anonymous,

    /// A session is active for this user.
    Authenticated(User),
}

impl AuthPhase {
    /// The current user, if authenticated.
    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    /// Returns `true` once the controller has settled into a definite
    /// answer (anonymous or authenticated).
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Anonymous | Self::Authenticated(_))
    }
}

impl fmt::Display for AuthPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "uninitialized"),
            Self::Initializing => write!(f, "initializing"),
            Self::Anonymous => write!(f, "anonymous"),
            Self::Authenticated(user) => {
                write!(f, "authenticated({})", user.id)
            }
        }
    }
}
