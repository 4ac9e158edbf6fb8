//! Session snapshots: the published view and its persisted form.

use lectern_model::{Role, User, UserStatus};
use lectern_store::{Store, keys};

// ---------------------------------------------------------------------------
// AuthSnapshot
// ---------------------------------------------------------------------------

/// What the UI sees: the current user (or `None` for anonymous) and
/// whether startup resolution is still in flight.
///
/// Published over a watch channel on every transition. Consumers only
/// ever read clones of this — the controller's own state is never
/// handed out mutably.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSnapshot {
    /// The authenticated user, or `None` when anonymous.
    pub user: Option<User>,

    /// `true` until the first `initialize()` settles. UI gated on
    /// roles must render a placeholder while this is set.
    pub initializing: bool,
}

impl Default for AuthSnapshot {
    /// The pre-initialize view: nobody logged in, resolution pending.
    fn default() -> Self {
        Self {
            user: None,
            initializing: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Dev identities
// ---------------------------------------------------------------------------

/// Synthesizes the deterministic dev-bypass identity for a role.
///
/// The shape is fixed so dev sessions survive reloads byte-for-byte:
/// id `dev-{role}`, name `{ROLE}`, email `{role}@dev.local`, active.
pub fn dev_user(role: Role) -> User {
    User {
        id: format!("dev-{role}"),
        name: role.as_str().to_uppercase(),
        email: format!("{role}@dev.local"),
        role: Some(role),
        status: UserStatus::Active,
    }
}

// ---------------------------------------------------------------------------
// Snapshot persistence
// ---------------------------------------------------------------------------

/// Loads the cached session snapshot, if one parses.
///
/// A missing entry, a storage failure, or a snapshot that fails to
/// deserialize all mean the same thing: no cached session. Nothing
/// here is worth failing startup over.
pub(crate) fn load_snapshot<S: Store>(store: &S) -> Option<User> {
    let raw = match store.get(keys::SESSION_SNAPSHOT) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(error = %e, "snapshot read failed");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(user) => Some(user),
        Err(e) => {
            tracing::debug!(error = %e, "cached snapshot unparseable, ignoring");
            None
        }
    }
}

/// Persists (or clears, for `None`) the session snapshot.
///
/// Failures are logged and swallowed: a broken cache only costs the
/// optimistic restore on the next reload, while propagating the error
/// would leave the controller unable to settle.
pub(crate) fn save_snapshot<S: Store>(store: &S, user: Option<&User>) {
    let result = match user {
        Some(user) => match serde_json::to_string(user) {
            Ok(json) => store.set(keys::SESSION_SNAPSHOT, &json),
            Err(e) => {
                tracing::warn!(error = %e, "snapshot serialize failed");
                return;
            }
        },
        None => store.remove(keys::SESSION_SNAPSHOT),
    };
    if let Err(e) = result {
        tracing::warn!(error = %e, "snapshot write failed");
    }
}
