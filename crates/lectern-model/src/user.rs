//! Identity types: the authenticated principal and its wire mapping.
//!
//! A [`User`] is the client's record of who is logged in. It is the unit
//! the auth controller manages: published to the UI on every transition
//! and persisted to local storage so a reload can restore the last
//! visible state before any network round trip.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Which part of the dashboard a user may see.
///
/// This is a closed set — the backend never returns anything outside it.
/// A user whose role has not been assigned yet carries `None` instead
/// (see [`User::role`]), which is why `Role` itself has no "unassigned"
/// variant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    Admin,
}

impl Role {
    /// The lowercase wire name, also used to derive deterministic
    /// dev-mode identities (`dev-student`, `student@dev.local`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Teacher => "teacher",
            Self::Admin => "admin",
        }
    }

    /// All roles, in display order. Handy for dev-login pickers.
    pub const ALL: [Role; 3] = [Role::Student, Role::Teacher, Role::Admin];
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// UserStatus
// ---------------------------------------------------------------------------

/// Where an account sits in its approval lifecycle.
///
/// ```text
/// PendingProfile → PendingApproval → Active
///                                      │
///                                      ▼ (admin action)
///                                   Disabled
/// ```
///
/// Only `Active` users get role-gated content; the others are routed to
/// onboarding or "pending" screens by the UI layer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Active,
    PendingProfile,
    PendingApproval,
    Disabled,
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::PendingProfile => write!(f, "pending_profile"),
            Self::PendingApproval => write!(f, "pending_approval"),
            Self::Disabled => write!(f, "disabled"),
        }
    }
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// The authenticated principal, as the client sees it.
///
/// At most one `User` is active per store context; absence means
/// anonymous. This struct is also the exact JSON shape persisted under
/// the session-snapshot storage key, so keep it stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Opaque backend identifier. Never parsed client-side.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Contact email; doubles as the display name fallback.
    pub email: String,

    /// `None` while the account is pending role assignment.
    pub role: Option<Role>,

    /// Account lifecycle status.
    pub status: UserStatus,
}

impl User {
    /// Returns `true` if the user may see content gated on `role`.
    pub fn has_role(&self, role: Role) -> bool {
        self.role == Some(role)
    }

    /// Returns `true` for accounts allowed past the pending screens.
    pub fn is_active(&self) -> bool {
        matches!(self.status, UserStatus::Active)
    }
}

// ---------------------------------------------------------------------------
// MeResponse — the identity endpoint payload
// ---------------------------------------------------------------------------

/// Raw payload of `GET /api/auth/me`.
///
/// The backend is loose about which fields it fills: older deployments
/// send `id`, newer ones `user_id`; name may arrive split into
/// `first_name`/`last_name` or pre-joined in `name`. Every field is
/// optional here, and [`MeResponse::into_user`] applies the fallback
/// chain so the rest of the client only ever sees a well-formed
/// [`User`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MeResponse {
    pub user_id: Option<String>,
    pub id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

impl MeResponse {
    /// Maps the loose wire payload onto a [`User`].
    ///
    /// Fallback rules (first match wins):
    /// - id: `user_id`, then `id`, then empty
    /// - name: `first_name last_name` when both are present, then
    ///   `name`, then `email`, then empty
    /// - status: `is_active == false` → [`UserStatus::Disabled`],
    ///   anything else → [`UserStatus::Active`]
    ///
    /// This mapping never fails — a degenerate payload yields a user
    /// with empty strings, and the caller decides what to do with it.
    pub fn into_user(self) -> User {
        let id = self.user_id.or(self.id).unwrap_or_default();

        let name = match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            _ => self
                .name
                .or_else(|| self.email.clone())
                .unwrap_or_default(),
        };

        let status = if self.is_active == Some(false) {
            UserStatus::Disabled
        } else {
            UserStatus::Active
        };

        User {
            id,
            name,
            email: self.email.unwrap_or_default(),
            role: self.role,
            status,
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serde_round_trip_is_lowercase() {
        let json = serde_json::to_string(&Role::Teacher).unwrap();
        assert_eq!(json, "\"teacher\"");
        let back: Role = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Role::Teacher);
    }

    #[test]
    fn test_user_status_serde_uses_snake_case() {
        let json = serde_json::to_string(&UserStatus::PendingApproval).unwrap();
        assert_eq!(json, "\"pending_approval\"");
    }

    #[test]
    fn test_into_user_prefers_user_id_over_id() {
        let me = MeResponse {
            user_id: Some("u-1".into()),
            id: Some("legacy-1".into()),
            email: Some("a@b.c".into()),
            ..Default::default()
        };
        assert_eq!(me.into_user().id, "u-1");
    }

    #[test]
    fn test_into_user_falls_back_to_legacy_id() {
        let me = MeResponse {
            id: Some("legacy-1".into()),
            ..Default::default()
        };
        assert_eq!(me.into_user().id, "legacy-1");
    }

    #[test]
    fn test_into_user_joins_split_name_fields() {
        let me = MeResponse {
            first_name: Some("Ada".into()),
            last_name: Some("Lovelace".into()),
            name: Some("ignored".into()),
            ..Default::default()
        };
        assert_eq!(me.into_user().name, "Ada Lovelace");
    }

    #[test]
    fn test_into_user_name_falls_back_to_email() {
        let me = MeResponse {
            email: Some("ada@uni.edu".into()),
            ..Default::default()
        };
        let user = me.into_user();
        assert_eq!(user.name, "ada@uni.edu");
        assert_eq!(user.email, "ada@uni.edu");
    }

    #[test]
    fn test_into_user_inactive_flag_maps_to_disabled() {
        let me = MeResponse {
            is_active: Some(false),
            ..Default::default()
        };
        assert_eq!(me.into_user().status, UserStatus::Disabled);
    }

    #[test]
    fn test_into_user_missing_active_flag_defaults_to_active() {
        let me = MeResponse::default();
        assert_eq!(me.into_user().status, UserStatus::Active);
    }

    #[test]
    fn test_into_user_role_stays_nullable() {
        let me: MeResponse =
            serde_json::from_str(r#"{"user_id":"u-2","role":null}"#).unwrap();
        assert_eq!(me.into_user().role, None);
    }

    #[test]
    fn test_user_snapshot_json_round_trip() {
        // The User shape doubles as the persisted snapshot format, so a
        // serialize/deserialize round trip must be lossless.
        let user = User {
            id: "u-3".into(),
            name: "Grace".into(),
            email: "grace@uni.edu".into(),
            role: Some(Role::Admin),
            status: UserStatus::Active,
        };
        let json = serde_json::to_string(&user).unwrap();
        let back: User = serde_json::from_str(&json).unwrap();
        assert_eq!(back, user);
    }

    #[test]
    fn test_has_role_and_is_active() {
        let user = User {
            id: "u".into(),
            name: "n".into(),
            email: "e".into(),
            role: Some(Role::Student),
            status: UserStatus::PendingApproval,
        };
        assert!(user.has_role(Role::Student));
        assert!(!user.has_role(Role::Admin));
        assert!(!user.is_active());
    }
}
