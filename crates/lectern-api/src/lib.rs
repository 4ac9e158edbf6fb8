//! HTTP layer for the Lectern client core.
//!
//! Everything that talks to the outside world lives here:
//!
//! - [`ApiClient`] — a thin typed wrapper over `reqwest` that attaches
//!   the stored bearer token (and carries the backend session cookie in
//!   its cookie jar), speaks the backend's JSON dialect, and implements
//!   [`IdentityProvider`](lectern_auth::IdentityProvider) for the auth
//!   controller.
//! - Schedule endpoints and [`poll_until_generated`] — the bounded
//!   retry loop callers use while the backend generates a schedule.
//! - [`OAuthRedirect`] — the [`LoginFlow`](lectern_auth::LoginFlow)
//!   that builds the external authorize URL and hands navigation to
//!   the host.
//!
//! # Architecture
//!
//! ```text
//! Auth layer (above)   ← calls fetch_identity through a trait
//!     ↕
//! HTTP layer (this crate)
//!     ↕
//! Backend + OAuth provider (external collaborators)
//! ```
//!
//! The client itself never clears credentials or changes auth state —
//! that is the controller's job. It only reports what the backend said.

mod client;
mod error;
mod oauth;
mod schedule;

pub use client::ApiClient;
pub use error::ApiError;
pub use oauth::{OAuthConfig, OAuthRedirect};
pub use schedule::{PollOptions, ScheduleListQuery, ScheduleWindow, poll_until_generated};
