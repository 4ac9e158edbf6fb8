//! Session and auth management for the Lectern client core.
//!
//! This crate is the single source of truth for "who is logged in". It
//! reconciles the possible credential sources — a development-bypass
//! synthetic identity, a stored bearer token, or an opaque backend
//! session cookie — and exposes a reactive snapshot the UI subscribes
//! to:
//!
//! 1. **Strategy selection** ([`AuthMode`]) — exactly one credential
//!    source is authoritative, chosen once at startup.
//! 2. **State machine** ([`AuthPhase`], [`AuthController`]) — resolves
//!    the current identity and always settles into a definite state.
//! 3. **Reactive surface** ([`AuthSnapshot`] over a watch channel) —
//!    consumers read snapshots, never the controller's internals.
//!
//! # How it fits in the stack
//!
//! ```text
//! UI layer (above)        ← renders role-gated views from snapshots
//!     ↕
//! Auth layer (this crate) ← owns the session, persists snapshots
//!     ↕
//! Store + HTTP (below)    ← tokens, cached snapshot, identity endpoint
//! ```
//!
//! The HTTP side is reached only through the [`IdentityProvider`] and
//! [`LoginFlow`] traits, so this crate never depends on a concrete
//! client and tests run without a backend.

mod controller;
mod error;
mod phase;
mod provider;
mod session;

pub use controller::AuthController;
pub use error::AuthError;
pub use phase::{AuthMode, AuthPhase};
pub use provider::{IdentityProvider, LoginFlow, NoLoginFlow};
pub use session::{AuthSnapshot, dev_user};
