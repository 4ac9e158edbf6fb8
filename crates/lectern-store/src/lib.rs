//! Local durable storage for the Lectern client core.
//!
//! Provides the [`Store`] trait that abstracts over where credential
//! tokens and the cached session snapshot live, plus two backends:
//!
//! - [`MemoryStore`] — plain in-memory map, for tests and ephemeral use
//! - [`FileStore`] — one JSON file on disk, for a desktop embedding
//!
//! # Change notifications
//!
//! Browsers fire a `storage` event in *other* tabs when one tab writes
//! localStorage; the auth controller relies on that to notice external
//! logins and logouts. Here the same mechanism is a broadcast channel:
//! every mutation emits a [`StoreEvent`], and any subscriber (another
//! controller sharing the store handle, a test) observes it. Stores are
//! the only event source — there is no shared mutable memory between
//! "tabs".
//!
//! # Key layout
//!
//! All fixed keys live in [`keys`]. The token keys are read by both the
//! auth controller and the outbound HTTP layer, which attaches them to
//! backend calls; the two must agree, so the constants live here, below
//! both.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use tokio::sync::broadcast;

/// Fixed storage keys shared by the auth controller and the HTTP layer.
pub mod keys {
    /// Serialized [`User`](../lectern_model) snapshot of the current
    /// session.
    pub const SESSION_SNAPSHOT: &str = "lectern.auth.user";

    /// Bearer token keys, in lookup order. Two spellings are honored
    /// because older deployments of the backend issued the generic
    /// `access_token` while newer ones use the product-prefixed key.
    pub const TOKEN_KEYS: [&str; 2] = ["access_token", "lectern_token"];

    /// OAuth state nonce parked across the redirect round trip.
    pub const OAUTH_STATE: &str = "oauth_state";

    /// Returns `true` if `key` holds a credential token.
    pub fn is_token_key(key: &str) -> bool {
        TOKEN_KEYS.contains(&key)
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// A storage mutation, as observed by subscribers.
///
/// Mirrors the browser storage event: the key that changed and its new
/// value, with `None` meaning the entry was removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEvent {
    /// The key that was written or removed.
    pub key: String,
    /// The value after the mutation; `None` for removals.
    pub new_value: Option<String>,
}

/// Capacity of the event channel. Events are tiny and consumers react
/// immediately, so a short buffer is plenty; laggards just miss old
/// events, which matches browser semantics (storage events are not
/// replayed).
const EVENT_CAPACITY: usize = 16;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur in the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("storage i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file held something that is not a JSON object.
    /// Treated as "empty store" by [`FileStore::open`]; surfaced only
    /// when a write cannot re-serialize.
    #[error("storage serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Store trait
// ---------------------------------------------------------------------------

/// A small string-to-string key/value store with change notifications.
///
/// Methods take `&self` so a store can be shared behind an `Arc`
/// between the auth controller and the HTTP client. Implementations
/// guard their map with interior mutability; there is one logical
/// writer per "tab", so contention is not a concern.
pub trait Store: Send + Sync + 'static {
    /// Reads the value under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Writes `value` under `key`, emitting a [`StoreEvent`].
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removes `key` if present, emitting a [`StoreEvent`] with
    /// `new_value: None`. Removing an absent key is a no-op and emits
    /// nothing.
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Subscribes to mutation events from this store. Every subscriber
    /// sees every subsequent mutation, including ones made through
    /// other handles to the same store.
    fn subscribe(&self) -> broadcast::Receiver<StoreEvent>;
}

/// Reads the first present token among [`keys::TOKEN_KEYS`].
///
/// Shared helper because the controller (deciding whether to call the
/// identity endpoint) and the HTTP layer (attaching `Authorization`)
/// must resolve the token identically.
pub fn current_token<S: Store + ?Sized>(store: &S) -> Option<String> {
    for key in keys::TOKEN_KEYS {
        match store.get(key) {
            Ok(Some(token)) if !token.is_empty() => return Some(token),
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(key, error = %e, "token read failed");
            }
        }
    }
    None
}
