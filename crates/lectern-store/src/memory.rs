//! In-memory store backend.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::broadcast;

use crate::{EVENT_CAPACITY, Store, StoreError, StoreEvent};

/// An in-memory [`Store`]: a `HashMap` behind a mutex plus the event
/// channel.
///
/// Used by tests and by embeddings that don't want persistence. Two
/// controllers sharing one `Arc<MemoryStore>` model two browser tabs
/// sharing localStorage.
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    events: broadcast::Sender<StoreEvent>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            entries: Mutex::new(HashMap::new()),
            events,
        }
    }

    fn emit(&self, key: &str, new_value: Option<String>) {
        // `send` only errors when there are no subscribers; that's the
        // common case outside tests and not a failure.
        let _ = self.events.send(StoreEvent {
            key: key.to_string(),
            new_value,
        });
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().expect("store mutex poisoned");
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        {
            let mut entries =
                self.entries.lock().expect("store mutex poisoned");
            entries.insert(key.to_string(), value.to_string());
        }
        self.emit(key, Some(value.to_string()));
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let removed = {
            let mut entries =
                self.entries.lock().expect("store mutex poisoned");
            entries.remove(key).is_some()
        };
        if removed {
            self.emit(key, None);
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get_returns_value() {
        let store = MemoryStore::new();
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_get_missing_key_returns_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get("nope").unwrap(), None);
    }

    #[test]
    fn test_remove_deletes_entry() {
        let store = MemoryStore::new();
        store.set("k", "v").unwrap();
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn test_set_emits_event_to_subscriber() {
        let store = MemoryStore::new();
        let mut events = store.subscribe();

        store.set("access_token", "abc").unwrap();

        let event = events.try_recv().unwrap();
        assert_eq!(event.key, "access_token");
        assert_eq!(event.new_value.as_deref(), Some("abc"));
    }

    #[test]
    fn test_remove_emits_event_with_none_value() {
        let store = MemoryStore::new();
        store.set("k", "v").unwrap();
        let mut events = store.subscribe();

        store.remove("k").unwrap();

        let event = events.try_recv().unwrap();
        assert_eq!(event.key, "k");
        assert_eq!(event.new_value, None);
    }

    #[test]
    fn test_remove_absent_key_emits_nothing() {
        let store = MemoryStore::new();
        let mut events = store.subscribe();

        store.remove("nope").unwrap();

        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_events_reach_all_subscribers() {
        // Two subscribers stand in for two tabs watching the same
        // storage area.
        let store = MemoryStore::new();
        let mut tab_a = store.subscribe();
        let mut tab_b = store.subscribe();

        store.set("k", "v").unwrap();

        assert_eq!(tab_a.try_recv().unwrap().key, "k");
        assert_eq!(tab_b.try_recv().unwrap().key, "k");
    }
}
