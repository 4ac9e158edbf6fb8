//! File-backed store backend.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tokio::sync::broadcast;

use crate::{EVENT_CAPACITY, Store, StoreError, StoreEvent};

/// A [`Store`] persisted as one JSON object in a single file.
///
/// The whole map is kept in memory and rewritten on every mutation.
/// That is fine at this scale — the store holds a handful of short
/// strings (tokens and one session snapshot), and rewriting the file
/// keeps the on-disk format trivially inspectable.
///
/// Writes go through a temp file in the same directory followed by a
/// rename, so a crash mid-write leaves the previous contents intact
/// rather than a truncated file.
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
    events: broadcast::Sender<StoreEvent>,
}

impl FileStore {
    /// Opens the store at `path`, loading existing contents.
    ///
    /// A missing file means an empty store. A file that fails to parse
    /// also means an empty store — a corrupt cache must degrade to
    /// "nothing cached", never block startup. The corrupt contents are
    /// overwritten on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(map) => map,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "store file is corrupt, starting empty"
                    );
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                HashMap::new()
            }
            Err(e) => return Err(e.into()),
        };

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self {
            path,
            entries: Mutex::new(entries),
            events,
        })
    }

    /// The file this store persists to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(
        &self,
        entries: &HashMap<String, String>,
    ) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn emit(&self, key: &str, new_value: Option<String>) {
        let _ = self.events.send(StoreEvent {
            key: key.to_string(),
            new_value,
        });
    }
}

impl Store for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().expect("store mutex poisoned");
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        {
            let mut entries =
                self.entries.lock().expect("store mutex poisoned");
            entries.insert(key.to_string(), value.to_string());
            self.persist(&entries)?;
        }
        self.emit(key, Some(value.to_string()));
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let removed = {
            let mut entries =
                self.entries.lock().expect("store mutex poisoned");
            let removed = entries.remove(key).is_some();
            if removed {
                self.persist(&entries)?;
            }
            removed
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
