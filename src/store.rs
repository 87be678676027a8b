//! Persisted settings store.
//!
//! A single JSON document of key/value pairs shared by every user-owned
//! collection (shortcuts, snippets, favorites, widgets, background). Values are
//! cached in memory; every write replaces the whole document on disk by writing
//! a sibling temp file and renaming it over the original, so a crash mid-write
//! leaves the previous consistent document rather than a mix.
//!
//! There is one writer at a time. Readers never block on disk I/O and observe a
//! write once it has been persisted. Observers can `subscribe()` to a revision
//! counter that is bumped after each committed write.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, RwLock};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::watch;

use crate::error::{LauncherError, LauncherResult};

pub struct DataStore {
    /// Backing file; `None` for in-memory stores.
    path: Option<PathBuf>,
    /// Last committed document.
    cache: RwLock<HashMap<String, Value>>,
    /// Serializes writers.
    writer: Mutex<()>,
    revision: watch::Sender<u64>,
}

/// Staged key writes applied by [`DataStore::edit`].
pub struct Transaction {
    staged: HashMap<String, Value>,
    changed: bool,
}

impl DataStore {
    /// Open the store backed by `path`, loading it if it exists.
    pub fn open(path: impl Into<PathBuf>) -> LauncherResult<Self> {
        let path = path.into();

        let cache = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            if contents.trim().is_empty() {
                HashMap::new()
            } else {
                serde_json::from_str(&contents)?
            }
        } else {
            HashMap::new()
        };

        tracing::debug!(path = %path.display(), keys = cache.len(), "opened data store");
        Ok(Self::with_cache(Some(path), cache))
    }

    /// Create a store that never touches disk.
    pub fn in_memory() -> Self {
        Self::with_cache(None, HashMap::new())
    }

    fn with_cache(path: Option<PathBuf>, cache: HashMap<String, Value>) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            path,
            cache: RwLock::new(cache),
            writer: Mutex::new(()),
            revision,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Read a typed value.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> LauncherResult<Option<T>> {
        let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
        decode(key, cache.get(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
        cache.contains_key(key)
    }

    /// Write a typed value, replacing the previous one.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> LauncherResult<()> {
        self.edit(|tx| tx.set(key, value))
    }

    /// Remove a key.
    pub fn remove(&self, key: &str) -> LauncherResult<()> {
        self.edit(|tx| {
            tx.remove(key);
            Ok(())
        })
    }

    /// Apply several writes as one commit.
    ///
    /// `f` works on a copy of the document. If it returns an error, or the
    /// document cannot be persisted, nothing is changed.
    pub fn edit<R>(
        &self,
        f: impl FnOnce(&mut Transaction) -> LauncherResult<R>,
    ) -> LauncherResult<R> {
        let _writer = self.lock_writer();

        let mut tx = Transaction {
            staged: self
                .cache
                .read()
                .unwrap_or_else(|e| e.into_inner())
                .clone(),
            changed: false,
        };

        let output = f(&mut tx)?;
        if !tx.changed {
            return Ok(output);
        }

        if let Some(path) = &self.path {
            persist(path, &tx.staged)?;
        }

        *self.cache.write().unwrap_or_else(|e| e.into_inner()) = tx.staged;
        self.revision.send_modify(|revision| *revision += 1);
        Ok(output)
    }

    /// Watch the revision counter; it changes after every committed write.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    fn lock_writer(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Transaction {
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> LauncherResult<Option<T>> {
        decode(key, self.staged.get(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.staged.contains_key(key)
    }

    pub fn set<T: Serialize>(&mut self, key: &str, value: &T) -> LauncherResult<()> {
        let value = serde_json::to_value(value)?;
        self.staged.insert(key.to_string(), value);
        self.changed = true;
        Ok(())
    }

    pub fn remove(&mut self, key: &str) {
        if self.staged.remove(key).is_some() {
            self.changed = true;
        }
    }
}

fn decode<T: DeserializeOwned>(key: &str, value: Option<&Value>) -> LauncherResult<Option<T>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(value) => T::deserialize(value)
            .map(Some)
            .map_err(|e| LauncherError::Store(format!("Invalid value for '{}': {}", key, e))),
    }
}

fn persist(path: &Path, document: &HashMap<String, Value>) -> LauncherResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            LauncherError::Store(format!(
                "Failed to create store directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    let contents = serde_json::to_string_pretty(document)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, contents)
        .map_err(|e| LauncherError::Store(format!("Failed to write {}: {}", tmp.display(), e)))?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        LauncherError::Store(format!("Failed to replace {}: {}", path.display(), e))
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn set_and_get_typed_values() {
        let store = DataStore::in_memory();
        store.set("names", &vec!["a", "b"]).unwrap();

        let names: Vec<String> = store.get("names").unwrap().unwrap();
        assert_eq!(names, vec!["a", "b"]);
        assert!(store.get::<Vec<String>>("missing").unwrap().is_none());
    }

    #[test]
    fn wrong_type_is_a_store_error() {
        let store = DataStore::in_memory();
        store.set("count", &3).unwrap();

        let err = store.get::<Vec<String>>("count").unwrap_err();
        assert!(matches!(err, LauncherError::Store(_)));
    }

    #[test]
    fn persists_across_reopen() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data").join("store.json");

        {
            let store = DataStore::open(&path).unwrap();
            store.set("favorites", &vec!["com.example.mail"]).unwrap();
        }

        let store = DataStore::open(&path).unwrap();
        let favorites: Vec<String> = store.get("favorites").unwrap().unwrap();
        assert_eq!(favorites, vec!["com.example.mail"]);
        assert!(!temp.path().join("data").join("store.json.tmp").exists());
    }

    #[test]
    fn failed_edit_changes_nothing() {
        let store = DataStore::in_memory();
        store.set("a", &1).unwrap();
        let before = store.revision();

        let result: LauncherResult<()> = store.edit(|tx| {
            tx.set("a", &2)?;
            tx.set("b", &3)?;
            Err(LauncherError::Store("abort".into()))
        });

        assert!(result.is_err());
        assert_eq!(store.get::<i32>("a").unwrap(), Some(1));
        assert!(!store.contains("b"));
        assert_eq!(store.revision(), before);
    }

    #[test]
    fn edit_commits_all_keys_at_once() {
        let store = DataStore::in_memory();
        let mut rx = store.subscribe();

        store
            .edit(|tx| {
                tx.set("a", &1)?;
                tx.set("b", &2)?;
                Ok(())
            })
            .unwrap();

        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), 1);
        assert_eq!(store.get::<i32>("b").unwrap(), Some(2));
    }

    #[test]
    fn remove_missing_key_does_not_bump_revision() {
        let store = DataStore::in_memory();
        store.remove("nothing").unwrap();
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn corrupt_file_is_reported() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("store.json");
        fs::write(&path, "{not json").unwrap();

        assert!(matches!(DataStore::open(&path), Err(LauncherError::Json(_))));
    }
}
