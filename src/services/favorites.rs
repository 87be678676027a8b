//! Favorite ids (app package names or shortcut ids), in user order.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::LauncherResult;
use crate::store::DataStore;

pub const FAVORITES_KEY: &str = "favorites";

/// Drop repeated ids, keeping the first occurrence.
pub(crate) fn dedup(ids: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

#[derive(Clone)]
pub struct FavoritesRepository {
    store: Arc<DataStore>,
}

impl FavoritesRepository {
    pub fn new(store: Arc<DataStore>) -> Self {
        Self { store }
    }

    pub fn ids(&self) -> Vec<String> {
        self.store
            .get::<Vec<String>>(FAVORITES_KEY)
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "stored favorites unreadable");
                None
            })
            .unwrap_or_default()
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.ids().iter().any(|f| f == id)
    }

    /// Append `id` unless already present. Returns whether it was added.
    pub fn add(&self, id: &str) -> LauncherResult<bool> {
        self.modify(|ids| {
            if ids.iter().any(|f| f == id) {
                return false;
            }
            ids.push(id.to_string());
            true
        })
    }

    pub fn remove(&self, id: &str) -> LauncherResult<bool> {
        self.modify(|ids| {
            let before = ids.len();
            ids.retain(|f| f != id);
            ids.len() != before
        })
    }

    /// Flip membership. Returns true when `id` is now a favorite.
    pub fn toggle(&self, id: &str) -> LauncherResult<bool> {
        self.modify(|ids| match ids.iter().position(|f| f == id) {
            Some(index) => {
                ids.remove(index);
                false
            }
            None => {
                ids.push(id.to_string());
                true
            }
        })
    }

    pub fn replace_all(&self, ids: Vec<String>) -> LauncherResult<()> {
        self.store.set(FAVORITES_KEY, &dedup(ids))
    }

    fn modify<R>(&self, f: impl FnOnce(&mut Vec<String>) -> R) -> LauncherResult<R> {
        self.store.edit(|tx| {
            let mut ids: Vec<String> = tx.get(FAVORITES_KEY)?.unwrap_or_default();
            let output = f(&mut ids);
            tx.set(FAVORITES_KEY, &ids)?;
            Ok(output)
        })
    }
}
