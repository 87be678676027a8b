//! Text snippets: short aliases that expand to stored text.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::LauncherResult;
use crate::store::{DataStore, Transaction};

pub const SNIPPETS_KEY: &str = "snippets";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetItem {
    pub alias: String,
    pub content: String,
}

impl SnippetItem {
    pub fn new(alias: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            content: content.into(),
        }
    }
}

/// Insert `item`, replacing in place any snippet with the same alias.
pub(crate) fn upsert(items: &mut Vec<SnippetItem>, item: SnippetItem) {
    match items.iter_mut().find(|s| s.alias == item.alias) {
        Some(existing) => *existing = item,
        None => items.push(item),
    }
}

pub(crate) fn stored_snippets(tx: &Transaction) -> LauncherResult<Vec<SnippetItem>> {
    Ok(tx.get(SNIPPETS_KEY)?.unwrap_or_default())
}

#[derive(Clone)]
pub struct SnippetRepository {
    store: Arc<DataStore>,
}

impl SnippetRepository {
    pub fn new(store: Arc<DataStore>) -> Self {
        Self { store }
    }

    pub fn items(&self) -> Vec<SnippetItem> {
        self.store
            .get::<Vec<SnippetItem>>(SNIPPETS_KEY)
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "stored snippets unreadable");
                None
            })
            .unwrap_or_default()
    }

    pub fn find(&self, alias: &str) -> Option<SnippetItem> {
        self.items().into_iter().find(|s| s.alias == alias)
    }

    pub fn add_item(&self, alias: &str, content: &str) -> LauncherResult<()> {
        self.modify(|items| upsert(items, SnippetItem::new(alias, content)))
    }

    /// Rewrite the snippet at `old_alias`. Returns false when absent.
    pub fn update_item(&self, old_alias: &str, alias: &str, content: &str) -> LauncherResult<bool> {
        self.modify(|items| {
            let Some(index) = items.iter().position(|s| s.alias == old_alias) else {
                return false;
            };
            items[index] = SnippetItem::new(alias, content);
            // A rename onto another alias keeps only the edited snippet.
            let mut position = 0;
            items.retain(|s| {
                let keep = position == index || s.alias != alias;
                position += 1;
                keep
            });
            true
        })
    }

    pub fn remove_item(&self, alias: &str) -> LauncherResult<bool> {
        self.modify(|items| {
            let before = items.len();
            items.retain(|s| s.alias != alias);
            items.len() != before
        })
    }

    fn modify<R>(&self, f: impl FnOnce(&mut Vec<SnippetItem>) -> R) -> LauncherResult<R> {
        self.store.edit(|tx| {
            let mut items = stored_snippets(tx)?;
            let output = f(&mut items);
            tx.set(SNIPPETS_KEY, &items)?;
            Ok(output)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> SnippetRepository {
        SnippetRepository::new(Arc::new(DataStore::in_memory()))
    }

    #[test]
    fn add_replaces_existing_alias_in_place() {
        let repo = repo();
        repo.add_item("addr", "1 Main St").unwrap();
        repo.add_item("sig", "Cheers").unwrap();
        repo.add_item("addr", "2 Side St").unwrap();

        assert_eq!(
            repo.items(),
            vec![SnippetItem::new("addr", "2 Side St"), SnippetItem::new("sig", "Cheers")]
        );
    }

    #[test]
    fn update_renames_and_drops_collisions() {
        let repo = repo();
        repo.add_item("a", "one").unwrap();
        repo.add_item("b", "two").unwrap();

        assert!(repo.update_item("a", "b", "merged").unwrap());
        assert_eq!(repo.items(), vec![SnippetItem::new("b", "merged")]);

        assert!(!repo.update_item("missing", "x", "y").unwrap());
    }

    #[test]
    fn remove_and_find() {
        let repo = repo();
        repo.add_item("mail", "me@example.org").unwrap();

        assert_eq!(repo.find("mail").unwrap().content, "me@example.org");
        assert!(repo.remove_item("mail").unwrap());
        assert!(!repo.remove_item("mail").unwrap());
        assert!(repo.find("mail").is_none());
    }
}
