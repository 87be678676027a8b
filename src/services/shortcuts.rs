//! Search shortcuts: user-defined alias -> URL template pairs.
//!
//! Typing `yt cats` fires the shortcut aliased `yt`, substituting the
//! URL-encoded remainder for the first `%s` in its template. Typing the bare
//! alias opens the template's home (empty substitution) or, for templates
//! without a placeholder, the link itself.
//!
//! Aliases are compared ASCII case-insensitively and the first shortcut in
//! stored order wins; there is no longest-prefix disambiguation between
//! overlapping aliases.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::search::SearchResult;
use crate::error::LauncherResult;
use crate::platform::IconRef;
use crate::store::{DataStore, Transaction};

/// Store key holding the ordered shortcut list.
pub const SHORTCUTS_KEY: &str = "search_shortcuts";

/// Query placeholder in URL templates.
pub const PLACEHOLDER: &str = "%s";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchShortcut {
    pub id: String,
    pub alias: String,
    pub url_template: String,
    pub description: String,
    /// ARGB
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,
}

/// How a query matched a shortcut alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasMatch<'a> {
    /// The query is exactly the alias
    Bare,
    /// `alias` + one space + term
    WithTerm(&'a str),
}

impl SearchShortcut {
    pub fn new(alias: &str, url_template: &str, description: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            alias: alias.to_string(),
            url_template: url_template.to_string(),
            description: description.to_string(),
            color: None,
            suggestion_url: None,
            package_name: None,
        }
    }

    pub fn has_placeholder(&self) -> bool {
        self.url_template.contains(PLACEHOLDER)
    }

    /// Substitute the URL-encoded term for the first placeholder.
    pub fn resolve_url(&self, term: &str) -> String {
        if self.has_placeholder() {
            self.url_template
                .replacen(PLACEHOLDER, &urlencoding::encode(term), 1)
        } else {
            self.url_template.clone()
        }
    }

    /// Id of the search result this shortcut produces.
    pub fn result_id(&self) -> String {
        format!("shortcut_{}", self.id)
    }

    pub fn icon(&self) -> IconRef {
        match self.color {
            Some(color) => IconRef::Badge {
                color: color as u32,
                label: Some(self.alias.clone()),
            },
            None => IconRef::Default,
        }
    }

    pub fn match_alias<'q>(&self, query: &'q str) -> Option<AliasMatch<'q>> {
        if self.alias.is_empty() {
            return None;
        }

        let head = query.get(..self.alias.len())?;
        if !head.eq_ignore_ascii_case(&self.alias) {
            return None;
        }

        let rest = &query[self.alias.len()..];
        if rest.is_empty() {
            Some(AliasMatch::Bare)
        } else {
            rest.strip_prefix(' ').map(AliasMatch::WithTerm)
        }
    }

    /// Build the result for `query` if this shortcut fires.
    pub fn resolve(&self, query: &str) -> Option<SearchResult> {
        let (title, intent_uri) = match self.match_alias(query)? {
            AliasMatch::WithTerm(term) if !term.is_empty() && self.has_placeholder() => (
                format!("{}: {}", self.description, term),
                self.resolve_url(term),
            ),
            _ => (self.description.clone(), self.resolve_url("")),
        };

        Some(SearchResult::Shortcut {
            id: self.result_id(),
            title,
            description: self.description.clone(),
            intent_uri,
            color: self.color,
        })
    }
}

/// First shortcut in iteration order whose alias matches `query`.
pub fn resolve(query: &str, shortcuts: &[SearchShortcut]) -> Option<SearchResult> {
    shortcuts.iter().find_map(|shortcut| shortcut.resolve(query))
}

fn builtin(
    id: &str,
    alias: &str,
    url_template: &str,
    description: &str,
    color: i64,
    suggestion_url: Option<&str>,
    package_name: Option<&str>,
) -> SearchShortcut {
    SearchShortcut {
        id: id.to_string(),
        alias: alias.to_string(),
        url_template: url_template.to_string(),
        description: description.to_string(),
        color: Some(color),
        suggestion_url: suggestion_url.map(str::to_string),
        package_name: package_name.map(str::to_string),
    }
}

/// The built-in shortcut set shown on first run and after a reset.
pub fn default_shortcuts() -> Vec<SearchShortcut> {
    vec![
        builtin(
            "default_google",
            "g",
            "https://www.google.com/search?q=%s",
            "Google",
            0xFF4285F4,
            Some("https://suggestqueries.google.com/complete/search?client=firefox&q=%s"),
            Some("com.google.android.googlequicksearchbox"),
        ),
        builtin(
            "default_youtube",
            "yt",
            "https://www.youtube.com/results?search_query=%s",
            "YouTube",
            0xFFFF0000,
            Some("https://suggestqueries.google.com/complete/search?client=firefox&ds=yt&q=%s"),
            Some("com.google.android.youtube"),
        ),
        builtin(
            "default_maps",
            "m",
            "https://www.google.com/maps/search/?api=1&query=%s",
            "Maps",
            0xFF34A853,
            None,
            Some("com.google.android.apps.maps"),
        ),
        builtin(
            "default_wikipedia",
            "w",
            "https://en.wikipedia.org/wiki/Special:Search?search=%s",
            "Wikipedia",
            0xFF636466,
            Some("https://en.wikipedia.org/w/api.php?action=opensearch&search=%s"),
            None,
        ),
        builtin(
            "default_duckduckgo",
            "d",
            "https://duckduckgo.com/?q=%s",
            "DuckDuckGo",
            0xFFDE5833,
            Some("https://duckduckgo.com/ac/?type=list&q=%s"),
            None,
        ),
        builtin(
            "default_reddit",
            "r",
            "https://www.reddit.com/search/?q=%s",
            "Reddit",
            0xFFFF4500,
            None,
            Some("com.reddit.frontpage"),
        ),
        builtin(
            "default_play_store",
            "p",
            "https://play.google.com/store/search?q=%s&c=apps",
            "Play Store",
            0xFF01875F,
            None,
            Some("com.android.vending"),
        ),
    ]
}

/// Persisted, ordered shortcut collection.
#[derive(Clone)]
pub struct ShortcutRepository {
    store: Arc<DataStore>,
}

impl ShortcutRepository {
    pub fn new(store: Arc<DataStore>) -> Self {
        Self { store }
    }

    /// Current shortcuts; the built-in set until the user changes anything.
    pub fn items(&self) -> Vec<SearchShortcut> {
        match self.store.get::<Vec<SearchShortcut>>(SHORTCUTS_KEY) {
            Ok(Some(items)) => items,
            Ok(None) => default_shortcuts(),
            Err(e) => {
                tracing::warn!(error = %e, "stored shortcuts unreadable");
                Vec::new()
            }
        }
    }

    pub fn resolve(&self, query: &str) -> Option<SearchResult> {
        resolve(query, &self.items())
    }

    pub fn add(&self, shortcut: SearchShortcut) -> LauncherResult<()> {
        self.modify(|items| items.push(shortcut))
    }

    /// Insert at `index` (clamped to the end), e.g. to undo a delete.
    pub fn insert_at(&self, index: usize, shortcut: SearchShortcut) -> LauncherResult<()> {
        self.modify(|items| {
            let index = index.min(items.len());
            items.insert(index, shortcut);
        })
    }

    /// Replace the shortcut with the same id. Returns false when absent.
    pub fn update(&self, shortcut: SearchShortcut) -> LauncherResult<bool> {
        self.modify(|items| match items.iter_mut().find(|s| s.id == shortcut.id) {
            Some(existing) => {
                *existing = shortcut;
                true
            }
            None => false,
        })
    }

    pub fn update_alias(&self, id: &str, alias: &str) -> LauncherResult<bool> {
        self.modify(|items| match items.iter_mut().find(|s| s.id == id) {
            Some(existing) => {
                existing.alias = alias.to_string();
                true
            }
            None => false,
        })
    }

    /// Remove by id, returning the removed shortcut.
    pub fn remove(&self, id: &str) -> LauncherResult<Option<SearchShortcut>> {
        self.modify(|items| {
            let index = items.iter().position(|s| s.id == id)?;
            Some(items.remove(index))
        })
    }

    pub fn replace_all(&self, shortcuts: Vec<SearchShortcut>) -> LauncherResult<()> {
        self.store.set(SHORTCUTS_KEY, &shortcuts)
    }

    pub fn reset_to_defaults(&self) -> LauncherResult<()> {
        self.replace_all(default_shortcuts())
    }

    fn modify<R>(&self, f: impl FnOnce(&mut Vec<SearchShortcut>) -> R) -> LauncherResult<R> {
        self.store.edit(|tx| {
            let mut items = stored_shortcuts(tx)?;
            let output = f(&mut items);
            tx.set(SHORTCUTS_KEY, &items)?;
            Ok(output)
        })
    }
}

/// Shortcuts as staged in `tx`, falling back to the built-in set.
pub(crate) fn stored_shortcuts(tx: &Transaction) -> LauncherResult<Vec<SearchShortcut>> {
    Ok(tx
        .get::<Vec<SearchShortcut>>(SHORTCUTS_KEY)?
        .unwrap_or_else(default_shortcuts))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shortcut(alias: &str, template: &str) -> SearchShortcut {
        let mut s = SearchShortcut::new(alias, template, alias);
        s.id = format!("id_{}", alias);
        s
    }

    fn intent(result: &SearchResult) -> &str {
        match result {
            SearchResult::Shortcut { intent_uri, .. } => intent_uri,
            other => panic!("expected shortcut, got {:?}", other),
        }
    }

    #[test]
    fn alias_with_term_substitutes_encoded_query() {
        let shortcuts = vec![shortcut("yt", "https://youtube.com/results?q=%s")];
        let result = resolve("yt lo-fi beats & chill", &shortcuts).unwrap();

        assert_eq!(result.id(), "shortcut_id_yt");
        assert_eq!(
            intent(&result),
            "https://youtube.com/results?q=lo-fi%20beats%20%26%20chill"
        );
        assert_eq!(result.title(), "yt: lo-fi beats & chill");
    }

    #[test]
    fn only_first_placeholder_is_replaced() {
        let s = shortcut("x", "https://x.test/%s?again=%s");
        assert_eq!(s.resolve_url("a b"), "https://x.test/a%20b?again=%s");
    }

    #[test]
    fn bare_alias_opens_search_home() {
        let shortcuts = vec![shortcut("w", "https://wiki.test/search?q=%s")];
        let result = resolve("w", &shortcuts).unwrap();
        assert_eq!(intent(&result), "https://wiki.test/search?q=");
        assert_eq!(result.title(), "w");
    }

    #[test]
    fn template_without_placeholder_is_a_direct_link() {
        let shortcuts = vec![shortcut("mail", "https://mail.test/inbox")];
        assert_eq!(intent(&resolve("mail", &shortcuts).unwrap()), "https://mail.test/inbox");
        assert_eq!(
            intent(&resolve("mail anything", &shortcuts).unwrap()),
            "https://mail.test/inbox"
        );
    }

    #[test]
    fn alias_needs_a_word_boundary() {
        let shortcuts = vec![shortcut("g", "https://g.test/?q=%s")];
        assert!(resolve("gmail", &shortcuts).is_none());
        assert!(resolve("", &shortcuts).is_none());
        assert!(resolve("G cats", &shortcuts).is_some());
    }

    #[test]
    fn first_registered_alias_wins() {
        let shortcuts = vec![
            shortcut("g", "https://first.test/?q=%s"),
            shortcut("g", "https://second.test/?q=%s"),
        ];
        let result = resolve("g rust", &shortcuts).unwrap();
        assert_eq!(intent(&result), "https://first.test/?q=rust");
    }

    #[test]
    fn shorter_alias_listed_first_shadows_longer() {
        let shortcuts = vec![
            shortcut("g", "https://g.test/?q=%s"),
            shortcut("g h", "https://gh.test/?q=%s"),
        ];
        let result = resolve("g h repo", &shortcuts).unwrap();
        assert_eq!(intent(&result), "https://g.test/?q=h%20repo");
    }

    #[test]
    fn empty_alias_never_matches() {
        let shortcuts = vec![shortcut("", "https://x.test/%s")];
        assert!(resolve("anything", &shortcuts).is_none());
    }

    #[test]
    fn missing_optional_fields_render_default_icon() {
        let json = r#"{"id":"1","alias":"d","urlTemplate":"https://d.test/?q=%s","description":"D"}"#;
        let s: SearchShortcut = serde_json::from_str(json).unwrap();
        assert_eq!(s.icon(), IconRef::Default);
        assert!(s.resolve("d x").is_some());

        let serialized = serde_json::to_string(&s).unwrap();
        assert!(!serialized.contains("color"));
        assert!(!serialized.contains("suggestionUrl"));
    }

    #[test]
    fn colored_shortcut_gets_badge() {
        let mut s = shortcut("yt", "https://y.test/%s");
        s.color = Some(0xFFFF0000);
        assert_eq!(
            s.icon(),
            IconRef::Badge {
                color: 0xFFFF0000,
                label: Some("yt".into())
            }
        );
    }

    #[test]
    fn repository_starts_with_defaults() {
        let repo = ShortcutRepository::new(Arc::new(DataStore::in_memory()));
        let items = repo.items();
        assert_eq!(items, default_shortcuts());
        assert!(repo.resolve("g rust").is_some());
    }

    #[test]
    fn repository_crud() {
        let repo = ShortcutRepository::new(Arc::new(DataStore::in_memory()));
        repo.replace_all(vec![shortcut("a", "https://a.test/%s")]).unwrap();

        repo.add(shortcut("b", "https://b.test/%s")).unwrap();
        repo.insert_at(0, shortcut("c", "https://c.test/%s")).unwrap();
        assert_eq!(
            repo.items().iter().map(|s| s.alias.as_str()).collect::<Vec<_>>(),
            vec!["c", "a", "b"]
        );

        assert!(repo.update_alias("id_a", "aa").unwrap());
        assert!(!repo.update_alias("nope", "zz").unwrap());

        let mut edited = shortcut("b", "https://b2.test/%s");
        edited.description = "Bee".into();
        assert!(repo.update(edited).unwrap());

        let removed = repo.remove("id_c").unwrap().unwrap();
        assert_eq!(removed.alias, "c");
        assert!(repo.remove("id_c").unwrap().is_none());

        let items = repo.items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].alias, "aa");
        assert_eq!(items[1].description, "Bee");

        repo.reset_to_defaults().unwrap();
        assert_eq!(repo.items(), default_shortcuts());
    }

    #[test]
    fn insert_at_clamps_index() {
        let repo = ShortcutRepository::new(Arc::new(DataStore::in_memory()));
        repo.replace_all(Vec::new()).unwrap();
        repo.insert_at(10, shortcut("a", "https://a.test/%s")).unwrap();
        assert_eq!(repo.items().len(), 1);
    }
}
