//! On-device content search.
//!
//! [`ContentIndex`] wraps a platform [`ContentStore`] and turns its hits into
//! search results. It never fails: a store that is still opening, or a query
//! that errors, yields no results so the rest of the search goes ahead.
//!
//! [`MemoryContentStore`] is an in-process store with the same prefix-match
//! semantics, used by the CLI and in tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::config::ContentConfig;
use crate::core::search::SearchResult;
use crate::error::{LauncherError, LauncherResult};
use crate::platform::{ContentDocument, ContentHit, ContentStore, IconRef, QuerySpec};
use crate::services::shortcuts::SearchShortcut;

/// Namespace holding one document per search shortcut.
pub const SHORTCUTS_NAMESPACE: &str = "shortcuts";

pub struct ContentIndex {
    store: Arc<dyn ContentStore>,
    spec: QuerySpec,
}

impl ContentIndex {
    pub fn new(store: Arc<dyn ContentStore>, config: &ContentConfig) -> Self {
        Self {
            store,
            spec: QuerySpec {
                page_size: config.page_size,
                snippet_count: config.snippet_count,
                namespaces: Vec::new(),
            },
        }
    }

    pub async fn query(&self, text: &str) -> Vec<SearchResult> {
        if !self.store.is_ready() {
            tracing::debug!("content index not ready, skipping");
            return Vec::new();
        }

        match self.store.query(text, &self.spec).await {
            Ok(hits) => hits
                .into_iter()
                .take(self.spec.page_size)
                .map(to_result)
                .collect(),
            Err(e) => {
                tracing::warn!(error = %e, "content query failed");
                Vec::new()
            }
        }
    }

    /// Replace the shortcuts namespace so shortcuts are found by description.
    pub async fn index_shortcuts(&self, shortcuts: &[SearchShortcut]) -> LauncherResult<()> {
        self.store.remove_namespace(SHORTCUTS_NAMESPACE).await?;

        let documents: Vec<ContentDocument> = shortcuts
            .iter()
            .map(|shortcut| ContentDocument {
                namespace: SHORTCUTS_NAMESPACE.to_string(),
                id: shortcut.id.clone(),
                score: 0,
                name: shortcut.description.clone(),
                description: None,
                intent_uri: Some(shortcut.resolve_url("")),
                package_name: shortcut.package_name.clone(),
                is_action: !shortcut.has_placeholder(),
                color: shortcut.color,
            })
            .collect();

        tracing::debug!(count = documents.len(), "indexing shortcuts");
        self.store.put(documents).await
    }
}

fn to_result(hit: ContentHit) -> SearchResult {
    let doc = hit.document;

    if doc.namespace == SHORTCUTS_NAMESPACE {
        return SearchResult::Shortcut {
            id: format!("shortcut_{}", doc.id),
            title: doc.name.clone(),
            description: doc.name,
            intent_uri: doc.intent_uri.unwrap_or_default(),
            color: doc.color,
        };
    }

    let icon = match (doc.color, &doc.package_name) {
        (Some(color), _) => Some(IconRef::Badge {
            color: color as u32,
            label: None,
        }),
        (None, Some(package_name)) => Some(IconRef::Package {
            package_name: package_name.clone(),
        }),
        (None, None) => None,
    };

    SearchResult::Content {
        id: format!("{}/{}", doc.namespace, doc.id),
        subtitle: doc.description.or_else(|| hit.snippets.first().cloned()),
        namespace: doc.namespace,
        title: doc.name,
        icon,
        package_name: doc.package_name,
        deep_link: doc.intent_uri,
        ranking_score: doc.score,
    }
}

/// Lowercased alphanumeric tokens.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
}

/// In-process content store with prefix search over `name` and `description`.
#[derive(Default)]
pub struct MemoryContentStore {
    ready: AtomicBool,
    documents: RwLock<Vec<ContentDocument>>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the store. Queries and writes fail until this has run.
    pub fn initialize(&self) {
        self.ready.store(true, Ordering::Release);
    }

    fn ensure_ready(&self) -> LauncherResult<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(LauncherError::SourceUnavailable(
                "content store not initialized".to_string(),
            ))
        }
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    async fn put(&self, documents: Vec<ContentDocument>) -> LauncherResult<()> {
        self.ensure_ready()?;
        let mut stored = self.documents.write().unwrap_or_else(|e| e.into_inner());

        for doc in documents {
            match stored
                .iter_mut()
                .find(|d| d.namespace == doc.namespace && d.id == doc.id)
            {
                Some(existing) => *existing = doc,
                None => stored.push(doc),
            }
        }
        Ok(())
    }

    async fn remove_namespace(&self, namespace: &str) -> LauncherResult<()> {
        self.ensure_ready()?;
        self.documents
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|d| d.namespace != namespace);
        Ok(())
    }

    async fn query(&self, text: &str, spec: &QuerySpec) -> LauncherResult<Vec<ContentHit>> {
        self.ensure_ready()?;

        let terms: Vec<String> = tokenize(text).collect();
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let stored = self.documents.read().unwrap_or_else(|e| e.into_inner());
        let mut hits: Vec<ContentHit> = stored
            .iter()
            .filter(|doc| spec.namespaces.is_empty() || spec.namespaces.contains(&doc.namespace))
            .filter_map(|doc| {
                let tokens: Vec<String> = tokenize(&doc.name)
                    .chain(doc.description.iter().flat_map(|d| tokenize(d)))
                    .collect();

                let mut snippets: Vec<String> = Vec::new();
                for term in &terms {
                    let matched: Vec<&String> =
                        tokens.iter().filter(|t| t.starts_with(term.as_str())).collect();
                    if matched.is_empty() {
                        return None;
                    }
                    for token in matched {
                        if !snippets.contains(token) {
                            snippets.push(token.clone());
                        }
                    }
                }
                snippets.truncate(spec.snippet_count);

                Some(ContentHit {
                    document: doc.clone(),
                    snippets,
                })
            })
            .collect();

        hits.sort_by_key(|hit| std::cmp::Reverse(hit.document.score));
        hits.truncate(spec.page_size);
        Ok(hits)
    }
}
