//! Search results and the aggregation pipeline.
//!
//! One call to [`SearchAggregator::search`] is one query generation: app and
//! content lookups run as separate tasks with their own timeout, while smart
//! action detection and shortcut resolution run inline since they are pure.
//! A failing, slow or panicking source contributes nothing; the aggregate
//! never fails.

use std::cmp::Reverse;
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;

use crate::config::SearchConfig;
use crate::error::{LauncherError, LauncherResult};
use crate::platform::IconRef;
use crate::services::app_index::AppIndex;
use crate::services::content_index::ContentIndex;
use crate::services::shortcuts::ShortcutRepository;
use crate::services::smart_actions;

/// Search results that appear in the overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SearchResult {
    /// An installed application
    #[serde(rename_all = "camelCase")]
    App {
        id: String,
        title: String,
        subtitle: Option<String>,
        icon: IconRef,
        package_name: String,
    },

    /// An indexed document or synthesized smart action
    #[serde(rename_all = "camelCase")]
    Content {
        id: String,
        namespace: String,
        title: String,
        subtitle: Option<String>,
        icon: Option<IconRef>,
        package_name: Option<String>,
        deep_link: Option<String>,
        #[serde(default)]
        ranking_score: i32,
    },

    /// A search shortcut with its URL resolved
    #[serde(rename_all = "camelCase")]
    Shortcut {
        id: String,
        title: String,
        description: String,
        intent_uri: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<i64>,
    },
}

impl SearchResult {
    /// Stable id used for deduplication and list diffing.
    pub fn id(&self) -> &str {
        match self {
            SearchResult::App { id, .. }
            | SearchResult::Content { id, .. }
            | SearchResult::Shortcut { id, .. } => id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            SearchResult::App { title, .. }
            | SearchResult::Content { title, .. }
            | SearchResult::Shortcut { title, .. } => title,
        }
    }

    pub fn subtitle(&self) -> Option<&str> {
        match self {
            SearchResult::App { subtitle, .. } | SearchResult::Content { subtitle, .. } => {
                subtitle.as_deref()
            }
            SearchResult::Shortcut { description, .. } => Some(description),
        }
    }

    /// Merge score. Only content results carry one.
    pub fn ranking_score(&self) -> i32 {
        match self {
            SearchResult::Content { ranking_score, .. } => *ranking_score,
            _ => 0,
        }
    }

    pub fn icon(&self) -> IconRef {
        match self {
            SearchResult::App { icon, .. } => icon.clone(),
            SearchResult::Content { icon, .. } => icon.clone().unwrap_or(IconRef::Default),
            SearchResult::Shortcut { color, .. } => match color {
                Some(color) => IconRef::Badge {
                    color: *color as u32,
                    label: None,
                },
                None => IconRef::Default,
            },
        }
    }
}

/// Tie-break rank inside the leading group; lower sorts first.
fn source_priority(result: &SearchResult) -> u8 {
    match result {
        SearchResult::Shortcut { .. } => 3,
        SearchResult::Content { id, .. } if id.starts_with("smart_action_call_") => 0,
        SearchResult::Content { id, .. } if id.starts_with("smart_action_sms_") => 1,
        SearchResult::Content { id, .. }
            if id.starts_with("smart_action_email_") || id.starts_with("smart_action_url_") =>
        {
            2
        }
        _ => 4,
    }
}

/// Merge per-source results into the final list.
///
/// The leading group (smart actions and a resolved shortcut) is ordered by
/// descending score, ties by source priority; apps and content keep their
/// source order. The first occurrence of an id wins. `limit` caps the list
/// only when set; by default every app and content hit is kept.
pub fn merge(
    mut leading: Vec<SearchResult>,
    apps: Vec<SearchResult>,
    content: Vec<SearchResult>,
    limit: Option<usize>,
) -> Vec<SearchResult> {
    leading.sort_by_key(|r| (Reverse(r.ranking_score()), source_priority(r)));

    let mut seen = HashSet::new();
    leading
        .into_iter()
        .chain(apps)
        .chain(content)
        .filter(|r| seen.insert(r.id().to_string()))
        .take(limit.unwrap_or(usize::MAX))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Apps,
    Content,
}

/// Fans a query out to every source and merges the answers.
pub struct SearchAggregator {
    apps: Arc<AppIndex>,
    content: Arc<ContentIndex>,
    shortcuts: ShortcutRepository,
    source_timeout: Duration,
    max_results: Option<usize>,
}

impl SearchAggregator {
    pub fn new(
        apps: Arc<AppIndex>,
        content: Arc<ContentIndex>,
        shortcuts: ShortcutRepository,
        config: &SearchConfig,
    ) -> Self {
        Self {
            apps,
            content,
            shortcuts,
            source_timeout: config.source_timeout(),
            max_results: config.max_results,
        }
    }

    /// Run one query generation. An empty query yields the default view.
    pub async fn search(&self, query: &str) -> Vec<SearchResult> {
        if query.trim().is_empty() {
            return self.default_view().await;
        }

        let mut tasks = JoinSet::new();

        let apps = Arc::clone(&self.apps);
        let filter = query.to_string();
        tasks.spawn(timed(Source::Apps, self.source_timeout, async move {
            apps.list(&filter).await
        }));

        let content = Arc::clone(&self.content);
        let text = query.to_string();
        tasks.spawn(timed(Source::Content, self.source_timeout, async move {
            Ok::<_, LauncherError>(content.query(&text).await)
        }));

        let mut leading = smart_actions::detect(query);
        leading.extend(self.shortcuts.resolve(query));

        let mut app_results = Vec::new();
        let mut content_results = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((Source::Apps, results)) => app_results = results,
                Ok((Source::Content, results)) => content_results = results,
                Err(e) if e.is_panic() => tracing::warn!(error = %e, "search source panicked"),
                Err(_) => {}
            }
        }

        tracing::debug!(
            query,
            leading = leading.len(),
            apps = app_results.len(),
            content = content_results.len(),
            "search sources settled"
        );

        merge(leading, app_results, content_results, self.max_results)
    }

    /// The unfiltered app list shown for an empty query.
    pub async fn default_view(&self) -> Vec<SearchResult> {
        let (_, mut results) = timed(Source::Apps, self.source_timeout, self.apps.list("")).await;
        if let Some(limit) = self.max_results {
            results.truncate(limit);
        }
        results
    }
}

async fn timed<F>(source: Source, limit: Duration, lookup: F) -> (Source, Vec<SearchResult>)
where
    F: Future<Output = LauncherResult<Vec<SearchResult>>>,
{
    let results = match tokio::time::timeout(limit, lookup).await {
        Ok(Ok(results)) => results,
        Ok(Err(e)) => {
            tracing::warn!(?source, error = %e, "search source failed");
            Vec::new()
        }
        Err(_) => {
            tracing::warn!(
                ?source,
                timeout_ms = limit.as_millis() as u64,
                "search source timed out"
            );
            Vec::new()
        }
    };
    (source, results)
}
