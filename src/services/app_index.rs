//! Installed application index.
//!
//! Apps come from the platform registry on every lookup. Preinstalled system
//! apps are hidden unless the user has updated them. Matches are ordered by
//! most recent use over a trailing window when usage access is available.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::core::search::SearchResult;
use crate::error::{LauncherError, LauncherResult};
use crate::platform::{AppRegistry, IconRef, InstalledApp, UsageStats};

pub struct AppIndex {
    registry: Arc<dyn AppRegistry>,
    usage: Option<Arc<dyn UsageStats>>,
    usage_window: Duration,
}

impl AppIndex {
    pub fn new(
        registry: Arc<dyn AppRegistry>,
        usage: Option<Arc<dyn UsageStats>>,
        usage_window: Duration,
    ) -> Self {
        Self {
            registry,
            usage,
            usage_window,
        }
    }

    /// Whether an app belongs in launcher results.
    pub fn is_visible(app: &InstalledApp) -> bool {
        !app.is_system || app.is_updated_system
    }

    /// Visible apps whose label contains `filter` (case-insensitive), most
    /// recently used first.
    pub async fn list(&self, filter: &str) -> LauncherResult<Vec<SearchResult>> {
        let filter = filter.to_lowercase();

        let mut apps: Vec<InstalledApp> = self
            .registry
            .launchable_apps()
            .await?
            .into_iter()
            .filter(Self::is_visible)
            .filter(|app| filter.is_empty() || app.label.to_lowercase().contains(&filter))
            .collect();

        let recency = self.recency().await;
        if !recency.is_empty() {
            apps.sort_by_key(|app| Reverse(recency.get(&app.package_name).copied()));
        }

        Ok(apps.into_iter().map(to_result).collect())
    }

    /// Last-used timestamps by package; empty when unavailable.
    async fn recency(&self) -> HashMap<String, u64> {
        let Some(usage) = &self.usage else {
            return HashMap::new();
        };

        match usage.last_used(self.usage_window).await {
            Ok(recency) => recency,
            Err(LauncherError::PermissionDenied(reason)) => {
                tracing::debug!(%reason, "usage access not granted, keeping registry order");
                HashMap::new()
            }
            Err(e) => {
                tracing::warn!(error = %e, "usage stats lookup failed");
                HashMap::new()
            }
        }
    }
}

fn to_result(app: InstalledApp) -> SearchResult {
    let icon = app.icon.unwrap_or_else(|| IconRef::Package {
        package_name: app.package_name.clone(),
    });

    SearchResult::App {
        id: app.package_name.clone(),
        title: app.label,
        subtitle: None,
        icon,
        package_name: app.package_name,
    }
}
