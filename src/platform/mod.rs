//! Platform collaborator interfaces.
//!
//! The launcher core never talks to the OS directly. App enumeration, usage
//! statistics, the on-device content index, widget hosting and status-bar panel
//! control are all provided by the embedding frontend through these traits.

pub mod fixture;

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LauncherResult;
use crate::executor::ExecutionAction;

/// A launchable application reported by the platform app registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledApp {
    /// Package identifier, unique per app
    pub package_name: String,
    /// Display label
    pub label: String,
    #[serde(default)]
    pub icon: Option<IconRef>,
    /// Preinstalled with the system image
    #[serde(default)]
    pub is_system: bool,
    /// System app that has received a user-installed update
    #[serde(default)]
    pub is_updated_system: bool,
}

/// Icons are never loaded by the core; results carry a reference the frontend resolves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum IconRef {
    /// The launcher icon of an installed package
    Package { package_name: String },
    /// A built-in system drawable
    System { icon: SystemIcon },
    /// A rounded colored square, optionally labelled
    Badge { color: u32, label: Option<String> },
    /// Generic search glyph
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SystemIcon {
    Call,
    Message,
    Email,
    Browser,
}

/// Enumerates launchable applications.
#[async_trait]
pub trait AppRegistry: Send + Sync {
    async fn launchable_apps(&self) -> LauncherResult<Vec<InstalledApp>>;
}

/// Per-package usage recency.
#[async_trait]
pub trait UsageStats: Send + Sync {
    /// Last-used timestamps (epoch millis) by package over the trailing `window`.
    ///
    /// Returns `LauncherError::PermissionDenied` when usage access is not granted.
    async fn last_used(&self, window: Duration) -> LauncherResult<HashMap<String, u64>>;
}

/// Paging parameters for content queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    pub page_size: usize,
    pub snippet_count: usize,
    /// Restrict to these namespaces; empty means all
    pub namespaces: Vec<String>,
}

/// A document stored in the content index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDocument {
    pub namespace: String,
    pub id: String,
    pub score: i32,
    /// Indexed for prefix search
    pub name: String,
    /// Indexed for prefix search
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub intent_uri: Option<String>,
    #[serde(default)]
    pub package_name: Option<String>,
    /// Direct action rather than a search template
    #[serde(default)]
    pub is_action: bool,
    /// ARGB
    #[serde(default)]
    pub color: Option<i64>,
}

/// One query hit with the matched snippets.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentHit {
    pub document: ContentDocument,
    pub snippets: Vec<String>,
}

/// Local structured-document store supporting prefix string search.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// False until the underlying session has been opened.
    fn is_ready(&self) -> bool;

    async fn put(&self, documents: Vec<ContentDocument>) -> LauncherResult<()>;

    async fn remove_namespace(&self, namespace: &str) -> LauncherResult<()>;

    async fn query(&self, text: &str, spec: &QuerySpec) -> LauncherResult<Vec<ContentHit>>;
}

/// Renders and configures home-screen widgets by platform-assigned id.
pub trait WidgetHost: Send + Sync {
    fn render(&self, widget_id: i32) -> LauncherResult<()>;
    fn configure(&self, widget_id: i32) -> LauncherResult<()>;
    fn release(&self, widget_id: i32) -> LauncherResult<()>;
}

/// Status-bar panel expansion. Not every platform exposes this.
pub trait PanelController: Send + Sync {
    fn expand_notifications(&self) -> LauncherResult<()>;
    fn expand_quick_settings(&self) -> LauncherResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Notifications,
    QuickSettings,
}

/// Expand a status-bar panel, or return the action to run instead.
///
/// Returns `None` when the panel was expanded. When the capability is missing
/// or the call fails, the caller should run the returned fallback action.
pub fn expand_panel(
    controller: Option<&dyn PanelController>,
    panel: Panel,
) -> Option<ExecutionAction> {
    let Some(controller) = controller else {
        return Some(ExecutionAction::OpenSystemSettings);
    };

    let result = match panel {
        Panel::Notifications => controller.expand_notifications(),
        Panel::QuickSettings => controller.expand_quick_settings(),
    };

    match result {
        Ok(()) => None,
        Err(e) => {
            tracing::warn!(?panel, error = %e, "panel expansion unavailable, using fallback");
            Some(ExecutionAction::OpenSystemSettings)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LauncherError;

    struct Panels {
        works: bool,
    }

    impl PanelController for Panels {
        fn expand_notifications(&self) -> LauncherResult<()> {
            if self.works {
                Ok(())
            } else {
                Err(LauncherError::Platform("statusbar service hidden".into()))
            }
        }

        fn expand_quick_settings(&self) -> LauncherResult<()> {
            self.expand_notifications()
        }
    }

    #[test]
    fn panel_expands_when_capability_works() {
        let panels = Panels { works: true };
        assert_eq!(expand_panel(Some(&panels), Panel::Notifications), None);
    }

    #[test]
    fn panel_falls_back_when_missing_or_failing() {
        assert_eq!(
            expand_panel(None, Panel::QuickSettings),
            Some(ExecutionAction::OpenSystemSettings)
        );

        let panels = Panels { works: false };
        assert_eq!(
            expand_panel(Some(&panels), Panel::Notifications),
            Some(ExecutionAction::OpenSystemSettings)
        );
    }

    #[test]
    fn installed_app_flags_default_to_false() {
        let app: InstalledApp =
            serde_json::from_str(r#"{"packageName":"org.example","label":"Example"}"#).unwrap();
        assert!(!app.is_system);
        assert!(!app.is_updated_system);
        assert!(app.icon.is_none());
    }
}
