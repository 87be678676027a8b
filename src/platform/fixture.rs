//! Fixed app registries for the CLI and local testing.

use std::fs;
use std::path::PathBuf;

use async_trait::async_trait;

use super::{AppRegistry, InstalledApp};
use crate::error::{LauncherError, LauncherResult};

/// Reads launchable apps from a JSON array of [`InstalledApp`].
pub struct JsonAppRegistry {
    path: PathBuf,
}

impl JsonAppRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl AppRegistry for JsonAppRegistry {
    async fn launchable_apps(&self) -> LauncherResult<Vec<InstalledApp>> {
        let path = self.path.clone();
        let contents = tokio::task::spawn_blocking(move || fs::read_to_string(path))
            .await
            .map_err(|e| LauncherError::Platform(format!("App registry task failed: {}", e)))??;

        Ok(serde_json::from_str(&contents)?)
    }
}

/// Serves a fixed list of apps.
#[derive(Default)]
pub struct StaticAppRegistry {
    apps: Vec<InstalledApp>,
}

impl StaticAppRegistry {
    pub fn new(apps: Vec<InstalledApp>) -> Self {
        Self { apps }
    }
}

#[async_trait]
impl AppRegistry for StaticAppRegistry {
    async fn launchable_apps(&self) -> LauncherResult<Vec<InstalledApp>> {
        Ok(self.apps.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_apps_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("apps.json");
        fs::write(
            &path,
            r#"[{"packageName":"org.mail","label":"Mail"},
                {"packageName":"android.settings","label":"Settings","isSystem":true}]"#,
        )
        .unwrap();

        let apps = JsonAppRegistry::new(&path).launchable_apps().await.unwrap();
        assert_eq!(apps.len(), 2);
        assert!(apps[1].is_system);
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let registry = JsonAppRegistry::new("/definitely/not/here.json");
        assert!(matches!(
            registry.launchable_apps().await,
            Err(LauncherError::Io(_))
        ));
    }
}
