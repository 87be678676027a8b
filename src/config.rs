use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{LauncherError, LauncherResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub search: SearchConfig,
    pub content: ContentConfig,
    pub backup: BackupConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Delay before a non-empty query is dispatched to the sources
    pub debounce_ms: u64,
    /// Per-source budget; a source that overruns contributes nothing
    pub source_timeout_ms: u64,
    /// Optional cap on merged results; unset keeps every hit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<usize>,
    /// Trailing window for usage-based app ordering
    pub usage_window_days: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    pub page_size: usize,
    pub snippet_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    pub max_image_bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            source_timeout_ms: 2000,
            max_results: None,
            usage_window_days: 7,
        }
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            snippet_count: 10,
        }
    }
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            max_image_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: dirs::data_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("searchlauncher"),
        }
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn source_timeout(&self) -> Duration {
        Duration::from_millis(self.source_timeout_ms)
    }

    pub fn usage_window(&self) -> Duration {
        Duration::from_secs(self.usage_window_days * 86_400)
    }
}

impl StorageConfig {
    /// JSON document backing the settings store
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join("datastore.json")
    }

    /// Directory restored background images are written to
    pub fn media_dir(&self) -> PathBuf {
        self.data_dir.join("media")
    }
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .map(|h| h.join(".config"))
                    .unwrap_or_else(|| PathBuf::from("/tmp"))
            })
            .join("searchlauncher")
            .join("config.toml")
    }

    /// Load config from the default location, or return defaults if not found
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load config from `path`; unreadable or unparsable files fall back to defaults
    pub fn load_from(path: &Path) -> Self {
        let mut config = if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => config,
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "failed to parse config");
                        Self::default()
                    }
                },
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to read config");
                    Self::default()
                }
            }
        } else {
            Self::default()
        };

        config.validate();
        config
    }

    /// Clamp values to acceptable ranges
    fn validate(&mut self) {
        self.search.debounce_ms = self.search.debounce_ms.min(2_000);
        self.search.source_timeout_ms = self.search.source_timeout_ms.clamp(50, 30_000);
        self.search.max_results = self.search.max_results.map(|n| n.max(1));
        self.search.usage_window_days = self.search.usage_window_days.clamp(1, 90);

        self.content.page_size = self.content.page_size.clamp(1, 100);
        self.content.snippet_count = self.content.snippet_count.clamp(1, 50);

        self.backup.max_image_bytes = self.backup.max_image_bytes.clamp(1, 64 * 1024 * 1024);
    }

    /// Save config to `path`
    pub fn save_to(&self, path: &Path) -> LauncherResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| LauncherError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content)?;
        Ok(())
    }

    /// Save config to the default location
    pub fn save(&self) -> LauncherResult<()> {
        self.save_to(&Self::config_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_interactive_budget() {
        let config = Config::default();
        assert_eq!(config.search.debounce(), Duration::from_millis(300));
        assert_eq!(config.search.usage_window(), Duration::from_secs(7 * 86_400));
        assert_eq!(config.content.page_size, 20);
        assert_eq!(config.content.snippet_count, 10);
        assert_eq!(config.backup.max_image_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[search]\ndebounce_ms = 150\n").unwrap();

        let config = Config::load_from(&path);
        assert_eq!(config.search.debounce_ms, 150);
        assert_eq!(config.search.max_results, None);
        assert_eq!(config.content.page_size, 20);
    }

    #[test]
    fn invalid_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "search = [[[").unwrap();

        let config = Config::load_from(&path);
        assert_eq!(config.search.debounce_ms, 300);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[content]\npage_size = 0\nsnippet_count = 900\n").unwrap();

        let config = Config::load_from(&path);
        assert_eq!(config.content.page_size, 1);
        assert_eq!(config.content.snippet_count, 50);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.search.max_results = Some(12);
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path);
        assert_eq!(loaded.search.max_results, Some(12));
    }
}
