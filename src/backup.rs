//! Backup and restore of user-owned collections.
//!
//! A bundle is one pretty-printed JSON document:
//!
//! ```json
//! {
//!   "version": 2,
//!   "snippets": [{"alias": "...", "content": "..."}],
//!   "searchShortcuts": [{"id": "...", "alias": "...", "urlTemplate": "...", "description": "..."}],
//!   "favorites": ["..."],
//!   "backgroundImage": "<base64>" | null
//! }
//! ```
//!
//! Version 1 bundles used `quickCopy` for snippets and a `customShortcuts`
//! list tagged by `type`, of which only `"search"` entries map to shortcuts.
//! Both are read into the current model before anything is written.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{LauncherError, LauncherResult};
use crate::services::favorites::{self, FAVORITES_KEY};
use crate::services::shortcuts::{default_shortcuts, SearchShortcut, SHORTCUTS_KEY};
use crate::services::snippets::{self, SnippetItem, SNIPPETS_KEY};
use crate::store::DataStore;

/// Newest bundle version this codec reads and the one it writes.
pub const BACKUP_VERSION: i64 = 2;

/// Store key holding the background image location.
pub const BACKGROUND_URI_KEY: &str = "background_uri";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BackupBundle<'a> {
    version: i64,
    snippets: &'a [SnippetItem],
    search_shortcuts: &'a [SearchShortcut],
    favorites: &'a [String],
    background_image: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBundle {
    snippets: Option<Vec<SnippetItem>>,
    quick_copy: Option<Vec<SnippetItem>>,
    search_shortcuts: Option<Vec<RawShortcut>>,
    custom_shortcuts: Option<Vec<LegacyEntry>>,
    favorites: Option<Vec<String>>,
    background_image: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawShortcut {
    #[serde(default)]
    id: Option<String>,
    alias: String,
    url_template: String,
    description: String,
    #[serde(default)]
    color: Option<i64>,
    #[serde(default)]
    suggestion_url: Option<String>,
    #[serde(default)]
    package_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum LegacyEntry {
    #[serde(rename_all = "camelCase")]
    Search {
        trigger: String,
        url_template: String,
        description: String,
        #[serde(default)]
        color: Option<i64>,
        #[serde(default)]
        suggestion_url: Option<String>,
        #[serde(default)]
        package_name: Option<String>,
    },
    #[serde(other)]
    Other,
}

/// What an import will write, fully validated.
struct ImportPlan {
    snippets: Option<Vec<SnippetItem>>,
    shortcuts: Option<Vec<SearchShortcut>>,
    favorites: Option<Vec<String>>,
    background_image: Option<String>,
}

/// Counts of what an import restored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportStats {
    pub snippets_count: usize,
    pub shortcuts_count: usize,
    pub favorites_count: usize,
    pub background_restored: bool,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn shortcut_id(id: Option<String>) -> String {
    non_empty(id).unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

impl From<RawShortcut> for SearchShortcut {
    fn from(raw: RawShortcut) -> Self {
        SearchShortcut {
            id: shortcut_id(raw.id),
            alias: raw.alias,
            url_template: raw.url_template,
            description: raw.description,
            color: raw.color,
            suggestion_url: non_empty(raw.suggestion_url),
            package_name: non_empty(raw.package_name),
        }
    }
}

impl LegacyEntry {
    fn into_shortcut(self) -> Option<SearchShortcut> {
        match self {
            LegacyEntry::Search {
                trigger,
                url_template,
                description,
                color,
                suggestion_url,
                package_name,
            } => Some(SearchShortcut {
                id: shortcut_id(None),
                alias: trigger,
                url_template,
                description,
                color,
                suggestion_url: non_empty(suggestion_url),
                package_name: non_empty(package_name),
            }),
            LegacyEntry::Other => None,
        }
    }
}

impl ImportPlan {
    fn parse(reader: impl Read) -> LauncherResult<Self> {
        let document: Value = serde_json::from_reader(reader)
            .map_err(|e| LauncherError::MalformedBackup(format!("not a JSON document: {}", e)))?;

        let version = document
            .get("version")
            .and_then(Value::as_i64)
            .ok_or_else(|| LauncherError::MalformedBackup("missing integer 'version'".into()))?;
        if version > BACKUP_VERSION {
            return Err(LauncherError::UnsupportedBackupVersion {
                found: version,
                supported: BACKUP_VERSION,
            });
        }

        let raw: RawBundle = serde_json::from_value(document)
            .map_err(|e| LauncherError::MalformedBackup(e.to_string()))?;

        let shortcuts = match (raw.search_shortcuts, raw.custom_shortcuts) {
            (Some(current), _) => Some(current.into_iter().map(SearchShortcut::from).collect()),
            (None, Some(legacy)) => Some(
                legacy
                    .into_iter()
                    .filter_map(LegacyEntry::into_shortcut)
                    .collect(),
            ),
            (None, None) => None,
        };

        Ok(Self {
            snippets: raw.snippets.or(raw.quick_copy),
            shortcuts,
            favorites: raw.favorites,
            background_image: raw.background_image,
        })
    }
}

/// Strip a `file://` scheme from a stored background location.
fn background_path(uri: &str) -> PathBuf {
    PathBuf::from(uri.strip_prefix("file://").unwrap_or(uri))
}

pub struct BackupCodec {
    store: Arc<DataStore>,
    media_dir: PathBuf,
    max_image_bytes: u64,
}

impl BackupCodec {
    pub fn new(store: Arc<DataStore>, media_dir: impl Into<PathBuf>, max_image_bytes: u64) -> Self {
        Self {
            store,
            media_dir: media_dir.into(),
            max_image_bytes,
        }
    }

    pub fn media_dir(&self) -> &Path {
        &self.media_dir
    }

    /// Write a bundle of every collection to `writer`.
    ///
    /// Returns the number of snippets, shortcuts and favorites exported. Fails
    /// without writing anything if the background image is over the limit.
    pub fn export(&self, mut writer: impl Write) -> LauncherResult<usize> {
        let snippets: Vec<SnippetItem> = self.store.get(SNIPPETS_KEY)?.unwrap_or_default();
        let shortcuts: Vec<SearchShortcut> = self
            .store
            .get(SHORTCUTS_KEY)?
            .unwrap_or_else(default_shortcuts);
        let favorites: Vec<String> = self.store.get(FAVORITES_KEY)?.unwrap_or_default();
        let background_image = self.encode_background()?;

        let bundle = BackupBundle {
            version: BACKUP_VERSION,
            snippets: &snippets,
            search_shortcuts: &shortcuts,
            favorites: &favorites,
            background_image,
        };

        serde_json::to_writer_pretty(&mut writer, &bundle)?;
        writer.flush()?;

        let total = snippets.len() + shortcuts.len() + favorites.len();
        tracing::info!(
            snippets = snippets.len(),
            shortcuts = shortcuts.len(),
            favorites = favorites.len(),
            "exported backup"
        );
        Ok(total)
    }

    /// Restore a bundle read from `reader`.
    ///
    /// The whole document is validated before the store is touched, and all
    /// collections are committed together. A background image that cannot be
    /// decoded or saved is skipped rather than failing the import.
    pub fn import(&self, reader: impl Read) -> LauncherResult<ImportStats> {
        let plan = ImportPlan::parse(reader)?;

        let background = plan
            .background_image
            .as_deref()
            .and_then(|encoded| self.restore_background(encoded));

        let mut stats = ImportStats {
            background_restored: background.is_some(),
            ..ImportStats::default()
        };

        let committed = self.store.edit(|tx| {
            if let Some(imported) = &plan.snippets {
                let mut items = snippets::stored_snippets(tx)?;
                for item in imported {
                    snippets::upsert(&mut items, item.clone());
                }
                tx.set(SNIPPETS_KEY, &items)?;
                stats.snippets_count = imported.len();
            }

            if let Some(shortcuts) = &plan.shortcuts {
                tx.set(SHORTCUTS_KEY, shortcuts)?;
                stats.shortcuts_count = shortcuts.len();
            }

            if let Some(ids) = &plan.favorites {
                tx.set(FAVORITES_KEY, &favorites::dedup(ids.clone()))?;
                stats.favorites_count = ids.len();
            }

            if let Some(path) = &background {
                tx.set(BACKGROUND_URI_KEY, &path.to_string_lossy())?;
            }
            Ok(())
        });

        if let Err(e) = committed {
            if let Some(path) = &background {
                let _ = fs::remove_file(path);
            }
            return Err(e);
        }

        tracing::info!(?stats, "imported backup");
        Ok(stats)
    }

    fn encode_background(&self) -> LauncherResult<Option<String>> {
        let Some(uri) = self.store.get::<String>(BACKGROUND_URI_KEY)? else {
            return Ok(None);
        };
        let path = background_path(&uri);

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "background image unreadable, exporting without it");
                return Ok(None);
            }
        };

        let size = bytes.len() as u64;
        if size > self.max_image_bytes {
            return Err(LauncherError::BackgroundTooLarge {
                size,
                limit: self.max_image_bytes,
            });
        }

        Ok(Some(base64::engine::general_purpose::STANDARD.encode(bytes)))
    }

    fn restore_background(&self, encoded: &str) -> Option<PathBuf> {
        let bytes = match base64::engine::general_purpose::STANDARD.decode(encoded.trim()) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, "background image is not valid base64, skipping");
                return None;
            }
        };

        if bytes.len() as u64 > self.max_image_bytes {
            tracing::warn!(size = bytes.len(), "background image over size limit, skipping");
            return None;
        }

        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let path = self.media_dir.join(format!("background_{}.jpg", millis));

        let written = fs::create_dir_all(&self.media_dir).and_then(|_| fs::write(&path, &bytes));
        match written {
            Ok(()) => Some(path),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to save background image");
                None
            }
        }
    }
}
