//! Error types for the launcher core.
//!
//! Recoverable conditions (a source that is not ready, a denied usage-stats
//! permission) are swallowed at the component that hits them and never reach
//! this type's callers. Everything here is surfaced to the caller.

use thiserror::Error;

/// Errors that can occur in the launcher core
#[derive(Debug, Error)]
pub enum LauncherError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Persisted settings store errors
    #[error("Store error: {0}")]
    Store(String),

    /// Backup written by a newer release
    #[error("Backup file version ({found}) is newer than supported version ({supported})")]
    UnsupportedBackupVersion { found: i64, supported: i64 },

    /// Backup document is structurally invalid
    #[error("Malformed backup: {0}")]
    MalformedBackup(String),

    /// Background image exceeds the export ceiling
    #[error("Background image too large ({size} bytes, max {limit} bytes)")]
    BackgroundTooLarge { size: u64, limit: u64 },

    /// A search source is not ready or failed
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    /// A platform permission was not granted
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Platform collaborator failures
    #[error("Platform error: {0}")]
    Platform(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("Config parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Result type alias for launcher operations
pub type LauncherResult<T> = Result<T, LauncherError>;
