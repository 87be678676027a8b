//! searchlauncher - the core of a search-first home screen.
//!
//! A single query fans out to installed apps, an on-device content index,
//! smart actions synthesized from the text (call, text, email, open URL) and
//! user-defined search shortcuts, and comes back as one ranked list. User
//! collections (snippets, shortcuts, favorites, widgets, background) live in a
//! persisted settings store and can be exported to and restored from a
//! versioned JSON bundle.
//!
//! # Architecture
//!
//! - [`config`] - Configuration loading and management
//! - [`core`] - Result types, aggregation, search session and UI state
//! - [`services`] - Search sources and user-owned collections
//! - [`platform`] - Collaborator traits implemented by the embedding frontend
//! - [`store`] - Persisted key/value settings store
//! - [`backup`] - Bundle export and import
//! - [`executor`] - What to launch for a chosen result
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use searchlauncher::{Config, SearchAggregator, SearchSession};
//!
//! let config = Config::load();
//! let aggregator = Arc::new(SearchAggregator::new(apps, content, shortcuts, &config.search));
//! let session = SearchSession::new(aggregator, config.search.debounce());
//! let mut snapshots = session.subscribe();
//! session.submit("call 911");
//! ```

pub mod backup;
pub mod cli;
pub mod config;
pub mod core;
pub mod executor;
pub mod logging;
pub mod platform;
pub mod services;
pub mod store;

mod error;

pub use backup::{BackupCodec, ImportStats};
pub use config::Config;
pub use core::search::{SearchAggregator, SearchResult};
pub use core::session::{SearchSession, SearchSnapshot};
pub use error::{LauncherError, LauncherResult};
pub use executor::ExecutionAction;
pub use store::DataStore;
