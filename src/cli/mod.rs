//! Command-line interface over the launcher core.
//!
//! Runs searches against a JSON app list and manages the persisted
//! collections and backups in the configured data directory.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::backup::BackupCodec;
use crate::config::Config;
use crate::core::search::{SearchAggregator, SearchResult};
use crate::executor::ExecutionAction;
use crate::platform::fixture::{JsonAppRegistry, StaticAppRegistry};
use crate::platform::AppRegistry;
use crate::services::{
    AppIndex, ContentIndex, FavoritesRepository, MemoryContentStore, SearchShortcut,
    ShortcutRepository, SnippetRepository,
};
use crate::store::DataStore;

#[derive(Parser)]
#[command(name = "searchlauncher")]
#[command(about = "Unified launcher search and configuration backup", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: platform config dir)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one search and print the ranked results
    Search {
        query: String,

        /// JSON array of installed apps to search
        #[arg(long, value_name = "FILE")]
        apps: Option<PathBuf>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export or import a backup bundle
    Backup {
        #[command(subcommand)]
        action: BackupCommands,
    },

    /// Manage search shortcuts
    Shortcuts {
        #[command(subcommand)]
        action: ShortcutCommands,
    },

    /// Manage text snippets
    Snippets {
        #[command(subcommand)]
        action: SnippetCommands,
    },

    /// Manage favorites
    Favorites {
        #[command(subcommand)]
        action: FavoriteCommands,
    },
}

#[derive(Subcommand)]
pub enum BackupCommands {
    Export { file: PathBuf },
    Import { file: PathBuf },
}

#[derive(Subcommand)]
pub enum ShortcutCommands {
    List,
    Add {
        alias: String,
        /// URL with `%s` where the query goes
        url_template: String,
        description: String,
        /// ARGB color, e.g. 0xFF4285F4
        #[arg(long, value_parser = parse_color)]
        color: Option<i64>,
    },
    Remove {
        id: String,
    },
    /// Restore the built-in shortcuts
    Reset,
}

#[derive(Subcommand)]
pub enum SnippetCommands {
    List,
    Add { alias: String, content: String },
    Remove { alias: String },
}

#[derive(Subcommand)]
pub enum FavoriteCommands {
    List,
    Add { id: String },
    Remove { id: String },
}

fn parse_color(value: &str) -> std::result::Result<i64, String> {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix('#')) {
        Some(hex) => i64::from_str_radix(hex, 16),
        None => value.parse(),
    };
    parsed.map_err(|e| format!("invalid color '{}': {}", value, e))
}

fn open_store(config: &Config) -> Result<Arc<DataStore>> {
    let path = config.storage.store_path();
    let store = DataStore::open(&path)
        .with_context(|| format!("Failed to open data store at {}", path.display()))?;
    Ok(Arc::new(store))
}

fn load_config(path: Option<&Path>) -> Config {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

/// Run a parsed command.
pub async fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref());
    let store = open_store(&config)?;

    match cli.command {
        Commands::Search { query, apps, json } => search(&config, store, &query, apps, json).await,
        Commands::Backup { action } => backup(&config, store, action),
        Commands::Shortcuts { action } => shortcuts(store, action),
        Commands::Snippets { action } => snippets(store, action),
        Commands::Favorites { action } => favorites(store, action),
    }
}

async fn search(
    config: &Config,
    store: Arc<DataStore>,
    query: &str,
    apps: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let registry: Arc<dyn AppRegistry> = match apps {
        Some(path) => Arc::new(JsonAppRegistry::new(path)),
        None => Arc::new(StaticAppRegistry::default()),
    };

    let shortcuts = ShortcutRepository::new(store);
    let content_store = Arc::new(MemoryContentStore::new());
    content_store.initialize();
    let content = ContentIndex::new(content_store, &config.content);
    content
        .index_shortcuts(&shortcuts.items())
        .await
        .context("Failed to index shortcuts")?;

    let aggregator = SearchAggregator::new(
        Arc::new(AppIndex::new(registry, None, config.search.usage_window())),
        Arc::new(content),
        shortcuts,
        &config.search,
    );

    let results = aggregator.search(query).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No results");
    }
    for result in &results {
        print_result(result);
    }
    Ok(())
}

fn print_result(result: &SearchResult) {
    let target = match ExecutionAction::from(result) {
        ExecutionAction::LaunchApp { package_name } => package_name,
        ExecutionAction::OpenUri { uri, .. } => uri,
        ExecutionAction::OpenSystemSettings => "settings".to_string(),
        ExecutionAction::NoOp => String::new(),
    };

    match result.subtitle() {
        Some(subtitle) => println!("{}  ({})  -> {}", result.title(), subtitle, target),
        None => println!("{}  -> {}", result.title(), target),
    }
}

fn backup(config: &Config, store: Arc<DataStore>, action: BackupCommands) -> Result<()> {
    let codec = BackupCodec::new(
        store,
        config.storage.media_dir(),
        config.backup.max_image_bytes,
    );

    match action {
        BackupCommands::Export { file } => {
            // Build the bundle in memory so a failed export leaves no partial file.
            let mut bundle = Vec::new();
            let total = codec.export(&mut bundle).context("Export failed")?;
            fs::write(&file, bundle)
                .with_context(|| format!("Failed to write {}", file.display()))?;
            println!("Exported {} items to {}", total, file.display());
        }
        BackupCommands::Import { file } => {
            let reader = File::open(&file)
                .map(BufReader::new)
                .with_context(|| format!("Failed to open {}", file.display()))?;
            let stats = codec.import(reader).context("Import failed")?;
            println!(
                "Imported {} snippets, {} shortcuts, {} favorites{}",
                stats.snippets_count,
                stats.shortcuts_count,
                stats.favorites_count,
                if stats.background_restored {
                    ", background restored"
                } else {
                    ""
                }
            );
        }
    }
    Ok(())
}

fn shortcuts(store: Arc<DataStore>, action: ShortcutCommands) -> Result<()> {
    let repo = ShortcutRepository::new(store);

    match action {
        ShortcutCommands::List => {
            for shortcut in repo.items() {
                println!(
                    "{:<6} {:<20} {}  [{}]",
                    shortcut.alias, shortcut.description, shortcut.url_template, shortcut.id
                );
            }
        }
        ShortcutCommands::Add {
            alias,
            url_template,
            description,
            color,
        } => {
            let mut shortcut = SearchShortcut::new(&alias, &url_template, &description);
            shortcut.color = color;
            let id = shortcut.id.clone();
            repo.add(shortcut)?;
            println!("Added shortcut '{}' ({})", alias, id);
        }
        ShortcutCommands::Remove { id } => match repo.remove(&id)? {
            Some(removed) => println!("Removed shortcut '{}'", removed.alias),
            None => anyhow::bail!("No shortcut with id '{}'", id),
        },
        ShortcutCommands::Reset => {
            repo.reset_to_defaults()?;
            println!("Restored {} default shortcuts", repo.items().len());
        }
    }
    Ok(())
}

fn snippets(store: Arc<DataStore>, action: SnippetCommands) -> Result<()> {
    let repo = SnippetRepository::new(store);

    match action {
        SnippetCommands::List => {
            for item in repo.items() {
                println!("{:<12} {}", item.alias, item.content);
            }
        }
        SnippetCommands::Add { alias, content } => {
            repo.add_item(&alias, &content)?;
            println!("Saved snippet '{}'", alias);
        }
        SnippetCommands::Remove { alias } => {
            if !repo.remove_item(&alias)? {
                anyhow::bail!("No snippet '{}'", alias);
            }
            println!("Removed snippet '{}'", alias);
        }
    }
    Ok(())
}

fn favorites(store: Arc<DataStore>, action: FavoriteCommands) -> Result<()> {
    let repo = FavoritesRepository::new(store);

    match action {
        FavoriteCommands::List => {
            for id in repo.ids() {
                println!("{}", id);
            }
        }
        FavoriteCommands::Add { id } => {
            if repo.add(&id)? {
                println!("Added '{}' to favorites", id);
            } else {
                println!("'{}' is already a favorite", id);
            }
        }
        FavoriteCommands::Remove { id } => {
            if !repo.remove(&id)? {
                anyhow::bail!("'{}' is not a favorite", id);
            }
            println!("Removed '{}' from favorites", id);
        }
    }
    Ok(())
}
