//! Search sources and user-owned collections.

pub mod app_index;
pub mod content_index;
pub mod favorites;
pub mod shortcuts;
pub mod smart_actions;
pub mod snippets;
pub mod widgets;

pub use app_index::AppIndex;
pub use content_index::{ContentIndex, MemoryContentStore};
pub use favorites::FavoritesRepository;
pub use shortcuts::{SearchShortcut, ShortcutRepository};
pub use snippets::{SnippetItem, SnippetRepository};
pub use widgets::{WidgetData, WidgetRepository};
