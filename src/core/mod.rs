//! Core engine: result types, aggregation, the interactive search session
//! and the top-level state container. Nothing here depends on a UI toolkit.

pub mod search;
pub mod session;
pub mod state;

pub use search::{merge, SearchAggregator, SearchResult};
pub use session::{SearchPhase, SearchSession, SearchSnapshot};
pub use state::{Effect, LauncherState, Message, Screen};
