//! Top-level launcher state.
//!
//! All UI-facing state lives in one [`LauncherState`] value and changes only
//! through [`LauncherState::update`], which returns the side effect the
//! frontend should perform next.

use super::search::SearchResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Home,
    Search,
    Shortcuts,
    Snippets,
    Widgets,
    Settings,
}

#[derive(Debug, Clone)]
pub enum Message {
    /// Gesture or key opened the search overlay
    OpenSearch,
    QueryChanged(String),
    ResultsReady {
        generation: u64,
        results: Vec<SearchResult>,
    },
    /// Overlay closed (back, tap outside, launched a result)
    Dismiss,
    Navigate(Screen),
}

/// Work the frontend should start after an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Submit `query` to the search session as `generation`
    Search { generation: u64, query: String },
    /// Abort any search in flight
    CancelSearch,
}

#[derive(Debug, Clone, Default)]
pub struct LauncherState {
    pub screen: Screen,
    pub query: String,
    pub results: Vec<SearchResult>,
    pub generation: u64,
}

impl LauncherState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, message: Message) -> Effect {
        match message {
            Message::OpenSearch => {
                self.screen = Screen::Search;
                self.start_search(String::new())
            }

            Message::QueryChanged(query) => {
                self.screen = Screen::Search;
                self.start_search(query)
            }

            Message::ResultsReady {
                generation,
                results,
            } => {
                if generation == self.generation && self.screen == Screen::Search {
                    self.results = results;
                } else {
                    tracing::debug!(generation, current = self.generation, "ignoring stale results");
                }
                Effect::None
            }

            Message::Dismiss => self.leave_search(Screen::Home),

            Message::Navigate(screen) => {
                if screen == Screen::Search {
                    self.screen = Screen::Search;
                    return self.start_search(String::new());
                }
                if self.screen == Screen::Search {
                    return self.leave_search(screen);
                }
                self.screen = screen;
                Effect::None
            }
        }
    }

    fn start_search(&mut self, query: String) -> Effect {
        self.generation += 1;
        self.query = query.clone();
        Effect::Search {
            generation: self.generation,
            query,
        }
    }

    fn leave_search(&mut self, screen: Screen) -> Effect {
        self.screen = screen;
        self.generation += 1;
        self.query.clear();
        self.results.clear();
        Effect::CancelSearch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::IconRef;

    fn app(id: &str) -> SearchResult {
        SearchResult::App {
            id: id.to_string(),
            title: id.to_string(),
            subtitle: None,
            icon: IconRef::Default,
            package_name: id.to_string(),
        }
    }

    #[test]
    fn query_changes_bump_generation() {
        let mut state = LauncherState::new();
        assert_eq!(
            state.update(Message::OpenSearch),
            Effect::Search {
                generation: 1,
                query: String::new()
            }
        );
        assert_eq!(
            state.update(Message::QueryChanged("ma".into())),
            Effect::Search {
                generation: 2,
                query: "ma".into()
            }
        );
        assert_eq!(state.screen, Screen::Search);
    }

    #[test]
    fn stale_results_are_ignored() {
        let mut state = LauncherState::new();
        state.update(Message::QueryChanged("a".into()));
        state.update(Message::QueryChanged("ab".into()));

        state.update(Message::ResultsReady {
            generation: 1,
            results: vec![app("stale")],
        });
        assert!(state.results.is_empty());

        state.update(Message::ResultsReady {
            generation: 2,
            results: vec![app("fresh")],
        });
        assert_eq!(state.results[0].id(), "fresh");
    }

    #[test]
    fn dismiss_clears_and_invalidates_in_flight_results() {
        let mut state = LauncherState::new();
        state.update(Message::QueryChanged("mail".into()));
        assert_eq!(state.update(Message::Dismiss), Effect::CancelSearch);
        assert_eq!(state.screen, Screen::Home);
        assert!(state.query.is_empty());

        state.update(Message::ResultsReady {
            generation: 1,
            results: vec![app("late")],
        });
        assert!(state.results.is_empty());
    }

    #[test]
    fn navigation_outside_search_has_no_effect() {
        let mut state = LauncherState::new();
        assert_eq!(state.update(Message::Navigate(Screen::Widgets)), Effect::None);
        assert_eq!(state.screen, Screen::Widgets);

        state.update(Message::Navigate(Screen::Search));
        assert_eq!(
            state.update(Message::Navigate(Screen::Shortcuts)),
            Effect::CancelSearch
        );
    }
}
