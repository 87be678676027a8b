//! Interactive search session: debounce plus last-query-wins.
//!
//! Every [`SearchSession::submit`] starts a new generation. The generation
//! number is bumped while holding the snapshot lock, the previous lookup task
//! is aborted, and the new task only publishes its results if the snapshot
//! still carries the generation it captured. A late finisher from an older
//! query can therefore never overwrite a newer one.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::search::{SearchAggregator, SearchResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchPhase {
    #[default]
    Idle,
    Searching,
    Settled,
}

/// What the overlay should currently show.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchSnapshot {
    pub generation: u64,
    pub query: String,
    pub phase: SearchPhase,
    pub results: Vec<SearchResult>,
}

pub struct SearchSession {
    aggregator: Arc<SearchAggregator>,
    debounce: Duration,
    snapshot: Arc<watch::Sender<SearchSnapshot>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SearchSession {
    pub fn new(aggregator: Arc<SearchAggregator>, debounce: Duration) -> Self {
        let (snapshot, _) = watch::channel(SearchSnapshot::default());
        Self {
            aggregator,
            debounce,
            snapshot: Arc::new(snapshot),
            task: Mutex::new(None),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.snapshot.subscribe()
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn generation(&self) -> u64 {
        self.snapshot.borrow().generation
    }

    /// Start searching for `query`, superseding any search in flight.
    ///
    /// Must be called from within a tokio runtime. Returns the new generation.
    pub fn submit(&self, query: &str) -> u64 {
        let mut generation = 0;
        self.snapshot.send_modify(|snapshot| {
            snapshot.generation += 1;
            snapshot.query = query.to_string();
            snapshot.phase = SearchPhase::Searching;
            generation = snapshot.generation;
        });

        let delay = if query.trim().is_empty() {
            Duration::ZERO
        } else {
            self.debounce
        };

        let task = tokio::spawn(run(
            Arc::clone(&self.aggregator),
            Arc::clone(&self.snapshot),
            generation,
            query.to_string(),
            delay,
        ));
        self.replace_task(Some(task));

        generation
    }

    /// Close the overlay: cancel any search and clear the results.
    pub fn dismiss(&self) {
        self.snapshot.send_modify(|snapshot| {
            snapshot.generation += 1;
            snapshot.query.clear();
            snapshot.phase = SearchPhase::Idle;
            snapshot.results.clear();
        });
        self.replace_task(None);
    }

    /// Publish `results` for `generation` if it is still current.
    pub fn apply_results(&self, generation: u64, results: Vec<SearchResult>) -> bool {
        apply(&self.snapshot, generation, results)
    }

    fn replace_task(&self, task: Option<JoinHandle<()>>) {
        let previous = {
            let mut slot = self.task.lock().unwrap_or_else(|e| e.into_inner());
            std::mem::replace(&mut *slot, task)
        };
        if let Some(previous) = previous {
            previous.abort();
        }
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        self.replace_task(None);
    }
}

async fn run(
    aggregator: Arc<SearchAggregator>,
    snapshot: Arc<watch::Sender<SearchSnapshot>>,
    generation: u64,
    query: String,
    delay: Duration,
) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    if snapshot.borrow().generation != generation {
        return;
    }

    let results = aggregator.search(&query).await;
    apply(&snapshot, generation, results);
}

fn apply(
    snapshot: &watch::Sender<SearchSnapshot>,
    generation: u64,
    results: Vec<SearchResult>,
) -> bool {
    snapshot.send_if_modified(|current| {
        if current.generation != generation {
            tracing::debug!(
                generation,
                current = current.generation,
                "discarding superseded results"
            );
            return false;
        }
        current.results = results;
        current.phase = SearchPhase::Settled;
        true
    })
}
