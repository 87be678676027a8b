//! Home-screen widgets, ordered by the user.
//!
//! The list is stored under [`WIDGETS_KEY`] as `[{id, height?}]`. Older
//! installs kept a bare id list under [`LEGACY_WIDGET_IDS_KEY`]; it is read
//! when the current key is absent and dropped on the next write.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::LauncherResult;
use crate::platform::WidgetHost;
use crate::store::{DataStore, Transaction};

pub const WIDGETS_KEY: &str = "widgets_data";
pub const LEGACY_WIDGET_IDS_KEY: &str = "widget_ids";
pub const DEFAULT_WIDGET_HEIGHT: i32 = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetData {
    /// Platform-assigned widget id
    pub id: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<i32>,
}

impl WidgetData {
    pub fn height_or_default(&self) -> i32 {
        self.height.unwrap_or(DEFAULT_WIDGET_HEIGHT)
    }
}

fn read_widgets(tx: &Transaction) -> LauncherResult<Vec<WidgetData>> {
    if let Some(widgets) = tx.get::<Vec<WidgetData>>(WIDGETS_KEY)? {
        return Ok(widgets);
    }

    Ok(from_legacy(tx.get(LEGACY_WIDGET_IDS_KEY)?.unwrap_or_default()))
}

fn from_legacy(ids: Vec<i32>) -> Vec<WidgetData> {
    ids.into_iter()
        .map(|id| WidgetData { id, height: None })
        .collect()
}

#[derive(Clone)]
pub struct WidgetRepository {
    store: Arc<DataStore>,
}

impl WidgetRepository {
    pub fn new(store: Arc<DataStore>) -> Self {
        Self { store }
    }

    pub fn widgets(&self) -> Vec<WidgetData> {
        let read = || -> LauncherResult<Vec<WidgetData>> {
            if let Some(widgets) = self.store.get(WIDGETS_KEY)? {
                return Ok(widgets);
            }
            Ok(from_legacy(
                self.store.get(LEGACY_WIDGET_IDS_KEY)?.unwrap_or_default(),
            ))
        };
        read().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "stored widgets unreadable");
            Vec::new()
        })
    }

    pub fn add_widget(&self, id: i32) -> LauncherResult<()> {
        self.modify(|widgets| {
            widgets.push(WidgetData {
                id,
                height: Some(DEFAULT_WIDGET_HEIGHT),
            })
        })
    }

    pub fn remove_widget(&self, id: i32) -> LauncherResult<bool> {
        self.modify(|widgets| {
            let before = widgets.len();
            widgets.retain(|w| w.id != id);
            widgets.len() != before
        })
    }

    pub fn clear(&self) -> LauncherResult<()> {
        self.modify(Vec::clear)
    }

    pub fn update_height(&self, id: i32, height: i32) -> LauncherResult<bool> {
        self.modify(|widgets| match widgets.iter_mut().find(|w| w.id == id) {
            Some(widget) => {
                widget.height = Some(height);
                true
            }
            None => false,
        })
    }

    /// Swap with the previous widget. Returns false at the top or when absent.
    pub fn move_up(&self, id: i32) -> LauncherResult<bool> {
        self.modify(|widgets| match widgets.iter().position(|w| w.id == id) {
            Some(index) if index > 0 => {
                widgets.swap(index, index - 1);
                true
            }
            _ => false,
        })
    }

    /// Swap with the next widget. Returns false at the bottom or when absent.
    pub fn move_down(&self, id: i32) -> LauncherResult<bool> {
        self.modify(|widgets| match widgets.iter().position(|w| w.id == id) {
            Some(index) if index + 1 < widgets.len() => {
                widgets.swap(index, index + 1);
                true
            }
            _ => false,
        })
    }

    /// Ask the host to render every widget in order; returns how many rendered.
    pub fn render_all(&self, host: &dyn WidgetHost) -> usize {
        self.widgets()
            .iter()
            .filter(|widget| match host.render(widget.id) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(widget_id = widget.id, error = %e, "widget failed to render");
                    false
                }
            })
            .count()
    }

    fn modify<R>(&self, f: impl FnOnce(&mut Vec<WidgetData>) -> R) -> LauncherResult<R> {
        self.store.edit(|tx| {
            let mut widgets = read_widgets(tx)?;
            let output = f(&mut widgets);
            tx.set(WIDGETS_KEY, &widgets)?;
            tx.remove(LEGACY_WIDGET_IDS_KEY);
            Ok(output)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LauncherError;
    use std::sync::Mutex;

    fn repo() -> (Arc<DataStore>, WidgetRepository) {
        let store = Arc::new(DataStore::in_memory());
        (store.clone(), WidgetRepository::new(store))
    }

    fn ids(repo: &WidgetRepository) -> Vec<i32> {
        repo.widgets().iter().map(|w| w.id).collect()
    }

    #[test]
    fn legacy_ids_are_migrated_on_write() {
        let (store, repo) = repo();
        store.set(LEGACY_WIDGET_IDS_KEY, &vec![7, 9]).unwrap();

        let widgets = repo.widgets();
        assert_eq!(ids(&repo), vec![7, 9]);
        assert_eq!(widgets[0].height_or_default(), DEFAULT_WIDGET_HEIGHT);

        repo.add_widget(11).unwrap();
        assert!(!store.contains(LEGACY_WIDGET_IDS_KEY));
        assert_eq!(ids(&repo), vec![7, 9, 11]);
    }

    #[test]
    fn move_up_and_down_reorder() {
        let (_, repo) = repo();
        for id in [1, 2, 3] {
            repo.add_widget(id).unwrap();
        }

        assert!(repo.move_up(3).unwrap());
        assert_eq!(ids(&repo), vec![1, 3, 2]);
        assert!(repo.move_down(1).unwrap());
        assert_eq!(ids(&repo), vec![3, 1, 2]);

        assert!(!repo.move_up(3).unwrap());
        assert!(!repo.move_down(2).unwrap());
        assert!(!repo.move_up(42).unwrap());
    }

    #[test]
    fn height_remove_and_clear() {
        let (_, repo) = repo();
        repo.add_widget(1).unwrap();
        repo.add_widget(2).unwrap();

        assert!(repo.update_height(2, 320).unwrap());
        assert_eq!(repo.widgets()[1].height, Some(320));

        assert!(repo.remove_widget(1).unwrap());
        assert_eq!(ids(&repo), vec![2]);

        repo.clear().unwrap();
        assert!(repo.widgets().is_empty());
    }

    struct RecordingHost {
        rendered: Mutex<Vec<i32>>,
        broken: i32,
    }

    impl WidgetHost for RecordingHost {
        fn render(&self, widget_id: i32) -> LauncherResult<()> {
            if widget_id == self.broken {
                return Err(LauncherError::Platform("provider gone".into()));
            }
            self.rendered.lock().unwrap().push(widget_id);
            Ok(())
        }

        fn configure(&self, _widget_id: i32) -> LauncherResult<()> {
            Ok(())
        }

        fn release(&self, _widget_id: i32) -> LauncherResult<()> {
            Ok(())
        }
    }

    #[test]
    fn render_all_skips_failures_in_order() {
        let (_, repo) = repo();
        for id in [4, 5, 6] {
            repo.add_widget(id).unwrap();
        }

        let host = RecordingHost {
            rendered: Mutex::new(Vec::new()),
            broken: 5,
        };
        assert_eq!(repo.render_all(&host), 2);
        assert_eq!(*host.rendered.lock().unwrap(), vec![4, 6]);
    }
}
