//! Result execution: what the frontend should do when a result is chosen.

use crate::core::search::SearchResult;

/// The action to perform when a result is executed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionAction {
    /// Start an installed app by package
    LaunchApp { package_name: String },

    /// Open a URI (`tel:`, `sms:`, `mailto:`, `https:`, app deep link),
    /// preferring `package_hint` when it is installed
    OpenUri {
        uri: String,
        package_hint: Option<String>,
    },

    /// Open the system settings screen
    OpenSystemSettings,

    /// Nothing to launch
    NoOp,
}

impl From<&SearchResult> for ExecutionAction {
    fn from(result: &SearchResult) -> Self {
        match result {
            SearchResult::App { package_name, .. } => ExecutionAction::LaunchApp {
                package_name: package_name.clone(),
            },

            SearchResult::Content {
                deep_link: Some(uri),
                package_name,
                ..
            } => ExecutionAction::OpenUri {
                uri: uri.clone(),
                package_hint: package_name.clone(),
            },

            SearchResult::Content {
                deep_link: None,
                package_name: Some(package_name),
                ..
            } => ExecutionAction::LaunchApp {
                package_name: package_name.clone(),
            },

            SearchResult::Content { .. } => ExecutionAction::NoOp,

            SearchResult::Shortcut { intent_uri, .. } => ExecutionAction::OpenUri {
                uri: intent_uri.clone(),
                package_hint: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::shortcuts::SearchShortcut;
    use crate::services::smart_actions;

    #[test]
    fn smart_call_opens_tel_uri_with_dialer_hint() {
        let results = smart_actions::detect("call 911");
        assert_eq!(
            ExecutionAction::from(&results[0]),
            ExecutionAction::OpenUri {
                uri: "tel:911".into(),
                package_hint: Some("com.android.dialer".into()),
            }
        );
    }

    #[test]
    fn shortcut_opens_resolved_url() {
        let shortcut = SearchShortcut::new("w", "https://wiki.test/?q=%s", "Wiki");
        let result = shortcut.resolve("w rust lang").unwrap();
        assert_eq!(
            ExecutionAction::from(&result),
            ExecutionAction::OpenUri {
                uri: "https://wiki.test/?q=rust%20lang".into(),
                package_hint: None,
            }
        );
    }

    #[test]
    fn content_without_link_falls_back() {
        let mut result = SearchResult::Content {
            id: "notes/1".into(),
            namespace: "notes".into(),
            title: "Note".into(),
            subtitle: None,
            icon: None,
            package_name: Some("org.notes".into()),
            deep_link: None,
            ranking_score: 0,
        };
        assert_eq!(
            ExecutionAction::from(&result),
            ExecutionAction::LaunchApp {
                package_name: "org.notes".into()
            }
        );

        if let SearchResult::Content { package_name, .. } = &mut result {
            *package_name = None;
        }
        assert_eq!(ExecutionAction::from(&result), ExecutionAction::NoOp);
    }
}
