//! Reads and writes a single query parameter while keeping history consistent

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{get_parameter, rewrite_query};
use crate::HistoryConfig;
use crate::browser::{HistoryState, NavigationHost};

/// Whether a write creates a new history entry or overwrites the current one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigationIntent {
    #[default]
    Push,
    Replace,
}

/// What a write ended up doing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "url", rename_all = "snake_case")]
pub enum CommitOutcome {
    /// No location available; nothing was written
    Skipped,
    /// The parameter already had the requested value
    Unchanged,
    Pushed(String),
    Replaced(String),
    /// History API missing; the host performed a full navigation
    Navigated(String),
}

impl CommitOutcome {
    /// URL committed to the host, if any
    pub fn url(&self) -> Option<&str> {
        match self {
            CommitOutcome::Pushed(url)
            | CommitOutcome::Replaced(url)
            | CommitOutcome::Navigated(url) => Some(url),
            CommitOutcome::Skipped | CommitOutcome::Unchanged => None,
        }
    }
}

/// Query-parameter synchronizer bound to a navigation host
///
/// Reads are pure functions of the host's current `search`. Writes rebuild the
/// query string and commit it through the host's history API.
///
/// When the host has no history API, a write falls back to a full navigation,
/// which may reload the page.
///
/// To change several parameters in one user action, write the first with
/// [`NavigationIntent::Push`] and the rest with [`NavigationIntent::Replace`]
/// so the action produces a single history entry.
#[derive(Clone)]
pub struct QueryStateSync {
    host: Arc<dyn NavigationHost>,
    default_intent: NavigationIntent,
}

impl QueryStateSync {
    pub fn new(host: Arc<dyn NavigationHost>) -> Self {
        Self {
            host,
            default_intent: NavigationIntent::default(),
        }
    }

    pub fn from_config(host: Arc<dyn NavigationHost>, config: &HistoryConfig) -> Self {
        Self::new(host).with_default_intent(config.default_intent)
    }

    #[must_use]
    pub fn with_default_intent(mut self, intent: NavigationIntent) -> Self {
        self.default_intent = intent;
        self
    }

    pub fn default_intent(&self) -> NavigationIntent {
        self.default_intent
    }

    /// Current value of `name`, or `None` if absent or there is no location
    pub fn get(&self, name: &str) -> Option<String> {
        let location = self.host.read_location()?;
        get_parameter(&location.search, name).map(str::to_string)
    }

    /// Current value of `name`, falling back to `default`
    pub fn get_or(&self, name: &str, default: &str) -> String {
        self.get(name).unwrap_or_else(|| default.to_string())
    }

    /// Set `name` to `value` (or remove it for `None`) using the default intent
    pub fn set(&self, name: &str, value: Option<&str>) -> CommitOutcome {
        self.set_with_intent(name, value, self.default_intent)
    }

    /// Set `name` to `value` (or remove it for `None`) with an explicit intent
    pub fn set_with_intent(
        &self,
        name: &str,
        value: Option<&str>,
        intent: NavigationIntent,
    ) -> CommitOutcome {
        let Some(location) = self.host.read_location() else {
            debug!("No location available, skipping write of '{}'", name);
            return CommitOutcome::Skipped;
        };

        if get_parameter(&location.search, name) == value {
            debug!("Parameter '{}' unchanged, no history commit", name);
            return CommitOutcome::Unchanged;
        }

        let query = rewrite_query(&location.search, name, value);
        let url = location.url_with_query(&query);

        if !self.host.supports_history() {
            warn!(
                "History API unavailable, falling back to full navigation: {}",
                url
            );
            self.host.assign_location(&url);
            return CommitOutcome::Navigated(url);
        }

        let state = HistoryState::for_url(&url);
        match intent {
            NavigationIntent::Push => {
                info!("pushState {}", url);
                self.host.push_history(&state, &url);
                CommitOutcome::Pushed(url)
            }
            NavigationIntent::Replace => {
                info!("replaceState {}", url);
                self.host.replace_history(&state, &url);
                CommitOutcome::Replaced(url)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::MemoryHost;

    fn sync_at(url: &str) -> (Arc<MemoryHost>, QueryStateSync) {
        let host = Arc::new(MemoryHost::new(url).unwrap());
        let sync = QueryStateSync::new(host.clone());
        (host, sync)
    }

    #[test]
    fn set_pushes_new_entry_with_path_state() {
        let (host, sync) = sync_at("https://app.local/list?a=1&b=2&c=3");

        let outcome = sync.set("b", Some("9"));

        assert_eq!(
            outcome,
            CommitOutcome::Pushed("https://app.local/list?a=1&b=9&c=3".to_string())
        );
        assert_eq!(host.history_len(), 2);
        assert_eq!(
            host.current_state(),
            Some(HistoryState::for_url("https://app.local/list?a=1&b=9&c=3"))
        );
    }

    #[test]
    fn replace_intent_overwrites_current_entry() {
        let (host, sync) = sync_at("https://app.local/list?a=1");

        let outcome = sync.set_with_intent("a", Some("2"), NavigationIntent::Replace);

        assert_eq!(
            outcome,
            CommitOutcome::Replaced("https://app.local/list?a=2".to_string())
        );
        assert_eq!(host.history_len(), 1);
        assert_eq!(sync.get("a").as_deref(), Some("2"));
    }

    #[test]
    fn configured_default_intent_applies_to_set() {
        let host = Arc::new(MemoryHost::new("https://app.local/?a=1").unwrap());
        let config = HistoryConfig {
            default_intent: NavigationIntent::Replace,
        };
        let sync = QueryStateSync::from_config(host.clone(), &config);
        assert_eq!(sync.default_intent(), NavigationIntent::Replace);
        assert_eq!(
            QueryStateSync::new(host.clone()).default_intent(),
            NavigationIntent::Push
        );

        assert!(matches!(sync.set("a", Some("2")), CommitOutcome::Replaced(_)));
        assert_eq!(host.history_len(), 1);
    }

    #[test]
    fn removing_last_parameter_drops_question_mark() {
        let (host, sync) = sync_at("https://app.local/list?only=1");

        let outcome = sync.set("only", None);

        assert_eq!(outcome.url(), Some("https://app.local/list"));
        assert_eq!(host.current_url().as_deref(), Some("https://app.local/list"));
    }

    #[test]
    fn unchanged_value_is_not_committed() {
        let (host, sync) = sync_at("https://app.local/?a=1");

        assert_eq!(sync.set("a", Some("1")), CommitOutcome::Unchanged);
        assert_eq!(sync.set("missing", None), CommitOutcome::Unchanged);
        assert_eq!(host.history_len(), 1);
    }

    #[test]
    fn missing_history_api_falls_back_to_navigation() {
        let host = Arc::new(
            MemoryHost::new("https://app.local/?a=1")
                .unwrap()
                .without_history_api(),
        );
        let sync = QueryStateSync::new(host.clone());

        let outcome = sync.set("a", Some("2"));

        assert_eq!(
            outcome,
            CommitOutcome::Navigated("https://app.local/?a=2".to_string())
        );
        assert_eq!(host.navigations().len(), 1);
        assert_eq!(host.current_state(), None);
    }

    #[test]
    fn detached_host_reads_default_and_skips_writes() {
        let host = Arc::new(MemoryHost::detached());
        let sync = QueryStateSync::new(host.clone());

        assert_eq!(sync.get("a"), None);
        assert_eq!(sync.get_or("a", "fallback"), "fallback");
        assert_eq!(sync.set("a", Some("1")), CommitOutcome::Skipped);
        assert!(host.navigations().is_empty());
    }

    #[test]
    fn empty_value_is_a_real_value() {
        let (_host, sync) = sync_at("https://app.local/");

        assert!(matches!(sync.set("q", Some("")), CommitOutcome::Pushed(_)));
        assert_eq!(sync.get("q").as_deref(), Some(""));
    }
}
