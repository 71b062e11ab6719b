//! Browser host seam for location, history and navigation
//!
//! The core never touches `window`, `document` or `history` directly. Every
//! access goes through [`NavigationHost`], which the hosting environment
//! provides. [`MemoryHost`] is the in-process implementation used by the CLI
//! and by tests.

mod memory;

pub use memory::{HistoryEntry, LocationNavigation, MemoryHost};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Snapshot of the current navigation state
///
/// Field formats follow `window.location`: `protocol` carries its trailing
/// colon (`"https:"`), `host` includes a non-default port, and `search` is
/// either empty or starts with `?`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLocation {
    pub search: String,
    pub pathname: String,
    pub protocol: String,
    pub host: String,
}

impl PageLocation {
    /// `protocol//host/pathname` with no query
    pub fn base_url(&self) -> String {
        let protocol = if self.protocol.ends_with(':') {
            self.protocol.clone()
        } else {
            format!("{}:", self.protocol)
        };
        format!("{}//{}{}", protocol, self.host, self.pathname)
    }

    /// Base URL with `query` attached; an empty query omits the `?`
    pub fn url_with_query(&self, query: &str) -> String {
        let mut url = self.base_url();
        if !query.is_empty() {
            url.push('?');
            url.push_str(query);
        }
        url
    }
}

/// State object stored alongside every history entry
///
/// `path` always equals the committed URL so `popstate` handlers can read it back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryState {
    pub path: String,
}

impl HistoryState {
    pub fn for_url(url: &str) -> Self {
        Self {
            path: url.to_string(),
        }
    }
}

/// Operations the hosting environment must provide
///
/// All methods are synchronous with respect to the calling turn. A host that
/// cannot navigate (non-browser context) returns `None` from
/// [`read_location`](NavigationHost::read_location).
pub trait NavigationHost: Send + Sync {
    /// Current location, or `None` when no navigation facilities exist
    fn read_location(&self) -> Option<PageLocation>;

    /// Whether `pushState`/`replaceState` are available
    fn supports_history(&self) -> bool {
        true
    }

    /// Add a new history entry for `url`
    fn push_history(&self, state: &HistoryState, url: &str);

    /// Overwrite the current history entry with `url`
    fn replace_history(&self, state: &HistoryState, url: &str);

    /// Full navigation of the top-level location (may reload the page)
    fn assign_location(&self, url: &str);

    /// Open `url` in a new browsing context
    fn open_window(&self, url: &str);
}

/// Where [`open_page`] should load the URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpenTarget {
    #[default]
    SameWindow,
    NewWindow,
}

/// Open a page in the current top-level window or in a new one
pub fn open_page(host: &dyn NavigationHost, url: &str, target: OpenTarget) {
    info!("Opening page {} ({:?})", url, target);
    match target {
        OpenTarget::SameWindow => host.assign_location(url),
        OpenTarget::NewWindow => host.open_window(url),
    }
}

#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("URL has no host: {0}")]
    MissingHost(String),
}

pub type BrowserResult<T> = Result<T, BrowserError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn location(protocol: &str, search: &str) -> PageLocation {
        PageLocation {
            search: search.to_string(),
            pathname: "/list".to_string(),
            protocol: protocol.to_string(),
            host: "shop.local:8080".to_string(),
        }
    }

    #[test]
    fn url_with_query_omits_question_mark_for_empty_query() {
        let loc = location("https:", "?a=1");
        assert_eq!(loc.url_with_query(""), "https://shop.local:8080/list");
        assert_eq!(loc.url_with_query("a=2"), "https://shop.local:8080/list?a=2");
    }

    #[test]
    fn base_url_normalizes_protocol_without_colon() {
        let loc = location("http", "");
        assert_eq!(loc.base_url(), "http://shop.local:8080/list");
    }

    #[test]
    fn open_page_routes_by_target() {
        let host = MemoryHost::new("https://app.local/start").unwrap();
        open_page(&host, "https://app.local/popup", OpenTarget::NewWindow);
        open_page(&host, "https://app.local/next", OpenTarget::SameWindow);

        assert_eq!(host.opened_windows(), vec!["https://app.local/popup".to_string()]);
        assert_eq!(host.current_url().as_deref(), Some("https://app.local/next"));
    }
}
