//! In-process navigation host
//!
//! Keeps a session history list the way a browser tab does: pushing truncates
//! any forward entries, replacing overwrites the entry at the cursor, and a
//! full navigation records a [`LocationNavigation`] before adding its entry.

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use super::{BrowserError, BrowserResult, HistoryState, NavigationHost, PageLocation};

/// One entry in the session history
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub url: String,
    /// `None` for entries created by full navigation
    pub state: Option<HistoryState>,
}

/// A full navigation that would have reloaded the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationNavigation {
    pub from: String,
    pub to: String,
}

#[derive(Debug)]
struct MemoryHostState {
    current: Option<Url>,
    entries: Vec<HistoryEntry>,
    index: usize,
    navigations: Vec<LocationNavigation>,
    opened_windows: Vec<String>,
}

/// [`NavigationHost`] backed by memory instead of a real browser
#[derive(Debug)]
pub struct MemoryHost {
    state: Mutex<MemoryHostState>,
    history_api: bool,
}

impl MemoryHost {
    /// Start a host at `initial_url` with a single history entry
    pub fn new(initial_url: &str) -> BrowserResult<Self> {
        let url = parse_url(initial_url)?;
        if url.host_str().is_none() {
            return Err(BrowserError::MissingHost(initial_url.to_string()));
        }

        Ok(Self {
            state: Mutex::new(MemoryHostState {
                entries: vec![HistoryEntry {
                    url: url.to_string(),
                    state: None,
                }],
                current: Some(url),
                index: 0,
                navigations: Vec::new(),
                opened_windows: Vec::new(),
            }),
            history_api: true,
        })
    }

    /// A host with no location at all, like a worker or server context
    pub fn detached() -> Self {
        Self {
            state: Mutex::new(MemoryHostState {
                current: None,
                entries: Vec::new(),
                index: 0,
                navigations: Vec::new(),
                opened_windows: Vec::new(),
            }),
            history_api: false,
        }
    }

    /// Disable `pushState`/`replaceState` so history writes fall back to navigation
    #[must_use]
    pub fn without_history_api(mut self) -> Self {
        self.history_api = false;
        self
    }

    pub fn current_url(&self) -> Option<String> {
        self.state.lock().current.as_ref().map(Url::to_string)
    }

    /// State object of the entry under the cursor
    pub fn current_state(&self) -> Option<HistoryState> {
        let state = self.state.lock();
        state
            .entries
            .get(state.index)
            .and_then(|entry| entry.state.clone())
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.state.lock().entries.clone()
    }

    pub fn history_len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn navigations(&self) -> Vec<LocationNavigation> {
        self.state.lock().navigations.clone()
    }

    pub fn opened_windows(&self) -> Vec<String> {
        self.state.lock().opened_windows.clone()
    }

    /// Step back one entry, returning the state a `popstate` listener would see
    ///
    /// Returns `None` without moving when already at the first entry.
    pub fn back(&self) -> Option<Option<HistoryState>> {
        let mut state = self.state.lock();
        if state.index == 0 {
            return None;
        }
        state.index -= 1;
        Some(Self::activate(&mut state))
    }

    /// Step forward one entry; mirror of [`back`](Self::back)
    pub fn forward(&self) -> Option<Option<HistoryState>> {
        let mut state = self.state.lock();
        if state.index + 1 >= state.entries.len() {
            return None;
        }
        state.index += 1;
        Some(Self::activate(&mut state))
    }

    fn activate(state: &mut MemoryHostState) -> Option<HistoryState> {
        let entry = state.entries[state.index].clone();
        // Entries were parsed on insert.
        state.current = Url::parse(&entry.url).ok();
        entry.state
    }

    fn insert_entry(state: &mut MemoryHostState, url: Url, history_state: Option<HistoryState>) {
        let next = state.index + 1;
        state.entries.truncate(next);
        state.entries.push(HistoryEntry {
            url: url.to_string(),
            state: history_state,
        });
        state.index = state.entries.len() - 1;
        state.current = Some(url);
    }
}

impl NavigationHost for MemoryHost {
    fn read_location(&self) -> Option<PageLocation> {
        let state = self.state.lock();
        state.current.as_ref().map(location_of)
    }

    fn supports_history(&self) -> bool {
        self.history_api
    }

    fn push_history(&self, history_state: &HistoryState, url: &str) {
        let Ok(parsed) = parse_url(url) else {
            warn!("Ignoring pushState with unparseable URL: {}", url);
            return;
        };
        let mut state = self.state.lock();
        if state.current.is_none() {
            debug!("pushState on detached host ignored");
            return;
        }
        Self::insert_entry(&mut state, parsed, Some(history_state.clone()));
    }

    fn replace_history(&self, history_state: &HistoryState, url: &str) {
        let Ok(parsed) = parse_url(url) else {
            warn!("Ignoring replaceState with unparseable URL: {}", url);
            return;
        };
        let mut state = self.state.lock();
        if state.current.is_none() {
            debug!("replaceState on detached host ignored");
            return;
        }
        let index = state.index;
        state.entries[index] = HistoryEntry {
            url: parsed.to_string(),
            state: Some(history_state.clone()),
        };
        state.current = Some(parsed);
    }

    fn assign_location(&self, url: &str) {
        let Ok(parsed) = parse_url(url) else {
            warn!("Ignoring navigation to unparseable URL: {}", url);
            return;
        };
        let mut state = self.state.lock();
        let Some(from) = state.current.as_ref().map(Url::to_string) else {
            debug!("Navigation on detached host ignored");
            return;
        };
        state.navigations.push(LocationNavigation {
            from,
            to: parsed.to_string(),
        });
        Self::insert_entry(&mut state, parsed, None);
    }

    fn open_window(&self, url: &str) {
        self.state.lock().opened_windows.push(url.to_string());
    }
}

fn parse_url(url: &str) -> BrowserResult<Url> {
    Url::parse(url).map_err(|e| BrowserError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

fn location_of(url: &Url) -> PageLocation {
    let host = match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
    };
    let search = match url.query() {
        Some(query) if !query.is_empty() => format!("?{query}"),
        _ => String::new(),
    };

    PageLocation {
        search,
        pathname: url.path().to_string(),
        protocol: format!("{}:", url.scheme()),
        host,
    }
}
