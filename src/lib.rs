//! Browser utility toolkit
//!
//! Keeps a URL query parameter in sync with navigation history, waits on
//! batches of loadable resources one at a time, and fetches text over HTTP.
//! Browser globals are reached only through [`NavigationHost`].

pub mod browser;
pub mod query;
pub mod resources;
mod utils;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub fetch: FetchConfig,
}

/// History commit behaviour for query-parameter writes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Intent used by `QueryStateSync::set`
    #[serde(default)]
    pub default_intent: NavigationIntent,
}

/// HTTP fetch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Send `If-Modified-Since: <epoch>` so caches return a full response
    #[serde(default = "default_disable_cache")]
    pub disable_cache: bool,

    /// First delay between polling attempts
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Upper bound for the doubling polling delay
    #[serde(default = "default_max_poll_interval_ms")]
    pub max_poll_interval_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Honour `HTTP_PROXY`/`HTTPS_PROXY` from the environment
    #[serde(default = "default_use_system_proxy")]
    pub use_system_proxy: bool,
}

fn default_disable_cache() -> bool {
    true
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_max_poll_interval_ms() -> u64 {
    1000
}

fn default_use_system_proxy() -> bool {
    true
}

fn default_user_agent() -> String {
    format!("cupla/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            disable_cache: default_disable_cache(),
            poll_interval_ms: default_poll_interval_ms(),
            max_poll_interval_ms: default_max_poll_interval_ms(),
            user_agent: default_user_agent(),
            use_system_proxy: default_use_system_proxy(),
        }
    }
}

/// Load config from config.yaml in package root
pub fn load_yaml_config() -> anyhow::Result<Config> {
    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config.yaml");

    if config_path.exists() {
        load_yaml_config_from(&config_path)
    } else {
        Ok(Config::default())
    }
}

/// Load config from an explicit YAML file
pub fn load_yaml_config_from(path: &Path) -> anyhow::Result<Config> {
    let contents = fs::read_to_string(path)?;
    let config: Config = serde_yaml::from_str(&contents)?;
    Ok(config)
}

pub use browser::{
    BrowserError, BrowserResult, HistoryState, MemoryHost, NavigationHost, OpenTarget,
    PageLocation, open_page,
};
pub use query::{CommitOutcome, NavigationIntent, QueryStateSync};
pub use resources::{
    LoadOutcome, ReadyState, Resource, ResourceSignal, SequentialWaiter, TrackedResource,
    WaiterState, wait_for_resource, wait_for_resources,
};
pub use utils::{
    Credentials, DEFAULT_POLL_TIMEOUT_MS, FetchClient, FetchError, FetchResponse, FetchResult,
    MAX_POLL_TIMEOUT_MS, validate_poll_timeout,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_fills_defaults() {
        let config: Config = serde_yaml::from_str(
            "history:\n  default_intent: replace\nfetch:\n  poll_interval_ms: 250\n",
        )
        .unwrap();

        assert_eq!(config.history.default_intent, NavigationIntent::Replace);
        assert_eq!(config.fetch.poll_interval_ms, 250);
        assert_eq!(config.fetch.max_poll_interval_ms, 1000);
        assert!(config.fetch.disable_cache);
    }

    #[test]
    fn empty_yaml_is_default_config() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.history.default_intent, NavigationIntent::Push);
        assert!(config.fetch.user_agent.starts_with("cupla/"));
    }
}
