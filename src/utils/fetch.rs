//! HTTP GET with XHR-style response classification and backoff polling

use std::time::Duration;

use reqwest::Url;
use reqwest::header::IF_MODIFIED_SINCE;
use tokio::time::Instant;
use tracing::{debug, info};

use super::errors::{FetchError, FetchResult};
use super::timeout::validate_poll_timeout;
use crate::FetchConfig;

/// `new Date(0)` as an HTTP date; forces a full response from caches
const EPOCH_HTTP_DATE: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

/// Default total polling time when the caller gives none (30 seconds)
pub const DEFAULT_POLL_TIMEOUT_MS: u64 = 30_000;

/// Basic-auth credentials for a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: Option<String>,
}

/// How a request finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResponse {
    /// 2xx with its body
    Body(String),
    /// No status at all: refused, reset, or cut off mid-body
    Aborted,
    /// Any non-2xx status
    Failed(u16),
}

impl FetchResponse {
    /// `Some(body)` on success, `Some("")` when aborted, `None` on HTTP failure
    pub fn into_text(self) -> Option<String> {
        match self {
            FetchResponse::Body(body) => Some(body),
            FetchResponse::Aborted => Some(String::new()),
            FetchResponse::Failed(_) => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchResponse::Body(_))
    }
}

/// Thin wrapper around a shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct FetchClient {
    client: reqwest::Client,
    config: FetchConfig,
}

impl FetchClient {
    pub fn new(config: FetchConfig) -> FetchResult<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Issue one GET for `url`
    ///
    /// Only malformed or non-HTTP URLs are errors. Every transport outcome
    /// maps to a [`FetchResponse`].
    pub async fn request(
        &self,
        url: &str,
        credentials: Option<&Credentials>,
    ) -> FetchResult<FetchResponse> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(FetchError::InvalidUrl(format!(
                "{url}: URL must start with http:// or https://"
            )));
        }

        let mut request = self.client.get(parsed);
        if let Some(credentials) = credentials {
            request = request.basic_auth(&credentials.user, credentials.password.as_ref());
        }
        if self.config.disable_cache {
            request = request.header(IF_MODIFIED_SINCE, EPOCH_HTTP_DATE);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                debug!("Request to {} aborted: {}", url, e);
                return Ok(FetchResponse::Aborted);
            }
        };

        let status = response.status();
        if !status.is_success() {
            debug!("Request to {} failed with status {}", url, status);
            return Ok(FetchResponse::Failed(status.as_u16()));
        }

        match response.text().await {
            Ok(body) => Ok(FetchResponse::Body(body)),
            Err(e) => {
                debug!("Body of {} cut off: {}", url, e);
                Ok(FetchResponse::Aborted)
            }
        }
    }

    /// Re-request `url` until `accept` approves a response
    ///
    /// # Polling Strategy
    /// - Starts at `poll_interval_ms`
    /// - Doubles each retry (exponential backoff)
    /// - Caps at `max_poll_interval_ms`
    /// - Total duration limited by `timeout_ms` (default 30s, max 5 minutes)
    ///
    /// The deadline bounds everything: an in-flight request is cut off when
    /// it passes, and no sleep extends beyond it.
    pub async fn poll_until<F>(
        &self,
        url: &str,
        credentials: Option<&Credentials>,
        timeout_ms: Option<u64>,
        mut accept: F,
    ) -> FetchResult<FetchResponse>
    where
        F: FnMut(&FetchResponse) -> bool,
    {
        let timeout = validate_poll_timeout(timeout_ms, DEFAULT_POLL_TIMEOUT_MS)?;
        let max_interval = Duration::from_millis(self.config.max_poll_interval_ms.max(1));
        let mut poll_interval =
            Duration::from_millis(self.config.poll_interval_ms.max(1)).min(max_interval);
        let deadline = Instant::now() + timeout;
        let timed_out = || FetchError::Timeout {
            url: url.to_string(),
            timeout_ms: timeout.as_millis() as u64,
        };
        let mut attempts = 0u32;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(timed_out());
            }

            attempts += 1;
            let response =
                match tokio::time::timeout(remaining, self.request(url, credentials)).await {
                    Ok(response) => response?,
                    Err(_) => {
                        debug!("Attempt {} on {} outlived the poll deadline", attempts, url);
                        return Err(timed_out());
                    }
                };
            if accept(&response) {
                info!("Poll of {} accepted after {} attempt(s)", url, attempts);
                return Ok(response);
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(timed_out());
            }
            tokio::time::sleep(poll_interval.min(remaining)).await;
            poll_interval = (poll_interval * 2).min(max_interval);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn into_text_follows_xhr_conventions() {
        assert_eq!(FetchResponse::Body("ok".into()).into_text().as_deref(), Some("ok"));
        assert_eq!(FetchResponse::Aborted.into_text().as_deref(), Some(""));
        assert_eq!(FetchResponse::Failed(404).into_text(), None);
    }

    #[tokio::test]
    async fn rejects_non_http_urls() {
        let client = FetchClient::new(FetchConfig::default()).unwrap();
        assert_eq!(client.config().poll_interval_ms, 100);

        assert!(matches!(
            client.request("ftp://files.local/a.txt", None).await,
            Err(FetchError::InvalidUrl(_))
        ));
        assert!(matches!(
            client.request("not a url", None).await,
            Err(FetchError::InvalidUrl(_))
        ));
    }
}
