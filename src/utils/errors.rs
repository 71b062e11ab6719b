use thiserror::Error;

/// Errors that can occur while fetching over HTTP
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("HTTP client error: {0}")]
    ClientError(String),

    #[error("Polling timed out after {timeout_ms}ms for URL: {url}")]
    Timeout { url: String, timeout_ms: u64 },
}

impl FetchError {
    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        FetchError::InvalidArguments(message.into())
    }
}

/// Implement From<reqwest::Error> for FetchError
impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::ClientError(err.to_string())
    }
}

pub type FetchResult<T> = Result<T, FetchError>;
