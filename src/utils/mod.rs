// HTTP fetch helpers and their error types
mod errors;
mod fetch;
mod timeout;

pub use errors::{FetchError, FetchResult};
pub use fetch::{Credentials, DEFAULT_POLL_TIMEOUT_MS, FetchClient, FetchResponse};
pub use timeout::{MAX_POLL_TIMEOUT_MS, validate_poll_timeout};
