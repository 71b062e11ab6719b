//! Timeout validation for polling fetches

use std::time::Duration;

use super::errors::FetchError;

/// Maximum total time a poll may run (5 minutes)
pub const MAX_POLL_TIMEOUT_MS: u64 = 300_000; // 5 minutes

/// Validate a polling timeout
///
/// # Arguments
/// * `timeout_ms` - Optional timeout in milliseconds
/// * `default_ms` - Default timeout if None provided
///
/// # Returns
/// * `Ok(Duration)` - Validated Duration object
/// * `Err(FetchError)` - If timeout is zero or exceeds MAX_POLL_TIMEOUT_MS
pub fn validate_poll_timeout(
    timeout_ms: Option<u64>,
    default_ms: u64,
) -> Result<Duration, FetchError> {
    let ms = timeout_ms.unwrap_or(default_ms);

    if ms == 0 {
        return Err(FetchError::invalid_arguments(
            "Poll timeout must be greater than 0ms",
        ));
    }

    if ms > MAX_POLL_TIMEOUT_MS {
        return Err(FetchError::invalid_arguments(format!(
            "Timeout cannot exceed {}ms ({} minutes). Received: {}ms ({:.1} minutes)",
            MAX_POLL_TIMEOUT_MS,
            MAX_POLL_TIMEOUT_MS / 60_000,
            ms,
            ms as f64 / 60_000.0
        )));
    }

    Ok(Duration::from_millis(ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_applies_when_missing() {
        assert_eq!(
            validate_poll_timeout(None, 30_000).unwrap(),
            Duration::from_millis(30_000)
        );
    }

    #[test]
    fn rejects_zero_and_oversized_timeouts() {
        assert!(validate_poll_timeout(Some(0), 30_000).is_err());
        assert!(validate_poll_timeout(Some(MAX_POLL_TIMEOUT_MS + 1), 30_000).is_err());
        assert!(validate_poll_timeout(Some(MAX_POLL_TIMEOUT_MS), 30_000).is_ok());
    }
}
