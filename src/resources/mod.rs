//! Loadable resources and sequential waiting over a batch of them

mod tracked;
mod waiter;

pub use tracked::{ResourceSignal, TrackedResource};
pub use waiter::{SequentialWaiter, WaiterState, wait_for_resources};

use async_trait::async_trait;
use serde::Serialize;

/// Load state of a resource at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadyState {
    Pending,
    Loaded,
    Failed,
}

/// How a resource settled; both variants count as resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadOutcome {
    Loaded,
    Failed,
}

impl LoadOutcome {
    fn from_state(state: ReadyState) -> Option<Self> {
        match state {
            ReadyState::Pending => None,
            ReadyState::Loaded => Some(LoadOutcome::Loaded),
            ReadyState::Failed => Some(LoadOutcome::Failed),
        }
    }
}

/// Something with a ready/error boundary, such as an image
#[async_trait]
pub trait Resource: Send + Sync {
    /// Human-readable identity for logs
    fn name(&self) -> &str;

    fn ready_state(&self) -> ReadyState;

    /// Resolve once the resource loads or fails
    async fn settled(&self) -> LoadOutcome;
}

/// Wait until `resource` resolves
///
/// An already-settled resource still completes on a later scheduler tick, so
/// callers see the same asynchronous ordering either way.
pub async fn wait_for_resource<R>(resource: &R) -> LoadOutcome
where
    R: Resource + ?Sized,
{
    match LoadOutcome::from_state(resource.ready_state()) {
        Some(outcome) => {
            tokio::task::yield_now().await;
            outcome
        }
        None => resource.settled().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn settled_resource_resolves_after_a_tick() {
        let resource = TrackedResource::failed("broken.png");
        assert_eq!(wait_for_resource(&resource).await, LoadOutcome::Failed);
    }

    #[tokio::test]
    async fn pending_resource_resolves_on_signal() {
        let (resource, signal) = TrackedResource::pending("hero.png");
        let waiting = tokio::spawn(async move { wait_for_resource(&resource).await });

        tokio::task::yield_now().await;
        signal.loaded();

        assert_eq!(waiting.await.unwrap(), LoadOutcome::Loaded);
    }
}
