//! Resource whose load state is driven by an external signal

use async_trait::async_trait;
use tokio::sync::watch;

use super::{LoadOutcome, ReadyState, Resource};

/// A resource settled through its paired [`ResourceSignal`]
///
/// Models an element whose `onload`/`onerror` callbacks fire later. Cloning
/// shares the same underlying state.
#[derive(Debug, Clone)]
pub struct TrackedResource {
    name: String,
    state: watch::Receiver<ReadyState>,
}

/// Settling side of a [`TrackedResource`]
///
/// Only the first call to [`loaded`](Self::loaded) or
/// [`failed`](Self::failed) takes effect. Dropping the signal while the
/// resource is still pending settles it as failed.
#[derive(Debug)]
pub struct ResourceSignal {
    state: watch::Sender<ReadyState>,
}

impl TrackedResource {
    pub fn pending(name: impl Into<String>) -> (Self, ResourceSignal) {
        let (tx, rx) = watch::channel(ReadyState::Pending);
        (
            Self {
                name: name.into(),
                state: rx,
            },
            ResourceSignal { state: tx },
        )
    }

    pub fn loaded(name: impl Into<String>) -> Self {
        Self::settled_as(name, ReadyState::Loaded)
    }

    pub fn failed(name: impl Into<String>) -> Self {
        Self::settled_as(name, ReadyState::Failed)
    }

    fn settled_as(name: impl Into<String>, state: ReadyState) -> Self {
        // Receiver keeps the last value after the sender is dropped.
        let (_tx, rx) = watch::channel(state);
        Self {
            name: name.into(),
            state: rx,
        }
    }
}

#[async_trait]
impl Resource for TrackedResource {
    fn name(&self) -> &str {
        &self.name
    }

    fn ready_state(&self) -> ReadyState {
        *self.state.borrow()
    }

    async fn settled(&self) -> LoadOutcome {
        let mut rx = self.state.clone();
        let settled = rx
            .wait_for(|state| *state != ReadyState::Pending)
            .await
            .map(|state| *state);
        match settled {
            Ok(state) => LoadOutcome::from_state(state).unwrap_or(LoadOutcome::Failed),
            // Signal dropped while pending.
            Err(_) => LoadOutcome::Failed,
        }
    }
}

impl ResourceSignal {
    pub fn loaded(&self) {
        self.settle(ReadyState::Loaded);
    }

    pub fn failed(&self) {
        self.settle(ReadyState::Failed);
    }

    fn settle(&self, next: ReadyState) {
        self.state.send_if_modified(|state| {
            if *state == ReadyState::Pending {
                *state = next;
                true
            } else {
                false
            }
        });
    }
}

impl Drop for ResourceSignal {
    fn drop(&mut self) {
        self.failed();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_settlement_wins() {
        let (resource, signal) = TrackedResource::pending("a");
        signal.failed();
        signal.loaded();
        assert_eq!(resource.ready_state(), ReadyState::Failed);
    }

    #[tokio::test]
    async fn dropped_signal_settles_as_failed() {
        let (resource, signal) = TrackedResource::pending("a");
        drop(signal);
        assert_eq!(resource.ready_state(), ReadyState::Failed);
        assert_eq!(resource.settled().await, LoadOutcome::Failed);
    }

    #[test]
    fn prebuilt_resources_report_their_state() {
        assert_eq!(TrackedResource::loaded("x").ready_state(), ReadyState::Loaded);
        assert_eq!(TrackedResource::failed("y").ready_state(), ReadyState::Failed);
    }
}
