//! Strictly sequential waiting over an ordered batch of resources
//!
//! A batch moves through `Idle -> Waiting(0) -> ... -> Waiting(n-1) -> Done`.
//! The wait on resource `i + 1` begins only after resource `i` has resolved.
//! A failed resource counts as resolved, so one broken image never stalls or
//! aborts the batch. Independent batches are not coordinated with each other.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::{LoadOutcome, Resource, wait_for_resource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "index", rename_all = "snake_case")]
pub enum WaiterState {
    Idle,
    Waiting(usize),
    Done,
}

/// One batch of resources awaited in order
pub struct SequentialWaiter {
    resources: Vec<Arc<dyn Resource>>,
    state: watch::Sender<WaiterState>,
}

impl SequentialWaiter {
    pub fn new<I>(resources: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Resource>>,
    {
        let (state, _) = watch::channel(WaiterState::Idle);
        Self {
            resources: resources.into_iter().collect(),
            state,
        }
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn state(&self) -> WaiterState {
        *self.state.borrow()
    }

    /// Observe state transitions; subscribe before [`run`](Self::run) to see all of them
    pub fn subscribe(&self) -> watch::Receiver<WaiterState> {
        self.state.subscribe()
    }

    /// Walk the batch to completion
    ///
    /// There is no cancellation: once started, every resource is awaited.
    pub async fn wait(self) {
        let total = self.resources.len();

        for (index, resource) in self.resources.iter().enumerate() {
            self.state.send_replace(WaiterState::Waiting(index));
            debug!("Waiting on resource {}/{}: {}", index + 1, total, resource.name());

            match wait_for_resource(resource.as_ref()).await {
                LoadOutcome::Loaded => debug!("Resource loaded: {}", resource.name()),
                LoadOutcome::Failed => {
                    debug!("Resource failed, treating as resolved: {}", resource.name())
                }
            }
        }

        self.state.send_replace(WaiterState::Done);
        info!("Resource batch resolved ({} resources)", total);
    }

    /// Spawn the walk and call `on_complete` exactly once when it finishes
    ///
    /// Completion is always asynchronous relative to this call, even for an
    /// empty batch.
    pub fn run<F>(self, on_complete: F) -> JoinHandle<()>
    where
        F: FnOnce() + Send + 'static,
    {
        tokio::spawn(async move {
            self.wait().await;
            on_complete();
        })
    }
}

/// Wait on `resources` one at a time, then call `on_complete`
pub fn wait_for_resources<I, F>(resources: I, on_complete: F) -> JoinHandle<()>
where
    I: IntoIterator<Item = Arc<dyn Resource>>,
    F: FnOnce() + Send + 'static,
{
    SequentialWaiter::new(resources).run(on_complete)
}
