use crate::GateError;
use drover_core::Concurrency;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;

/// Bounds how many executions are in flight.
#[derive(Debug)]
pub enum ConcurrencyGate {
    Bounded(Arc<Semaphore>),
    /// Acquiring only yields to the scheduler.
    Unbounded,
}

impl ConcurrencyGate {
    pub fn new(concurrency: Concurrency) -> Self {
        match concurrency {
            Concurrency::Bounded(n) => Self::Bounded(Arc::new(Semaphore::new(n.get() as usize))),
            Concurrency::Unbounded => Self::Unbounded,
        }
    }

    /// Wait for a free slot or for `cancel`. A cancelled wait leaves the gate untouched.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<Slot, GateError> {
        match self {
            Self::Unbounded => {
                // Nothing else awaits here, so give spawned executions a turn.
                tokio::task::yield_now().await;
                Ok(Slot(None))
            }
            Self::Bounded(semaphore) => {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Err(GateError::Cancelled),
                    permit = semaphore.clone().acquire_owned() => match permit {
                        Ok(permit) => Ok(Slot(Some(permit))),
                        // Closing the semaphore only happens from outside the gate and ends
                        // admission the same way a cancelled run does.
                        Err(_) => Err(GateError::Cancelled),
                    }
                }
            }
        }
    }

    /// Free slots, or `None` when unbounded.
    pub fn available(&self) -> Option<usize> {
        match self {
            Self::Bounded(semaphore) => Some(semaphore.available_permits()),
            Self::Unbounded => None,
        }
    }
}

/// A held concurrency slot. Dropping it frees the slot as well.
#[derive(Debug)]
#[must_use = "dropping a slot releases it immediately"]
pub struct Slot(Option<OwnedSemaphorePermit>);

impl Slot {
    pub fn release(self) {
        drop(self);
    }
}
