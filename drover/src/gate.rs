//! Admission control: a concurrency ceiling followed by rate pacing.
mod concurrency;
mod rate;

pub use concurrency::{ConcurrencyGate, Slot};
pub use rate::RateLimit;

use crate::GateError;
use drover_core::{Concurrency, Rate, RunConfig};
use tokio_util::sync::CancellationToken;

/// Decides when the next execution may start.
///
/// Every admission waits on the concurrency gate first and the rate limit second, so the achieved
/// throughput is roughly the smaller of what the concurrency ceiling allows and the rate.
pub struct RateGate {
    concurrency: ConcurrencyGate,
    rate: RateLimit,
}

impl RateGate {
    pub fn new(concurrency: Concurrency, rate: Rate) -> Self {
        Self {
            concurrency: ConcurrencyGate::new(concurrency),
            rate: RateLimit::new(rate),
        }
    }

    pub fn from_config(config: &RunConfig) -> Self {
        Self::new(config.concurrency(), config.rate())
    }

    /// Wait for a free slot, then for the pacer. The returned [`Slot`] must be held for as long
    /// as the execution runs.
    pub async fn admit(&self, cancel: &CancellationToken) -> Result<Slot, GateError> {
        let slot = self.concurrency.acquire(cancel).await?;
        // Dropping the slot on a cancelled wait hands it back.
        self.rate.until_ready(cancel).await?;
        Ok(slot)
    }

    pub fn concurrency(&self) -> &ConcurrencyGate {
        &self.concurrency
    }
}
