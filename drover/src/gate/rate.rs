use crate::GateError;
use drover_core::Rate;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use tokio_util::sync::CancellationToken;

/// Paces admissions to a fixed number per second.
pub enum RateLimit {
    Bounded(DefaultDirectRateLimiter),
    /// Admission is immediate.
    Unbounded,
}

impl RateLimit {
    pub fn new(rate: Rate) -> Self {
        match rate {
            Rate::Bounded(per_second) => Self::Bounded(rate_limiter(per_second)),
            Rate::Unbounded => Self::Unbounded,
        }
    }

    pub async fn until_ready(&self, cancel: &CancellationToken) -> Result<(), GateError> {
        match self {
            Self::Unbounded => Ok(()),
            Self::Bounded(limiter) => {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Err(GateError::Cancelled),
                    _ = limiter.until_ready() => Ok(()),
                }
            }
        }
    }
}

fn rate_limiter(per_second: NonZeroU32) -> DefaultDirectRateLimiter {
    // A burst of one spreads admissions evenly over each second.
    RateLimiter::direct(Quota::per_second(per_second).allow_burst(NonZeroU32::MIN))
}
