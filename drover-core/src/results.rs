mod histogram;

pub use histogram::*;

use crate::{QueryError, DEFAULT_CAPACITY};
use std::fmt::Display;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, MutexGuard, PoisonError,
};
#[allow(unused_imports)]
use tracing::{debug, error, info, instrument, trace, warn};

/// Outcome counts, latencies (in seconds) and errors of the measured executions of a run.
///
/// Every method takes `&self` and is safe to call from any number of tasks at once. Counters are
/// atomics; latencies and errors sit behind separate locks so that recording an error never
/// contends with latency queries.
#[derive(Debug)]
pub struct ResultStore<E> {
    succeeded: AtomicU64,
    failed: AtomicU64,
    latencies: Mutex<Latencies>,
    errors: Mutex<Vec<Arc<E>>>,
}

#[derive(Debug)]
struct Latencies {
    values: Vec<f64>,
    // Only valid until the next append.
    sorted: bool,
}

impl<E> ResultStore<E> {
    /// Store preallocated with [`DEFAULT_CAPACITY`] entries.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Store preallocated for `capacity` latencies and errors.
    ///
    /// The capacity is a hint to avoid reallocation under high throughput, never a limit.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            succeeded: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            latencies: Mutex::new(Latencies {
                values: Vec::with_capacity(capacity),
                sorted: false,
            }),
            errors: Mutex::new(Vec::with_capacity(capacity)),
        }
    }

    pub fn append_success(&self, latency: f64) {
        self.append_latency(latency, &self.succeeded);
    }

    pub fn append_fail(&self, latency: f64, error: E) {
        self.append_latency(latency, &self.failed);

        lock(&self.errors).push(Arc::new(error));
    }

    fn append_latency(&self, latency: f64, counter: &AtomicU64) {
        let mut latencies = lock(&self.latencies);
        latencies.values.push(latency);
        latencies.sorted = false;
        // Counted while the lock is held so no reader sees the count ahead of the latencies.
        counter.fetch_add(1, Ordering::Release);
    }

    pub fn succeeded(&self) -> u64 {
        self.succeeded.load(Ordering::Acquire)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Acquire)
    }

    /// Number of recorded executions.
    ///
    /// While a run is in progress the count never exceeds the length of a [`Self::latencies`]
    /// snapshot taken afterwards. Once every append has returned the two are equal.
    pub fn total(&self) -> u64 {
        self.succeeded() + self.failed()
    }

    /// Snapshot of every recorded latency. Order is unspecified once a percentile was queried.
    pub fn latencies(&self) -> Vec<f64> {
        lock(&self.latencies).values.clone()
    }

    /// Snapshot of the error log, in recording order.
    pub fn errors(&self) -> Vec<Arc<E>> {
        lock(&self.errors).clone()
    }

    pub fn mean_latency(&self) -> Result<f64, QueryError> {
        let latencies = lock(&self.latencies);
        if latencies.values.is_empty() {
            return Err(QueryError::NoData);
        }
        let sum: f64 = latencies.values.iter().sum();
        Ok(sum / latencies.values.len() as f64)
    }

    /// Nearest-rank percentile of the recorded latencies.
    ///
    /// `p = 0` is the minimum and `p = 100` the maximum. Other values select index
    /// `len * p / 100 - 1` of the ascending latencies, truncated toward zero, so tiny sample
    /// counts resolve to the first element instead of a negative index.
    pub fn percentile_latency(&self, p: u8) -> Result<f64, QueryError> {
        let mut latencies = lock(&self.latencies);

        if latencies.values.is_empty() {
            return Err(QueryError::NoData);
        }
        if p > 100 {
            return Err(QueryError::InvalidPercentile(p));
        }

        if !latencies.sorted {
            trace!("Sorting {} latencies.", latencies.values.len());
            latencies.values.sort_by(f64::total_cmp);
            latencies.sorted = true;
        }

        let values = &latencies.values;
        let value = match p {
            0 => values[0],
            100 => values[values.len() - 1],
            _ => {
                let rank = values.len() as f64 * (f64::from(p) / 100.);
                // Float to int casts saturate, so (-1, 0) lands on 0.
                values[(rank - 1.) as usize]
            }
        };
        Ok(value)
    }

    /// Bucketed view of the latencies; see [`Histogram::new`].
    pub fn histogram_buckets(&self, bins: usize) -> Histogram {
        Histogram::new(bins, &lock(&self.latencies).values)
    }

    /// Text histogram with `bins` linear buckets and bars of at most `width` characters.
    ///
    /// Renders to an empty string when nothing was recorded.
    pub fn histogram(&self, bins: usize, width: usize) -> String {
        self.histogram_buckets(bins).render(width)
    }
}

impl<E: Display> ResultStore<E> {
    /// All recorded errors joined by `", "`.
    pub fn error_summary(&self) -> String {
        lock(&self.errors)
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl<E> Default for ResultStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // Appends never leave the data half-written, so a poisoned lock is still consistent.
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
