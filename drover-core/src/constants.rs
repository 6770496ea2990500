use std::time::Duration;

/// Latency storage preallocated by [`crate::ResultStore::new`].
///
/// Too large a value may exhaust memory before the run starts; the capacity is only a hint and
/// the store keeps growing past it.
pub const DEFAULT_CAPACITY: usize = 100_000_000;

/// Upper bound accepted for `max_concurrent`; keeps the semaphore below its permit ceiling on
/// every target.
pub const MAX_CONCURRENT: u32 = 1 << 28;

pub const DEFAULT_MAX_CONCURRENT: u32 = 1;
pub const DEFAULT_MAX_RPS: u32 = 1;
pub const DEFAULT_RUN_DURATION: Duration = Duration::from_secs(5);
pub const DEFAULT_WARM_UP: Duration = Duration::from_secs(5);

/// Bucket count used by the default report histogram.
pub const REPORT_HISTOGRAM_BINS: usize = 9;

/// Maximum bar width used by the default report histogram.
pub const REPORT_HISTOGRAM_WIDTH: usize = 25;
