use crate::gate::RateGate;
use crate::Workload;
use drover_core::{ResultStore, RunConfig};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
#[allow(unused_imports)]
use tracing::{debug, error, info, instrument, trace, warn};

#[cfg(feature = "metrics")]
const SUCCESS_METRIC: &str = "drover_success";
#[cfg(feature = "metrics")]
const ERROR_METRIC: &str = "drover_error";
#[cfg(feature = "metrics")]
const LATENCY_METRIC: &str = "drover_latency";

/// Lifecycle of a run.
///
/// `WarmingUp` and `Measuring` share one admission loop; the phase only decides whether a
/// completing execution is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Initializing,
    WarmingUp,
    Measuring,
    Draining,
    Terminated,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Initializing => "initializing",
            Phase::WarmingUp => "warming up",
            Phase::Measuring => "measuring",
            Phase::Draining => "draining",
            Phase::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// Admits executions until the deadline, records the measured ones, then drains.
pub(crate) struct WorkDriver<W: Workload> {
    workload: Arc<W>,
    gate: RateGate,
    results: Arc<ResultStore<W::Error>>,
    phase: Arc<watch::Sender<Phase>>,
    warm_up: Duration,
    run_duration: Duration,
}

impl<W: Workload> WorkDriver<W> {
    pub fn new(
        workload: Arc<W>,
        config: &RunConfig,
        results: Arc<ResultStore<W::Error>>,
        phase: Arc<watch::Sender<Phase>>,
    ) -> Self {
        Self {
            workload,
            gate: RateGate::from_config(config),
            results,
            phase,
            warm_up: config.warm_up(),
            run_duration: config.run_duration(),
        }
    }

    /// Runs the admission loop and waits for every admitted execution. Returns the number of
    /// admitted executions.
    #[instrument(name = "drive", skip_all)]
    pub async fn drive(&self, cancel: &CancellationToken) -> u64 {
        let start = Instant::now();
        let measure_from = start + self.warm_up;
        let deadline = measure_from + self.run_duration;

        // Fires at the deadline or when the caller cancels; executions observe it too.
        let run_token = cancel.child_token();
        self.phase.send_replace(Phase::WarmingUp);
        let timer = tokio::spawn({
            let token = run_token.clone();
            let phase = self.phase.clone();
            async move {
                sleep_until(measure_from).await;
                debug!("Warm-up complete.");
                // A run cancelled during warm-up is already draining.
                phase.send_if_modified(|current| {
                    let warming = *current == Phase::WarmingUp;
                    if warming {
                        *current = Phase::Measuring;
                    }
                    warming
                });

                sleep_until(deadline).await;
                debug!("Deadline reached.");
                token.cancel();
            }
        });

        let tracker = TaskTracker::new();
        let mut admitted = 0u64;

        while !run_token.is_cancelled() && Instant::now() < deadline {
            let slot = match self.gate.admit(&run_token).await {
                Ok(slot) => slot,
                Err(err) => {
                    trace!("Admission stopped: {err}");
                    break;
                }
            };
            admitted += 1;

            let workload = self.workload.clone();
            let results = self.results.clone();
            let token = run_token.clone();
            tracker.spawn(async move {
                let started = Instant::now();
                let res = workload.execute(&token).await;
                let completed = Instant::now();
                // Release before any bookkeeping so the next admission is not held up.
                slot.release();

                record(&results, res, completed - started, completed >= measure_from);
            });
        }

        tracker.close();
        self.phase.send_replace(Phase::Draining);
        debug!(in_flight = tracker.len(), admitted, "Draining.");
        tracker.wait().await;

        timer.abort();
        run_token.cancel();
        admitted
    }
}

fn record<E>(results: &ResultStore<E>, res: Result<(), E>, elapsed: Duration, measured: bool) {
    if !measured {
        trace!("Discarding warm-up sample.");
        return;
    }

    let latency = elapsed.as_secs_f64();

    #[cfg(feature = "metrics")]
    metrics::histogram!(LATENCY_METRIC).record(latency);

    match res {
        Ok(()) => {
            results.append_success(latency);

            #[cfg(feature = "metrics")]
            metrics::counter!(SUCCESS_METRIC).increment(1);
        }
        Err(err) => {
            results.append_fail(latency, err);

            #[cfg(feature = "metrics")]
            metrics::counter!(ERROR_METRIC).increment(1);
        }
    }
}
