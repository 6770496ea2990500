use crate::driver::{Phase, WorkDriver};
use crate::report::{Report, DEFAULT_TEMPLATE};
use crate::{ReportError, RunError, Workload};
use drover_core::{ConfigError, ResultStore, RunConfig, DEFAULT_CAPACITY};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
#[allow(unused_imports)]
use tracing::{debug, error, info, instrument, trace, warn};

/// Runs a [`Workload`] once and keeps its results for reporting.
///
/// A run goes through these steps:
///  1. `init()` once
///  2. `execute()` repeatedly as warm up; these executions are not recorded
///  3. `execute()` repeatedly for the measured duration; these are recorded
///  4. wait for in-flight executions, then `terminate()` once
///
/// # Example
/// ```no_run
/// use drover::prelude::*;
/// use std::time::Duration;
///
/// struct Noop;
///
/// #[async_trait]
/// impl Workload for Noop {
///     type Error = std::io::Error;
///
///     async fn execute(&self, _cancel: &CancellationToken) -> Result<(), Self::Error> {
///         Ok(())
///     }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let config = RunConfig::new(2, 100, Duration::from_secs(3), Duration::from_secs(1)).unwrap();
///     let orchestrator = Orchestrator::from_config(Noop, config, 1_000_000);
///     orchestrator.start(CancellationToken::new()).await.unwrap();
///     println!("{}", orchestrator.report().unwrap());
/// }
/// ```
pub struct Orchestrator<W: Workload> {
    workload: Arc<W>,
    config: RunConfig,
    results: Arc<ResultStore<W::Error>>,
    phase: Arc<watch::Sender<Phase>>,
}

impl<W: Workload> Orchestrator<W> {
    /// Orchestrator configured from the command line flags and `DROVER_*` environment
    /// variables (see [`drover_core::RunArgs`]), with the default result capacity.
    pub fn new(workload: W) -> Result<Self, ConfigError> {
        Ok(Self::from_config(
            workload,
            RunConfig::from_args()?,
            DEFAULT_CAPACITY,
        ))
    }

    /// `capacity` preallocates result storage; too large a value may exhaust memory.
    pub fn from_config(workload: W, config: RunConfig, capacity: usize) -> Self {
        let (phase, _) = watch::channel(Phase::Idle);
        Self {
            workload: Arc::new(workload),
            config,
            results: Arc::new(ResultStore::with_capacity(capacity)),
            phase: Arc::new(phase),
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn workload(&self) -> &W {
        &self.workload
    }

    pub fn results(&self) -> Arc<ResultStore<W::Error>> {
        self.results.clone()
    }

    /// Follow the run's lifecycle.
    pub fn phase(&self) -> watch::Receiver<Phase> {
        self.phase.subscribe()
    }

    /// Drive the workload until the configured duration elapses or `cancel` fires.
    ///
    /// Executions already started when the run ends are awaited, never aborted. The results
    /// are returned once every execution has finished and the workload was terminated.
    #[instrument(name = "run", skip_all)]
    pub async fn start(
        &self,
        cancel: CancellationToken,
    ) -> Result<Arc<ResultStore<W::Error>>, RunError<W::Error>> {
        info!("Running with config {:?}", &self.config);

        self.phase.send_replace(Phase::Initializing);
        if let Err(err) = self.workload.init().await {
            error!("Workload initialization failed: {err}");
            self.phase.send_replace(Phase::Idle);
            return Err(RunError::Init(err));
        }

        let driver = WorkDriver::new(
            self.workload.clone(),
            &self.config,
            self.results.clone(),
            self.phase.clone(),
        );
        let admitted = driver.drive(&cancel).await;

        let terminated = self.workload.terminate().await;
        self.phase.send_replace(Phase::Terminated);
        if let Err(err) = terminated {
            error!("Workload termination failed: {err}");
            return Err(RunError::Terminate(err));
        }

        if admitted == 0 && cancel.is_cancelled() {
            warn!("Run cancelled before any execution was admitted.");
            return Err(RunError::Cancelled);
        }

        info!(
            admitted,
            succeeded = self.results.succeeded(),
            failed = self.results.failed(),
            "Run complete"
        );
        Ok(self.results.clone())
    }

    /// Report rendered with [`DEFAULT_TEMPLATE`].
    pub fn report(&self) -> Result<String, ReportError> {
        self.template_report(DEFAULT_TEMPLATE)
    }

    /// Report rendered with a user template; see [`Report::render`].
    pub fn template_report(&self, template: &str) -> Result<String, ReportError> {
        Report::new(&self.results, &self.config)?.render(template)
    }
}
