use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// The unit of work driven by an [`Orchestrator`](crate::Orchestrator).
///
/// A run calls [`Workload::init`] once, then [`Workload::execute`] repeatedly and in parallel
/// until the run ends, then [`Workload::terminate`] once after every execution has returned.
///
/// # Example
/// ```no_run
/// use drover::prelude::*;
/// use std::time::Duration;
///
/// struct Sleeper;
///
/// #[async_trait]
/// impl Workload for Sleeper {
///     type Error = std::io::Error;
///
///     async fn execute(&self, _cancel: &CancellationToken) -> Result<(), Self::Error> {
///         tokio::time::sleep(Duration::from_millis(10)).await;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Workload: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Executed once before the first `execute`. A failure aborts the run.
    async fn init(&self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// One request against the system under test. An `Err` counts as a failure.
    ///
    /// `cancel` fires when the run deadline passes or the caller cancels the run, so long
    /// requests may bail out early. Already started executions are never aborted.
    async fn execute(&self, cancel: &CancellationToken) -> Result<(), Self::Error>;

    /// Executed once after every `execute` has returned.
    async fn terminate(&self) -> Result<(), Self::Error> {
        Ok(())
    }
}
