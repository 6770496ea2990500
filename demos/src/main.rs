use anyhow::Result;
use drover::prelude::*;
use drover::ConfigError;
use rand::Rng;
use std::time::Duration;
#[allow(unused_imports)]
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, thiserror::Error)]
enum ServiceError {
    #[error("server error")]
    Server,
}

/// Pretends to call a remote service that answers in about 10ms and fails now and then.
struct SampleService;

#[async_trait]
impl Workload for SampleService {
    type Error = ServiceError;

    async fn init(&self) -> Result<(), ServiceError> {
        info!("Connecting to the sample service.");
        Ok(())
    }

    async fn execute(&self, cancel: &CancellationToken) -> Result<(), ServiceError> {
        let (jitter, failed) = {
            let mut rng = rand::thread_rng();
            (rng.gen_range(0..5), rng.gen_bool(0.01))
        };

        tokio::select! {
            _ = cancel.cancelled() => {},
            _ = tokio::time::sleep(Duration::from_millis(8 + jitter)) => {},
        }

        if failed {
            Err(ServiceError::Server)
        } else {
            Ok(())
        }
    }

    async fn terminate(&self) -> Result<(), ServiceError> {
        info!("Disconnecting from the sample service.");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_env_filter("drover=debug,drover_demos=info")
        .init();

    let orchestrator = match Orchestrator::new(SampleService) {
        Ok(orchestrator) => orchestrator,
        Err(ConfigError::InvalidArgs(err)) => err.exit(),
        Err(err) => return Err(err.into()),
    };

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupted, draining.");
                cancel.cancel();
            }
        }
    });

    let results = orchestrator.start(cancel).await?;
    println!("{}", orchestrator.report()?);
    println!("{}", orchestrator.template_report("{{.Histogram}}")?);

    if results.failed() > 0 {
        error!("{} executions failed", results.failed());
    }
    Ok(())
}
