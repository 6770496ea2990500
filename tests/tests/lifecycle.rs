#[allow(unused)]
use utils::*;

mod tests {
    use super::*;
    use drover::prelude::*;
    use drover::{Phase, ReportError};
    use std::time::{Duration, Instant};

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    #[ntest::timeout(10_000)]
    async fn execute_failures_counted() -> anyhow::Result<()> {
        init();

        let workload = Delay {
            fail_every: 2,
            ..Delay::fixed(Duration::from_millis(2))
        };
        let orchestrator = Orchestrator::from_config(
            workload,
            config(2, 0, Duration::from_millis(500), Duration::ZERO),
            1_024,
        );

        let results = orchestrator.start(CancellationToken::new()).await?;

        let calls = orchestrator.workload().calls();
        assert_eq!(results.total(), calls);
        assert_eq!(results.failed(), calls / 2);
        assert_eq!(results.errors().len() as u64, results.failed());
        assert!(results
            .errors()
            .iter()
            .all(|e| matches!(e.as_ref(), DelayError::Execute(n) if n % 2 == 0)));
        assert!(results.error_summary().contains("execution 2 failed"));
        Ok(())
    }

    #[tokio::test]
    #[ntest::timeout(5_000)]
    async fn init_failure() {
        init();

        let workload = Delay {
            fail_init: true,
            ..Delay::fixed(Duration::from_millis(1))
        };
        let orchestrator = Orchestrator::from_config(
            workload,
            config(1, 0, Duration::from_secs(1), Duration::ZERO),
            16,
        );

        let err = orchestrator
            .start(CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, RunError::Init(DelayError::Init)));
        assert_eq!(err.to_string(), "failed to initialize workload: init failed");
        assert_eq!(orchestrator.workload().calls(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    #[ntest::timeout(5_000)]
    async fn terminate_failure() {
        init();

        let workload = Delay {
            fail_terminate: true,
            ..Delay::fixed(Duration::from_millis(1))
        };
        let orchestrator = Orchestrator::from_config(
            workload,
            config(1, 0, Duration::from_millis(100), Duration::ZERO),
            1_024,
        );

        let err = orchestrator
            .start(CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, RunError::Terminate(DelayError::Terminate)));
        // Executions still ran and were recorded.
        assert!(orchestrator.results().succeeded() > 0);
        assert_eq!(orchestrator.results().failed(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    #[ntest::timeout(10_000)]
    async fn external_cancellation() {
        init();

        let orchestrator = Orchestrator::from_config(
            Delay::fixed(Duration::from_millis(20)),
            config(4, 0, Duration::from_secs(60), Duration::ZERO),
            1_024,
        );

        let cancel = CancellationToken::new();
        tokio::spawn({
            let cancel = cancel.clone();
            async move {
                tokio::time::sleep(Duration::from_millis(300)).await;
                cancel.cancel();
            }
        });

        let start = Instant::now();
        let results = orchestrator.start(cancel).await.unwrap();

        assert!(start.elapsed() < Duration::from_secs(2));
        assert!(results.total() > 0);
        // In-flight executions were drained, not dropped.
        assert_eq!(results.total(), orchestrator.workload().calls());
    }

    #[tokio::test]
    #[ntest::timeout(5_000)]
    async fn cancelled_before_start() {
        init();

        let orchestrator = Orchestrator::from_config(
            Delay::fixed(Duration::from_millis(1)),
            config(1, 0, Duration::from_secs(60), Duration::ZERO),
            16,
        );

        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = orchestrator.start(cancel).await.unwrap_err();
        assert!(matches!(err, RunError::Cancelled));
        assert_eq!(orchestrator.workload().calls(), 0);
        assert!(matches!(
            orchestrator.report(),
            Err(ReportError::Query(drover::QueryError::NoData))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    #[ntest::timeout(10_000)]
    async fn phases_in_order() {
        init();

        let orchestrator = Orchestrator::from_config(
            Delay::fixed(Duration::from_millis(5)),
            config(2, 0, Duration::from_millis(300), Duration::from_millis(300)),
            1_024,
        );

        let mut phase = orchestrator.phase();
        let watcher = tokio::spawn(async move {
            let mut seen = vec![*phase.borrow_and_update()];
            while phase.changed().await.is_ok() {
                let current = *phase.borrow_and_update();
                seen.push(current);
                if current == Phase::Terminated {
                    break;
                }
            }
            seen
        });

        orchestrator.start(CancellationToken::new()).await.unwrap();
        let seen = watcher.await.unwrap();

        // Short-lived phases may be coalesced by the watch channel, but never reordered.
        assert_eq!(seen.first(), Some(&Phase::Idle));
        assert_eq!(seen.last(), Some(&Phase::Terminated));
        assert!(seen.contains(&Phase::Measuring));
        let order = [
            Phase::Idle,
            Phase::Initializing,
            Phase::WarmingUp,
            Phase::Measuring,
            Phase::Draining,
            Phase::Terminated,
        ];
        let positions: Vec<_> = seen
            .iter()
            .map(|p| order.iter().position(|o| o == p).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    #[ntest::timeout(10_000)]
    async fn report_after_run() -> anyhow::Result<()> {
        init();

        let workload = Delay {
            fail_every: 4,
            ..Delay::skewed(Duration::from_millis(10), Duration::from_millis(5))
        };
        let orchestrator = Orchestrator::from_config(
            workload,
            config(4, 100, Duration::from_millis(500), Duration::from_millis(100)),
            1_024,
        );
        orchestrator.start(CancellationToken::new()).await?;

        let report = orchestrator.report()?;
        println!("{report}");
        assert!(report.contains("* warm up time:   100ms"));
        assert!(report.contains("* duration:       500ms"));
        assert!(report.contains("* max concurrent: 4"));
        assert!(report.contains("* max RPS:        100"));
        assert!(report.contains("[Latency]"));

        let results = orchestrator.results();
        let total = orchestrator.template_report("{{.TotalRequests}}")?;
        assert_eq!(total, results.total().to_string());

        let histogram = orchestrator.template_report("{{.Histogram}}")?;
        println!("{histogram}");
        let lines = histogram.lines().count();
        assert!((1..=9).contains(&lines));
        Ok(())
    }
}
