#[allow(unused)]
use utils::*;

mod tests {
    use super::*;
    use drover::prelude::*;
    use std::time::{Duration, Instant};

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    #[ntest::timeout(10_000)]
    async fn single_slot_one_per_second() {
        init();

        let orchestrator = Orchestrator::from_config(
            Delay::fixed(Duration::from_millis(10)),
            config(1, 1, Duration::from_secs(3), Duration::ZERO),
            1_024,
        );

        let start = Instant::now();
        let results = orchestrator.start(CancellationToken::new()).await.unwrap();
        let elapsed = start.elapsed();

        // Admissions at 0s, 1s and 2s; one more may squeeze in right at the deadline.
        assert!((3..=4).contains(&dbg!(results.total())));
        assert_eq!(results.total(), orchestrator.workload().calls());
        assert!(elapsed >= Duration::from_secs(3));
        assert!(results.percentile_latency(100).unwrap() < 0.5);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    #[ntest::timeout(10_000)]
    async fn concurrency_bound_throughput() {
        init();

        let orchestrator = Orchestrator::from_config(
            Delay::fixed(Duration::from_millis(50)),
            config(4, 0, Duration::from_secs(1), Duration::ZERO),
            1_024,
        );

        let results = orchestrator.start(CancellationToken::new()).await.unwrap();

        // 4 slots of 50ms each allow at most 80 executions per second.
        let total = dbg!(results.total());
        assert!(total <= 84);
        assert!(total >= 40);
        assert!(results.percentile_latency(0).unwrap() >= 0.05);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    #[ntest::timeout(10_000)]
    async fn rate_bound_throughput() {
        init();

        let orchestrator = Orchestrator::from_config(
            Delay::skewed(Duration::from_millis(5), Duration::from_millis(2)),
            config(0, 50, Duration::from_secs(2), Duration::ZERO),
            1_024,
        );

        let results = orchestrator.start(CancellationToken::new()).await.unwrap();

        let total = dbg!(results.total());
        assert!(total <= 105);
        assert!(total >= 80);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    #[ntest::timeout(10_000)]
    async fn unbounded_run() {
        init();

        let orchestrator = Orchestrator::from_config(
            Delay::fixed(Duration::from_millis(1)),
            config(0, 0, Duration::from_millis(300), Duration::ZERO),
            1_000_000,
        );

        let start = Instant::now();
        let results = orchestrator.start(CancellationToken::new()).await.unwrap();

        assert!(dbg!(results.total()) > 100);
        assert_eq!(results.failed(), 0);
        assert_eq!(results.total(), orchestrator.workload().calls());
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    #[ntest::timeout(10_000)]
    async fn warm_up_excluded() {
        init();

        let orchestrator = Orchestrator::from_config(
            Delay::fixed(Duration::from_millis(5)),
            config(1, 10, Duration::from_secs(1), Duration::from_secs(1)),
            1_024,
        );

        let results = orchestrator.start(CancellationToken::new()).await.unwrap();

        // About 10 executions in each of the two periods; only the second is kept.
        let calls = dbg!(orchestrator.workload().calls());
        let total = dbg!(results.total());
        assert!(calls >= 17);
        assert!((7..=13).contains(&total));
        assert!(total < calls);
    }
}
