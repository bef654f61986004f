//! Virtual-user loop: drives a [`Scenario`] from `vus` concurrent tasks until
//! the deadline, the iteration budget, or cancellation.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use std::time::Instant;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{check::CheckRegistry, config::LoadConfig, scenario::Scenario, summary::RunSummary};

#[derive(Debug, Default)]
struct RunCounters {
    started: AtomicU64,
    completed: AtomicU64,
    transport_errors: AtomicU64,
}

impl RunCounters {
    /// Reserves one iteration slot; `false` once the budget is spent.
    fn try_start(&self, budget: Option<u64>) -> bool {
        match budget {
            None => {
                self.started.fetch_add(1, Ordering::Relaxed);
                true
            }
            Some(max) => self
                .started
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| (n < max).then_some(n + 1))
                .is_ok(),
        }
    }
}

pub struct LoadRunner {
    load: LoadConfig,
}

impl LoadRunner {
    pub fn new(load: LoadConfig) -> Self {
        Self { load }
    }

    /// Each call starts from fresh counters and check tallies.
    pub async fn run(&self, scenario: Arc<dyn Scenario>, shutdown: CancellationToken) -> RunSummary {
        let checks = CheckRegistry::new();
        let counters = Arc::new(RunCounters::default());
        let deadline = self.load.deadline();
        let budget = self.load.iterations;
        let start = Instant::now();

        info!(
            scenario = scenario.name(),
            vus = self.load.vus,
            duration_s = deadline.map(|d| d.as_secs()),
            iterations = budget,
            "starting load run"
        );

        let stop = shutdown.child_token();
        if let Some(limit) = deadline {
            let stop = stop.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = tokio::time::sleep(limit) => stop.cancel(),
                    _ = stop.cancelled() => {}
                }
            });
        }

        let mut vus = JoinSet::new();
        for vu in 0..self.load.vus {
            let scenario = Arc::clone(&scenario);
            let checks = checks.clone();
            let counters = Arc::clone(&counters);
            let stop = stop.clone();
            vus.spawn(async move {
                virtual_user(vu, scenario, checks, counters, budget, stop).await;
            });
        }

        while let Some(result) = vus.join_next().await {
            if let Err(e) = result {
                warn!(error = %e, "virtual user task ended abnormally");
            }
        }
        stop.cancel();

        let summary = RunSummary {
            scenario: scenario.name().to_string(),
            vus: self.load.vus,
            iterations: counters.completed.load(Ordering::Relaxed),
            transport_errors: counters.transport_errors.load(Ordering::Relaxed),
            elapsed: start.elapsed(),
            checks: checks.results(),
        };
        info!(
            iterations = summary.iterations,
            transport_errors = summary.transport_errors,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "load run finished"
        );
        summary
    }
}

async fn virtual_user(
    vu: usize,
    scenario: Arc<dyn Scenario>,
    checks: CheckRegistry,
    counters: Arc<RunCounters>,
    budget: Option<u64>,
    stop: CancellationToken,
) {
    let mut done = 0u64;
    while !stop.is_cancelled() && counters.try_start(budget) {
        tokio::select! {
            outcome = scenario.iteration(&checks) => {
                done += 1;
                counters.completed.fetch_add(1, Ordering::Relaxed);
                if outcome.transport_error.is_some() {
                    counters.transport_errors.fetch_add(1, Ordering::Relaxed);
                }
            }
            _ = stop.cancelled() => break,
        }
    }
    debug!(vu, iterations = done, "virtual user stopped");
}

/// Convenience for tests and one-off runs: `iterations` total, no deadline.
pub fn iterations_only(vus: usize, iterations: u64) -> LoadConfig {
    LoadConfig {
        vus,
        duration_seconds: None,
        iterations: Some(iterations),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicBool;
    use std::time::Duration;
    use crate::{
        config::TargetConfig,
        scenario::{IterationOutcome, WaveScenario, STATUS_OK_CHECK},
    };
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    async fn wave_target(status: u16) -> (MockServer, TargetConfig) {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/wave"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;
        let target = TargetConfig {
            base_url: server.uri(),
            think_time_ms: 10,
            ..TargetConfig::default()
        };
        (server, target)
    }

    /// Panics on its first iteration, passes afterwards.
    #[derive(Default)]
    struct PanicsOnce {
        panicked: AtomicBool,
    }

    #[async_trait]
    impl Scenario for PanicsOnce {
        fn name(&self) -> &str {
            "panics_once"
        }

        async fn iteration(&self, checks: &CheckRegistry) -> IterationOutcome {
            if !self.panicked.swap(true, Ordering::SeqCst) {
                panic!("virtual user blew up");
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
            IterationOutcome {
                status: Some(200),
                passed: checks.check(STATUS_OK_CHECK, true),
                transport_error: None,
                latency: Duration::ZERO,
            }
        }
    }

    #[test]
    fn test_budget_is_exact() {
        let counters = RunCounters::default();
        let granted = (0..10).filter(|_| counters.try_start(Some(4))).count();
        assert_eq!(granted, 4);
        assert!(counters.try_start(None));
    }

    #[tokio::test]
    async fn test_iteration_budget_shared_across_vus() {
        let (server, target) = wave_target(200).await;
        let scenario = Arc::new(WaveScenario::new(&target).unwrap());

        let runner = LoadRunner::new(iterations_only(4, 25));
        let summary = runner.run(scenario, CancellationToken::new()).await;

        assert_eq!(summary.iterations, 25);
        assert_eq!(summary.transport_errors, 0);
        assert_eq!(summary.checks[0].passes, 25);
        assert!(summary.all_checks_passed());
        assert_eq!(server.received_requests().await.unwrap().len(), 25);
    }

    #[tokio::test]
    async fn test_failed_status_aggregated() {
        let (_server, target) = wave_target(503).await;
        let scenario = Arc::new(WaveScenario::new(&target).unwrap());

        let summary = LoadRunner::new(iterations_only(2, 6))
            .run(scenario, CancellationToken::new())
            .await;

        assert_eq!(summary.iterations, 6);
        assert_eq!(summary.checks[0].fails, 6);
        assert!(!summary.all_checks_passed());
    }

    #[tokio::test]
    async fn test_duration_ends_run() {
        let (_server, target) = wave_target(200).await;
        let scenario = Arc::new(WaveScenario::new(&target).unwrap());
        let load = LoadConfig {
            vus: 2,
            duration_seconds: Some(1),
            iterations: None,
        };

        let summary = LoadRunner::new(load).run(scenario, CancellationToken::new()).await;

        assert!(summary.iterations > 0);
        assert!(summary.elapsed >= Duration::from_secs(1));
        assert!(summary.elapsed < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_cancellation_stops_virtual_users() {
        let (_server, mut target) = wave_target(200).await;
        target.think_time_ms = 1000;
        let scenario = Arc::new(WaveScenario::new(&target).unwrap());
        let load = LoadConfig {
            vus: 3,
            duration_seconds: Some(60),
            iterations: None,
        };

        let shutdown = CancellationToken::new();
        let trigger = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            trigger.cancel();
        });

        let start = Instant::now();
        let summary = LoadRunner::new(load).run(scenario, shutdown).await;
        assert!(start.elapsed() < Duration::from_secs(5));
        // Checks recorded before the interrupted pause are kept.
        assert_eq!(summary.checks[0].passes, 3);
    }

    #[tokio::test]
    async fn test_repeated_runs_start_fresh() {
        let (server, target) = wave_target(200).await;
        let scenario: Arc<dyn Scenario> = Arc::new(WaveScenario::new(&target).unwrap());
        let runner = LoadRunner::new(iterations_only(1, 3));

        let first = runner.run(Arc::clone(&scenario), CancellationToken::new()).await;
        let second = runner.run(scenario, CancellationToken::new()).await;

        assert_eq!(first.checks[0].passes, 3);
        assert_eq!(second.iterations, 3);
        assert_eq!(second.checks[0].passes, 3);
        assert_eq!(second.checks[0].fails, 0);
        assert_eq!(server.received_requests().await.unwrap().len(), 6);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_panicking_virtual_user_does_not_abort_run() {
        let summary = LoadRunner::new(iterations_only(2, 4))
            .run(Arc::new(PanicsOnce::default()), CancellationToken::new())
            .await;

        // The panicking VU consumed one slot; the other VU finishes the rest.
        assert_eq!(summary.iterations, 3);
        assert_eq!(summary.checks[0].passes, 3);
        assert!(summary.all_checks_passed());
    }
}
