#![cfg(test)]
//! Load Testing Suite for the wave service
//!
//! Drives the real service in-process with the wave scenario:
//! - Many virtual users posting waves at the scripted one-second pace
//! - Sustained mixed read/write runs
//! - Counter consistency after the run

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use wave_loadtest::api;
use wave_loadtest::config::{Config, LoadConfig, TargetConfig};
use wave_loadtest::runner::{iterations_only, LoadRunner};
use wave_loadtest::scenario::{CountScenario, Scenario, WaveScenario};
use wave_loadtest::state::AppState;

async fn spawn_service() -> SocketAddr {
    let app = api::router(AppState::new(Config::default()));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn target(addr: SocketAddr, think_time_ms: u64) -> TargetConfig {
    TargetConfig {
        base_url: format!("http://{addr}"),
        think_time_ms,
        ..TargetConfig::default()
    }
}

async fn current_count(addr: SocketAddr) -> u64 {
    let body: serde_json::Value = reqwest::get(format!("http://{addr}/get_count"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    body["count"].as_u64().unwrap()
}

/// Test: 100 virtual users at the scripted one-second pace
///
/// Every iteration must pass its status check and the service counter must
/// match the number of iterations exactly.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore] // Ignore by default as this is a slow test
async fn test_hundred_vus_at_script_pace() {
    let addr = spawn_service().await;
    let scenario: Arc<dyn Scenario> = Arc::new(WaveScenario::new(&target(addr, 1000)).unwrap());

    let start = Instant::now();
    let summary = LoadRunner::new(iterations_only(100, 500))
        .run(scenario, CancellationToken::new())
        .await;
    let elapsed = start.elapsed();

    println!("{summary}");

    assert_eq!(summary.iterations, 500);
    assert!(summary.all_checks_passed());
    assert_eq!(summary.transport_errors, 0);
    assert_eq!(current_count(addr).await, 500);

    // 5 rounds of one-second pauses per virtual user
    assert!(elapsed >= Duration::from_secs(5), "finished too fast: {elapsed:?}");
}

/// Test: sustained mixed read/write load
///
/// Writers and readers run side by side for a fixed duration without any
/// failed checks.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore] // Ignore by default as this is a slow test
async fn test_sustained_mixed_load() {
    let addr = spawn_service().await;
    let load = LoadConfig {
        vus: 20,
        duration_seconds: Some(5),
        iterations: None,
    };

    let writers: Arc<dyn Scenario> = Arc::new(WaveScenario::new(&target(addr, 50)).unwrap());
    let readers: Arc<dyn Scenario> = Arc::new(CountScenario::new(&target(addr, 50)).unwrap());

    let write_runner = LoadRunner::new(load.clone());
    let read_runner = LoadRunner::new(load);
    let (writes, reads) = tokio::join!(
        write_runner.run(writers, CancellationToken::new()),
        read_runner.run(readers, CancellationToken::new()),
    );

    println!("{writes}\n\n{reads}");

    assert!(writes.all_checks_passed());
    assert!(reads.all_checks_passed());
    assert!(writes.iterations > 100, "only {} writes", writes.iterations);
    assert_eq!(current_count(addr).await, writes.iterations);
}

/// Benchmark: throughput with no think time
///
/// Measures how many waves per second the in-memory service absorbs.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore] // Ignore by default as this is a slow test
async fn test_throughput_benchmark() {
    let addr = spawn_service().await;
    let scenario: Arc<dyn Scenario> = Arc::new(WaveScenario::new(&target(addr, 0)).unwrap());

    let summary = LoadRunner::new(LoadConfig {
        vus: 32,
        duration_seconds: Some(3),
        iterations: None,
    })
    .run(scenario, CancellationToken::new())
    .await;

    println!(
        "Throughput: {:.0} waves/second ({} waves in {:?})",
        summary.iteration_rate(),
        summary.iterations,
        summary.elapsed
    );

    assert!(summary.all_checks_passed());
    assert!(
        summary.iteration_rate() > 100.0,
        "Throughput too low: {:.0} waves/s",
        summary.iteration_rate()
    );
}
