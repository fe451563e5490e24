// tests/build_loop_unix.rs
//
// Real processes through `sh`; unix only.
#![cfg(unix)]

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use nix::errno::Errno;
use nix::sys::signal::kill;
use nix::unistd::Pid;
use tokio::time::{sleep, Instant};

use wind::config::WatchConfig;
use wind::engine::{BuildRunLoop, CycleOutcome};
use wind::errors::WindError;
use wind::exec::{run_build, ProcessSupervisor};
use wind_test_utils::builders::{ProjectFixture, WatchConfigBuilder};
use wind_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

fn is_gone(pid: u32) -> bool {
    let pid = Pid::from_raw(pid as i32);
    matches!(kill(pid, None), Err(Errno::ESRCH))
}

fn build_loop(config: WatchConfig) -> Arc<BuildRunLoop> {
    Arc::new(BuildRunLoop::new(Arc::new(config)))
}

fn count_lines(project: &ProjectFixture, rel: &str) -> usize {
    std::fs::read_to_string(project.path(rel))
        .map(|s| s.lines().count())
        .unwrap_or(0)
}

#[tokio::test]
async fn cycle_builds_then_starts_application() -> TestResult {
    init_tracing();
    let project = ProjectFixture::new();
    let config = WatchConfigBuilder::new(project.root(), "echo built >> build.log")
        .run_cmd("sleep 30")
        .build();
    let lp = build_loop(config);

    let outcome = lp.build_and_run().await;
    let CycleOutcome::Started { pid, generation } = outcome else {
        panic!("expected Started, got {outcome:?}");
    };
    assert_eq!(generation, 1);
    assert_eq!(lp.current_pid().await, Some(pid));
    assert!(!lp.is_building().await);
    assert_eq!(count_lines(&project, "build.log"), 1);

    lp.shutdown().await;
    assert!(is_gone(pid));
    Ok(())
}

#[tokio::test]
async fn next_cycle_reaps_previous_generation() -> TestResult {
    init_tracing();
    let project = ProjectFixture::new();
    let config = WatchConfigBuilder::new(project.root(), "true")
        .run_cmd("sleep 30")
        .build();
    let lp = build_loop(config);

    let first = lp.build_and_run().await;
    let second = lp.build_and_run().await;

    let (CycleOutcome::Started { pid: old, .. }, CycleOutcome::Started { pid: new, generation }) =
        (first, second)
    else {
        panic!("expected two starts, got {first:?} / {second:?}");
    };
    assert_ne!(old, new);
    assert_eq!(generation, 2);
    assert!(is_gone(old), "previous generation {old} still alive");
    assert!(!is_gone(new));

    lp.shutdown().await;
    assert!(is_gone(new));
    Ok(())
}

#[tokio::test]
async fn trigger_during_build_is_skipped() -> TestResult {
    init_tracing();
    let project = ProjectFixture::new();
    let config = WatchConfigBuilder::new(project.root(), "echo b >> build.log; sleep 0.5")
        .run_cmd("sleep 30")
        .build();
    let lp = build_loop(config);

    let first = tokio::spawn({
        let lp = Arc::clone(&lp);
        async move { lp.build_and_run().await }
    });
    sleep(Duration::from_millis(150)).await;

    assert!(lp.is_building().await);
    assert_eq!(lp.build_and_run().await, CycleOutcome::Skipped);

    let outcome = with_timeout(first).await?;
    assert!(outcome.is_started(), "got {outcome:?}");
    assert_eq!(count_lines(&project, "build.log"), 1);
    assert_eq!(lp.generations_started().await, 1);

    lp.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn failed_build_leaves_nothing_running_until_fixed() -> TestResult {
    init_tracing();
    let project = ProjectFixture::new();
    let config = WatchConfigBuilder::new(project.root(), "test -f ok.flag")
        .run_cmd("sleep 30")
        .build();
    let lp = build_loop(config);

    assert_eq!(lp.build_and_run().await, CycleOutcome::BuildFailed);
    assert_eq!(lp.current_pid().await, None);
    assert!(!lp.is_building().await);

    project.write("ok.flag", "");
    assert!(lp.build_and_run().await.is_started());

    // A failing build after a good one still stops the old generation.
    let pid = lp.current_pid().await.ok_or("no pid")?;
    std::fs::remove_file(project.path("ok.flag"))?;
    assert_eq!(lp.build_and_run().await, CycleOutcome::BuildFailed);
    assert!(is_gone(pid));
    assert_eq!(lp.current_pid().await, None);

    lp.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn no_cycles_after_shutdown() -> TestResult {
    let project = ProjectFixture::new();
    let config = WatchConfigBuilder::new(project.root(), "echo b >> build.log")
        .run_cmd("sleep 30")
        .build();
    let lp = build_loop(config);

    lp.shutdown().await;
    lp.shutdown().await;

    assert_eq!(lp.build_and_run().await, CycleOutcome::ShuttingDown);
    assert_eq!(count_lines(&project, "build.log"), 0);
    assert_eq!(lp.generations_started().await, 0);
    Ok(())
}

#[tokio::test]
async fn shutdown_during_build_prevents_launch() -> TestResult {
    init_tracing();
    let project = ProjectFixture::new();
    let config = WatchConfigBuilder::new(project.root(), "sleep 0.5")
        .run_cmd("sleep 30")
        .build();
    let lp = build_loop(config);

    let cycle = tokio::spawn({
        let lp = Arc::clone(&lp);
        async move { lp.build_and_run().await }
    });
    sleep(Duration::from_millis(150)).await;

    // Returns without waiting for the build.
    let began = Instant::now();
    lp.shutdown().await;
    assert!(began.elapsed() < Duration::from_millis(300));

    assert_eq!(with_timeout(cycle).await?, CycleOutcome::ShuttingDown);
    assert_eq!(lp.current_pid().await, None);
    assert_eq!(lp.generations_started().await, 0);
    Ok(())
}

#[tokio::test]
async fn application_ignoring_sigterm_is_killed_after_timeout() -> TestResult {
    init_tracing();
    let project = ProjectFixture::new();
    let config = WatchConfigBuilder::new(project.root(), "true")
        .run_cmd("trap '' TERM; sleep 30")
        .stop_timeout_ms(300)
        .build();
    let lp = build_loop(config);

    let pid = match lp.build_and_run().await {
        CycleOutcome::Started { pid, .. } => pid,
        other => panic!("expected Started, got {other:?}"),
    };
    // Give the shell time to install the trap.
    sleep(Duration::from_millis(200)).await;

    let began = Instant::now();
    with_timeout(lp.shutdown()).await;
    let took = began.elapsed();

    assert!(took >= Duration::from_millis(300), "stopped after {took:?}");
    assert!(took < Duration::from_secs(3), "stopped after {took:?}");
    assert!(is_gone(pid));
    Ok(())
}

#[tokio::test]
async fn supervisor_stop_without_process_is_a_no_op() {
    let project = ProjectFixture::new();
    let mut sup = ProcessSupervisor::new(project.root(), Duration::from_secs(1));
    sup.stop().await;
    assert!(!sup.is_running());
    assert_eq!(sup.generations_started(), 0);
}

#[tokio::test]
async fn supervisor_start_in_missing_dir_is_launch_failure() {
    let project = ProjectFixture::new();
    let mut sup = ProcessSupervisor::new(project.path("gone"), Duration::from_secs(1));

    let res = sup.start("sleep 30").await;
    assert!(matches!(res, Err(WindError::LaunchFailed(_))), "got {res:?}");
    assert!(!sup.is_running());
    assert_eq!(sup.generations_started(), 0);
}

#[tokio::test]
async fn build_exit_status_is_reported() -> TestResult {
    let project = ProjectFixture::new();

    run_build("true", project.root()).await?;

    let res = run_build("exit 2", project.root()).await;
    assert!(matches!(res, Err(WindError::BuildFailed(_))), "got {res:?}");

    let res = run_build("true", &project.path("gone")).await;
    assert!(matches!(res, Err(WindError::BuildFailed(_))), "got {res:?}");
    Ok(())
}
