// tests/orchestrator_protocol.rs
mod common;
use crate::common::{init_tracing, sh, with_timeout, TestResult};

use std::time::{Duration, Instant};

use pipejoin::engine::{run_pipeline, run_unit, RunOptions, StdStreams};
use pipejoin::errors::PipejoinError;
use pipejoin::exec::{join, join_all, ProcessUnit, Redirect};
use pipejoin::types::FailurePolicy;
use pipejoin_test_utils::fake_unit::{EventLog, RecordedUnit, ScriptedUnit, UnitEvent};

fn quiet_streams() -> StdStreams {
    StdStreams {
        stdin: Redirect::Null,
        stdout: Redirect::Null,
        stderr: Redirect::Null,
    }
}

fn fail_fast() -> RunOptions {
    RunOptions {
        policy: FailurePolicy::FailFast,
    }
}

#[tokio::test]
async fn empty_pipeline_is_a_no_op() -> TestResult {
    init_tracing();
    run_pipeline(Vec::new(), quiet_streams(), RunOptions::default()).await?;
    run_unit(None, quiet_streams(), fail_fast()).await?;
    Ok(())
}

#[tokio::test]
async fn failed_start_skips_wait() -> TestResult {
    init_tracing();
    let log = EventLog::new();

    let root = join(
        Some(ScriptedUnit::new("ok", &log).boxed()),
        Some(ScriptedUnit::new("broken", &log).failing_start().boxed()),
    )?;

    let err = run_unit(root, quiet_streams(), RunOptions::default())
        .await
        .expect_err("start must fail");
    assert!(matches!(err, PipejoinError::Launch { ref program, .. } if program == "broken"));

    let events = log.events();
    // Both sides were asked to start; neither was waited on.
    assert!(events.contains(&UnitEvent::Start { unit: "ok".into() }));
    assert!(events.contains(&UnitEvent::Start { unit: "broken".into() }));
    assert!(
        !events
            .iter()
            .any(|e| matches!(e, UnitEvent::WaitCalled { .. })),
        "wait must not be called after a failed start: {events:?}"
    );
    Ok(())
}

#[tokio::test]
async fn successful_start_is_followed_by_wait_on_every_leaf() -> TestResult {
    init_tracing();
    let log = EventLog::new();

    let units = ["a", "b", "c"].map(|name| ScriptedUnit::new(name, &log).boxed());
    run_unit(join_all(units)?, quiet_streams(), RunOptions::default()).await?;

    for name in ["a", "b", "c"] {
        let events = log.for_unit(name);
        let started = events
            .iter()
            .position(|e| matches!(e, UnitEvent::Start { .. }))
            .expect("leaf started");
        let waited = events
            .iter()
            .position(|e| matches!(e, UnitEvent::WaitCalled { .. }))
            .expect("leaf waited");
        assert!(started < waited);
    }
    Ok(())
}

async fn failing_pair(left_delay_ms: u64, right_delay_ms: u64) -> PipejoinError {
    let log = EventLog::new();
    let left = ScriptedUnit::new("left", &log)
        .wait_delay(Duration::from_millis(left_delay_ms))
        .exit_code(2);
    let right = ScriptedUnit::new("right", &log)
        .wait_delay(Duration::from_millis(right_delay_ms))
        .exit_code(5);

    let root = join(Some(left.boxed()), Some(right.boxed())).expect("join");
    with_timeout(run_unit(root, quiet_streams(), RunOptions::default()))
        .await
        .expect_err("both sides fail")
}

#[tokio::test]
async fn earlier_right_error_beats_later_left_error() -> TestResult {
    init_tracing();
    match failing_pair(300, 10).await {
        PipejoinError::Runtime { program, exit } => {
            assert_eq!(program, "right");
            assert_eq!(exit.code, Some(5));
        }
        other => panic!("expected Runtime error, got: {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn earlier_left_error_beats_later_right_error() -> TestResult {
    init_tracing();
    match failing_pair(10, 300).await {
        PipejoinError::Runtime { program, exit } => {
            assert_eq!(program, "left");
            assert_eq!(exit.code, Some(2));
        }
        other => panic!("expected Runtime error, got: {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn abort_signal_is_attached_only_under_fail_fast() -> TestResult {
    init_tracing();

    let log = EventLog::new();
    let root = join_all(["a", "b"].map(|name| ScriptedUnit::new(name, &log).boxed()))?;
    run_unit(root, quiet_streams(), RunOptions::default()).await?;
    assert!(
        !log.events()
            .iter()
            .any(|e| matches!(e, UnitEvent::Abort { .. }))
    );

    let log = EventLog::new();
    let root = join_all(["a", "b"].map(|name| ScriptedUnit::new(name, &log).boxed()))?;
    run_unit(root, quiet_streams(), fail_fast()).await?;
    for name in ["a", "b"] {
        assert!(log.for_unit(name).contains(&UnitEvent::Abort { unit: name.into() }));
    }
    Ok(())
}

#[tokio::test]
async fn run_to_completion_waits_out_a_slow_sibling() -> TestResult {
    init_tracing();
    let log = EventLog::new();
    let started = Instant::now();

    let root = join(
        Some(RecordedUnit::wrap("sleeper", &log, ProcessUnit::new(["sleep", "0.5"]))),
        Some(RecordedUnit::wrap("quitter", &log, ProcessUnit::new(sh("exit 4")))),
    )?;

    let err = with_timeout(run_unit(root, quiet_streams(), RunOptions::default()))
        .await
        .expect_err("right side exits 4");

    assert!(matches!(err, PipejoinError::Runtime { exit, .. } if exit.code == Some(4)));
    assert!(started.elapsed() >= Duration::from_millis(500));
    assert!(log.events().iter().any(|e| matches!(
        e,
        UnitEvent::WaitReturned { unit, ok: true, .. } if unit == "sleeper"
    )));
    Ok(())
}

#[tokio::test]
async fn fail_fast_kills_a_long_running_sibling() -> TestResult {
    init_tracing();
    let log = EventLog::new();

    let root = join(
        Some(RecordedUnit::wrap("sleeper", &log, ProcessUnit::new(["sleep", "30"]))),
        Some(RecordedUnit::wrap("quitter", &log, ProcessUnit::new(sh("exit 4")))),
    )?;

    let err = with_timeout(run_unit(root, quiet_streams(), fail_fast()))
        .await
        .expect_err("right side exits 4");

    // The abort of the sleeper is a consequence; the root cause is reported.
    assert!(matches!(err, PipejoinError::Runtime { exit, .. } if exit.code == Some(4)));
    assert!(log.events().iter().any(|e| matches!(
        e,
        UnitEvent::WaitReturned { unit, ok: false, .. } if unit == "sleeper"
    )));
    Ok(())
}
