// tests/supervisor_termination.rs
mod common;
use crate::common::builders::{fast_options, CommandSpecBuilder};
use crate::common::{init_tracing, with_timeout, RecordingSink};

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use runhook::exec::{CommandSupervisor, RunContext};
use runhook::types::{RunFailure, RunOutcome};

type TestResult = Result<(), Box<dyn Error>>;

/// Time is paused, so the two-minute deadline is reached as soon as the
/// runtime goes idle while the child sleeps.
#[tokio::test(start_paused = true)]
async fn deadline_kills_the_command_exactly_once() -> TestResult {
    init_tracing();

    let spec = CommandSpecBuilder::shell("exec sleep 30").build();
    let sink = RecordingSink::new();
    let ctx = RunContext::new(CancellationToken::new(), sink.clone());
    let supervisor = CommandSupervisor::new(
        Arc::new(spec),
        fast_options(Duration::from_secs(120)),
        ctx,
    );

    let outcome = supervisor.run().await;

    assert_eq!(outcome, RunOutcome::TimedOut);
    assert!(!outcome.is_success());

    let lines = sink.lines();
    let timeouts = lines
        .iter()
        .filter(|l| l.starts_with("Command timed out"))
        .count();
    assert_eq!(timeouts, 1, "{lines:?}");
    assert_eq!(
        sink.last_line().as_deref(),
        Some("Command timed out in 2m0s: sh")
    );
    assert!(
        lines
            .iter()
            .any(|l| l.starts_with("[Still waiting for command to complete: sh --- ")),
        "{lines:?}"
    );

    Ok(())
}

/// Real clock: the child is confirmed gone once the run has returned.
#[cfg(target_os = "linux")]
#[tokio::test]
async fn timed_out_process_is_really_killed() -> TestResult {
    init_tracing();

    let pid_dir = tempfile::tempdir()?;
    let pid_file = pid_dir.path().join("pid");
    let script = format!("echo $$ > {}; exec sleep 30", pid_file.display());

    let spec = CommandSpecBuilder::shell(&script).build();
    let sink = RecordingSink::new();
    let ctx = RunContext::new(CancellationToken::new(), sink.clone());
    let supervisor = CommandSupervisor::new(
        Arc::new(spec),
        fast_options(Duration::from_secs(1)),
        ctx,
    );

    let outcome = with_timeout(supervisor.run()).await;
    assert_eq!(outcome, RunOutcome::TimedOut);

    // Sub-minute deadlines render as whole minutes, i.e. "0s".
    assert_eq!(
        sink.last_line().as_deref(),
        Some("Command timed out in 0s: sh")
    );

    let pid = std::fs::read_to_string(&pid_file)?;
    let proc_dir = std::path::PathBuf::from(format!("/proc/{}", pid.trim()));
    assert!(!proc_dir.exists(), "process {} is still alive", pid.trim());

    Ok(())
}

#[tokio::test]
async fn caller_disconnect_kills_the_command_and_silences_output() -> TestResult {
    init_tracing();

    let spec = CommandSpecBuilder::shell("echo started; while true; do echo tick; sleep 0.05; done").build();
    let sink = RecordingSink::new();
    let cancel = CancellationToken::new();
    let ctx = RunContext::new(cancel.clone(), sink.clone());
    let supervisor = CommandSupervisor::new(
        Arc::new(spec),
        fast_options(Duration::from_secs(60)),
        ctx,
    );

    let handle = tokio::spawn(supervisor.run());

    with_timeout(async {
        while !sink.contains("started") {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;

    cancel.cancel();
    let written_at_cancel = sink.lines().len();

    let outcome = with_timeout(handle).await?;

    match outcome {
        RunOutcome::Failed(RunFailure::Error(msg)) => assert!(msg.contains("signal"), "{msg}"),
        other => panic!("expected the command to be killed, got {other:?}"),
    }

    assert_eq!(
        sink.lines().len(),
        written_at_cancel,
        "lines were written after the caller went away: {:?}",
        sink.lines()
    );

    Ok(())
}

#[tokio::test]
async fn slow_command_gets_liveness_lines() -> TestResult {
    init_tracing();

    let spec = CommandSpecBuilder::new("sleep").arg("2").build();
    let sink = RecordingSink::new();
    let ctx = RunContext::new(CancellationToken::new(), sink.clone());
    let supervisor = CommandSupervisor::new(
        Arc::new(spec),
        fast_options(Duration::from_secs(60)),
        ctx,
    );

    let outcome = with_timeout(supervisor.run()).await;
    assert_eq!(outcome, RunOutcome::Succeeded);

    let lines = sink.lines();
    assert!(
        lines
            .iter()
            .any(|l| l.starts_with("[Still waiting for command to complete: sleep --- 1s]")),
        "{lines:?}"
    );
    assert_eq!(
        sink.last_line().as_deref(),
        Some("Command completed in 2s: sleep")
    );

    Ok(())
}
