// src/exec/process.rs

//! Spawning a child process that is bound to a cancellation token.
//!
//! The child is moved into a wait task. That task resolves when the process
//! exits, or kills it as soon as the token is cancelled and then reports
//! the final wait result. Callers only see the one-shot completion.

use std::io;
use std::process::ExitStatus;

use tokio::process::{ChildStderr, ChildStdout, Command};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Completion result of the wait task.
pub type ExitResult = io::Result<ExitStatus>;

/// A running child whose lifetime is tied to a [`CancellationToken`].
#[derive(Debug)]
pub struct CancellableChild {
    pub pid: Option<u32>,
    pub stdout: Option<ChildStdout>,
    pub stderr: Option<ChildStderr>,
    /// Fires once with the exit status (or wait error).
    pub exited: oneshot::Receiver<ExitResult>,
}

/// Spawn `cmd` and hand ownership of the child to a wait task.
///
/// Cancelling `token` forcibly kills the process if it is still running.
/// `kill_on_drop` is always set, so a child can't outlive the runtime.
pub fn spawn_cancellable(mut cmd: Command, token: CancellationToken) -> io::Result<CancellableChild> {
    cmd.kill_on_drop(true);

    let mut child = cmd.spawn()?;
    let pid = child.id();
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let (exit_tx, exit_rx) = oneshot::channel();

    tokio::spawn(async move {
        let result = tokio::select! {
            status = child.wait() => status,
            _ = token.cancelled() => {
                debug!(pid, "cancellation requested; killing process");
                if let Err(e) = child.kill().await {
                    warn!(pid, error = %e, "failed to kill child process");
                }
                child.wait().await
            }
        };

        if exit_tx.send(result).is_err() {
            debug!(pid, "nobody waiting for process exit");
        }
    });

    Ok(CancellableChild {
        pid,
        stdout,
        stderr,
        exited: exit_rx,
    })
}

/// Numeric exit code, if the platform has one.
///
/// `None` means the process was terminated by a signal (or similar) and the
/// outcome can't be classified by code.
pub fn exit_code(status: &ExitStatus) -> Option<i32> {
    status.code()
}

#[cfg(test)]
mod tests {
    use std::process::Stdio;
    use std::time::Duration;

    use super::*;

    fn sh(script: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(script)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }

    #[tokio::test]
    async fn reports_exit_code() {
        let child = spawn_cancellable(sh("exit 3"), CancellationToken::new()).unwrap();
        let status = child.exited.await.unwrap().unwrap();
        assert_eq!(exit_code(&status), Some(3));
    }

    #[tokio::test]
    async fn cancelling_the_token_kills_the_child() {
        let token = CancellationToken::new();
        let child = spawn_cancellable(sh("sleep 30"), token.clone()).unwrap();
        assert!(child.pid.is_some());

        token.cancel();

        let status = tokio::time::timeout(Duration::from_secs(5), child.exited)
            .await
            .expect("child was not killed")
            .unwrap()
            .unwrap();

        assert!(!status.success());
        assert_eq!(exit_code(&status), None);
    }

    #[tokio::test]
    async fn spawn_failure_is_an_error() {
        let cmd = Command::new("/definitely/not/a/real/binary");
        assert!(spawn_cancellable(cmd, CancellationToken::new()).is_err());
    }
}
