// src/exec/supervisor.rs

//! The command supervisor: one subprocess, start to finish.
//!
//! A single `select!` loop merges three sources:
//! - subprocess output lines (from the [`multiplexer`](super::multiplexer)),
//! - deadline ticks (liveness lines + hard timeout),
//! - process completion (from the wait task in [`process`](super::process)).
//!
//! The loop ends on completion only. Termination, whether from the timeout
//! or from the caller going away, always goes through the cancellation
//! token the child was spawned with, so completion still arrives as a
//! regular event.

use std::io;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, timeout_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::errors::SetupError;
use crate::types::{CommandSpec, RunFailure, RunOutcome, SupervisorOptions};

use super::context::RunContext;
use super::duration::{format_duration, truncate_to_mins, truncate_to_secs};
use super::multiplexer::{self, OutputEvent};
use super::process::{ExitResult, exit_code, spawn_cancellable};
use super::sink::ProgressSink;
use super::ticker::{DeadlineTicker, Tick};

/// Minimum spacing between two "still waiting" lines.
const LIVENESS_SPACING: Duration = Duration::from_secs(1);

/// Handles for a process that has been launched successfully.
struct Started {
    started_at: Instant,
    kill: CancellationToken,
    output: mpsc::UnboundedReceiver<OutputEvent>,
    exited: oneshot::Receiver<ExitResult>,
}

pub struct CommandSupervisor<S: ProgressSink> {
    spec: Arc<CommandSpec>,
    options: SupervisorOptions,
    ctx: RunContext<S>,
}

impl<S: ProgressSink> CommandSupervisor<S> {
    pub fn new(spec: Arc<CommandSpec>, options: SupervisorOptions, ctx: RunContext<S>) -> Self {
        Self { spec, options, ctx }
    }

    /// Run the command to completion and classify the result.
    ///
    /// The last progress line written is always the terminal one
    /// (completed / failed / timed out).
    pub async fn run(mut self) -> RunOutcome {
        let name = self.spec.name.clone();
        self.ctx.write_progress(&format!("Running command: {name}"));
        info!(command = %name, args = ?self.spec.args, "spawning command");

        let started = match self.start() {
            Ok(started) => started,
            Err(e) => {
                error!(command = %name, error = %e, "command setup failed");
                self.ctx.write_progress(&format!("Command failed to start: {e}"));
                return RunOutcome::Failed(RunFailure::Error(e.to_string()));
            }
        };

        self.supervise(started).await
    }

    fn start(&self) -> Result<Started, SetupError> {
        let mut cmd = Command::new(&self.spec.name);
        cmd.args(&self.spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        // Child of the request token: a caller disconnect cancels it too,
        // and the timeout path can cancel it on its own.
        let kill = self.ctx.cancel_token().child_token();

        let started_at = Instant::now();
        let mut child = spawn_cancellable(cmd, kill.clone()).map_err(SetupError::Spawn)?;

        let Some(stdout) = child.stdout.take() else {
            kill.cancel();
            return Err(SetupError::StdoutPipe);
        };
        let Some(stderr) = child.stderr.take() else {
            kill.cancel();
            return Err(SetupError::StderrPipe);
        };

        debug!(command = %self.spec.name, pid = child.pid, "process started");

        Ok(Started {
            started_at,
            kill,
            output: multiplexer::attach(stdout, stderr),
            exited: child.exited,
        })
    }

    async fn supervise(&mut self, started: Started) -> RunOutcome {
        let Started {
            started_at,
            kill,
            mut output,
            mut exited,
        } = started;

        let name = self.spec.name.clone();
        let mut ticker = DeadlineTicker::new(&self.options);
        let mut last_liveness = Instant::now();
        let mut output_open = true;
        let mut timed_out = false;

        let result = loop {
            tokio::select! {
                event = output.recv(), if output_open => match event {
                    Some(event) => self.forward_output(event, !timed_out),
                    None => output_open = false,
                },

                tick = ticker.tick() => match tick {
                    Tick::Interval(now) => {
                        if now.duration_since(last_liveness) > LIVENESS_SPACING {
                            let elapsed = truncate_to_secs(now.duration_since(started_at));
                            self.ctx.write_progress(&format!(
                                "[Still waiting for command to complete: {} --- {}]",
                                name,
                                format_duration(elapsed)
                            ));
                            last_liveness = Instant::now();
                        }
                    }
                    Tick::Expired => {
                        if !timed_out {
                            ticker.stop();
                            warn!(command = %name, "execution deadline exceeded; killing process");
                            kill.cancel();
                            self.ctx.write_progress(&format!(
                                "Command timed out in {}: {}",
                                format_duration(truncate_to_mins(self.options.max_elapsed)),
                                name
                            ));
                            timed_out = true;
                        }
                    }
                },

                res = &mut exited => {
                    break res.unwrap_or_else(|_| {
                        Err(io::Error::other("process wait task ended without a result"))
                    });
                }
            }
        };

        ticker.stop();
        let elapsed = truncate_to_secs(started_at.elapsed());

        if self.ctx.cancel_token().is_cancelled() {
            info!(command = %name, "caller disconnected; command terminated");
        }

        if output_open {
            self.drain_output(&mut output, !timed_out).await;
        }

        let outcome = classify(&self.spec, &result, timed_out);
        self.report(&outcome, &result, elapsed);
        outcome
    }

    /// Collect lines still buffered after exit, bounded by `drain_timeout`.
    async fn drain_output(&mut self, output: &mut mpsc::UnboundedReceiver<OutputEvent>, surface: bool) {
        let deadline = Instant::now() + self.options.drain_timeout;
        loop {
            match timeout_at(deadline, output.recv()).await {
                Ok(Some(event)) => self.forward_output(event, surface),
                Ok(None) => break,
                Err(_) => {
                    debug!(command = %self.spec.name, "output still open after exit; giving up on drain");
                    break;
                }
            }
        }
    }

    fn forward_output(&mut self, event: OutputEvent, surface: bool) {
        if surface && self.spec.show_output {
            self.ctx.write_progress(&event.line);
        } else {
            info!(command = %self.spec.name, stream = %event.stream, "{}", event.line);
        }
    }

    /// Write the terminal line for `outcome`.
    fn report(&mut self, outcome: &RunOutcome, result: &ExitResult, elapsed: Duration) {
        let name = &self.spec.name;
        let elapsed = format_duration(elapsed);

        match outcome {
            RunOutcome::Succeeded => {
                self.ctx
                    .write_progress(&format!("Command completed in {elapsed}: {name}"));
            }
            RunOutcome::SucceededIgnoredFailure => {
                let reason = describe(result);
                warn!(command = %name, error = %reason, "command failed; ignoring error");
                self.ctx.write_progress(&format!(
                    "Warning, command failed (ignoring error) in {elapsed}: {reason}"
                ));
            }
            RunOutcome::SucceededAllowedExitCode(code) => {
                info!(command = %name, exit_code = code, "command exited with an allowed status code");
                self.ctx.write_progress(&format!(
                    "Command completed with allowed status code in {elapsed}: {code}"
                ));
            }
            RunOutcome::TimedOut => {
                // The timeout line was already written when the kill happened.
                error!(command = %name, %elapsed, "command timed out");
            }
            RunOutcome::Failed(RunFailure::ExitCode(code)) => {
                error!(command = %name, exit_code = code, "command exited with a failing status code");
                self.ctx.write_progress(&format!(
                    "Command exited with status code in {elapsed}: {code}"
                ));
            }
            RunOutcome::Failed(RunFailure::Error(msg)) => {
                error!(command = %name, error = %msg, "command failed");
                self.ctx
                    .write_progress(&format!("Command failed in {elapsed}: {msg}"));
            }
        }
    }
}

/// Map a process result onto a [`RunOutcome`].
///
/// A timeout wins over everything else; a clean exit wins over `can_fail`.
pub fn classify(spec: &CommandSpec, result: &ExitResult, timed_out: bool) -> RunOutcome {
    if timed_out {
        return RunOutcome::TimedOut;
    }

    if let Ok(status) = result {
        if status.success() {
            return RunOutcome::Succeeded;
        }
    }

    if spec.can_fail {
        return RunOutcome::SucceededIgnoredFailure;
    }

    match result {
        Ok(status) => match exit_code(status) {
            Some(code) if spec.allows_exit_code(code) => RunOutcome::SucceededAllowedExitCode(code),
            Some(code) => RunOutcome::Failed(RunFailure::ExitCode(code)),
            None => RunOutcome::Failed(RunFailure::Error(status.to_string())),
        },
        Err(e) => RunOutcome::Failed(RunFailure::Error(e.to_string())),
    }
}

fn describe(result: &ExitResult) -> String {
    match result {
        Ok(status) => status.to_string(),
        Err(e) => e.to_string(),
    }
}
