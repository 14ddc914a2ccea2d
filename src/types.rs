use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

/// What to run for every triggered request.
///
/// Built once at startup from the CLI / config file and shared read-only
/// between requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: String,
    pub args: Vec<String>,
    /// Forward subprocess output lines to the caller (otherwise log only).
    pub show_output: bool,
    /// Treat any failure as success (logged as a warning).
    pub can_fail: bool,
    /// Exit codes that still count as success.
    pub allowed_exit_codes: BTreeSet<i32>,
}

impl CommandSpec {
    pub fn new(name: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            args,
            show_output: true,
            can_fail: false,
            allowed_exit_codes: BTreeSet::from([0]),
        }
    }

    pub fn allows_exit_code(&self, code: i32) -> bool {
        self.allowed_exit_codes.contains(&code)
    }
}

/// Timing knobs for the supervisor's deadline ticker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SupervisorOptions {
    /// First liveness interval.
    pub poll_interval: Duration,
    /// Upper bound on a single liveness interval.
    pub max_poll_interval: Duration,
    /// Growth factor applied to the interval after every tick.
    pub multiplier: f64,
    /// Hard execution deadline; the process is killed once exceeded.
    pub max_elapsed: Duration,
    /// How long to keep collecting buffered output after the process exits.
    pub drain_timeout: Duration,
}

impl Default for SupervisorOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            max_poll_interval: Duration::from_secs(300),
            multiplier: 1.5,
            max_elapsed: Duration::from_secs(60 * 60),
            drain_timeout: Duration::from_secs(1),
        }
    }
}

/// Why a run did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunFailure {
    /// The process exited with a code outside the allowed set.
    ExitCode(i32),
    /// Setup failed, the process was killed by a signal, or its status
    /// could not be obtained.
    Error(String),
}

/// Terminal classification of one supervised run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Succeeded,
    SucceededAllowedExitCode(i32),
    SucceededIgnoredFailure,
    TimedOut,
    Failed(RunFailure),
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            RunOutcome::Succeeded
                | RunOutcome::SucceededAllowedExitCode(_)
                | RunOutcome::SucceededIgnoredFailure
        )
    }

    /// Human-readable reason for a non-successful outcome.
    pub fn failure_message(&self) -> Option<String> {
        match self {
            RunOutcome::TimedOut => Some("command timed out".to_string()),
            RunOutcome::Failed(RunFailure::ExitCode(code)) => {
                Some(format!("command exited with status code {code}"))
            }
            RunOutcome::Failed(RunFailure::Error(msg)) => Some(msg.clone()),
            _ => None,
        }
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Succeeded => write!(f, "succeeded"),
            RunOutcome::SucceededAllowedExitCode(code) => {
                write!(f, "succeeded (allowed exit code {code})")
            }
            RunOutcome::SucceededIgnoredFailure => write!(f, "succeeded (failure ignored)"),
            RunOutcome::TimedOut => write!(f, "timed out"),
            RunOutcome::Failed(RunFailure::ExitCode(code)) => write!(f, "failed (exit code {code})"),
            RunOutcome::Failed(RunFailure::Error(msg)) => write!(f, "failed ({msg})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_spec_only_allows_zero() {
        let spec = CommandSpec::new("true", vec![]);
        assert!(spec.show_output);
        assert!(!spec.can_fail);
        assert!(spec.allows_exit_code(0));
        assert!(!spec.allows_exit_code(1));
    }

    #[test]
    fn only_failures_have_a_failure_message() {
        assert!(RunOutcome::Succeeded.failure_message().is_none());
        assert!(RunOutcome::SucceededAllowedExitCode(3).failure_message().is_none());
        assert!(RunOutcome::SucceededIgnoredFailure.failure_message().is_none());
        assert_eq!(
            RunOutcome::Failed(RunFailure::ExitCode(1)).failure_message().as_deref(),
            Some("command exited with status code 1")
        );
        assert!(!RunOutcome::TimedOut.is_success());
    }
}
