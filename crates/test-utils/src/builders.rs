#![allow(dead_code)]

use std::time::Duration;

use runhook::types::{CommandSpec, SupervisorOptions};

/// Builder for `CommandSpec` to simplify test setup.
pub struct CommandSpecBuilder {
    spec: CommandSpec,
}

impl CommandSpecBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            spec: CommandSpec::new(name, vec![]),
        }
    }

    /// Shorthand for `sh -c <script>`.
    pub fn shell(script: &str) -> Self {
        Self::new("sh").arg("-c").arg(script)
    }

    pub fn arg(mut self, arg: &str) -> Self {
        self.spec.args.push(arg.to_string());
        self
    }

    pub fn show_output(mut self, val: bool) -> Self {
        self.spec.show_output = val;
        self
    }

    pub fn can_fail(mut self, val: bool) -> Self {
        self.spec.can_fail = val;
        self
    }

    pub fn allow_exit_code(mut self, code: i32) -> Self {
        self.spec.allowed_exit_codes.insert(code);
        self
    }

    pub fn build(self) -> CommandSpec {
        self.spec
    }
}

/// Supervisor timings scaled down for tests.
///
/// Liveness ticks start at 100ms and the hard deadline is `max_elapsed`.
pub fn fast_options(max_elapsed: Duration) -> SupervisorOptions {
    SupervisorOptions {
        poll_interval: Duration::from_millis(100),
        max_poll_interval: Duration::from_millis(400),
        multiplier: 2.0,
        max_elapsed,
        drain_timeout: Duration::from_millis(500),
    }
}
