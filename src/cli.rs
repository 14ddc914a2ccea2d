// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::ConfigOverrides;

/// Command-line arguments for `runhook`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "runhook",
    version,
    about = "Run a fixed command for every incoming HTTP request and stream its output back.",
    long_about = None
)]
pub struct CliArgs {
    /// Optional config file (TOML).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Address to bind.
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Port to listen on.
    #[arg(long, env = "PORT", value_name = "PORT")]
    pub port: Option<u16>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `RUNHOOK_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Only log command output; don't stream it to the caller.
    #[arg(long)]
    pub hide_output: bool,

    /// Report success even if the command fails.
    #[arg(long)]
    pub can_fail: bool,

    /// Exit code treated as success (repeatable). Replaces the default `0`.
    #[arg(long = "allowed-exit-code", value_name = "CODE", allow_negative_numbers = true)]
    pub allowed_exit_codes: Vec<i32>,

    /// Kill the command after this long (e.g. "60m").
    #[arg(long, value_name = "DURATION")]
    pub max_elapsed: Option<String>,

    /// First "still waiting" interval (e.g. "5s").
    #[arg(long, value_name = "DURATION")]
    pub poll_interval: Option<String>,

    /// Longest "still waiting" interval (e.g. "300s").
    #[arg(long, value_name = "DURATION")]
    pub max_poll_interval: Option<String>,

    /// Keep serving after a failed run instead of exiting with an error.
    #[arg(long)]
    pub keep_serving: bool,

    /// Resolve and print the configuration, but don't start the server.
    #[arg(long)]
    pub dry_run: bool,

    /// Command to run, followed by its arguments.
    #[arg(value_name = "COMMAND", trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

impl CliArgs {
    /// The subset of arguments that override config file values.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            command: self.command.clone(),
            hide_output: self.hide_output,
            can_fail: self.can_fail,
            allowed_exit_codes: self.allowed_exit_codes.clone(),
            poll_interval: self.poll_interval.clone(),
            max_poll_interval: self.max_poll_interval.clone(),
            max_elapsed: self.max_elapsed.clone(),
            host: self.host.clone(),
            port: self.port,
            keep_serving: self.keep_serving,
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
