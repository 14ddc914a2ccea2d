use serde::Deserialize;

use crate::types::{CommandSpec, SupervisorOptions};

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [command]
/// name = "backup.sh"
/// args = ["--full"]
/// allowed_exit_codes = [0, 3]
///
/// [supervisor]
/// max_elapsed = "30m"
///
/// [server]
/// port = 8080
/// ```
///
/// All sections are optional; the command can also come from the CLI.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub command: CommandSection,

    #[serde(default)]
    pub supervisor: SupervisorSection,

    #[serde(default)]
    pub server: ServerSection,
}

/// `[command]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandSection {
    /// Program to execute. Required, either here or on the command line.
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub args: Vec<String>,

    /// Forward output lines to the caller instead of only logging them.
    #[serde(default = "default_true")]
    pub show_output: bool,

    /// Report success even when the command fails.
    #[serde(default)]
    pub can_fail: bool,

    #[serde(default = "default_allowed_exit_codes")]
    pub allowed_exit_codes: Vec<i32>,
}

impl Default for CommandSection {
    fn default() -> Self {
        Self {
            name: None,
            args: Vec::new(),
            show_output: true,
            can_fail: false,
            allowed_exit_codes: default_allowed_exit_codes(),
        }
    }
}

/// `[supervisor]` section. Durations use the `"5s"` / `"250ms"` / `"60m"`
/// form.
#[derive(Debug, Clone, Deserialize)]
pub struct SupervisorSection {
    #[serde(default = "default_poll_interval")]
    pub poll_interval: String,

    #[serde(default = "default_max_poll_interval")]
    pub max_poll_interval: String,

    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    #[serde(default = "default_max_elapsed")]
    pub max_elapsed: String,

    #[serde(default = "default_drain_timeout")]
    pub drain_timeout: String,
}

impl Default for SupervisorSection {
    fn default() -> Self {
        Self {
            poll_interval: default_poll_interval(),
            max_poll_interval: default_max_poll_interval(),
            multiplier: default_multiplier(),
            max_elapsed: default_max_elapsed(),
            drain_timeout: default_drain_timeout(),
        }
    }
}

/// `[server]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,

    /// If `None` (and not given via `--port` / `PORT`), 8080 is used.
    #[serde(default)]
    pub port: Option<u16>,

    /// Shut the server down with a failing exit status when a run fails.
    #[serde(default = "default_true")]
    pub exit_on_failure: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: None,
            exit_on_failure: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_allowed_exit_codes() -> Vec<i32> {
    vec![0]
}

fn default_poll_interval() -> String {
    "5s".to_string()
}

fn default_max_poll_interval() -> String {
    "300s".to_string()
}

fn default_multiplier() -> f64 {
    1.5
}

fn default_max_elapsed() -> String {
    "60m".to_string()
}

fn default_drain_timeout() -> String {
    "1s".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub const DEFAULT_PORT: u16 = 8080;

/// Values given on the command line; `None` / `false` means "not given".
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Program followed by its arguments.
    pub command: Vec<String>,
    pub hide_output: bool,
    pub can_fail: bool,
    pub allowed_exit_codes: Vec<i32>,
    pub poll_interval: Option<String>,
    pub max_poll_interval: Option<String>,
    pub max_elapsed: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub keep_serving: bool,
}

impl RawConfigFile {
    /// Layer command-line values on top of the file contents.
    pub fn apply_overrides(&mut self, o: ConfigOverrides) {
        if let Some((name, args)) = o.command.split_first() {
            self.command.name = Some(name.clone());
            self.command.args = args.to_vec();
        }
        if o.hide_output {
            self.command.show_output = false;
        }
        if o.can_fail {
            self.command.can_fail = true;
        }
        if !o.allowed_exit_codes.is_empty() {
            self.command.allowed_exit_codes = o.allowed_exit_codes;
        }
        if let Some(v) = o.poll_interval {
            self.supervisor.poll_interval = v;
        }
        if let Some(v) = o.max_poll_interval {
            self.supervisor.max_poll_interval = v;
        }
        if let Some(v) = o.max_elapsed {
            self.supervisor.max_elapsed = v;
        }
        if let Some(v) = o.host {
            self.server.host = v;
        }
        if o.port.is_some() {
            self.server.port = o.port;
        }
        if o.keep_serving {
            self.server.exit_on_failure = false;
        }
    }
}

/// Resolved server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub exit_on_failure: bool,
}

/// Fully validated configuration.
///
/// Only constructible through `TryFrom<RawConfigFile>`, which performs all
/// checks.
#[derive(Debug, Clone)]
pub struct Settings {
    pub command: CommandSpec,
    pub supervisor: SupervisorOptions,
    pub server: ServerSettings,
}
