// src/config/validate.rs

use std::collections::BTreeSet;
use std::time::Duration;

use tracing::info;

use crate::config::model::{DEFAULT_PORT, RawConfigFile, ServerSettings, Settings};
use crate::errors::{Result, RunhookError};
use crate::exec::duration::parse_duration;
use crate::types::{CommandSpec, SupervisorOptions};

/// Upper bound for every `[supervisor]` duration.
const MAX_DURATION: Duration = Duration::from_secs(7 * 24 * 60 * 60);

impl TryFrom<RawConfigFile> for Settings {
    type Error = RunhookError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let command = resolve_command(&raw)?;
        let supervisor = resolve_supervisor(&raw)?;
        let server = resolve_server(&raw);
        Ok(Settings {
            command,
            supervisor,
            server,
        })
    }
}

fn resolve_command(cfg: &RawConfigFile) -> Result<CommandSpec> {
    let name = match cfg.command.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => {
            return Err(RunhookError::ConfigError(
                "no command to run set (pass it after `--` or set [command].name)".to_string(),
            ));
        }
    };

    if cfg.command.allowed_exit_codes.is_empty() {
        return Err(RunhookError::ConfigError(
            "[command].allowed_exit_codes must not be empty".to_string(),
        ));
    }

    Ok(CommandSpec {
        name,
        args: cfg.command.args.clone(),
        show_output: cfg.command.show_output,
        can_fail: cfg.command.can_fail,
        allowed_exit_codes: cfg.command.allowed_exit_codes.iter().copied().collect::<BTreeSet<_>>(),
    })
}

fn resolve_supervisor(cfg: &RawConfigFile) -> Result<SupervisorOptions> {
    let s = &cfg.supervisor;

    let poll_interval = duration_field("poll_interval", &s.poll_interval)?;
    let max_poll_interval = duration_field("max_poll_interval", &s.max_poll_interval)?;
    let max_elapsed = duration_field("max_elapsed", &s.max_elapsed)?;
    let drain_timeout = duration_field("drain_timeout", &s.drain_timeout)?;

    if poll_interval.is_zero() {
        return Err(RunhookError::ConfigError(
            "[supervisor].poll_interval must be > 0".to_string(),
        ));
    }
    if max_poll_interval < poll_interval {
        return Err(RunhookError::ConfigError(format!(
            "[supervisor].max_poll_interval ({}) must be >= poll_interval ({})",
            s.max_poll_interval, s.poll_interval
        )));
    }
    if !s.multiplier.is_finite() || s.multiplier < 1.0 {
        return Err(RunhookError::ConfigError(format!(
            "[supervisor].multiplier must be >= 1.0 (got {})",
            s.multiplier
        )));
    }
    if max_elapsed.is_zero() {
        return Err(RunhookError::ConfigError(
            "[supervisor].max_elapsed must be > 0".to_string(),
        ));
    }

    Ok(SupervisorOptions {
        poll_interval,
        max_poll_interval,
        multiplier: s.multiplier,
        max_elapsed,
        drain_timeout,
    })
}

fn resolve_server(cfg: &RawConfigFile) -> ServerSettings {
    let port = cfg.server.port.unwrap_or_else(|| {
        info!("Defaulting to port {}", DEFAULT_PORT);
        DEFAULT_PORT
    });

    ServerSettings {
        host: cfg.server.host.clone(),
        port,
        exit_on_failure: cfg.server.exit_on_failure,
    }
}

fn duration_field(field: &str, value: &str) -> Result<Duration> {
    let d = parse_duration(value).map_err(|e| {
        RunhookError::ConfigError(format!("[supervisor].{field}: {e}"))
    })?;
    if d > MAX_DURATION {
        return Err(RunhookError::ConfigError(format!(
            "[supervisor].{field} ({value}) must be at most 168h"
        )));
    }
    Ok(d)
}
