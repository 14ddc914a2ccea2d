// tests/config_loading.rs
mod common;
use crate::common::init_tracing;

use std::io::Write;
use std::time::Duration;

use tempfile::NamedTempFile;

use runhook::config::{load_settings, ConfigOverrides};
use runhook::errors::RunhookError;

#[test]
fn full_config_file_is_resolved() {
    init_tracing();

    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[command]
name = "backup.sh"
args = ["--full", "--quiet"]
show_output = false
allowed_exit_codes = [0, 3]

[supervisor]
poll_interval = "2s"
max_poll_interval = "1m"
multiplier = 2.0
max_elapsed = "30m"
drain_timeout = "250ms"

[server]
host = "127.0.0.1"
port = 9090
exit_on_failure = false
"#
    )
    .unwrap();

    let settings = load_settings(Some(file.path()), ConfigOverrides::default()).unwrap();

    assert_eq!(settings.command.name, "backup.sh");
    assert_eq!(settings.command.args, vec!["--full", "--quiet"]);
    assert!(!settings.command.show_output);
    assert!(!settings.command.can_fail);
    assert!(settings.command.allows_exit_code(3));

    assert_eq!(settings.supervisor.poll_interval, Duration::from_secs(2));
    assert_eq!(settings.supervisor.max_poll_interval, Duration::from_secs(60));
    assert_eq!(settings.supervisor.multiplier, 2.0);
    assert_eq!(settings.supervisor.max_elapsed, Duration::from_secs(30 * 60));
    assert_eq!(settings.supervisor.drain_timeout, Duration::from_millis(250));

    assert_eq!(settings.server.host, "127.0.0.1");
    assert_eq!(settings.server.port, 9090);
    assert!(!settings.server.exit_on_failure);
}

#[test]
fn cli_command_replaces_file_command() {
    init_tracing();

    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[command]
name = "from-file"
args = ["x"]
"#
    )
    .unwrap();

    let overrides = ConfigOverrides {
        command: vec!["echo".to_string()],
        max_elapsed: Some("5m".to_string()),
        ..Default::default()
    };
    let settings = load_settings(Some(file.path()), overrides).unwrap();

    assert_eq!(settings.command.name, "echo");
    assert!(settings.command.args.is_empty());
    assert_eq!(settings.supervisor.max_elapsed, Duration::from_secs(300));
}

#[test]
fn invalid_toml_returns_structured_error() {
    init_tracing();

    let mut file = NamedTempFile::new().unwrap();
    write!(file, "[command\nname = ").unwrap();

    match load_settings(Some(file.path()), ConfigOverrides::default()) {
        Err(RunhookError::TomlError(_)) => {}
        other => panic!("expected TomlError, got {other:?}"),
    }
}

#[test]
fn missing_file_is_an_io_error() {
    init_tracing();

    let result = load_settings(
        Some(std::path::Path::new("/no/such/runhook.toml")),
        ConfigOverrides::default(),
    );
    assert!(matches!(result, Err(RunhookError::IoError(_))));
}

#[test]
fn no_command_anywhere_is_a_config_error() {
    init_tracing();

    match load_settings(None, ConfigOverrides::default()) {
        Err(RunhookError::ConfigError(msg)) => assert!(msg.contains("no command to run set")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}
