// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod server;
pub mod types;

use tracing::debug;

use crate::cli::CliArgs;
use crate::config::{Settings, load_settings};
use crate::errors::Result;
use crate::exec::duration::format_duration;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (file + CLI overrides)
/// - the HTTP server, which runs one supervised command per request
/// - failure propagation back to the caller of `run`
pub async fn run(args: CliArgs) -> Result<()> {
    let settings = load_settings(args.config.as_deref(), args.overrides())?;

    if args.dry_run {
        print_dry_run(&settings);
        return Ok(());
    }

    server::serve(settings).await
}

/// Simple dry-run output: print the resolved command and timings.
fn print_dry_run(settings: &Settings) {
    let cmd = &settings.command;
    let sup = &settings.supervisor;

    println!("runhook dry-run");
    println!("  command: {}", cmd.name);
    if !cmd.args.is_empty() {
        println!("  args: {:?}", cmd.args);
    }
    println!("  show_output: {}", cmd.show_output);
    println!("  can_fail: {}", cmd.can_fail);
    println!("  allowed_exit_codes: {:?}", cmd.allowed_exit_codes);
    println!();
    println!("  poll_interval: {:?}", sup.poll_interval);
    println!("  max_poll_interval: {:?}", sup.max_poll_interval);
    println!("  multiplier: {}", sup.multiplier);
    println!("  max_elapsed: {}", format_duration(sup.max_elapsed));
    println!("  drain_timeout: {:?}", sup.drain_timeout);
    println!();
    println!(
        "  listen: {}:{} (exit_on_failure = {})",
        settings.server.host, settings.server.port, settings.server.exit_on_failure
    );

    debug!("dry-run complete (server not started)");
}
