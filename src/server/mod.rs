// src/server/mod.rs

//! HTTP front end.
//!
//! - [`routes`] holds the router and the trigger handler.
//! - [`envelope`] parses the optional push-delivery body.
//!
//! A failed run is reported over an mpsc channel. With `exit_on_failure`
//! the first failure shuts the server down gracefully (in-flight responses
//! are allowed to finish) and [`serve`] returns
//! [`RunhookError::CommandFailed`], which `main` turns into a non-zero exit.

pub mod envelope;
pub mod routes;

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::Settings;
use crate::errors::{Result, RunhookError};
use crate::types::{CommandSpec, SupervisorOptions};

pub use routes::router;

/// Shared, read-only state for all requests.
#[derive(Debug, Clone)]
pub struct AppState {
    pub command: Arc<CommandSpec>,
    pub supervisor: SupervisorOptions,
    /// Failure reasons of finished runs.
    pub failures: mpsc::UnboundedSender<String>,
}

impl AppState {
    pub fn new(
        command: CommandSpec,
        supervisor: SupervisorOptions,
        failures: mpsc::UnboundedSender<String>,
    ) -> Self {
        Self {
            command: Arc::new(command),
            supervisor,
            failures,
        }
    }
}

/// Bind and serve until Ctrl-C or (with `exit_on_failure`) the first failed
/// run.
pub async fn serve(settings: Settings) -> Result<()> {
    let (failure_tx, failure_rx) = mpsc::unbounded_channel();
    let state = AppState::new(settings.command, settings.supervisor, failure_tx);
    let app = router(state);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {addr}");

    let shutdown = CancellationToken::new();
    let failures = tokio::spawn(watch_failures(
        failure_rx,
        settings.server.exit_on_failure,
        shutdown.clone(),
    ));

    {
        let shutdown = shutdown.clone();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    res = tokio::signal::ctrl_c() => {
                        if let Err(e) = res {
                            warn!(error = %e, "failed to listen for Ctrl+C");
                            return shutdown.cancelled().await;
                        }
                        info!("Ctrl-C received; shutting down");
                    }
                    _ = shutdown.cancelled() => {}
                }
            })
            .await?;
    }

    shutdown.cancel();
    match failures.await {
        Ok(Some(reason)) => Err(RunhookError::CommandFailed(reason)),
        Ok(None) => Ok(()),
        Err(e) => Err(RunhookError::Other(e.into())),
    }
}

/// Wait for run failures. Returns the first one that should stop the
/// server, or `None` if the server stopped for another reason.
async fn watch_failures(
    mut rx: mpsc::UnboundedReceiver<String>,
    exit_on_failure: bool,
    shutdown: CancellationToken,
) -> Option<String> {
    loop {
        tokio::select! {
            reason = rx.recv() => match reason {
                Some(reason) if exit_on_failure => {
                    info!(%reason, "run failed; shutting down");
                    shutdown.cancel();
                    return Some(reason);
                }
                Some(reason) => warn!(%reason, "run failed; continuing to serve"),
                None => return None,
            },
            _ = shutdown.cancelled() => return None,
        }
    }
}
