// src/exec/context.rs

//! Per-request binding of cancellation and response output.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::sink::ProgressSink;

/// Ties one supervised run to one HTTP exchange.
///
/// `cancel` fires when the caller goes away; the sink is the response body.
/// Owned by exactly one supervisor.
#[derive(Debug)]
pub struct RunContext<S: ProgressSink> {
    cancel: CancellationToken,
    sink: S,
}

impl<S: ProgressSink> RunContext<S> {
    pub fn new(cancel: CancellationToken, sink: S) -> Self {
        Self { cancel, sink }
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Log a progress line and forward it to the caller, flushing right away.
    ///
    /// Once the caller has disconnected nothing more is written.
    pub fn write_progress(&mut self, message: &str) {
        info!("{message}");

        if self.cancel.is_cancelled() {
            debug!("caller disconnected; progress line not forwarded");
            return;
        }

        if let Err(e) = self.sink.write_line(message).and_then(|_| self.sink.flush()) {
            debug!(error = %e, "failed to write progress line");
        }
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}
