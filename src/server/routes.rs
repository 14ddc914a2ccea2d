// src/server/routes.rs

//! HTTP handlers.

use std::convert::Infallible;
use std::pin::pin;

use axum::Router;
use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::exec::{ChannelSink, CommandSupervisor, RunContext};

use super::AppState;
use super::envelope;

/// Build the application router.
///
/// Every path except `/healthz` triggers a run.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .fallback(trigger)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// Launch the configured command and stream its progress as the response.
async fn trigger(State(state): State<AppState>, body: Result<Bytes, BytesRejection>) -> Response {
    let body = match body {
        Ok(body) => body,
        Err(e) => {
            warn!(error = %e, "Failed to read request body");
            return bad_request();
        }
    };

    match envelope::parse(&body) {
        Ok(Some(env)) => info!(
            message_id = %env.message.id,
            subscription = %env.subscription,
            data_len = env.message.data.as_ref().map_or(0, String::len),
            "push invocation received"
        ),
        Ok(None) => info!("Not a push invocation (no request body)."),
        Err(e) => {
            warn!(error = %e, "Failed to parse JSON body");
            return bad_request();
        }
    }

    let (tx, rx) = mpsc::unbounded_channel::<String>();
    tokio::spawn(run_command(state, ChannelSink::new(tx)));

    let stream = UnboundedReceiverStream::new(rx).map(Ok::<_, Infallible>);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::TRANSFER_ENCODING, "chunked")
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(Body::from_stream(stream))
        .unwrap_or_else(|e| {
            error!(error = %e, "failed to build streaming response");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        })
}

/// Run one supervised command for one request.
///
/// The request is considered gone once the body stream is dropped; that
/// cancels the run's token, which kills the child.
async fn run_command(state: AppState, sink: ChannelSink) {
    let cancel = CancellationToken::new();
    let watch = sink.clone();

    let supervisor = CommandSupervisor::new(
        state.command.clone(),
        state.supervisor,
        RunContext::new(cancel.clone(), sink),
    );
    let mut run = pin!(supervisor.run());
    let mut watching = true;

    let outcome = loop {
        tokio::select! {
            outcome = &mut run => break outcome,
            _ = watch.closed(), if watching => {
                info!("Client closed connection, command terminating.");
                cancel.cancel();
                watching = false;
            }
        }
    };

    // Last sender: dropping it ends the response body.
    drop(watch);

    debug!(command = %state.command.name, %outcome, "run finished");
    if let Some(reason) = outcome.failure_message() {
        error!(command = %state.command.name, %reason, "command run failed");
        if state.failures.send(reason).is_err() {
            debug!("failure receiver gone; server is already shutting down");
        }
    }
}

fn bad_request() -> Response {
    (StatusCode::BAD_REQUEST, "Bad Request").into_response()
}
