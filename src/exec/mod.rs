// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running the configured command
//! using `tokio::process::Command`, and streaming what happens back to the
//! caller through a [`ProgressSink`].
//!
//! - [`supervisor`] owns the per-request event loop and classifies outcomes.
//! - [`multiplexer`] merges stdout/stderr into one line stream.
//! - [`process`] spawns a child bound to a cancellation token.
//! - [`ticker`] drives liveness lines and the execution deadline.
//! - [`context`] and [`sink`] are the per-request output side.
//! - [`duration`] holds truncation/rendering helpers for user-visible times.

pub mod context;
pub mod duration;
pub mod multiplexer;
pub mod process;
pub mod sink;
pub mod supervisor;
pub mod ticker;

pub use context::RunContext;
pub use sink::{ChannelSink, ProgressSink};
pub use supervisor::CommandSupervisor;
