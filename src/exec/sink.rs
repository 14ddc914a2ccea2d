// src/exec/sink.rs

//! Where progress lines go.
//!
//! The supervisor only talks to a [`ProgressSink`]. Production uses
//! [`ChannelSink`], whose receiving half becomes the streaming HTTP body;
//! tests plug in a recording sink instead.

use std::io;

use tokio::sync::mpsc;

/// Line-oriented, flushable output for progress messages.
pub trait ProgressSink: Send {
    /// Write a single line. The sink adds the line terminator.
    fn write_line(&mut self, line: &str) -> io::Result<()>;

    /// Push anything buffered out to the caller.
    fn flush(&mut self) -> io::Result<()>;
}

/// Sink backed by an unbounded channel of body chunks.
///
/// Each line becomes one chunk, so there is nothing to buffer and `flush`
/// is a no-op.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<String>) -> Self {
        Self { tx }
    }

    /// Resolves once the receiving side (the response body) is gone.
    pub async fn closed(&self) {
        self.tx.closed().await
    }
}

impl ProgressSink for ChannelSink {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.tx
            .send(format!("{line}\n"))
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "response stream closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
