// src/exec/multiplexer.rs

//! Merge a child's stdout and stderr into one line stream.
//!
//! One reader task per pipe pushes every complete line into a shared
//! unbounded channel as soon as it is read. Order is kept per stream, not
//! across streams. The channel closes once both readers have finished.

use std::fmt;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

/// Which pipe a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

impl fmt::Display for OutputStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputStream::Stdout => write!(f, "stdout"),
            OutputStream::Stderr => write!(f, "stderr"),
        }
    }
}

/// A single line of subprocess output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputEvent {
    pub stream: OutputStream,
    pub line: String,
}

/// Start one line reader per pipe and return the merged receiver.
pub fn attach<O, E>(stdout: O, stderr: E) -> mpsc::UnboundedReceiver<OutputEvent>
where
    O: AsyncRead + Unpin + Send + 'static,
    E: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();

    spawn_line_reader(OutputStream::Stdout, stdout, tx.clone());
    spawn_line_reader(OutputStream::Stderr, stderr, tx);

    rx
}

fn spawn_line_reader<R>(stream: OutputStream, pipe: R, tx: mpsc::UnboundedSender<OutputEvent>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(pipe).lines();

        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(OutputEvent { stream, line }).is_err() {
                        debug!(%stream, "output receiver dropped; stopping reader");
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    debug!(%stream, error = %e, "error reading subprocess output");
                    break;
                }
            }
        }

        debug!(%stream, "output reader ended");
    });
}
