use std::io;
use std::sync::{Arc, Mutex};

use runhook::exec::ProgressSink;

/// A sink that:
/// - records every progress line written to it
/// - counts flushes, so tests can check write-then-flush behaviour
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    lines: Arc<Mutex<Vec<String>>>,
    flushes: Arc<Mutex<usize>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything written so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub fn last_line(&self) -> Option<String> {
        self.lines.lock().unwrap().last().cloned()
    }

    pub fn flushes(&self) -> usize {
        *self.flushes.lock().unwrap()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.lock().unwrap().iter().any(|l| l.contains(needle))
    }
}

impl ProgressSink for RecordingSink {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.lines.lock().unwrap().push(line.to_string());
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        *self.flushes.lock().unwrap() += 1;
        Ok(())
    }
}
