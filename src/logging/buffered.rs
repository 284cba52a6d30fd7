//! In-memory logger that captures messages instead of printing them.
use std::sync::Mutex;

use super::types::{Level, Log, RunHeader};

/// A single captured log message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Kind of message.
    pub level: Level,
    /// Message text.
    pub message: String,
}

/// Logger that records every message in memory, in order.
///
/// Useful when deploying as a library call (the caller decides what to show)
/// and for asserting on emitted messages in tests.  The run header is kept
/// as a [`Level::Run`] entry holding its one-line rendering.
#[derive(Debug, Default)]
pub struct BufferedLog {
    entries: Mutex<Vec<LogEntry>>,
}

impl BufferedLog {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a copy of all captured entries.
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().map_or_else(|_| Vec::new(), |guard| guard.to_vec())
    }

    /// Return the messages captured at `level`, in order.
    #[must_use]
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| e.level == level)
            .map(|e| e.message)
            .collect()
    }

    /// Return `true` if any captured message contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.entries().iter().any(|e| e.message.contains(needle))
    }

    fn push(&self, level: Level, msg: &str) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.push(LogEntry {
                level,
                message: msg.to_string(),
            });
        }
    }
}

/// Implement the methods of [`Log`] by buffering each message at the
/// corresponding [`Level`].
macro_rules! buffer_log_methods {
    ($($method:ident => $level:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.push(Level::$level, msg);
            }
        )+
    };
}

impl Log for BufferedLog {
    fn run(&self, header: &RunHeader) {
        self.push(Level::Run, &header.to_string());
    }

    buffer_log_methods! {
        stage   => Stage,
        info    => Info,
        debug   => Debug,
        warn    => Warn,
        error   => Error,
        dry_run => DryRun,
    }
}
