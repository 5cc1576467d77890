//! Buffered logger for hosts reconciled in parallel.
use std::sync::{Arc, Mutex};

use super::logger::Logger;
use super::types::{Log, TaskStatus};

/// A single buffered log entry, replayed when flushed.
#[derive(Debug, Clone)]
enum LogEntry {
    Stage(String),
    Info(String),
    Debug(String),
    Warn(String),
    Error(String),
    DryRun(String),
}

impl LogEntry {
    /// Replay this entry to the console and log file via tracing.
    fn replay(&self) {
        match self {
            Self::Stage(msg) => tracing::info!(target: "kitt::stage", "{msg}"),
            Self::Info(msg) => tracing::info!("{msg}"),
            Self::Debug(msg) => tracing::debug!("{msg}"),
            Self::Warn(msg) => tracing::warn!("{msg}"),
            Self::Error(msg) => tracing::error!("{msg}"),
            Self::DryRun(msg) => tracing::info!(target: "kitt::dry_run", "{msg}"),
        }
    }
}

/// Implement the display methods of [`Log`] by buffering each message as the
/// corresponding [`LogEntry`] variant.
macro_rules! buffer_log_methods {
    ($($method:ident => $variant:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                if let Ok(mut guard) = self.entries.lock() {
                    guard.push(LogEntry::$variant(msg.to_string()));
                }
            }
        )+
    };
}

/// Captures one host's output in memory so parallel hosts do not interleave
/// on the console.  Entries are replayed in order by
/// [`flush_and_complete`](Self::flush_and_complete).
///
/// [`record_task`](Log::record_task) goes straight to the backing
/// [`Logger`], whose summary list is already thread-safe.
#[derive(Debug)]
pub struct BufferedLog {
    inner: Arc<Logger>,
    entries: Mutex<Vec<LogEntry>>,
}

impl BufferedLog {
    /// Create a new buffered logger backed by the given [`Logger`].
    #[must_use]
    pub const fn new(inner: Arc<Logger>) -> Self {
        Self {
            inner,
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Replay all buffered entries and drop `name` from the active set.
    ///
    /// Holds the backing logger's flush lock so two hosts finishing together
    /// print one after the other.
    pub fn flush_and_complete(&self, name: &str) {
        let _guard = self
            .inner
            .flush_lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let entries = match self.entries.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(_) => return,
        };
        for entry in &entries {
            entry.replay();
        }
        if let Ok(mut active) = self.inner.active.lock() {
            active.retain(|n| n != name);
        }
    }
}

impl Log for BufferedLog {
    buffer_log_methods! {
        stage   => Stage,
        info    => Info,
        debug   => Debug,
        warn    => Warn,
        error   => Error,
        dry_run => DryRun,
    }

    fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>) {
        self.inner.record_task(name, status, message);
    }
}
