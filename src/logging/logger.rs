//! Structured logger with dry-run awareness and summary collection.
use std::path::PathBuf;
use std::sync::Mutex;

use super::types::{Log, TaskEntry, TaskStatus};
use super::utils::log_file_path;

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Structured logger with dry-run awareness and summary collection.
///
/// Every message also lands in `$XDG_CACHE_HOME/kitt/<command>.log`
/// (default `~/.cache/kitt/<command>.log`) through the
/// [`FileLayer`](super::subscriber::FileLayer) installed by
/// [`init_subscriber`](super::subscriber::init_subscriber).
#[derive(Debug)]
pub struct Logger {
    tasks: Mutex<Vec<TaskEntry>>,
    log_file: Option<PathBuf>,
    /// Serializes console output from parallel host flushes.
    pub(super) flush_lock: Mutex<()>,
    /// Hosts currently running in parallel.
    pub(super) active: Mutex<Vec<String>>,
}

impl Logger {
    /// Create a new logger.  Only remembers the log file path for the
    /// summary; it does not write to the file itself.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            tasks: Mutex::new(Vec::new()),
            log_file: log_file_path(command),
            flush_lock: Mutex::new(()),
            active: Mutex::new(Vec::new()),
        }
    }

    /// Return the log file path, if available.
    #[cfg(test)]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Return a clone of all recorded entries (test-only).
    #[cfg(test)]
    pub(crate) fn task_entries(&self) -> Vec<TaskEntry> {
        self.tasks.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: "kitt::stage", "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (console only with `--verbose`; always in the
    /// log file).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Log an action that dry-run mode did not perform.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: "kitt::dry_run", "{msg}");
    }

    /// Record a host result for the summary.
    pub fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.tasks.lock() {
            guard.push(TaskEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Count the failed entries.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.tasks.lock().map_or(0, |guard| {
            guard
                .iter()
                .filter(|t| t.status == TaskStatus::Failed)
                .count()
        })
    }

    /// Print the summary of all recorded host runs.
    pub fn print_summary(&self) {
        let tasks = match self.tasks.lock() {
            Ok(guard) => guard.clone(),
            Err(_) => return,
        };
        if tasks.is_empty() {
            return;
        }

        self.stage("Summary");
        for task in &tasks {
            let (icon, color) = match task.status {
                TaskStatus::Ok => ("✓", "\x1b[32m"),
                TaskStatus::Skipped => ("○", "\x1b[33m"),
                TaskStatus::DryRun => ("~", "\x1b[37m"),
                TaskStatus::Failed => ("✗", "\x1b[31m"),
            };
            let suffix = task
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));
            self.info(&format!("{color}{icon} {}{suffix}\x1b[0m", task.name));
        }

        let count = |status: TaskStatus| tasks.iter().filter(|t| t.status == status).count();
        let mut parts = vec![format!("{} ok", count(TaskStatus::Ok))];
        for (status, label) in [
            (TaskStatus::Skipped, "skipped"),
            (TaskStatus::DryRun, "dry run"),
        ] {
            let n = count(status);
            if n > 0 {
                parts.push(format!("{n} {label}"));
            }
        }
        parts.push(format!(
            "\x1b[31m{} failed\x1b[0m",
            count(TaskStatus::Failed)
        ));
        self.info(&format!("{} hosts: {}", tasks.len(), parts.join(", ")));
        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }

    /// Record that a host started running in parallel.
    pub fn notify_task_start(&self, name: &str) {
        if let Ok(mut active) = self.active.lock() {
            active.push(name.to_string());
            tracing::debug!("running: {}", active.join(", "));
        }
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error, dry_run);

    fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>) {
        self.record_task(name, status, message);
    }
}
