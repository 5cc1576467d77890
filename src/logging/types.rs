//! Core logging types: summary entries, status, and the [`Log`] trait.

/// One line of the closing summary (one per host run).
#[derive(Debug, Clone)]
pub struct TaskEntry {
    /// Host display name.
    pub name: String,
    /// Final status of the host run.
    pub status: TaskStatus,
    /// Optional detail (counts, abort reason).
    pub message: Option<String>,
}

/// Status of a completed host run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Every eligible resource is in place.
    Ok,
    /// Nothing was eligible for the host.
    Skipped,
    /// Planned only; no filesystem changes were made.
    DryRun,
    /// At least one resource failed, or reconciliation was aborted.
    Failed,
}

/// Abstraction over logging backends.
///
/// Both [`Logger`](super::logger::Logger) (direct output) and
/// [`BufferedLog`](super::buffered::BufferedLog) (deferred output while hosts
/// run in parallel) implement this trait, so the installer logs without
/// knowing which one it has.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log an action that dry-run mode did not perform.
    fn dry_run(&self, msg: &str);
    /// Record a host result for the summary.
    fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>);
}
