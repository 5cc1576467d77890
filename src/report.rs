//! Install report: one outcome per `(resource, host)` pair plus per-host
//! removals, counts and abort reasons.
//!
//! Everything is sorted before it is returned, so two runs over the same
//! inputs produce equal reports regardless of directory iteration order or
//! thread scheduling.
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::matrix::{HostId, Kind};
use crate::store::Rejected;

/// Terminal state of one resource on one host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum Outcome {
    /// The artifact is in place.
    Installed {
        /// Artifact path.
        path: PathBuf,
        /// Whether this run wrote it (or would have, in dry-run mode).
        changed: bool,
        /// Metadata attributes lost in conversion.
        #[serde(skip_serializing_if = "Vec::is_empty")]
        dropped: Vec<String>,
    },
    /// Deliberately not installed (unsupported kind or capability).
    Skipped {
        /// Machine-readable reason, e.g. `unsupported-kind: skill`.
        reason: String,
    },
    /// Conversion or write failed.
    Failed {
        /// Error message.
        reason: String,
    },
}

/// Outcome for one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    /// Resource kind.
    pub kind: Kind,
    /// Resource name.
    pub name: String,
    /// What happened.
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Result of reconciling one host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostReport {
    /// Host identity.
    pub host: HostId,
    /// Install root that was reconciled.
    pub install_root: PathBuf,
    /// One entry per resource in the snapshot, sorted by `(kind, name)`.
    pub entries: Vec<ReportEntry>,
    /// Orphaned artifacts removed (or that would be removed), sorted.
    pub removed: Vec<PathBuf>,
    /// Orphans that could not be removed, directories that could not be
    /// listed, or an install root that could not be locked.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    /// Set when reconciliation was aborted before touching the directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hazard: Option<String>,
    /// Filesystem writes and removals performed (zero in dry-run mode).
    pub writes: usize,
}

impl HostReport {
    /// An empty report for `host`.
    #[must_use]
    pub const fn new(host: HostId, install_root: PathBuf) -> Self {
        Self {
            host,
            install_root,
            entries: Vec::new(),
            removed: Vec::new(),
            errors: Vec::new(),
            hazard: None,
            writes: 0,
        }
    }

    /// Sort entries and removals into their canonical order.
    pub fn normalize(&mut self) {
        self.entries
            .sort_by(|a, b| (a.kind, &a.name).cmp(&(b.kind, &b.name)));
        self.removed.sort();
        self.errors.sort();
    }

    /// Number of installed entries.
    #[must_use]
    pub fn installed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Installed { .. }))
    }

    /// Number of installed entries this run changed.
    #[must_use]
    pub fn changed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Installed { changed: true, .. }))
    }

    /// Number of skipped entries.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped { .. }))
    }

    /// Number of failed entries.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.outcome)).count()
    }

    /// Whether anything on this host failed or was aborted.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed() > 0 || !self.errors.is_empty() || self.hazard.is_some()
    }

    /// Resources skipped on this host, with reasons.
    pub fn skip_list(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().filter_map(|e| match &e.outcome {
            Outcome::Skipped { reason } => Some((e.name.as_str(), reason.as_str())),
            _ => None,
        })
    }

    /// One-line count summary.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} installed ({} changed), {} skipped, {} removed, {} failed",
            self.installed(),
            self.changed(),
            self.skipped(),
            self.removed.len(),
            self.failed()
        )
    }
}

impl fmt::Display for HostReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.host, self.summary())
    }
}

/// Result of one install run across every selected host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstallReport {
    /// Per-host results in [`HostId::ALL`] order.
    pub hosts: Vec<HostReport>,
    /// Source files rejected at load time.
    pub rejected: Vec<Rejected>,
}

impl InstallReport {
    /// `true` if any resource failed, any host aborted, or any source file
    /// was rejected.  The CLI exits non-zero in that case.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.rejected.is_empty() || self.hosts.iter().any(HostReport::has_failures)
    }

    /// The report for `host`, if it was selected.
    #[must_use]
    pub fn host(&self, host: HostId) -> Option<&HostReport> {
        self.hosts.iter().find(|h| h.host == host)
    }

    /// Total filesystem writes across hosts.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.hosts.iter().map(|h| h.writes).sum()
    }
}
