//! Reconciliation planning: expected artifacts, orphans, and the namespace
//! guard that runs before anything on disk is touched.
use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::Namespace;
use crate::convert::{Artifact, Conversion};
use crate::error::InstallError;
use crate::matrix::{HostTarget, Kind};
use crate::store::{Rejected, Resource};

/// Everything one host run intends to do.
#[derive(Debug, Default)]
pub struct Plan<'a> {
    /// Artifacts to check and, if needed, write.
    pub writes: Vec<&'a Artifact>,
    /// Prefixed entries on disk that no eligible resource claims.
    pub orphans: Vec<PathBuf>,
    /// Kind directories that could not be listed.
    pub list_errors: Vec<InstallError>,
}

impl<'a> Plan<'a> {
    /// Build the plan for `target` from this run's conversions.
    ///
    /// Every eligible resource claims its artifact path, including ones whose
    /// conversion failed, so a previously installed artifact survives a
    /// broken edit instead of being deleted as an orphan.  Files rejected at
    /// load time claim the path their name maps to; a kind directory that
    /// could not be listed at all holds back the orphan sweep for that kind.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::ReconciliationHazard`] if any planned write or
    /// removal falls outside the namespaced part of the install root.
    pub fn build(
        target: &HostTarget,
        namespace: &Namespace,
        conversions: &'a [(&'a Resource, Conversion)],
        rejected: &[Rejected],
    ) -> Result<Self, InstallError> {
        let mut plan = Self::default();
        let mut claimed = BTreeSet::new();
        let mut held = BTreeSet::new();

        for r in rejected {
            match (r.kind, &r.name) {
                (Some(kind), Some(name)) => {
                    claimed.insert(target.artifact_path(kind, name));
                }
                (Some(kind), None) => {
                    held.insert(kind);
                }
                (None, _) => {}
            }
        }

        for (resource, conversion) in conversions {
            match conversion {
                Conversion::Ready(artifact) => {
                    claimed.insert(artifact.path.clone());
                    plan.writes.push(artifact);
                }
                Conversion::Failed(_) => {
                    claimed.insert(target.artifact_path(resource.kind, &resource.name));
                }
                Conversion::Skipped(_) => {}
            }
        }

        for kind in Kind::ALL.into_iter().filter(|k| !held.contains(k)) {
            let dir = target.kind_dir(kind);
            match namespaced_entries(&dir, namespace) {
                Ok(entries) => plan
                    .orphans
                    .extend(entries.into_iter().filter(|p| !claimed.contains(p))),
                Err(source) => plan.list_errors.push(InstallError::List {
                    path: dir.display().to_string(),
                    source,
                }),
            }
        }
        plan.orphans.sort();

        for path in plan
            .writes
            .iter()
            .map(|a| a.path.as_path())
            .chain(plan.orphans.iter().map(PathBuf::as_path))
        {
            guard(target, namespace, path)?;
        }
        Ok(plan)
    }
}

/// Entries of `dir` whose names carry the namespace prefix.  A missing
/// directory has none.
fn namespaced_entries(dir: &Path, namespace: &Namespace) -> io::Result<Vec<PathBuf>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };
    let mut found = Vec::new();
    for entry in entries {
        let entry = entry?;
        if entry
            .file_name()
            .to_str()
            .is_some_and(|name| namespace.owns(name))
        {
            found.push(entry.path());
        }
    }
    Ok(found)
}

/// Refuse any path that is not a namespaced entry directly inside one of the
/// target's kind directories.
fn guard(target: &HostTarget, namespace: &Namespace, path: &Path) -> Result<(), InstallError> {
    let hazard = |reason: String| InstallError::ReconciliationHazard {
        path: path.display().to_string(),
        reason,
    };

    let in_kind_dir = path
        .parent()
        .is_some_and(|parent| Kind::ALL.iter().any(|k| parent == target.kind_dir(*k)));
    if !in_kind_dir {
        return Err(hazard(format!(
            "not inside a kind directory of {}",
            target.install_root.display()
        )));
    }

    let owned = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| namespace.owns(name));
    if !owned {
        return Err(hazard(format!(
            "name lacks namespace prefix '{}'",
            namespace.prefix()
        )));
    }
    Ok(())
}
