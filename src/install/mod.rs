//! Installer: reconciles each host's install directory with the current
//! resource snapshot.
//!
//! Per host, a run converts every resource, plans the expected artifact set
//! and the orphans, checks every planned path against the namespace guard,
//! then removes orphans and writes artifacts that are missing or differ.
//! Nothing is persisted between runs; the expected set is recomputed each
//! time, so repeated runs converge and are no-ops once converged.  Resources
//! rejected at load time keep whatever they installed before.
pub mod lock;
pub mod plan;

use rayon::prelude::*;
use std::sync::Arc;

use crate::config::Namespace;
use crate::convert::{Conversion, Converter};
use crate::error::InstallError;
use crate::logging::{BufferedLog, Log, Logger, TaskStatus};
use crate::materialize::{self, ArtifactState, helpers::remove_entry};
use crate::matrix::HostTarget;
use crate::report::{HostReport, InstallReport, Outcome, ReportEntry};
use crate::store::{Rejected, Resource, StoreSnapshot};

use lock::RootLock;
use plan::Plan;

/// Reconciliation engine.
#[derive(Debug, Clone)]
pub struct Installer {
    namespace: Namespace,
    dry_run: bool,
}

impl Installer {
    /// Create an installer that only ever touches entries owned by
    /// `namespace`.  With `dry_run`, plans and reports without writing.
    #[must_use]
    pub const fn new(namespace: Namespace, dry_run: bool) -> Self {
        Self { namespace, dry_run }
    }

    /// Reconcile one host.
    ///
    /// Never returns an error: per-resource failures become
    /// [`Outcome::Failed`] entries, and a namespace hazard aborts this host
    /// only, recorded in [`HostReport::hazard`].  Outside a dry run the host
    /// is reconciled while holding the install root's [`RootLock`], so
    /// concurrent runs against one root take turns.
    pub fn install_host(
        &self,
        target: &HostTarget,
        snapshot: &StoreSnapshot,
        log: &dyn Log,
    ) -> HostReport {
        let host = target.id();
        log.stage(&format!(
            "{} ({})",
            host.display_name(),
            target.install_root.display()
        ));

        let converter = Converter::for_host(host);
        let conversions: Vec<(&Resource, Conversion)> = snapshot
            .resources
            .iter()
            .map(|r| (r, converter.convert(r, target)))
            .collect();

        let mut report = HostReport::new(host, target.install_root.clone());
        let rejected = &snapshot.rejected;
        if self.dry_run {
            self.reconcile(target, &conversions, rejected, &mut report, log);
        } else {
            match RootLock::open(&target.install_root) {
                Ok(mut lock) => {
                    let held = lock.hold();
                    match held {
                        Ok(_guard) => {
                            self.reconcile(target, &conversions, rejected, &mut report, log);
                        }
                        Err(e) => abort(&conversions, &mut report, log, &e),
                    }
                }
                Err(e) => abort(&conversions, &mut report, log, &e),
            }
        }

        report.normalize();
        let status = if report.has_failures() {
            TaskStatus::Failed
        } else if self.dry_run {
            TaskStatus::DryRun
        } else if report.installed() == 0 && report.removed.is_empty() {
            TaskStatus::Skipped
        } else {
            TaskStatus::Ok
        };
        log.record_task(host.display_name(), status, Some(&report.summary()));
        report
    }

    /// Plan, sweep orphans and apply every conversion.
    fn reconcile(
        &self,
        target: &HostTarget,
        conversions: &[(&Resource, Conversion)],
        rejected: &[Rejected],
        report: &mut HostReport,
        log: &dyn Log,
    ) {
        match Plan::build(target, &self.namespace, conversions, rejected) {
            Ok(plan) => {
                self.remove_orphans(&plan, report, log);
                for (resource, conversion) in conversions {
                    let outcome = self.apply_conversion(conversion, report, log);
                    report.entries.push(entry(resource, outcome));
                }
            }
            Err(hazard) => {
                report.hazard = Some(hazard.to_string());
                abort(conversions, report, log, &hazard);
            }
        }
    }

    /// Remove every orphan independently; one failure does not stop the rest.
    fn remove_orphans(&self, plan: &Plan<'_>, report: &mut HostReport, log: &dyn Log) {
        for err in &plan.list_errors {
            log.error(&err.to_string());
            report.errors.push(err.to_string());
        }
        for orphan in &plan.orphans {
            if self.dry_run {
                log.dry_run(&format!("would remove orphan: {}", orphan.display()));
                report.removed.push(orphan.clone());
                continue;
            }
            match remove_entry(orphan) {
                Ok(()) => {
                    log.info(&format!("removed orphan: {}", orphan.display()));
                    report.removed.push(orphan.clone());
                    report.writes += 1;
                }
                Err(e) => {
                    log.error(&format!("{e:#}"));
                    report.errors.push(format!("{e:#}"));
                }
            }
        }
    }

    /// Check one conversion against disk and write it if needed.
    fn apply_conversion(
        &self,
        conversion: &Conversion,
        report: &mut HostReport,
        log: &dyn Log,
    ) -> Outcome {
        let artifact = match conversion {
            Conversion::Skipped(reason) => {
                return Outcome::Skipped {
                    reason: reason.to_string(),
                };
            }
            Conversion::Failed(reason) => {
                log.error(reason);
                return Outcome::Failed {
                    reason: reason.clone(),
                };
            }
            Conversion::Ready(artifact) => artifact,
        };

        if !artifact.dropped.is_empty() {
            log.debug(&format!(
                "{}: dropped {}",
                artifact.path.display(),
                artifact.dropped.join(", ")
            ));
        }

        let primitive = materialize::for_artifact(artifact);
        let desc = primitive.description();
        let installed = |changed: bool| Outcome::Installed {
            path: artifact.path.clone(),
            changed,
            dropped: artifact.dropped.clone(),
        };
        let failed = |reason: String| {
            log.error(&format!("failed to install {desc}: {reason}"));
            Outcome::Failed { reason }
        };

        match primitive.current_state() {
            Ok(ArtifactState::Correct) => {
                log.debug(&format!("ok: {desc}"));
                installed(false)
            }
            Ok(ArtifactState::Invalid { reason }) => failed(reason),
            Ok(state) => {
                if self.dry_run {
                    let msg = if let ArtifactState::Incorrect { current } = &state {
                        format!("would replace {desc} (currently {current})")
                    } else {
                        format!("would install: {desc}")
                    };
                    log.dry_run(&msg);
                    return installed(true);
                }
                match primitive.apply() {
                    Ok(()) => {
                        log.info(&format!("installed: {desc}"));
                        report.writes += 1;
                        installed(true)
                    }
                    Err(e) => failed(format!("{e:#}")),
                }
            }
            Err(e) => failed(format!("{e:#}")),
        }
    }

    /// Reconcile every target, in parallel across hosts when `parallel`.
    ///
    /// Hosts share nothing but the read-only snapshot.  While running in
    /// parallel each host logs into its own [`BufferedLog`], flushed when the
    /// host finishes.  The report lists hosts in `targets` order.
    #[must_use]
    pub fn install_all(
        &self,
        snapshot: &StoreSnapshot,
        targets: &[HostTarget],
        parallel: bool,
        log: &Arc<Logger>,
    ) -> InstallReport {
        let hosts: Vec<HostReport> = if parallel && targets.len() > 1 {
            targets
                .par_iter()
                .map(|target| {
                    let name = target.id().display_name();
                    log.notify_task_start(name);
                    let buffered = BufferedLog::new(Arc::clone(log));
                    let report = self.install_host(target, snapshot, &buffered);
                    buffered.flush_and_complete(name);
                    report
                })
                .collect()
        } else {
            targets
                .iter()
                .map(|target| self.install_host(target, snapshot, log.as_ref()))
                .collect()
        };

        InstallReport {
            hosts,
            rejected: snapshot.rejected.clone(),
        }
    }
}

/// Leave the host untouched: every eligible resource fails with `cause`,
/// skips stay skips.
fn abort(
    conversions: &[(&Resource, Conversion)],
    report: &mut HostReport,
    log: &dyn Log,
    cause: &InstallError,
) {
    log.error(&format!("aborting {}: {cause}", report.host));
    if !matches!(cause, InstallError::ReconciliationHazard { .. }) {
        report.errors.push(cause.to_string());
    }
    let reason = format!("not installed: {cause}");
    for (resource, conversion) in conversions {
        let outcome = match conversion {
            Conversion::Skipped(skip) => Outcome::Skipped {
                reason: skip.to_string(),
            },
            Conversion::Ready(_) | Conversion::Failed(_) => Outcome::Failed {
                reason: reason.clone(),
            },
        };
        report.entries.push(entry(resource, outcome));
    }
}

fn entry(resource: &Resource, outcome: Outcome) -> ReportEntry {
    ReportEntry {
        kind: resource.kind,
        name: resource.name.clone(),
        outcome,
    }
}
