//! Command: compile the resource tree and reconcile every selected host.
use anyhow::{Context as _, Result};
use std::path::Path;
use std::sync::Arc;

use crate::cli::{GlobalOpts, InstallOpts};
use crate::config::{self, Config};
use crate::install::Installer;
use crate::logging::Logger;
use crate::matrix::{HostId, HostTarget};
use crate::report::InstallReport;
use crate::store::ResourceStore;

/// Run the install command.
///
/// # Errors
///
/// Returns an error if the source tree or config cannot be loaded, or if the
/// run finished with any failed resource, aborted host or rejected file.
pub fn run(global: &GlobalOpts, opts: &InstallOpts, log: Logger) -> Result<()> {
    let source = super::resolve_source_root(global.source.as_deref())?;
    let version = option_env!("KITT_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
    log.info(&format!("kitt {version}"));

    log.stage("Loading configuration");
    let config = Config::load(&source, global.config.as_deref())?;
    log.info(&format!(
        "source: {}, namespace: {}",
        config.source_root.display(),
        config.namespace.prefix()
    ));
    let home = config::home_dir()?;

    let log = Arc::new(log);
    let report = execute(
        &config,
        &home,
        &opts.hosts,
        global.dry_run,
        global.parallel,
        &log,
    )?;

    log.print_summary();
    if opts.json {
        let json = serde_json::to_string_pretty(&report).context("serializing install report")?;
        #[allow(clippy::print_stdout)]
        {
            println!("{json}");
        }
    }

    if report.has_failures() {
        let failed: usize = report.hosts.iter().map(|h| h.failed()).sum();
        anyhow::bail!(
            "install finished with {failed} failed resource(s), {} rejected file(s)",
            report.rejected.len()
        );
    }
    Ok(())
}

/// Load the snapshot and reconcile the selected hosts.
///
/// An empty `only` selects every enabled host.
///
/// # Errors
///
/// Returns an error only if the source tree itself is missing.  Everything
/// else is recorded in the returned report.
pub fn execute(
    config: &Config,
    home: &Path,
    only: &[HostId],
    dry_run: bool,
    parallel: bool,
    log: &Arc<Logger>,
) -> Result<InstallReport> {
    log.stage("Loading resources");
    let store = ResourceStore::new(&config.source_root, config.namespace.clone());
    let snapshot = store.load_all()?;
    log.info(&format!(
        "loaded {} resources from {}",
        snapshot.resources.len(),
        store.root().display()
    ));
    for rejected in &snapshot.rejected {
        log.warn(&format!(
            "rejected {}: {}",
            rejected.path.display(),
            rejected.reason
        ));
    }

    let targets = select_targets(config.targets(home), only);
    if targets.is_empty() {
        log.warn("no hosts selected");
    }

    let installer = Installer::new(config.namespace.clone(), dry_run);
    Ok(installer.install_all(&snapshot, &targets, parallel, log))
}

/// Keep only targets named in `only`, or all of them when it is empty.
fn select_targets(targets: Vec<HostTarget>, only: &[HostId]) -> Vec<HostTarget> {
    if only.is_empty() {
        return targets;
    }
    targets
        .into_iter()
        .filter(|t| only.contains(&t.id()))
        .collect()
}
