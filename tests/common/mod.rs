// Shared helpers for integration tests.
//
// Provides a temporary source tree plus temporary host install roots, and a
// one-call install over them, so each test can set up an isolated
// environment without repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use kitt_cli::config::Namespace;
use kitt_cli::install::Installer;
use kitt_cli::logging::Logger;
use kitt_cli::matrix::{HostId, HostTarget, Kind};
use kitt_cli::report::InstallReport;
use kitt_cli::store::ResourceStore;

/// An isolated canonical tree and home directory backed by a
/// [`tempfile::TempDir`], deleted when dropped.
pub struct Fixture {
    /// Temporary directory holding `src/` and `home/`.
    pub dir: tempfile::TempDir,
    /// How paths handed to the installer spell `dir`.
    base: PathBuf,
}

impl Fixture {
    /// Create an empty source tree with all three kind directories.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let base = dir.path().to_path_buf();
        Self::with_dir(dir, base)
    }

    /// Like [`new`](Self::new), but created below the current directory and
    /// addressed by a relative path.
    pub fn new_relative() -> Self {
        let cwd = std::env::current_dir().expect("current dir");
        let dir = tempfile::tempdir_in(&cwd).expect("create temp dir");
        let base = dir
            .path()
            .strip_prefix(&cwd)
            .expect("temp dir below cwd")
            .to_path_buf();
        Self::with_dir(dir, base)
    }

    fn with_dir(dir: tempfile::TempDir, base: PathBuf) -> Self {
        for kind in Kind::ALL {
            fs::create_dir_all(base.join("src").join(kind.dir_name())).expect("create kind dir");
        }
        Self { dir, base }
    }

    /// Root of the canonical tree.
    pub fn source(&self) -> PathBuf {
        self.base.join("src")
    }

    /// Directory standing in for the user's home.
    pub fn home(&self) -> PathBuf {
        self.base.join("home")
    }

    /// Install root of `host`.
    pub fn root(&self, host: HostId) -> PathBuf {
        self.home().join(host.profile().home_subdir)
    }

    /// One target per host, rooted below [`home`](Self::home).
    pub fn targets(&self) -> Vec<HostTarget> {
        HostId::ALL
            .into_iter()
            .map(|id| HostTarget::new(id, self.root(id)))
            .collect()
    }

    /// Write `commands/<name>.md` or `agents/<name>.md` with `header` as
    /// frontmatter.
    pub fn write(&self, kind: Kind, name: &str, header: &str, body: &str) -> PathBuf {
        let path = match kind {
            Kind::Skill => {
                let dir = self.source().join("skills").join(name);
                fs::create_dir_all(&dir).expect("create skill dir");
                dir.join("SKILL.md")
            }
            Kind::Agent | Kind::Command => self
                .source()
                .join(kind.dir_name())
                .join(format!("{name}.md")),
        };
        fs::write(&path, format!("---\n{header}---\n{body}")).expect("write resource");
        path
    }

    /// Delete a resource from the canonical tree.
    pub fn remove(&self, kind: Kind, name: &str) {
        match kind {
            Kind::Skill => fs::remove_dir_all(self.source().join("skills").join(name))
                .expect("remove skill"),
            Kind::Agent | Kind::Command => fs::remove_file(
                self.source()
                    .join(kind.dir_name())
                    .join(format!("{name}.md")),
            )
            .expect("remove resource"),
        }
    }

    /// Load the tree and reconcile every host sequentially.
    pub fn install(&self, dry_run: bool) -> InstallReport {
        self.install_with(dry_run, false)
    }

    /// Load the tree and reconcile every host, optionally in parallel.
    pub fn install_with(&self, dry_run: bool, parallel: bool) -> InstallReport {
        let snapshot = ResourceStore::new(self.source(), Namespace::default())
            .load_all()
            .expect("load source tree");
        let log = Arc::new(Logger::new("test"));
        Installer::new(Namespace::default(), dry_run).install_all(
            &snapshot,
            &self.targets(),
            parallel,
            &log,
        )
    }

    /// Every entry below the home directory: file contents, or `-> target`
    /// for symlinks.  Directories appear only through their children.
    pub fn home_tree(&self) -> BTreeMap<PathBuf, String> {
        let mut tree = BTreeMap::new();
        walk(&self.home(), &self.home(), &mut tree);
        tree
    }
}

fn walk(base: &Path, dir: &Path, tree: &mut BTreeMap<PathBuf, String>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let rel = path.strip_prefix(base).expect("below base").to_path_buf();
        let meta = fs::symlink_metadata(&path).expect("stat entry");
        if meta.file_type().is_symlink() {
            let target = fs::read_link(&path).expect("read link");
            tree.insert(rel, format!("-> {}", target.display()));
        } else if meta.is_dir() {
            walk(base, &path, tree);
        } else {
            tree.insert(rel, fs::read_to_string(&path).expect("read file"));
        }
    }
}
