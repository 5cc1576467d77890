//! Advisory lock serializing installs into one install root.
//!
//! Two `kitt install` runs against the same root would otherwise sweep each
//! other's staging files as orphans.  The lock file sits directly in the
//! install root, outside every kind directory, so it is never an orphan.
use fd_lock::{RwLock, RwLockWriteGuard};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::error::InstallError;

/// Name of the lock file inside an install root.
pub const LOCK_FILE: &str = ".kitt.lock";

/// An opened, not yet held, lock on one install root.
#[derive(Debug)]
pub struct RootLock {
    path: PathBuf,
    lock: RwLock<File>,
}

impl RootLock {
    /// Open (creating if needed) the lock file of `root`.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::Lock`] if the root or the lock file cannot be
    /// created.
    pub fn open(root: &Path) -> Result<Self, InstallError> {
        let path = root.join(LOCK_FILE);
        let err = |source| InstallError::Lock {
            path: path.display().to_string(),
            source,
        };
        fs::create_dir_all(root).map_err(err)?;
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(err)?;
        Ok(Self {
            path,
            lock: RwLock::new(file),
        })
    }

    /// Block until this process holds the exclusive lock.  Released when the
    /// guard drops.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::Lock`] if the OS refuses the lock.
    pub fn hold(&mut self) -> Result<RwLockWriteGuard<'_, File>, InstallError> {
        let path = &self.path;
        self.lock.write().map_err(|source| InstallError::Lock {
            path: path.display().to_string(),
            source,
        })
    }

    /// Path of the lock file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}
