//! Generated-file artifact for converting hosts.
use anyhow::{Context as _, Result};
use std::path::PathBuf;

use super::helpers::{ensure_parent_dir, remove_entry, sha256_hex};
use super::{ArtifactState, Materialize};

/// A file at `path` that must hold exactly `content`.
#[derive(Debug, Clone)]
pub struct FileArtifact {
    /// Destination under the install root.
    pub path: PathBuf,
    /// Expected content.
    pub content: String,
}

impl FileArtifact {
    /// Create a new file artifact.
    #[must_use]
    pub const fn new(path: PathBuf, content: String) -> Self {
        Self { path, content }
    }

    /// Sibling staging path on the same filesystem.  It keeps the artifact's
    /// prefixed name, so a leftover from a killed run is an orphan that the
    /// next run removes.
    fn staging_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map_or_else(String::new, |n| n.to_string_lossy().into_owned());
        self.path.with_file_name(format!("{name}.kitt_tmp"))
    }
}

impl Materialize for FileArtifact {
    fn description(&self) -> String {
        self.path.display().to_string()
    }

    fn current_state(&self) -> Result<ArtifactState> {
        let Ok(meta) = std::fs::symlink_metadata(&self.path) else {
            return Ok(ArtifactState::Missing);
        };
        if meta.is_symlink() {
            return Ok(ArtifactState::Incorrect {
                current: "a symlink".to_string(),
            });
        }
        if meta.is_dir() {
            return Ok(ArtifactState::Incorrect {
                current: "a directory".to_string(),
            });
        }

        let existing = std::fs::read(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))?;
        let current = sha256_hex(&existing);
        if current == sha256_hex(self.content.as_bytes()) {
            Ok(ArtifactState::Correct)
        } else {
            Ok(ArtifactState::Incorrect {
                current: format!("sha256 {current}"),
            })
        }
    }

    fn apply(&self) -> Result<()> {
        ensure_parent_dir(&self.path)?;

        // Stage then rename so a failed write never leaves a truncated file.
        let tmp = self.staging_path();
        std::fs::write(&tmp, &self.content)
            .with_context(|| format!("writing {}", tmp.display()))?;

        let cleanup = || {
            let _ = std::fs::remove_file(&tmp);
        };

        if std::fs::symlink_metadata(&self.path).is_ok_and(|m| m.is_dir() || m.is_symlink())
            && let Err(e) = remove_entry(&self.path)
        {
            cleanup();
            return Err(e);
        }
        if let Err(e) = std::fs::rename(&tmp, &self.path) {
            cleanup();
            return Err(e).with_context(|| {
                format!("rename {} to {}", tmp.display(), self.path.display())
            });
        }
        Ok(())
    }
}
