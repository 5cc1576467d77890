//! Symlink artifact for passthrough hosts.
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use super::helpers::{ensure_parent_dir, entry_exists, paths_equal, remove_entry};
use super::{ArtifactState, Materialize};

/// A link at `target` pointing to the canonical `source`.
#[derive(Debug, Clone)]
pub struct LinkArtifact {
    /// The canonical file or skill directory.
    pub source: PathBuf,
    /// Where the link lives under the install root.
    pub target: PathBuf,
}

impl LinkArtifact {
    /// Create a new link artifact.
    #[must_use]
    pub const fn new(source: PathBuf, target: PathBuf) -> Self {
        Self { source, target }
    }
}

impl Materialize for LinkArtifact {
    fn description(&self) -> String {
        format!("{} -> {}", self.target.display(), self.source.display())
    }

    fn current_state(&self) -> Result<ArtifactState> {
        // A relative link would resolve against the install root, not the cwd.
        if !self.source.is_absolute() {
            return Ok(ArtifactState::Invalid {
                reason: format!("source is not absolute: {}", self.source.display()),
            });
        }
        if !self.source.exists() {
            return Ok(ArtifactState::Invalid {
                reason: format!("source does not exist: {}", self.source.display()),
            });
        }

        let Ok(meta) = std::fs::symlink_metadata(&self.target) else {
            return Ok(ArtifactState::Missing);
        };
        if !meta.is_symlink() {
            let current = if meta.is_dir() {
                "a real directory"
            } else {
                "a regular file"
            };
            return Ok(ArtifactState::Incorrect {
                current: current.to_string(),
            });
        }

        let existing = std::fs::read_link(&self.target)
            .with_context(|| format!("reading link: {}", self.target.display()))?;
        if paths_equal(&existing, &self.source) {
            Ok(ArtifactState::Correct)
        } else {
            Ok(ArtifactState::Incorrect {
                current: format!("points to {}", existing.display()),
            })
        }
    }

    fn apply(&self) -> Result<()> {
        ensure_parent_dir(&self.target)?;

        if entry_exists(&self.target) {
            remove_entry(&self.target)
                .with_context(|| format!("remove existing: {}", self.target.display()))?;
        }

        create_symlink(&self.source, &self.target)
    }
}

/// Create a symlink at `link` pointing to `target`.
fn create_symlink(target: &Path, link: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(target, link).with_context(|| {
            format!(
                "creating symlink {} -> {}",
                link.display(),
                target.display()
            )
        })?;
    }

    #[cfg(windows)]
    {
        let result = if target.is_dir() {
            std::os::windows::fs::symlink_dir(target, link)
        } else {
            std::os::windows::fs::symlink_file(target, link)
        };
        result.with_context(|| {
            format!(
                "creating symlink {} -> {} (requires developer mode or admin)",
                link.display(),
                target.display()
            )
        })?;
    }

    Ok(())
}

#[cfg(all(test, unix))]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;

    fn setup() -> (tempfile::TempDir, PathBuf, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("src/commands/kitt-debug.md");
        fs::create_dir_all(source.parent().unwrap()).unwrap();
        fs::write(&source, "---\n---\nbody\n").unwrap();
        let target = dir.path().join("root/commands/kitt-debug.md");
        (dir, source, target)
    }

    #[test]
    fn missing_then_correct_after_apply() {
        let (_dir, source, target) = setup();
        let link = LinkArtifact::new(source.clone(), target.clone());
        assert_eq!(link.current_state().unwrap(), ArtifactState::Missing);

        link.apply().unwrap();
        assert_eq!(fs::read_link(&target).unwrap(), source);
        assert_eq!(link.current_state().unwrap(), ArtifactState::Correct);
    }

    #[test]
    fn wrong_target_is_incorrect_and_replaced() {
        let (dir, source, target) = setup();
        let other = dir.path().join("other.md");
        fs::write(&other, "x").unwrap();
        fs::create_dir_all(target.parent().unwrap()).unwrap();
        std::os::unix::fs::symlink(&other, &target).unwrap();

        let link = LinkArtifact::new(source.clone(), target.clone());
        assert!(matches!(
            link.current_state().unwrap(),
            ArtifactState::Incorrect { ref current } if current.starts_with("points to")
        ));
        link.apply().unwrap();
        assert_eq!(fs::read_link(&target).unwrap(), source);
        assert!(other.exists());
    }

    #[test]
    fn regular_file_is_replaced_by_link() {
        let (_dir, source, target) = setup();
        fs::create_dir_all(target.parent().unwrap()).unwrap();
        fs::write(&target, "stale copy").unwrap();

        let link = LinkArtifact::new(source, target.clone());
        assert!(link.current_state().unwrap().needs_write());
        link.apply().unwrap();
        assert!(fs::symlink_metadata(&target).unwrap().is_symlink());
    }

    #[test]
    fn missing_source_is_invalid() {
        let (dir, _source, target) = setup();
        let link = LinkArtifact::new(dir.path().join("gone.md"), target);
        assert!(matches!(
            link.current_state().unwrap(),
            ArtifactState::Invalid { .. }
        ));
    }

    #[test]
    fn relative_source_is_invalid_and_never_linked() {
        let (_dir, _source, target) = setup();
        let link = LinkArtifact::new(PathBuf::from("src/commands/kitt-debug.md"), target.clone());
        assert!(matches!(
            link.current_state().unwrap(),
            ArtifactState::Invalid { ref reason } if reason.contains("not absolute")
        ));
        assert!(fs::symlink_metadata(&target).is_err());
    }

    #[test]
    fn links_skill_directory() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("src/skills/kitt-demo");
        fs::create_dir_all(&source).unwrap();
        fs::write(source.join("SKILL.md"), "---\n---\n").unwrap();
        let target = dir.path().join("root/skills/kitt-demo");

        let link = LinkArtifact::new(source, target.clone());
        link.apply().unwrap();
        assert!(target.join("SKILL.md").exists());
        assert_eq!(link.current_state().unwrap(), ArtifactState::Correct);
    }
}
