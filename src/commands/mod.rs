//! Top-level subcommand orchestration.
pub mod install;
pub mod matrix;
pub mod version;

use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::matrix::Kind;

/// Environment variable naming the canonical resource tree.
pub const SOURCE_ENV: &str = "KITT_SOURCE";

/// Resolve the canonical resource tree.
///
/// Order: `--source`, then `$KITT_SOURCE`, then the current directory if it
/// contains at least one kind directory.
///
/// # Errors
///
/// Returns [`ConfigError::MissingSource`] if none of those applies.
pub fn resolve_source_root(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(root) = explicit {
        return Ok(root.to_path_buf());
    }
    if let Ok(root) = std::env::var(SOURCE_ENV)
        && !root.is_empty()
    {
        return Ok(PathBuf::from(root));
    }
    let cwd = std::env::current_dir().map_err(|e| ConfigError::MissingSource(e.to_string()))?;
    if looks_like_source(&cwd) {
        return Ok(cwd);
    }
    Err(ConfigError::MissingSource(format!(
        "{} has no agents/, commands/ or skills/ directory; use --source or set {SOURCE_ENV}",
        cwd.display()
    )))
}

/// Whether `dir` holds at least one kind directory.
fn looks_like_source(dir: &Path) -> bool {
    Kind::ALL.iter().any(|k| dir.join(k.dir_name()).is_dir())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn explicit_source_wins() {
        let root = resolve_source_root(Some(Path::new("/explicit/path"))).unwrap();
        assert_eq!(root, PathBuf::from("/explicit/path"));
    }

    #[test]
    fn kind_directory_marks_a_source_tree() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!looks_like_source(dir.path()));
        std::fs::create_dir(dir.path().join("commands")).unwrap();
        assert!(looks_like_source(dir.path()));
    }
}
