//! Idempotent artifact primitives (check + apply pattern).
//!
//! Each planned artifact is checked against disk first; only `Missing` and
//! `Incorrect` artifacts are written, which is what makes a second run with
//! unchanged inputs perform zero writes.
pub mod file;
pub mod helpers;
pub mod link;

use anyhow::Result;

use crate::convert::{Artifact, Payload};

pub use file::FileArtifact;
pub use link::LinkArtifact;

/// State of an artifact path on disk.
///
/// # Examples
///
/// ```
/// use kitt_cli::materialize::ArtifactState;
///
/// let missing = ArtifactState::Missing;
/// let wrong = ArtifactState::Incorrect { current: "points to /old".into() };
///
/// assert_ne!(missing, ArtifactState::Correct);
/// assert!(wrong.needs_write());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactState {
    /// Nothing exists at the path.
    Missing,
    /// The path already holds the expected link or content.
    Correct,
    /// Something exists but differs from what is expected.
    Incorrect {
        /// Description of what is there now.
        current: String,
    },
    /// The artifact cannot be materialized (e.g. its link source is gone).
    Invalid {
        /// Why the path cannot be written.
        reason: String,
    },
}

impl ArtifactState {
    /// Whether applying would change the filesystem.
    #[must_use]
    pub const fn needs_write(&self) -> bool {
        matches!(self, Self::Missing | Self::Incorrect { .. })
    }
}

/// Something that can be checked against disk and written.
pub trait Materialize {
    /// Human-readable description for logs.
    fn description(&self) -> String;

    /// Inspect the destination without modifying it.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination cannot be inspected.
    fn current_state(&self) -> Result<ArtifactState>;

    /// Create or replace the destination.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or the
    /// destination cannot be written.
    fn apply(&self) -> Result<()>;
}

/// Build the primitive that materializes `artifact`.
#[must_use]
pub fn for_artifact(artifact: &Artifact) -> Box<dyn Materialize + Send + Sync> {
    match &artifact.payload {
        Payload::Link(source) => Box::new(LinkArtifact::new(source.clone(), artifact.path.clone())),
        Payload::File(content) => {
            Box::new(FileArtifact::new(artifact.path.clone(), content.clone()))
        }
    }
}
