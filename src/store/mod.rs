//! Resource store: loads and validates canonical resource definitions.
//!
//! Source tree layout:
//!
//! ```text
//! <source>/commands/<name>.md
//! <source>/agents/<name>.md
//! <source>/skills/<name>/SKILL.md
//! ```
//!
//! A file that fails validation is rejected on its own; the rest of the
//! library still loads.
pub mod frontmatter;

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::Namespace;
use crate::error::{ConfigError, KittError, ValidationError};
use crate::matrix::Kind;

pub use frontmatter::Metadata;

/// Entry file inside a skill directory.
pub const SKILL_FILE: &str = "SKILL.md";

const MAX_NAME_LEN: usize = 64;

/// A named unit of assistant behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    /// Command, agent or skill.
    pub kind: Kind,
    /// Namespaced name, unique within its kind.
    pub name: String,
    /// Declared attributes.
    pub metadata: Metadata,
    /// Prompt text, passed through unmodified by every converter.
    pub body: String,
    /// Canonical location: the markdown file, or the directory for skills.
    pub source: PathBuf,
}

/// A source file (or whole kind directory) that failed validation.
///
/// The installer keeps whatever a rejected resource installed earlier, so a
/// broken edit never uninstalls a working artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejected {
    /// Offending file.
    pub path: PathBuf,
    /// Validation message.
    pub reason: String,
    /// Kind implied by the source directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<Kind>,
    /// Name the resource would have had.  `None` when the whole kind
    /// directory could not be listed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Result of one [`ResourceStore::load_all`] call.
#[derive(Debug, Default)]
pub struct StoreSnapshot {
    /// Valid resources, sorted by `(kind, name)`.
    pub resources: Vec<Resource>,
    /// Rejected files, sorted by path.
    pub rejected: Vec<Rejected>,
}

/// Reads the canonical resource tree.
#[derive(Debug)]
pub struct ResourceStore {
    root: PathBuf,
    namespace: Namespace,
}

impl ResourceStore {
    /// Create a store over the tree at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, namespace: Namespace) -> Self {
        Self {
            root: root.into(),
            namespace,
        }
    }

    /// Root of the source tree.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load every resource in the tree.
    ///
    /// Pure read: repeated calls over an unchanged tree return equal
    /// snapshots regardless of directory iteration order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSource`] if the root is not a directory.
    /// Per-file problems are reported in [`StoreSnapshot::rejected`].
    /// Sources in the snapshot are absolute: the root is canonicalized first,
    /// so a relative root still yields links that resolve from any directory.
    pub fn load_all(&self) -> Result<StoreSnapshot, KittError> {
        let missing = || ConfigError::MissingSource(self.root.display().to_string());
        let root = dunce::canonicalize(&self.root).map_err(|_| missing())?;
        if !root.is_dir() {
            return Err(missing().into());
        }
        let store = Self {
            root,
            namespace: self.namespace.clone(),
        };
        Ok(store.scan())
    }

    fn scan(&self) -> StoreSnapshot {
        let mut snapshot = StoreSnapshot::default();
        let mut seen: BTreeMap<(Kind, String), PathBuf> = BTreeMap::new();

        for kind in Kind::ALL {
            let candidates = match self.candidates(kind) {
                Ok(c) => c,
                Err(e) => {
                    snapshot.rejected.push(Rejected {
                        path: self.root.join(kind.dir_name()),
                        reason: e.to_string(),
                        kind: Some(kind),
                        name: None,
                    });
                    continue;
                }
            };

            for (source, file) in candidates {
                let result = self.load_one(kind, &source, &file).and_then(|resource| {
                    let key = (kind, resource.name.clone());
                    if let Some(first) = seen.get(&key) {
                        return Err(ValidationError::Duplicate {
                            path: self.display(&file),
                            kind: kind.to_string(),
                            name: resource.name,
                            first: self.display(first),
                        });
                    }
                    seen.insert(key, file.clone());
                    Ok(resource)
                });
                match result {
                    Ok(resource) => snapshot.resources.push(resource),
                    Err(e) => {
                        let name = match &e {
                            ValidationError::Duplicate { name, .. } => name.clone(),
                            _ => default_name(kind, &source),
                        };
                        snapshot.rejected.push(Rejected {
                            path: file,
                            reason: e.to_string(),
                            kind: Some(kind),
                            name: Some(name),
                        });
                    }
                }
            }
        }

        snapshot
            .resources
            .sort_by(|a, b| (a.kind, &a.name).cmp(&(b.kind, &b.name)));
        snapshot.rejected.sort_by(|a, b| a.path.cmp(&b.path));
        snapshot
    }

    /// List `(source, file)` pairs for `kind`, sorted by file path so the
    /// first of two colliding definitions is always the same one.
    fn candidates(&self, kind: Kind) -> Result<Vec<(PathBuf, PathBuf)>, ValidationError> {
        let dir = self.root.join(kind.dir_name());
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let entries = std::fs::read_dir(&dir).map_err(|source| ValidationError::Io {
            path: self.display(&dir),
            source,
        })?;

        let mut found = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if file_name.starts_with('.') {
                continue;
            }
            match kind {
                Kind::Skill => {
                    let skill_file = path.join(SKILL_FILE);
                    if path.is_dir() && skill_file.is_file() {
                        found.push((path, skill_file));
                    }
                }
                Kind::Agent | Kind::Command => {
                    if file_name.ends_with(".md") && path.is_file() {
                        found.push((path.clone(), path));
                    }
                }
            }
        }
        found.sort_by(|a, b| a.1.cmp(&b.1));
        Ok(found)
    }

    fn load_one(&self, kind: Kind, source: &Path, file: &Path) -> Result<Resource, ValidationError> {
        let path = self.display(file);
        let content = std::fs::read_to_string(file).map_err(|source| ValidationError::Io {
            path: path.clone(),
            source,
        })?;
        let (header, body) =
            frontmatter::split(&content).map_err(|message| ValidationError::Malformed {
                path: path.clone(),
                message,
            })?;
        let parsed = frontmatter::parse(header, &path)?;

        if let Some(declared) = parsed.kind.as_deref() {
            let declared_kind =
                declared
                    .parse::<Kind>()
                    .map_err(|_| ValidationError::UnknownKind {
                        path: path.clone(),
                        kind: declared.to_string(),
                    })?;
            if declared_kind != kind {
                return Err(ValidationError::KindMismatch {
                    path,
                    declared: declared.to_string(),
                    expected: kind.to_string(),
                });
            }
        }

        let name = match parsed.name {
            Some(name) => name,
            None => default_name(kind, source),
        };
        if !self.namespace.owns(&name) {
            return Err(ValidationError::MissingPrefix {
                path,
                name,
                prefix: self.namespace.prefix().to_string(),
            });
        }
        if !validate_name(&name) {
            return Err(ValidationError::InvalidName { path, name });
        }

        Ok(Resource {
            kind,
            name,
            metadata: parsed.metadata,
            body: body.to_string(),
            source: source.to_path_buf(),
        })
    }

    fn display(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .display()
            .to_string()
    }
}

/// File stem for commands and agents, directory name for skills.
fn default_name(kind: Kind, source: &Path) -> String {
    let part = match kind {
        Kind::Skill => source.file_name(),
        Kind::Agent | Kind::Command => source.file_stem(),
    };
    part.map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Whether `name` is usable as an artifact file name on every host:
/// lowercase ASCII, digits and single hyphens, 1-64 chars.
#[must_use]
pub fn validate_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_NAME_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !name.starts_with('-')
        && !name.ends_with('-')
        && !name.contains("--")
}
