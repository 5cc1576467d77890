//! Domain-specific error types for the resource installer.
//!
//! Internal modules return typed errors built with [`thiserror`]; command
//! handlers at the CLI boundary convert them to [`anyhow::Error`] via `?`.
//!
//! # Error hierarchy
//!
//! ```text
//! KittError
//! ├── Config(ConfigError)          : config file, namespace, install roots
//! ├── Validation(ValidationError)  : one malformed or colliding resource file
//! └── Install(InstallError)        : reconciliation of one host directory
//! ```
//!
//! A skipped resource (unsupported kind or capability) is deliberately not an
//! error: it is a routine [`Outcome`](crate::report::Outcome).

use thiserror::Error;

/// Top-level error type for the installer.
#[derive(Error, Debug)]
pub enum KittError {
    /// Configuration-related error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A canonical resource definition failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Reconciling a host's install directory failed.
    #[error("Install error: {0}")]
    Install(#[from] InstallError),
}

/// Errors that arise from configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The namespace prefix is empty or contains characters that are not
    /// valid in an artifact file name.
    #[error("Invalid namespace prefix '{0}': use lowercase letters, digits and '-'")]
    InvalidNamespace(String),

    /// A host id in the config file is not one of the known hosts.
    #[error("Unknown host '{0}': must be one of claude, gemini, copilot")]
    UnknownHost(String),

    /// Neither `HOME` nor `USERPROFILE` is set, so default install roots
    /// cannot be derived.
    #[error("cannot determine home directory: neither HOME nor USERPROFILE is set")]
    NoHome,

    /// The resource source tree does not exist or is not a directory.
    #[error("Resource source tree not found: {0}")]
    MissingSource(String),
}

/// Errors raised while loading a single canonical resource file.
///
/// These are fatal to that file only: the store records them and keeps
/// loading the rest of the library.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// The structured header block is absent, unterminated or not valid YAML.
    #[error("{path}: malformed frontmatter: {message}")]
    Malformed {
        /// Source file.
        path: String,
        /// Parser message.
        message: String,
    },

    /// The frontmatter declares a kind outside `command`, `agent`, `skill`.
    #[error("{path}: unknown kind '{kind}' (expected command, agent or skill)")]
    UnknownKind {
        /// Source file.
        path: String,
        /// The declared kind.
        kind: String,
    },

    /// The frontmatter kind disagrees with the directory the file lives in.
    #[error("{path}: declared kind '{declared}' does not match directory kind '{expected}'")]
    KindMismatch {
        /// Source file.
        path: String,
        /// Kind declared in the frontmatter.
        declared: String,
        /// Kind implied by the source directory.
        expected: String,
    },

    /// A required capability tag is not known to the capability matrix.
    #[error("{path}: unknown capability '{tag}'")]
    UnknownCapability {
        /// Source file.
        path: String,
        /// The unrecognised tag.
        tag: String,
    },

    /// The resource name does not carry the shared namespace prefix.
    #[error("{path}: name '{name}' does not start with namespace prefix '{prefix}'")]
    MissingPrefix {
        /// Source file.
        path: String,
        /// Resource name.
        name: String,
        /// Expected prefix.
        prefix: String,
    },

    /// The resource name is not usable as an artifact file name.
    #[error("{path}: invalid name '{name}': use lowercase letters, digits and single '-'")]
    InvalidName {
        /// Source file.
        path: String,
        /// Resource name.
        name: String,
    },

    /// Another resource of the same kind already uses this name.
    #[error("{path}: duplicate {kind} '{name}' (already defined by {first})")]
    Duplicate {
        /// Source file of the rejected duplicate.
        path: String,
        /// Resource kind.
        kind: String,
        /// Colliding name.
        name: String,
        /// Source file of the resource that was kept.
        first: String,
    },

    /// The file could not be read.
    #[error("{path}: {source}")]
    Io {
        /// Source file.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors that arise while reconciling one host's install directory.
#[derive(Error, Debug)]
pub enum InstallError {
    /// A planned write or removal falls outside the namespace-prefixed scope
    /// of the install root.  The host's reconciliation is aborted before any
    /// change is made.
    #[error("refusing to touch {path}: {reason}")]
    ReconciliationHazard {
        /// Offending path.
        path: String,
        /// Why the path is out of scope.
        reason: String,
    },

    /// An install directory could not be listed.
    #[error("cannot list {path}: {source}")]
    List {
        /// Directory that could not be read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The install root's lock file could not be created or locked.
    #[error("cannot lock {path}: {source}")]
    Lock {
        /// Lock file path.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}
