//! Installer configuration: namespace prefix and per-host install roots.
//!
//! Everything here has a default, so the config file is optional.  The file
//! lives at `<source>/kitt.toml` unless `--config` points elsewhere:
//!
//! ```toml
//! namespace = "kitt-"
//!
//! [hosts.gemini]
//! install_root = "/home/me/.gemini"
//!
//! [hosts.copilot]
//! enabled = false
//! ```
pub mod toml_loader;

use anyhow::{Context as _, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::matrix::{HostId, HostTarget};

/// Default config file name inside the source tree.
pub const CONFIG_FILE: &str = "kitt.toml";

/// Prefix shared by every installed artifact when none is configured.
pub const DEFAULT_NAMESPACE: &str = "kitt-";

/// The shared namespace prefix.
///
/// Resource names must start with it, and the installer only ever removes or
/// overwrites install-root entries that start with it.  It is passed to the
/// store and the installer explicitly so tests can use other prefixes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace(String);

impl Namespace {
    /// Validate and wrap a prefix.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidNamespace`] if `prefix` is empty or
    /// contains anything other than lowercase ASCII letters, digits and `-`.
    pub fn new(prefix: &str) -> Result<Self, ConfigError> {
        let valid = !prefix.is_empty()
            && prefix
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
            && !prefix.starts_with('-');
        if valid {
            Ok(Self(prefix.to_string()))
        } else {
            Err(ConfigError::InvalidNamespace(prefix.to_string()))
        }
    }

    /// The raw prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.0
    }

    /// Whether `name` belongs to this namespace (prefix plus at least one
    /// more character).
    #[must_use]
    pub fn owns(&self, name: &str) -> bool {
        name.len() > self.0.len() && name.starts_with(&self.0)
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self(DEFAULT_NAMESPACE.to_string())
    }
}

/// Per-host overrides from the config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostOverride {
    /// Replace the default `~/.<host>` install root.
    pub install_root: Option<PathBuf>,
    /// Set to `false` to never install for this host.
    pub enabled: Option<bool>,
}

/// On-disk shape of `kitt.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    namespace: Option<String>,
    hosts: BTreeMap<String, HostOverride>,
}

/// Resolved configuration.
#[derive(Debug)]
pub struct Config {
    /// Root of the canonical resource tree.
    pub source_root: PathBuf,
    /// Shared namespace prefix.
    pub namespace: Namespace,
    /// Host overrides keyed by host.
    pub hosts: BTreeMap<HostId, HostOverride>,
}

impl Config {
    /// Load configuration for the resource tree at `source_root`.
    ///
    /// Reads `config_path` if given, otherwise `<source_root>/kitt.toml`.
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed, names an unknown host,
    /// or sets an invalid namespace.
    pub fn load(source_root: &Path, config_path: Option<&Path>) -> Result<Self> {
        let path = config_path.map_or_else(|| source_root.join(CONFIG_FILE), Path::to_path_buf);
        let file: ConfigFile = toml_loader::load_config(&path)
            .with_context(|| format!("loading {}", path.display()))?;

        let namespace = match file.namespace {
            Some(prefix) => Namespace::new(&prefix)?,
            None => Namespace::default(),
        };

        let mut hosts = BTreeMap::new();
        for (key, host) in file.hosts {
            let id = key
                .parse::<HostId>()
                .map_err(|_| ConfigError::UnknownHost(key.clone()))?;
            hosts.insert(id, host);
        }

        Ok(Self {
            source_root: source_root.to_path_buf(),
            namespace,
            hosts,
        })
    }

    /// Resolve the install targets for the enabled hosts, in [`HostId::ALL`]
    /// order.  Hosts without an explicit `install_root` install below `home`.
    #[must_use]
    pub fn targets(&self, home: &Path) -> Vec<HostTarget> {
        HostId::ALL
            .into_iter()
            .filter_map(|id| {
                let host = self.hosts.get(&id);
                if host.and_then(|h| h.enabled) == Some(false) {
                    return None;
                }
                let root = host
                    .and_then(|h| h.install_root.clone())
                    .unwrap_or_else(|| home.join(id.profile().home_subdir));
                Some(HostTarget::new(id, root))
            })
            .collect()
    }
}

/// The user's home directory (`USERPROFILE` first on Windows, `HOME`
/// elsewhere).
///
/// # Errors
///
/// Returns [`ConfigError::NoHome`] if neither variable is set.
pub fn home_dir() -> Result<PathBuf, ConfigError> {
    let home = if cfg!(target_os = "windows") {
        std::env::var("USERPROFILE").or_else(|_| std::env::var("HOME"))
    } else {
        std::env::var("HOME")
    };
    home.map(PathBuf::from).map_err(|_| ConfigError::NoHome)
}
