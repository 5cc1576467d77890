//! Capability matrix: which resource kinds and capability tags each target
//! host supports.
//!
//! The table is static data.  Host capabilities are a property of each
//! external CLI's feature set, not of resource content, so eligibility is a
//! total, side-effect-free predicate ([`check`]) shared by the installer and
//! by the `matrix` report.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::store::Resource;

/// Kind of a canonical resource.
///
/// Variant order is the lexicographic order of the tags, which the store
/// relies on for its `(kind, name)` ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Kind {
    /// A sub-agent definition.
    Agent,
    /// A slash command.
    Command,
    /// A skill directory containing `SKILL.md`.
    Skill,
}

impl Kind {
    /// All kinds, in lexicographic order.
    pub const ALL: [Self; 3] = [Self::Agent, Self::Command, Self::Skill];

    /// Stable tag used in frontmatter and reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Agent => "agent",
            Self::Command => "command",
            Self::Skill => "skill",
        }
    }

    /// Directory holding this kind, both in the source tree and under each
    /// host's install root.
    #[must_use]
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Agent => "agents",
            Self::Command => "commands",
            Self::Skill => "skills",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown kind '{s}'"))
    }
}

/// A runtime feature a resource may require and a host may provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    /// Delegate work to a named sub-agent.
    InvokeSubagent,
    /// Load another skill through the host's skill tool.
    InvokeSkillTool,
    /// Create or edit the host's lifecycle hooks.
    ManageHooks,
    /// Read files outside the current project at runtime.
    ReadArbitraryFile,
}

impl Capability {
    /// All capability tags.
    pub const ALL: [Self; 4] = [
        Self::InvokeSubagent,
        Self::InvokeSkillTool,
        Self::ManageHooks,
        Self::ReadArbitraryFile,
    ];

    /// Stable tag used in frontmatter and skip reasons.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvokeSubagent => "invoke-subagent",
            Self::InvokeSkillTool => "invoke-skill-tool",
            Self::ManageHooks => "manage-hooks",
            Self::ReadArbitraryFile => "read-arbitrary-file",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown capability '{s}'"))
    }
}

/// Identity of a target host.  The set is closed and known at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostId {
    /// Claude Code: consumes the canonical format directly.
    Claude,
    /// Gemini CLI: TOML command files.
    Gemini,
    /// GitHub Copilot CLI: `.agent.md` files with its own header keys.
    Copilot,
}

impl HostId {
    /// All hosts, in report order.
    pub const ALL: [Self; 3] = [Self::Claude, Self::Gemini, Self::Copilot];

    /// Stable identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Claude => "claude",
            Self::Gemini => "gemini",
            Self::Copilot => "copilot",
        }
    }

    /// Human-readable name for logs and summaries.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Claude => "Claude CLI",
            Self::Gemini => "Gemini CLI",
            Self::Copilot => "Copilot CLI",
        }
    }

    /// The matrix row for this host.
    #[must_use]
    pub fn profile(self) -> &'static HostProfile {
        match self {
            Self::Claude => &HOSTS[0],
            Self::Gemini => &HOSTS[1],
            Self::Copilot => &HOSTS[2],
        }
    }
}

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HostId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|h| h.as_str() == s)
            .ok_or_else(|| format!("unknown host '{s}' (expected claude, gemini or copilot)"))
    }
}

/// How a host's artifacts are materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkStrategy {
    /// The host reads the canonical format; install a symlink to the source.
    SymlinkPassthrough,
    /// The host needs a different encoding; always regenerate a file.
    GenerateConvertedFile,
}

impl LinkStrategy {
    /// Short label for the matrix table.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SymlinkPassthrough => "symlink",
            Self::GenerateConvertedFile => "generate",
        }
    }
}

/// One row of the capability matrix.
#[derive(Debug)]
pub struct HostProfile {
    /// Host identity.
    pub id: HostId,
    /// Kinds the host can load.
    pub kinds: &'static [Kind],
    /// Capability tags the host's runtime can satisfy.
    pub capabilities: &'static [Capability],
    /// Link or generate.
    pub strategy: LinkStrategy,
    /// Install root relative to the user's home directory.
    pub home_subdir: &'static str,
}

/// The capability matrix.
///
/// Gemini and Copilot do not list [`Kind::Skill`]: neither CLI has a skill
/// loader today.  Adding it here is the only change needed once one does.
pub static HOSTS: [HostProfile; 3] = [
    HostProfile {
        id: HostId::Claude,
        kinds: &[Kind::Agent, Kind::Command, Kind::Skill],
        capabilities: &[
            Capability::InvokeSubagent,
            Capability::InvokeSkillTool,
            Capability::ManageHooks,
            Capability::ReadArbitraryFile,
        ],
        strategy: LinkStrategy::SymlinkPassthrough,
        home_subdir: ".claude",
    },
    HostProfile {
        id: HostId::Gemini,
        kinds: &[Kind::Command],
        capabilities: &[Capability::ReadArbitraryFile],
        strategy: LinkStrategy::GenerateConvertedFile,
        home_subdir: ".gemini",
    },
    HostProfile {
        id: HostId::Copilot,
        kinds: &[Kind::Agent],
        capabilities: &[Capability::InvokeSubagent, Capability::ReadArbitraryFile],
        strategy: LinkStrategy::GenerateConvertedFile,
        home_subdir: ".copilot",
    },
];

impl HostProfile {
    /// Whether the host can load resources of `kind`.
    #[must_use]
    pub fn supports_kind(&self, kind: Kind) -> bool {
        self.kinds.contains(&kind)
    }

    /// Whether the host's runtime provides `capability`.
    #[must_use]
    pub fn supports(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// On-disk name of the artifact for a resource on this host.
    ///
    /// Skills on a passthrough host are directory links named after the
    /// resource; everything else is a file with a host-specific extension.
    #[must_use]
    pub fn artifact_name(&self, kind: Kind, name: &str) -> String {
        match (self.id, kind) {
            (HostId::Claude, Kind::Skill) => name.to_string(),
            (HostId::Claude, _) => format!("{name}.md"),
            (HostId::Gemini, _) => format!("{name}.toml"),
            (HostId::Copilot, _) => format!("{name}.agent.md"),
        }
    }
}

/// Why a resource is not installed for a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The host cannot load this kind at all.
    UnsupportedKind(Kind),
    /// The resource requires a capability the host lacks.
    UnsupportedCapability(Capability),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedKind(kind) => write!(f, "unsupported-kind: {kind}"),
            Self::UnsupportedCapability(cap) => write!(f, "unsupported-capability: {cap}"),
        }
    }
}

/// A host paired with the directory its artifacts are installed into.
#[derive(Debug, Clone)]
pub struct HostTarget {
    /// Matrix row.
    pub profile: &'static HostProfile,
    /// Install root (e.g. `~/.gemini`); artifacts live in per-kind
    /// subdirectories below it.
    pub install_root: PathBuf,
}

impl HostTarget {
    /// Pair `id` with `install_root`.
    #[must_use]
    pub fn new(id: HostId, install_root: impl Into<PathBuf>) -> Self {
        Self {
            profile: id.profile(),
            install_root: install_root.into(),
        }
    }

    /// Host identity.
    #[must_use]
    pub const fn id(&self) -> HostId {
        self.profile.id
    }

    /// Directory holding artifacts of `kind`.
    #[must_use]
    pub fn kind_dir(&self, kind: Kind) -> PathBuf {
        self.install_root.join(kind.dir_name())
    }

    /// Full artifact path for a resource of `kind` named `name`.
    #[must_use]
    pub fn artifact_path(&self, kind: Kind, name: &str) -> PathBuf {
        self.kind_dir(kind)
            .join(self.profile.artifact_name(kind, name))
    }
}

/// Decide whether `resource` may be installed on `host`.
///
/// The kind is checked first, then each required capability in declared
/// order, so the reported reason is stable across runs.
///
/// # Errors
///
/// Returns the first [`SkipReason`] that makes the resource ineligible.
pub fn check(resource: &Resource, host: &HostProfile) -> Result<(), SkipReason> {
    if !host.supports_kind(resource.kind) {
        return Err(SkipReason::UnsupportedKind(resource.kind));
    }
    resource
        .metadata
        .required_capabilities
        .iter()
        .find(|cap| !host.supports(**cap))
        .map_or(Ok(()), |cap| Err(SkipReason::UnsupportedCapability(*cap)))
}

/// `true` iff `resource.kind ∈ host.kinds` and every required capability is
/// provided by `host`.
#[must_use]
pub fn is_eligible(resource: &Resource, host: &HostProfile) -> bool {
    check(resource, host).is_ok()
}

/// Render the matrix as a fixed-width text table.
#[must_use]
pub fn render_table() -> String {
    let mut out = format!("{:<8} {:<22} {:<9} {}\n", "host", "kinds", "strategy", "capabilities");
    for host in &HOSTS {
        let kinds: Vec<&str> = host.kinds.iter().map(|k| k.as_str()).collect();
        let caps: Vec<&str> = host.capabilities.iter().map(|c| c.as_str()).collect();
        out.push_str(&format!(
            "{:<8} {:<22} {:<9} {}\n",
            host.id.as_str(),
            kinds.join(","),
            host.strategy.as_str(),
            caps.join(",")
        ));
    }
    out
}
