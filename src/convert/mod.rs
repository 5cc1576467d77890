//! Per-host converters from canonical resources to native artifacts.
//!
//! The host set is closed, so the converters are a closed enum selected by
//! [`HostId`] rather than a trait object per host.
pub mod flat_file;
pub mod passthrough;
pub mod structured;

use std::path::PathBuf;

use crate::matrix::{self, HostId, HostTarget, SkipReason};
use crate::store::Resource;

/// What gets materialized at an artifact path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// A symbolic link to this canonical source.
    Link(PathBuf),
    /// A generated file with this content.
    File(String),
}

/// A fully rendered artifact, ready to reconcile against disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Destination path under the host's install root.
    pub path: PathBuf,
    /// Link target or file content.
    pub payload: Payload,
    /// Metadata attributes with no equivalent in the host's format.
    pub dropped: Vec<String>,
}

/// Result of converting one resource for one host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conversion {
    /// The artifact was produced.
    Ready(Artifact),
    /// The host cannot use the resource.
    Skipped(SkipReason),
    /// Rendering failed; nothing is emitted.
    Failed(String),
}

/// Payload plus dropped attributes, as produced by each converter.
#[derive(Debug)]
pub struct Rendered {
    /// Link target or file content.
    pub payload: Payload,
    /// Attributes that did not survive conversion.
    pub dropped: Vec<String>,
}

/// Converter variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Converter {
    /// Link to the canonical source.
    Passthrough,
    /// Re-serialize into a structured config file (TOML).
    StructuredConfig,
    /// Single markdown file with host-specific header keys.
    FlatFile,
}

impl Converter {
    /// The converter used for `host`.
    #[must_use]
    pub const fn for_host(host: HostId) -> Self {
        match host {
            HostId::Claude => Self::Passthrough,
            HostId::Gemini => Self::StructuredConfig,
            HostId::Copilot => Self::FlatFile,
        }
    }

    /// Convert `resource` for `target`.
    ///
    /// Eligibility is re-checked first, so an ineligible resource is always
    /// `Skipped` even if the caller did not filter it.
    #[must_use]
    pub fn convert(self, resource: &Resource, target: &HostTarget) -> Conversion {
        if let Err(reason) = matrix::check(resource, target.profile) {
            return Conversion::Skipped(reason);
        }
        let rendered = match self {
            Self::Passthrough => Ok(passthrough::render(resource)),
            Self::StructuredConfig => structured::render(resource),
            Self::FlatFile => flat_file::render(resource),
        };
        match rendered {
            Ok(Rendered { payload, dropped }) => Conversion::Ready(Artifact {
                path: target.artifact_path(resource.kind, &resource.name),
                payload,
                dropped,
            }),
            Err(message) => Conversion::Failed(message),
        }
    }
}

/// Attributes declared by `resource` that are not in `kept`.
fn dropped_except(resource: &Resource, kept: &[&str]) -> Vec<String> {
    resource
        .metadata
        .attribute_names()
        .into_iter()
        .filter(|name| !kept.contains(&name.as_str()))
        .collect()
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::matrix::{Capability, Kind};
    use crate::store::test_helpers::resource;

    #[test]
    fn for_host_dispatch_table() {
        assert_eq!(Converter::for_host(HostId::Claude), Converter::Passthrough);
        assert_eq!(Converter::for_host(HostId::Gemini), Converter::StructuredConfig);
        assert_eq!(Converter::for_host(HostId::Copilot), Converter::FlatFile);
    }

    #[test]
    fn convert_skips_ineligible_resource_defensively() {
        let target = HostTarget::new(HostId::Gemini, "/h/.gemini");
        let r = resource(Kind::Command, "kitt-hooks", &[Capability::ManageHooks]);
        assert_eq!(
            Converter::StructuredConfig.convert(&r, &target),
            Conversion::Skipped(SkipReason::UnsupportedCapability(Capability::ManageHooks))
        );
    }

    #[test]
    fn convert_skips_unsupported_kind() {
        let target = HostTarget::new(HostId::Copilot, "/h/.copilot");
        let r = resource(Kind::Command, "kitt-debug", &[]);
        assert_eq!(
            Converter::for_host(HostId::Copilot).convert(&r, &target),
            Conversion::Skipped(SkipReason::UnsupportedKind(Kind::Command))
        );
    }

    #[test]
    fn convert_places_artifact_by_naming_rule() {
        let target = HostTarget::new(HostId::Copilot, "/h/.copilot");
        let r = resource(Kind::Agent, "kitt-mentor", &[Capability::InvokeSubagent]);
        let Conversion::Ready(artifact) = Converter::FlatFile.convert(&r, &target) else {
            panic!("expected ready conversion");
        };
        assert_eq!(
            artifact.path,
            PathBuf::from("/h/.copilot/agents/kitt-mentor.agent.md")
        );
    }

    #[test]
    fn dropped_except_keeps_listed_attributes() {
        let mut r = resource(Kind::Command, "kitt-a", &[]);
        r.metadata.description = Some("d".to_string());
        r.metadata
            .extra
            .insert("model".to_string(), serde_yaml::Value::from("opus"));
        assert_eq!(dropped_except(&r, &["description"]), vec!["model"]);
    }
}
