//! Passthrough converter: the host reads the canonical format, so the
//! artifact is a link back into the source tree and nothing is dropped.
use super::{Payload, Rendered};
use crate::store::Resource;

/// Link to the canonical file (or skill directory).
#[must_use]
pub fn render(resource: &Resource) -> Rendered {
    Rendered {
        payload: Payload::Link(resource.source.clone()),
        dropped: Vec::new(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::matrix::Kind;
    use crate::store::test_helpers::resource;
    use std::path::PathBuf;

    #[test]
    fn links_skill_directory() {
        let r = resource(Kind::Skill, "kitt-demo", &[]);
        let rendered = render(&r);
        assert_eq!(
            rendered.payload,
            Payload::Link(PathBuf::from("/src/skills/kitt-demo"))
        );
        assert!(rendered.dropped.is_empty());
    }

    #[test]
    fn keeps_every_attribute() {
        let mut r = resource(Kind::Command, "kitt-debug", &[]);
        r.metadata.description = Some("Debug".to_string());
        r.metadata.tools = vec!["Bash".to_string()];
        assert!(render(&r).dropped.is_empty());
    }
}
