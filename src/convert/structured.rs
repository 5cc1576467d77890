//! Structured-config converter: TOML command files.
//!
//! ```toml
//! description = "One-line summary"
//! prompt = """
//! body, verbatim
//! """
//! ```
use serde::Serialize;

use super::{Payload, Rendered, dropped_except};
use crate::store::Resource;

/// Attributes with a field in the TOML schema.
const KEPT: &[&str] = &["description"];

#[derive(Serialize)]
struct CommandFile<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    prompt: &'a str,
}

/// Serialize `resource` as a TOML command.
///
/// # Errors
///
/// Returns the serializer's message if the document cannot be encoded.
pub fn render(resource: &Resource) -> Result<Rendered, String> {
    let file = CommandFile {
        description: resource.metadata.description.as_deref(),
        prompt: &resource.body,
    };
    let content = toml::to_string(&file)
        .map_err(|e| format!("cannot encode {} as TOML: {e}", resource.name))?;
    Ok(Rendered {
        payload: Payload::File(content),
        dropped: dropped_except(resource, KEPT),
    })
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
    use crate::matrix::Kind;
    use crate::store::test_helpers::resource;

    #[derive(serde::Deserialize)]
    struct Parsed {
        description: Option<String>,
        prompt: String,
    }

    fn content(rendered: &Rendered) -> &str {
        match &rendered.payload {
            Payload::File(text) => text,
            Payload::Link(_) => panic!("expected file payload"),
        }
    }

    #[test]
    fn prompt_carries_body_verbatim() {
        let mut r = resource(Kind::Command, "kitt-debug", &[]);
        r.body = "Use $ARGUMENTS.\nQuotes: \"x\" and '''y'''\nBackslash: C:\\tmp\n".to_string();
        r.metadata.description = Some("Debug a failure".to_string());

        let rendered = render(&r).unwrap();
        let parsed: Parsed = toml::from_str(content(&rendered)).unwrap();
        assert_eq!(parsed.prompt, r.body);
        assert_eq!(parsed.description.as_deref(), Some("Debug a failure"));
    }

    #[test]
    fn description_is_optional() {
        let r = resource(Kind::Command, "kitt-debug", &[]);
        let rendered = render(&r).unwrap();
        let text = content(&rendered);
        assert!(!text.contains("description"));
        let parsed: Parsed = toml::from_str(text).unwrap();
        assert!(parsed.description.is_none());
    }

    #[test]
    fn records_dropped_attributes() {
        let mut r = resource(Kind::Command, "kitt-debug", &[]);
        r.metadata.description = Some("d".to_string());
        r.metadata.display_name = Some("Debug".to_string());
        r.metadata.tools = vec!["Bash".to_string()];
        r.metadata
            .extra
            .insert("argument-hint".to_string(), serde_yaml::Value::from("<file>"));

        let rendered = render(&r).unwrap();
        assert_eq!(rendered.dropped, vec!["display-name", "tools", "argument-hint"]);
    }
}
