//! Flat-file converter: a single markdown file with the host's own header
//! keys (`name`, `description`, `tools`) followed by the body.
use serde::Serialize;

use super::{Payload, Rendered, dropped_except};
use crate::store::Resource;

/// Attributes with a header key on the host.
const KEPT: &[&str] = &["description", "tools"];

/// Canonical tool names and their host equivalents.  Unlisted tools are
/// lowercased.
const TOOL_MAP: &[(&str, &str)] = &[
    ("Read", "read"),
    ("Write", "edit"),
    ("Edit", "edit"),
    ("Grep", "search"),
    ("Glob", "search"),
    ("Bash", "shell"),
    ("Task", "custom-agent"),
];

#[derive(Serialize)]
struct Header<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<String>,
}

/// Translate one canonical tool name.
#[must_use]
pub fn map_tool(tool: &str) -> String {
    TOOL_MAP
        .iter()
        .find(|(from, _)| *from == tool)
        .map_or_else(|| tool.to_lowercase(), |(_, to)| (*to).to_string())
}

/// Render `resource` as a host markdown file.
///
/// # Errors
///
/// Returns the serializer's message if the header cannot be encoded.
pub fn render(resource: &Resource) -> Result<Rendered, String> {
    let mut tools: Vec<String> = resource.metadata.tools.iter().map(|t| map_tool(t)).collect();
    tools.sort_unstable();
    tools.dedup();

    let header = Header {
        name: &resource.name,
        description: resource.metadata.description.as_deref(),
        tools,
    };
    let yaml = serde_yaml::to_string(&header)
        .map_err(|e| format!("cannot encode header for {}: {e}", resource.name))?;
    let content = format!("---\n{}\n---\n\n{}", yaml.trim_end(), resource.body);

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
    use crate::matrix::{Capability, Kind};
    use crate::store::frontmatter;
    use crate::store::test_helpers::resource;

    fn content(rendered: &Rendered) -> &str {
        match &rendered.payload {
            Payload::File(text) => text,
            Payload::Link(_) => panic!("expected file payload"),
        }
    }

    #[test]
    fn map_tool_translates_known_and_lowercases_rest() {
        assert_eq!(map_tool("Read"), "read");
        assert_eq!(map_tool("Write"), "edit");
        assert_eq!(map_tool("Glob"), "search");
        assert_eq!(map_tool("Task"), "custom-agent");
        assert_eq!(map_tool("WebFetch"), "webfetch");
    }

    #[test]
    fn header_then_blank_line_then_body() {
        let mut r = resource(Kind::Agent, "kitt-mentor", &[Capability::InvokeSubagent]);
        r.metadata.description = Some("Guides juniors".to_string());
        r.metadata.tools = ["Read", "Grep", "Glob", "Bash", "Edit", "Write"]
            .map(String::from)
            .to_vec();
        r.body = "# Mentor\n\nBe kind.\n".to_string();

        let rendered = render(&r).unwrap();
        let text = content(&rendered);
        assert!(text.starts_with("---\nname: kitt-mentor\n"));
        assert!(text.ends_with("\n---\n\n# Mentor\n\nBe kind.\n"));

        let (header, body) = frontmatter::split(text).unwrap();
        assert_eq!(body, r.body);
        let value: serde_yaml::Value = serde_yaml::from_str(header).unwrap();
        assert_eq!(value["description"], "Guides juniors");
        let tools: Vec<&str> = value["tools"]
            .as_sequence()
            .unwrap()
            .iter()
            .map(|t| t.as_str().unwrap())
            .collect();
        assert_eq!(tools, vec!["edit", "read", "search", "shell"]);
    }

    #[test]
    fn omits_empty_keys() {
        let r = resource(Kind::Agent, "kitt-bare", &[]);
        let rendered = render(&r).unwrap();
        let text = content(&rendered);
        assert!(!text.contains("tools"));
        assert!(!text.contains("description"));
        assert!(rendered.dropped.is_empty());
    }

    #[test]
    fn records_dropped_attributes() {
        let mut r = resource(Kind::Agent, "kitt-mentor", &[]);
        r.metadata.display_name = Some("Mentor".to_string());
        r.metadata
            .extra
            .insert("model".to_string(), serde_yaml::Value::from("sonnet"));
        r.metadata.tools = vec!["Read".to_string()];

        let rendered = render(&r).unwrap();
        assert_eq!(rendered.dropped, vec!["display-name", "model"]);
    }
}
