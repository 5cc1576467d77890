//! Frontmatter parsing for canonical resource files.
//!
//! A resource file starts with a YAML block delimited by `---` lines,
//! followed by the free-text body.
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

use crate::error::ValidationError;
use crate::matrix::Capability;

const DELIMITER: &str = "---";

/// Declared attributes of a resource, excluding its `name` and `kind`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    /// Human-readable name.
    pub display_name: Option<String>,
    /// One-line description.
    pub description: Option<String>,
    /// Capability tags the body assumes, in declared order.
    pub required_capabilities: Vec<Capability>,
    /// Host tool bindings (e.g. `Read`, `Bash`).
    pub tools: Vec<String>,
    /// Any other header keys, kept verbatim.
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Metadata {
    /// Names of the attributes this resource actually declares, in header
    /// key spelling.  `required-capabilities` is not listed: it drives
    /// eligibility and is never carried into an artifact.
    #[must_use]
    pub fn attribute_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        if self.display_name.is_some() {
            names.push("display-name".to_string());
        }
        if self.description.is_some() {
            names.push("description".to_string());
        }
        if !self.tools.is_empty() {
            names.push("tools".to_string());
        }
        names.extend(self.extra.keys().cloned());
        names
    }
}

/// Parsed header block.
#[derive(Debug, Default)]
pub struct Frontmatter {
    /// Explicit `name`, if any.
    pub name: Option<String>,
    /// Explicit `kind`, if any (validated by the caller).
    pub kind: Option<String>,
    /// Everything else.
    pub metadata: Metadata,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct RawFrontmatter {
    name: Option<String>,
    kind: Option<String>,
    display_name: Option<String>,
    description: Option<String>,
    #[serde(alias = "requiredCapabilities")]
    required_capabilities: Vec<String>,
    #[serde(deserialize_with = "deserialize_tools")]
    tools: Vec<String>,
    #[serde(flatten)]
    extra: BTreeMap<String, serde_yaml::Value>,
}

/// `tools` may be a YAML list or a comma-separated string.
#[derive(Deserialize)]
#[serde(untagged)]
enum ToolsField {
    List(Vec<String>),
    Csv(String),
}

fn deserialize_tools<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let tools = match Option::<ToolsField>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(ToolsField::List(list)) => list,
        Some(ToolsField::Csv(csv)) => csv.split(',').map(str::to_string).collect(),
    };
    Ok(tools
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect())
}

/// Split `content` into the header text and the body.
///
/// The body starts after the closing delimiter with leading blank lines
/// removed; it is otherwise returned unchanged.
///
/// # Errors
///
/// Returns a message if the opening or closing delimiter is missing.
pub fn split(content: &str) -> Result<(&str, &str), String> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines = content.split_inclusive('\n');
    let first = lines.next().ok_or_else(|| "file is empty".to_string())?;
    if first.trim_end() != DELIMITER {
        return Err("missing opening '---' line".to_string());
    }

    let start = first.len();
    let mut offset = start;
    for line in lines {
        if line.trim_end() == DELIMITER {
            let header = content.get(start..offset).unwrap_or_default();
            let body = content.get(offset + line.len()..).unwrap_or_default();
            return Ok((header, body.trim_start_matches(['\r', '\n'])));
        }
        offset += line.len();
    }
    Err("unterminated frontmatter: no closing '---' line".to_string())
}

/// Parse the YAML header of the file at `path` (used in error messages).
///
/// # Errors
///
/// Returns [`ValidationError::Malformed`] for invalid YAML and
/// [`ValidationError::UnknownCapability`] for an unrecognised tag.
pub fn parse(header: &str, path: &str) -> Result<Frontmatter, ValidationError> {
    let raw: RawFrontmatter = if header.trim().is_empty() {
        RawFrontmatter::default()
    } else {
        serde_yaml::from_str(header).map_err(|e| ValidationError::Malformed {
            path: path.to_string(),
            message: e.to_string(),
        })?
    };

    let required_capabilities = raw
        .required_capabilities
        .iter()
        .map(|tag| {
            tag.parse::<Capability>()
                .map_err(|_| ValidationError::UnknownCapability {
                    path: path.to_string(),
                    tag: tag.clone(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Frontmatter {
        name: raw.name,
        kind: raw.kind,
        metadata: Metadata {
            display_name: raw.display_name,
            description: raw.description,
            required_capabilities,
            tools: raw.tools,
            extra: raw.extra,
        },
    })
}
