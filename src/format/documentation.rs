//! `documentation.json` parsing and serialization

use serde::Deserialize;

use crate::error::{CatalogError, Result};
use crate::model::{DocumentationStatus, ProjectDocumentation};
use crate::version::Version;

#[derive(Debug, Deserialize)]
struct RawDocumentation {
    version: String,
    #[serde(default)]
    antora: bool,
    #[serde(default)]
    api: Option<String>,
    #[serde(rename = "ref", default)]
    reference: Option<String>,
    #[serde(default)]
    status: Option<DocumentationStatus>,
    #[serde(default)]
    current: bool,
}

impl From<RawDocumentation> for ProjectDocumentation {
    fn from(raw: RawDocumentation) -> Self {
        let status = raw
            .status
            .unwrap_or_else(|| DocumentationStatus::from_version(&Version::parse(&raw.version)));
        ProjectDocumentation {
            version: raw.version,
            is_antora: raw.antora,
            api_doc_url: raw.api,
            reference_doc_url: raw.reference,
            status,
            current: raw.current,
        }
    }
}

/// Parse a documentation manifest. Entries keep their stored order and
/// `current` flags.
///
/// An empty file is an empty list.
pub fn parse_documentation(path: &str, text: &str) -> Result<Vec<ProjectDocumentation>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let raw: Vec<RawDocumentation> =
        serde_json::from_str(text).map_err(|e| CatalogError::malformed(path, e))?;
    Ok(raw.into_iter().map(ProjectDocumentation::from).collect())
}

/// Serialize a documentation list in manifest format.
pub fn to_json(docs: &[ProjectDocumentation]) -> Result<String> {
    serde_json::to_string_pretty(docs).map_err(|e| CatalogError::malformed("documentation", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manifest() {
        let json = r#"[
            {"version": "3.2.1", "antora": true,
             "api": "https://docs/api", "ref": "https://docs/ref",
             "status": "GENERAL_AVAILABILITY", "current": true},
            {"version": "3.3.0-SNAPSHOT", "status": "SNAPSHOT"},
            {"version": "3.3.0-M2"}
        ]"#;
        let docs = parse_documentation("documentation.json", json).unwrap();
        assert_eq!(docs.len(), 3);
        assert!(docs[0].is_antora);
        assert!(docs[0].current);
        assert_eq!(docs[0].api_doc_url.as_deref(), Some("https://docs/api"));
        assert_eq!(docs[1].status, DocumentationStatus::Snapshot);
        assert!(!docs[1].current);
        assert_eq!(docs[2].status, DocumentationStatus::Prerelease);
    }

    #[test]
    fn test_empty_and_malformed() {
        assert!(parse_documentation("d", "  ").unwrap().is_empty());
        assert!(parse_documentation("d", "[]").unwrap().is_empty());
        assert!(parse_documentation("d", "{\"version\": 1}")
            .unwrap_err()
            .is_malformed());
        assert!(parse_documentation("d", "[{\"status\": \"SNAPSHOT\"}]")
            .unwrap_err()
            .is_malformed());
    }

    #[test]
    fn test_serialized_manifest_parses_back() {
        let mut ga = ProjectDocumentation::new("2.7.18", DocumentationStatus::GeneralAvailability);
        ga.current = true;
        let docs = vec![
            ga,
            ProjectDocumentation::new("3.0.0-RC1", DocumentationStatus::Prerelease),
        ];
        let json = to_json(&docs).unwrap();
        assert_eq!(parse_documentation("d", &json).unwrap(), docs);
    }
}
