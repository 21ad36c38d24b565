//! Documentation entries parsed from `documentation.json`

use serde::{Deserialize, Serialize};

use crate::version::Version;

/// Release status of a documented version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentationStatus {
    Snapshot,
    Prerelease,
    GeneralAvailability,
}

impl DocumentationStatus {
    /// Status implied by a version's qualifier, used when a manifest entry
    /// omits `status`.
    pub fn from_version(version: &Version) -> Self {
        match version.qualifier().map(|q| q.rank()) {
            Some(0) => DocumentationStatus::Snapshot,
            Some(1) | Some(2) => DocumentationStatus::Prerelease,
            _ => DocumentationStatus::GeneralAvailability,
        }
    }

    pub fn is_general_availability(&self) -> bool {
        matches!(self, DocumentationStatus::GeneralAvailability)
    }
}

/// One documented version of a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDocumentation {
    pub version: String,
    #[serde(rename = "antora", default)]
    pub is_antora: bool,
    #[serde(rename = "api", default, skip_serializing_if = "Option::is_none")]
    pub api_doc_url: Option<String>,
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference_doc_url: Option<String>,
    pub status: DocumentationStatus,
    #[serde(default)]
    pub current: bool,
}

impl ProjectDocumentation {
    pub fn new(version: impl Into<String>, status: DocumentationStatus) -> Self {
        Self {
            version: version.into(),
            is_antora: false,
            api_doc_url: None,
            reference_doc_url: None,
            status,
            current: false,
        }
    }

    /// Parsed form of [`ProjectDocumentation::version`]
    pub fn parsed_version(&self) -> Version {
        Version::parse(&self.version)
    }

    pub fn is_general_availability(&self) -> bool {
        self.status.is_general_availability()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_version() {
        let status = |text: &str| DocumentationStatus::from_version(&Version::parse(text));
        assert_eq!(status("3.2.0-SNAPSHOT"), DocumentationStatus::Snapshot);
        assert_eq!(status("3.2.0-M1"), DocumentationStatus::Prerelease);
        assert_eq!(status("3.2.0-RC2"), DocumentationStatus::Prerelease);
        assert_eq!(status("3.2.0"), DocumentationStatus::GeneralAvailability);
        assert_eq!(
            status("5.3.9.RELEASE"),
            DocumentationStatus::GeneralAvailability
        );
    }

    #[test]
    fn test_json_field_names() {
        let mut doc = ProjectDocumentation::new("3.2.0", DocumentationStatus::GeneralAvailability);
        doc.reference_doc_url = Some("https://docs.example.org/{version}/".to_string());
        doc.current = true;

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["version"], "3.2.0");
        assert_eq!(json["antora"], false);
        assert_eq!(json["ref"], "https://docs.example.org/{version}/");
        assert_eq!(json["status"], "GENERAL_AVAILABILITY");
        assert_eq!(json["current"], true);
        assert!(json.get("api").is_none());
    }
}
