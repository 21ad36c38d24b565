//! Latest patch resolution per generation

use serde::Serialize;

use crate::model::ProjectDocumentation;
use crate::version::{version_without_patch, Version};

/// Latest GA patch of one generation in the open-source and enterprise
/// documentation lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatchVersions {
    pub oss: Option<String>,
    pub enterprise: Option<String>,
}

fn latest_in(prefix: &str, docs: Option<&[ProjectDocumentation]>) -> Option<String> {
    docs?
        .iter()
        .filter(|doc| doc.is_general_availability())
        .filter(|doc| version_without_patch(&doc.version).as_deref() == Some(prefix))
        .max_by_key(|doc| Version::parse(&doc.version))
        .map(|doc| doc.version.clone())
}

/// Resolve the latest patch of `generation` (e.g. `"3.2.x"`).
///
/// Returns `None` when the generation name is absent or not of the form
/// `<prefix>.x`, and when neither list has a matching GA entry.
pub fn resolve_latest_patch(
    generation: Option<&str>,
    oss_docs: Option<&[ProjectDocumentation]>,
    enterprise_docs: Option<&[ProjectDocumentation]>,
) -> Option<PatchVersions> {
    let prefix = generation?.strip_suffix(".x")?;
    let oss = latest_in(prefix, oss_docs);
    let enterprise = latest_in(prefix, enterprise_docs);
    if oss.is_none() && enterprise.is_none() {
        return None;
    }
    Some(PatchVersions { oss, enterprise })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DocumentationStatus;

    fn ga(version: &str) -> ProjectDocumentation {
        ProjectDocumentation::new(version, DocumentationStatus::GeneralAvailability)
    }

    #[test]
    fn test_resolves_both_sides() {
        let oss = vec![ga("3.2.10")];
        let enterprise = vec![ga("3.2.11")];
        assert_eq!(
            resolve_latest_patch(
                Some("3.2.x"),
                Some(oss.as_slice()),
                Some(enterprise.as_slice())
            ),
            Some(PatchVersions {
                oss: Some("3.2.10".to_string()),
                enterprise: Some("3.2.11".to_string()),
            })
        );
    }

    #[test]
    fn test_invalid_generation_names() {
        let oss = vec![ga("3.2.10")];
        assert_eq!(resolve_latest_patch(Some("invalid"), Some(oss.as_slice()), None), None);
        assert_eq!(resolve_latest_patch(None, Some(oss.as_slice()), Some(oss.as_slice())), None);
    }

    #[test]
    fn test_picks_highest_ga_in_bucket() {
        let oss = vec![
            ga("3.2.9"),
            ga("3.2.10"),
            ga("3.3.0"),
            ga("3.2.10.1"),
            ProjectDocumentation::new("3.2.11-SNAPSHOT", DocumentationStatus::Snapshot),
        ];
        let resolved = resolve_latest_patch(Some("3.2.x"), Some(oss.as_slice()), None).unwrap();
        assert_eq!(resolved.oss.as_deref(), Some("3.2.10.1"));
        assert_eq!(resolved.enterprise, None);
    }

    #[test]
    fn test_nothing_matches() {
        let oss = vec![ga("2.7.18")];
        assert_eq!(resolve_latest_patch(Some("3.2.x"), Some(oss.as_slice()), Some(&[][..])), None);
    }

    #[test]
    fn test_release_train_generation() {
        let oss = vec![
            ga("Moore-SR1"),
            ga("Moore-SR10"),
            ga("Moore-SR9"),
            ga("Neumann-RELEASE"),
        ];
        let resolved = resolve_latest_patch(Some("Moore.x"), Some(oss.as_slice()), None).unwrap();
        assert_eq!(resolved.oss.as_deref(), Some("Moore-SR10"));
    }
}
