//! Immutable catalog snapshot

use std::collections::BTreeMap;

use crate::model::{Project, ProjectDocumentation, ProjectGeneration};
use crate::support::SupportPolicy;

/// Everything the catalog knows about one project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectEntry {
    pub project: Project,
    pub documentation: Vec<ProjectDocumentation>,
    pub generations: ProjectGeneration,
    pub support_policy: SupportPolicy,
}

/// One consistent view of the catalog
///
/// The four maps share one key universe: a slug present in one is present
/// in all. Values are never mutated once published; writers build a new
/// `ProjectData` and swap it in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectData {
    projects: BTreeMap<String, Project>,
    documentation: BTreeMap<String, Vec<ProjectDocumentation>>,
    generations: BTreeMap<String, ProjectGeneration>,
    support_policies: BTreeMap<String, SupportPolicy>,
}

impl ProjectData {
    pub fn projects(&self) -> impl Iterator<Item = &Project> {
        self.projects.values()
    }

    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.projects.keys().map(String::as_str)
    }

    pub fn project(&self, slug: &str) -> Option<&Project> {
        self.projects.get(slug)
    }

    pub fn documentation(&self, slug: &str) -> Option<&[ProjectDocumentation]> {
        self.documentation.get(slug).map(Vec::as_slice)
    }

    pub fn generations(&self, slug: &str) -> Option<&ProjectGeneration> {
        self.generations.get(slug)
    }

    pub fn support_policy(&self, slug: &str) -> Option<SupportPolicy> {
        self.support_policies.get(slug).copied()
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.projects.contains_key(slug)
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub(crate) fn insert(&mut self, entry: ProjectEntry) {
        let slug = entry.project.slug.clone();
        self.documentation.insert(slug.clone(), entry.documentation);
        self.generations.insert(slug.clone(), entry.generations);
        self.support_policies.insert(slug.clone(), entry.support_policy);
        self.projects.insert(slug, entry.project);
    }

    /// Drop `slug` from all four maps. Returns whether it was present.
    pub(crate) fn remove(&mut self, slug: &str) -> bool {
        self.documentation.remove(slug);
        self.generations.remove(slug);
        self.support_policies.remove(slug);
        self.projects.remove(slug).is_some()
    }

    pub(crate) fn set_index(&mut self, project: Project, policy: SupportPolicy) {
        self.support_policies.insert(project.slug.clone(), policy);
        self.projects.insert(project.slug.clone(), project);
    }

    pub(crate) fn set_documentation(&mut self, slug: &str, docs: Vec<ProjectDocumentation>) {
        self.documentation.insert(slug.to_string(), docs);
    }

    pub(crate) fn set_generations(&mut self, slug: &str, generations: ProjectGeneration) {
        self.generations.insert(slug.to_string(), generations);
    }
}
