//! Current release selection
//!
//! The "current" flag is always recomputed over the whole list, never
//! toggled incrementally, so at most one entry carries it and that entry is
//! the highest general-availability version.

use std::cmp::Reverse;

use crate::error::{CatalogError, Result};
use crate::model::ProjectDocumentation;
use crate::version::Version;

fn sort_descending(docs: &mut [ProjectDocumentation]) {
    docs.sort_by_cached_key(|doc| Reverse(Version::parse(&doc.version)));
}

/// Flag the highest GA entry as current and clear the flag everywhere else.
///
/// Returns GA entries (highest first) followed by the remaining entries
/// (highest first).
pub fn compute_current(docs: Vec<ProjectDocumentation>) -> Vec<ProjectDocumentation> {
    let (mut ga, mut other): (Vec<_>, Vec<_>) = docs
        .into_iter()
        .map(|mut doc| {
            doc.current = false;
            doc
        })
        .partition(|doc| doc.is_general_availability());

    sort_descending(&mut ga);
    sort_descending(&mut other);

    if let Some(first) = ga.first_mut() {
        first.current = true;
    }

    ga.extend(other);
    ga
}

/// Add `additions` to `docs`, replacing entries with the same version, and
/// recompute the current release.
pub fn with_documentation(
    docs: &[ProjectDocumentation],
    additions: Vec<ProjectDocumentation>,
) -> Vec<ProjectDocumentation> {
    let added: Vec<Version> = additions
        .iter()
        .map(|doc| Version::parse(&doc.version))
        .collect();
    let mut merged: Vec<ProjectDocumentation> = docs
        .iter()
        .filter(|doc| !added.contains(&Version::parse(&doc.version)))
        .cloned()
        .collect();
    merged.extend(additions);
    compute_current(merged)
}

/// Remove `version` from the documentation of `slug` and recompute the
/// current release.
pub fn without_documentation(
    slug: &str,
    docs: &[ProjectDocumentation],
    version: &str,
) -> Result<Vec<ProjectDocumentation>> {
    let target = Version::parse(version);
    let remaining: Vec<ProjectDocumentation> = docs
        .iter()
        .filter(|doc| Version::parse(&doc.version) != target)
        .cloned()
        .collect();
    if remaining.len() == docs.len() {
        return Err(CatalogError::version_not_found(slug, version));
    }
    Ok(compute_current(remaining))
}
