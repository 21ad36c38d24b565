//! In-memory content source
//!
//! Holds project files in a map. Used by tests and by callers that already
//! have the content at hand.

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::ContentSource;
use crate::error::{CatalogError, Result};

type Files = BTreeMap<String, BTreeMap<String, Vec<u8>>>;

#[derive(Default)]
pub struct InMemoryContentSource {
    files: RwLock<Files>,
    unavailable: RwLock<BTreeSet<String>>,
    listing_unavailable: AtomicBool,
    existence_probes: AtomicUsize,
}

impl InMemoryContentSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn files(&self) -> RwLockReadGuard<'_, Files> {
        self.files.read().unwrap_or_else(|e| e.into_inner())
    }

    fn files_mut(&self) -> RwLockWriteGuard<'_, Files> {
        self.files.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Create or replace one file.
    pub fn put_file(&self, slug: &str, filename: &str, content: impl Into<Vec<u8>>) {
        self.files_mut()
            .entry(slug.to_string())
            .or_default()
            .insert(filename.to_string(), content.into());
    }

    /// Remove one file; the project directory disappears with its last file.
    pub fn remove_file(&self, slug: &str, filename: &str) {
        let mut files = self.files_mut();
        if let Some(project) = files.get_mut(slug) {
            project.remove(filename);
            if project.is_empty() {
                files.remove(slug);
            }
        }
    }

    pub fn remove_project(&self, slug: &str) {
        self.files_mut().remove(slug);
    }

    /// Make every request about `slug` fail as if the upstream were down.
    pub fn set_unavailable(&self, slug: &str, unavailable: bool) {
        let mut set = self.unavailable.write().unwrap_or_else(|e| e.into_inner());
        if unavailable {
            set.insert(slug.to_string());
        } else {
            set.remove(slug);
        }
    }

    /// Make the project listing fail.
    pub fn set_listing_unavailable(&self, unavailable: bool) {
        self.listing_unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of `project_exists` calls served so far
    pub fn existence_probes(&self) -> usize {
        self.existence_probes.load(Ordering::SeqCst)
    }

    fn check_available(&self, slug: &str) -> Result<()> {
        let unavailable = self.unavailable.read().unwrap_or_else(|e| e.into_inner());
        if unavailable.contains(slug) {
            return Err(CatalogError::UpstreamUnavailable(format!(
                "project '{}' is unavailable",
                slug
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ContentSource for InMemoryContentSource {
    async fn list_project_slugs(&self) -> Result<Vec<String>> {
        if self.listing_unavailable.load(Ordering::SeqCst) {
            return Err(CatalogError::UpstreamUnavailable(
                "project listing is unavailable".to_string(),
            ));
        }
        Ok(self.files().keys().cloned().collect())
    }

    async fn fetch_file(&self, slug: &str, filename: &str) -> Result<Option<Vec<u8>>> {
        self.check_available(slug)?;
        Ok(self
            .files()
            .get(slug)
            .and_then(|project| project.get(filename))
            .cloned())
    }

    async fn project_exists(&self, slug: &str) -> Result<bool> {
        self.existence_probes.fetch_add(1, Ordering::SeqCst);
        self.check_available(slug)?;
        Ok(self.files().contains_key(slug))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_fetch_remove() {
        let source = InMemoryContentSource::new();
        source.put_file("boot", "index.md", "---\ntitle: Boot\n---\n");
        source.put_file("boot", "documentation.json", "[]");

        assert_eq!(source.list_project_slugs().await.unwrap(), vec!["boot"]);
        assert!(source.fetch_file("boot", "index.md").await.unwrap().is_some());
        assert!(source.fetch_file("boot", "missing").await.unwrap().is_none());

        source.remove_file("boot", "index.md");
        assert!(source.project_exists("boot").await.unwrap());
        source.remove_file("boot", "documentation.json");
        assert!(!source.project_exists("boot").await.unwrap());
        assert_eq!(source.existence_probes(), 2);
    }

    #[tokio::test]
    async fn test_unavailable_project() {
        let source = InMemoryContentSource::new();
        source.put_file("boot", "index.md", "x");
        source.set_unavailable("boot", true);
        assert!(matches!(
            source.fetch_file("boot", "index.md").await,
            Err(CatalogError::UpstreamUnavailable(_))
        ));
        source.set_unavailable("boot", false);
        assert!(source.fetch_file("boot", "index.md").await.is_ok());

        source.set_listing_unavailable(true);
        assert!(source.list_project_slugs().await.is_err());
    }
}
