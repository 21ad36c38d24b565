//! Project snapshot cache
//!
//! Holds one immutable [`ProjectData`] snapshot behind a single reference.
//! Readers clone the `Arc` and never wait on writers. Writers (`reload` and
//! `apply_changes`) are serialised by a gate so an incremental update is
//! always computed against the snapshot it replaces.
//!
//! ```text
//!   push notification ──► apply_changes(paths) ─┐
//!                                               ├─► build ProjectData ─► swap Arc
//!   startup / manual  ──► reload() ─────────────┘
//! ```

pub mod changes;
pub mod snapshot;

use futures::future;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::{Mutex, Semaphore};
use tracing::{debug, info, warn};

use crate::config::CacheConfig;
use crate::content::ContentSource;
use crate::error::{CatalogError, Result};
use crate::format::{self, IndexFile};
use crate::model::{Generation, Project, ProjectDocumentation, ProjectGeneration};
use crate::release::{resolve_latest_patch, PatchVersions};
use crate::support::{generation_support, GenerationSupport, SupportPolicy};
use crate::version::Version;

pub use changes::{classify, is_valid_slug, ChangeSet, ChangedFile, FileKind};
pub use snapshot::{ProjectData, ProjectEntry};

// =============================================================================
// REPORTS
// =============================================================================

/// Outcome of a full reload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReloadReport {
    pub loaded: Vec<String>,
    /// Slugs left out because their index was missing or malformed, or a
    /// fetch failed
    pub omitted: Vec<String>,
}

/// Outcome of an incremental update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub updated: Vec<String>,
    pub removed: Vec<String>,
    /// Slugs whose refresh failed; their previous entries are kept
    pub failed: Vec<(String, String)>,
    /// Paths that name no project file
    pub ignored: Vec<String>,
}

impl ApplyReport {
    /// Whether a new snapshot was published
    pub fn changed(&self) -> bool {
        !self.updated.is_empty() || !self.removed.is_empty()
    }
}

/// Per-slug result of refreshing changed files
enum SlugUpdate {
    Removed,
    Patched(SlugPatch),
    Unchanged,
}

#[derive(Default)]
struct SlugPatch {
    index: Option<(Project, SupportPolicy)>,
    documentation: Option<Vec<ProjectDocumentation>>,
    generations: Option<ProjectGeneration>,
}

impl SlugPatch {
    fn apply(self, slug: &str, data: &mut ProjectData) {
        if let Some((project, policy)) = self.index {
            data.set_index(project, policy);
        }
        if let Some(docs) = self.documentation {
            data.set_documentation(slug, docs);
        }
        if let Some(generations) = self.generations {
            data.set_generations(slug, generations);
        }
    }
}

// =============================================================================
// PROJECT CACHE
// =============================================================================

pub struct ProjectCache {
    source: Arc<dyn ContentSource>,
    current: RwLock<Arc<ProjectData>>,
    /// Serialises fetch, compute and publish across writers
    write_gate: Mutex<()>,
    config: CacheConfig,
}

impl ProjectCache {
    /// Create an empty cache with default settings. Call [`reload`] to
    /// populate it.
    ///
    /// [`reload`]: ProjectCache::reload
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self::with_config(source, CacheConfig::default())
    }

    pub fn with_config(source: Arc<dyn ContentSource>, config: CacheConfig) -> Self {
        Self {
            source,
            current: RwLock::new(Arc::new(ProjectData::default())),
            write_gate: Mutex::new(()),
            config,
        }
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// The current snapshot, for callers needing several consistent reads
    pub fn snapshot(&self) -> Arc<ProjectData> {
        // The guarded value is only ever replaced whole, so a poisoned lock
        // still holds a complete snapshot.
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn get_projects(&self) -> Vec<Project> {
        self.snapshot().projects().cloned().collect()
    }

    pub fn get_project(&self, slug: &str) -> Result<Project> {
        self.snapshot()
            .project(slug)
            .cloned()
            .ok_or_else(|| CatalogError::not_found(slug))
    }

    pub fn get_project_documentations(&self, slug: &str) -> Result<Vec<ProjectDocumentation>> {
        self.snapshot()
            .documentation(slug)
            .map(<[ProjectDocumentation]>::to_vec)
            .ok_or_else(|| CatalogError::not_found(slug))
    }

    /// One documentation entry, matched on the cleaned version text
    pub fn get_project_documentation(
        &self,
        slug: &str,
        version: &str,
    ) -> Result<ProjectDocumentation> {
        let snapshot = self.snapshot();
        let docs = snapshot
            .documentation(slug)
            .ok_or_else(|| CatalogError::not_found(slug))?;
        let wanted = Version::parse(version);
        docs.iter()
            .find(|doc| doc.parsed_version() == wanted)
            .cloned()
            .ok_or_else(|| CatalogError::version_not_found(slug, version))
    }

    pub fn get_project_generations(&self, slug: &str) -> Result<ProjectGeneration> {
        self.snapshot()
            .generations(slug)
            .cloned()
            .ok_or_else(|| CatalogError::not_found(slug))
    }

    pub fn get_project_generation(&self, slug: &str, name: &str) -> Result<Generation> {
        let snapshot = self.snapshot();
        let generations = snapshot
            .generations(slug)
            .ok_or_else(|| CatalogError::not_found(slug))?;
        generations
            .find(name)
            .cloned()
            .ok_or_else(|| CatalogError::version_not_found(slug, name))
    }

    pub fn get_project_support_policy(&self, slug: &str) -> Result<SupportPolicy> {
        self.snapshot()
            .support_policy(slug)
            .ok_or_else(|| CatalogError::not_found(slug))
    }

    /// Support window of one generation, computed from the manifest and the
    /// project's current support policy.
    pub fn get_generation_support(&self, slug: &str, name: &str) -> Result<GenerationSupport> {
        let snapshot = self.snapshot();
        let (Some(generations), Some(policy)) =
            (snapshot.generations(slug), snapshot.support_policy(slug))
        else {
            return Err(CatalogError::not_found(slug));
        };
        let generation = generations
            .find(name)
            .ok_or_else(|| CatalogError::version_not_found(slug, name))?;
        Ok(generation_support(generation, generations, policy))
    }

    /// Latest patch of `generation` using the cached documentation as the
    /// open-source list.
    pub fn get_latest_patch(
        &self,
        slug: &str,
        generation: &str,
        enterprise_docs: Option<&[ProjectDocumentation]>,
    ) -> Result<Option<PatchVersions>> {
        let snapshot = self.snapshot();
        let docs = snapshot
            .documentation(slug)
            .ok_or_else(|| CatalogError::not_found(slug))?;
        Ok(resolve_latest_patch(
            Some(generation),
            Some(docs),
            enterprise_docs,
        ))
    }

    fn publish(&self, data: ProjectData) {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *current = Arc::new(data);
    }

    // -------------------------------------------------------------------------
    // Full reload
    // -------------------------------------------------------------------------

    /// Rebuild the snapshot from every project in the content source.
    ///
    /// If the project listing fails the current snapshot is kept and the
    /// error returned. Individual projects that fail to load are left out.
    pub async fn reload(&self) -> Result<ReloadReport> {
        let _gate = self.write_gate.lock().await;
        info!("Reloading project catalog");

        let slugs = self.source.list_project_slugs().await.map_err(|e| {
            warn!(error = %e, "Project listing failed, keeping current snapshot");
            e
        })?;

        let permits = Semaphore::new(self.config.fetch_concurrency.max(1));
        let results: Vec<(String, Result<Option<ProjectEntry>>)> =
            future::join_all(slugs.into_iter().map(|slug| {
                let permits = &permits;
                async move {
                    let result = match permits.acquire().await {
                        Ok(_permit) => self.load_project(&slug).await,
                        Err(_) => Err(CatalogError::UpstreamUnavailable(
                            "fetch permits closed".to_string(),
                        )),
                    };
                    (slug, result)
                }
            }))
            .await;

        let mut data = ProjectData::default();
        let mut report = ReloadReport::default();
        for (slug, result) in results {
            match result {
                Ok(Some(entry)) => {
                    data.insert(entry);
                    report.loaded.push(slug);
                }
                Ok(None) => {
                    warn!(slug = %slug, "Project has no usable index, omitting");
                    report.omitted.push(slug);
                }
                Err(e) => {
                    warn!(slug = %slug, error = %e, "Failed to load project, omitting");
                    report.omitted.push(slug);
                }
            }
        }
        report.loaded.sort();
        report.omitted.sort();

        info!(
            loaded = report.loaded.len(),
            omitted = report.omitted.len(),
            "Publishing reloaded catalog"
        );
        self.publish(data);
        Ok(report)
    }

    // -------------------------------------------------------------------------
    // Incremental update
    // -------------------------------------------------------------------------

    /// Apply a batch of changed repository paths to the snapshot.
    ///
    /// Each touched slug is probed once. Missing projects are removed from
    /// every map; for present ones only the changed files are refetched. A
    /// failure on one slug keeps that slug's previous entries and does not
    /// affect the others. A new snapshot is published only if something
    /// changed.
    pub async fn apply_changes<I, S>(&self, paths: I) -> ApplyReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let changes = ChangeSet::from_paths(&self.config.content_root, paths);
        let mut report = ApplyReport {
            ignored: changes.ignored,
            ..ApplyReport::default()
        };
        for path in &report.ignored {
            debug!(path = %path, "Ignoring change to non-project file");
        }
        if changes.by_slug.is_empty() {
            return report;
        }

        let _gate = self.write_gate.lock().await;
        let base = self.snapshot();
        let mut next = ProjectData::clone(&base);

        // Changes arrive grouped by slug, so each slug is probed once.
        for (slug, kinds) in changes.by_slug {
            match self.refresh_slug(&base, &slug, &kinds).await {
                Ok(SlugUpdate::Removed) => {
                    info!(slug = %slug, "Project removed from content source");
                    next.remove(&slug);
                    report.removed.push(slug);
                }
                Ok(SlugUpdate::Patched(patch)) => {
                    patch.apply(&slug, &mut next);
                    report.updated.push(slug);
                }
                Ok(SlugUpdate::Unchanged) => {}
                Err(e) => {
                    warn!(
                        slug = %slug,
                        error = %e,
                        "Failed to refresh project, keeping previous data"
                    );
                    report.failed.push((slug, e.to_string()));
                }
            }
        }

        if report.changed() {
            info!(
                updated = report.updated.len(),
                removed = report.removed.len(),
                failed = report.failed.len(),
                "Publishing updated catalog"
            );
            self.publish(next);
        }
        report
    }

    async fn refresh_slug(
        &self,
        base: &ProjectData,
        slug: &str,
        kinds: &BTreeSet<FileKind>,
    ) -> Result<SlugUpdate> {
        let known = base.contains(slug);
        let gone = if known {
            SlugUpdate::Removed
        } else {
            SlugUpdate::Unchanged
        };

        if !self.source.project_exists(slug).await? {
            return Ok(gone);
        }

        // A slug new to the snapshot needs all of its files so the maps keep
        // one key universe.
        let kinds: BTreeSet<FileKind> = if known {
            kinds.clone()
        } else {
            FileKind::ALL.into_iter().collect()
        };

        let mut patch = SlugPatch::default();
        if kinds.contains(&FileKind::Index) {
            match self.load_index(slug).await? {
                Some(index) => patch.index = Some(index),
                None => return Ok(gone),
            }
        }
        if kinds.contains(&FileKind::Documentation) {
            patch.documentation = Some(self.load_documentation(slug).await?);
        }
        if kinds.contains(&FileKind::Generations) {
            patch.generations = Some(self.load_generations(slug).await?);
        }
        Ok(SlugUpdate::Patched(patch))
    }

    // -------------------------------------------------------------------------
    // Loading
    // -------------------------------------------------------------------------

    /// Load all files of one project. `None` when its index is missing or
    /// malformed.
    async fn load_project(&self, slug: &str) -> Result<Option<ProjectEntry>> {
        let Some((project, support_policy)) = self.load_index(slug).await? else {
            return Ok(None);
        };
        let documentation = self.load_documentation(slug).await?;
        let generations = self.load_generations(slug).await?;
        Ok(Some(ProjectEntry {
            project,
            documentation,
            generations,
            support_policy,
        }))
    }

    fn file_path(&self, slug: &str, filename: &str) -> String {
        format!(
            "{}/{}/{}",
            self.config.content_root.trim_matches('/'),
            slug,
            filename
        )
    }

    /// First existing file of `kind` as text. Undecodable bytes are
    /// malformed content.
    async fn fetch_text(&self, slug: &str, kind: FileKind) -> Result<Option<(String, String)>> {
        for filename in kind.filenames() {
            if let Some(bytes) = self.source.fetch_file(slug, filename).await? {
                let path = self.file_path(slug, filename);
                let text =
                    String::from_utf8(bytes).map_err(|e| CatalogError::malformed(&path, e))?;
                return Ok(Some((path, text)));
            }
        }
        Ok(None)
    }

    async fn load_index(&self, slug: &str) -> Result<Option<(Project, SupportPolicy)>> {
        let (path, text) = match self.fetch_text(slug, FileKind::Index).await {
            Ok(Some(found)) => found,
            Ok(None) => {
                debug!(slug = %slug, "No index file");
                return Ok(None);
            }
            Err(e) if e.is_malformed() => {
                warn!(slug = %slug, error = %e, "Ignoring malformed index");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        match format::parse_index(slug, &path, &text) {
            Ok(IndexFile {
                project,
                support_policy,
            }) => Ok(Some((
                project,
                support_policy.unwrap_or(self.config.default_support_policy),
            ))),
            Err(e) => {
                warn!(slug = %slug, error = %e, "Ignoring malformed index");
                Ok(None)
            }
        }
    }

    async fn load_documentation(&self, slug: &str) -> Result<Vec<ProjectDocumentation>> {
        let (path, text) = match self.fetch_text(slug, FileKind::Documentation).await {
            Ok(Some(found)) => found,
            Ok(None) => return Ok(Vec::new()),
            Err(e) if e.is_malformed() => {
                warn!(slug = %slug, error = %e, "Ignoring malformed documentation");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };
        Ok(format::parse_documentation(&path, &text).unwrap_or_else(|e| {
            warn!(slug = %slug, error = %e, "Ignoring malformed documentation");
            Vec::new()
        }))
    }

    async fn load_generations(&self, slug: &str) -> Result<ProjectGeneration> {
        let (path, text) = match self.fetch_text(slug, FileKind::Generations).await {
            Ok(Some(found)) => found,
            Ok(None) => return Ok(ProjectGeneration::default()),
            Err(e) if e.is_malformed() => {
                warn!(slug = %slug, error = %e, "Ignoring malformed generations");
                return Ok(ProjectGeneration::default());
            }
            Err(e) => return Err(e),
        };
        Ok(format::parse_generations(&path, &text).unwrap_or_else(|e| {
            warn!(slug = %slug, error = %e, "Ignoring malformed generations");
            ProjectGeneration::default()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::InMemoryContentSource;
    use crate::model::DocumentationStatus;

    fn index(title: &str) -> String {
        format!("---\ntitle: {}\nstatus: ACTIVE\n---\nAbout {}\n", title, title)
    }

    fn seeded() -> Arc<InMemoryContentSource> {
        let source = Arc::new(InMemoryContentSource::new());
        source.put_file("spring-boot", "index.md", index("Spring Boot"));
        source.put_file(
            "spring-boot",
            "documentation.json",
            r#"[{"version": "3.2.1", "status": "GENERAL_AVAILABILITY", "current": true},
                {"version": "3.3.0-SNAPSHOT", "status": "SNAPSHOT"}]"#,
        );
        source.put_file(
            "spring-boot",
            "generations.json",
            r#"{"generations": [{"generation": "3.2.x", "initialRelease": "2023-11"}]}"#,
        );
        source.put_file("spring-batch", "index.md", index("Spring Batch"));
        source
    }

    #[tokio::test]
    async fn test_empty_until_reloaded() {
        let cache = ProjectCache::new(seeded());
        assert!(cache.get_projects().is_empty());
        assert!(cache.get_project("spring-boot").unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_reload_loads_every_project() {
        let cache = ProjectCache::new(seeded());
        let report = cache.reload().await.unwrap();
        assert_eq!(report.loaded, vec!["spring-batch", "spring-boot"]);
        assert!(report.omitted.is_empty());

        assert_eq!(cache.get_project("spring-boot").unwrap().title, "Spring Boot");
        let docs = cache.get_project_documentations("spring-boot").unwrap();
        assert_eq!(docs.len(), 2);
        assert!(docs[0].current);
        assert_eq!(
            cache.get_project_generations("spring-boot").unwrap().generations.len(),
            1
        );
        assert!(cache.get_project_documentations("spring-batch").unwrap().is_empty());
        assert!(cache.get_project_generations("spring-batch").unwrap().is_empty());
        assert_eq!(
            cache.get_project_support_policy("spring-batch").unwrap(),
            SupportPolicy::SpringBoot
        );
    }

    #[tokio::test]
    async fn test_reload_keeps_snapshot_when_listing_fails() {
        let source = seeded();
        let cache = ProjectCache::new(source.clone());
        cache.reload().await.unwrap();

        source.set_listing_unavailable(true);
        assert!(cache.reload().await.is_err());
        assert_eq!(cache.get_projects().len(), 2);
    }

    #[tokio::test]
    async fn test_reload_omits_broken_projects() {
        let source = seeded();
        source.put_file("spring-shell", "index.md", "no frontmatter");
        source.put_file("spring-ws", "documentation.json", "[]");
        source.put_file("spring-kafka", "index.md", index("Spring Kafka"));
        source.set_unavailable("spring-kafka", true);

        let cache = ProjectCache::new(source);
        let report = cache.reload().await.unwrap();
        assert_eq!(report.loaded, vec!["spring-batch", "spring-boot"]);
        assert_eq!(report.omitted, vec!["spring-kafka", "spring-shell", "spring-ws"]);
        assert!(cache.get_project_documentations("spring-ws").is_err());
    }

    #[tokio::test]
    async fn test_malformed_documentation_reads_as_empty() {
        let source = seeded();
        source.put_file("spring-batch", "documentation.json", "{not json");
        source.put_file("spring-batch", "support.json", "[1, 2]");
        let cache = ProjectCache::new(source);
        cache.reload().await.unwrap();
        assert!(cache.get_project_documentations("spring-batch").unwrap().is_empty());
        assert!(cache.get_project_generations("spring-batch").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_undecodable_files_read_as_missing() {
        let source = seeded();
        source.put_file("spring-batch", "documentation.json", vec![0xff, 0xfe, b'[']);
        source.put_file("spring-shell", "index.md", vec![b'-', b'-', b'-', 0xc3]);
        let cache = ProjectCache::new(source);
        let report = cache.reload().await.unwrap();
        assert_eq!(report.omitted, vec!["spring-shell"]);
        assert!(cache.get_project_documentations("spring-batch").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_support_json_alias() {
        let source = seeded();
        source.put_file(
            "spring-batch",
            "support.json",
            r#"{"generations": [{"generation": "5.1.x", "initialRelease": "2023-11"}]}"#,
        );
        let cache = ProjectCache::new(source);
        cache.reload().await.unwrap();
        assert!(cache.get_project_generation("spring-batch", "5.1.x").is_ok());
    }

    #[tokio::test]
    async fn test_single_entry_accessors() {
        let cache = ProjectCache::new(seeded());
        cache.reload().await.unwrap();

        let doc = cache.get_project_documentation("spring-boot", "3.2.1").unwrap();
        assert_eq!(doc.status, DocumentationStatus::GeneralAvailability);

        let err = cache
            .get_project_documentation("spring-boot", "9.9.9")
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { version: Some(_), .. }));

        let err = cache.get_project_generation("spring-boot", "1.0.x").unwrap_err();
        assert!(err.is_not_found());
        assert!(cache.get_project_generation("spring-data", "1.0.x").is_err());
    }

    #[tokio::test]
    async fn test_generation_support_and_latest_patch() {
        let cache = ProjectCache::new(seeded());
        cache.reload().await.unwrap();

        let support = cache.get_generation_support("spring-boot", "3.2.x").unwrap();
        assert_eq!(support.oss_end.to_string(), "2024-12-31");

        let patch = cache
            .get_latest_patch("spring-boot", "3.2.x", None)
            .unwrap()
            .unwrap();
        assert_eq!(patch.oss.as_deref(), Some("3.2.1"));
        assert_eq!(cache.get_latest_patch("spring-boot", "2.7.x", None).unwrap(), None);
        assert!(cache.get_latest_patch("spring-data", "2.7.x", None).is_err());
    }

    #[tokio::test]
    async fn test_apply_changes_refetches_only_changed_kind() {
        let source = seeded();
        let cache = ProjectCache::new(source.clone());
        cache.reload().await.unwrap();

        source.put_file("spring-boot", "index.md", index("Spring Boot Renamed"));
        source.put_file("spring-boot", "documentation.json", "[]");

        let report = cache
            .apply_changes(["project/spring-boot/documentation.json"])
            .await;
        assert_eq!(report.updated, vec!["spring-boot"]);
        assert!(cache.get_project_documentations("spring-boot").unwrap().is_empty());
        // index was not part of the change list
        assert_eq!(cache.get_project("spring-boot").unwrap().title, "Spring Boot");
    }

    #[tokio::test]
    async fn test_apply_changes_probes_each_slug_once() {
        let source = seeded();
        let cache = ProjectCache::new(source.clone());
        cache.reload().await.unwrap();

        cache
            .apply_changes([
                "project/spring-boot/index.md",
                "project/spring-boot/documentation.json",
                "project/spring-boot/generations.json",
            ])
            .await;
        assert_eq!(source.existence_probes(), 1);
    }

    #[tokio::test]
    async fn test_apply_changes_without_project_files_keeps_snapshot() {
        let cache = ProjectCache::new(seeded());
        cache.reload().await.unwrap();
        let before = cache.snapshot();

        let report = cache.apply_changes(["blog.md"]).await;
        assert!(!report.changed());
        assert_eq!(report.ignored, vec!["blog.md"]);
        assert!(Arc::ptr_eq(&before, &cache.snapshot()));
    }
}
