//! Project Catalog - in-memory catalog of projects, documentation and
//! support generations read from a content repository.
//!
//! ## Architecture
//! Content files flow from a content source into one immutable snapshot:
//! ContentSource -> format parsers -> ProjectData -> ProjectCache readers
//!
//! Writers rebuild (`reload`) or patch (`apply_changes`) the snapshot and
//! swap it in whole. Readers never wait on writers.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use project_catalog::{LocalContentSource, ProjectCache};
//!
//! # async fn run() -> project_catalog::Result<()> {
//! let source = Arc::new(LocalContentSource::new("content/project"));
//! let cache = ProjectCache::new(source);
//! cache.reload().await?;
//! let boot = cache.get_project("spring-boot")?;
//! println!("{}", boot.title);
//! # Ok(())
//! # }
//! ```

// Core error handling
pub mod error;

// Configuration loading
pub mod config;

// Version grammar and ordering
pub mod version;

// Domain types
pub mod model;

// Content file parsers
pub mod format;

// Current-release and latest-patch rules
pub mod release;

// Support policy dates
pub mod support;

// Content sources: GitHub, local checkout, in-memory
pub mod content;

// Snapshot cache
pub mod cache;

pub use cache::{ApplyReport, ProjectCache, ProjectData, ReloadReport};
pub use config::{CacheConfig, CatalogConfig, GitHubConfig, LocalConfig, SourceConfig};
pub use content::{ContentSource, GitHubContentSource, InMemoryContentSource, LocalContentSource};
pub use error::{CatalogError, Result};
pub use model::{
    DocumentationStatus, Generation, Project, ProjectDocumentation, ProjectGeneration,
    ProjectStatus, SupportType, YearMonth,
};
pub use release::{compute_current, resolve_latest_patch, PatchVersions};
pub use support::{GenerationSupport, SupportPolicy};
pub use version::{version_without_patch, Version, VersionKind};
