//! Content source abstraction
//!
//! The catalog reads project files from a content repository laid out as
//! `<root>/<slug>/<file>`. This module defines the `ContentSource` trait
//! that lets different backends (GitHub API, local checkout, in-memory)
//! be used interchangeably.

pub mod github;
pub mod local;
pub mod memory;

use async_trait::async_trait;

use crate::error::Result;

pub use github::GitHubContentSource;
pub use local::LocalContentSource;
pub use memory::InMemoryContentSource;

/// Read access to the content repository
///
/// Implementations must be Send + Sync for use in async contexts. Retry
/// and backoff, if any, happen inside the implementation.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Slugs of every project directory.
    ///
    /// A missing or empty listing yields an empty vector. Any other failure
    /// is `UpstreamUnavailable`.
    async fn list_project_slugs(&self) -> Result<Vec<String>>;

    /// Raw bytes of `filename` in the project directory, or `None` when the
    /// file does not exist.
    async fn fetch_file(&self, slug: &str, filename: &str) -> Result<Option<Vec<u8>>>;

    /// Whether the project directory exists at all.
    async fn project_exists(&self, slug: &str) -> Result<bool>;
}
