//! Content source backed by a checked-out content repository on disk

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::ContentSource;
use crate::error::Result;

pub struct LocalContentSource {
    /// Directory holding one sub-directory per project
    root: PathBuf,
}

impl LocalContentSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ContentSource for LocalContentSource {
    async fn list_project_slugs(&self) -> Result<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut slugs = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if !name.starts_with('.') {
                    slugs.push(name.to_string());
                }
            }
        }
        // Sort for deterministic loading order
        slugs.sort();
        Ok(slugs)
    }

    async fn fetch_file(&self, slug: &str, filename: &str) -> Result<Option<Vec<u8>>> {
        let path = self.root.join(slug).join(filename);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn project_exists(&self, slug: &str) -> Result<bool> {
        match tokio::fs::metadata(self.root.join(slug)).await {
            Ok(metadata) => Ok(metadata.is_dir()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
