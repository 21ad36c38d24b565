//! `generations.json` parsing

use crate::error::{CatalogError, Result};
use crate::model::ProjectGeneration;

/// Parse a generations manifest. An empty file has no generations.
pub fn parse_generations(path: &str, text: &str) -> Result<ProjectGeneration> {
    if text.trim().is_empty() {
        return Ok(ProjectGeneration::default());
    }
    serde_json::from_str(text).map_err(|e| CatalogError::malformed(path, e))
}
