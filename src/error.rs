//! Error handling for the project catalog
//!
//! Every fallible library operation returns [`CatalogError`]. Configuration
//! loading and the command line tool use `anyhow` on top of it.

use thiserror::Error;

/// Main error type for the catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The requested project (or one of its versions) is absent from the
    /// current snapshot.
    #[error("{}", not_found_message(.slug, .version.as_deref()))]
    NotFound {
        slug: String,
        version: Option<String>,
    },

    /// The content source could not be reached or answered with something
    /// other than "not found".
    #[error("Content source unavailable: {0}")]
    UpstreamUnavailable(String),

    /// A content file exists but could not be parsed.
    #[error("Malformed content in {path}: {reason}")]
    MalformedContent { path: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

fn not_found_message(slug: &str, version: Option<&str>) -> String {
    match version {
        Some(version) => format!("Version '{}' of project '{}' not found", version, slug),
        None => format!("Project '{}' not found", slug),
    }
}

impl CatalogError {
    pub fn not_found(slug: impl Into<String>) -> Self {
        CatalogError::NotFound {
            slug: slug.into(),
            version: None,
        }
    }

    pub fn version_not_found(slug: impl Into<String>, version: impl Into<String>) -> Self {
        CatalogError::NotFound {
            slug: slug.into(),
            version: Some(version.into()),
        }
    }

    pub fn malformed(path: impl Into<String>, reason: impl ToString) -> Self {
        CatalogError::MalformedContent {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// True for lookup misses, which callers surface as "absent" rather than
    /// as a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound { .. })
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, CatalogError::MalformedContent { .. })
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(error: reqwest::Error) -> Self {
        CatalogError::UpstreamUnavailable(error.to_string())
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(error: std::io::Error) -> Self {
        CatalogError::UpstreamUnavailable(error.to_string())
    }
}

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = CatalogError::not_found("spring-boot");
        assert_eq!(err.to_string(), "Project 'spring-boot' not found");
        assert!(err.is_not_found());

        let err = CatalogError::version_not_found("spring-boot", "3.2.0");
        assert_eq!(
            err.to_string(),
            "Version '3.2.0' of project 'spring-boot' not found"
        );
    }

    #[test]
    fn test_io_error_is_upstream() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: CatalogError = io.into();
        assert!(matches!(err, CatalogError::UpstreamUnavailable(_)));
    }

    #[test]
    fn test_malformed_display() {
        let err = CatalogError::malformed("project/a/index.md", "missing title");
        assert!(err.is_malformed());
        assert_eq!(
            err.to_string(),
            "Malformed content in project/a/index.md: missing title"
        );
    }
}
