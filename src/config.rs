//! Catalog configuration
//!
//! Loaded from a YAML file (path from `CATALOG_CONFIG`, default
//! `config/catalog.yaml`) with a handful of environment overrides. A
//! missing file means "all defaults".
//!
//! ```yaml
//! source:
//!   kind: github
//!   owner: spring-io
//!   repository: spring-website-content
//!   branch: main
//! cache:
//!   content_root: project
//!   fetch_concurrency: 8
//!   default_support_policy: SPRING_BOOT
//! ```

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::support::SupportPolicy;

/// Default configuration path
pub const DEFAULT_CONFIG_PATH: &str = "config/catalog.yaml";

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub source: SourceConfig,
    pub cache: CacheConfig,
}

/// Where project content comes from
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    /// GitHub contents API
    Github(GitHubConfig),
    /// A checked-out copy of the content repository
    Local(LocalConfig),
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::Github(GitHubConfig::default())
    }
}

/// GitHub contents API settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    pub owner: String,
    pub repository: String,
    pub branch: String,
    pub api_base: String,
    /// Name of the environment variable holding the API token
    pub token_env: String,
    pub timeout_secs: u64,
    /// Attempts after the first one when rate limited
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            owner: "spring-io".to_string(),
            repository: "spring-website-content".to_string(),
            branch: "main".to_string(),
            api_base: "https://api.github.com".to_string(),
            token_env: "GITHUB_TOKEN".to_string(),
            timeout_secs: 30,
            max_retries: 3,
            retry_base_delay_ms: 500,
        }
    }
}

impl GitHubConfig {
    /// Token read from the configured environment variable, if set
    pub fn token(&self) -> Option<String> {
        std::env::var(&self.token_env)
            .ok()
            .filter(|token| !token.trim().is_empty())
    }
}

/// Local checkout settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LocalConfig {
    /// Directory holding one sub-directory per project
    pub root: PathBuf,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("content/project"),
        }
    }
}

/// Snapshot cache settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of projects fetched at once during a full reload
    pub fetch_concurrency: usize,
    /// Policy used when an index names none
    pub default_support_policy: SupportPolicy,
    /// Repository directory holding one sub-directory per project, e.g. the
    /// `project` in `project/spring-boot/index.md`
    pub content_root: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            fetch_concurrency: 8,
            default_support_policy: SupportPolicy::default(),
            content_root: "project".to_string(),
        }
    }
}

impl CatalogConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        info!(path = %path.display(), "Loaded catalog configuration");
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: CatalogConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `CATALOG_CONFIG` (or the default path), falling back to
    /// defaults when the file does not exist, then apply environment
    /// overrides.
    pub fn from_env() -> Result<Self> {
        let path =
            std::env::var("CATALOG_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = if Path::new(&path).exists() {
            Self::from_file(&path)?
        } else {
            info!(path = %path, "No configuration file, using defaults");
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply `CATALOG_*` overrides looked up through `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(root) = lookup("CATALOG_LOCAL_ROOT") {
            self.source = SourceConfig::Local(LocalConfig {
                root: PathBuf::from(root),
            });
        }
        if let SourceConfig::Github(github) = &mut self.source {
            if let Some(owner) = lookup("CATALOG_GITHUB_OWNER") {
                github.owner = owner;
            }
            if let Some(repository) = lookup("CATALOG_GITHUB_REPOSITORY") {
                github.repository = repository;
            }
            if let Some(branch) = lookup("CATALOG_GITHUB_BRANCH") {
                github.branch = branch;
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.cache.content_root.trim_matches('/').is_empty() {
            return Err(anyhow!("cache.content_root must not be empty"));
        }
        if self.cache.fetch_concurrency == 0 {
            return Err(anyhow!("cache.fetch_concurrency must be at least 1"));
        }
        if let SourceConfig::Github(github) = &self.source {
            for (name, value) in [
                ("owner", &github.owner),
                ("repository", &github.repository),
                ("branch", &github.branch),
            ] {
                if value.trim().is_empty() {
                    return Err(anyhow!("source.{} must not be empty", name));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = CatalogConfig::default();
        assert_eq!(config.cache.fetch_concurrency, 8);
        assert_eq!(config.cache.default_support_policy, SupportPolicy::SpringBoot);
        assert!(matches!(config.source, SourceConfig::Github(ref g) if g.branch == "main"));
    }

    #[test]
    fn test_parse_local_source() {
        let yaml = "source:\n  kind: local\n  root: /tmp/content/project\n\
                    cache:\n  default_support_policy: UPSTREAM\n";
        let config = CatalogConfig::from_yaml(yaml).unwrap();
        match config.source {
            SourceConfig::Local(local) => {
                assert_eq!(local.root, PathBuf::from("/tmp/content/project"))
            }
            other => panic!("unexpected source {:?}", other),
        }
        assert_eq!(config.cache.default_support_policy, SupportPolicy::Upstream);
        assert_eq!(config.cache.fetch_concurrency, 8);
    }

    #[test]
    fn test_parse_partial_github_source() {
        let yaml = "source:\n  kind: github\n  owner: acme\n";
        let config = CatalogConfig::from_yaml(yaml).unwrap();
        let SourceConfig::Github(github) = config.source else {
            panic!("expected github source");
        };
        assert_eq!(github.owner, "acme");
        assert_eq!(github.repository, "spring-website-content");
    }

    #[test]
    fn test_validation() {
        assert!(CatalogConfig::from_yaml("cache:\n  fetch_concurrency: 0\n").is_err());
        assert!(CatalogConfig::from_yaml("source:\n  kind: github\n  owner: \"\"\n").is_err());
        assert!(CatalogConfig::from_yaml("source:\n  kind: ftp\n").is_err());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("CATALOG_GITHUB_OWNER", "acme"),
            ("CATALOG_GITHUB_BRANCH", "staging"),
        ]
        .into_iter()
        .collect();
        let mut config = CatalogConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));
        let SourceConfig::Github(github) = &config.source else {
            panic!("expected github source");
        };
        assert_eq!(github.owner, "acme");
        assert_eq!(github.branch, "staging");

        config.apply_overrides(|key| {
            (key == "CATALOG_LOCAL_ROOT").then(|| "/srv/content".to_string())
        });
        assert!(matches!(config.source, SourceConfig::Local(_)));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.yaml");
        std::fs::write(&path, "cache:\n  fetch_concurrency: 2\n").unwrap();
        let config = CatalogConfig::from_file(&path).unwrap();
        assert_eq!(config.cache.fetch_concurrency, 2);
        assert!(CatalogConfig::from_file(dir.path().join("missing.yaml")).is_err());
    }

    #[test]
    fn test_shipped_config_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_CONFIG_PATH);
        let config = CatalogConfig::from_file(path).unwrap();
        assert_eq!(config.cache.content_root, "project");
        assert!(matches!(config.source, SourceConfig::Github(_)));
    }
}
