//! `index.md` parsing
//!
//! The index file carries a YAML frontmatter block delimited by `---`
//! lines, followed by free text that the catalog ignores.

use serde::Deserialize;
use tracing::warn;

use crate::error::{CatalogError, Result};
use crate::model::{Project, ProjectStatus};
use crate::support::SupportPolicy;

const DELIMITER: &str = "---";
const GITHUB_BASE: &str = "https://github.com/";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Frontmatter {
    title: Option<String>,
    status: Option<String>,
    support_policy: Option<String>,
    github: Option<String>,
    repository_url: Option<String>,
}

/// What the catalog keeps from an index file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexFile {
    pub project: Project,
    /// Policy named in the frontmatter, `None` when absent or unknown
    pub support_policy: Option<SupportPolicy>,
}

/// Split `text` into its frontmatter block and body.
pub fn split_frontmatter(text: &str) -> Option<(&str, &str)> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = text.split_inclusive('\n');
    let first = lines.next()?;
    if first.trim_end() != DELIMITER {
        return None;
    }
    let start = first.len();
    let mut offset = start;
    for line in lines {
        if line.trim_end() == DELIMITER {
            return Some((&text[start..offset], &text[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

/// Parse an index file for `slug`. `path` is only used in error messages.
pub fn parse_index(slug: &str, path: &str, text: &str) -> Result<IndexFile> {
    let (block, _body) = split_frontmatter(text)
        .ok_or_else(|| CatalogError::malformed(path, "missing frontmatter block"))?;

    let frontmatter: Frontmatter = if block.trim().is_empty() {
        Frontmatter::default()
    } else {
        serde_yaml::from_str(block).map_err(|e| CatalogError::malformed(path, e))?
    };

    let title = frontmatter
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| CatalogError::malformed(path, "title must not be empty"))?;

    let status = match frontmatter.status.as_deref() {
        Some(raw) => raw
            .parse::<ProjectStatus>()
            .map_err(|e| CatalogError::malformed(path, e))?,
        None => ProjectStatus::default(),
    };

    let support_policy = frontmatter
        .support_policy
        .as_deref()
        .and_then(|raw| match raw.parse::<SupportPolicy>() {
            Ok(policy) => Some(policy),
            Err(e) => {
                warn!(slug = %slug, error = %e, "Ignoring support policy in index");
                None
            }
        });

    let repository_url = frontmatter
        .repository_url
        .or_else(|| frontmatter.github.map(|repo| github_url(&repo)));

    Ok(IndexFile {
        project: Project {
            title,
            slug: slug.to_string(),
            repository_url,
            status,
        },
        support_policy,
    })
}

fn github_url(repo: &str) -> String {
    let repo = repo.trim();
    if repo.starts_with("http://") || repo.starts_with("https://") {
        repo.to_string()
    } else {
        format!("{}{}", GITHUB_BASE, repo.trim_matches('/'))
    }
}
