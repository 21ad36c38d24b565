//! Project records parsed from `index.md` frontmatter

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a project
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    Incubating,
    #[default]
    Active,
    ActiveUnsupported,
    Community,
    EndOfLife,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Incubating => "INCUBATING",
            ProjectStatus::Active => "ACTIVE",
            ProjectStatus::ActiveUnsupported => "ACTIVE_UNSUPPORTED",
            ProjectStatus::Community => "COMMUNITY",
            ProjectStatus::EndOfLife => "END_OF_LIFE",
        }
    }
}

impl FromStr for ProjectStatus {
    type Err = String;

    /// Case-insensitive; `-` and spaces are read as `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "INCUBATING" => Ok(ProjectStatus::Incubating),
            "ACTIVE" => Ok(ProjectStatus::Active),
            "ACTIVE_UNSUPPORTED" => Ok(ProjectStatus::ActiveUnsupported),
            "COMMUNITY" => Ok(ProjectStatus::Community),
            "END_OF_LIFE" => Ok(ProjectStatus::EndOfLife),
            _ => Err(format!("unknown project status '{}'", s)),
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A project in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub title: String,
    /// Stable key into every snapshot map
    pub slug: String,
    pub repository_url: Option<String>,
    pub status: ProjectStatus,
}
