//! Version model
//!
//! Parses the free-form version strings found in documentation manifests
//! into a comparable [`Version`] and derives the generation bucket
//! (`"3.2.x"`, `"2023.0.x"`, `"Moore.x"`) each version belongs to.
//!
//! Parsing is total: text no grammar recognises becomes an
//! [`VersionKind::Opaque`] version that still orders by its text.

mod grammar;

use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Generation name used when a version has no bucket
pub const NO_GENERATION: &str = "n/a";

/// Which grammar recognised the text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionKind {
    Semantic,
    CalVer,
    ReleaseTrain,
    Legacy,
    Opaque,
}

/// Numeric components of a version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct VersionParts {
    pub major: Option<u32>,
    pub minor: Option<u32>,
    pub patch: Option<u32>,
    pub hotfix: Option<u32>,
}

impl VersionParts {
    pub fn new(
        major: Option<u32>,
        minor: Option<u32>,
        patch: Option<u32>,
        hotfix: Option<u32>,
    ) -> Self {
        Self {
            major,
            minor,
            patch,
            hotfix,
        }
    }

    /// Components with missing values read as zero.
    pub fn components(&self) -> [u32; 4] {
        [
            self.major.unwrap_or(0),
            self.minor.unwrap_or(0),
            self.patch.unwrap_or(0),
            self.hotfix.unwrap_or(0),
        ]
    }

    /// Components zero-padded to two digits and concatenated, e.g. `3.2.10`
    /// becomes `3021000`.
    ///
    /// Only unambiguous while every component is below 100; ordering uses
    /// [`VersionParts::components`] instead.
    pub fn ordinal(&self) -> u64 {
        self.components()
            .iter()
            .fold(0u64, |acc, c| acc.saturating_mul(100).saturating_add(u64::from(*c)))
    }
}

/// Trailing qualifier such as `RC2`, `SNAPSHOT` or `RELEASE`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Qualifier {
    pub label: String,
    pub number: Option<u32>,
}

impl Qualifier {
    /// Rank within one numeric version: snapshots, milestones and release
    /// candidates sort before the release, service releases after it.
    pub fn rank(&self) -> u8 {
        match self.label.to_ascii_uppercase().as_str() {
            "SNAPSHOT" | "BUILD-SNAPSHOT" => 0,
            "M" | "MILESTONE" | "ALPHA" | "BETA" => 1,
            "RC" | "CR" => 2,
            "RELEASE" | "GA" | "FINAL" => RELEASE_RANK,
            "SR" => RELEASE_RANK + 1,
            _ => RELEASE_RANK - 1,
        }
    }
}

const RELEASE_RANK: u8 = 4;

/// A parsed version
///
/// Two versions are equal when their cleaned text is equal.
#[derive(Debug, Clone)]
pub struct Version {
    id: String,
    kind: VersionKind,
    major: Option<String>,
    minor: Option<String>,
    parts: Option<VersionParts>,
    qualifier: Option<Qualifier>,
}

impl Version {
    /// Parse free-form text. Never fails.
    pub fn parse(text: &str) -> Self {
        let id = grammar::clean(text);
        let parsed = grammar::parse(&id);
        Self {
            id,
            kind: parsed.kind,
            major: parsed.major,
            minor: parsed.minor,
            parts: parsed.parts,
            qualifier: parsed.qualifier,
        }
    }

    /// Cleaned text of the version
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> VersionKind {
        self.kind
    }

    pub fn major(&self) -> Option<&str> {
        self.major.as_deref()
    }

    /// `"{major}.{minor}"`, or the train name for release trains
    pub fn minor(&self) -> Option<&str> {
        self.minor.as_deref()
    }

    pub fn parts(&self) -> Option<&VersionParts> {
        self.parts.as_ref()
    }

    pub fn qualifier(&self) -> Option<&Qualifier> {
        self.qualifier.as_ref()
    }

    /// Generation bucket, e.g. `"3.2.x"`, or `"n/a"`.
    pub fn to_generation(&self) -> String {
        match &self.minor {
            Some(minor) => format!("{}.x", minor),
            None => NO_GENERATION.to_string(),
        }
    }

    fn qualifier_rank(&self) -> (u8, u32) {
        match &self.qualifier {
            Some(q) => (q.rank(), q.number.unwrap_or(0)),
            None => (RELEASE_RANK, 0),
        }
    }

    /// Sort key for versions without numeric parts: release trains group by
    /// train name and rank by qualifier, opaque text stands alone.
    fn named_key(&self) -> (&str, (u8, u32), &str) {
        match (self.kind, self.minor.as_deref()) {
            (VersionKind::ReleaseTrain, Some(train)) => {
                (train, self.qualifier_rank(), self.id.as_str())
            }
            _ => (self.id.as_str(), (0, 0), self.id.as_str()),
        }
    }
}

/// The `major.minor` (or release train name) portion of `text`, used to
/// match versions against a generation prefix.
pub fn version_without_patch(text: &str) -> Option<String> {
    Version::parse(text).minor
}

impl Ord for Version {
    /// Numeric components first, then qualifier rank, then text.
    ///
    /// A version without numeric components sorts below every version that
    /// has them, so release trains precede calendar versions and the order
    /// stays total. Releases of one train compare by qualifier, so
    /// `Moore-SR10` follows `Moore-SR9`.
    fn cmp(&self, other: &Self) -> Ordering {
        match (&self.parts, &other.parts) {
            (Some(a), Some(b)) => a
                .components()
                .cmp(&b.components())
                .then_with(|| self.qualifier_rank().cmp(&other.qualifier_rank()))
                .then_with(|| self.id.cmp(&other.id)),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => self.named_key().cmp(&other.named_key()),
        }
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

impl From<&str> for Version {
    fn from(text: &str) -> Self {
        Version::parse(text)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.id)
    }
}
