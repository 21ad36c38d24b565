//! Changed-path classification
//!
//! Push notifications carry repository-relative paths. Only
//! `<root>/<slug>/<file>` paths naming one of the project files matter to
//! the catalog; everything else is ignored.

use std::collections::{BTreeMap, BTreeSet};

use crate::format::{DOCUMENTATION_FILE, GENERATIONS_FILE, INDEX_FILE, SUPPORT_FILE};

/// Which project file a path refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FileKind {
    Index,
    Documentation,
    Generations,
}

impl FileKind {
    pub const ALL: [FileKind; 3] = [
        FileKind::Index,
        FileKind::Documentation,
        FileKind::Generations,
    ];

    pub fn from_filename(filename: &str) -> Option<Self> {
        match filename {
            INDEX_FILE => Some(FileKind::Index),
            DOCUMENTATION_FILE => Some(FileKind::Documentation),
            GENERATIONS_FILE | SUPPORT_FILE => Some(FileKind::Generations),
            _ => None,
        }
    }

    /// File names to try, in order, when fetching this kind
    pub fn filenames(&self) -> &'static [&'static str] {
        match self {
            FileKind::Index => &[INDEX_FILE],
            FileKind::Documentation => &[DOCUMENTATION_FILE],
            FileKind::Generations => &[GENERATIONS_FILE, SUPPORT_FILE],
        }
    }
}

/// A recognised change to one project file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedFile {
    pub slug: String,
    pub kind: FileKind,
}

/// Whether `slug` can name a project directory: ASCII letters, digits,
/// `.`, `_` and `-`, not starting with `.` (which also rules out `.` and
/// `..`).
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('.')
        && slug
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'))
}

/// Classify `path` against `root` (e.g. `project`).
pub fn classify(root: &str, path: &str) -> Option<ChangedFile> {
    let root = root.trim_matches('/');
    let rest = path.trim_start_matches('/').strip_prefix(root)?.strip_prefix('/')?;
    let (slug, filename) = rest.split_once('/')?;
    if !is_valid_slug(slug) || filename.contains('/') {
        return None;
    }
    Some(ChangedFile {
        slug: slug.to_string(),
        kind: FileKind::from_filename(filename)?,
    })
}

/// Changes of one batch grouped by slug
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub by_slug: BTreeMap<String, BTreeSet<FileKind>>,
    pub ignored: Vec<String>,
}

impl ChangeSet {
    pub fn from_paths<I, S>(root: &str, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = ChangeSet::default();
        for path in paths {
            let path = path.as_ref();
            match classify(root, path) {
                Some(change) => {
                    set.by_slug.entry(change.slug).or_default().insert(change.kind);
                }
                None => set.ignored.push(path.to_string()),
            }
        }
        set
    }

    pub fn is_empty(&self) -> bool {
        self.by_slug.is_empty()
    }
}
