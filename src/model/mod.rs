//! Catalog data model
//!
//! Plain values held by the snapshot: projects, their documentation
//! entries and their generation manifests.

pub mod documentation;
pub mod generation;
pub mod project;

pub use documentation::{DocumentationStatus, ProjectDocumentation};
pub use generation::{
    last_day_of_month, parse_support_date, Generation, ProjectGeneration, SupportType, YearMonth,
};
pub use project::{Project, ProjectStatus};
