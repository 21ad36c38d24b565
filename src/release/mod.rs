//! Release ordering and patch resolution
//!
//! Both algorithms rank documentation entries with the single
//! [`Version`](crate::version::Version) ordering.

pub mod ordering;
pub mod patch;

pub use ordering::{compute_current, with_documentation, without_documentation};
pub use patch::{resolve_latest_patch, PatchVersions};
