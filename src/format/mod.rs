//! Content file formats
//!
//! Each project directory in the content repository holds up to three
//! files: `index.md` (frontmatter), `documentation.json` and
//! `generations.json` (older trees name it `support.json`).

pub mod documentation;
pub mod generations;
pub mod index;

pub use documentation::{parse_documentation, to_json};
pub use generations::parse_generations;
pub use index::{parse_index, split_frontmatter, IndexFile};

pub const INDEX_FILE: &str = "index.md";
pub const DOCUMENTATION_FILE: &str = "documentation.json";
pub const GENERATIONS_FILE: &str = "generations.json";
pub const SUPPORT_FILE: &str = "support.json";
