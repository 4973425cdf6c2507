//! Content module - front matter, post records and the post repository

mod error;
mod frontmatter;
mod post;
pub mod repository;

pub use error::ContentError;
pub use frontmatter::{parse_date_string, FrontMatter, FrontMatterError};
pub use post::{Post, PostMetadata};
pub use repository::{PostRepository, RepositoryOptions, Scan, SkippedEntry};
