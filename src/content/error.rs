//! Content store errors

use std::path::PathBuf;
use thiserror::Error;

use super::frontmatter::FrontMatterError;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("content directory {path:?} is unavailable: {source}")]
    StoreUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed front matter in {path:?}: {source}")]
    FrontMatter {
        path: PathBuf,
        #[source]
        source: FrontMatterError,
    },

    #[error("invalid slug {0:?}")]
    InvalidSlug(String),

    #[error("no post with slug {0:?}")]
    NotFound(String),
}

impl ContentError {
    /// The caller asked for something that is not there
    pub fn is_not_found(&self) -> bool {
        matches!(self, ContentError::NotFound(_) | ContentError::InvalidSlug(_))
    }
}
