//! Post models

use serde::{Deserialize, Serialize};

use crate::seo::{build_article_record, ArticleRecord};

/// Normalized metadata for one content file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostMetadata {
    /// File name without extension
    pub slug: String,

    /// Front-matter title, or the slug
    pub title: String,

    /// Publication date as written in front matter, or the defaulted timestamp
    pub date: String,

    pub author: Option<String>,

    pub description: Option<String>,

    /// Never absent; empty when front matter has none
    pub tags: Vec<String>,
}

/// A full post: metadata plus the unrendered body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    #[serde(flatten)]
    pub metadata: PostMetadata,

    /// Raw body following the metadata block
    pub content: String,
}

impl Post {
    pub fn slug(&self) -> &str {
        &self.metadata.slug
    }

    pub fn title(&self) -> &str {
        &self.metadata.title
    }

    /// JSON-LD article record for this post.
    ///
    /// `default_author` is used when the post names no author.
    pub fn article_record(&self, default_author: &str) -> ArticleRecord {
        let meta = &self.metadata;
        build_article_record(
            &meta.title,
            meta.description.as_deref().unwrap_or_default(),
            &meta.date,
            meta.author.as_deref().unwrap_or(default_author),
        )
    }
}

impl From<Post> for PostMetadata {
    fn from(post: Post) -> Self {
        post.metadata
    }
}
