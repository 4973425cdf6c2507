//! Static path enumeration - one output page per post

use indexmap::IndexSet;
use std::path::{Path, PathBuf};

use crate::config::BlogConfig;
use crate::content::{PostMetadata, PostRepository};
use crate::helpers::{full_url_for, post_path};

/// A page to pre-render
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StaticPath {
    pub slug: String,
}

impl StaticPath {
    /// `<public>/<blog_dir>/<slug>/index.html`
    pub fn output_file(&self, public_dir: &Path, config: &BlogConfig) -> PathBuf {
        public_dir
            .join(config.blog_dir.trim_matches('/'))
            .join(&self.slug)
            .join("index.html")
    }

    /// Absolute URL of the page
    pub fn url(&self, config: &BlogConfig) -> String {
        full_url_for(config, &post_path(config, &self.slug))
    }
}

/// Every slug in the content store, once, in listing order.
///
/// The order follows [`PostRepository::all_posts`]: date descending, then
/// file name, so repeated calls over unchanged content agree.
pub fn static_paths(repository: &PostRepository) -> Vec<StaticPath> {
    paths_for(&repository.all_posts())
}

/// Static paths for an already loaded listing
pub(crate) fn paths_for(posts: &[PostMetadata]) -> Vec<StaticPath> {
    posts
        .iter()
        .map(|post| post.slug.as_str())
        .collect::<IndexSet<_>>()
        .into_iter()
        .map(|slug| StaticPath {
            slug: slug.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn repo_with(files: &[(&str, &str)]) -> (TempDir, PostRepository) {
        let tmp = TempDir::new().unwrap();
        for (name, content) in files {
            fs::write(tmp.path().join(name), content).unwrap();
        }
        let repo = PostRepository::new(tmp.path());
        (tmp, repo)
    }

    #[test]
    fn test_one_path_per_post() {
        let (_tmp, repo) = repo_with(&[
            ("a.mdx", "---\ndate: 2024-01-01\n---\n"),
            ("b.mdx", "---\ndate: 2024-03-01\n---\n"),
            ("c.md", "---\ndate: 2024-02-01\n---\n"),
            ("c.mdx", "---\ndate: 2024-02-01\n---\n"),
        ]);

        let paths = static_paths(&repo);
        let slugs: Vec<_> = paths.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["b", "c", "a"]);
        assert_eq!(slugs, repo.all_slugs());
    }

    #[test]
    fn test_idempotent() {
        let (_tmp, repo) = repo_with(&[
            ("x.mdx", "---\ndate: 2024-01-01\n---\n"),
            ("y.mdx", "---\ndate: 2024-01-01\n---\n"),
            ("z.mdx", "no metadata"),
        ]);

        assert_eq!(static_paths(&repo), static_paths(&repo));
    }

    #[test]
    fn test_empty_store() {
        let tmp = TempDir::new().unwrap();
        let repo = PostRepository::new(tmp.path().join("missing"));
        assert!(static_paths(&repo).is_empty());
    }

    #[test]
    fn test_output_file_and_url() {
        let config = BlogConfig {
            url: "https://example.com".to_string(),
            ..Default::default()
        };
        let path = StaticPath {
            slug: "hello".to_string(),
        };
        assert_eq!(
            path.output_file(Path::new("public"), &config),
            Path::new("public/blog/hello/index.html")
        );
        assert_eq!(path.url(&config), "https://example.com/blog/hello/");
    }
}
