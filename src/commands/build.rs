//! Generate the static site

use anyhow::Result;

use crate::generator::{BuildReport, Generator};
use crate::Blog;

/// Build every post page, the listing and the sitemap
pub fn run(blog: &Blog) -> Result<BuildReport> {
    let start = std::time::Instant::now();

    let repository = blog.repository();

    // An unavailable content directory, or in strict mode a malformed post, stops here
    let scan = repository.scan()?;
    for entry in &scan.skipped {
        tracing::warn!("Skipping post {:?}: {}", entry.path, entry.error);
    }
    tracing::info!(
        "Loaded {} posts from {:?} ({} skipped)",
        scan.posts.len(),
        repository.content_dir(),
        scan.skipped.len()
    );

    let report = Generator::new(blog).build_from(&scan.posts)?;
    tracing::info!("Generated in {:.2?}", start.elapsed());

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BlogConfig, ParseMode};
    use std::fs;
    use tempfile::TempDir;

    fn blog(parse_mode: ParseMode) -> (TempDir, Blog) {
        let tmp = TempDir::new().unwrap();
        let config = BlogConfig {
            parse_mode,
            ..Default::default()
        };
        let blog = Blog::from_config(tmp.path(), config);
        fs::create_dir_all(&blog.content_dir).unwrap();
        fs::write(blog.content_dir.join("good.mdx"), "---\ntitle: Good\n---\n").unwrap();
        fs::write(blog.content_dir.join("bad.mdx"), "---\ntitle: [oops\n---\n").unwrap();
        (tmp, blog)
    }

    #[test]
    fn test_lenient_build_skips_malformed_posts() {
        let (_tmp, blog) = blog(ParseMode::Lenient);
        let report = run(&blog).unwrap();
        assert_eq!(report.pages, vec![blog.public_dir.join("blog/good/index.html")]);
    }

    #[test]
    fn test_strict_build_fails_on_malformed_post() {
        let (_tmp, blog) = blog(ParseMode::Strict);
        assert!(run(&blog).is_err());
        assert!(!blog.public_dir.exists());
    }

    #[test]
    fn test_missing_content_dir() {
        let tmp = TempDir::new().unwrap();
        let blog = Blog::from_config(tmp.path(), BlogConfig::default());
        assert!(run(&blog).is_err());
    }
}
