//! Generator module - writes post pages, the blog listing and a sitemap

mod paths;

pub use paths::{static_paths, StaticPath};

use paths::paths_for;

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

use crate::content::{parse_date_string, PostMetadata, PostRepository};
use crate::helpers::{
    blog_path, escape_xml, excerpt, full_url_for, html_escape, meta_generator, post_path,
    url_for,
};
use crate::render::{ComponentMap, RenderPipeline, RenderedDocument};
use crate::Blog;

/// Characters of body text used when a post has no description
const DESCRIPTION_LENGTH: usize = 160;

/// What a build produced
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Post pages written, in listing order
    pub pages: Vec<PathBuf>,
    /// Slugs that were enumerated but could no longer be loaded
    pub skipped: Vec<String>,
}

/// Static site generator
pub struct Generator {
    blog: Blog,
    repository: PostRepository,
    pipeline: RenderPipeline,
    components: ComponentMap,
}

impl Generator {
    /// Create a generator with the default component map
    pub fn new(blog: &Blog) -> Self {
        Self {
            blog: blog.clone(),
            repository: blog.repository(),
            pipeline: blog.pipeline(),
            components: ComponentMap::with_defaults(),
        }
    }

    /// Replace the component map used for post bodies
    pub fn with_components(mut self, components: ComponentMap) -> Self {
        self.components = components;
        self
    }

    /// Generate the entire site from a fresh listing
    pub fn build(&self) -> Result<BuildReport> {
        self.build_from(&self.repository.all_posts())
    }

    /// Generate the site for a listing the caller already loaded.
    ///
    /// Pages, the index and the sitemap all come from `posts`; only post
    /// bodies are read again.
    pub fn build_from(&self, posts: &[PostMetadata]) -> Result<BuildReport> {
        fs::create_dir_all(&self.blog.public_dir)?;

        let mut report = BuildReport::default();
        for path in paths_for(posts) {
            match self.generate_post_page(&path)? {
                Some(output) => report.pages.push(output),
                None => {
                    tracing::warn!("Post {:?} disappeared during the build, skipping", path.slug);
                    report.skipped.push(path.slug);
                }
            }
        }

        self.generate_index_page(posts)?;
        self.generate_sitemap(posts)?;

        tracing::info!(
            "Generated {} posts ({} skipped)",
            report.pages.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    /// Render one post. `None` when the slug no longer resolves.
    fn generate_post_page(&self, path: &StaticPath) -> Result<Option<PathBuf>> {
        let Some(post) = self.repository.post_by_slug(&path.slug) else {
            return Ok(None);
        };
        let config = &self.blog.config;

        let document = self.pipeline.render(&post.content, &self.components);
        for fallback in document.fallbacks() {
            tracing::warn!(
                "{}: math left unrendered ({}): {}",
                post.slug(),
                fallback.reason,
                fallback.source
            );
        }

        let meta = &post.metadata;
        let record = post.article_record(&config.author);
        let mut head = String::new();
        let description = meta
            .description
            .clone()
            .unwrap_or_else(|| excerpt(&document.text(), DESCRIPTION_LENGTH));
        if !description.is_empty() {
            head.push_str(&format!(
                "<meta name=\"description\" content=\"{}\">\n",
                html_escape(&description)
            ));
        }
        head.push_str(&format!(
            "<link rel=\"canonical\" href=\"{}\">\n",
            html_escape(&path.url(config))
        ));
        head.push_str(&record.to_script_tag());
        head.push('\n');

        let body = post_body(meta, &document);
        let html = self.page(meta.title.as_str(), &head, &body);

        let output_path = path.output_file(&self.blog.public_dir, config);
        write_file(&output_path, &html)?;
        tracing::debug!("Generated post: {:?}", output_path);

        Ok(Some(output_path))
    }

    /// Blog listing at `<public>/<blog_dir>/index.html`
    fn generate_index_page(&self, posts: &[PostMetadata]) -> Result<()> {
        let config = &self.blog.config;

        let mut body = String::from("<main>\n<h1>");
        body.push_str(&html_escape(&config.title));
        body.push_str("</h1>\n<ul class=\"post-list\">\n");
        for post in posts {
            body.push_str(&format!(
                "<li><a href=\"{}\">{}</a> <time datetime=\"{}\">{}</time>",
                html_escape(&url_for(config, &post_path(config, &post.slug))),
                html_escape(&post.title),
                html_escape(&post.date),
                html_escape(display_date(&post.date).as_str())
            ));
            if let Some(description) = &post.description {
                body.push_str(&format!("<p>{}</p>", html_escape(description)));
            }
            body.push_str("</li>\n");
        }
        body.push_str("</ul>\n</main>\n");

        let mut head = String::new();
        if !config.description.is_empty() {
            head.push_str(&format!(
                "<meta name=\"description\" content=\"{}\">\n",
                html_escape(&config.description)
            ));
        }

        let html = self.page("", &head, &body);
        let output_path = self
            .blog
            .public_dir
            .join(config.blog_dir.trim_matches('/'))
            .join("index.html");
        write_file(&output_path, &html)?;
        tracing::info!("Generated blog index with {} posts", posts.len());

        Ok(())
    }

    /// `sitemap.xml` covering the listing and every post
    fn generate_sitemap(&self, posts: &[PostMetadata]) -> Result<()> {
        let config = &self.blog.config;

        let mut sitemap = String::new();
        sitemap.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        sitemap.push('\n');
        sitemap.push_str(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#);
        sitemap.push('\n');
        sitemap.push_str(&format!(
            "  <url><loc>{}</loc></url>\n",
            escape_xml(&full_url_for(config, &blog_path(config)))
        ));
        for post in posts {
            sitemap.push_str(&format!(
                "  <url><loc>{}</loc>",
                escape_xml(&full_url_for(config, &post_path(config, &post.slug)))
            ));
            if let Some(date) = parse_date_string(&post.date) {
                sitemap.push_str(&format!("<lastmod>{}</lastmod>", date.format("%Y-%m-%d")));
            }
            sitemap.push_str("</url>\n");
        }
        sitemap.push_str("</urlset>\n");

        let output_path = self.blog.public_dir.join("sitemap.xml");
        write_file(&output_path, &sitemap)?;
        tracing::info!("Generated sitemap.xml");

        Ok(())
    }

    /// Full HTML document. An empty `title` uses the site title alone.
    fn page(&self, title: &str, head: &str, body: &str) -> String {
        let site_title = &self.blog.config.title;
        let title = match (title.is_empty(), site_title.is_empty()) {
            (true, _) => site_title.clone(),
            (false, true) => title.to_string(),
            (false, false) => format!("{} | {}", title, site_title),
        };

        format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
             {}\n<title>{}</title>\n{}</head>\n<body>\n{}</body>\n</html>\n",
            meta_generator(),
            html_escape(&title),
            head,
            body
        )
    }
}

fn post_body(meta: &PostMetadata, document: &RenderedDocument) -> String {
    let mut body = String::from("<main>\n<article class=\"post\">\n<header>\n");
    body.push_str(&format!("<h1>{}</h1>\n", html_escape(&meta.title)));
    body.push_str(&format!(
        "<time datetime=\"{}\">{}</time>\n",
        html_escape(&meta.date),
        html_escape(display_date(&meta.date).as_str())
    ));
    if let Some(author) = &meta.author {
        body.push_str(&format!(
            "<span class=\"author\">{}</span>\n",
            html_escape(author)
        ));
    }
    if !meta.tags.is_empty() {
        body.push_str("<ul class=\"tags\">");
        for tag in &meta.tags {
            body.push_str(&format!("<li>{}</li>", html_escape(tag)));
        }
        body.push_str("</ul>\n");
    }
    body.push_str("</header>\n<div class=\"post-content\">\n");
    body.push_str(&document.to_html());
    body.push_str("</div>\n</article>\n</main>\n");
    body
}

/// `2024-03-01` for anything parsable, the raw value otherwise
fn display_date(date: &str) -> String {
    parse_date_string(date)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| date.to_string())
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| anyhow::anyhow!("Failed to create dir {:?}: {}", parent, e))?;
    }
    fs::write(path, contents).map_err(|e| anyhow::anyhow!("Failed to write {:?}: {}", path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BlogConfig;
    use crate::render::{Element, Node, Props};
    use tempfile::TempDir;

    fn site(posts: &[(&str, &str)]) -> (TempDir, Blog) {
        let tmp = TempDir::new().unwrap();
        let config = BlogConfig {
            title: "Notes".to_string(),
            url: "https://example.com".to_string(),
            author: "Site Owner".to_string(),
            ..Default::default()
        };
        let blog = Blog::from_config(tmp.path(), config);
        fs::create_dir_all(&blog.content_dir).unwrap();
        for (name, content) in posts {
            fs::write(blog.content_dir.join(name), content).unwrap();
        }
        (tmp, blog)
    }

    fn read(path: impl AsRef<Path>) -> String {
        fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_build_writes_post_pages() {
        let (_tmp, blog) = site(&[
            (
                "hello.mdx",
                "---\ntitle: Hello\ndate: 2024-01-01\ndescription: First post\n---\n# Hi\n\nArea is $\\pi r^2$.\n",
            ),
            ("second.mdx", "---\ntitle: Second\ndate: 2024-02-01\n---\nBody\n"),
        ]);

        let report = Generator::new(&blog).build().unwrap();
        assert_eq!(report.pages.len(), 2);
        assert!(report.skipped.is_empty());
        assert_eq!(
            report.pages[0],
            blog.public_dir.join("blog/second/index.html")
        );

        let html = read(blog.public_dir.join("blog/hello/index.html"));
        assert!(html.contains("<title>Hello | Notes</title>"));
        assert!(html.contains(r#"<meta name="description" content="First post">"#));
        assert!(html.contains(r#"<script type="application/ld+json">"#));
        assert!(html.contains(r#""headline":"Hello""#));
        assert!(html.contains(r#""name":"Site Owner""#));
        assert!(html.contains("<h1>Hi</h1>"));
        assert!(html.contains("<math"));
        assert!(html.contains(r#"href="https://example.com/blog/hello/""#));
    }

    #[test]
    fn test_index_lists_posts_newest_first() {
        let (_tmp, blog) = site(&[
            ("old.mdx", "---\ntitle: Old\ndate: 2023-05-01\n---\n"),
            (
                "new.mdx",
                "---\ntitle: New\ndate: 2024-05-01\ndescription: Latest\n---\n",
            ),
        ]);
        Generator::new(&blog).build().unwrap();

        let html = read(blog.public_dir.join("blog/index.html"));
        let new = html.find(r#"<a href="/blog/new/">New</a>"#).unwrap();
        let old = html.find(r#"<a href="/blog/old/">Old</a>"#).unwrap();
        assert!(new < old);
        assert!(html.contains("<p>Latest</p>"));
        assert!(html.contains("<title>Notes</title>"));
    }

    #[test]
    fn test_sitemap() {
        let (_tmp, blog) = site(&[("a.mdx", "---\ndate: 2024-03-05T10:00:00Z\n---\n")]);
        Generator::new(&blog).build().unwrap();

        let xml = read(blog.public_dir.join("sitemap.xml"));
        assert!(xml.contains("<loc>https://example.com/blog/</loc>"));
        assert!(xml.contains(
            "<url><loc>https://example.com/blog/a/</loc><lastmod>2024-03-05</lastmod></url>"
        ));
    }

    #[test]
    fn test_build_from_uses_one_listing() {
        let (_tmp, blog) = site(&[("first.mdx", "---\ntitle: First\ndate: 2024-01-01\n---\n")]);
        let listing = blog.repository().all_posts();

        fs::write(
            blog.content_dir.join("late.mdx"),
            "---\ntitle: Late\ndate: 2024-06-01\n---\n",
        )
        .unwrap();
        let report = Generator::new(&blog).build_from(&listing).unwrap();

        assert_eq!(report.pages, vec![blog.public_dir.join("blog/first/index.html")]);
        assert!(!blog.public_dir.join("blog/late").exists());
        let index = read(blog.public_dir.join("blog/index.html"));
        assert!(!index.contains("Late"));
        let sitemap = read(blog.public_dir.join("sitemap.xml"));
        assert!(!sitemap.contains("/blog/late/"));
    }

    #[test]
    fn test_vanished_post_is_skipped() {
        let (_tmp, blog) = site(&[("here.mdx", "---\ntitle: Here\n---\n")]);
        let generator = Generator::new(&blog);

        let gone = StaticPath {
            slug: "gone".to_string(),
        };
        assert!(generator.generate_post_page(&gone).unwrap().is_none());
        assert!(!blog.public_dir.join("blog/gone").exists());
    }

    #[test]
    fn test_empty_content_store() {
        let tmp = TempDir::new().unwrap();
        let blog = Blog::from_config(tmp.path(), BlogConfig::default());

        let report = Generator::new(&blog).build().unwrap();
        assert!(report.pages.is_empty());
        assert!(blog.public_dir.join("blog/index.html").exists());
        assert!(blog.public_dir.join("sitemap.xml").exists());
    }

    #[test]
    fn test_custom_components() {
        let (_tmp, blog) = site(&[(
            "c.mdx",
            "---\ntitle: C\n---\nBefore\n\n<Callout kind=\"tip\" />\n",
        )]);
        let components = ComponentMap::with_defaults().with("Callout", |props: &Props| {
            Node::from(
                Element::new("aside")
                    .with_attr("class", props.get("kind").unwrap_or("note"))
                    .with_children(vec![Node::text("Tip!")]),
            )
        });
        Generator::new(&blog)
            .with_components(components)
            .build()
            .unwrap();

        let html = read(blog.public_dir.join("blog/c/index.html"));
        assert!(html.contains(r#"<aside class="tip">Tip!</aside>"#));
    }

    #[test]
    fn test_description_falls_back_to_body_text() {
        let (_tmp, blog) = site(&[("d.mdx", "---\ntitle: D\n---\nSome   *intro*\ntext.\n")]);
        Generator::new(&blog).build().unwrap();

        let html = read(blog.public_dir.join("blog/d/index.html"));
        assert!(html.contains(r#"<meta name="description" content="Some intro text.">"#));
        // The article record keeps the front-matter value, which is absent
        assert!(html.contains(r#""description":"""#));
    }
}
