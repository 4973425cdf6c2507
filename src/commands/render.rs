//! Render one post body

use anyhow::Result;

use crate::render::ComponentMap;
use crate::Blog;

/// Print the rendered body as HTML, or as the node tree in JSON
pub fn run(blog: &Blog, slug: &str, json: bool) -> Result<()> {
    let post = blog.repository().try_post_by_slug(slug)?;
    let document = blog
        .pipeline()
        .render(&post.content, &ComponentMap::with_defaults());

    for fallback in document.fallbacks() {
        tracing::warn!("Math left unrendered ({}): {}", fallback.reason, fallback.source);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&document)?);
    } else {
        print!("{}", document.to_html());
    }

    Ok(())
}
