//! Print a post's JSON-LD article record

use anyhow::Result;

use crate::Blog;

pub fn run(blog: &Blog, slug: &str) -> Result<()> {
    let post = blog.repository().try_post_by_slug(slug)?;
    let record = post.article_record(&blog.config.author);
    println!("{}", serde_json::to_string_pretty(&record.to_json())?);
    Ok(())
}
