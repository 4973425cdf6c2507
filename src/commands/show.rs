//! Show one post's metadata

use anyhow::Result;

use crate::Blog;

pub fn run(blog: &Blog, slug: &str) -> Result<()> {
    let post = blog.repository().try_post_by_slug(slug)?;
    let meta = &post.metadata;

    println!("slug:        {}", meta.slug);
    println!("title:       {}", meta.title);
    println!("date:        {}", meta.date);
    if let Some(author) = &meta.author {
        println!("author:      {}", author);
    }
    if let Some(description) = &meta.description {
        println!("description: {}", description);
    }
    if !meta.tags.is_empty() {
        println!("tags:        {}", meta.tags.join(", "));
    }
    println!("body:        {} bytes", post.content.len());

    Ok(())
}
