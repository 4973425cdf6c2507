//! List site content

use anyhow::Result;
use std::collections::BTreeMap;

use crate::content::{parse_date_string, PostMetadata};
use crate::Blog;

/// List site content by type
pub fn run(blog: &Blog, content_type: &str) -> Result<()> {
    let posts = blog.repository().all_posts();

    match content_type {
        "post" | "posts" => {
            println!("Posts ({}):", posts.len());
            for post in &posts {
                let date = parse_date_string(&post.date)
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| post.date.clone());
                println!("  {} - {} [{}]", date, post.title, post.slug);
            }
        }
        "tag" | "tags" => {
            let tags = tag_counts(&posts);
            println!("Tags ({}):", tags.len());
            for (tag, count) in tags {
                println!("  {} ({})", tag, count);
            }
        }
        _ => {
            anyhow::bail!("Unknown type: {}. Available: post, tag", content_type);
        }
    }

    Ok(())
}

/// Tags with the number of posts carrying them, most used first
fn tag_counts(posts: &[PostMetadata]) -> Vec<(&str, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for tag in posts.iter().flat_map(|post| &post.tags) {
        *counts.entry(tag.as_str()).or_default() += 1;
    }

    // Stable: equal counts stay alphabetical
    let mut counts: Vec<_> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}
