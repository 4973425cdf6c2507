//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::config::BlogConfig;

/// Characters escaped inside one path segment
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/blog/") // -> "/site/blog/"
/// ```
pub fn url_for(config: &BlogConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Generate a full URL including the domain
pub fn full_url_for(config: &BlogConfig, path: &str) -> String {
    let base = config.url.trim_end_matches('/');
    format!("{}{}", base, url_for(config, path))
}

/// Path of the blog listing, e.g. `/blog/`
pub fn blog_path(config: &BlogConfig) -> String {
    format!("{}/", config.blog_dir.trim_matches('/'))
}

/// Path of a post page, e.g. `/blog/my-post/`
pub fn post_path(config: &BlogConfig, slug: &str) -> String {
    format!(
        "{}{}/",
        blog_path(config),
        utf8_percent_encode(slug, SEGMENT)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> BlogConfig {
        BlogConfig {
            url: "https://example.com/".to_string(),
            root: "/site/".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_url_for() {
        let config = test_config();
        assert_eq!(url_for(&config, "/blog/"), "/site/blog/");
        assert_eq!(url_for(&config, ""), "/site/");
        assert_eq!(url_for(&BlogConfig::default(), "blog/a/"), "/blog/a/");
    }

    #[test]
    fn test_full_url_for() {
        assert_eq!(
            full_url_for(&test_config(), "/blog/a/"),
            "https://example.com/site/blog/a/"
        );
    }

    #[test]
    fn test_post_path_encodes_slug() {
        let config = BlogConfig::default();
        assert_eq!(post_path(&config, "hello-world"), "blog/hello-world/");
        assert_eq!(post_path(&config, "a b?"), "blog/a%20b%3F/");
        assert_eq!(post_path(&config, "café"), "blog/caf%C3%A9/");
    }
}
