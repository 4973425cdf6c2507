//! Post repository - reads posts from the content directory
//!
//! Every call goes back to disk; nothing is cached between calls.

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::map::Entry;
use indexmap::IndexMap;
use std::cmp::Reverse;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::error::ContentError;
use super::frontmatter::parse_date_string;
use super::{FrontMatter, Post, PostMetadata};
use crate::config::{BlogConfig, MissingDate, ParseMode};

/// Knobs for how the content directory is read
#[derive(Debug, Clone)]
pub struct RepositoryOptions {
    /// Accepted extensions, highest priority first
    pub extensions: Vec<String>,
    pub parse_mode: ParseMode,
    pub missing_date: MissingDate,
}

impl Default for RepositoryOptions {
    fn default() -> Self {
        Self {
            extensions: vec!["mdx".to_string(), "md".to_string()],
            parse_mode: ParseMode::Lenient,
            missing_date: MissingDate::Modified,
        }
    }
}

impl From<&BlogConfig> for RepositoryOptions {
    fn from(config: &BlogConfig) -> Self {
        Self {
            extensions: config.extensions.clone(),
            parse_mode: config.parse_mode,
            missing_date: config.missing_date,
        }
    }
}

/// A file that was left out of a scan, and why
#[derive(Debug)]
pub struct SkippedEntry {
    pub path: PathBuf,
    pub error: ContentError,
}

/// Result of reading the whole content directory
#[derive(Debug, Default)]
pub struct Scan {
    /// Date-descending
    pub posts: Vec<PostMetadata>,
    /// Malformed files dropped in lenient mode
    pub skipped: Vec<SkippedEntry>,
}

/// Read-only view over a directory of front-matter annotated posts
#[derive(Debug, Clone)]
pub struct PostRepository {
    content_dir: PathBuf,
    options: RepositoryOptions,
}

impl PostRepository {
    /// Repository over `content_dir` with default options
    pub fn new(content_dir: impl Into<PathBuf>) -> Self {
        Self::with_options(content_dir, RepositoryOptions::default())
    }

    pub fn with_options(content_dir: impl Into<PathBuf>, options: RepositoryOptions) -> Self {
        Self {
            content_dir: content_dir.into(),
            options,
        }
    }

    pub fn content_dir(&self) -> &Path {
        &self.content_dir
    }

    /// All posts, newest first.
    ///
    /// Never fails: an unavailable content directory yields no posts, and
    /// malformed files are skipped. Both are logged.
    pub fn all_posts(&self) -> Vec<PostMetadata> {
        match self.scan() {
            Ok(scan) => {
                for skipped in &scan.skipped {
                    tracing::warn!("Skipping post {:?}: {}", skipped.path, skipped.error);
                }
                scan.posts
            }
            Err(e) => {
                tracing::warn!("No posts loaded: {}", e);
                Vec::new()
            }
        }
    }

    /// Slugs of [`all_posts`](Self::all_posts), in the same order
    pub fn all_slugs(&self) -> Vec<String> {
        self.all_posts().into_iter().map(|post| post.slug).collect()
    }

    /// Look up one post. `None` covers both a missing and a malformed file.
    pub fn post_by_slug(&self, slug: &str) -> Option<Post> {
        match self.try_post_by_slug(slug) {
            Ok(post) => Some(post),
            Err(e) if e.is_not_found() => {
                tracing::debug!("Post lookup failed: {}", e);
                None
            }
            Err(e) => {
                tracing::warn!("Post {:?} could not be loaded: {}", slug, e);
                None
            }
        }
    }

    /// Like [`post_by_slug`](Self::post_by_slug), keeping the cause.
    ///
    /// The slug must match a listed slug exactly, case included. A file
    /// that lost a duplicate-slug contest is not reachable.
    pub fn try_post_by_slug(&self, slug: &str) -> Result<Post, ContentError> {
        if !is_valid_slug(slug) {
            return Err(ContentError::InvalidSlug(slug.to_string()));
        }

        let sources = self.discover()?;
        match sources.get(&fold_slug(slug)) {
            Some(source) if source.slug == slug => self.load_post(slug, &source.path),
            _ => Err(ContentError::NotFound(slug.to_string())),
        }
    }

    /// Read and parse every post.
    ///
    /// Fails when the directory itself cannot be read. A malformed file is
    /// recorded in [`Scan::skipped`] in lenient mode and fails the scan in
    /// strict mode.
    pub fn scan(&self) -> Result<Scan, ContentError> {
        let sources = self.discover()?;

        let mut scan = Scan::default();
        for source in sources.into_values() {
            for ignored in &source.shadowed {
                tracing::warn!(
                    "Duplicate slug {:?}: keeping {:?}, ignoring {:?}",
                    source.slug,
                    source.path,
                    ignored
                );
            }
            match self.load_post(&source.slug, &source.path) {
                Ok(post) => scan.posts.push(post.into()),
                Err(error) => match self.options.parse_mode {
                    ParseMode::Strict => return Err(error),
                    ParseMode::Lenient => scan.skipped.push(SkippedEntry {
                        path: source.path,
                        error,
                    }),
                },
            }
        }

        // Stable: equal dates keep file name order. Unparsable dates go last.
        scan.posts
            .sort_by_cached_key(|post| Reverse(parse_date_string(&post.date)));

        tracing::debug!(
            "Scanned {:?}: {} posts, {} skipped",
            self.content_dir,
            scan.posts.len(),
            scan.skipped.len()
        );

        Ok(scan)
    }

    /// Map each case-folded slug to the file that backs it, in file name order.
    ///
    /// Two files collide when their slugs differ only in case or extension.
    /// The earlier extension in `extensions` wins, then the earlier file name.
    fn discover(&self) -> Result<IndexMap<String, Source>, ContentError> {
        let unavailable = |source| ContentError::StoreUnavailable {
            path: self.content_dir.clone(),
            source,
        };

        let metadata = fs::metadata(&self.content_dir).map_err(unavailable)?;
        if !metadata.is_dir() {
            return Err(unavailable(std::io::Error::other("not a directory")));
        }

        let mut sources: IndexMap<String, Source> = IndexMap::new();

        for entry in WalkDir::new(&self.content_dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry in {:?}: {}", self.content_dir, e);
                    continue;
                }
            };

            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let Some((slug, priority)) = self.classify(path) else {
                continue;
            };

            let source = Source {
                slug,
                path: path.to_path_buf(),
                priority,
                shadowed: Vec::new(),
            };
            match sources.entry(fold_slug(&source.slug)) {
                Entry::Vacant(entry) => {
                    entry.insert(source);
                }
                Entry::Occupied(mut entry) => {
                    let existing = entry.get_mut();
                    if source.priority < existing.priority {
                        let mut replaced = std::mem::replace(existing, source);
                        existing.shadowed.append(&mut replaced.shadowed);
                        existing.shadowed.push(replaced.path);
                    } else {
                        existing.shadowed.push(source.path);
                    }
                }
            }
        }

        Ok(sources)
    }

    /// Slug and extension priority of a content file, if it is one
    fn classify(&self, path: &Path) -> Option<(String, usize)> {
        let name = path.file_name()?.to_str()?;

        self.options
            .extensions
            .iter()
            .enumerate()
            .find_map(|(priority, ext)| {
                let stem = name.strip_suffix(ext.as_str())?.strip_suffix('.')?;
                is_valid_slug(stem).then(|| (stem.to_string(), priority))
            })
    }

    /// Load a single post from a file
    fn load_post(&self, slug: &str, path: &Path) -> Result<Post, ContentError> {
        let raw = fs::read_to_string(path).map_err(|source| ContentError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let (fm, body) = FrontMatter::parse(&raw).map_err(|source| ContentError::FrontMatter {
            path: path.to_path_buf(),
            source,
        })?;

        let title = fm.title().unwrap_or(slug).to_string();

        let date = match fm.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            Some(date) => date.to_string(),
            None => self.default_date(path),
        };

        Ok(Post {
            metadata: PostMetadata {
                slug: slug.to_string(),
                title,
                date,
                author: fm.author,
                description: fm.description,
                tags: fm.tags,
            },
            content: body.to_string(),
        })
    }

    /// Date for a post whose front matter has none
    fn default_date(&self, path: &Path) -> String {
        let date = match self.options.missing_date {
            MissingDate::Modified => fs::metadata(path)
                .and_then(|m| m.modified())
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now()),
            MissingDate::Now => Utc::now(),
        };
        date.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

#[derive(Debug)]
struct Source {
    slug: String,
    path: PathBuf,
    priority: usize,
    /// Files with a colliding slug that lost to this one
    shadowed: Vec<PathBuf>,
}

/// Key under which slugs collide
fn fold_slug(slug: &str) -> String {
    slug.to_lowercase()
}

/// A slug must name a file directly inside the content directory
fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('.')
        && !slug.contains(['/', '\\', '\0'])
}
