//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlogConfig {
    // Site
    pub title: String,
    pub description: String,
    /// Author used when a post does not name one
    pub author: String,

    // URL
    pub url: String,
    pub root: String,
    pub blog_dir: String,

    // Directory
    pub content_dir: String,
    pub public_dir: String,

    // Content store
    /// Accepted file extensions, highest priority first
    pub extensions: Vec<String>,
    pub parse_mode: ParseMode,
    pub missing_date: MissingDate,

    // Rendering
    #[serde(default)]
    pub render: RenderConfig,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            title: "Blog".to_string(),
            description: String::new(),
            author: "Anonymous".to_string(),

            url: "http://localhost:3000".to_string(),
            root: "/".to_string(),
            blog_dir: "blog".to_string(),

            content_dir: "content/posts".to_string(),
            public_dir: "public".to_string(),

            extensions: vec!["mdx".to_string(), "md".to_string()],
            parse_mode: ParseMode::default(),
            missing_date: MissingDate::default(),

            render: RenderConfig::default(),
        }
    }
}

impl BlogConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: BlogConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}

/// How the repository reacts to a malformed content file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    /// Skip the file, log it, keep enumerating
    #[default]
    Lenient,
    /// Abort the whole scan on the first malformed file
    Strict,
}

/// Where a post's date comes from when its front matter has none
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingDate {
    /// File modification time, falling back to the current time
    #[default]
    Modified,
    /// Current time at load
    Now,
}

/// Rendering pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Tables, strikethrough, task lists, footnotes
    pub extended_syntax: bool,
    /// Recognize `$...$` and `$$...$$` spans
    pub math_extraction: bool,
    /// Typeset math spans to MathML
    pub math_rendering: bool,
    /// Flag unmatched `$` delimiters in place
    pub flag_unbalanced_math: bool,
    #[serde(default)]
    pub highlight: HighlightConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            extended_syntax: true,
            math_extraction: true,
            math_rendering: true,
            flag_unbalanced_math: true,
            highlight: HighlightConfig::default(),
        }
    }
}

/// Code block highlighting
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub enable: bool,
    pub line_number: bool,
    pub theme: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enable: true,
            line_number: false,
            theme: "base16-ocean.dark".to_string(),
        }
    }
}
