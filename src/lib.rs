//! folio: an MDX blog content reader, renderer and static generator
//!
//! Posts live as `.mdx`/`.md` files in one content directory. This crate
//! reads them into metadata records, renders bodies with tables,
//! strikethrough, math and caller-supplied components, emits JSON-LD
//! article records and writes a static blog.

pub mod commands;
pub mod config;
pub mod content;
pub mod generator;
pub mod helpers;
pub mod render;
pub mod seo;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// A blog rooted at one site directory
#[derive(Debug, Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::BlogConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Directory holding the post files
    pub content_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
}

impl Blog {
    /// Open a blog from a directory, reading `_config.yml` when present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::BlogConfig::load(&config_path)?
        } else {
            config::BlogConfig::default()
        };

        Ok(Self::from_config(base_dir, config))
    }

    pub fn from_config<P: AsRef<Path>>(base_dir: P, config: config::BlogConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let content_dir = base_dir.join(&config.content_dir);
        let public_dir = base_dir.join(&config.public_dir);

        Self {
            config,
            base_dir,
            content_dir,
            public_dir,
        }
    }

    /// Repository over this blog's content directory
    pub fn repository(&self) -> content::PostRepository {
        content::PostRepository::with_options(
            self.content_dir.clone(),
            content::RepositoryOptions::from(&self.config),
        )
    }

    /// Rendering pipeline configured from `render:`
    pub fn pipeline(&self) -> render::RenderPipeline {
        render::RenderPipeline::new(self.config.render.clone())
    }

    /// Generate the static site
    pub fn build(&self) -> Result<generator::BuildReport> {
        commands::build::run(self)
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
