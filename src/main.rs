//! CLI entry point for folio

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio::{commands, Blog};

#[derive(Parser)]
#[command(name = "folio")]
#[command(version)]
#[command(about = "Read, render and publish an MDX blog", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List posts or tags
    List {
        /// Type of content to list (post, tag)
        #[arg(default_value = "post")]
        r#type: String,
    },

    /// Show one post's metadata
    Show { slug: String },

    /// Print every page a build would write
    Paths,

    /// Render one post body
    Render {
        slug: String,

        /// Print the node tree as JSON instead of HTML
        #[arg(long)]
        json: bool,
    },

    /// Print a post's JSON-LD article record
    Jsonld { slug: String },

    /// Generate static files
    #[command(alias = "g")]
    Build,

    /// Clean the public folder
    Clean,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "folio=debug,info"
    } else {
        "folio=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("Cannot determine the current directory")?,
    };
    let blog = Blog::new(&base_dir)?;

    match cli.command {
        Commands::List { r#type } => commands::list::run(&blog, &r#type)?,
        Commands::Show { slug } => commands::show::run(&blog, &slug)?,
        Commands::Paths => commands::paths::run(&blog)?,
        Commands::Render { slug, json } => commands::render::run(&blog, &slug, json)?,
        Commands::Jsonld { slug } => commands::jsonld::run(&blog, &slug)?,
        Commands::Build => {
            tracing::info!("Generating static files...");
            let report = blog.build()?;
            println!(
                "Generated {} posts into {:?}",
                report.pages.len(),
                blog.public_dir
            );
        }
        Commands::Clean => {
            tracing::info!("Cleaning public folder...");
            blog.clean()?;
            println!("Cleaned successfully!");
        }
    }

    Ok(())
}
