//! Print the pages a build would write

use anyhow::Result;

use crate::generator::static_paths;
use crate::Blog;

pub fn run(blog: &Blog) -> Result<()> {
    for path in static_paths(&blog.repository()) {
        println!(
            "{}\t{}",
            path.url(&blog.config),
            path.output_file(&blog.public_dir, &blog.config).display()
        );
    }
    Ok(())
}
