//! Helper functions for generated pages

mod html;
mod url;

pub use html::*;
pub use url::*;
