//! Command implementations behind the `folio` binary

pub mod build;
pub mod clean;
pub mod jsonld;
pub mod list;
pub mod paths;
pub mod render;
pub mod show;
